//! GitHub-flavored markdown renderer.

use crate::links::{github_slug, LinkFormat};
use crate::model::EntityKind;
use crate::render::{EntityPage, Renderer, SummaryView};

pub struct MarkdownRenderer;

impl LinkFormat for MarkdownRenderer {
    fn link(&self, text: &str, href: &str) -> String {
        format!("[{}]({})", text, href)
    }
}

impl Renderer for MarkdownRenderer {
    fn render_page(&self, page: &EntityPage<'_>) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("# {}\n", page.title));

        let keyword = match page.kind {
            EntityKind::Class => "class ",
            EntityKind::Property => "property ",
            _ => "",
        };
        lines.push("```python".to_string());
        lines.push(format!("{}{}", keyword, page.signature));
        lines.push("```\n".to_string());

        // Badges: kind, group, overload
        let mut badges = vec![format!("`{}`", page.kind), format!("*{}*", page.group)];
        if let Some(tag) = page.overload {
            badges.push(format!("overload `{}`", tag));
        }
        lines.push(format!("> {}\n", badges.join(" ")));

        if !page.short.is_empty() {
            lines.push(page.short.clone());
            lines.push(String::new());
        }
        if !page.long.is_empty() {
            lines.push(page.long.clone());
            lines.push(String::new());
        }

        if !page.sections.is_empty() {
            lines.push("## Index\n".to_string());
            for section in &page.sections {
                lines.push(format!("* [{}](#{})", section.group, github_slug(&section.group)));
            }
            lines.push(String::new());

            for section in &page.sections {
                lines.push(format!("## {}\n", section.group));
                lines.push(self.render_summary(section));
            }
        }

        let mut out = lines.join("\n");
        out.truncate(out.trim_end().len());
        out.push('\n');
        out
    }

    fn render_summary(&self, summary: &SummaryView) -> String {
        let mut out = String::new();
        for row in &summary.rows {
            out.push_str(&format!("* [`{}`]({})", row.name, row.href));
            if !row.rest.is_empty() {
                out.push_str(&format!("`{}`", row.rest));
            }
            if !row.description.is_empty() {
                out.push_str(": ");
                out.push_str(&row.description);
            }
            out.push('\n');
        }
        out
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures;

    #[test]
    fn summary_lines() {
        assert_eq!(
            MarkdownRenderer.render_summary(&fixtures::summary()),
            "* [`add`](m.add.md)`(a, b)`: Adds two numbers.\n* [`rank`](m.rank.md)\n"
        );
    }

    #[test]
    fn class_page_has_index_and_sections() {
        let out = MarkdownRenderer.render_page(&fixtures::page(vec![fixtures::summary()]));
        assert!(out.starts_with("# m.Arr\n\n```python\nclass m.Arr(size: int)\n```\n"), "{out}");
        assert!(out.contains("> `class` *Classes*\n"), "{out}");
        assert!(out.contains("* [Public members](#public-members)"), "{out}");
        assert!(out.contains("## Public members\n\n* [`add`]"), "{out}");
        assert!(out.ends_with("[`rank`](m.rank.md)\n"), "{out}");
    }

    #[test]
    fn page_without_sections() {
        let out = MarkdownRenderer.render_page(&fixtures::page(Vec::new()));
        assert!(!out.contains("## Index"));
        assert!(out.ends_with("Second paragraph.\n"), "{out}");
    }
}
