//! HTML renderer: standalone HTML page with semantic markup.

use crate::links::{github_slug, LinkFormat};
use crate::render::{EntityPage, Renderer, SummaryView};

pub struct HtmlRenderer;

impl LinkFormat for HtmlRenderer {
    fn link(&self, text: &str, href: &str) -> String {
        format!("<a href=\"{}\">{}</a>", html_escape(href), html_escape(text))
    }

    fn escape(&self, text: &str) -> String {
        html_escape(text)
    }
}

impl Renderer for HtmlRenderer {
    fn render_page(&self, page: &EntityPage<'_>) -> String {
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", html_escape(page.title)));
        out.push_str("<style>\n");
        out.push_str("body { font-family: system-ui, sans-serif; max-width: 48em; margin: 2em auto; padding: 0 1em; }\n");
        out.push_str("code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }\n");
        out.push_str("pre { background: #f4f4f4; padding: 1em; border-radius: 5px; overflow-x: auto; }\n");
        out.push_str("dt { margin-top: 0.5em; }\n");
        out.push_str("dd { margin-left: 1.5em; }\n");
        out.push_str(".tag { display: inline-block; font-size: 0.75em; padding: 0.1em 0.4em; border-radius: 3px; margin-left: 0.5em; background: #e8e8e8; }\n");
        out.push_str("</style>\n");
        out.push_str("</head>\n<body>\n");

        out.push_str(&format!("<h1>{}", html_escape(page.title)));
        out.push_str(&format!(" <span class=\"tag\">{}</span>", page.kind));
        if let Some(tag) = page.overload {
            out.push_str(&format!(" <span class=\"tag\">overload {}</span>", html_escape(tag)));
        }
        out.push_str("</h1>\n");
        out.push_str(&format!(
            "<pre><code class=\"language-python\">{}</code></pre>\n",
            html_escape(&page.signature)
        ));
        out.push_str(&format!("<p class=\"group\">{}</p>\n", html_escape(page.group)));

        if !page.short.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", page.short));
        }
        out.push_str(&paragraphs(&page.long));

        if !page.sections.is_empty() {
            out.push_str("<h2>Index</h2>\n<ul>\n");
            for section in &page.sections {
                out.push_str(&format!(
                    "  <li><a href=\"#{}\">{}</a></li>\n",
                    github_slug(&section.group),
                    html_escape(&section.group)
                ));
            }
            out.push_str("</ul>\n");
            for section in &page.sections {
                out.push_str(&format!(
                    "<h2 id=\"{}\">{}</h2>\n",
                    github_slug(&section.group),
                    html_escape(&section.group)
                ));
                out.push_str(&self.render_summary(section));
            }
        }

        out.push_str("</body>\n</html>\n");
        out
    }

    fn render_summary(&self, summary: &SummaryView) -> String {
        let mut out = String::from("<dl class=\"summary\">\n");
        for row in &summary.rows {
            out.push_str(&format!(
                "  <dt><a href=\"{}\"><code>{}</code></a>",
                html_escape(&row.href),
                html_escape(&row.name)
            ));
            if !row.rest.is_empty() {
                out.push_str(&format!("<code>{}</code>", html_escape(&row.rest)));
            }
            out.push_str("</dt>\n");
            if !row.description.is_empty() {
                out.push_str(&format!("  <dd>{}</dd>\n", row.description));
            }
        }
        out.push_str("</dl>\n");
        out
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

/// Wrap blank-line separated paragraphs of already-escaped text.
fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>\n", p))
        .collect()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
