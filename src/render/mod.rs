//! Renderer module: trait-based format dispatch.

pub mod html;
pub mod json;
pub mod markdown;

use crate::links::LinkFormat;
use crate::model::EntityKind;
use anyhow::{anyhow, Result};

/// A standalone page with every description already formatted and its
/// cross-references turned into links.
#[derive(Debug)]
pub struct EntityPage<'a> {
    pub title: &'a str,
    pub kind: EntityKind,
    /// Signature qualified with its container.
    pub signature: String,
    pub overload: Option<&'a str>,
    pub group: &'a str,
    pub short: String,
    pub long: String,
    /// Member-group summaries, for class pages.
    pub sections: Vec<SummaryView>,
}

/// One summary line: linked name, remaining signature, one-line description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Link text
    pub name: String,
    pub rest: String,
    /// Full abbreviated signature
    pub signature: String,
    pub href: String,
    /// Formatted short description.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub group: String,
    pub rows: Vec<SummaryRow>,
}

/// Trait for rendering pages and summary blocks into a specific format.
pub trait Renderer: LinkFormat {
    fn render_page(&self, page: &EntityPage<'_>) -> String;
    fn render_summary(&self, summary: &SummaryView) -> String;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "html" => Ok(Box::new(html::HtmlRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!(
            "unknown format: {}. Use markdown, html, or json",
            format
        )),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats() {
        assert_eq!(create_renderer("md").unwrap().file_extension(), "md");
        assert_eq!(create_renderer("html").unwrap().file_extension(), "html");
        assert_eq!(create_renderer("json").unwrap().file_extension(), "json");
    }

    #[test]
    fn unknown_format() {
        assert!(create_renderer("pdf").is_err());
    }
}
