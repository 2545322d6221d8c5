//! JSON renderer: structured output for tooling integration.
//!
//! Descriptions keep markdown-style links so downstream pipelines can
//! re-render them.

use crate::links::LinkFormat;
use crate::render::{EntityPage, Renderer, SummaryRow, SummaryView};
use serde::Serialize;

pub struct JsonRenderer;

#[derive(Serialize)]
struct PageJson<'a> {
    title: &'a str,
    kind: &'static str,
    signature: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    overload: Option<&'a str>,
    group: &'a str,
    short_description: &'a str,
    long_description: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sections: Vec<SummaryJson<'a>>,
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    group: &'a str,
    entries: Vec<EntryJson<'a>>,
}

#[derive(Serialize)]
struct EntryJson<'a> {
    name: &'a str,
    signature: &'a str,
    href: &'a str,
    description: &'a str,
}

impl<'a> From<&'a SummaryView> for SummaryJson<'a> {
    fn from(view: &'a SummaryView) -> Self {
        Self {
            group: &view.group,
            entries: view.rows.iter().map(EntryJson::from).collect(),
        }
    }
}

impl<'a> From<&'a SummaryRow> for EntryJson<'a> {
    fn from(row: &'a SummaryRow) -> Self {
        Self {
            name: &row.name,
            signature: &row.signature,
            href: &row.href,
            description: &row.description,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_default();
    out.push('\n');
    out
}

impl LinkFormat for JsonRenderer {
    fn link(&self, text: &str, href: &str) -> String {
        format!("[{}]({})", text, href)
    }
}

impl Renderer for JsonRenderer {
    fn render_page(&self, page: &EntityPage<'_>) -> String {
        to_json(&PageJson {
            title: page.title,
            kind: page.kind.as_str(),
            signature: &page.signature,
            overload: page.overload,
            group: page.group,
            short_description: &page.short,
            long_description: &page.long,
            sections: page.sections.iter().map(SummaryJson::from).collect(),
        })
    }

    fn render_summary(&self, summary: &SummaryView) -> String {
        to_json(&SummaryJson::from(summary))
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures;

    #[test]
    fn page_is_valid_json() {
        let out = JsonRenderer.render_page(&fixtures::page(vec![fixtures::summary()]));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["kind"], "class");
        assert_eq!(value["long_description"], "Holds <values>.\n\nSecond paragraph.");
        assert_eq!(value["sections"][0]["entries"][0]["signature"], "add(a, b)");
        assert!(value.get("overload").is_none());
    }

    #[test]
    fn summary_entries_keep_order() {
        let out = JsonRenderer.render_summary(&fixtures::summary());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["group"], "Public members");
        assert_eq!(value["entries"][1]["name"], "rank");
    }
}
