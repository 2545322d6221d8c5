//! apigen: generate API reference pages and group summaries from an
//! introspected module inventory.
//!
//! A run has two phases. Discovery walks the configured modules into a
//! registry that is then frozen and planned (one page per entity). Only then
//! are summary requests, cross-references and page bodies resolved. Nothing
//! is returned unless every step succeeded.

pub mod config;
pub mod discover;
pub mod docstring;
pub mod error;
pub mod inventory;
pub mod links;
pub mod model;
pub mod normalize;
pub mod planner;
pub mod registry;
pub mod render;
pub mod signature;
pub mod summary;

use crate::config::Config;
use crate::discover::Discoverer;
use crate::error::{ApigenError, Result};
use crate::inventory::Inventory;
use crate::links::{parent_dir, relative_href, resolve_roles, RefContext};
use crate::model::{EntityKind, EntityRecord, PageSpec, SummaryBlock};
use crate::normalize::Normalizer;
use crate::planner::{LinkTable, Plan};
use crate::registry::{GroupRegistry, RegistryBuilder};
use crate::render::{EntityPage, Renderer, SummaryRow, SummaryView};
use crate::summary::{parse_directive, Assembler};
use std::collections::HashMap;

/// A hand-authored page that may contain summary directives.
#[derive(Debug, Clone)]
pub struct AuthoredPage {
    /// File name the expanded page is written under.
    pub file_name: String,
    pub text: String,
}

/// A file to write, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: String,
    pub contents: String,
}

/// Everything a successful run produces.
#[derive(Debug, Default)]
pub struct Output {
    /// Standalone pages in registry order.
    pub pages: Vec<PageSpec>,
    /// Standalone pages and expanded authored pages, ready to write.
    pub files: Vec<OutputFile>,
}

/// Discover, register and plan every configured module.
pub fn build(config: &Config, inventory: &Inventory) -> Result<(GroupRegistry, Plan)> {
    let normalizer = Normalizer::new(inventory, &config.subscript_pattern, config.column_limit);
    let discoverer = Discoverer::new(inventory, normalizer, &config.group_rules);

    let mut builder = RegistryBuilder::new();
    for spec in &config.modules {
        discoverer.discover(spec, &mut builder)?;
    }
    let registry = builder.finish();
    let plan = planner::plan(&registry, config.class_page_suffix)?;
    tracing::info!(
        modules = config.modules.len(),
        entities = registry.len(),
        pages = plan.pages.len(),
        "inventory processed"
    );
    Ok((registry, plan))
}

/// Run the whole pipeline and return the files to write.
pub fn generate(
    config: &Config,
    inventory: &Inventory,
    authored: &[AuthoredPage],
    renderer: &dyn Renderer,
) -> Result<Output> {
    let (registry, plan) = build(config, inventory)?;
    let ctx = RenderContext {
        registry: &registry,
        links: &plan.links,
        renderer,
        ext: renderer.file_extension(),
    };
    let assembler = Assembler::new(&registry, &plan.links);

    let mut output = Output::default();
    for page in &plan.pages {
        let record = registry.record(page.entity);
        let from_dir = parent_dir(&page.path);
        let sections = if record.kind == EntityKind::Class {
            assembler
                .sections(&record.qualified_name)?
                .iter()
                .map(|block| ctx.summary_view(block, from_dir))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        let body = renderer.render_page(&EntityPage {
            title: &page.title,
            kind: record.kind,
            signature: record.qualified_signature(),
            overload: record.overload.as_deref(),
            group: &record.group,
            short: ctx.format_text(record, &record.short_description, from_dir)?,
            long: ctx.format_text(record, &record.long_description, from_dir)?,
            sections,
        });
        output.files.push(OutputFile {
            path: format!("{}.{}", page.path, ctx.ext),
            contents: body.clone(),
        });
        output.pages.push(PageSpec {
            path: page.path.clone(),
            title: page.title.clone(),
            body,
        });
    }

    for page in authored {
        let contents = expand_page(&page.text, &assembler, &ctx)?;
        output.files.push(OutputFile {
            path: page.file_name.clone(),
            contents,
        });
    }

    check_file_collisions(&output.files)?;
    Ok(output)
}

/// Replace every directive line of an authored page with its summary.
fn expand_page(text: &str, assembler: &Assembler<'_>, ctx: &RenderContext<'_>) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        match parse_directive(line) {
            Some(request) => {
                let block = assembler.assemble(&request)?;
                let view = ctx.summary_view(&block, "")?;
                out.push_str(&ctx.renderer.render_summary(&view));
            }
            None => out.push_str(line),
        }
    }
    Ok(out)
}

/// Two files whose paths differ only in case would overwrite each other on
/// case-insensitive file systems.
fn check_file_collisions(files: &[OutputFile]) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for file in files {
        if let Some(first) = seen.insert(file.path.to_lowercase(), &file.path) {
            return Err(ApigenError::PathCollision {
                first: first.to_string(),
                first_path: first.to_string(),
                second: file.path.clone(),
                second_path: file.path.clone(),
            });
        }
    }
    Ok(())
}

struct RenderContext<'a> {
    registry: &'a GroupRegistry,
    links: &'a LinkTable,
    renderer: &'a dyn Renderer,
    ext: &'a str,
}

impl RenderContext<'_> {
    /// Escape `text` for the output format and turn its roles into links.
    fn format_text(&self, record: &EntityRecord, text: &str, from_dir: &str) -> Result<String> {
        let refs = RefContext {
            entity: &record.qualified_name,
            module: &record.module,
            container: &record.container,
            from_dir,
            ext: self.ext,
        };
        resolve_roles(text, self.links, &refs, self.renderer)
    }

    fn summary_view(&self, block: &SummaryBlock, from_dir: &str) -> Result<SummaryView> {
        let rows = block
            .fragments
            .iter()
            .map(|fragment| {
                let record = self.registry.record(fragment.entity);
                Ok(SummaryRow {
                    name: fragment.label.clone(),
                    rest: fragment.rest().to_string(),
                    signature: fragment.signature.clone(),
                    href: relative_href(from_dir, &fragment.target, self.ext),
                    description: self.format_text(record, &fragment.short_description, from_dir)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SummaryView {
            group: block.group.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileConfig, ModuleSpec, Overrides};
    use crate::render::markdown::MarkdownRenderer;

    const INVENTORY: &str = r#"{
      "modules": [{"name": "m", "members": [
        {"name": "add", "kind": "function", "signature": "(a, b)",
         "doc": "Adds two numbers.\n\nSee :py:func:`sub`.\n\nGroup:\n  arith\n"},
        {"name": "sub", "kind": "function", "signature": "(a, b)",
         "doc": "Subtracts two numbers.\n\nGroup:\n  arith\n"}
      ]}]
    }"#;

    fn config() -> Config {
        Config::resolve(
            FileConfig::default(),
            Overrides {
                modules: vec![ModuleSpec {
                    name: "m".to_string(),
                    output: "api".to_string(),
                }],
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn authored(text: &str) -> Vec<AuthoredPage> {
        vec![AuthoredPage {
            file_name: "index.md".to_string(),
            text: text.to_string(),
        }]
    }

    #[test]
    fn summary_directive_is_expanded() {
        let inv = Inventory::from_json(INVENTORY).unwrap();
        let out = generate(
            &config(),
            &inv,
            &authored("# Reference\n\n@apigen-group m arith\n\nEnd.\n"),
            &MarkdownRenderer,
        )
        .unwrap();
        let index = out.files.iter().find(|f| f.path == "index.md").unwrap();
        assert_eq!(
            index.contents,
            "# Reference\n\n\
* [`add`](api/m.add.md)`(a, b)`: Adds two numbers.\n\
* [`sub`](api/m.sub.md)`(a, b)`: Subtracts two numbers.\n\
\nEnd.\n"
        );
    }

    #[test]
    fn pages_resolve_cross_references() {
        let inv = Inventory::from_json(INVENTORY).unwrap();
        let out = generate(&config(), &inv, &[], &MarkdownRenderer).unwrap();
        let paths: Vec<&str> = out.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["api/m.add.md", "api/m.sub.md"]);
        assert!(out.pages[0].body.contains("See [sub](m.sub.md)."), "{}", out.pages[0].body);
    }

    #[test]
    fn empty_group_request_fails_the_run() {
        let inv = Inventory::from_json(INVENTORY).unwrap();
        let err = generate(&config(), &inv, &authored("@apigen-group m io\n"), &MarkdownRenderer)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Resolution);
    }

    #[test]
    fn output_is_deterministic() {
        let inv = Inventory::from_json(INVENTORY).unwrap();
        let pages = authored("@apigen-group m arith\n");
        let first = generate(&config(), &inv, &pages, &MarkdownRenderer).unwrap();
        let second = generate(&config(), &inv, &pages, &MarkdownRenderer).unwrap();
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn authored_page_may_not_shadow_a_page() {
        let inv = Inventory::from_json(INVENTORY).unwrap();
        let pages = vec![AuthoredPage {
            file_name: "API/M.ADD.md".to_string(),
            text: String::new(),
        }];
        let err = generate(&config(), &inv, &pages, &MarkdownRenderer).unwrap_err();
        assert!(matches!(err, ApigenError::PathCollision { .. }));
    }

    #[test]
    fn tagged_and_untagged_definitions_of_one_name_fail() {
        let inv = Inventory::from_json(
            r#"{"modules": [{"name": "m", "members": [
              {"name": "f", "kind": "function", "signature": "(a: int)",
               "doc": "Int f.\n\nOverload:\n  int\n"},
              {"name": "f", "kind": "function", "signature": "(a)", "doc": "Plain f."}
            ]}]}"#,
        )
        .unwrap();
        let err = generate(&config(), &inv, &[], &MarkdownRenderer).unwrap_err();
        assert!(matches!(err, ApigenError::MixedOverloads { .. }), "{err}");
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn unicode_whitespace_in_docs_is_cleaned() {
        let inv = Inventory::from_json(
            r#"{"modules": [{"name": "m", "members": [
              {"name": "f", "kind": "function", "signature": "()",
               "doc": "F.\n \u00a0\n  Body.\n \u00a0\n"}
            ]}]}"#,
        )
        .unwrap();
        let out = generate(&config(), &inv, &[], &MarkdownRenderer).unwrap();
        assert!(out.pages[0].body.contains("Body."), "{}", out.pages[0].body);
    }
}

