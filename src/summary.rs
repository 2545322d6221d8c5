//! Summary assembly: resolves (container, group) requests against the frozen
//! registry and link table, and finds requests in authored pages.

use crate::docstring::one_line;
use crate::error::{ApigenError, Result};
use crate::model::{display_name, SummaryBlock, SummaryFragment, SummaryRequest};
use crate::planner::LinkTable;
use crate::registry::GroupRegistry;
use regex::Regex;
use std::sync::LazyLock;

/// `@apigen-group <container> <group name...>` on a line of its own.
static RE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@apigen-group\s+(\S+)\s+(.*?)\s*$").unwrap());

/// Parse one authored-page line as a summary request.
pub fn parse_directive(line: &str) -> Option<SummaryRequest> {
    let caps = RE_DIRECTIVE.captures(line)?;
    let group = caps[2].trim();
    if group.is_empty() {
        return None;
    }
    Some(SummaryRequest {
        container: caps[1].to_string(),
        group: group.to_string(),
    })
}

pub struct Assembler<'a> {
    registry: &'a GroupRegistry,
    links: &'a LinkTable,
}

impl<'a> Assembler<'a> {
    pub fn new(registry: &'a GroupRegistry, links: &'a LinkTable) -> Self {
        Self { registry, links }
    }

    /// Fragments of one group in registry order.
    pub fn assemble(&self, request: &SummaryRequest) -> Result<SummaryBlock> {
        let ids = self.registry.lookup(&request.container, &request.group);
        if ids.is_empty() {
            return Err(ApigenError::EmptyGroup {
                container: request.container.clone(),
                group: request.group.clone(),
            });
        }

        let mut fragments = Vec::with_capacity(ids.len());
        for &id in ids {
            let record = self.registry.record(id);
            let object_name = record.object_name();
            let target = self
                .links
                .get(&object_name)
                .ok_or(ApigenError::UnresolvedLink { entity: object_name })?;
            fragments.push(SummaryFragment {
                name: display_name(&record.summary_signature).to_string(),
                label: record.toc_title(),
                signature: record.summary_signature.clone(),
                short_description: one_line(&record.short_description),
                target: target.to_string(),
                entity: id,
            });
        }

        Ok(SummaryBlock {
            container: request.container.clone(),
            group: request.group.clone(),
            fragments,
        })
    }

    /// Every member group of `container`, in first-registration order.
    pub fn sections(&self, container: &str) -> Result<Vec<SummaryBlock>> {
        self.registry
            .groups_of(container)
            .map(|(group, _)| {
                self.assemble(&SummaryRequest {
                    container: container.to_string(),
                    group: group.to_string(),
                })
            })
            .collect()
    }
}
