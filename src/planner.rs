//! Page planning: one output path per entity, the link table, and
//! collision detection.

use crate::error::{ApigenError, Result};
use crate::model::{EntityKind, PagePlan};
use crate::registry::GroupRegistry;
use std::collections::HashMap;

/// Object name -> page path (without extension).
#[derive(Debug, Default)]
pub struct LinkTable {
    targets: HashMap<String, String>,
    /// Object names in planning order, for suffix lookups.
    names: Vec<String>,
}

impl LinkTable {
    /// Every object name links to exactly one page.
    fn insert(&mut self, object_name: String, path: String) -> Result<()> {
        match self.targets.get(&object_name) {
            Some(existing) if *existing == path => Ok(()),
            Some(existing) => Err(ApigenError::LinkConflict {
                first_path: existing.clone(),
                second_path: path,
                entity: object_name,
            }),
            None => {
                self.names.push(object_name.clone());
                self.targets.insert(object_name, path);
                Ok(())
            }
        }
    }

    /// Link the bare name of an overloaded entity to its first overload.
    fn insert_bare(&mut self, qualified_name: &str, path: &str) {
        if !self.targets.contains_key(qualified_name) {
            self.names.push(qualified_name.to_string());
            self.targets.insert(qualified_name.to_string(), path.to_string());
        }
    }

    pub fn get(&self, object_name: &str) -> Option<&str> {
        self.targets.get(object_name).map(String::as_str)
    }

    /// Resolve a cross-reference target as seen from an entity.
    ///
    /// Tried in order: the exact object name, relative to `module`, relative
    /// to `container`, then a unique dotted suffix.
    pub fn resolve(&self, target: &str, module: &str, container: &str) -> Option<(&str, &str)> {
        let candidates = [
            target.to_string(),
            format!("{}.{}", module, target),
            format!("{}.{}", container, target),
        ];
        for candidate in &candidates {
            if let Some((name, path)) = self.targets.get_key_value(candidate.as_str()) {
                return Some((name.as_str(), path.as_str()));
            }
        }
        let suffix = format!(".{}", target);
        let mut matches = self.names.iter().filter(|n| n.ends_with(&suffix));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        self.targets
            .get_key_value(first.as_str())
            .map(|(name, path)| (name.as_str(), path.as_str()))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

/// Pages to render plus the table every link is resolved against.
#[derive(Debug, Default)]
pub struct Plan {
    pub pages: Vec<PagePlan>,
    pub links: LinkTable,
}

/// Output path of one entity, without extension.
pub fn page_path(output_dir: &str, qualified: &str, overload: Option<&str>, class_suffix: bool) -> String {
    let mut path = if output_dir.is_empty() {
        qualified.to_string()
    } else {
        format!("{}/{}", output_dir, qualified)
    };
    if let Some(tag) = overload {
        path.push('-');
        path.push_str(tag);
    }
    if class_suffix {
        path.push_str("-class");
    }
    path
}

/// Assign a page to every entity, aliasing re-exports to the first
/// discovered definition of the same identity.
pub fn plan(registry: &GroupRegistry, class_page_suffix: bool) -> Result<Plan> {
    let mut plan = Plan::default();
    let mut by_identity: HashMap<String, String> = HashMap::new();
    // Lowercased path -> (object name, path) of its owner.
    let mut claimed: HashMap<String, (String, String)> = HashMap::new();

    for (id, record) in registry.records() {
        let object_name = record.object_name();
        let identity = match record.overload {
            Some(ref tag) => format!("{}({})", record.identity, tag),
            None => record.identity.clone(),
        };

        if let Some(path) = by_identity.get(&identity) {
            tracing::debug!(entity = %object_name, target = %path, "re-export; linking to first definition");
            plan.links.insert(object_name, path.clone())?;
            if record.overload.is_some() {
                plan.links.insert_bare(&record.qualified_name, path);
            }
            continue;
        }

        let path = page_path(
            &record.output_dir,
            &record.qualified_name,
            record.overload.as_deref(),
            class_page_suffix && record.kind == EntityKind::Class,
        );
        let folded = path.to_lowercase();
        if let Some((first, first_path)) = claimed.get(&folded) {
            return Err(ApigenError::PathCollision {
                first: first.clone(),
                first_path: first_path.clone(),
                second: object_name,
                second_path: path,
            });
        }
        claimed.insert(folded, (object_name.clone(), path.clone()));
        by_identity.insert(identity, path.clone());

        plan.links.insert(object_name.clone(), path.clone())?;
        if record.overload.is_some() {
            plan.links.insert_bare(&record.qualified_name, &path);
        }
        plan.pages.push(PagePlan {
            path,
            title: object_name,
            entity: id,
        });
    }

    tracing::debug!(pages = plan.pages.len(), links = plan.links.len(), "planned");
    Ok(plan)
}
