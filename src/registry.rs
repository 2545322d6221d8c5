//! Group registry: (container, group) -> entities in discovery order.
//!
//! Entities are registered into a [`RegistryBuilder`], one pass per module,
//! then frozen into an immutable [`GroupRegistry`] that the planner and the
//! summary assembler read from.

use crate::error::{ApigenError, Result};
use crate::model::{EntityId, EntityKind, EntityRecord, GroupKey};
use std::collections::HashMap;

/// Characters that may not appear in a group name or overload id.
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

fn is_unsafe_fragment(text: &str) -> bool {
    text.trim().is_empty()
        || text
            .chars()
            .any(|c| c.is_control() || RESERVED_CHARS.contains(&c))
}

/// Reject group names that cannot be used as anchors or path fragments.
pub fn validate_group_name(entity: &str, group: &str) -> Result<()> {
    if is_unsafe_fragment(group) {
        return Err(ApigenError::InvalidGroupName {
            entity: entity.to_string(),
            group: group.to_string(),
        });
    }
    Ok(())
}

/// Reject overload ids that cannot be appended to a page path.
pub fn validate_overload_id(entity: &str, overload: &str) -> Result<()> {
    if is_unsafe_fragment(overload) || overload.starts_with('.') || overload.contains("..") {
        return Err(ApigenError::InvalidOverloadId {
            entity: entity.to_string(),
            overload: overload.to_string(),
        });
    }
    Ok(())
}

// -- Default group rules -------------------------------------------------------

enum Rule {
    Names(&'static [&'static str]),
    Kind(EntityKind),
    Dunder,
    Underscore,
    Any,
}

impl Rule {
    fn matches(&self, name: &str, kind: EntityKind) -> bool {
        match self {
            Rule::Names(names) => names.contains(&name),
            Rule::Kind(k) => *k == kind,
            Rule::Dunder => name.len() > 4 && name.starts_with("__") && name.ends_with("__"),
            Rule::Underscore => name.starts_with('_'),
            Rule::Any => true,
        }
    }
}

/// Ordered; the first matching rule names the group.
const DEFAULT_RULES: &[(Rule, &str)] = &[
    (
        Rule::Names(&["__init__", "__new__", "__class_getitem__"]),
        "Constructors",
    ),
    (
        Rule::Names(&["__eq__", "__ne__", "__lt__", "__le__", "__gt__", "__ge__"]),
        "Comparison operators",
    ),
    (Rule::Names(&["__str__", "__repr__"]), "String representation"),
    (Rule::Kind(EntityKind::Class), "Classes"),
    (Rule::Dunder, "Special members"),
    (Rule::Underscore, "Private members"),
    (Rule::Any, "Public members"),
];

/// Default group assignment: configured per-name overrides, then the rule
/// table.
#[derive(Debug, Clone, Default)]
pub struct GroupRules {
    overrides: Vec<(String, String)>,
}

impl GroupRules {
    pub fn new(overrides: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            overrides: overrides.into_iter().collect(),
        }
    }

    pub fn default_group(&self, name: &str, kind: EntityKind) -> String {
        if let Some((_, group)) = self.overrides.iter().find(|(n, _)| n == name) {
            return group.clone();
        }
        DEFAULT_RULES
            .iter()
            .find(|(rule, _)| rule.matches(name, kind))
            .map(|(_, group)| group.to_string())
            .unwrap_or_else(|| "Public members".to_string())
    }
}

// -- Builder -------------------------------------------------------------------

struct Group {
    key: GroupKey,
    /// Module whose pass created the group.
    owner: String,
    members: Vec<EntityId>,
}

/// Append-only registration, one pass per module.
#[derive(Default)]
pub struct RegistryBuilder {
    records: Vec<EntityRecord>,
    groups: Vec<Group>,
    index: HashMap<GroupKey, usize>,
    /// Qualified name -> overload ids registered under it, in order.
    overloads: HashMap<String, Vec<Option<String>>>,
    passes: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start registering entities for `module`.
    pub fn begin_pass(&mut self, module: &str) -> Result<()> {
        if self.passes.iter().any(|m| m == module) {
            return Err(ApigenError::DuplicateModule {
                module: module.to_string(),
            });
        }
        self.passes.push(module.to_string());
        Ok(())
    }

    fn current_pass(&self) -> &str {
        self.passes.last().map(String::as_str).unwrap_or_default()
    }

    /// Register a record under its (container, group) key.
    ///
    /// Records sharing a qualified name must all carry distinct overload ids.
    pub fn register(&mut self, record: EntityRecord) -> Result<EntityId> {
        let seen = self.overloads.entry(record.qualified_name.clone()).or_default();
        if let Some(first) = seen.iter().position(|tag| *tag == record.overload) {
            return Err(match record.overload {
                Some(overload) => ApigenError::DuplicateOverload {
                    entity: record.qualified_name,
                    overload,
                    first: first + 1,
                    second: seen.len() + 1,
                },
                None => ApigenError::DuplicateEntity {
                    entity: record.qualified_name,
                },
            });
        }
        if seen
            .first()
            .is_some_and(|tag| tag.is_some() != record.overload.is_some())
        {
            return Err(ApigenError::MixedOverloads {
                entity: record.qualified_name,
            });
        }
        seen.push(record.overload.clone());

        let key = GroupKey::new(record.container.clone(), record.group.clone());
        let pass = self.current_pass().to_string();
        let slot = match self.index.get(&key) {
            Some(&slot) => {
                let owner = &self.groups[slot].owner;
                if *owner != pass {
                    return Err(ApigenError::GroupReopened {
                        container: key.container,
                        group: key.group,
                        owner: owner.clone(),
                        module: pass,
                    });
                }
                slot
            }
            None => {
                self.groups.push(Group {
                    key: key.clone(),
                    owner: pass,
                    members: Vec::new(),
                });
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        let id = self.records.len();
        tracing::debug!(
            entity = %record.object_name(),
            group = %record.group,
            container = %record.container,
            "registered"
        );
        self.records.push(record);
        self.groups[slot].members.push(id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn finish(self) -> GroupRegistry {
        GroupRegistry {
            records: self.records,
            groups: self
                .groups
                .into_iter()
                .map(|g| (g.key, g.members))
                .collect(),
            index: self.index,
        }
    }
}

// -- Frozen registry -----------------------------------------------------------

/// Immutable view of every registered entity and group.
#[derive(Debug)]
pub struct GroupRegistry {
    records: Vec<EntityRecord>,
    groups: Vec<(GroupKey, Vec<EntityId>)>,
    index: HashMap<GroupKey, usize>,
}

impl GroupRegistry {
    pub fn record(&self, id: EntityId) -> &EntityRecord {
        &self.records[id]
    }

    pub fn records(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.records.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Entities of one group in registration order.
    pub fn lookup(&self, container: &str, group: &str) -> &[EntityId] {
        self.index
            .get(&GroupKey::new(container, group))
            .map(|&slot| self.groups[slot].1.as_slice())
            .unwrap_or(&[])
    }

    /// Groups of `container` in order of first registration.
    pub fn groups_of<'a>(&'a self, container: &'a str) -> impl Iterator<Item = (&'a str, &'a [EntityId])> {
        self.groups
            .iter()
            .filter(move |(key, _)| key.container == container)
            .map(|(key, ids)| (key.group.as_str(), ids.as_slice()))
    }
}
