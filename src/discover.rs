//! Entity discovery: walks a module's exported namespace and the namespaces
//! of its exported classes, one level deep.

use crate::config::ModuleSpec;
use crate::error::Result;
use crate::inventory::{Inventory, Member, MemberKind, ModuleItem};
use crate::model::{EntityKind, EntityRecord};
use crate::normalize::{Normalized, Normalizer, Scope, SETITEM};
use crate::registry::{validate_group_name, GroupRules, RegistryBuilder};

/// Special members that are never documented.
const EXCLUDED_SPECIAL_MEMBERS: &[&str] = &[
    "__module__",
    "__abstractmethods__",
    "__dict__",
    "__weakref__",
    "__class__",
    "__base__",
    "__getstate__",
    "__setstate__",
];

/// Members skipped when explicitly set to none.
const NONE_SENSITIVE_MEMBERS: &[&str] = &["__hash__", "__iter__"];

/// Interpreter-provided constructor documentation.
const DEFAULT_INIT_DOC: &str = "Initialize self. ";

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Why a member is silently left out, if it is. `documented` also counts
/// documentation carried by a subscript method's accessor.
fn skip_reason(member: &Member, documented: bool) -> Option<&'static str> {
    let name = member.name.as_str();
    if member.kind == MemberKind::Attribute {
        return Some("attribute");
    }
    if member.is_none && NONE_SENSITIVE_MEMBERS.contains(&name) {
        return Some("set to none");
    }
    if name.starts_with('_') && !is_dunder(name) {
        return Some("private");
    }
    if EXCLUDED_SPECIAL_MEMBERS.contains(&name) {
        return Some("excluded special member");
    }
    if !documented {
        return Some("undocumented");
    }
    if name == "__init__"
        && member
            .doc
            .as_deref()
            .is_some_and(|d| d.trim_start().starts_with(DEFAULT_INIT_DOC))
    {
        return Some("default constructor doc");
    }
    None
}

/// Where discovered records of one member go.
struct Placement<'s> {
    qualified: String,
    container: &'s str,
    scope: &'s str,
    identity: String,
}

pub struct Discoverer<'a> {
    inventory: &'a Inventory,
    normalizer: Normalizer<'a>,
    rules: &'a GroupRules,
}

impl<'a> Discoverer<'a> {
    pub fn new(inventory: &'a Inventory, normalizer: Normalizer<'a>, rules: &'a GroupRules) -> Self {
        Self {
            inventory,
            normalizer,
            rules,
        }
    }

    /// Register every documented entity of `spec`'s module as one registry
    /// pass. Returns the number of records registered.
    pub fn discover(&self, spec: &ModuleSpec, builder: &mut RegistryBuilder) -> Result<usize> {
        let Some(module) = self.inventory.module(&spec.name) else {
            tracing::warn!(module = %spec.name, "module not found in inventory; skipping");
            return Ok(0);
        };
        builder.begin_pass(&module.name)?;
        let before = builder.len();

        let scope = Scope {
            module: &module.name,
            class: None,
        };
        for member in exported(module) {
            if let Some(reason) = self.skip(scope, member) {
                tracing::debug!(entity = %format!("{}.{}", module.name, member.name), reason, "skipped");
                continue;
            }
            let placement = Placement {
                qualified: format!("{}.{}", module.name, member.name),
                container: &module.name,
                scope: &module.name,
                identity: member
                    .defined_in
                    .clone()
                    .unwrap_or_else(|| format!("{}.{}", module.name, member.name)),
            };
            self.register_member(spec, scope, &placement, member, builder)?;

            if member.kind == MemberKind::Class {
                self.discover_class(spec, module, member, &placement, builder)?;
            }
        }

        let count = builder.len() - before;
        tracing::debug!(module = %module.name, count, "module discovered");
        Ok(count)
    }

    fn discover_class(
        &self,
        spec: &ModuleSpec,
        module: &ModuleItem,
        class: &'a Member,
        class_placement: &Placement<'_>,
        builder: &mut RegistryBuilder,
    ) -> Result<()> {
        let container = class_placement.qualified.as_str();
        let scope = Scope {
            module: &module.name,
            class: Some(&class.name),
        };
        for child in &class.members {
            if let Some(reason) = self.skip(scope, child) {
                tracing::debug!(entity = %format!("{}.{}", container, child.name), reason, "skipped");
                continue;
            }
            // Constructors display as the class itself.
            let shown_in = match child.name.as_str() {
                "__init__" | "__new__" | "__class_getitem__" => module.name.as_str(),
                _ => container,
            };
            let placement = Placement {
                qualified: format!("{}.{}", container, child.name),
                container,
                scope: shown_in,
                identity: child
                    .defined_in
                    .clone()
                    .unwrap_or_else(|| format!("{}.{}", class_placement.identity, child.name)),
            };
            self.register_member(spec, scope, &placement, child, builder)?;
        }
        Ok(())
    }

    fn skip(&self, scope: Scope<'_>, member: &Member) -> Option<&'static str> {
        let documented = member.has_doc()
            || (member.kind == MemberKind::Property
                && self.normalizer.subscript_accessor(scope, member).is_some());
        skip_reason(member, documented)
    }

    fn register_member(
        &self,
        spec: &ModuleSpec,
        scope: Scope<'_>,
        placement: &Placement<'_>,
        member: &'a Member,
        builder: &mut RegistryBuilder,
    ) -> Result<()> {
        for (i, normalized) in self
            .normalizer
            .normalize(&placement.qualified, scope, member)?
            .into_iter()
            .enumerate()
        {
            let group = self.group_for(&placement.qualified, &member.name, &normalized)?;
            // One setter entity per property, whatever the accessor's overloads.
            let setter = normalized
                .helper
                .filter(|_| i == 0 && normalized.kind == EntityKind::SubscriptMethod)
                .and_then(|h| h.member(SETITEM))
                .filter(|s| s.has_doc());

            builder.register(record(spec, scope, placement, &member.name, normalized, group.clone()))?;

            if let Some(setter) = setter {
                let setitem = self.normalizer.normalize_setitem(&member.name, setter);
                let name = format!("{}.{}", member.name, SETITEM);
                let setter_placement = Placement {
                    qualified: format!("{}.{}", placement.qualified, SETITEM),
                    container: placement.container,
                    scope: placement.scope,
                    identity: format!("{}.{}", placement.identity, SETITEM),
                };
                let group = match setitem.group {
                    Some(ref g) => {
                        validate_group_name(&setter_placement.qualified, g)?;
                        g.clone()
                    }
                    None => group,
                };
                builder.register(record(spec, scope, &setter_placement, &name, setitem, group))?;
            }
        }
        Ok(())
    }

    fn group_for(&self, qualified: &str, name: &str, normalized: &Normalized<'_>) -> Result<String> {
        match normalized.group {
            Some(ref group) => {
                validate_group_name(qualified, group)?;
                Ok(group.clone())
            }
            None => Ok(self.rules.default_group(name, normalized.kind)),
        }
    }
}

fn record(
    spec: &ModuleSpec,
    scope: Scope<'_>,
    placement: &Placement<'_>,
    name: &str,
    normalized: Normalized<'_>,
    group: String,
) -> EntityRecord {
    EntityRecord {
        qualified_name: placement.qualified.clone(),
        name: name.to_string(),
        kind: normalized.kind,
        group,
        short_description: normalized.short,
        long_description: normalized.long,
        signature: normalized.signature,
        summary_signature: normalized.summary_signature,
        overload: normalized.overload,
        container: placement.container.to_string(),
        scope: placement.scope.to_string(),
        module: scope.module.to_string(),
        identity: placement.identity.clone(),
        output_dir: spec.output.clone(),
    }
}

/// Exported members: the `all` list in its order when present, else every
/// member in declaration order.
fn exported(module: &ModuleItem) -> Vec<&Member> {
    match module.all {
        Some(ref names) => names
            .iter()
            .filter_map(|name| {
                let found = module.members.iter().find(|m| &m.name == name);
                if found.is_none() {
                    tracing::debug!(module = %module.name, name = %name, "exported name has no inventory entry");
                }
                found
            })
            .collect(),
        None => module.members.iter().collect(),
    }
}
