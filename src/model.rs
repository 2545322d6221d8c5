//! Format-agnostic data model shared by the pipeline stages.

use std::fmt;

/// Kind of a documented entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Function,
    Class,
    Method,
    Property,
    SubscriptMethod,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Class => "class",
            EntityKind::Method => "method",
            EntityKind::Property => "property",
            EntityKind::SubscriptMethod => "subscript-method",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of an [`EntityRecord`] inside the registry arena.
pub type EntityId = usize;

/// One documentable unit (or one overload of it).
#[derive(Debug, Clone)]
pub struct EntityRecord {
    /// e.g. `m.Arr.vindex`
    pub qualified_name: String,
    /// Member name within its container, e.g. `vindex`
    pub name: String,
    pub kind: EntityKind,
    pub group: String,
    pub short_description: String,
    pub long_description: String,
    /// Display signature without the container prefix, e.g. `vindex[sel: Selection]`
    pub signature: String,
    /// Signature shortened for summaries.
    pub summary_signature: String,
    pub overload: Option<String>,
    /// Qualified name of the owning module or class.
    pub container: String,
    /// Dotted prefix shown before the signature on standalone pages; differs
    /// from `container` for constructors, which display as the class itself.
    pub scope: String,
    /// Module the entity was discovered in.
    pub module: String,
    /// Definition site used to detect re-exports of one identity.
    pub identity: String,
    /// Configured output directory of the owning module.
    pub output_dir: String,
}

impl EntityRecord {
    /// Link-table key: qualified name, plus `(tag)` for overloads.
    pub fn object_name(&self) -> String {
        match self.overload {
            Some(ref tag) => format!("{}({})", self.qualified_name, tag),
            None => self.qualified_name.clone(),
        }
    }

    /// Link text in summaries: the displayed name, plus `(tag)` for
    /// overloads so they stay distinguishable.
    pub fn toc_title(&self) -> String {
        let name = display_name(&self.summary_signature);
        match self.overload {
            Some(ref tag) => format!("{}({})", name, tag),
            None => name.to_string(),
        }
    }

    /// Signature prefixed with its container, for standalone pages.
    pub fn qualified_signature(&self) -> String {
        if self.scope.is_empty() {
            return self.signature.clone();
        }
        format!("{}.{}", self.scope, self.signature)
    }
}

/// Name part of a display signature (`vindex[sel]` -> `vindex`).
pub fn display_name(signature: &str) -> &str {
    let end = signature
        .find(['(', '[', ':', ' '])
        .unwrap_or(signature.len());
    &signature[..end]
}

/// (container, group) pair identifying one summary block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub container: String,
    pub group: String,
}

impl GroupKey {
    pub fn new(container: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            group: group.into(),
        }
    }
}

/// A planned standalone page, before rendering.
#[derive(Debug, Clone)]
pub struct PagePlan {
    /// Output path without extension, e.g. `api/m.add`
    pub path: String,
    pub title: String,
    pub entity: EntityId,
}

/// A rendered page ready to be written.
#[derive(Debug, Clone)]
pub struct PageSpec {
    /// Output path without extension
    pub path: String,
    pub title: String,
    pub body: String,
}

/// A group summary requested from an authored page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub container: String,
    pub group: String,
}

/// One line of a summary block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFragment {
    /// Display name the signature starts with
    pub name: String,
    /// Link text: the name, plus the overload id for overloads
    pub label: String,
    /// Abbreviated signature
    pub signature: String,
    pub short_description: String,
    /// Page path (without extension) the name links to
    pub target: String,
    pub entity: EntityId,
}

impl SummaryFragment {
    /// Signature text following the linked name.
    pub fn rest(&self) -> &str {
        self.signature.get(self.name.len()..).unwrap_or("")
    }
}

/// A resolved summary block.
#[derive(Debug, Clone)]
pub struct SummaryBlock {
    pub container: String,
    pub group: String,
    pub fragments: Vec<SummaryFragment>,
}
