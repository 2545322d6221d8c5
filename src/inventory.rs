//! Introspected module inventory: the input surface of a documentation run.
//!
//! The inventory is produced by an external introspection dump and lists every
//! module, class and member in declaration order.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub modules: Vec<ModuleItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModuleItem {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    /// Explicit export list. When absent every member is exported.
    #[serde(default)]
    pub all: Option<Vec<String>>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Function,
    Class,
    Method,
    Property,
    Attribute,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    /// Raw introspected signature, e.g. `(self, a: int) -> int`.
    #[serde(default)]
    pub signature: Option<String>,
    /// Return annotation of a property getter.
    #[serde(default)]
    pub return_annotation: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    /// Fully qualified definition site, when the member is re-exported.
    #[serde(default)]
    pub defined_in: Option<String>,
    /// Member explicitly set to none (e.g. `__hash__ = None`).
    #[serde(default)]
    pub is_none: bool,
    /// Class members; empty for everything else.
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Member {
    pub fn has_doc(&self) -> bool {
        self.doc.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl Inventory {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleItem> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Look up a class by dotted path.
    ///
    /// `path` is tried relative to `module` first (`Arr._Vindex` inside `m`),
    /// then as an absolute path whose prefix names a module
    /// (`m.Arr._Vindex`).
    pub fn resolve_class(&self, module: &str, path: &str) -> Option<&Member> {
        if let Some(found) = self
            .module(module)
            .and_then(|m| find_in(&m.members, path))
        {
            return Some(found);
        }
        // Longest module prefix first, so nested packages win over parents.
        let mut candidates: Vec<&ModuleItem> = self
            .modules
            .iter()
            .filter(|m| path.starts_with(&format!("{}.", m.name)))
            .collect();
        candidates.sort_by(|a, b| b.name.len().cmp(&a.name.len()));
        candidates
            .into_iter()
            .find_map(|m| find_in(&m.members, &path[m.name.len() + 1..]))
    }
}

fn find_in<'a>(members: &'a [Member], path: &str) -> Option<&'a Member> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = members
        .iter()
        .find(|m| m.name == first && m.kind == MemberKind::Class)?;
    for part in parts {
        current = current
            .members
            .iter()
            .find(|m| m.name == part && m.kind == MemberKind::Class)?;
    }
    Some(current)
}
