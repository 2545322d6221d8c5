//! Signature normalizer: turns one inventory member into display-ready
//! records, one per overload.

use crate::docstring::{self, Overload, SignatureLine};
use crate::error::{ApigenError, Result};
use crate::inventory::{Inventory, Member, MemberKind};
use crate::model::EntityKind;
use crate::registry::validate_overload_id;
use crate::signature::{parse_params, Brackets, DisplaySignature, RawSignature};
use regex::Regex;
use std::collections::HashMap;

/// Accessor consulted for subscript-method parameters.
const GETITEM: &str = "__getitem__";
/// Helper method documented as an extra `<property>.__setitem__` entity.
pub const SETITEM: &str = "__setitem__";

/// Where a member lives.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub module: &'a str,
    /// Name of the enclosing class, for class members.
    pub class: Option<&'a str>,
}

/// Normalized documentation of one entity or overload.
#[derive(Debug, Clone)]
pub struct Normalized<'a> {
    pub kind: EntityKind,
    pub signature: String,
    pub summary_signature: String,
    pub short: String,
    pub long: String,
    pub overload: Option<String>,
    pub group: Option<String>,
    /// Resolved helper class of a subscript method.
    pub helper: Option<&'a Member>,
}

pub struct Normalizer<'a> {
    inventory: &'a Inventory,
    /// Anchored subscript-method type pattern.
    pattern: &'a Regex,
    column_limit: usize,
}

impl<'a> Normalizer<'a> {
    pub fn new(inventory: &'a Inventory, pattern: &'a Regex, column_limit: usize) -> Self {
        Self {
            inventory,
            pattern,
            column_limit,
        }
    }

    /// Normalize `member`, splitting overloaded documentation.
    ///
    /// A subscript method is documented by its helper's `__getitem__`; the
    /// property's own text is used only when the accessor has none.
    ///
    /// Fails when the overloaded text is malformed or an overload id is
    /// invalid or repeated.
    pub fn normalize(
        &self,
        qualified: &str,
        scope: Scope<'_>,
        member: &'a Member,
    ) -> Result<Vec<Normalized<'a>>> {
        let source = self.subscript_accessor(scope, member).unwrap_or(member);
        let doc = source.doc.as_deref().unwrap_or("");
        let overloads = docstring::split_overloads(qualified, doc)?;
        check_tags(qualified, &overloads)?;

        let mut out = Vec::with_capacity(overloads.len());
        for overload in overloads {
            if overload.implicit_tag {
                tracing::warn!(
                    entity = qualified,
                    overload = overload.tag.as_deref().unwrap_or_default(),
                    "unspecified overload id; using its position"
                );
            }
            out.push(self.normalize_one(scope, member, overload));
        }
        Ok(out)
    }

    /// Normalize a helper's `__setitem__`, displayed as
    /// `property[params] = value`.
    pub fn normalize_setitem(&self, property: &str, setter: &'a Member) -> Normalized<'a> {
        let parsed = docstring::parse(setter.doc.as_deref().unwrap_or(""), &[SETITEM]);
        let mut params = match parsed.signature {
            Some(SignatureLine {
                params: Some(ref p),
                ..
            }) => parse_params(p),
            _ => introspected(setter).without_receiver().params.unwrap_or_default(),
        };
        let value = params.pop();
        let display = DisplaySignature {
            name: property.to_string(),
            params: Some(params),
            brackets: Brackets::Subscript,
            ret: None,
        };
        let with_value = |text: String| match value {
            Some(ref v) => format!("{} = {}", text, v.name),
            None => text,
        };
        Normalized {
            kind: EntityKind::Method,
            signature: with_value(display.render()),
            summary_signature: with_value(display.abbreviate(self.column_limit)),
            short: parsed.short,
            long: parsed.long,
            overload: None,
            group: parsed.group,
            helper: None,
        }
    }

    /// The documented `__getitem__` of a subscript method's helper class.
    pub fn subscript_accessor(&self, scope: Scope<'_>, member: &Member) -> Option<&'a Member> {
        self.subscript_helper(scope, member)?
            .member(GETITEM)
            .filter(|getter| getter.has_doc())
    }

    /// Helper class of a property whose type matches the subscript pattern.
    fn subscript_helper(&self, scope: Scope<'_>, member: &Member) -> Option<&'a Member> {
        let ty = property_type(member).filter(|ty| self.pattern.is_match(ty))?;
        self.inventory.resolve_class(scope.module, &ty)
    }

    fn normalize_one(&self, scope: Scope<'_>, member: &'a Member, overload: Overload) -> Normalized<'a> {
        let mut names = vec![member.name.as_str()];
        if member.kind == MemberKind::Property {
            names.push(GETITEM);
        }
        let parsed = docstring::parse(&overload.doc, &names);

        let (kind, display, helper) = match member.kind {
            MemberKind::Class => (EntityKind::Class, class_display(member, parsed.signature.as_ref()), None),
            MemberKind::Property => self.property_display(scope, member, parsed.signature.as_ref()),
            MemberKind::Function | MemberKind::Attribute => (
                EntityKind::Function,
                callable_display(&member.name, member, parsed.signature.as_ref(), false),
                None,
            ),
            MemberKind::Method => (
                EntityKind::Method,
                special_display(scope, member, parsed.signature.as_ref()),
                None,
            ),
        };

        Normalized {
            kind,
            signature: display.render(),
            summary_signature: display.abbreviate(self.column_limit),
            short: parsed.short,
            long: parsed.long,
            overload: overload.tag,
            group: parsed.group,
            helper,
        }
    }

    /// Properties whose type matches the subscript pattern render with the
    /// helper's `__getitem__` parameters; all others render as `name: type`.
    ///
    /// `line` comes from the text being normalized, which for a subscript
    /// method may be one overload of the accessor's documentation.
    fn property_display(
        &self,
        scope: Scope<'_>,
        member: &'a Member,
        line: Option<&SignatureLine>,
    ) -> (EntityKind, DisplaySignature, Option<&'a Member>) {
        let annotation = property_type(member);

        if let Some(ty) = annotation.as_deref().filter(|ty| self.pattern.is_match(ty)) {
            let helper = self.inventory.resolve_class(scope.module, ty);
            let getter = helper.and_then(|h| h.member(GETITEM));
            let from_accessor_line = line
                .filter(|l| !l.subscript && last_segment(&l.name) == GETITEM)
                .and_then(|l| {
                    l.params.as_deref().map(|p| {
                        RawSignature {
                            params: Some(parse_params(p)),
                            ret: l.ret.clone(),
                        }
                        .without_receiver()
                    })
                });
            let from_brackets = line
                .filter(|l| l.subscript)
                .and_then(|l| l.params.as_deref())
                .map(|p| RawSignature {
                    params: Some(parse_params(p)),
                    ret: None,
                });
            let raw = from_accessor_line
                .or_else(|| getter.map(accessor_signature))
                .or(from_brackets);
            if let Some(raw) = raw {
                tracing::debug!(property = %member.name, helper = %ty, "subscript method");
                let display = DisplaySignature {
                    name: member.name.clone(),
                    params: raw.params.or_else(|| Some(Vec::new())),
                    brackets: Brackets::Subscript,
                    ret: raw.ret,
                };
                // Only an accessor found in the inventory counts as a helper.
                let helper = helper.filter(|_| getter.is_some());
                return (EntityKind::SubscriptMethod, display, helper);
            }
        }

        let display = DisplaySignature {
            name: member.name.clone(),
            params: None,
            brackets: Brackets::Call,
            ret: annotation,
        };
        (EntityKind::Property, display, None)
    }
}

/// Declared type of a property: a `name -> type` first line of its own
/// documentation, else its introspected return annotation.
fn property_type(member: &Member) -> Option<String> {
    if member.kind != MemberKind::Property {
        return None;
    }
    docstring::parse(member.doc.as_deref().unwrap_or(""), &[member.name.as_str()])
        .signature
        .and_then(|line| line.ret)
        .or_else(|| member.return_annotation.clone())
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Overload ids end up in page paths: each must be path-safe and unique.
fn check_tags(qualified: &str, overloads: &[Overload]) -> Result<()> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, overload) in overloads.iter().enumerate() {
        let Some(ref tag) = overload.tag else {
            continue;
        };
        validate_overload_id(qualified, tag)?;
        if let Some(first) = seen.insert(tag.as_str(), i + 1) {
            return Err(ApigenError::DuplicateOverload {
                entity: qualified.to_string(),
                overload: tag.clone(),
                first,
                second: i + 1,
            });
        }
    }
    Ok(())
}

fn class_display(member: &Member, line: Option<&SignatureLine>) -> DisplaySignature {
    let params = match line.and_then(|l| l.params.as_deref()) {
        Some(p) => Some(parse_params(p)),
        None => member
            .signature
            .as_deref()
            .and_then(|s| RawSignature::parse(s).without_receiver().params),
    };
    DisplaySignature {
        name: member.name.clone(),
        params,
        brackets: Brackets::Call,
        ret: None,
    }
}

fn introspected(member: &Member) -> RawSignature {
    member
        .signature
        .as_deref()
        .map(RawSignature::parse)
        .unwrap_or_default()
}

/// Signature of a helper's `__getitem__`, preferring its own override line.
fn accessor_signature(getter: &Member) -> RawSignature {
    let parsed = docstring::parse(getter.doc.as_deref().unwrap_or(""), &[GETITEM]);
    match parsed.signature {
        Some(SignatureLine {
            params: Some(p),
            ret,
            ..
        }) => RawSignature {
            params: Some(parse_params(&p)),
            ret,
        }
        .without_receiver(),
        _ => introspected(getter).without_receiver(),
    }
}

fn callable_display(
    name: &str,
    member: &Member,
    line: Option<&SignatureLine>,
    strip_receiver: bool,
) -> DisplaySignature {
    let mut raw = introspected(member);
    if let Some(line) = line {
        if let Some(ref p) = line.params {
            raw.params = Some(parse_params(p));
        }
        if line.ret.is_some() {
            raw.ret = line.ret.clone();
        }
    }
    if strip_receiver {
        raw = raw.without_receiver();
    }
    DisplaySignature {
        name: name.to_string(),
        params: raw.params,
        brackets: Brackets::Call,
        ret: raw.ret,
    }
}

/// Methods, with constructors and `__class_getitem__` shown as the class.
fn special_display(scope: Scope<'_>, member: &Member, line: Option<&SignatureLine>) -> DisplaySignature {
    let class = scope.class.unwrap_or(&member.name);
    match member.name.as_str() {
        "__init__" | "__new__" => {
            let display = callable_display(class, member, line, true);
            DisplaySignature {
                params: Some(display.params.unwrap_or_default()),
                ret: None,
                ..display
            }
        }
        "__class_getitem__" => DisplaySignature {
            brackets: Brackets::Subscript,
            ret: None,
            ..callable_display(class, member, line, true)
        },
        _ => callable_display(&member.name, member, line, true),
    }
}
