//! Documentation-text parsing: fields, overload splitting, signature override
//! lines and short/long description extraction.
//!
//! Recognized conventions:
//!
//! - A `Group:` field (blank line, `Group:`, one indented value line) names the
//!   entity's summary group.
//! - An `Overload:` field in the same shape names one overload.
//! - A docstring starting with `name(...)` followed by `Overloaded function.`
//!   holds several numbered overloads (`1. name(...)`, `2. name(...)`, ...).
//! - A first line of the form `name(params) -> ret`, `name[params]` or
//!   `name -> ret` overrides the introspected signature.

use crate::error::{ApigenError, Result};
use regex::Regex;
use std::sync::LazyLock;

static RE_OVERLOADED_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^(\n]+)\([^\n]*\nOverloaded function\.\n").unwrap());

static RE_SIGNATURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][\w.]*)\s*(\(.*\)|\[.*\])?\s*(?:->\s*(.+?))?\s*$").unwrap()
});

/// Field names recognized in documentation text.
pub const GROUP_FIELD: &str = "Group";
pub const OVERLOAD_FIELD: &str = "Overload";

/// Documentation text of one overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    pub doc: String,
    /// Explicit or positional overload id; `None` when the callable is not
    /// overloaded and carries no `Overload:` field.
    pub tag: Option<String>,
    /// True when the id was assigned positionally rather than written down.
    pub implicit_tag: bool,
}

/// A textual signature override parsed from a first documentation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureLine {
    pub name: String,
    /// Parameter text without the enclosing brackets.
    pub params: Option<String>,
    /// Whether the parameters were written with `[...]`.
    pub subscript: bool,
    pub ret: Option<String>,
}

/// Parsed documentation of one entity (or one overload).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDoc {
    pub signature: Option<SignatureLine>,
    pub group: Option<String>,
    pub short: String,
    pub long: String,
}

/// Normalize indentation like a docstring cleaner: the first line is
/// stripped on the left, the common indentation of the remaining lines is
/// removed, and leading/trailing blank lines are dropped.
pub fn clean(doc: &str) -> String {
    let doc = doc.replace("\r\n", "\n").replace('\t', "        ");
    let lines: Vec<&str> = doc.split('\n').collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            out.push(line.trim().to_string());
        } else {
            out.push(strip_indent(line, indent).trim_end().to_string());
        }
    }

    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Drop up to `indent` leading whitespace characters.
fn strip_indent(line: &str, indent: usize) -> &str {
    let mut rest = line;
    for _ in 0..indent {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if c.is_whitespace() => rest = chars.as_str(),
            _ => break,
        }
    }
    rest
}

/// Remove a `Field:` block from `doc`, returning the remaining text and the
/// field value.
///
/// The field must be preceded by a blank line and consist of the field name
/// followed by exactly one indented value line.
pub fn extract_field(doc: &str, field: &str) -> (String, Option<String>) {
    let pattern = format!(
        r"\n[ \t]*\n[ \t]*{}:[ \t]*\n[ \t]+([^\n]+)\n",
        regex::escape(field)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return (doc.to_string(), None);
    };
    // Pad so a field at the very start or end still has its delimiters.
    let padded = format!("\n\n{}\n", doc);
    match re.captures(&padded) {
        Some(caps) => {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let value = caps[1].trim().to_string();
            let rest = format!("{}\n\n{}", &padded[..whole.start], &padded[whole.end..]);
            (rest.trim_matches('\n').to_string(), Some(value))
        }
        None => (doc.to_string(), None),
    }
}

/// Split a possibly-overloaded docstring into its overloads.
///
/// Non-overloaded docs produce a single overload whose tag comes from an
/// optional `Overload:` field.
pub fn split_overloads(entity: &str, doc: &str) -> Result<Vec<Overload>> {
    let doc = clean(doc);
    let Some(caps) = RE_OVERLOADED_HEADER.captures(&doc) else {
        let (doc, tag) = extract_field(&doc, OVERLOAD_FIELD);
        return Ok(vec![Overload {
            doc,
            tag,
            implicit_tag: false,
        }]);
    };

    let display_name = caps[1].trim().to_string();
    let header_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
    let prefix_for = |i: usize| format!("\n{}. {}(", i, display_name);

    // Keep the newline that ends the header so every part starts with "\n".
    let mut rest: &str = &doc[header_end - 1..];
    let mut parts = Vec::new();
    let mut index = 1;

    while !rest.trim().is_empty() {
        let prefix = prefix_for(index);
        let Some(stripped) = rest.trim_start_matches('\n').strip_prefix(&prefix[1..]) else {
            return Err(ApigenError::MalformedOverloads {
                entity: entity.to_string(),
                expected: prefix.trim_start().to_string(),
            });
        };
        // `stripped` begins right after the opening parenthesis.
        let (part_sig, body) = match stripped.find('\n') {
            Some(nl) => (&stripped[..nl], &stripped[nl + 1..]),
            None => (stripped, ""),
        };
        index += 1;
        let next = prefix_for(index);
        let (part, remaining) = match body.find(&next) {
            Some(end) => (&body[..end], &body[end..]),
            None => (body, ""),
        };
        rest = remaining;

        let part = clean(part);
        let (part, tag) = extract_field(&part, OVERLOAD_FIELD);
        let implicit_tag = tag.is_none();
        let tag = tag.unwrap_or_else(|| (index - 1).to_string());
        parts.push(Overload {
            doc: format!("{}({}\n\n{}", display_name, part_sig, part)
                .trim_end()
                .to_string(),
            tag: Some(tag),
            implicit_tag,
        });
    }

    Ok(parts)
}

/// Parse a textual signature line such as `vindex[sel: Selection]` or
/// `add(a, b) -> int`. Lines with neither parameters nor a return
/// annotation are not signatures.
pub fn parse_signature_line(line: &str) -> Option<SignatureLine> {
    let caps = RE_SIGNATURE_LINE.captures(line)?;
    let bracketed = caps.get(2).map(|m| m.as_str());
    let ret = caps.get(3).map(|m| m.as_str().trim().to_string());
    if bracketed.is_none() && ret.is_none() {
        return None;
    }
    let (params, subscript) = match bracketed {
        Some(text) => (
            Some(text[1..text.len() - 1].trim().to_string()),
            text.starts_with('['),
        ),
        None => (None, false),
    };
    Some(SignatureLine {
        name: caps[1].to_string(),
        params,
        subscript,
        ret,
    })
}

/// Parse documentation text into override signature, group and descriptions.
///
/// The first line is treated as a signature override only when its name's
/// last dotted segment is one of `names`.
pub fn parse(doc: &str, names: &[&str]) -> ParsedDoc {
    let doc = clean(doc);
    let (doc, group) = extract_field(&doc, GROUP_FIELD);

    let mut body = doc.as_str();
    let mut signature = None;
    let first_line = body.lines().next().unwrap_or("");
    if let Some(sig) = parse_signature_line(first_line) {
        let last = sig.name.rsplit('.').next().unwrap_or(&sig.name);
        if names.contains(&last) {
            signature = Some(sig);
            body = body.get(first_line.len()..).unwrap_or("");
        }
    }

    let body = clean(body);
    let (short, long) = split_description(&body);
    ParsedDoc {
        signature,
        group,
        short,
        long,
    }
}

/// Split text into the short description and the remainder.
///
/// The short description is the first paragraph when the text contains a
/// blank line, otherwise its first line.
pub fn split_description(text: &str) -> (String, String) {
    let text = text.trim_matches('\n');
    if text.is_empty() {
        return (String::new(), String::new());
    }
    let lines: Vec<&str> = text.lines().collect();
    let split_at = match lines.iter().position(|l| l.trim().is_empty()) {
        Some(blank) => blank,
        None => 1,
    };
    let short = lines[..split_at].join("\n").trim().to_string();
    let long = lines[split_at..].join("\n").trim_matches('\n').to_string();
    (short, long)
}

/// Collapse a (possibly multi-line) paragraph onto one line.
pub fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
