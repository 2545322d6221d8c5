//! Relative link computation, heading anchors and cross-reference roles.

use crate::error::{ApigenError, Result};
use crate::planner::LinkTable;
use regex::Regex;
use std::sync::LazyLock;

static RE_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":py:(?:obj|class|func|meth|attr):`([^`]+)`").unwrap());

static RE_TITLED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*?)\s*<([^<>]+)>$").unwrap());

/// Directory part of a page path (`api/m.add` -> `api`).
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Link from a page in `from_dir` to the page at `target` (no extension).
pub fn relative_href(from_dir: &str, target: &str, ext: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
    let (to_dirs, file) = match to.split_last() {
        Some((file, dirs)) => (dirs, *file),
        None => (&[][..], ""),
    };

    let common = from
        .iter()
        .zip(to_dirs.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let file = format!("{}.{}", file, ext);
    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to_dirs[common..]);
    parts.push(&file);
    parts.join("/")
}

/// GitHub heading anchor slug.
///
/// Lowercase; keep alphanumerics, spaces and hyphens; spaces become hyphens.
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Output-format hooks used while rewriting text that contains links.
pub trait LinkFormat {
    fn link(&self, text: &str, href: &str) -> String;

    /// Escape plain text surrounding links.
    fn escape(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Where role targets in one entity's text are resolved from.
pub struct RefContext<'a> {
    /// Entity whose documentation is being rendered, for diagnostics.
    pub entity: &'a str,
    pub module: &'a str,
    pub container: &'a str,
    /// Directory of the page the text lands on.
    pub from_dir: &'a str,
    pub ext: &'a str,
}

/// Replace every cross-reference role with a link in `format`, escaping the
/// text in between.
///
/// Fails on the first role whose target is not in the link table.
pub fn resolve_roles<F: LinkFormat + ?Sized>(
    text: &str,
    links: &LinkTable,
    ctx: &RefContext<'_>,
    format: &F,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in RE_ROLE.captures_iter(text) {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        out.push_str(&format.escape(&text[last..whole.start]));
        last = whole.end;

        let content = caps[1].trim();
        let (title, raw_target) = match RE_TITLED.captures(content) {
            Some(t) if !t[1].is_empty() => (Some(t[1].to_string()), t[2].trim().to_string()),
            _ => (None, content.to_string()),
        };
        let short_form = raw_target.starts_with('~');
        let target = raw_target.trim_start_matches('~').trim_start_matches('.');

        let Some((_, path)) = links.resolve(target, ctx.module, ctx.container) else {
            return Err(ApigenError::UnresolvedReference {
                entity: ctx.entity.to_string(),
                target: raw_target.clone(),
            });
        };
        let label = match title {
            Some(t) => t,
            None if short_form => target.rsplit('.').next().unwrap_or(target).to_string(),
            None => target.to_string(),
        };
        out.push_str(&format.link(&label, &relative_href(ctx.from_dir, path, ctx.ext)));
    }
    out.push_str(&format.escape(&text[last..]));
    Ok(out)
}
