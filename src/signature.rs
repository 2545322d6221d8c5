//! Parameter-list parsing, display formatting and summary abbreviation.

/// One parameter of a callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

impl Param {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let colon = find_top_level(text, ':');
        let equals = find_top_level(text, '=');
        match (colon, equals) {
            (Some(c), Some(e)) if c < e => Param {
                name: text[..c].trim().to_string(),
                annotation: Some(text[c + 1..e].trim().to_string()),
                default: Some(text[e + 1..].trim().to_string()),
            },
            (Some(c), None) => Param {
                name: text[..c].trim().to_string(),
                annotation: Some(text[c + 1..].trim().to_string()),
                default: None,
            },
            (_, Some(e)) => Param {
                name: text[..e].trim().to_string(),
                annotation: None,
                default: Some(text[e + 1..].trim().to_string()),
            },
            (None, None) => Param {
                name: text.to_string(),
                annotation: None,
                default: None,
            },
        }
    }

    pub fn render(&self) -> String {
        match (&self.annotation, &self.default) {
            (Some(a), Some(d)) => format!("{}: {} = {}", self.name, a, d),
            (Some(a), None) => format!("{}: {}", self.name, a),
            (None, Some(d)) => format!("{}={}", self.name, d),
            (None, None) => self.name.clone(),
        }
    }

    fn is_receiver(&self) -> bool {
        self.name == "self" || self.name == "cls"
    }
}

/// Which brackets enclose the parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brackets {
    Call,
    Subscript,
}

/// A raw signature as introspected: optional parameter list and return
/// annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSignature {
    pub params: Option<Vec<Param>>,
    pub ret: Option<String>,
}

impl RawSignature {
    /// Parse `(a, b: int = 1) -> str`. Text without a leading parenthesis
    /// is treated as a bare return annotation (`-> str`) or nothing.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(unclosed) = text.strip_prefix('(') {
            let (inner, after) = match matching_close(text, 0) {
                Some(close) => (&text[1..close], &text[close + 1..]),
                None => (unclosed, ""),
            };
            return RawSignature {
                params: Some(parse_params(inner)),
                ret: parse_ret(after),
            };
        }
        RawSignature {
            params: None,
            ret: parse_ret(text),
        }
    }

    /// Drop a leading `self`/`cls` parameter.
    pub fn without_receiver(mut self) -> Self {
        if let Some(ref mut params) = self.params {
            if params.first().is_some_and(Param::is_receiver) {
                params.remove(0);
            }
        }
        self
    }
}

fn parse_ret(text: &str) -> Option<String> {
    let ret = text.trim().strip_prefix("->")?.trim();
    if ret.is_empty() {
        None
    } else {
        Some(ret.to_string())
    }
}

/// A display signature: `name(params) -> ret`, `name[params]` or `name: ret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySignature {
    pub name: String,
    pub params: Option<Vec<Param>>,
    pub brackets: Brackets,
    pub ret: Option<String>,
}

impl DisplaySignature {
    pub fn render(&self) -> String {
        render_parts(&self.name, self.params.as_ref().map(|p| render_list(p)), self.brackets, self.ret.as_deref())
    }

    /// Shorten the rendered signature to fit `limit` columns.
    ///
    /// Working from the last parameter backwards: drop its annotation when it
    /// has no default, then drop the parameter itself, leaving a single `...`
    /// placeholder at the end of the list.
    pub fn abbreviate(&self, limit: usize) -> String {
        let Some(ref params) = self.params else {
            return self.render();
        };
        let mut items: Vec<String> = params.iter().map(Param::render).collect();
        let fits = |items: &[String]| {
            render_parts(&self.name, Some(items.join(", ")), self.brackets, self.ret.as_deref())
                .chars()
                .count()
                <= limit
        };

        let mut added_ellipsis = false;
        for index in (0..params.len()).rev() {
            if fits(&items) {
                break;
            }
            if params[index].default.is_none() && params[index].annotation.is_some() {
                items[index] = params[index].name.clone();
                if fits(&items) {
                    break;
                }
            }
            items.remove(index);
            if !added_ellipsis {
                added_ellipsis = true;
                items.push("...".to_string());
            }
        }
        render_parts(&self.name, Some(items.join(", ")), self.brackets, self.ret.as_deref())
    }
}

fn render_list(params: &[Param]) -> String {
    params.iter().map(Param::render).collect::<Vec<_>>().join(", ")
}

fn render_parts(name: &str, params: Option<String>, brackets: Brackets, ret: Option<&str>) -> String {
    match params {
        Some(list) => {
            let (open, close) = match brackets {
                Brackets::Call => ('(', ')'),
                Brackets::Subscript => ('[', ']'),
            };
            match ret {
                Some(r) => format!("{}{}{}{} -> {}", name, open, list, close, r),
                None => format!("{}{}{}{}", name, open, list, close),
            }
        }
        None => match ret {
            Some(r) => format!("{}: {}", name, r),
            None => name.to_string(),
        },
    }
}

/// Split a parameter list on top-level commas.
pub fn parse_params(text: &str) -> Vec<Param> {
    split_top_level(text, ',')
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(Param::parse)
        .collect()
}

fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                c if c == sep && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}

fn find_top_level(text: &str, target: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                c if c == target && depth == 0 => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// Index of the bracket closing the one opened at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices().skip_while(|(i, _)| *i < open) {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, params: &str, ret: Option<&str>) -> DisplaySignature {
        DisplaySignature {
            name: name.to_string(),
            params: Some(parse_params(params)),
            brackets: Brackets::Call,
            ret: ret.map(str::to_string),
        }
    }

    #[test]
    fn param_forms() {
        assert_eq!(Param::parse("a").render(), "a");
        assert_eq!(Param::parse("a=1").render(), "a=1");
        assert_eq!(Param::parse("a : int").render(), "a: int");
        assert_eq!(Param::parse("a: int = 1").render(), "a: int = 1");
        assert_eq!(Param::parse("*args").render(), "*args");
    }

    #[test]
    fn nested_commas_stay_inside_annotations() {
        let params = parse_params("a: Dict[str, int], b: Tuple[int, ...] = (1, 2), c='x,y'");
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].annotation.as_deref(), Some("Dict[str, int]"));
        assert_eq!(params[1].default.as_deref(), Some("(1, 2)"));
        assert_eq!(params[2].default.as_deref(), Some("'x,y'"));
    }

    #[test]
    fn raw_signature_with_return() {
        let raw = RawSignature::parse("(self, a: int) -> Optional[Tuple[int, int]]");
        assert_eq!(raw.params.as_ref().unwrap().len(), 2);
        assert_eq!(raw.ret.as_deref(), Some("Optional[Tuple[int, int]]"));
        let raw = raw.without_receiver();
        assert_eq!(raw.params.unwrap()[0].name, "a");
    }

    #[test]
    fn raw_annotation_only() {
        let raw = RawSignature::parse("-> int");
        assert!(raw.params.is_none());
        assert_eq!(raw.ret.as_deref(), Some("int"));
    }

    #[test]
    fn render_call_and_subscript() {
        assert_eq!(call("add", "a, b", None).render(), "add(a, b)");
        let sub = DisplaySignature {
            brackets: Brackets::Subscript,
            ..call("vindex", "sel: Selection", None)
        };
        assert_eq!(sub.render(), "vindex[sel: Selection]");
    }

    #[test]
    fn render_property() {
        let prop = DisplaySignature {
            name: "rank".to_string(),
            params: None,
            brackets: Brackets::Call,
            ret: Some("int".to_string()),
        };
        assert_eq!(prop.render(), "rank: int");
    }

    #[test]
    fn short_signature_is_not_abbreviated() {
        assert_eq!(call("add", "a, b", None).abbreviate(68), "add(a, b)");
    }

    #[test]
    fn abbreviation_drops_annotations_then_params() {
        let sig = call("f", "alpha: int, beta: str, gamma: float", Some("None"));
        // Full: "f(alpha: int, beta: str, gamma: float) -> None" (46 chars)
        assert_eq!(sig.abbreviate(40), "f(alpha: int, beta: str, gamma) -> None");
        assert_eq!(sig.abbreviate(38), "f(alpha: int, beta: str, ...) -> None");
        assert_eq!(sig.abbreviate(35), "f(alpha: int, beta, ...) -> None");
        assert_eq!(sig.abbreviate(20), "f(...) -> None");
    }

    #[test]
    fn abbreviation_keeps_annotation_when_default_present() {
        let sig = call("f", "a: int = 1, b: int = 2", None);
        assert_eq!(sig.abbreviate(18), "f(a: int = 1, ...)");
    }
}
