use crate::selector::{SelectorList, parse_selector_list};

// A single CSS property: "color: red"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

// Selectors and the declarations they apply
#[derive(Debug, Clone)]
pub struct Rule {
    pub selectors: SelectorList,
    pub declarations: Vec<Declaration>,
}

// A full stylesheet: rules in source order
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

// input: "div, #id { color: red; } .class { font-size: 12px; }"
// output: Stylesheet { rules: vec![Rule { selectors: ..., declarations: ... }, ...] }
//
// Comments are stripped, at-rules are skipped with their blocks, and a rule whose prelude
// is not a valid selector list is dropped as a whole.
pub fn parse_stylesheet(input: &str) -> Stylesheet {
    let source = strip_comments(input);
    let mut rules = Vec::new();
    let mut rest = source.as_str();

    while let Some(open) = rest.find('{') {
        let prelude = rest[..open].trim();
        let Some(close) = matching_brace(&rest[open..]) else {
            break;
        };
        let body = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        if prelude.starts_with('@') {
            log::debug!(target: "css.syntax", "skipping at-rule `{prelude}`");
            continue;
        }
        let selectors = match parse_selector_list(prelude) {
            Ok(selectors) => selectors,
            Err(err) => {
                log::debug!(target: "css.syntax", "dropping rule `{prelude}`: {err}");
                continue;
            }
        };
        let declarations = parse_declarations(body);
        if declarations.is_empty() {
            continue;
        }
        rules.push(Rule {
            selectors,
            declarations,
        });
    }
    Stylesheet { rules }
}

// input: "color: red; display: none !important;"
// output: vec![Declaration { name: "color", .. }, Declaration { name: "display", important: true, .. }]
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    input
        .split(';')
        .filter_map(|pair| {
            let (n, v) = pair.split_once(':')?;
            let name = n.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            let mut value = v.trim();
            let mut important = false;
            if let Some(pos) = value.rfind('!') {
                if value[pos + 1..].trim().eq_ignore_ascii_case("important") {
                    important = true;
                    value = value[..pos].trim_end();
                }
            }
            if value.is_empty() {
                return None;
            }
            Some(Declaration {
                name,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|d| {
            if d.important {
                format!("{}: {} !important;", d.name, d.value)
            } else {
                format!("{}: {};", d.name, d.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

// `s` starts with '{'. Returns the byte offset of the matching '}'.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
