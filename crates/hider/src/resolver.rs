//! Turning a user-typed selector expression into element sets.
//!
//! An expression is a comma list. Each clause is either a bare tag name (`footer`), which
//! means "every plain instance of that tag", or a general selector handed to the selector
//! engine after shorthand normalization (`promo-x` becomes `#promo-x`).
use std::borrow::Cow;

use css::{SelectorError, parse_selector_list, query_selector_all};
use html::{Document, Id};

use crate::ledger::BARE_MARKER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause<'a> {
    BareTag(&'a str),
    General(&'a str),
}

/// Elements found for one clause, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub clause: String,
    pub elements: Vec<Id>,
    pub bare: bool,
}

pub fn split_clauses(expression: &str) -> impl Iterator<Item = &str> {
    expression
        .split(',')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
}

/// `^[A-Za-z][A-Za-z0-9]*$`
pub fn is_bare_tag_name(clause: &str) -> bool {
    let mut chars = clause.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

pub fn classify(clause: &str) -> Clause<'_> {
    if is_bare_tag_name(clause) {
        Clause::BareTag(clause)
    } else {
        Clause::General(clause)
    }
}

/// A lone token with no `#`/`.` prefix, no `[`, `:` or space is taken as an id.
pub fn normalize_selector(clause: &str) -> Cow<'_, str> {
    if clause.starts_with('#')
        || clause.starts_with('.')
        || clause.contains('[')
        || clause.contains(':')
        || clause.contains(' ')
    {
        Cow::Borrowed(clause)
    } else {
        Cow::Owned(format!("#{clause}"))
    }
}

/// Elements of `tag` that carry neither an id nor a class.
pub fn bare_tag_elements(doc: &Document, tag: &str) -> Result<Vec<Id>, SelectorError> {
    let list = parse_selector_list(tag)?;
    Ok(query_selector_all(doc, &list)
        .into_iter()
        .filter(|id| is_plain(doc, *id))
        .collect())
}

/// Elements of `tag` that were hidden through the bare-tag path.
pub fn bare_marked_elements(doc: &Document, tag: &str) -> Result<Vec<Id>, SelectorError> {
    let list = parse_selector_list(&format!("{tag}[{BARE_MARKER}]"))?;
    Ok(query_selector_all(doc, &list))
}

pub fn general_elements(doc: &Document, clause: &str) -> Result<Vec<Id>, SelectorError> {
    let list = parse_selector_list(&normalize_selector(clause))?;
    Ok(query_selector_all(doc, &list))
}

fn is_plain(doc: &Document, id: Id) -> bool {
    doc.element_id(id).is_none() && doc.class_list(id).next().is_none()
}

/// Resolve every clause for hiding. Bare tags go through [`bare_tag_elements`].
pub fn resolve_for_hide(doc: &Document, expression: &str) -> Vec<Resolved> {
    resolve_with(doc, expression, bare_tag_elements)
}

/// Resolve every clause for showing. Bare tags only reach elements carrying the bare
/// marker, so a styled instance hidden by a general selector stays hidden.
pub fn resolve_for_show(doc: &Document, expression: &str) -> Vec<Resolved> {
    resolve_with(doc, expression, bare_marked_elements)
}

fn resolve_with(
    doc: &Document,
    expression: &str,
    bare: impl Fn(&Document, &str) -> Result<Vec<Id>, SelectorError>,
) -> Vec<Resolved> {
    let mut out = Vec::new();
    for clause in split_clauses(expression) {
        let (found, is_bare) = match classify(clause) {
            Clause::BareTag(tag) => (bare(doc, tag), true),
            Clause::General(selector) => (general_elements(doc, selector), false),
        };
        match found {
            Ok(elements) => {
                log::trace!(
                    target: "veil.resolver",
                    "`{clause}` matched {} elements (bare: {is_bare})",
                    elements.len()
                );
                out.push(Resolved {
                    clause: clause.to_string(),
                    elements,
                    bare: is_bare,
                });
            }
            Err(err) => {
                log::warn!(target: "veil.resolver", "Invalid selector: {clause}: {err}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div id="banner">top</div>
        <div class="ads">ad one</div>
        <div class="  ">spaces only</div>
        <div>plain</div>
        <div id="">empty id</div>
        <footer>bye</footer>"#;

    #[test]
    fn classifies_bare_tags() {
        assert!(is_bare_tag_name("footer"));
        assert!(is_bare_tag_name("h1"));
        assert!(!is_bare_tag_name("1h"));
        assert!(!is_bare_tag_name("my-widget"));
        assert!(!is_bare_tag_name("div.ads"));
        assert!(!is_bare_tag_name(""));
        assert_eq!(classify("#a"), Clause::General("#a"));
    }

    #[test]
    fn normalizes_lone_tokens_to_ids() {
        assert_eq!(normalize_selector("my-widget"), "#my-widget");
        assert_eq!(normalize_selector(".ads"), ".ads");
        assert_eq!(normalize_selector("div p"), "div p");
        assert_eq!(normalize_selector("a[href]"), "a[href]");
        assert_eq!(normalize_selector("li:first-child"), "li:first-child");
    }

    #[test]
    fn splits_and_drops_empty_clauses() {
        let clauses: Vec<_> = split_clauses(" #a , ,.b,, footer ").collect();
        assert_eq!(clauses, vec!["#a", ".b", "footer"]);
    }

    #[test]
    fn bare_tags_skip_elements_with_id_or_class() {
        let doc = html::Document::parse(PAGE);
        let found = bare_tag_elements(&doc, "div").unwrap();
        let texts: Vec<_> = found.iter().map(|id| doc.text_content(*id)).collect();
        assert_eq!(texts, vec!["spaces only", "plain", "empty id"]);
    }

    #[test]
    fn invalid_clauses_are_skipped_without_aborting_the_batch() {
        let doc = html::Document::parse(PAGE);
        let resolved = resolve_for_hide(&doc, "#banner, [broken, .ads, footer");
        let clauses: Vec<_> = resolved.iter().map(|r| r.clause.as_str()).collect();
        assert_eq!(clauses, vec!["#banner", ".ads", "footer"]);
        assert!(resolved[2].bare);
        assert!(!resolved[0].bare);
        let total: usize = resolved.iter().map(|r| r.elements.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn show_targets_only_bare_marked_instances() {
        let mut doc = html::Document::parse(PAGE);
        let plain = bare_tag_elements(&doc, "div").unwrap()[1];
        doc.set_attr(plain, BARE_MARKER, "true").unwrap();
        let resolved = resolve_for_show(&doc, "div");
        assert_eq!(resolved[0].elements, vec![plain]);
    }
}
