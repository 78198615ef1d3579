//! Reload-durable element identifiers.
//!
//! Three forms, tried in this order when encoding:
//!
//! * `#<id>` for elements with a non-empty id,
//! * `.<c1>.<c2>.<c3>` from the first three classes,
//! * `<tag>[text="<first 50 chars of the trimmed text>"]` otherwise.
//!
//! None of them is guaranteed unique. Decoding returns the first element in document
//! order that fits, which is the accepted best-effort behavior.
use std::fmt;

use css::{parse_selector_list, query_selector};
use html::collect::trimmed_text;
use html::{Document, Id};

const MAX_CLASSES: usize = 3;
const MAX_TEXT_CHARS: usize = 50;
const TEXT_OPEN: &str = "[text=\"";
const TEXT_CLOSE: &str = "\"]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(String),
    /// Class names joined by `.`, without the leading dot.
    Classes(String),
    TagText { tag: String, text: String },
}

impl Identifier {
    pub fn encode(doc: &Document, id: Id) -> Identifier {
        if let Some(value) = doc.element_id(id) {
            return Identifier::Id(value.to_string());
        }
        let classes: Vec<&str> = doc.class_list(id).take(MAX_CLASSES).collect();
        if !classes.is_empty() {
            return Identifier::Classes(classes.join("."));
        }
        let text: String = trimmed_text(doc, id).chars().take(MAX_TEXT_CHARS).collect();
        Identifier::TagText {
            tag: doc.tag_name(id).unwrap_or_default().to_string(),
            text,
        }
    }

    /// `None` for strings in none of the three forms.
    pub fn parse(raw: &str) -> Option<Identifier> {
        if let Some(value) = raw.strip_prefix('#') {
            return Some(Identifier::Id(value.to_string()));
        }
        if let Some(classes) = raw.strip_prefix('.') {
            return Some(Identifier::Classes(classes.to_string()));
        }
        let (tag, rest) = raw.split_once(TEXT_OPEN)?;
        let text = rest.strip_suffix(TEXT_CLOSE).unwrap_or(rest);
        Some(Identifier::TagText {
            tag: tag.to_string(),
            text: text.to_string(),
        })
    }

    /// Find the element this identifier designates on the current page.
    pub fn resolve(&self, doc: &Document) -> Option<Id> {
        match self {
            Identifier::Id(value) => doc.get_element_by_id(value),
            Identifier::Classes(_) => {
                let selector = self.to_string();
                match parse_selector_list(&selector) {
                    Ok(list) => query_selector(doc, &list),
                    Err(err) => {
                        log::debug!(target: "veil.restore", "`{selector}` is not a selector: {err}");
                        None
                    }
                }
            }
            Identifier::TagText { tag, text } => {
                if tag.is_empty() {
                    return None;
                }
                doc.elements_by_tag(tag)
                    .find(|id| trimmed_text(doc, *id).starts_with(text.as_str()))
            }
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(value) => write!(f, "#{value}"),
            Identifier::Classes(classes) => write!(f, ".{classes}"),
            Identifier::TagText { tag, text } => write!(f, "{tag}{TEXT_OPEN}{text}{TEXT_CLOSE}"),
        }
    }
}

pub fn encode(doc: &Document, id: Id) -> String {
    Identifier::encode(doc, id).to_string()
}

pub fn decode(doc: &Document, raw: &str) -> Option<Id> {
    Identifier::parse(raw)?.resolve(doc)
}
