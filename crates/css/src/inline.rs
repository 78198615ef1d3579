//! Editing of the `style` attribute, the equivalent of `element.style.<property> = value`.
use crate::syntax::{Declaration, parse_declarations, serialize_declarations};
use html::{Document, DomError, Id};

// If the element has an inline style attribute, return its value
pub fn get_inline_style(doc: &Document, id: Id) -> Option<&str> {
    doc.attr(id, "style")
}

pub fn inline_declarations(doc: &Document, id: Id) -> Vec<Declaration> {
    get_inline_style(doc, id)
        .map(parse_declarations)
        .unwrap_or_default()
}

pub fn inline_property(doc: &Document, id: Id, property: &str) -> Option<String> {
    inline_declarations(doc, id)
        .into_iter()
        .rev()
        .find(|d| d.name.eq_ignore_ascii_case(property))
        .map(|d| d.value)
}

/// Set one inline property. An empty `value` removes the property, and the `style`
/// attribute goes away once no declarations are left.
pub fn set_inline_property(
    doc: &mut Document,
    id: Id,
    property: &str,
    value: &str,
) -> Result<(), DomError> {
    let property = property.to_ascii_lowercase();
    let mut declarations = inline_declarations(doc, id);
    declarations.retain(|d| d.name != property);
    let value = value.trim();
    if !value.is_empty() {
        declarations.push(Declaration {
            name: property,
            value: value.to_string(),
            important: false,
        });
    }
    if declarations.is_empty() {
        doc.remove_attr(id, "style")?;
    } else {
        doc.set_attr(id, "style", &serialize_declarations(&declarations))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_replaces_and_clears_properties() {
        let mut doc = Document::parse(r#"<div id="a" style="color: red"></div>"#);
        let a = doc.get_element_by_id("a").unwrap();

        set_inline_property(&mut doc, a, "display", "none").unwrap();
        assert_eq!(doc.attr(a, "style"), Some("color: red; display: none;"));
        assert_eq!(inline_property(&doc, a, "DISPLAY").as_deref(), Some("none"));

        set_inline_property(&mut doc, a, "display", "block").unwrap();
        assert_eq!(doc.attr(a, "style"), Some("color: red; display: block;"));

        set_inline_property(&mut doc, a, "display", "").unwrap();
        set_inline_property(&mut doc, a, "color", "").unwrap();
        assert!(!doc.has_attr(a, "style"));
    }
}
