use crate::types::NodeKind;
use crate::{Document, Id};

/// Concatenated text from every `<style>` element, in document order.
pub fn collect_style_texts(doc: &Document) -> String {
    let mut out = String::new();
    for id in doc.elements_by_tag("style") {
        for child in doc.children(id) {
            if let Some(NodeKind::Text { text }) = doc.kind(*child) {
                out.push_str(text);
                out.push('\n');
            }
        }
    }
    out
}

/// `textContent` trimmed of surrounding whitespace.
pub fn trimmed_text(doc: &Document, id: Id) -> String {
    doc.text_content(id).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_style_blocks() {
        let doc = Document::parse("<style>a{}</style><p>x</p><style>b{}</style>");
        assert_eq!(collect_style_texts(&doc), "a{}\nb{}\n");
    }
}
