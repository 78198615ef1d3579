use crate::{Document, Id};

/// Pre-order walk over the elements below a node, in document order.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<Id>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(doc: &'a Document, root: Id) -> Self {
        let mut stack: Vec<Id> = doc.children(root).to_vec();
        stack.reverse();
        Self { doc, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        while let Some(id) = self.stack.pop() {
            let children = self.doc.children(id);
            self.stack.extend(children.iter().rev().copied());
            if self.doc.is_element(id) {
                return Some(id);
            }
        }
        None
    }
}

/// Siblings before `id` that are elements, nearest first.
pub fn preceding_element_siblings(doc: &Document, id: Id) -> impl Iterator<Item = Id> + '_ {
    let siblings = doc.parent(id).map(|p| doc.children(p)).unwrap_or(&[]);
    let pos = siblings.iter().position(|s| *s == id).unwrap_or(0);
    siblings[..pos]
        .iter()
        .rev()
        .copied()
        .filter(move |s| doc.is_element(*s))
}

/// Siblings after `id` that are elements, nearest first.
pub fn following_element_siblings(doc: &Document, id: Id) -> impl Iterator<Item = Id> + '_ {
    let siblings = doc.parent(id).map(|p| doc.children(p)).unwrap_or(&[]);
    let start = siblings
        .iter()
        .position(|s| *s == id)
        .map(|p| p + 1)
        .unwrap_or(siblings.len());
    siblings[start..]
        .iter()
        .copied()
        .filter(move |s| doc.is_element(*s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_elements_in_document_order() {
        let doc = Document::parse("<div id=a><p id=b>x</p><p id=c><i id=d></i></p></div><span id=e></span>");
        let ids: Vec<&str> = doc
            .elements()
            .filter_map(|id| doc.element_id(id))
            .collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn sibling_walks_skip_text() {
        let doc = Document::parse("<ul><li id=a>1</li> <li id=b>2</li> <li id=c>3</li></ul>");
        let b = doc.get_element_by_id("b").unwrap();
        let before: Vec<_> = preceding_element_siblings(&doc, b)
            .filter_map(|id| doc.element_id(id))
            .collect();
        let after: Vec<_> = following_element_siblings(&doc, b)
            .filter_map(|id| doc.element_id(id))
            .collect();
        assert_eq!(before, vec!["a"]);
        assert_eq!(after, vec!["c"]);
    }
}
