use crate::selector::{
    AttrOp, AttributeSelector, Combinator, ComplexSelector, Compound, PseudoClass,
    SelectorList, SimpleSelector, TypeSelector, parse_selector_list, SelectorError,
};
use html::traverse::{following_element_siblings, preceding_element_siblings};
use html::{Document, Id, NodeKind};

impl SelectorList {
    pub fn matches(&self, doc: &Document, id: Id) -> bool {
        self.0.iter().any(|complex| complex.matches(doc, id))
    }
}

impl ComplexSelector {
    pub fn matches(&self, doc: &Document, id: Id) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_from(doc, id, n - 1),
        }
    }

    // Right-to-left: `compounds[index]` must match `id`, then the combinator to its left
    // decides which elements are tried for `compounds[index - 1]`.
    fn matches_from(&self, doc: &Document, id: Id, index: usize) -> bool {
        if !matches_compound(doc, id, &self.compounds[index]) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let next = index - 1;
        match self.combinators[next] {
            Combinator::Child => {
                parent_element(doc, id).is_some_and(|parent| self.matches_from(doc, parent, next))
            }
            Combinator::Descendant => {
                let mut current = parent_element(doc, id);
                while let Some(ancestor) = current {
                    if self.matches_from(doc, ancestor, next) {
                        return true;
                    }
                    current = parent_element(doc, ancestor);
                }
                false
            }
            Combinator::NextSibling => preceding_element_siblings(doc, id)
                .next()
                .is_some_and(|sibling| self.matches_from(doc, sibling, next)),
            Combinator::SubsequentSibling => {
                preceding_element_siblings(doc, id).any(|sibling| self.matches_from(doc, sibling, next))
            }
        }
    }
}

fn parent_element(doc: &Document, id: Id) -> Option<Id> {
    doc.parent(id).filter(|p| doc.is_element(*p))
}

fn matches_compound(doc: &Document, id: Id, compound: &Compound) -> bool {
    let Some(name) = doc.tag_name(id) else {
        return false;
    };
    if let Some(TypeSelector::Tag(tag)) = &compound.type_selector {
        if !name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    compound
        .simple
        .iter()
        .all(|simple| matches_simple(doc, id, simple))
}

fn matches_simple(doc: &Document, id: Id, simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::Id(want) => doc.attr(id, "id") == Some(want.as_str()),
        SimpleSelector::Class(want) => doc.has_class(id, want),
        SimpleSelector::Attribute(attr) => matches_attribute(doc, id, attr),
        SimpleSelector::Pseudo(pseudo) => match pseudo {
            PseudoClass::FirstChild => preceding_element_siblings(doc, id).next().is_none(),
            PseudoClass::LastChild => following_element_siblings(doc, id).next().is_none(),
            PseudoClass::OnlyChild => {
                preceding_element_siblings(doc, id).next().is_none()
                    && following_element_siblings(doc, id).next().is_none()
            }
            PseudoClass::Empty => doc.children(id).iter().all(|c| {
                matches!(doc.kind(*c), Some(NodeKind::Comment { .. }))
            }),
            PseudoClass::Root => doc.parent(id) == Some(doc.root()),
            PseudoClass::Not(inner) => !matches_compound(doc, id, inner),
        },
    }
}

fn matches_attribute(doc: &Document, id: Id, selector: &AttributeSelector) -> bool {
    let Some(value) = doc.attr(id, &selector.name) else {
        return false;
    };
    let Some((op, want)) = &selector.matcher else {
        return true;
    };
    let want = want.as_str();
    match op {
        AttrOp::Equals => value == want,
        AttrOp::Includes => !want.is_empty() && value.split_ascii_whitespace().any(|v| v == want),
        AttrOp::DashMatch => {
            value == want || value.strip_prefix(want).is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !want.is_empty() && value.starts_with(want),
        AttrOp::Suffix => !want.is_empty() && value.ends_with(want),
        AttrOp::Substring => !want.is_empty() && value.contains(want),
    }
}

/// Every connected element matching `selectors`, in document order.
pub fn query_selector_all(doc: &Document, selectors: &SelectorList) -> Vec<Id> {
    doc.elements()
        .filter(|id| selectors.matches(doc, *id))
        .collect()
}

/// First connected element matching `selectors` in document order.
pub fn query_selector(doc: &Document, selectors: &SelectorList) -> Option<Id> {
    doc.elements().find(|id| selectors.matches(doc, *id))
}

/// Parse and run a selector string in one step, like `document.querySelectorAll`.
pub fn select(doc: &Document, selector: &str) -> Result<Vec<Id>, SelectorError> {
    let list = parse_selector_list(selector)?;
    Ok(query_selector_all(doc, &list))
}
