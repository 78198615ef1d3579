use crate::traverse::Descendants;
use crate::types::{Id, NodeKind, NodeRecord};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node {0:?}")]
    UnknownNode(Id),
    #[error("node {0:?} cannot have children")]
    InvalidParent(Id),
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(Id),
    #[error("appending {child:?} to {parent:?} would create a cycle")]
    CycleDetected { parent: Id, child: Id },
    #[error("node {0:?} is not an element")]
    NotAnElement(Id),
}

/// A live, mutable document tree.
///
/// Nodes live in an arena and are never freed for the lifetime of the
/// document; [`Id`] handles index into it. `Id::ROOT` is the document node.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord::new(NodeKind::Document { doctype: None })],
        }
    }

    pub fn parse(input: &str) -> Self {
        crate::dom_builder::build_document(&crate::tokenizer::tokenize(input))
    }

    pub fn root(&self) -> Id {
        Id::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: Id) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn kind(&self, id: Id) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|n| &n.kind)
    }

    pub fn doctype(&self) -> Option<&str> {
        match &self.nodes[Id::ROOT.index()].kind {
            NodeKind::Document { doctype } => doctype.as_deref(),
            _ => None,
        }
    }

    pub fn set_doctype(&mut self, value: String) {
        if let NodeKind::Document { doctype } = &mut self.nodes[Id::ROOT.index()].kind {
            *doctype = Some(value);
        }
    }

    // --- construction ---

    pub fn create_element(&mut self, name: &str, attributes: Vec<(String, Option<String>)>) -> Id {
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        self.push(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes,
        })
    }

    pub fn create_text(&mut self, text: &str) -> Id {
        self.push(NodeKind::Text {
            text: text.to_string(),
        })
    }

    pub fn create_comment(&mut self, text: &str) -> Id {
        self.push(NodeKind::Comment {
            text: text.to_string(),
        })
    }

    fn push(&mut self, kind: NodeKind) -> Id {
        let id = Id(self.nodes.len() as u32);
        self.nodes.push(NodeRecord::new(kind));
        id
    }

    pub fn append_child(&mut self, parent: Id, child: Id) -> Result<(), DomError> {
        self.ensure(parent)?;
        self.ensure(child)?;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        if !self.nodes[parent.index()].allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if self.nodes[child.index()].parent.is_some() || child == Id::ROOT {
            return Err(DomError::AlreadyAttached(child));
        }
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Detach `id` (and its subtree) from its parent. The handle stays valid.
    pub fn detach(&mut self, id: Id) -> Result<(), DomError> {
        self.ensure(id)?;
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
        Ok(())
    }

    fn ensure(&self, id: Id) -> Result<(), DomError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(DomError::UnknownNode(id))
        }
    }

    fn is_ancestor(&self, ancestor: Id, node: Id) -> bool {
        let mut current = self.parent(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    // --- tree accessors ---

    pub fn parent(&self, id: Id) -> Option<Id> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    pub fn children(&self, id: Id) -> &[Id] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children only.
    pub fn element_children(&self, id: Id) -> impl Iterator<Item = Id> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.is_element(*c))
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_connected(&self, id: Id) -> bool {
        id == Id::ROOT || self.is_ancestor(Id::ROOT, id)
    }

    /// Elements under `root` (exclusive) in document order.
    pub fn descendants(&self, root: Id) -> Descendants<'_> {
        Descendants::new(self, root)
    }

    /// Every connected element in document order.
    pub fn elements(&self) -> Descendants<'_> {
        self.descendants(Id::ROOT)
    }

    pub fn elements_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = Id> + 'a {
        self.elements()
            .filter(move |id| self.tag_name(*id).is_some_and(|n| n.eq_ignore_ascii_case(tag)))
    }

    pub fn get_element_by_id(&self, wanted: &str) -> Option<Id> {
        if wanted.is_empty() {
            return None;
        }
        self.elements()
            .find(|id| self.attr(*id, "id") == Some(wanted))
    }

    // --- element accessors ---

    pub fn is_element(&self, id: Id) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element { .. }))
    }

    pub fn tag_name(&self, id: Id) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self, id: Id) -> &[(String, Option<String>)] {
        match self.kind(id) {
            Some(NodeKind::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    /// Attribute value; a present attribute without a value reads as `""`.
    pub fn attr(&self, id: Id, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, id: Id, name: &str) -> bool {
        self.attributes(id)
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn set_attr(&mut self, id: Id, name: &str, value: &str) -> Result<(), DomError> {
        let attributes = self.attributes_mut(id)?;
        match attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = Some(value.to_string()),
            None => attributes.push((name.to_ascii_lowercase(), Some(value.to_string()))),
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, id: Id, name: &str) -> Result<bool, DomError> {
        let attributes = self.attributes_mut(id)?;
        let before = attributes.len();
        attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        Ok(attributes.len() != before)
    }

    fn attributes_mut(&mut self, id: Id) -> Result<&mut Vec<(String, Option<String>)>, DomError> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Element { attributes, .. }) => Ok(attributes),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    /// The `id` attribute, treating an empty value as absent.
    pub fn element_id(&self, id: Id) -> Option<&str> {
        self.attr(id, "id").filter(|v| !v.is_empty())
    }

    pub fn class_list(&self, id: Id) -> impl Iterator<Item = &str> {
        self.attr(id, "class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, id: Id, class: &str) -> bool {
        self.class_list(id).any(|c| c == class)
    }

    /// Concatenated text of every descendant text node, like `textContent`.
    pub fn text_content(&self, id: Id) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: Id, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text { text }) => out.push_str(text),
            Some(NodeKind::Element { .. }) | Some(NodeKind::Document { .. }) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            _ => {}
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
