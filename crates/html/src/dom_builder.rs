use crate::types::{Id, Token};
use crate::Document;

/// Build a live document from a token stream.
///
/// Start tags nest under the current open element. An end tag closes back to the
/// nearest open element with that name; one with no match is ignored.
pub fn build_document(tokens: &[Token]) -> Document {
    let mut doc = Document::new();
    let mut open_elements: Vec<Id> = Vec::new();

    for token in tokens {
        let parent = open_elements.last().copied().unwrap_or(Id::ROOT);
        match token {
            Token::Doctype(s) => doc.set_doctype(s.clone()),
            Token::Comment(c) => {
                let node = doc.create_comment(c);
                attach(&mut doc, parent, node);
            }
            Token::Text(txt) => {
                if txt.is_empty() {
                    continue;
                }
                let node = doc.create_text(txt);
                attach(&mut doc, parent, node);
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let node = doc.create_element(name, attributes.clone());
                attach(&mut doc, parent, node);
                if !*self_closing {
                    open_elements.push(node);
                }
            }
            Token::EndTag(name) => {
                let Some(pos) = open_elements
                    .iter()
                    .rposition(|id| doc.tag_name(*id) == Some(name.as_str()))
                else {
                    log::debug!(target: "html.dom_builder", "ignoring stray </{name}>");
                    continue;
                };
                open_elements.truncate(pos);
            }
        }
    }

    doc
}

fn attach(doc: &mut Document, parent: Id, child: Id) {
    // Freshly created nodes are detached and parents are elements or the root.
    if let Err(err) = doc.append_child(parent, child) {
        debug_assert!(false, "tree builder produced an invalid append: {err}");
    }
}
