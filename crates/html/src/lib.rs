pub mod collect;
pub mod serialize;
pub mod traverse;

mod document;
mod dom_builder;
mod entities;
mod tokenizer;
mod types;

pub use crate::document::{DomError, Document};
pub use crate::dom_builder::build_document;
pub use crate::tokenizer::{is_void_element, tokenize};
pub use crate::types::{Id, NodeId, NodeKind, Token};
