//! Page-side hiding: selector resolution, the visibility ledger, reload-durable
//! identifiers and the agent that ties them to storage and the message protocol.
pub mod agent;
pub mod identifier;
pub mod ledger;
pub mod page;
pub mod record;
pub mod resolver;

mod error;

pub use crate::agent::{ContentAgent, start_content_runtime};
pub use crate::error::ContentError;
pub use crate::identifier::{Identifier, decode, encode};
pub use crate::ledger::{BARE_MARKER, HIDDEN_MARKER, HiddenEntry, Ledger};
pub use crate::page::Page;
pub use crate::record::{PersistedEntry, PersistedRecord, PersistedTagEntry, StoredRecord, storage_key};
pub use crate::resolver::{Clause, Resolved, resolve_for_hide, resolve_for_show};
