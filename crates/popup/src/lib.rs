//! The popup side: a message client that bootstraps the page component on demand and the
//! form controller built on top of it.
pub mod client;
pub mod connector;
pub mod controller;

pub use crate::client::{ClientError, MessageClient, RetryPolicy};
pub use crate::connector::{ChannelConnector, Connector, InjectError, SendError};
pub use crate::controller::{HiddenItem, Notice, NoticeKind, Popup};
