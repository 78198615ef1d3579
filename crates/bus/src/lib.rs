use core_types::RequestId;
use serde_json::Value;
use std::sync::mpsc::{Receiver, Sender};

mod action;

pub use action::{ActionRequest, ActionResponse, decode_request};

#[derive(Debug)]
pub enum StorageCommand {
    Get {
        request_id: RequestId,
        key: String,
        reply: Sender<PageEvent>,
    },
    Set {
        request_id: RequestId,
        key: String,
        value: Value,
        reply: Sender<PageEvent>,
    },
    Remove {
        request_id: RequestId,
        key: String,
        reply: Sender<PageEvent>,
    },
}

impl StorageCommand {
    pub fn request_id(&self) -> RequestId {
        match self {
            StorageCommand::Get { request_id, .. }
            | StorageCommand::Set { request_id, .. }
            | StorageCommand::Remove { request_id, .. } => *request_id,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StorageCommand::Get { key, .. }
            | StorageCommand::Set { key, .. }
            | StorageCommand::Remove { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageEvent {
    // Storage -> page
    Loaded {
        request_id: RequestId,
        key: String,
        value: Option<Value>,
    },
    Written {
        request_id: RequestId,
        key: String,
    },
    Removed {
        request_id: RequestId,
        key: String,
    },
    Failed {
        request_id: RequestId,
        key: String,
        error: String,
    },
}

impl StorageEvent {
    pub fn request_id(&self) -> RequestId {
        match self {
            StorageEvent::Loaded { request_id, .. }
            | StorageEvent::Written { request_id, .. }
            | StorageEvent::Removed { request_id, .. }
            | StorageEvent::Failed { request_id, .. } => *request_id,
        }
    }
}

/// Everything the page-side runtime consumes, on a single channel.
#[derive(Debug)]
pub enum PageEvent {
    // Popup -> page
    Action {
        request_id: RequestId,
        request: ActionRequest,
        reply: Sender<ActionResponse>,
    },
    Storage(StorageEvent),
    Shutdown,
}

impl From<StorageEvent> for PageEvent {
    fn from(event: StorageEvent) -> Self {
        PageEvent::Storage(event)
    }
}

pub struct PageBus {
    pub evt_tx: Sender<PageEvent>, // shareable for the popup and storage
    pub evt_rx: Receiver<PageEvent>,
}

impl PageBus {
    pub fn new() -> Self {
        let (evt_tx, evt_rx) = std::sync::mpsc::channel();
        Self { evt_tx, evt_rx }
    }
}

impl Default for PageBus {
    fn default() -> Self {
        Self::new()
    }
}
