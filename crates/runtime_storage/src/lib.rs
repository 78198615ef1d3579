use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use bus::{PageEvent, StorageCommand, StorageEvent};

mod area;

pub use area::{JsonFileArea, MemoryArea, StorageArea, StorageError};

/// Serve storage commands on a dedicated thread until every command sender is dropped.
/// Each answer goes to the sender carried by its command; a reply channel that is gone
/// is ignored.
pub fn start_storage_runtime(
    mut area: Box<dyn StorageArea + Send>,
    cmd_rx: Receiver<StorageCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let (event, reply) = handle_command(area.as_mut(), cmd);
            let _ = reply.send(PageEvent::Storage(event));
        }
        log::debug!(target: "veil.storage", "storage runtime stopped");
    })
}

fn handle_command(
    area: &mut dyn StorageArea,
    cmd: StorageCommand,
) -> (StorageEvent, std::sync::mpsc::Sender<PageEvent>) {
    let request_id = cmd.request_id();
    let failed = |key: String, err: StorageError| {
        log::warn!(target: "veil.storage", "request {request_id} on `{key}` failed: {err}");
        StorageEvent::Failed {
            request_id,
            key,
            error: err.to_string(),
        }
    };

    match cmd {
        StorageCommand::Get { key, reply, .. } => {
            let event = match area.get(&key) {
                Ok(value) => StorageEvent::Loaded {
                    request_id,
                    key,
                    value,
                },
                Err(err) => failed(key, err),
            };
            (event, reply)
        }
        StorageCommand::Set {
            key, value, reply, ..
        } => {
            let event = match area.set(&key, value) {
                Ok(()) => StorageEvent::Written { request_id, key },
                Err(err) => failed(key, err),
            };
            (event, reply)
        }
        StorageCommand::Remove { key, reply, .. } => {
            let event = match area.remove(&key) {
                Ok(_) => StorageEvent::Removed { request_id, key },
                Err(err) => failed(key, err),
            };
            (event, reply)
        }
    }
}
