use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use bus::{ActionRequest, ActionResponse, PageEvent, StorageCommand, StorageEvent};
use core_types::{RequestId, RequestIds};

use crate::error::ContentError;
use crate::ledger::Ledger;
use crate::page::Page;
use crate::record::{PersistedRecord, StoredRecord, hidden_listing, storage_key};
use crate::resolver::{bare_marked_elements, bare_tag_elements, resolve_for_hide, resolve_for_show};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for the stored record requested with this id.
    Restoring(RequestId),
    Ready,
}

#[derive(Debug)]
struct Pending {
    request_id: RequestId,
    request: ActionRequest,
    reply: Sender<ActionResponse>,
}

/// The page-side component: owns the page and its ledger, restores the stored record
/// once, then answers action requests.
///
/// Requests that arrive while the restore is in flight wait in a queue and run in
/// arrival order right after it completes.
pub struct ContentAgent {
    page: Page,
    ledger: Ledger,
    state: State,
    pending: VecDeque<Pending>,
    storage_tx: Sender<StorageCommand>,
    // Storage answers come back on the agent's own event channel.
    events_tx: Sender<PageEvent>,
    ids: RequestIds,
}

impl ContentAgent {
    /// Create the agent and ask storage for the page's record.
    pub fn new(page: Page, storage_tx: Sender<StorageCommand>, events_tx: Sender<PageEvent>) -> Self {
        let mut agent = Self {
            page,
            ledger: Ledger::new(),
            state: State::Ready,
            pending: VecDeque::new(),
            storage_tx,
            events_tx,
            ids: RequestIds::new(),
        };
        let request_id = agent.ids.next_id();
        let load = StorageCommand::Get {
            request_id,
            key: storage_key(agent.page.url()),
            reply: agent.events_tx.clone(),
        };
        if agent.storage_tx.send(load).is_ok() {
            agent.state = State::Restoring(request_id);
        } else {
            log::warn!(target: "veil.restore", "storage is unavailable; starting with nothing hidden");
        }
        agent
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    /// Process one event. Returns false once the agent should stop.
    pub fn handle_event(&mut self, event: PageEvent) -> bool {
        match event {
            PageEvent::Action {
                request_id,
                request,
                reply,
            } => {
                if self.is_ready() {
                    let response = self.dispatch(&request);
                    let _ = reply.send(response);
                } else {
                    log::debug!(
                        target: "veil.restore",
                        "deferring {} (request {request_id}) until restore completes",
                        request.action_name()
                    );
                    self.pending.push_back(Pending {
                        request_id,
                        request,
                        reply,
                    });
                }
            }
            PageEvent::Storage(event) => self.on_storage(event),
            PageEvent::Shutdown => return false,
        }
        true
    }

    fn on_storage(&mut self, event: StorageEvent) {
        let restoring = match self.state {
            State::Restoring(id) => id == event.request_id(),
            State::Ready => false,
        };
        match event {
            StorageEvent::Loaded { value, .. } if restoring => {
                self.restore(value);
                self.finish_restore();
            }
            StorageEvent::Failed { key, error, .. } if restoring => {
                log::warn!(target: "veil.restore", "could not read `{key}`: {error}");
                self.finish_restore();
            }
            StorageEvent::Failed { key, error, .. } => {
                log::warn!(target: "veil.storage", "could not update `{key}`: {error}");
            }
            StorageEvent::Written { request_id, key } | StorageEvent::Removed { request_id, key } => {
                log::trace!(target: "veil.storage", "request {request_id} on `{key}` done");
            }
            StorageEvent::Loaded { request_id, .. } => {
                log::debug!(target: "veil.storage", "ignoring stray load answer {request_id}");
            }
        }
    }

    fn restore(&mut self, value: Option<serde_json::Value>) {
        let Some(value) = value else {
            log::debug!(target: "veil.restore", "nothing stored for {}", self.page.url());
            return;
        };
        let record = match serde_json::from_value::<StoredRecord>(value) {
            Ok(stored) => stored.into_current(),
            Err(err) => {
                log::warn!(target: "veil.restore", "ignoring unreadable record: {err}");
                return;
            }
        };
        match record.apply(&mut self.ledger, &mut self.page) {
            Ok(applied) => log::info!(
                target: "veil.restore",
                "restored {applied} of {} hidden elements",
                record.selectors.len() + record.tags.len()
            ),
            Err(err) => log::warn!(target: "veil.restore", "restore stopped early: {err}"),
        }
    }

    fn finish_restore(&mut self) {
        self.state = State::Ready;
        while let Some(Pending {
            request_id,
            request,
            reply,
        }) = self.pending.pop_front()
        {
            log::debug!(target: "veil.restore", "running deferred request {request_id}");
            let response = self.dispatch(&request);
            let _ = reply.send(response);
        }
    }

    /// Run one action against the page. Only meaningful once the restore completed.
    pub fn dispatch(&mut self, request: &ActionRequest) -> ActionResponse {
        match self.run(request) {
            Ok(response) => response,
            Err(err) => {
                log::error!(target: "veil.agent", "{} failed: {err}", request.action_name());
                ActionResponse::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    fn run(&mut self, request: &ActionRequest) -> Result<ActionResponse, ContentError> {
        let response = match request {
            ActionRequest::HideElementsUnified { selector } => {
                let mut count = 0;
                for resolved in resolve_for_hide(self.page.doc(), selector) {
                    count += self
                        .ledger
                        .hide(&mut self.page, &resolved.elements, resolved.bare)?;
                }
                self.persist();
                changed(count, format!("Hid {count} elements"))
            }
            ActionRequest::ShowElementsUnified { selector } => {
                let mut count = 0;
                for resolved in resolve_for_show(self.page.doc(), selector) {
                    count += self.ledger.show(&mut self.page, &resolved.elements)?;
                }
                self.persist();
                changed(count, format!("Showed {count} elements"))
            }
            ActionRequest::HideBareTagElements { tag_name } => {
                let elements = bare_tag_elements(self.page.doc(), tag_name)
                    .map_err(|err| ContentError::selector(tag_name, err))?;
                let count = self.ledger.hide(&mut self.page, &elements, true)?;
                self.persist();
                changed(count, format!("Hid {count} {tag_name} elements"))
            }
            ActionRequest::ShowTagElements { tag_name } => {
                let elements = bare_marked_elements(self.page.doc(), tag_name)
                    .map_err(|err| ContentError::selector(tag_name, err))?;
                let count = self.ledger.show(&mut self.page, &elements)?;
                self.persist();
                changed(count, format!("Showed {count} {tag_name} elements"))
            }
            ActionRequest::ResetAll => {
                let count = self.ledger.reset_all(&mut self.page)?;
                self.clear_persisted();
                changed(count, format!("Showed {count} elements"))
            }
            ActionRequest::GetHiddenElements => {
                let (selectors, tags) = hidden_listing(&self.ledger, &self.page);
                ActionResponse::Listing {
                    selectors,
                    tags,
                    count: self.ledger.len(),
                }
            }
        };
        Ok(response)
    }

    /// Overwrite the page's stored record with the current ledger. Failures only cost
    /// durability and are logged.
    fn persist(&mut self) {
        let record = PersistedRecord::snapshot(&self.ledger, &self.page);
        let value = match serde_json::to_value(&record) {
            Ok(value) => value,
            Err(err) => {
                log::warn!(target: "veil.storage", "could not encode record: {err}");
                return;
            }
        };
        let cmd = StorageCommand::Set {
            request_id: self.ids.next_id(),
            key: storage_key(self.page.url()),
            value,
            reply: self.events_tx.clone(),
        };
        self.send_storage(cmd);
    }

    fn clear_persisted(&mut self) {
        let cmd = StorageCommand::Remove {
            request_id: self.ids.next_id(),
            key: storage_key(self.page.url()),
            reply: self.events_tx.clone(),
        };
        self.send_storage(cmd);
    }

    fn send_storage(&self, cmd: StorageCommand) {
        let key = cmd.key().to_string();
        if self.storage_tx.send(cmd).is_err() {
            log::warn!(target: "veil.storage", "storage is unavailable; `{key}` not updated");
        }
    }
}

fn changed(count: usize, message: String) -> ActionResponse {
    ActionResponse::Changed { count, message }
}

/// Run a [`ContentAgent`] on its own thread until it receives [`PageEvent::Shutdown`].
/// The thread hands the page back when it ends.
pub fn start_content_runtime(
    page: Page,
    storage_tx: Sender<StorageCommand>,
    evt_tx: Sender<PageEvent>,
    evt_rx: Receiver<PageEvent>,
) -> JoinHandle<Page> {
    thread::spawn(move || {
        let mut agent = ContentAgent::new(page, storage_tx, evt_tx);
        while let Ok(event) = evt_rx.recv() {
            if !agent.handle_event(event) {
                break;
            }
        }
        log::debug!(target: "veil.agent", "content runtime for {} stopped", agent.page().url());
        agent.into_page()
    })
}
