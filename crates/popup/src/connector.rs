use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use bus::{ActionRequest, ActionResponse, PageBus, PageEvent, StorageCommand};
use core_types::{RequestIds, TabId};
use hider::{Page, start_content_runtime};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("no page component is listening in tab {0}")]
    NotConnected(TabId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectError {
    #[error("tab {0} does not exist")]
    UnknownTab(TabId),
}

/// The popup's view of the browser: deliver a request to a tab's page component, or
/// load that component into the tab.
pub trait Connector {
    /// `Ok(None)` when the component received the request but never answered.
    fn send(&mut self, tab: TabId, request: &ActionRequest) -> Result<Option<ActionResponse>, SendError>;
    fn inject(&mut self, tab: TabId) -> Result<(), InjectError>;
}

struct TabSource {
    url: String,
    html: String,
}

struct Injected {
    tx: Sender<PageEvent>,
    handle: JoinHandle<Page>,
}

/// In-process tabs backed by content runtimes on their own threads.
///
/// A tab starts out without a page component; the first [`Connector::inject`] loads its
/// HTML and starts one against the shared storage runtime.
pub struct ChannelConnector {
    storage_tx: Sender<StorageCommand>,
    sources: HashMap<TabId, TabSource>,
    injected: HashMap<TabId, Injected>,
    // Pages whose component was replaced by a later inject.
    retired: Vec<(TabId, Page)>,
    ids: RequestIds,
    response_timeout: Duration,
}

impl ChannelConnector {
    pub fn new(storage_tx: Sender<StorageCommand>) -> Self {
        Self {
            storage_tx,
            sources: HashMap::new(),
            injected: HashMap::new(),
            retired: Vec::new(),
            ids: RequestIds::new(),
            response_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn open_tab(&mut self, tab: TabId, url: impl Into<String>, html: impl Into<String>) {
        self.sources.insert(
            tab,
            TabSource {
                url: url.into(),
                html: html.into(),
            },
        );
    }

    pub fn is_injected(&self, tab: TabId) -> bool {
        self.injected.contains_key(&tab)
    }

    /// Stop every page component and return the pages as they ended up, by tab. A tab
    /// that was injected more than once lists its replaced pages first.
    pub fn close_all(self) -> Vec<(TabId, Page)> {
        let mut pages = self.retired;
        for (tab, injected) in self.injected {
            if let Some(page) = shut_down(tab, injected) {
                pages.push((tab, page));
            }
        }
        pages.sort_by_key(|(tab, _)| *tab);
        pages
    }
}

fn shut_down(tab: TabId, injected: Injected) -> Option<Page> {
    let _ = injected.tx.send(PageEvent::Shutdown);
    match injected.handle.join() {
        Ok(page) => Some(page),
        Err(_) => {
            log::error!(target: "veil.popup", "page runtime for tab {tab} panicked");
            None
        }
    }
}

impl Connector for ChannelConnector {
    fn send(&mut self, tab: TabId, request: &ActionRequest) -> Result<Option<ActionResponse>, SendError> {
        let Some(injected) = self.injected.get(&tab) else {
            return Err(SendError::NotConnected(tab));
        };
        let (reply, answer) = mpsc::channel();
        let event = PageEvent::Action {
            request_id: self.ids.next_id(),
            request: request.clone(),
            reply,
        };
        if injected.tx.send(event).is_err() {
            self.injected.remove(&tab);
            return Err(SendError::NotConnected(tab));
        }
        match answer.recv_timeout(self.response_timeout) {
            Ok(response) => Ok(Some(response)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    fn inject(&mut self, tab: TabId) -> Result<(), InjectError> {
        let source = self.sources.get(&tab).ok_or(InjectError::UnknownTab(tab))?;
        if let Some(previous) = self.injected.remove(&tab) {
            if let Some(page) = shut_down(tab, previous) {
                self.retired.push((tab, page));
            }
        }
        let PageBus { evt_tx, evt_rx } = PageBus::new();
        let page = Page::load(source.url.clone(), &source.html);
        let handle = start_content_runtime(page, self.storage_tx.clone(), evt_tx.clone(), evt_rx);
        log::debug!(target: "veil.popup", "injected page component into tab {tab} ({})", source.url);
        self.injected.insert(tab, Injected { tx: evt_tx, handle });
        Ok(())
    }
}
