use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use bus::{ActionRequest, ActionResponse, PageEvent, StorageCommand};
use css::inline_property;
use hider::{BARE_MARKER, HIDDEN_MARKER, Ledger, Page, start_content_runtime, storage_key};
use runtime_storage::{MemoryArea, StorageArea, StorageError, start_storage_runtime};
use serde_json::json;

const URL: &str = "https://news.test/article?id=7";

const ARTICLE: &str = r#"<!DOCTYPE html>
<html><head><style>
  .ads { display: flex }
  .pre-hidden { display: none }
</style></head>
<body>
  <div id="banner">Breaking</div>
  <div class="ads">Buy now</div>
  <div class="ads promo">Buy later</div>
  <div>plain one</div>
  <div id="x">has id</div>
  <div class="y">has class</div>
  <p class="pre-hidden">already hidden</p>
  <footer>site footer</footer>
</body></html>"#;

struct Harness {
    tx: Sender<PageEvent>,
    page: JoinHandle<Page>,
    storage: JoinHandle<()>,
    storage_tx: Sender<StorageCommand>,
}

impl Harness {
    fn start(html: &str, area: MemoryArea) -> Self {
        Self::start_with(html, Box::new(area))
    }

    fn start_with(html: &str, area: Box<dyn StorageArea + Send>) -> Self {
        let (storage_tx, storage_rx) = mpsc::channel();
        let storage = start_storage_runtime(area, storage_rx);
        let (tx, rx) = mpsc::channel();
        let page = start_content_runtime(Page::load(URL, html), storage_tx.clone(), tx.clone(), rx);
        Self {
            tx,
            page,
            storage,
            storage_tx,
        }
    }

    fn send(&self, request: ActionRequest) -> ActionResponse {
        let (reply, answer) = mpsc::channel();
        self.tx
            .send(PageEvent::Action {
                request_id: 0,
                request,
                reply,
            })
            .unwrap();
        answer.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    fn hide(&self, selector: &str) -> ActionResponse {
        self.send(ActionRequest::HideElementsUnified {
            selector: selector.to_string(),
        })
    }

    fn show(&self, selector: &str) -> ActionResponse {
        self.send(ActionRequest::ShowElementsUnified {
            selector: selector.to_string(),
        })
    }

    /// Stop both runtimes and return the page plus what storage holds for it.
    fn stop(self) -> (Page, Option<serde_json::Value>) {
        let (reply, answer) = mpsc::channel();
        self.storage_tx
            .send(StorageCommand::Get {
                request_id: 99,
                key: storage_key(URL),
                reply,
            })
            .unwrap();
        // Storage commands run in order, so this read sees every earlier write.
        let stored = match answer.recv_timeout(Duration::from_secs(5)).unwrap() {
            PageEvent::Storage(bus::StorageEvent::Loaded { value, .. }) => value,
            other => panic!("unexpected {other:?}"),
        };
        (self.shutdown(), stored)
    }

    fn shutdown(self) -> Page {
        self.tx.send(PageEvent::Shutdown).unwrap();
        let page = self.page.join().unwrap();
        drop(self.storage_tx);
        self.storage.join().unwrap();
        page
    }
}

/// Every call fails, like a store on a vanished disk.
struct BrokenArea;

impl BrokenArea {
    fn error() -> StorageError {
        StorageError::Io {
            path: PathBuf::from("/gone/store.json"),
            source: io::Error::other("device removed"),
        }
    }
}

impl StorageArea for BrokenArea {
    fn get(&self, _: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Err(Self::error())
    }

    fn set(&mut self, _: &str, _: serde_json::Value) -> Result<(), StorageError> {
        Err(Self::error())
    }

    fn remove(&mut self, _: &str) -> Result<bool, StorageError> {
        Err(Self::error())
    }
}

fn stored(record: serde_json::Value) -> MemoryArea {
    let mut area = MemoryArea::new();
    area.set(&storage_key(URL), record).unwrap();
    area
}

#[test]
fn hide_then_show_restores_the_pre_hide_display() {
    let mut page = Page::load(URL, ARTICLE);
    let mut ledger = Ledger::new();
    for id in page.doc().elements().collect::<Vec<_>>() {
        let before = page.computed_display(id);
        if before == css::Display::None {
            continue;
        }
        assert_eq!(ledger.hide(&mut page, &[id], false).unwrap(), 1);
        assert_eq!(page.computed_display(id), css::Display::None);
        assert_eq!(ledger.show(&mut page, &[id]).unwrap(), 1);
        assert_eq!(page.computed_display(id), before);
        assert!(!ledger.contains(id));
        assert!(!page.doc().has_attr(id, HIDDEN_MARKER));
    }
}

#[test]
fn hiding_again_is_a_no_op() {
    let h = Harness::start(ARTICLE, MemoryArea::new());
    assert_eq!(h.hide(".ads").count(), Some(2));
    assert_eq!(h.hide(".ads, .promo").count(), Some(0));
    assert_eq!(h.show(".ads").count(), Some(2));
    let (page, _) = h.stop();
    let ads: Vec<_> = css::select(page.doc(), ".ads").unwrap();
    for id in ads {
        assert_eq!(inline_property(page.doc(), id, "display").as_deref(), Some("flex"));
    }
}

#[test]
fn reset_all_counts_every_hidden_element() {
    let h = Harness::start(ARTICLE, MemoryArea::new());
    h.hide("#banner");
    h.hide(".ads, footer");
    h.send(ActionRequest::HideBareTagElements {
        tag_name: "div".into(),
    });
    let listed = h.send(ActionRequest::GetHiddenElements);
    assert_eq!(listed.count(), Some(5));

    assert_eq!(h.send(ActionRequest::ResetAll).count(), Some(5));
    assert_eq!(h.send(ActionRequest::GetHiddenElements).count(), Some(0));
    let (page, stored) = h.stop();
    assert_eq!(stored, None);
    assert!(css::select(page.doc(), &format!("[{HIDDEN_MARKER}]")).unwrap().is_empty());
}

#[test]
fn bare_div_only_hides_plain_divs() {
    let h = Harness::start(ARTICLE, MemoryArea::new());
    let response = h.send(ActionRequest::HideBareTagElements {
        tag_name: "div".into(),
    });
    assert_eq!(response.count(), Some(1));
    let (page, _) = h.stop();
    let doc = page.doc();
    for id in doc.elements_by_tag("div") {
        let plain = doc.element_id(id).is_none() && doc.class_list(id).next().is_none();
        assert_eq!(doc.has_attr(id, HIDDEN_MARKER), plain);
        assert_eq!(doc.has_attr(id, BARE_MARKER), plain);
    }
}

#[test]
fn mixed_expression_resolves_each_clause_its_own_way() {
    let h = Harness::start(ARTICLE, MemoryArea::new());
    let response = h.hide("#banner, .ads, footer");
    assert_eq!(response.count(), Some(4));
    let listing = h.send(ActionRequest::GetHiddenElements);
    assert_eq!(
        listing,
        ActionResponse::Listing {
            selectors: vec!["#banner".into(), ".ads".into(), ".ads.promo".into()],
            tags: vec!["footer".into()],
            count: 4,
        }
    );

    // The bare clause in a show only reaches bare-hidden footers.
    assert_eq!(h.show("footer").count(), Some(1));
    let (_, stored) = h.stop();
    assert_eq!(
        stored,
        Some(json!({
            "selectors": [
                {"identifier": "#banner", "originalDisplay": "block"},
                {"identifier": ".ads", "originalDisplay": "flex"},
                {"identifier": ".ads.promo", "originalDisplay": "flex"}
            ],
            "tags": []
        }))
    );
}

#[test]
fn legacy_and_current_records_restore_the_same_way() {
    let html = r#"<div id="ad1">ad</div><div id="ad2">other</div>"#;
    let legacy = json!([{"identifier": "#ad1", "originalDisplay": "block"}]);
    let current = json!({
        "selectors": [{"identifier": "#ad1", "originalDisplay": "block"}],
        "tags": []
    });

    let mut outcomes = Vec::new();
    for record in [legacy, current] {
        let h = Harness::start(html, stored(record));
        let listing = h.send(ActionRequest::GetHiddenElements);
        let (page, _) = h.stop();
        outcomes.push((listing, page.to_html()));
    }
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[0].0.count(), Some(1));
    assert!(outcomes[0].1.contains(r#"<div id="ad1" style="display: none;" data-veil-hidden="true">"#));
}

#[test]
fn restored_entries_show_with_their_stored_display() {
    let record = json!({
        "selectors": [{"identifier": ".ads.promo", "originalDisplay": "inline-block"}],
        "tags": [
            {"identifier": "footer[text=\"site\"]", "originalDisplay": "block", "tagName": "footer"},
            {"identifier": "#banner", "originalDisplay": "block", "tagName": "footer"},
            {"identifier": "#gone", "originalDisplay": "block", "tagName": "aside"}
        ]
    });
    let h = Harness::start(ARTICLE, stored(record));
    assert_eq!(h.send(ActionRequest::GetHiddenElements).count(), Some(2));
    assert_eq!(
        h.send(ActionRequest::ShowTagElements {
            tag_name: "footer".into()
        })
        .count(),
        Some(1)
    );
    assert_eq!(h.show(".promo").count(), Some(1));
    let (page, _) = h.stop();
    let promo = css::select(page.doc(), ".promo").unwrap()[0];
    assert_eq!(
        inline_property(page.doc(), promo, "display").as_deref(),
        Some("inline-block")
    );
}

#[test]
fn page_hidden_element_restores_to_natural_styling() {
    let h = Harness::start(ARTICLE, MemoryArea::new());
    assert_eq!(h.hide(".pre-hidden").count(), Some(1));
    assert_eq!(h.show(".pre-hidden").count(), Some(1));
    let (page, _) = h.stop();
    let p = css::select(page.doc(), ".pre-hidden").unwrap()[0];
    assert_eq!(inline_property(page.doc(), p, "display"), None);
    assert_eq!(page.computed_display(p), css::Display::None);
}

#[test]
fn encode_decode_round_trip_keeps_tag_and_id() {
    let page = Page::load(
        URL,
        r#"<main id="m"><section id="s1"><h2 id="h">T</h2><p id="p1">a</p></section>
           <section id="s2"><p id="p2">a</p></section></main>"#,
    );
    let doc = page.doc();
    for id in doc.elements() {
        let found = hider::decode(doc, &hider::encode(doc, id)).unwrap();
        assert_eq!(doc.tag_name(found), doc.tag_name(id));
        assert_eq!(doc.element_id(found), doc.element_id(id));
    }
}

#[test]
fn unknown_and_malformed_messages() {
    assert_eq!(
        bus::decode_request(&json!({"action": "explode"})),
        Err(ActionResponse::unknown_action())
    );
    let h = Harness::start(ARTICLE, MemoryArea::new());
    let response = h.send(ActionRequest::ShowTagElements {
        tag_name: "foo bar[".into(),
    });
    assert!(!response.is_success());
    h.stop();
}

#[test]
fn broken_storage_still_serves_the_page() {
    let h = Harness::start_with(ARTICLE, Box::new(BrokenArea));
    assert_eq!(h.hide("#banner").count(), Some(1));
    assert_eq!(
        h.send(ActionRequest::GetHiddenElements),
        ActionResponse::Listing {
            selectors: vec!["#banner".into()],
            tags: Vec::new(),
            count: 1,
        }
    );
    assert_eq!(h.send(ActionRequest::ResetAll).count(), Some(1));
    let page = h.shutdown();
    assert!(css::select(page.doc(), &format!("[{HIDDEN_MARKER}]")).unwrap().is_empty());
}
