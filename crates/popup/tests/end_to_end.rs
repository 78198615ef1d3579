use std::sync::mpsc;
use std::time::Duration;

use bus::ActionRequest;
use popup::{ChannelConnector, HiddenItem, MessageClient, NoticeKind, Popup, RetryPolicy};
use runtime_storage::{MemoryArea, start_storage_runtime};

const URL: &str = "https://shop.test/deals";
const PAGE: &str = r#"<html><body>
  <div id="banner">Sale!</div>
  <aside class="ads">Buy</aside>
  <footer>links</footer>
</body></html>"#;

fn fast() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        delay: Duration::from_millis(1),
    }
}

#[test]
fn popup_drives_a_page_across_a_reload() {
    let (storage_tx, storage_rx) = mpsc::channel();
    let storage = start_storage_runtime(Box::new(MemoryArea::new()), storage_rx);

    let mut connector = ChannelConnector::new(storage_tx.clone());
    connector.open_tab(1, URL, PAGE);
    assert!(!connector.is_injected(1));

    // Opening the popup injects the page component on first contact.
    let mut popup = Popup::open(MessageClient::with_policy(connector, fast()), 1);
    assert!(popup.hidden_items().is_empty());

    popup.set_input("#banner");
    popup.choose_tag("footer");
    assert_eq!(popup.input(), "#banner, footer");
    let response = popup.hide().unwrap();
    assert_eq!(response.count(), Some(2));
    assert_eq!(popup.notice().unwrap().kind, NoticeKind::Success);
    assert_eq!(
        popup.hidden_items(),
        &[
            HiddenItem::Selector("#banner".into()),
            HiddenItem::BareTag("footer".into())
        ]
    );

    let pages = popup.into_client().into_connector().close_all();
    let html = pages[0].1.to_html();
    assert!(html.contains(r#"<div id="banner" style="display: none;" data-veil-hidden="true">"#));

    // A fresh load of the same URL picks the hidden set back up.
    let mut connector = ChannelConnector::new(storage_tx.clone());
    connector.open_tab(2, URL, PAGE);
    let mut popup = Popup::open(MessageClient::with_policy(connector, fast()), 2);
    assert_eq!(popup.hidden_items().len(), 2);

    popup.restore_item(1).unwrap();
    assert_eq!(popup.notice().unwrap().text, "Showed 1 elements");
    assert_eq!(popup.hidden_items(), &[HiddenItem::Selector("#banner".into())]);

    let reset = popup.reset_all();
    assert_eq!(reset.count(), Some(1));
    assert!(popup.hidden_items().is_empty());

    let mut client = popup.into_client();
    let listing = client.request(2, &ActionRequest::GetHiddenElements);
    assert_eq!(listing.count(), Some(0));
    client.into_connector().close_all();

    drop(storage_tx);
    storage.join().unwrap();
}

#[test]
fn unknown_tabs_fail_with_a_notice() {
    let (storage_tx, storage_rx) = mpsc::channel();
    let _storage = start_storage_runtime(Box::new(MemoryArea::new()), storage_rx);
    let connector = ChannelConnector::new(storage_tx);

    let mut popup = Popup::open(MessageClient::with_policy(connector, fast()), 42);
    popup.set_input("#x");
    let response = popup.hide().unwrap();
    assert!(!response.is_success());
    let notice = popup.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Warning);
    assert!(notice.text.contains("failed to load the page script"));
    assert_eq!(popup.input(), "#x");
}
