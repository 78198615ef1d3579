use bus::{ActionRequest, ActionResponse};
use core_types::TabId;

use crate::client::MessageClient;
use crate::connector::Connector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
}

/// The short message the popup flashes after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// One row of the hidden-elements list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiddenItem {
    Selector(String),
    BareTag(String),
}

impl HiddenItem {
    pub fn label(&self) -> String {
        match self {
            HiddenItem::Selector(selector) => selector.clone(),
            HiddenItem::BareTag(tag) => format!("<{tag}> (bare tag)"),
        }
    }

    /// What goes into the selector input when the row's restore button is used.
    pub fn value(&self) -> &str {
        match self {
            HiddenItem::Selector(value) | HiddenItem::BareTag(value) => value,
        }
    }
}

/// Popup form state for one tab.
pub struct Popup<C> {
    client: MessageClient<C>,
    tab: TabId,
    input: String,
    hidden: Vec<HiddenItem>,
    notice: Option<Notice>,
}

impl<C: Connector> Popup<C> {
    /// Open the popup for `tab` and load its hidden list.
    pub fn open(client: MessageClient<C>, tab: TabId) -> Self {
        let mut popup = Self {
            client,
            tab,
            input: String::new(),
            hidden: Vec::new(),
            notice: None,
        };
        popup.refresh();
        popup
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn hidden_items(&self) -> &[HiddenItem] {
        &self.hidden
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn into_client(self) -> MessageClient<C> {
        self.client
    }

    /// Append a tag picked from the tag list to the input.
    pub fn choose_tag(&mut self, tag: &str) {
        if tag.is_empty() {
            return;
        }
        let current = self.input.trim();
        self.input = if current.is_empty() {
            tag.to_string()
        } else {
            format!("{current}, {tag}")
        };
    }

    pub fn hide(&mut self) -> Option<ActionResponse> {
        let selector = self.take_selector()?;
        let response = self
            .client
            .request(self.tab, &ActionRequest::HideElementsUnified { selector });
        self.after_change(&response, |count| format!("Hid {count} elements"));
        Some(response)
    }

    pub fn show(&mut self) -> Option<ActionResponse> {
        let selector = self.take_selector()?;
        let response = self
            .client
            .request(self.tab, &ActionRequest::ShowElementsUnified { selector });
        self.after_change(&response, |count| format!("Showed {count} elements"));
        Some(response)
    }

    pub fn reset_all(&mut self) -> ActionResponse {
        let response = self.client.request(self.tab, &ActionRequest::ResetAll);
        let notice = match response.error() {
            None => {
                self.refresh();
                Notice::new(NoticeKind::Success, "Showed all elements")
            }
            Some(error) => Notice::new(NoticeKind::Error, non_empty_or(error, "Reset failed")),
        };
        self.notice = Some(notice);
        response
    }

    /// Put a hidden row back into the input and show it.
    pub fn restore_item(&mut self, index: usize) -> Option<ActionResponse> {
        let item = self.hidden.get(index)?;
        self.input = item.value().to_string();
        self.show()
    }

    /// Reload the hidden list from the page. Any failure shows an empty list.
    pub fn refresh(&mut self) {
        self.hidden = match self.client.request(self.tab, &ActionRequest::GetHiddenElements) {
            ActionResponse::Listing {
                selectors, tags, ..
            } => selectors
                .into_iter()
                .map(HiddenItem::Selector)
                .chain(tags.into_iter().map(HiddenItem::BareTag))
                .collect(),
            other => {
                log::debug!(target: "veil.popup", "hidden list unavailable: {other:?}");
                Vec::new()
            }
        };
    }

    fn take_selector(&mut self) -> Option<String> {
        let selector = self.input.trim();
        if selector.is_empty() {
            self.notice = Some(Notice::new(NoticeKind::Error, "Enter a selector"));
            return None;
        }
        Some(selector.to_string())
    }

    fn after_change(&mut self, response: &ActionResponse, success: impl Fn(usize) -> String) {
        match response {
            ActionResponse::Failed { error } => {
                self.notice = Some(Notice::new(
                    NoticeKind::Warning,
                    non_empty_or(error, "No matching elements found"),
                ));
            }
            other => {
                let count = other.count().unwrap_or_default();
                self.notice = Some(Notice::new(NoticeKind::Success, success(count)));
                self.input.clear();
                self.refresh();
            }
        }
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{InjectError, SendError};

    /// Answers with canned responses and records what it was sent.
    #[derive(Default)]
    struct Scripted {
        sent: Vec<ActionRequest>,
        hidden: Vec<String>,
    }

    impl Connector for Scripted {
        fn send(&mut self, _: TabId, request: &ActionRequest) -> Result<Option<ActionResponse>, SendError> {
            self.sent.push(request.clone());
            let response = match request {
                ActionRequest::HideElementsUnified { selector } => {
                    self.hidden.push(selector.clone());
                    ActionResponse::Changed {
                        count: 2,
                        message: String::new(),
                    }
                }
                ActionRequest::ShowElementsUnified { .. } => ActionResponse::Failed {
                    error: String::new(),
                },
                ActionRequest::GetHiddenElements => ActionResponse::Listing {
                    selectors: self.hidden.clone(),
                    tags: vec!["footer".into()],
                    count: self.hidden.len() + 1,
                },
                _ => ActionResponse::Failed {
                    error: "boom".into(),
                },
            };
            Ok(Some(response))
        }

        fn inject(&mut self, _: TabId) -> Result<(), InjectError> {
            Ok(())
        }
    }

    fn popup() -> Popup<Scripted> {
        Popup::open(MessageClient::new(Scripted::default()), 1)
    }

    #[test]
    fn empty_input_sends_nothing() {
        let mut popup = popup();
        popup.set_input("   ");
        assert!(popup.hide().is_none());
        assert_eq!(popup.notice().unwrap().kind, NoticeKind::Error);
        let client = popup.into_client();
        assert_eq!(client.connector().sent, vec![ActionRequest::GetHiddenElements]);
    }

    #[test]
    fn successful_hide_clears_input_and_refreshes() {
        let mut popup = popup();
        popup.set_input(" .ads ");
        popup.hide().unwrap();
        assert_eq!(popup.input(), "");
        assert_eq!(
            popup.notice(),
            Some(&Notice::new(NoticeKind::Success, "Hid 2 elements"))
        );
        assert_eq!(
            popup.hidden_items(),
            &[HiddenItem::Selector(".ads".into()), HiddenItem::BareTag("footer".into())]
        );
        assert_eq!(popup.hidden_items()[1].label(), "<footer> (bare tag)");
    }

    #[test]
    fn failures_keep_the_input_and_warn() {
        let mut popup = popup();
        popup.set_input("#gone");
        popup.show().unwrap();
        assert_eq!(popup.input(), "#gone");
        assert_eq!(
            popup.notice(),
            Some(&Notice::new(NoticeKind::Warning, "No matching elements found"))
        );
        popup.reset_all();
        assert_eq!(popup.notice(), Some(&Notice::new(NoticeKind::Error, "boom")));
    }

    #[test]
    fn tag_picker_appends_to_the_input() {
        let mut popup = popup();
        popup.choose_tag("footer");
        assert_eq!(popup.input(), "footer");
        popup.set_input("#banner ");
        popup.choose_tag("aside");
        assert_eq!(popup.input(), "#banner, aside");
        popup.choose_tag("");
        assert_eq!(popup.input(), "#banner, aside");
    }

    #[test]
    fn restore_item_shows_that_row() {
        let mut popup = popup();
        popup.restore_item(0).unwrap();
        let client = popup.into_client();
        assert_eq!(
            client.connector().sent.last(),
            Some(&ActionRequest::ShowElementsUnified {
                selector: "footer".into()
            })
        );
    }
}
