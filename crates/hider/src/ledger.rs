use std::collections::BTreeMap;

use css::set_inline_property;
use html::{DomError, Id};

use crate::page::Page;

pub const HIDDEN_MARKER: &str = "data-veil-hidden";
pub const BARE_MARKER: &str = "data-veil-bare";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenEntry {
    /// Computed `display` captured right before the element was hidden.
    pub original_display: String,
    pub bare: bool,
}

/// Elements this page load has hidden. An element is in the ledger exactly when it
/// carries [`HIDDEN_MARKER`].
///
/// Keys are document handles, so iteration runs in node creation order, which for a
/// parsed page is document order.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: BTreeMap<Id, HiddenEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: Id) -> Option<&HiddenEntry> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, &HiddenEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Hide every element not already hidden and return how many changed.
    pub fn hide(&mut self, page: &mut Page, elements: &[Id], bare: bool) -> Result<usize, DomError> {
        let mut count = 0;
        for &id in elements {
            if self.contains(id) {
                continue;
            }
            let original_display = page.computed_display(id).to_string();
            self.insert(page, id, original_display, bare)?;
            count += 1;
        }
        log::debug!(target: "veil.ledger", "hid {count} of {} elements", elements.len());
        Ok(count)
    }

    /// Insert an entry whose display was captured on an earlier page load. Returns false
    /// when the element is already hidden.
    pub fn adopt(
        &mut self,
        page: &mut Page,
        id: Id,
        original_display: &str,
        bare: bool,
    ) -> Result<bool, DomError> {
        if self.contains(id) {
            return Ok(false);
        }
        self.insert(page, id, original_display.to_string(), bare)?;
        Ok(true)
    }

    fn insert(
        &mut self,
        page: &mut Page,
        id: Id,
        original_display: String,
        bare: bool,
    ) -> Result<(), DomError> {
        let doc = page.doc_mut();
        set_inline_property(doc, id, "display", "none")?;
        doc.set_attr(id, HIDDEN_MARKER, "true")?;
        if bare {
            doc.set_attr(id, BARE_MARKER, "true")?;
        }
        self.entries.insert(
            id,
            HiddenEntry {
                original_display,
                bare,
            },
        );
        Ok(())
    }

    /// Show every listed element that is hidden and return how many changed.
    pub fn show(&mut self, page: &mut Page, elements: &[Id]) -> Result<usize, DomError> {
        let mut count = 0;
        for &id in elements {
            let Some(entry) = self.entries.remove(&id) else {
                continue;
            };
            restore(page, id, &entry)?;
            count += 1;
        }
        log::debug!(target: "veil.ledger", "showed {count} of {} elements", elements.len());
        Ok(count)
    }

    pub fn reset_all(&mut self, page: &mut Page) -> Result<usize, DomError> {
        let entries = std::mem::take(&mut self.entries);
        let count = entries.len();
        for (id, entry) in &entries {
            restore(page, *id, entry)?;
        }
        log::debug!(target: "veil.ledger", "reset {count} elements");
        Ok(count)
    }
}

// A captured `none` came from the page's own styling; clearing the inline value lets that
// styling apply again.
fn restore(page: &mut Page, id: Id, entry: &HiddenEntry) -> Result<(), DomError> {
    let display = match entry.original_display.as_str() {
        "none" => "",
        other => other,
    };
    let doc = page.doc_mut();
    set_inline_property(doc, id, "display", display)?;
    doc.remove_attr(id, HIDDEN_MARKER)?;
    doc.remove_attr(id, BARE_MARKER)?;
    Ok(())
}
