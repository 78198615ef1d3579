use serde::{Deserialize, Serialize};

use html::DomError;

use crate::identifier;
use crate::ledger::Ledger;
use crate::page::Page;

const KEY_PREFIX: &str = "content_hidden_";

/// Storage key for a page: the full URL behind a fixed prefix.
pub fn storage_key(url: &str) -> String {
    format!("{KEY_PREFIX}{url}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEntry {
    pub identifier: String,
    #[serde(default)]
    pub original_display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTagEntry {
    pub identifier: String,
    #[serde(default)]
    pub original_display: String,
    pub tag_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(default)]
    pub selectors: Vec<PersistedEntry>,
    #[serde(default)]
    pub tags: Vec<PersistedTagEntry>,
}

/// What may be found under a page key: the current shape or the older flat list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredRecord {
    Current(PersistedRecord),
    Legacy(Vec<PersistedEntry>),
}

impl StoredRecord {
    /// A legacy list reads as a record with only plain selector entries.
    pub fn into_current(self) -> PersistedRecord {
        match self {
            StoredRecord::Current(record) => record,
            StoredRecord::Legacy(selectors) => PersistedRecord {
                selectors,
                tags: Vec::new(),
            },
        }
    }
}

impl PersistedRecord {
    /// Encode every hidden element, split by how it was hidden.
    pub fn snapshot(ledger: &Ledger, page: &Page) -> Self {
        let doc = page.doc();
        let mut record = PersistedRecord::default();
        for (id, entry) in ledger.iter() {
            let identifier = identifier::encode(doc, id);
            let original_display = entry.original_display.clone();
            if entry.bare {
                record.tags.push(PersistedTagEntry {
                    identifier,
                    original_display,
                    tag_name: doc.tag_name(id).unwrap_or_default().to_string(),
                });
            } else {
                record.selectors.push(PersistedEntry {
                    identifier,
                    original_display,
                });
            }
        }
        record
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty() && self.tags.is_empty()
    }

    /// Re-hide what a previous page load recorded and return how many elements were
    /// hidden. Identifiers that no longer resolve, and tag entries whose element has a
    /// different tag now, are skipped.
    pub fn apply(&self, ledger: &mut Ledger, page: &mut Page) -> Result<usize, DomError> {
        let mut applied = 0;
        for entry in &self.selectors {
            let Some(id) = identifier::decode(page.doc(), &entry.identifier) else {
                log::debug!(target: "veil.restore", "no element for `{}`", entry.identifier);
                continue;
            };
            if ledger.adopt(page, id, &entry.original_display, false)? {
                applied += 1;
            }
        }
        for entry in &self.tags {
            let found = identifier::decode(page.doc(), &entry.identifier)
                .filter(|id| page.doc().tag_name(*id) == Some(entry.tag_name.as_str()));
            let Some(id) = found else {
                log::debug!(
                    target: "veil.restore",
                    "no <{}> element for `{}`",
                    entry.tag_name,
                    entry.identifier
                );
                continue;
            };
            if ledger.adopt(page, id, &entry.original_display, true)? {
                applied += 1;
            }
        }
        Ok(applied)
    }
}

/// The `getHiddenElements` view: distinct identifiers of elements hidden by selector and
/// distinct tag names of elements hidden as bare tags, first occurrence first.
pub fn hidden_listing(ledger: &Ledger, page: &Page) -> (Vec<String>, Vec<String>) {
    let doc = page.doc();
    let mut selectors: Vec<String> = Vec::new();
    let mut tags: Vec<String> = Vec::new();
    for (id, entry) in ledger.iter() {
        if entry.bare {
            let tag = doc.tag_name(id).unwrap_or_default();
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        } else {
            let identifier = identifier::encode(doc, id);
            if !selectors.contains(&identifier) {
                selectors.push(identifier);
            }
        }
    }
    (selectors, tags)
}
