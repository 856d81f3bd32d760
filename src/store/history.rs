//! Saved analyses, newest first, capped at [`MAX_HISTORY_ITEMS`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{load_json, save_json, KeyValueStore, StoreError};
use crate::config::MAX_HISTORY_ITEMS;

pub const HISTORY_KEY: &str = "xrayai_upload_history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    pub file_name: String,
    /// Raw payload as returned by the inference API.
    pub predictions: Value,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// Display date, e.g. "October 19, 2025 at 03:04 PM".
    pub date: String,
}

/// Caller-supplied part of a history entry.
#[derive(Debug, Clone)]
pub struct NewHistoryItem {
    pub patient_name: Option<String>,
    pub file_name: String,
    pub predictions: Value,
}

pub struct HistoryStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> HistoryStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<HistoryItem>, StoreError> {
        Ok(load_json(self.store, HISTORY_KEY)?.unwrap_or_default())
    }

    /// Prepend a new entry and drop the oldest beyond the cap.
    pub fn add(&self, item: NewHistoryItem) -> Result<HistoryItem, StoreError> {
        self.add_at(item, Utc::now())
    }

    pub fn add_at(&self, item: NewHistoryItem, at: DateTime<Utc>) -> Result<HistoryItem, StoreError> {
        let entry = HistoryItem {
            id: Uuid::new_v4().to_string(),
            patient_name: item.patient_name.filter(|n| !n.trim().is_empty()),
            file_name: item.file_name,
            predictions: item.predictions,
            timestamp: at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            date: at.format("%B %-d, %Y at %I:%M %p").to_string(),
        };

        let mut items = self.list()?;
        items.insert(0, entry.clone());
        if items.len() > MAX_HISTORY_ITEMS {
            tracing::debug!(dropped = items.len() - MAX_HISTORY_ITEMS, "Trimming upload history");
            items.truncate(MAX_HISTORY_ITEMS);
        }
        save_json(self.store, HISTORY_KEY, &items)?;
        Ok(entry)
    }

    pub fn get(&self, id: &str) -> Result<Option<HistoryItem>, StoreError> {
        Ok(self.list()?.into_iter().find(|item| item.id == id))
    }

    /// Returns false when no entry had this id.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut items = self.list()?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }
        save_json(self.store, HISTORY_KEY, &items)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.delete(HISTORY_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn upload(name: &str) -> NewHistoryItem {
        NewHistoryItem {
            patient_name: None,
            file_name: name.to_string(),
            predictions: json!({"Pneumonia": 0.8}),
        }
    }

    #[test]
    fn newest_first() {
        let kv = MemoryStore::new();
        let history = HistoryStore::new(&kv);
        history.add(upload("first.png")).unwrap();
        history.add(upload("second.png")).unwrap();

        let items = history.list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].file_name, "second.png");
        assert_ne!(items[0].id, items[1].id);
    }

    #[test]
    fn capped_at_max_items() {
        let kv = MemoryStore::new();
        let history = HistoryStore::new(&kv);
        for i in 0..(MAX_HISTORY_ITEMS + 5) {
            history.add(upload(&format!("{i}.png"))).unwrap();
        }
        let items = history.list().unwrap();
        assert_eq!(items.len(), MAX_HISTORY_ITEMS);
        assert_eq!(items[0].file_name, format!("{}.png", MAX_HISTORY_ITEMS + 4));
        assert_eq!(items.last().unwrap().file_name, "5.png");
    }

    #[test]
    fn get_delete_clear() {
        let kv = MemoryStore::new();
        let history = HistoryStore::new(&kv);
        let a = history.add(upload("a.png")).unwrap();
        let b = history.add(upload("b.png")).unwrap();

        assert_eq!(history.get(&a.id).unwrap().unwrap().file_name, "a.png");
        assert!(history.delete(&a.id).unwrap());
        assert!(!history.delete(&a.id).unwrap());
        assert!(history.get(&a.id).unwrap().is_none());
        assert!(history.get(&b.id).unwrap().is_some());

        history.clear().unwrap();
        assert!(history.list().unwrap().is_empty());
    }

    #[test]
    fn stamps_timestamp_and_display_date() {
        let kv = MemoryStore::new();
        let history = HistoryStore::new(&kv);
        let at = Utc.timestamp_millis_opt(1_760_886_245_123).unwrap();
        let item = history.add_at(upload("a.png"), at).unwrap();
        assert_eq!(item.timestamp, "2025-10-19T15:04:05.123Z");
        assert_eq!(item.date, "October 19, 2025 at 03:04 PM");
    }

    #[test]
    fn serialized_with_camel_case_keys() {
        let kv = MemoryStore::new();
        let history = HistoryStore::new(&kv);
        history
            .add(NewHistoryItem {
                patient_name: Some("Jane".into()),
                ..upload("a.png")
            })
            .unwrap();
        let raw = kv.get(HISTORY_KEY).unwrap().unwrap();
        assert!(raw.contains("\"fileName\":\"a.png\""));
        assert!(raw.contains("\"patientName\":\"Jane\""));
    }

    #[test]
    fn works_over_sqlite() {
        let kv = crate::store::SqliteStore::open_in_memory().unwrap();
        let history = HistoryStore::new(&kv);
        let item = history.add(upload("scan.jpg")).unwrap();
        assert_eq!(history.list().unwrap(), vec![item]);
    }
}
