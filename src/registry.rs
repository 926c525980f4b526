use crate::models::DikrItem;
use crate::store::{load_json, persist, KeyValueStore, KEY_DIKRS};

/// Ordered list of user-defined items, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    items: Vec<DikrItem>,
}

impl Registry {
    pub fn new(items: Vec<DikrItem>) -> Self {
        Self { items }
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self::new(load_json(store, KEY_DIKRS).unwrap_or_default())
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        persist(store, KEY_DIKRS, &self.items);
    }

    pub fn items(&self) -> &[DikrItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DikrItem> {
        self.items.iter().find(|d| d.id == id)
    }

    /// Insert a new uncalibrated item at the front. Blank names are refused.
    pub fn add(&mut self, name: &str) -> Option<&DikrItem> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.items.insert(0, DikrItem::new(name));
        self.items.first()
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim();
        match self.items.iter_mut().find(|d| d.id == id) {
            Some(item) if !name.is_empty() => {
                item.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|d| d.id != id);
        self.items.len() != before
    }

    pub fn set_calibration(&mut self, id: &str, duration_ms: f64) -> bool {
        match self.items.iter_mut().find(|d| d.id == id) {
            Some(item) => {
                item.calibrated_duration_ms = Some(duration_ms);
                true
            }
            None => false,
        }
    }

    pub fn replace_all(&mut self, items: Vec<DikrItem>) {
        self.items = items;
    }
}
