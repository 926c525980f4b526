use std::io;

use itertools::Itertools;

use crate::models::{DikrItem, SessionMode, SessionRecord};
use crate::stats::format_date;
use crate::store::{load_json, persist, KeyValueStore, KEY_HISTORY};

/// Session log, newest first by convention
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    records: Vec<SessionRecord>,
}

impl History {
    pub fn new(records: Vec<SessionRecord>) -> Self {
        Self { records }
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self::new(load_json(store, KEY_HISTORY).unwrap_or_default())
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        persist(store, KEY_HISTORY, &self.records);
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&mut self, rec: SessionRecord) {
        log::info!(
            "recorded {} session for {}: count={} duration={:.0}ms",
            rec.mode,
            rec.dikr_name,
            rec.count,
            rec.duration_ms
        );
        self.records.insert(0, rec);
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Clear everything, or only one item's records
    pub fn clear(&mut self, dikr_id: Option<&str>) {
        match dikr_id {
            Some(id) => self.records.retain(|r| r.dikr_id != id),
            None => self.records.clear(),
        }
    }

    /// Keep the denormalized name in sync with a renamed item
    pub fn rename_dikr(&mut self, dikr_id: &str, name: &str) {
        self.records
            .iter_mut()
            .filter(|r| r.dikr_id == dikr_id)
            .for_each(|r| r.dikr_name = name.to_string());
    }

    /// Log repetitions done away from the timer. Needs a calibrated item.
    pub fn add_manual(&mut self, item: &DikrItem, count: u64, date: i64) -> Option<&SessionRecord> {
        let duration = item.duration_ms()?;
        if count == 0 {
            return None;
        }
        self.record(SessionRecord::new(
            item,
            date,
            duration * count as f64,
            count,
            SessionMode::Free,
            None,
        ));
        self.records.first()
    }

    pub fn filtered<'a>(&'a self, dikr_id: Option<&str>) -> impl Iterator<Item = &'a SessionRecord> + 'a {
        let dikr_id = dikr_id.map(str::to_owned);
        self.records
            .iter()
            .filter(move |r| dikr_id.as_deref().map_or(true, |id| r.dikr_id == id))
    }

    /// Records for display, most recent first
    pub fn sorted(&self, dikr_id: Option<&str>) -> Vec<&SessionRecord> {
        self.filtered(dikr_id)
            .sorted_by(|a, b| b.date.cmp(&a.date))
            .collect()
    }

    pub fn replace_all(&mut self, records: Vec<SessionRecord>) {
        self.records = records;
    }

    pub fn write_csv<W: io::Write>(&self, w: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(["date", "dikr", "mode", "count", "target", "duration_ms"])?;
        for r in self.sorted(None) {
            wtr.write_record([
                format_date(r.date),
                r.dikr_name.clone(),
                r.mode.to_string(),
                r.count.to_string(),
                r.target.map(|t| t.to_string()).unwrap_or_default(),
                format!("{:.0}", r.duration_ms),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, ms: Option<f64>) -> DikrItem {
        DikrItem {
            calibrated_duration_ms: ms,
            ..DikrItem::new(name)
        }
    }

    #[test]
    fn record_prepends() {
        let a = item("a", Some(1000.0));
        let mut h = History::default();
        h.record(SessionRecord::new(&a, 1, 1000.0, 1, SessionMode::Free, None));
        h.record(SessionRecord::new(&a, 2, 2000.0, 2, SessionMode::Free, None));
        assert_eq!(h.records()[0].date, 2);
    }

    #[test]
    fn clear_by_item_keeps_others() {
        let a = item("a", Some(1000.0));
        let b = item("b", Some(1000.0));
        let mut h = History::default();
        h.record(SessionRecord::new(&a, 1, 1000.0, 1, SessionMode::Free, None));
        h.record(SessionRecord::new(&b, 2, 1000.0, 1, SessionMode::Free, None));
        h.clear(Some(&a.id));
        assert_eq!(h.len(), 1);
        assert_eq!(h.records()[0].dikr_id, b.id);
        h.clear(None);
        assert!(h.is_empty());
    }

    #[test]
    fn manual_entry_requires_calibration() {
        let mut h = History::default();
        assert!(h.add_manual(&item("raw", None), 10, 0).is_none());
        let rec = h.add_manual(&item("ok", Some(1200.0)), 10, 42).unwrap();
        assert_eq!(rec.duration_ms, 12_000.0);
        assert_eq!(rec.mode, SessionMode::Free);
        assert_eq!(rec.date, 42);
        assert!(h.add_manual(&item("ok", Some(1200.0)), 0, 42).is_none());
    }

    #[test]
    fn rename_rewrites_snapshots() {
        let a = item("old", Some(1000.0));
        let mut h = History::default();
        h.record(SessionRecord::new(&a, 1, 1000.0, 1, SessionMode::Free, None));
        h.rename_dikr(&a.id, "new");
        assert_eq!(h.records()[0].dikr_name, "new");
    }

    #[test]
    fn sorted_is_by_date_desc() {
        let a = item("a", Some(1000.0));
        let mut h = History::default();
        for d in [5, 1, 9, 3] {
            h.record(SessionRecord::new(&a, d, 1000.0, 1, SessionMode::Free, None));
        }
        let dates: Vec<_> = h.sorted(None).iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![9, 5, 3, 1]);
        assert_eq!(h.sorted(Some("nobody")).len(), 0);
    }

    #[test]
    fn csv_has_header_and_rows() {
        let a = item("tasbih", Some(1000.0));
        let mut h = History::default();
        h.record(SessionRecord::new(&a, 0, 5000.0, 5, SessionMode::Target, Some(5)));
        let mut buf = Vec::new();
        h.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("date,dikr,mode,count,target,duration_ms"));
        let row = lines.next().unwrap();
        assert!(row.ends_with(",tasbih,target,5,5,5000"));
    }
}
