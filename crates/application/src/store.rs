use std::sync::Arc;

use product_inspect_domain::{
    CompanyProfile, Counters, DetectionBatch, DetectionHistory, ProductDraft, ProductId,
    SampleKind, TrainingSamples,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{ApplicationError, Clock, SnapshotStore};

pub const STATS_KEY: &str = "productInspectionStats";
pub const HISTORY_KEY: &str = "detectedProducts";
pub const COMPANY_KEY: &str = "companyInfo";

/// In-memory inspection state mirrored to a [`SnapshotStore`] after every mutation.
pub struct InspectionStore {
    snapshots: Box<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    counters: Counters,
    history: DetectionHistory,
    company: CompanyProfile,
}

impl InspectionStore {
    pub fn new(snapshots: Box<dyn SnapshotStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            snapshots,
            clock,
            counters: Counters::default(),
            history: DetectionHistory::default(),
            company: CompanyProfile::default(),
        }
    }

    /// Loads each slice on its own; a missing or unreadable slice keeps its default.
    pub fn restore(&mut self) -> Result<(), ApplicationError> {
        self.snapshots.initialize()?;
        if let Some(counters) = self.restore_slice::<Counters>(STATS_KEY) {
            self.counters = counters;
        }
        if let Some(history) = self.restore_slice::<DetectionHistory>(HISTORY_KEY) {
            self.history = history;
        }
        if let Some(company) = self.restore_slice::<CompanyProfile>(COMPANY_KEY) {
            self.company = company;
        }
        debug!(
            total = self.counters.total,
            history = self.history.len(),
            products = self.company.products.len(),
            "restored inspection state"
        );
        Ok(())
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn history(&self) -> &DetectionHistory {
        &self.history
    }

    pub fn company(&self) -> &CompanyProfile {
        &self.company
    }

    pub fn record_batch(&mut self, batch: &DetectionBatch) -> Result<(), ApplicationError> {
        for detection in &batch.detections {
            self.counters
                .record(detection.classification, batch.processing_time_ms);
            self.history.push(detection.clone());
        }
        self.persist()
    }

    pub fn add_product(&mut self, draft: ProductDraft) -> Result<ProductId, ApplicationError> {
        let id = self.company.add_product(draft)?;
        self.persist()?;
        Ok(id)
    }

    pub fn update_product(
        &mut self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<usize, ApplicationError> {
        let updated = self.company.update_product(id, draft)?;
        self.persist()?;
        Ok(updated)
    }

    pub fn delete_product(&mut self, id: ProductId) -> Result<usize, ApplicationError> {
        let removed = self.company.delete_product(id);
        self.persist()?;
        Ok(removed)
    }

    pub fn record_training_samples(
        &mut self,
        kind: SampleKind,
        count: u64,
    ) -> Result<TrainingSamples, ApplicationError> {
        self.company.training_samples.add(kind, count);
        self.persist()?;
        Ok(self.company.training_samples)
    }

    fn restore_slice<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.snapshots.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(key, %error, "snapshot read failed, keeping defaults");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, %error, "malformed snapshot, keeping defaults");
                None
            }
        }
    }

    fn persist(&self) -> Result<(), ApplicationError> {
        let now = self.clock.now_timestamp_string();
        self.save_slice(STATS_KEY, &self.counters, &now)?;
        self.save_slice(HISTORY_KEY, &self.history, &now)?;
        self.save_slice(COMPANY_KEY, &self.company, &now)
    }

    fn save_slice<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        updated_at: &str,
    ) -> Result<(), ApplicationError> {
        let json = serde_json::to_string(value)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        self.snapshots.save(key, &json, updated_at)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use chrono::{DateTime, TimeZone, Utc};
    use product_inspect_domain::{Classification, Detection, Region, RECENT_HISTORY_LIMIT};

    use super::*;

    #[derive(Clone, Default)]
    struct FakeSnapshots {
        values: Rc<RefCell<HashMap<String, String>>>,
        fail_reads: bool,
    }

    impl SnapshotStore for FakeSnapshots {
        fn initialize(&self) -> Result<(), ApplicationError> {
            Ok(())
        }

        fn load(&self, key: &str) -> Result<Option<String>, ApplicationError> {
            if self.fail_reads {
                return Err(ApplicationError::Persistence("disk gone".to_string()));
            }
            Ok(self.values.borrow().get(key).cloned())
        }

        fn save(&self, key: &str, value: &str, _updated_at: &str) -> Result<(), ApplicationError> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 3, 16, 9, 30, 0)
                .single()
                .expect("valid time")
        }
    }

    fn store_with(snapshots: FakeSnapshots) -> InspectionStore {
        InspectionStore::new(Box::new(snapshots), Arc::new(FixedClock))
    }

    fn batch(classes: &[Classification], processing_time_ms: u64) -> DetectionBatch {
        DetectionBatch {
            detections: classes
                .iter()
                .enumerate()
                .map(|(index, classification)| Detection {
                    id: index as u32,
                    region: Region {
                        x: index as u32 * 120,
                        y: 40,
                        width: 100,
                        height: 250,
                    },
                    classification: *classification,
                    confidence: 0.91,
                    timestamp: "2026-03-16T09:30:00.000Z".to_string(),
                })
                .collect(),
            processing_time_ms,
        }
    }

    #[test]
    fn record_batch_updates_counters_and_persists_every_slice() {
        let snapshots = FakeSnapshots::default();
        let mut store = store_with(snapshots.clone());

        store
            .record_batch(&batch(
                &[Classification::Good, Classification::Bad, Classification::Good],
                12,
            ))
            .expect("record");

        let counters = store.counters();
        assert_eq!(counters.total, 3);
        assert_eq!(counters.good + counters.bad, counters.total);
        assert_eq!(counters.speed, 12);
        assert_eq!(store.history().len(), 3);

        let values = snapshots.values.borrow();
        assert!(values.contains_key(STATS_KEY));
        assert!(values.contains_key(HISTORY_KEY));
        assert!(values.contains_key(COMPANY_KEY));
    }

    #[test]
    fn restore_reproduces_persisted_state() {
        let snapshots = FakeSnapshots::default();
        let mut store = store_with(snapshots.clone());
        store
            .record_batch(&batch(&[Classification::Bad, Classification::Good], 7))
            .expect("record");
        store
            .add_product(ProductDraft {
                name: "Juice 1l".to_string(),
                product_type: "Carton".to_string(),
                criteria: "Seal".to_string(),
            })
            .expect("add");
        store
            .record_training_samples(SampleKind::Defective, 4)
            .expect("samples");

        let mut restored = store_with(snapshots);
        restored.restore().expect("restore");

        assert_eq!(restored.counters(), store.counters());
        assert_eq!(restored.history(), store.history());
        assert_eq!(restored.company(), store.company());
        assert_eq!(restored.company().training_samples.defective, 4);
    }

    #[test]
    fn malformed_slice_keeps_default_without_touching_others() {
        let snapshots = FakeSnapshots::default();
        snapshots
            .values
            .borrow_mut()
            .insert(STATS_KEY.to_string(), "{not json".to_string());
        snapshots.values.borrow_mut().insert(
            COMPANY_KEY.to_string(),
            r#"{"name":"Acme","products":[]}"#.to_string(),
        );

        let mut store = store_with(snapshots);
        store.restore().expect("restore should tolerate bad content");

        assert_eq!(store.counters(), Counters::default());
        assert!(store.history().is_empty());
        assert_eq!(store.company().name, "Acme");
    }

    #[test]
    fn read_errors_fall_back_to_defaults() {
        let mut store = store_with(FakeSnapshots {
            fail_reads: true,
            ..FakeSnapshots::default()
        });

        store.restore().expect("restore");

        assert_eq!(store.company(), &CompanyProfile::default());
    }

    #[test]
    fn history_stays_bounded_across_batches() {
        let mut store = store_with(FakeSnapshots::default());
        for _ in 0..30 {
            store
                .record_batch(&batch(&[Classification::Good, Classification::Bad], 3))
                .expect("record");
        }

        assert_eq!(store.counters().total, 60);
        assert_eq!(store.history().len(), RECENT_HISTORY_LIMIT);
    }

    #[test]
    fn delete_then_add_can_reuse_an_id() {
        let mut store = store_with(FakeSnapshots::default());
        let removed = store
            .delete_product(ProductId::new(1).expect("id"))
            .expect("delete");
        assert_eq!(removed, 1);

        let id = store
            .add_product(ProductDraft {
                name: "Sparkling 330ml".to_string(),
                product_type: "Can".to_string(),
                criteria: String::new(),
            })
            .expect("add");

        assert_eq!(id.get(), 2);
        let ids: Vec<i64> = store.company().products.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![2, 2]);
    }
}
