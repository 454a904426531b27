use super::{DetectionStore, StoreError};
use crate::ingest::types::{DetectionRecord, NewDetection};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<DetectionRecord>,
    next_id: i64,
}

/// In-memory store with monotonic ids
#[derive(Debug, Default)]
pub struct InMemoryDetectionStore {
    inner: Mutex<Inner>,
}

impl InMemoryDetectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DetectionStore for InMemoryDetectionStore {
    fn insert_all(&self, detections: Vec<NewDetection>) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        let inserted = detections.len();

        for detection in detections {
            inner.next_id += 1;
            let id = inner.next_id;
            inner.records.push(DetectionRecord::from_new(id, detection));
        }

        Ok(inserted)
    }

    fn find_all(&self) -> Result<Vec<DetectionRecord>, StoreError> {
        let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.records.clone())
    }

    fn count(&self) -> Result<u64, StoreError> {
        let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.records.len() as u64)
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(timestamp_ms: i64) -> NewDetection {
        NewDetection {
            timestamp_ms,
            date: None,
            objects_total: "{}".to_string(),
            objects_by_lane: "{}".to_string(),
            avg_speed_by_lane: "{}".to_string(),
        }
    }

    #[test]
    fn test_ids_are_monotonic_across_batches() {
        let store = InMemoryDetectionStore::new();
        store.insert_all(vec![pending(1), pending(2)]).unwrap();
        store.insert_all(vec![pending(3)]).unwrap();

        let ids: Vec<i64> = store.find_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_empty_store() {
        let store = InMemoryDetectionStore::new();
        assert!(store.find_all().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }
}
