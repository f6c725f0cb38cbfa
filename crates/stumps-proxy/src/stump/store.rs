//! Registry of Stumps for one proxy environment.

use super::types::{Stump, StumpError};
use crate::http::StumpsHttpRequest;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Stumps in registration order.
///
/// Lookups hold the read lock for the whole scan, so a lookup sees either
/// all or none of a concurrent registration or removal. Stumps are fully
/// built before they are inserted.
#[derive(Default)]
pub struct StumpStore {
    stumps: RwLock<Vec<Arc<Stump>>>,
}

impl StumpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Stump after the existing ones.
    pub fn add(&self, stump: Stump) -> Result<Arc<Stump>, StumpError> {
        let mut stumps = self.stumps.write();
        if stumps.iter().any(|s| s.id() == stump.id()) {
            return Err(StumpError::DuplicateId(stump.id().to_string()));
        }

        let stump = Arc::new(stump);
        stumps.push(Arc::clone(&stump));
        info!(
            "Registered Stump '{}' with {} rule(s)",
            stump.id(),
            stump.rules().len()
        );
        Ok(stump)
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Stump>> {
        let mut stumps = self.stumps.write();
        let index = stumps.iter().position(|s| s.id() == id)?;
        let removed = stumps.remove(index);
        info!("Removed Stump '{}'", id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Stump>> {
        self.stumps.read().iter().find(|s| s.id() == id).cloned()
    }

    /// Snapshot of all Stumps in registration order.
    pub fn list(&self) -> Vec<Arc<Stump>> {
        self.stumps.read().clone()
    }

    /// First Stump whose rule set matches the request.
    pub fn find_stump(&self, request: &StumpsHttpRequest) -> Option<Arc<Stump>> {
        let stumps = self.stumps.read();
        let found = stumps.iter().find(|s| s.is_match(request)).cloned();
        match &found {
            Some(stump) => debug!(
                "{} {} matched Stump '{}'",
                request.method,
                request.raw_url,
                stump.id()
            ),
            None => debug!(
                "{} {} matched none of {} Stump(s)",
                request.method,
                request.raw_url,
                stumps.len()
            ),
        }
        found
    }

    pub fn clear(&self) {
        self.stumps.write().clear();
    }

    pub fn len(&self) -> usize {
        self.stumps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stumps.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::HeaderRule;
    use crate::recording::RecordedResponse;
    use bytes::Bytes;
    use std::thread;

    fn header_stump(id: &str, name: &str, value: &str) -> Stump {
        Stump::new(
            id,
            None,
            vec![HeaderRule::new(name, value).unwrap().into()],
            RecordedResponse::new(200, "OK", vec![], Bytes::from(id.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_find_stump_by_content_type() {
        let store = StumpStore::new();
        store
            .add(header_stump("json", "content-type", "application/json"))
            .unwrap();

        let request =
            StumpsHttpRequest::new("POST", "/").with_header("Content-Type", "application/json");
        assert_eq!(store.find_stump(&request).unwrap().id(), "json");
    }

    #[test]
    fn test_empty_store_returns_none() {
        let store = StumpStore::new();
        assert!(store.find_stump(&StumpsHttpRequest::default()).is_none());
    }

    #[test]
    fn test_first_registered_match_wins() {
        let store = StumpStore::new();
        store.add(header_stump("first", "x-env", "regex:.*")).unwrap();
        store.add(header_stump("second", "x-env", "test")).unwrap();

        let request = StumpsHttpRequest::new("GET", "/").with_header("X-Env", "test");
        assert_eq!(store.find_stump(&request).unwrap().id(), "first");

        store.remove("first");
        assert_eq!(store.find_stump(&request).unwrap().id(), "second");
    }

    #[test]
    fn test_no_match_returns_none() {
        let store = StumpStore::new();
        store.add(header_stump("a", "x-env", "prod")).unwrap();
        let request = StumpsHttpRequest::new("GET", "/").with_header("X-Env", "test");
        assert!(store.find_stump(&request).is_none());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let store = StumpStore::new();
        store.add(header_stump("a", "x", "1")).unwrap();
        assert!(matches!(
            store.add(header_stump("a", "y", "2")),
            Err(StumpError::DuplicateId(ref id)) if id == "a"
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_list_clear() {
        let store = StumpStore::new();
        store.add(header_stump("a", "x", "1")).unwrap();
        store.add(header_stump("b", "x", "2")).unwrap();

        assert_eq!(store.get("b").unwrap().id(), "b");
        assert!(store.get("c").is_none());
        let ids: Vec<_> = store.list().iter().map(|s| s.id().to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        store.clear();
        assert!(store.is_empty());
        assert!(store.remove("a").is_none());
    }

    #[test]
    fn test_concurrent_lookup_and_registration() {
        let store = Arc::new(StumpStore::new());
        store.add(header_stump("base", "x-key", "base")).unwrap();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..200 {
                    let id = format!("s{i}");
                    store.add(header_stump(&id, "x-key", &id)).unwrap();
                    if i % 2 == 0 {
                        store.remove(&id);
                    }
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let request = StumpsHttpRequest::new("GET", "/").with_header("X-Key", "base");
                    for _ in 0..500 {
                        assert_eq!(store.find_stump(&request).unwrap().id(), "base");
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.len(), 101);
    }
}
