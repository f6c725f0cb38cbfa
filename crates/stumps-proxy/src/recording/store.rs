//! Recording store for traffic captured in record mode.

use super::types::RecordedContext;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Append-only list of captured request/response pairs.
#[derive(Default)]
pub struct Recordings {
    contexts: RwLock<Vec<Arc<RecordedContext>>>,
}

impl Recordings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recording, returning its index.
    pub fn add(&self, context: RecordedContext) -> usize {
        let mut contexts = self.contexts.write();
        contexts.push(Arc::new(context));
        let index = contexts.len() - 1;
        debug!("Recorded request #{}", index);
        index
    }

    /// Recordings added after `after_index`. Pass `None` for all of them.
    pub fn find(&self, after_index: Option<usize>) -> Vec<Arc<RecordedContext>> {
        let contexts = self.contexts.read();
        let start = after_index.map_or(0, |i| i.saturating_add(1));
        contexts.iter().skip(start).cloned().collect()
    }

    pub fn get(&self, index: usize) -> Option<Arc<RecordedContext>> {
        self.contexts.read().get(index).cloned()
    }

    pub fn clear(&self) {
        self.contexts.write().clear();
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StumpsHttpRequest;
    use crate::recording::{RecordedRequest, RecordedResponse};
    use bytes::Bytes;

    fn recording(path: &str) -> RecordedContext {
        let request = RecordedRequest::from_request(&StumpsHttpRequest::new("GET", path)).unwrap();
        let response = RecordedResponse::new(200, "OK", vec![], Bytes::new());
        RecordedContext::new(request, response)
    }

    #[test]
    fn test_add_and_find() {
        let store = Recordings::new();
        assert!(store.is_empty());

        assert_eq!(store.add(recording("/a")), 0);
        assert_eq!(store.add(recording("/b")), 1);
        assert_eq!(store.add(recording("/c")), 2);

        let all = store.find(None);
        assert_eq!(all.len(), 3);

        let after_first = store.find(Some(0));
        let urls: Vec<_> = after_first.iter().map(|c| c.request.raw_url()).collect();
        assert_eq!(urls, vec!["/b", "/c"]);

        assert!(store.find(Some(2)).is_empty());
        assert!(store.find(Some(usize::MAX)).is_empty());
    }

    #[test]
    fn test_get_and_clear() {
        let store = Recordings::new();
        store.add(recording("/a"));
        assert_eq!(store.get(0).unwrap().request.raw_url(), "/a");
        assert!(store.get(1).is_none());

        store.clear();
        assert_eq!(store.len(), 0);
    }
}
