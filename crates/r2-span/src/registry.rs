use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use r2_core::SpanId;
use r2_fsm::CallServices;
use r2_tal::TalChannel;

use crate::span::Span;

/// Treats the span/channel tables as a process-scoped service with
/// explicit init/teardown rather than ambient state. Owned by the
/// binary (see `bins/r2-spand`), not a `static` — the control surface
/// resolves `block <span>` / `status <span>` etc. against whatever
/// registry the caller hands it.
pub struct SpanRegistry<C: TalChannel, S: CallServices> {
    spans: Mutex<HashMap<SpanId, Arc<Span<C, S>>>>,
}

impl<C: TalChannel, S: CallServices> Default for SpanRegistry<C, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TalChannel, S: CallServices> SpanRegistry<C, S> {
    pub fn new() -> Self {
        Self { spans: Mutex::new(HashMap::new()) }
    }

    pub fn register(&self, span: Arc<Span<C, S>>) {
        let id = span.span_id();
        self.spans.lock().expect("span registry poisoned").insert(id, span);
    }

    pub fn unregister(&self, id: SpanId) -> Option<Arc<Span<C, S>>> {
        self.spans.lock().expect("span registry poisoned").remove(&id)
    }

    pub fn get(&self, id: SpanId) -> Option<Arc<Span<C, S>>> {
        self.spans.lock().expect("span registry poisoned").get(&id).cloned()
    }

    pub fn span_ids(&self) -> Vec<SpanId> {
        let mut ids: Vec<SpanId> = self.spans.lock().expect("span registry poisoned").keys().copied().collect();
        ids.sort();
        ids
    }
}
