use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
}

pub struct MetricSpec {
    pub name: &'static str,
    pub kind: MetricKind,
    pub help: &'static str,
}

pub const CHAT_REQUESTS_TOTAL: MetricSpec = MetricSpec {
    name: "fancast_chat_requests_total",
    kind: MetricKind::Counter,
    help: "Total chat requests accepted into the streaming pipeline",
};

pub const CHAT_DELTAS_TOTAL: MetricSpec = MetricSpec {
    name: "fancast_chat_deltas_total",
    kind: MetricKind::Counter,
    help: "Total content frames emitted across chat streams",
};

pub const WEBHOOK_EVENTS_TOTAL: MetricSpec = MetricSpec {
    name: "fancast_webhook_events_total",
    kind: MetricKind::Counter,
    help: "Total verified billing webhook events received",
};

pub const WEBHOOK_EVENTS_SKIPPED_TOTAL: MetricSpec = MetricSpec {
    name: "fancast_webhook_events_skipped_total",
    kind: MetricKind::Counter,
    help: "Billing events acknowledged but skipped for missing metadata",
};

#[derive(Clone, Default)]
pub struct MeterRegistry {
    inner: Arc<Mutex<HashMap<&'static str, Arc<AtomicU64>>>>,
}

impl MeterRegistry {
    fn entry(&self, spec: &'static MetricSpec) -> Arc<AtomicU64> {
        let mut guard = self.inner.lock();
        guard
            .entry(spec.name)
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone()
    }

    pub fn counter(&self, spec: &'static MetricSpec) -> CounterHandle {
        CounterHandle::new(self.entry(spec))
    }

    pub fn value(&self, spec: &'static MetricSpec) -> u64 {
        self.entry(spec).load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
pub struct CounterHandle {
    storage: Arc<AtomicU64>,
}

impl CounterHandle {
    pub fn new(storage: Arc<AtomicU64>) -> Self {
        Self { storage }
    }

    pub fn inc(&self, value: u64) {
        self.storage.fetch_add(value, Ordering::Relaxed);
    }
}
