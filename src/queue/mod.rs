//! Inbound event ordering.
//!
//! An [`EventQueue`] decouples the order events arrive in from the order
//! their consumer sees them. Each pushed event comes with a [`Deferred`]
//! result (usually "the data needed to handle this event"); the consumer is
//! called with that result once it settles, subject to the policy:
//!
//! - [`OrderingPolicy::None`]: called as soon as each result settles.
//! - [`OrderingPolicy::Single`]: one global FIFO. Event N+1's callback never
//!   runs before event N's, even if its data was ready first.
//! - [`OrderingPolicy::PerPartition`]: one FIFO per partition key (the room
//!   id unless [`EventQueue::with_partition_key`] says otherwise). Partitions
//!   drain concurrently and independently.
//!
//! # Draining
//!
//! Each partition holds its pending entries and a draining flag. Only
//! [`EventQueue::consume`] starts a drain loop, and only for partitions not
//! already draining, so calling it after every push is safe. A drain loop
//! pops the head entry, awaits it, calls the consumer, and repeats until the
//! partition is empty.
//!
//! Results are spawned as tasks when pushed, so they settle concurrently;
//! only the callbacks are serialized. A partition whose head is slow still
//! has every later result ready by the time the head is delivered.

use crate::config::QueueConfig;
use crate::error::ValidationError;
use appbridge_proto::Event;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinHandle;
use tracing::{Instrument, trace, warn};

mod deferred;

pub use deferred::{Deferred, DeferredSender, deferred, from_future};

/// How events are ordered before reaching the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderingPolicy {
    /// No ordering; each callback fires when its result settles.
    None,
    /// A single global FIFO.
    Single,
    /// One FIFO per partition key.
    PerPartition,
}

impl FromStr for OrderingPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "single" => Ok(Self::Single),
            "per_room" | "per_partition" => Ok(Self::PerPartition),
            other => Err(ValidationError::UnknownPolicy(other.to_string())),
        }
    }
}

type Consumer<T, E> = Arc<dyn Fn(Event, Result<T, E>) + Send + Sync>;
type PartitionKeyFn = Arc<dyn Fn(&Event) -> String + Send + Sync>;

/// Partition key used by [`OrderingPolicy::Single`].
const GLOBAL_PARTITION: &str = "";

struct Entry<T, E> {
    event: Event,
    data: JoinHandle<Result<T, E>>,
}

struct Partition<T, E> {
    entries: VecDeque<Entry<T, E>>,
    draining: bool,
}

impl<T, E> Default for Partition<T, E> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            draining: false,
        }
    }
}

struct Inner<T, E> {
    policy: OrderingPolicy,
    partition_key: PartitionKeyFn,
    consumer: Consumer<T, E>,
    partitions: Mutex<HashMap<String, Partition<T, E>>>,
    pending: AtomicUsize,
}

impl<T, E> Inner<T, E> {
    fn deliver(&self, event: Event, result: Result<T, E>) {
        (self.consumer)(event, result);
        self.settled();
    }

    fn settled(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        crate::metrics::queue_pending_add(-1);
    }
}

/// Policy-driven ordering queue for inbound events.
///
/// Cloning is cheap and clones share the same partitions.
pub struct EventQueue<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for EventQueue<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> std::fmt::Debug for EventQueue<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("policy", &self.inner.policy)
            .field("pending", &self.pending())
            .finish()
    }
}

impl<T, E> EventQueue<T, E> {
    pub fn policy(&self) -> OrderingPolicy {
        self.inner.policy
    }

    /// Events pushed whose callback has not run yet.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }
}

impl<T, E> EventQueue<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a queue that hands settled results to `consumer`.
    pub fn new<F>(policy: OrderingPolicy, consumer: F) -> Self
    where
        F: Fn(Event, Result<T, E>) + Send + Sync + 'static,
    {
        Self::build(policy, Arc::new(|event: &Event| event.room_id.clone()), Arc::new(consumer))
    }

    /// Create a queue from configuration.
    pub fn from_config<F>(config: &QueueConfig, consumer: F) -> Result<Self, ValidationError>
    where
        F: Fn(Event, Result<T, E>) + Send + Sync + 'static,
    {
        Ok(Self::new(config.policy()?, consumer))
    }

    /// Create a [`OrderingPolicy::PerPartition`] queue with a custom key.
    pub fn with_partition_key<K, F>(partition_key: K, consumer: F) -> Self
    where
        K: Fn(&Event) -> String + Send + Sync + 'static,
        F: Fn(Event, Result<T, E>) + Send + Sync + 'static,
    {
        Self::build(
            OrderingPolicy::PerPartition,
            Arc::new(partition_key),
            Arc::new(consumer),
        )
    }

    fn build(policy: OrderingPolicy, partition_key: PartitionKeyFn, consumer: Consumer<T, E>) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                partition_key,
                consumer,
                partitions: Mutex::new(HashMap::new()),
                pending: AtomicUsize::new(0),
            }),
        }
    }

    /// Enqueue `event` with the result its consumer will receive.
    ///
    /// `data` starts running now under every policy. Under
    /// [`OrderingPolicy::None`] the callback follows as soon as it settles;
    /// otherwise no callback runs until [`consume`](Self::consume).
    pub fn push<F>(&self, event: Event, data: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.inner.pending.fetch_add(1, Ordering::SeqCst);
        crate::metrics::queue_pending_add(1);

        let key = match self.inner.policy {
            OrderingPolicy::None => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    let result = data.await;
                    inner.deliver(event, result);
                });
                return;
            }
            OrderingPolicy::Single => GLOBAL_PARTITION.to_string(),
            OrderingPolicy::PerPartition => (self.inner.partition_key)(&event),
        };
        let data = tokio::spawn(data);

        trace!(partition = %key, event_type = %event.event_type, "queued event");
        self.inner
            .partitions
            .lock()
            .entry(key)
            .or_default()
            .entries
            .push_back(Entry { event, data });
    }

    /// Start a drain loop for every partition that has entries and is not
    /// already draining.
    pub fn consume(&self) {
        let ready: Vec<String> = {
            let mut partitions = self.inner.partitions.lock();
            partitions
                .iter_mut()
                .filter(|(_, p)| !p.draining && !p.entries.is_empty())
                .map(|(key, p)| {
                    p.draining = true;
                    key.clone()
                })
                .collect()
        };

        for key in ready {
            let inner = Arc::clone(&self.inner);
            let span = crate::telemetry::spans::drain(&key);
            tokio::spawn(drain(inner, key).instrument(span));
        }
    }
}

async fn drain<T, E>(inner: Arc<Inner<T, E>>, key: String) {
    loop {
        let entry = {
            let mut partitions = inner.partitions.lock();
            let Some(partition) = partitions.get_mut(&key) else {
                return;
            };
            match partition.entries.pop_front() {
                Some(entry) => entry,
                None => {
                    // Empty and no longer draining; a later consume() starts afresh.
                    partitions.remove(&key);
                    return;
                }
            }
        };

        match entry.data.await {
            Ok(result) => inner.deliver(entry.event, result),
            Err(e) => {
                warn!(partition = %key, event_type = %entry.event.event_type, error = %e, "event data task failed, skipping");
                inner.settled();
            }
        }
    }
}
