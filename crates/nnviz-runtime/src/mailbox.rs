#![forbid(unsafe_code)]

//! Single-slot snapshot hand-off between a producer and the render thread.
//!
//! The slot holds at most one snapshot. Publishing overwrites whatever has
//! not been consumed yet (last writer wins), and taking atomically empties
//! the slot. Neither side blocks, and the backlog can never exceed one.
//!
//! # Constraints
//!
//! - `#![forbid(unsafe_code)]`: atomicity is delegated to `arc-swap`.
//! - A snapshot is published as a whole `Arc`, so the consumer can never
//!   observe a partially written one.
//!
//! ```
//! use nnviz_core::ParameterSnapshot;
//! use nnviz_runtime::SnapshotMailbox;
//!
//! let mailbox = SnapshotMailbox::new();
//! mailbox.publish(ParameterSnapshot::new().with("a", vec![1.0]));
//! mailbox.publish(ParameterSnapshot::new().with("b", vec![2.0]));
//!
//! let latest = mailbox.take_if_present().unwrap();
//! assert!(latest.get("b").is_some());
//! assert!(mailbox.take_if_present().is_none());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use nnviz_core::ParameterSnapshot;

/// Counters describing mailbox traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MailboxStats {
    pub published: u64,
    /// Snapshots overwritten before anyone took them.
    pub superseded: u64,
    pub delivered: u64,
}

/// Thread-safe, overwrite-on-publish, single-slot channel.
#[derive(Debug, Default)]
pub struct SnapshotMailbox {
    slot: ArcSwapOption<ParameterSnapshot>,
    published: AtomicU64,
    superseded: AtomicU64,
    delivered: AtomicU64,
}

impl SnapshotMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for sharing between a producer and the scheduler.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Replace the slot contents with `snapshot`.
    pub fn publish(&self, snapshot: ParameterSnapshot) {
        self.publish_arc(Arc::new(snapshot));
    }

    pub fn publish_arc(&self, snapshot: Arc<ParameterSnapshot>) {
        let previous = self.slot.swap(Some(snapshot));
        let published = self.published.fetch_add(1, Ordering::Relaxed) + 1;
        if previous.is_some() {
            self.superseded.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                target: "nnviz.mailbox",
                published,
                "snapshot superseded before it was consumed"
            );
        }
    }

    /// Take the latest snapshot, leaving the slot empty.
    pub fn take_if_present(&self) -> Option<Arc<ParameterSnapshot>> {
        let taken = self.slot.swap(None);
        if taken.is_some() {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        }
        taken
    }

    /// Whether a snapshot is waiting. Advisory only: it may change right after.
    pub fn is_pending(&self) -> bool {
        self.slot.load().is_some()
    }

    pub fn stats(&self) -> MailboxStats {
        MailboxStats {
            published: self.published.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn tagged(tag: f64) -> ParameterSnapshot {
        ParameterSnapshot::new().with("tag", vec![tag])
    }

    fn tag_of(snapshot: &ParameterSnapshot) -> f64 {
        match snapshot.get("tag") {
            Some(nnviz_core::Tensor::Vector(v)) => v[0],
            other => panic!("unexpected tag tensor {other:?}"),
        }
    }

    #[test]
    fn empty_mailbox_yields_nothing() {
        let mailbox = SnapshotMailbox::new();
        assert!(!mailbox.is_pending());
        assert!(mailbox.take_if_present().is_none());
        assert_eq!(mailbox.stats(), MailboxStats::default());
    }

    #[test]
    fn last_writer_wins() {
        let mailbox = SnapshotMailbox::new();
        mailbox.publish(tagged(1.0));
        mailbox.publish(tagged(2.0));
        assert!(mailbox.is_pending());

        let taken = mailbox.take_if_present().unwrap();
        assert_eq!(tag_of(&taken), 2.0);
        assert!(mailbox.take_if_present().is_none());
        assert_eq!(
            mailbox.stats(),
            MailboxStats {
                published: 2,
                superseded: 1,
                delivered: 1,
            }
        );
    }

    #[test]
    fn publish_after_take_is_delivered() {
        let mailbox = SnapshotMailbox::new();
        mailbox.publish(tagged(1.0));
        assert_eq!(tag_of(&mailbox.take_if_present().unwrap()), 1.0);
        mailbox.publish(tagged(3.0));
        assert_eq!(tag_of(&mailbox.take_if_present().unwrap()), 3.0);
        assert_eq!(mailbox.stats().superseded, 0);
    }

    #[test]
    fn concurrent_producer_never_tears() {
        let mailbox = SnapshotMailbox::shared();
        let producer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                for i in 0..2_000 {
                    let v = i as f64;
                    mailbox.publish(ParameterSnapshot::new().with("a", vec![v]).with("b", vec![v]));
                }
            })
        };

        let mut last_seen = -1.0;
        loop {
            if let Some(snap) = mailbox.take_if_present() {
                let a = snap.get("a").cloned();
                let b = snap.get("b").cloned();
                assert_eq!(a, b, "observed a partially written snapshot");
                if let Some(nnviz_core::Tensor::Vector(v)) = a {
                    assert!(v[0] > last_seen, "delivery went backwards");
                    last_seen = v[0];
                }
            }
            if producer.is_finished() && !mailbox.is_pending() {
                break;
            }
        }
        producer.join().unwrap();

        let stats = mailbox.stats();
        assert_eq!(stats.published, 2_000);
        assert_eq!(stats.delivered + stats.superseded, stats.published);
    }
}
