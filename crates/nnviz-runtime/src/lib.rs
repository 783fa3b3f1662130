#![forbid(unsafe_code)]

//! Runtime for nnviz: snapshot hand-off and rebuild scheduling.
//!
//! # Role in nnviz
//! A producer thread (a training loop, a demo) publishes parameter snapshots
//! into a [`SnapshotMailbox`]. The render thread owns an [`UpdateScheduler`]
//! that polls the mailbox on a fixed-interval tick ([`Every`]) and rebuilds
//! the scene on resize, color-scheme change, or a new snapshot.
//!
//! # Threading
//! Only the mailbox is shared. Everything the scheduler owns (model, scene,
//! color scheme) is mutated on the render thread alone, one trigger at a time.

pub mod mailbox;
pub mod scheduler;
pub mod subscription;

pub use mailbox::{MailboxStats, SnapshotMailbox};
pub use scheduler::{
    RebuildGate, RebuildOutcome, RebuildPass, SchedulerError, SchedulerState, Trigger,
    UpdateScheduler,
};
pub use subscription::{Every, StopSignal, SubscriptionHandle};
