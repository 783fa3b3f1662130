#![forbid(unsafe_code)]

//! Error kinds raised while ingesting snapshots and color settings.
//!
//! Both kinds are deterministic validation failures: the caller rejects the
//! input and keeps whatever it had adopted before. There is nothing to retry.

use thiserror::Error;

/// A snapshot whose tensor shapes do not describe a layered network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("snapshot contains no tensors")]
    Empty,

    #[error("entry {index} ({name}) must be a weight matrix")]
    WeightNotMatrix { index: usize, name: String },

    #[error("entry {index} ({name}) must be a bias vector")]
    BiasNotVector { index: usize, name: String },

    #[error("entry {index} ({name}) is empty")]
    EmptyTensor { index: usize, name: String },

    #[error("entry {index} ({name}) row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        index: usize,
        name: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("bias {index} ({name}) has length {found}, weight above it has {expected} rows")]
    BiasLengthMismatch {
        index: usize,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("weight {index} ({name}) has {found} columns, previous layer has {expected} outputs")]
    InputSizeMismatch {
        index: usize,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("weight {index} ({name}) has no bias after it")]
    MissingBias { index: usize, name: String },

    #[error("entry {index} ({name}) contains a non-finite value")]
    NonFinite { index: usize, name: String },
}

/// A color setting that cannot be turned into an RGB channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("{channel} channel {value} is outside 0..=255")]
    ChannelOutOfRange { channel: &'static str, value: f64 },

    #[error("{channel} channel {value} is not an integer")]
    NonIntegerChannel { channel: &'static str, value: f64 },

    #[error("{channel} channel {input:?} is not a number")]
    NonNumericChannel { channel: &'static str, input: String },
}
