#![forbid(unsafe_code)]

//! Built-in parameter snapshots and a deterministic demo producer.

use nnviz_core::{ParameterSnapshot, Tensor};

use crate::error::{Error, Result};

/// Names accepted by [`preset`].
pub const PRESET_NAMES: &[&str] = &["tiny", "xor"];

/// Look up a built-in snapshot by name.
pub fn preset(name: &str) -> Result<ParameterSnapshot> {
    match name {
        "tiny" => Ok(tiny()),
        "xor" => Ok(xor()),
        _ => Err(Error::UnknownPreset {
            name: name.to_owned(),
            available: PRESET_NAMES.join(", "),
        }),
    }
}

/// Two inputs, two hidden units, one output.
pub fn tiny() -> ParameterSnapshot {
    ParameterSnapshot::new()
        .with("w0", vec![vec![1.0, 0.0], vec![0.0, 1.0]])
        .with("b0", vec![0.5, -0.5])
        .with("w1", vec![vec![1.0, 1.0]])
        .with("b1", vec![0.0])
}

/// A trained 2-3-1 XOR network.
pub fn xor() -> ParameterSnapshot {
    ParameterSnapshot::new()
        .with(
            "hidden.weight",
            vec![vec![0.92, 0.91], vec![-0.78, -0.80], vec![0.35, -0.41]],
        )
        .with("hidden.bias", vec![-0.44, 0.97, 0.02])
        .with("output.weight", vec![vec![-0.96, -0.89, 0.12]])
        .with("output.bias", vec![0.61])
}

/// `base` with every value nudged by a smooth function of `step`.
///
/// Shapes are preserved, so every result parses whenever `base` does.
pub fn perturb(base: &ParameterSnapshot, step: u64) -> ParameterSnapshot {
    let phase = step as f64 * 0.15;
    let mut k = 0.0;
    let mut nudge = |v: f64| {
        k += 1.0;
        v + 0.35 * (phase + k * 0.7).sin()
    };
    base.entries()
        .iter()
        .map(|(name, tensor)| {
            let tensor = match tensor {
                Tensor::Matrix(rows) => Tensor::Matrix(
                    rows.iter()
                        .map(|row| row.iter().map(|&v| nudge(v)).collect())
                        .collect(),
                ),
                Tensor::Vector(values) => {
                    Tensor::Vector(values.iter().map(|&v| nudge(v)).collect())
                }
            };
            (name.clone(), tensor)
        })
        .collect()
}
