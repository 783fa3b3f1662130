#![forbid(unsafe_code)]

//! Validated layer model derived from a [`ParameterSnapshot`].
//!
//! Entries alternate weight, bias, weight, bias, ... starting with a weight.
//! Role is decided by position, never by name. For every stage `k`:
//!
//! - the bias length equals the weight's row count, and
//! - the weight's column count equals the previous bias length (the first
//!   weight's column count defines the input size).
//!
//! Parsing is a pure function of the snapshot; a failed parse leaves nothing
//! behind, so callers keep their previously adopted model.

use crate::error::StructuralError;
use crate::snapshot::{ParameterSnapshot, Tensor};

/// Structural role of a snapshot entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Weight,
    Bias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerShape {
    Matrix { rows: usize, cols: usize },
    Vector { len: usize },
}

/// Shape-only view of one snapshot entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layer {
    /// Position in the snapshot.
    pub index: usize,
    pub kind: LayerKind,
    pub shape: LayerShape,
}

/// A weight matrix: `rows` outputs by `cols` inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightLayer {
    pub index: usize,
    pub name: String,
    values: Vec<Vec<f64>>,
    cols: usize,
}

impl WeightLayer {
    pub fn rows(&self) -> usize {
        self.values.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Weights feeding output node `row`, indexed by input node.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiasLayer {
    pub index: usize,
    pub name: String,
    pub values: Vec<f64>,
}

impl BiasLayer {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One weight/bias pair: edges into a layer plus that layer's nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub weight: WeightLayer,
    pub bias: BiasLayer,
}

/// An ordered, shape-checked sequence of stages.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkModel {
    input_size: usize,
    stages: Vec<Stage>,
}

impl NetworkModel {
    /// Validate `snapshot` into a model.
    pub fn parse(snapshot: &ParameterSnapshot) -> Result<Self, StructuralError> {
        let entries = snapshot.entries();
        if entries.is_empty() {
            return Err(StructuralError::Empty);
        }

        let mut stages = Vec::with_capacity(entries.len() / 2);
        let mut input_size = 0;
        let mut previous_outputs: Option<usize> = None;

        for (pair, chunk) in entries.chunks(2).enumerate() {
            let weight_index = pair * 2;
            let (weight_name, weight_tensor) = &chunk[0];
            let weight = parse_weight(weight_index, weight_name, weight_tensor)?;

            match previous_outputs {
                None => input_size = weight.cols(),
                Some(expected) if expected != weight.cols() => {
                    return Err(StructuralError::InputSizeMismatch {
                        index: weight_index,
                        name: weight_name.clone(),
                        expected,
                        found: weight.cols(),
                    });
                }
                Some(_) => {}
            }

            let Some((bias_name, bias_tensor)) = chunk.get(1) else {
                return Err(StructuralError::MissingBias {
                    index: weight_index,
                    name: weight_name.clone(),
                });
            };
            let bias = parse_bias(weight_index + 1, bias_name, bias_tensor, weight.rows())?;

            previous_outputs = Some(bias.len());
            stages.push(Stage { weight, bias });
        }

        Ok(Self { input_size, stages })
    }

    /// Node count of the synthetic input layer.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of drawn layers after the input layer.
    pub fn bias_layer_count(&self) -> usize {
        self.stages.len()
    }

    /// Node count per drawn layer, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_size)
            .chain(self.stages.iter().map(|s| s.bias.len()))
            .collect()
    }

    /// Shape view of every snapshot entry, in snapshot order.
    pub fn layers(&self) -> impl Iterator<Item = Layer> + '_ {
        self.stages.iter().flat_map(|stage| {
            [
                Layer {
                    index: stage.weight.index,
                    kind: LayerKind::Weight,
                    shape: LayerShape::Matrix {
                        rows: stage.weight.rows(),
                        cols: stage.weight.cols(),
                    },
                },
                Layer {
                    index: stage.bias.index,
                    kind: LayerKind::Bias,
                    shape: LayerShape::Vector {
                        len: stage.bias.len(),
                    },
                },
            ]
        })
    }

    /// Total weight count, i.e. the number of edges in the diagram.
    pub fn edge_count(&self) -> usize {
        self.stages
            .iter()
            .map(|s| s.weight.rows() * s.weight.cols())
            .sum()
    }
}

fn parse_weight(index: usize, name: &str, tensor: &Tensor) -> Result<WeightLayer, StructuralError> {
    let Tensor::Matrix(rows) = tensor else {
        return Err(StructuralError::WeightNotMatrix {
            index,
            name: name.to_owned(),
        });
    };
    let cols = rows.first().map_or(0, Vec::len);
    if cols == 0 {
        return Err(StructuralError::EmptyTensor {
            index,
            name: name.to_owned(),
        });
    }
    for (row, values) in rows.iter().enumerate() {
        if values.len() != cols {
            return Err(StructuralError::RaggedMatrix {
                index,
                name: name.to_owned(),
                row,
                expected: cols,
                found: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StructuralError::NonFinite {
                index,
                name: name.to_owned(),
            });
        }
    }
    Ok(WeightLayer {
        index,
        name: name.to_owned(),
        values: rows.clone(),
        cols,
    })
}

fn parse_bias(
    index: usize,
    name: &str,
    tensor: &Tensor,
    expected: usize,
) -> Result<BiasLayer, StructuralError> {
    let values: &[f64] = match tensor {
        Tensor::Vector(values) => values,
        // `[]` has no element type to tell the two apart.
        Tensor::Matrix(rows) if rows.is_empty() => &[],
        Tensor::Matrix(_) => {
            return Err(StructuralError::BiasNotVector {
                index,
                name: name.to_owned(),
            });
        }
    };
    if values.len() != expected {
        return Err(StructuralError::BiasLengthMismatch {
            index,
            name: name.to_owned(),
            expected,
            found: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StructuralError::NonFinite {
            index,
            name: name.to_owned(),
        });
    }
    Ok(BiasLayer {
        index,
        name: name.to_owned(),
        values: values.to_vec(),
    })
}
