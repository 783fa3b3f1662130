#![forbid(unsafe_code)]

//! Layout primitives for layered network diagrams.
//!
//! Positions come from a fixed layered template, not a graph solver:
//!
//! - **Horizontal**: slot 0 is the input layer, slots `1..=N` are the bias
//!   layers. With `increment = width / (N + 1)`, the input layer sits at
//!   `increment / 2` and slot `s >= 1` at `s * increment`.
//! - **Vertical**: `count` nodes are spread at `height / (count + 1)` steps,
//!   never touching the top or bottom edge.
//! - **Radius**: `max(10, floor(height / (5 * count)))`, per layer.
//!
//! Every coordinate is in untransformed model space. Pan and zoom are applied
//! later by the renderer and never feed back into these formulas.

use nnviz_core::NetworkModel;
use serde::{Deserialize, Serialize};

/// Width used when the host reports an unrealised (<= 1) width.
pub const DEFAULT_WIDTH: f64 = 500.0;
/// Height used when the host reports an unrealised (<= 1) height.
pub const DEFAULT_HEIGHT: f64 = 400.0;
/// Radius for layers whose node count is unknown.
pub const DEFAULT_NODE_RADIUS: f64 = 20.0;
/// Smallest radius a crowded layer shrinks to.
pub const MIN_NODE_RADIUS: f64 = 10.0;

/// Drawable area in device-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Viewport {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Viewport for a host-reported size.
    ///
    /// A widget that has not been mapped yet reports a size of 1; such
    /// dimensions (and non-finite ones) fall back to the defaults.
    pub fn resolve(width: f64, height: f64) -> Self {
        let pick = |v: f64, fallback: f64| if v.is_finite() && v > 1.0 { v } else { fallback };
        Self {
            width: pick(width, DEFAULT_WIDTH),
            height: pick(height, DEFAULT_HEIGHT),
        }
    }
}

/// A point in model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// `count` vertical centres, evenly separated and symmetric about the midline.
pub fn y_positions(height: f64, count: usize) -> Vec<f64> {
    let separator = height / (count as f64 + 1.0);
    (1..=count).map(|i| separator * i as f64).collect()
}

/// Node radius for a layer of `count` nodes. `count == 0` means unknown.
pub fn node_radius(height: f64, count: usize) -> f64 {
    if count == 0 {
        return DEFAULT_NODE_RADIUS;
    }
    (height / (5.0 * count as f64)).floor().max(MIN_NODE_RADIUS)
}

/// Horizontal slot positions for a diagram with `bias_layers` drawn layers
/// after the input layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalSlots {
    increment: f64,
    slot_count: usize,
}

impl HorizontalSlots {
    pub fn new(width: f64, bias_layers: usize) -> Self {
        Self {
            increment: width / (bias_layers as f64 + 1.0),
            slot_count: bias_layers + 1,
        }
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// Number of slots, input included. Never zero.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// The input slot is centred in its own half increment; later slots sit
    /// on exact increment boundaries.
    pub fn x(&self, slot: usize) -> f64 {
        if slot == 0 {
            self.increment / 2.0
        } else {
            slot as f64 * self.increment
        }
    }
}

/// Position of a node in the diagram: drawn layer and row within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub slot: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    pub id: NodeId,
    pub center: Point,
    pub radius: f64,
    /// Bias value; `None` for input nodes.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLayout {
    pub from: NodeId,
    pub to: NodeId,
    pub start: Point,
    pub end: Point,
    pub weight: f64,
}

/// One drawn layer with the edges that end in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub slot: usize,
    pub x: f64,
    pub radius: f64,
    /// Edges from the previous column, row-major over the weight matrix.
    pub incoming: Vec<EdgeLayout>,
    pub nodes: Vec<NodeLayout>,
}

/// Complete model-space geometry for one model and viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkLayout {
    pub viewport: Viewport,
    pub columns: Vec<ColumnLayout>,
}

impl NetworkLayout {
    /// Place every node and edge of `model` inside `viewport`.
    pub fn compute(model: &NetworkModel, viewport: Viewport) -> Self {
        let height = viewport.height;
        let slots = HorizontalSlots::new(viewport.width, model.bias_layer_count());
        let mut columns = Vec::with_capacity(slots.slot_count());

        let input_x = slots.x(0);
        let input_radius = node_radius(height, model.input_size());
        let mut previous_y = y_positions(height, model.input_size());
        columns.push(ColumnLayout {
            slot: 0,
            x: input_x,
            radius: input_radius,
            incoming: Vec::new(),
            nodes: previous_y
                .iter()
                .enumerate()
                .map(|(index, &y)| NodeLayout {
                    id: NodeId { slot: 0, index },
                    center: Point::new(input_x, y),
                    radius: input_radius,
                    value: None,
                })
                .collect(),
        });

        for (k, stage) in model.stages().iter().enumerate() {
            let slot = k + 1;
            let x = slots.x(slot);
            let source_x = slots.x(k);
            let count = stage.bias.len();
            let radius = node_radius(height, count);
            let ys = y_positions(height, count);

            let mut incoming = Vec::with_capacity(stage.weight.rows() * stage.weight.cols());
            for (row, &dst_y) in ys.iter().enumerate() {
                for (col, &weight) in stage.weight.row(row).iter().enumerate() {
                    incoming.push(EdgeLayout {
                        from: NodeId { slot: k, index: col },
                        to: NodeId { slot, index: row },
                        start: Point::new(source_x, previous_y[col]),
                        end: Point::new(x, dst_y),
                        weight,
                    });
                }
            }

            let nodes = ys
                .iter()
                .zip(&stage.bias.values)
                .enumerate()
                .map(|(index, (&y, &value))| NodeLayout {
                    id: NodeId { slot, index },
                    center: Point::new(x, y),
                    radius,
                    value: Some(value),
                })
                .collect();

            columns.push(ColumnLayout {
                slot,
                x,
                radius,
                incoming,
                nodes,
            });
            previous_y = ys;
        }

        Self { viewport, columns }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeLayout> {
        self.columns.iter().flat_map(|c| c.nodes.iter())
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeLayout> {
        self.columns.iter().flat_map(|c| c.incoming.iter())
    }

    pub fn node_count(&self) -> usize {
        self.columns.iter().map(|c| c.nodes.len()).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.columns.iter().map(|c| c.incoming.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnviz_core::ParameterSnapshot;

    fn tiny_model() -> NetworkModel {
        let snap = ParameterSnapshot::new()
            .with("w0", vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .with("b0", vec![0.5, -0.5])
            .with("w1", vec![vec![1.0, 1.0]])
            .with("b1", vec![0.0]);
        NetworkModel::parse(&snap).unwrap()
    }

    #[test]
    fn y_positions_spread_evenly() {
        assert_eq!(y_positions(400.0, 3), vec![100.0, 200.0, 300.0]);
        assert_eq!(y_positions(400.0, 1), vec![200.0]);
        assert!(y_positions(400.0, 0).is_empty());
    }

    #[test]
    fn radius_policy() {
        assert_eq!(node_radius(400.0, 1), 80.0);
        assert_eq!(node_radius(400.0, 3), 26.0);
        assert_eq!(node_radius(400.0, 50), MIN_NODE_RADIUS);
        assert_eq!(node_radius(400.0, 0), DEFAULT_NODE_RADIUS);
    }

    #[test]
    fn slots_use_left_margin_convention() {
        let slots = HorizontalSlots::new(600.0, 2);
        assert_eq!(slots.increment(), 200.0);
        assert_eq!(slots.slot_count(), 3);
        assert_eq!(slots.x(0), 100.0);
        assert_eq!(slots.x(1), 200.0);
        assert_eq!(slots.x(2), 400.0);
    }

    #[test]
    fn viewport_resolves_unrealised_sizes() {
        assert_eq!(Viewport::resolve(1.0, 1.0), Viewport::default());
        assert_eq!(Viewport::resolve(800.0, f64::NAN), Viewport::new(800.0, 400.0));
        assert_eq!(Viewport::resolve(320.0, 240.0), Viewport::new(320.0, 240.0));
    }

    #[test]
    fn tiny_network_geometry() {
        let layout = NetworkLayout::compute(&tiny_model(), Viewport::new(600.0, 300.0));
        assert_eq!(layout.columns.len(), 3);
        assert_eq!(layout.node_count(), 5);
        assert_eq!(layout.edge_count(), 6);

        let input = &layout.columns[0];
        assert_eq!(input.x, 100.0);
        assert_eq!(input.radius, 30.0);
        assert!(input.incoming.is_empty());
        assert_eq!(input.nodes[0].center, Point::new(100.0, 100.0));
        assert_eq!(input.nodes[1].center, Point::new(100.0, 200.0));
        assert!(input.nodes.iter().all(|n| n.value.is_none()));

        let output = &layout.columns[2];
        assert_eq!(output.x, 400.0);
        assert_eq!(output.radius, 60.0);
        assert_eq!(output.nodes[0].center, Point::new(400.0, 150.0));
        assert_eq!(output.nodes[0].value, Some(0.0));
    }

    #[test]
    fn edges_connect_column_to_row() {
        let layout = NetworkLayout::compute(&tiny_model(), Viewport::new(600.0, 300.0));
        let hidden = &layout.columns[1];
        assert_eq!(hidden.incoming.len(), 4);

        // Row 0 col 1 of w0: input node 1 -> hidden node 0, weight 0.
        let edge = hidden.incoming[1];
        assert_eq!(edge.from, NodeId { slot: 0, index: 1 });
        assert_eq!(edge.to, NodeId { slot: 1, index: 0 });
        assert_eq!(edge.start, Point::new(100.0, 200.0));
        assert_eq!(edge.end, Point::new(200.0, 100.0));
        assert_eq!(edge.weight, 0.0);

        let output = &layout.columns[2];
        assert!(output.incoming.iter().all(|e| e.end == Point::new(400.0, 150.0)));
        assert_eq!(output.incoming[0].start, Point::new(200.0, 100.0));
        assert_eq!(output.incoming[1].start, Point::new(200.0, 200.0));
    }
}
