#![forbid(unsafe_code)]

//! Scene construction from layout geometry.
//!
//! Emission order, which is also z-order:
//!
//! 1. input-layer nodes,
//! 2. for each following layer, left to right: its incoming edges, then its
//!    nodes, so circles cover the line ends that meet them,
//! 3. the legend: two swatches, then each label's shadow and face.

use nnviz_core::{ColorScheme, Rgb};
use nnviz_layout::{ColumnLayout, NetworkLayout, Point, Viewport};

use crate::scene::{DrawCommand, Scene, SceneStats};

/// Legend swatch width.
pub const LEGEND_SWATCH_WIDTH: f64 = 87.0;
/// Legend swatch height, measured up from the bottom edge.
pub const LEGEND_SWATCH_HEIGHT: f64 = 20.0;

/// Line width for an edge: `|weight|` saturated at 1, plus 1.
#[inline]
pub fn edge_width(weight: f64) -> f64 {
    weight.abs().clamp(0.0, 1.0) + 1.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBuilder {
    scheme: ColorScheme,
    input_fill: Rgb,
}

impl SceneBuilder {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            input_fill: Rgb::NEUTRAL,
        }
    }

    /// Override the fill used for input nodes.
    #[must_use]
    pub fn input_fill(mut self, fill: Rgb) -> Self {
        self.input_fill = fill;
        self
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    pub fn build(&self, layout: &NetworkLayout) -> Scene {
        let mut commands =
            Vec::with_capacity(layout.node_count() + layout.edge_count() + LEGEND_COMMANDS);
        let mut stats = SceneStats::default();

        for column in &layout.columns {
            self.push_column(column, &mut commands, &mut stats);
        }
        push_legend(&self.scheme, layout.viewport, &mut commands);

        Scene {
            viewport: layout.viewport,
            commands,
            stats,
        }
    }

    /// Scene with only the legend, for when no model has been adopted yet.
    pub fn build_legend(&self, viewport: Viewport) -> Scene {
        let mut commands = Vec::with_capacity(LEGEND_COMMANDS);
        push_legend(&self.scheme, viewport, &mut commands);
        Scene {
            viewport,
            commands,
            stats: SceneStats::default(),
        }
    }

    fn push_column(
        &self,
        column: &ColumnLayout,
        commands: &mut Vec<DrawCommand>,
        stats: &mut SceneStats,
    ) {
        for edge in &column.incoming {
            commands.push(DrawCommand::Line {
                start: edge.start,
                end: edge.end,
                color: self.scheme.color_for(edge.weight),
                width: edge_width(edge.weight),
            });
        }
        stats.edges += column.incoming.len();

        for node in &column.nodes {
            let fill = match node.value {
                Some(bias) => {
                    stats.bias_nodes += 1;
                    self.scheme.color_for(bias)
                }
                None => {
                    stats.input_nodes += 1;
                    self.input_fill
                }
            };
            commands.push(DrawCommand::Circle {
                center: node.center,
                radius: node.radius,
                fill,
                outline: fill,
            });
        }
    }
}

const LEGEND_COMMANDS: usize = 6;

fn push_legend(scheme: &ColorScheme, viewport: Viewport, commands: &mut Vec<DrawCommand>) {
    let (w, h) = (viewport.width, viewport.height);

    commands.push(DrawCommand::Rect {
        min: Point::new(0.0, h - LEGEND_SWATCH_HEIGHT),
        max: Point::new(LEGEND_SWATCH_WIDTH, h),
        fill: scheme.negative,
    });
    commands.push(DrawCommand::Rect {
        min: Point::new(w - LEGEND_SWATCH_WIDTH, h - LEGEND_SWATCH_HEIGHT),
        max: Point::new(w, h),
        fill: scheme.positive,
    });

    let labels = [("Negative", 45.0), ("Positive", w - 43.0)];
    for (text, x) in labels {
        commands.push(DrawCommand::Text {
            at: Point::new(x, h - 9.0),
            text: text.to_owned(),
            fill: Rgb::BLACK,
        });
        commands.push(DrawCommand::Text {
            at: Point::new(x - 1.0, h - 10.0),
            text: text.to_owned(),
            fill: Rgb::WHITE,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnviz_core::{NetworkModel, ParameterSnapshot};

    fn layout(viewport: Viewport) -> NetworkLayout {
        let snap = ParameterSnapshot::new()
            .with("w0", vec![vec![2.0, -0.25]])
            .with("b0", vec![-1.0]);
        NetworkLayout::compute(&NetworkModel::parse(&snap).unwrap(), viewport)
    }

    #[test]
    fn edge_width_saturates() {
        assert_eq!(edge_width(0.0), 1.0);
        assert_eq!(edge_width(-0.5), 1.5);
        assert_eq!(edge_width(1.0), 2.0);
        assert_eq!(edge_width(-40.0), 2.0);
    }

    #[test]
    fn emits_inputs_then_edges_then_nodes_then_legend() {
        let scene = SceneBuilder::new(ColorScheme::default()).build(&layout(Viewport::default()));
        let kinds: Vec<&str> = scene
            .commands()
            .iter()
            .map(|c| match c {
                DrawCommand::Circle { .. } => "circle",
                DrawCommand::Line { .. } => "line",
                DrawCommand::Rect { .. } => "rect",
                DrawCommand::Text { .. } => "text",
            })
            .collect();
        assert_eq!(
            kinds,
            [
                "circle", "circle", "line", "line", "circle", "rect", "rect", "text", "text",
                "text", "text"
            ]
        );
        assert_eq!(
            scene.stats(),
            SceneStats {
                input_nodes: 2,
                bias_nodes: 1,
                edges: 2
            }
        );
    }

    #[test]
    fn colors_follow_values() {
        let scene = SceneBuilder::new(ColorScheme::default()).build(&layout(Viewport::default()));
        let commands = scene.commands();
        assert!(matches!(
            commands[0],
            DrawCommand::Circle { fill: Rgb::NEUTRAL, outline: Rgb::NEUTRAL, .. }
        ));
        // Weight 2.0 extrapolates past the positive endpoint and saturates.
        assert!(matches!(
            commands[2],
            DrawCommand::Line { color: Rgb::BLUE, width, .. } if width == 2.0
        ));
        assert!(matches!(
            commands[3],
            DrawCommand::Line { width, .. } if width == 1.25
        ));
        assert!(matches!(commands[4], DrawCommand::Circle { fill: Rgb::RED, .. }));
    }

    #[test]
    fn legend_anchors_to_viewport_corners() {
        let scene = SceneBuilder::new(ColorScheme::default()).build(&layout(Viewport::new(640.0, 480.0)));
        let legend = &scene.commands()[scene.len() - LEGEND_COMMANDS..];
        assert_eq!(
            legend[0],
            DrawCommand::Rect {
                min: Point::new(0.0, 460.0),
                max: Point::new(87.0, 480.0),
                fill: Rgb::RED,
            }
        );
        assert_eq!(
            legend[1],
            DrawCommand::Rect {
                min: Point::new(553.0, 460.0),
                max: Point::new(640.0, 480.0),
                fill: Rgb::BLUE,
            }
        );
        assert_eq!(
            legend[4],
            DrawCommand::Text {
                at: Point::new(597.0, 471.0),
                text: "Positive".into(),
                fill: Rgb::BLACK,
            }
        );
        assert_eq!(
            legend[5],
            DrawCommand::Text {
                at: Point::new(596.0, 470.0),
                text: "Positive".into(),
                fill: Rgb::WHITE,
            }
        );
    }

    #[test]
    fn legend_only_scene() {
        let scene = SceneBuilder::new(ColorScheme::default()).build_legend(Viewport::default());
        assert_eq!(scene.len(), LEGEND_COMMANDS);
        assert_eq!(scene.stats(), SceneStats::default());
        assert!(matches!(scene.commands()[0], DrawCommand::Rect { fill: Rgb::RED, .. }));
    }

    #[test]
    fn custom_input_fill() {
        let fill = Rgb::new(1, 2, 3);
        let scene = SceneBuilder::new(ColorScheme::default())
            .input_fill(fill)
            .build(&layout(Viewport::default()));
        assert!(matches!(scene.commands()[0], DrawCommand::Circle { fill: f, .. } if f == fill));
    }
}
