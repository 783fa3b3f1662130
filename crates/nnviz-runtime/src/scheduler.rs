#![forbid(unsafe_code)]

//! Rebuild scheduling for the render thread.
//!
//! The scheduler owns the adopted model, the current color scheme, the last
//! reported size, and the model-space [`Scene`]. Three triggers cause a
//! rebuild:
//!
//! 1. a resize whose reported width or height differs from the last one,
//! 2. a color-scheme change (always),
//! 3. a snapshot taken from the [`SnapshotMailbox`].
//!
//! Each rebuild moves the [`RebuildGate`] from `Idle` to `Rebuilding` and
//! back. Entering the gate while it is already `Rebuilding` is an invariant
//! violation: it panics in debug builds and is reported as
//! [`SchedulerError::InvariantViolation`] otherwise.
//!
//! A snapshot that fails to parse is rejected without touching the adopted
//! model or the current scene.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use nnviz_core::{ColorScheme, NetworkModel, ParameterSnapshot, Rgb, StructuralError};
use nnviz_layout::{NetworkLayout, Viewport};
use nnviz_render::{Renderer, Scene, SceneBuilder, ViewTransform};
use web_time::Instant;

use crate::mailbox::SnapshotMailbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Rebuilding,
}

/// What asked for a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Resize,
    ColorScheme,
    Snapshot,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resize => "resize",
            Self::ColorScheme => "color_scheme",
            Self::Snapshot => "snapshot",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Rebuilt,
    /// Nothing to do: same viewport, or an empty mailbox.
    Unchanged,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("snapshot rejected: {0}")]
    Structural(#[from] StructuralError),

    #[error("{attempted} rebuild requested while a {active} rebuild is in progress")]
    InvariantViolation { active: Trigger, attempted: Trigger },
}

/// Two-state guard serializing rebuilds.
#[derive(Debug, Default)]
pub struct RebuildGate {
    state: Cell<SchedulerState>,
    active: Cell<Option<Trigger>>,
}

impl RebuildGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state.get()
    }

    /// Move to `Rebuilding` for the lifetime of the returned pass.
    pub fn enter(&self, trigger: Trigger) -> Result<RebuildPass<'_>, SchedulerError> {
        if self.state.get() == SchedulerState::Rebuilding {
            let active = self.active.get().unwrap_or(trigger);
            tracing::error!(
                target: "nnviz.scheduler",
                %active,
                attempted = %trigger,
                "reentrant rebuild"
            );
            if cfg!(debug_assertions) {
                panic!("reentrant rebuild: {trigger} during {active}");
            }
            return Err(SchedulerError::InvariantViolation {
                active,
                attempted: trigger,
            });
        }
        self.state.set(SchedulerState::Rebuilding);
        self.active.set(Some(trigger));
        Ok(RebuildPass { gate: self })
    }
}

/// Returns the gate to `Idle` when dropped, including on unwind.
#[derive(Debug)]
pub struct RebuildPass<'a> {
    gate: &'a RebuildGate,
}

impl Drop for RebuildPass<'_> {
    fn drop(&mut self) {
        self.gate.state.set(SchedulerState::Idle);
        self.gate.active.set(None);
    }
}

/// Decides when to rebuild the scene, and rebuilds it.
///
/// Lives on the render thread; the only cross-thread input is the shared
/// mailbox.
#[derive(Debug)]
pub struct UpdateScheduler {
    mailbox: Arc<SnapshotMailbox>,
    scheme: ColorScheme,
    input_fill: Rgb,
    /// Size as the host reported it; resolved only when building.
    reported: Option<(f64, f64)>,
    model: Option<NetworkModel>,
    scene: Scene,
    gate: RebuildGate,
    rebuilds: u64,
}

impl UpdateScheduler {
    pub fn new(mailbox: Arc<SnapshotMailbox>, scheme: ColorScheme) -> Self {
        Self {
            mailbox,
            scheme,
            input_fill: Rgb::NEUTRAL,
            reported: None,
            model: None,
            scene: Scene::default(),
            gate: RebuildGate::new(),
            rebuilds: 0,
        }
    }

    #[must_use]
    pub fn with_input_fill(mut self, fill: Rgb) -> Self {
        self.input_fill = fill;
        self
    }

    pub fn mailbox(&self) -> &Arc<SnapshotMailbox> {
        &self.mailbox
    }

    pub fn state(&self) -> SchedulerState {
        self.gate.state()
    }

    /// Number of completed rebuilds.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn model(&self) -> Option<&NetworkModel> {
        self.model.as_ref()
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    /// Viewport resolved from the last reported size, or the default before
    /// the first resize.
    pub fn viewport(&self) -> Viewport {
        self.reported
            .map(|(width, height)| Viewport::resolve(width, height))
            .unwrap_or_default()
    }

    /// Host resize notification. Rebuilds whenever either reported dimension
    /// changed, even if both sizes resolve to the same viewport.
    pub fn on_resize(&mut self, width: f64, height: f64) -> Result<RebuildOutcome, SchedulerError> {
        let unchanged = self.reported.is_some_and(|(last_width, last_height)| {
            same_dimension(last_width, width) && same_dimension(last_height, height)
        });
        if unchanged {
            return Ok(RebuildOutcome::Unchanged);
        }
        self.reported = Some((width, height));
        self.rebuild(Trigger::Resize)
    }

    pub fn on_color_scheme_changed(
        &mut self,
        scheme: ColorScheme,
    ) -> Result<RebuildOutcome, SchedulerError> {
        self.scheme = scheme;
        self.rebuild(Trigger::ColorScheme)
    }

    /// Take the latest snapshot from the mailbox, if any, and adopt it.
    pub fn poll_mailbox(&mut self) -> Result<RebuildOutcome, SchedulerError> {
        match self.mailbox.take_if_present() {
            Some(snapshot) => self.adopt_snapshot(&snapshot),
            None => Ok(RebuildOutcome::Unchanged),
        }
    }

    /// Parse and adopt `snapshot`, then rebuild.
    ///
    /// On a structural error the previous model and scene stay in place.
    pub fn adopt_snapshot(
        &mut self,
        snapshot: &ParameterSnapshot,
    ) -> Result<RebuildOutcome, SchedulerError> {
        let model = match NetworkModel::parse(snapshot) {
            Ok(model) => model,
            Err(err) => {
                tracing::warn!(
                    target: "nnviz.scheduler",
                    error = %err,
                    entries = snapshot.len(),
                    "rejected parameter snapshot"
                );
                return Err(err.into());
            }
        };
        self.model = Some(model);
        self.rebuild(Trigger::Snapshot)
    }

    /// Replay the current scene into `renderer` through `view`.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, view: &ViewTransform) {
        self.scene.draw(renderer, view);
    }

    fn rebuild(&mut self, trigger: Trigger) -> Result<RebuildOutcome, SchedulerError> {
        let _pass = self.gate.enter(trigger)?;

        let start = Instant::now();
        let span = tracing::debug_span!(
            "nnviz.rebuild",
            trigger = %trigger,
            nodes = tracing::field::Empty,
            edges = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        )
        .entered();

        let viewport = self.viewport();
        let builder = SceneBuilder::new(self.scheme).input_fill(self.input_fill);
        self.scene = match &self.model {
            Some(model) => builder.build(&NetworkLayout::compute(model, viewport)),
            None => builder.build_legend(viewport),
        };
        self.rebuilds += 1;

        let stats = self.scene.stats();
        span.record("nodes", stats.input_nodes + stats.bias_nodes);
        span.record("edges", stats.edges);
        span.record("duration_us", start.elapsed().as_micros() as u64);
        tracing::debug!(
            target: "nnviz.scheduler",
            rebuilds = self.rebuilds,
            commands = self.scene.len(),
            "scene rebuilt"
        );

        Ok(RebuildOutcome::Rebuilt)
    }
}

/// Exact comparison, except that two NaN reports count as the same.
fn same_dimension(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnviz_render::{DrawCommand, RecordingRenderer};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::LookupSpan;

    fn snapshot() -> ParameterSnapshot {
        ParameterSnapshot::new()
            .with("w0", vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .with("b0", vec![0.5, -0.5])
    }

    fn scheduler() -> UpdateScheduler {
        UpdateScheduler::new(SnapshotMailbox::shared(), ColorScheme::default())
    }

    #[test]
    fn starts_idle_and_empty() {
        let sched = scheduler();
        assert_eq!(sched.state(), SchedulerState::Idle);
        assert_eq!(sched.rebuild_count(), 0);
        assert!(sched.scene().is_empty());
        assert!(sched.model().is_none());
        assert_eq!(sched.viewport(), Viewport::default());
    }

    #[test]
    fn resize_rebuilds_only_on_change() {
        let mut sched = scheduler();
        assert_eq!(sched.on_resize(640.0, 480.0).unwrap(), RebuildOutcome::Rebuilt);
        assert_eq!(sched.on_resize(640.0, 480.0).unwrap(), RebuildOutcome::Unchanged);
        assert_eq!(sched.rebuild_count(), 1);
        assert_eq!(sched.on_resize(640.0, 481.0).unwrap(), RebuildOutcome::Rebuilt);
        assert_eq!(sched.rebuild_count(), 2);
    }

    #[test]
    fn unrealised_sizes_resolve_to_default() {
        let mut sched = scheduler();
        sched.on_resize(1.0, 1.0).unwrap();
        assert_eq!(sched.viewport(), Viewport::default());
        let scene = sched.scene().clone();

        // A changed dimension rebuilds even when it resolves to the same viewport.
        assert_eq!(sched.on_resize(0.5, 1.0).unwrap(), RebuildOutcome::Rebuilt);
        assert_eq!(sched.on_resize(500.0, 400.0).unwrap(), RebuildOutcome::Rebuilt);
        assert_eq!(sched.rebuild_count(), 3);
        assert_eq!(sched.scene(), &scene);

        assert_eq!(sched.on_resize(500.0, 400.0).unwrap(), RebuildOutcome::Unchanged);
        sched.on_resize(f64::NAN, 400.0).unwrap();
        assert_eq!(sched.on_resize(f64::NAN, 400.0).unwrap(), RebuildOutcome::Unchanged);
        assert_eq!(sched.rebuild_count(), 4);
    }

    #[test]
    fn without_a_model_the_scene_is_the_legend() {
        let mut sched = scheduler();
        sched.on_resize(300.0, 200.0).unwrap();
        assert_eq!(sched.scene().len(), 6);
        assert!(
            sched
                .scene()
                .commands()
                .iter()
                .all(|c| matches!(c, DrawCommand::Rect { .. } | DrawCommand::Text { .. }))
        );
    }

    #[test]
    fn color_scheme_change_always_rebuilds() {
        let mut sched = scheduler();
        sched.adopt_snapshot(&snapshot()).unwrap();
        let scheme = ColorScheme::new(Rgb::new(0, 255, 0), Rgb::new(255, 255, 0));
        sched.on_color_scheme_changed(scheme).unwrap();
        sched.on_color_scheme_changed(scheme).unwrap();
        assert_eq!(sched.rebuild_count(), 3);
        assert_eq!(sched.scheme(), scheme);
    }

    #[test]
    fn rejected_snapshot_keeps_previous_state() {
        let mut sched = scheduler();
        sched.adopt_snapshot(&snapshot()).unwrap();
        let scene = sched.scene().clone();
        let model = sched.model().cloned();

        let bad = ParameterSnapshot::new()
            .with("w0", vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .with("b0", vec![0.5]);
        let err = sched.adopt_snapshot(&bad).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Structural(StructuralError::BiasLengthMismatch { .. })
        ));
        assert_eq!(sched.scene(), &scene);
        assert_eq!(sched.model().cloned(), model);
        assert_eq!(sched.rebuild_count(), 1);
        assert_eq!(sched.state(), SchedulerState::Idle);
    }

    #[test]
    fn poll_adopts_only_the_latest() {
        let mut sched = scheduler();
        sched.mailbox().publish(snapshot());
        sched
            .mailbox()
            .publish(ParameterSnapshot::new().with("w0", vec![vec![1.0]]).with("b0", vec![1.0]));

        assert_eq!(sched.poll_mailbox().unwrap(), RebuildOutcome::Rebuilt);
        assert_eq!(sched.model().map(NetworkModel::input_size), Some(1));
        assert_eq!(sched.poll_mailbox().unwrap(), RebuildOutcome::Unchanged);
        assert_eq!(sched.rebuild_count(), 1);
    }

    #[test]
    fn draw_replays_scene() {
        let mut sched = scheduler();
        sched.adopt_snapshot(&snapshot()).unwrap();
        let mut renderer = RecordingRenderer::new();
        sched.draw(&mut renderer, &ViewTransform::IDENTITY);
        assert_eq!(renderer.commands(), sched.scene().commands());
        assert_eq!(renderer.clear_count(), 1);
    }

    #[test]
    fn gate_returns_to_idle() {
        let gate = RebuildGate::new();
        {
            let _pass = gate.enter(Trigger::Resize).unwrap();
            assert_eq!(gate.state(), SchedulerState::Rebuilding);
        }
        assert_eq!(gate.state(), SchedulerState::Idle);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "reentrant rebuild")]
    fn reentrant_rebuild_is_fatal_in_debug() {
        let gate = RebuildGate::new();
        let _pass = gate.enter(Trigger::Snapshot).unwrap();
        let _ = gate.enter(Trigger::Resize);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn reentrant_rebuild_is_reported() {
        let gate = RebuildGate::new();
        let _pass = gate.enter(Trigger::Snapshot).unwrap();
        let err = gate.enter(Trigger::Resize).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::InvariantViolation {
                active: Trigger::Snapshot,
                attempted: Trigger::Resize
            }
        ));
    }

    // --- tracing capture ---

    #[derive(Default, Clone)]
    struct Captured {
        spans: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
        warnings: Arc<Mutex<usize>>,
    }

    struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

    impl tracing::field::Visit for FieldVisitor<'_> {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S> tracing_subscriber::Layer<S> for Captured
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut fields = HashMap::new();
            attrs.record(&mut FieldVisitor(&mut fields));
            self.spans
                .lock()
                .unwrap()
                .push((attrs.metadata().name().to_string(), fields));
        }

        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::WARN {
                *self.warnings.lock().unwrap() += 1;
            }
        }
    }

    #[test]
    fn rebuilds_are_traced() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        tracing::subscriber::with_default(subscriber, || {
            let mut sched = scheduler();
            sched.on_resize(640.0, 480.0).unwrap();
            sched.adopt_snapshot(&snapshot()).unwrap();
            let _ = sched.adopt_snapshot(&ParameterSnapshot::new());
        });

        let spans = captured.spans.lock().unwrap();
        let rebuilds: Vec<_> = spans.iter().filter(|(name, _)| name == "nnviz.rebuild").collect();
        assert_eq!(rebuilds.len(), 2);
        assert_eq!(rebuilds[0].1.get("trigger").map(String::as_str), Some("resize"));
        assert_eq!(rebuilds[1].1.get("trigger").map(String::as_str), Some("snapshot"));
        assert_eq!(*captured.warnings.lock().unwrap(), 1);
    }
}
