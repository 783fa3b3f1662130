#![forbid(unsafe_code)]

//! Host-event adapter.
//!
//! [`Visualizer`] is what a GUI embeds: it owns the [`UpdateScheduler`] and
//! the [`ViewTransform`] and translates host events into rebuilds (geometry
//! or color changed) or view updates (pan and zoom only). Errors leave the
//! previous scene on screen; see [`Error::recovery`].

use std::sync::Arc;

use nnviz_core::{ChannelInput, ColorScheme, ParameterSnapshot};
use nnviz_layout::Point;
use nnviz_render::{Renderer, Scene, ViewTransform};
use nnviz_runtime::{RebuildOutcome, SnapshotMailbox, UpdateScheduler};

use crate::config::Settings;
use crate::error::{Error, Result};

/// Events a host UI forwards.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Resize { width: f64, height: f64 },
    ColorSchemeChanged(ColorScheme),
    /// Raw channel values straight from input fields, validated on arrival.
    ColorChannelsEdited {
        negative: [ChannelInput; 3],
        positive: [ChannelInput; 3],
    },
    PointerDrag { dx: f64, dy: f64 },
    ScrollZoom { delta: f64, pivot: Point },
    /// Periodic tick: check the mailbox.
    Poll,
}

/// What the host has to repaint after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repaint {
    /// The scene was rebuilt.
    Scene,
    /// Only the view transform moved.
    View,
    Nothing,
}

impl From<RebuildOutcome> for Repaint {
    fn from(outcome: RebuildOutcome) -> Self {
        match outcome {
            RebuildOutcome::Rebuilt => Self::Scene,
            RebuildOutcome::Unchanged => Self::Nothing,
        }
    }
}

#[derive(Debug)]
pub struct Visualizer {
    scheduler: UpdateScheduler,
    view: ViewTransform,
}

impl Visualizer {
    /// Create a visualizer and build its first (legend-only) scene.
    pub fn new(mailbox: Arc<SnapshotMailbox>, settings: &Settings) -> Result<Self> {
        let mut scheduler = UpdateScheduler::new(mailbox, settings.scheme);
        scheduler.on_resize(settings.viewport.width, settings.viewport.height)?;
        Ok(Self {
            scheduler,
            view: ViewTransform::new(),
        })
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn scene(&self) -> &Scene {
        self.scheduler.scene()
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    /// Adopt a snapshot directly, bypassing the mailbox.
    pub fn show(&mut self, snapshot: &ParameterSnapshot) -> Result<Repaint> {
        Ok(self.scheduler.adopt_snapshot(snapshot)?.into())
    }

    pub fn handle(&mut self, event: HostEvent) -> Result<Repaint> {
        match event {
            HostEvent::Resize { width, height } => {
                Ok(self.scheduler.on_resize(width, height)?.into())
            }
            HostEvent::ColorSchemeChanged(scheme) => {
                Ok(self.scheduler.on_color_scheme_changed(scheme)?.into())
            }
            HostEvent::ColorChannelsEdited { negative, positive } => {
                let scheme = ColorScheme::try_from_channels(&negative, &positive).map_err(|err| {
                    tracing::warn!(target: "nnviz", error = %err, "rejected color scheme");
                    Error::from(err)
                })?;
                Ok(self.scheduler.on_color_scheme_changed(scheme)?.into())
            }
            HostEvent::PointerDrag { dx, dy } => {
                let before = self.view;
                self.view.pan(dx, dy);
                Ok(self.view_repaint(before))
            }
            HostEvent::ScrollZoom { delta, pivot } => {
                let before = self.view;
                self.view.zoom_by_scroll(delta, pivot);
                Ok(self.view_repaint(before))
            }
            HostEvent::Poll => Ok(self.scheduler.poll_mailbox()?.into()),
        }
    }

    /// Replay the current scene through the current view.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        self.scheduler.draw(renderer, &self.view);
    }

    fn view_repaint(&self, before: ViewTransform) -> Repaint {
        if self.view == before {
            Repaint::Nothing
        } else {
            Repaint::View
        }
    }
}
