//! Canvas pan/zoom transform and its transitions.
//!
//! The host drives the viewport through [`Viewport`] descriptors; the zoom
//! controls act locally. Either way the controller only ever animates toward
//! a target, it never reports back: a transition that cannot be played is
//! logged and dropped, and a new request simply supersedes the old one by
//! starting its own transition from the current transform.

use log::warn;

use super::types::Viewport;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 1.0;
/// Multiplicative step of the zoom controls.
pub const ZOOM_STEP: f64 = 1.25;
/// Transition length used by the zoom controls.
const ZOOM_TRANSITION_MS: f64 = 150.0;

/// Live transform applied to the canvas context each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
	pub x: f64,
	pub y: f64,
	pub zoom: f64,
}

impl Default for Transform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			zoom: 1.0,
		}
	}
}

#[derive(Clone, Copy, Debug)]
struct Transition {
	from: Transform,
	to: Transform,
	elapsed_ms: f64,
	duration_ms: f64,
}

/// Applies externally driven viewport descriptors and the zoom controls to
/// the canvas transform, advanced by the animation loop.
#[derive(Debug, Default)]
pub struct ViewportController {
	transform: Transform,
	transition: Option<Transition>,
	last_applied: Option<Viewport>,
}

impl ViewportController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn transform(&self) -> Transform {
		self.transform
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Apply a host-driven descriptor. Only a *changed* descriptor starts a
	/// transition; re-supplying the same value every update cycle is free.
	pub fn apply(&mut self, viewport: Viewport) {
		if self.last_applied == Some(viewport) {
			return;
		}
		self.last_applied = Some(viewport);
		self.start(
			Transform {
				x: viewport.x,
				y: viewport.y,
				zoom: viewport.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
			},
			viewport.duration_ms,
		);
	}

	/// Zoom in one step. At the upper bound this is a successful no-op; the
	/// control is expected to be disabled there, the clamp is the guard for
	/// when it is not.
	pub fn zoom_in(&mut self) {
		self.zoom_to(self.transform.zoom * ZOOM_STEP);
	}

	/// Zoom out one step, clamped like [`Self::zoom_in`].
	pub fn zoom_out(&mut self) {
		self.zoom_to(self.transform.zoom / ZOOM_STEP);
	}

	fn zoom_to(&mut self, zoom: f64) {
		let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
		if zoom == self.transform.zoom {
			return;
		}
		self.start(
			Transform {
				zoom,
				..self.transform
			},
			ZOOM_TRANSITION_MS,
		);
	}

	fn start(&mut self, to: Transform, duration_ms: f64) {
		if !(to.x.is_finite() && to.y.is_finite() && to.zoom.is_finite()) {
			// Rejected transitions never escalate or block later input.
			warn!("viewport transition rejected, non-finite target {to:?}");
			return;
		}
		if duration_ms <= 0.0 {
			self.transform = to;
			self.transition = None;
			return;
		}
		self.transition = Some(Transition {
			from: self.transform,
			to,
			elapsed_ms: 0.0,
			duration_ms,
		});
	}

	/// Advance the in-flight transition by `dt_ms` with ease-out
	/// interpolation. No-op when nothing is animating.
	pub fn tick(&mut self, dt_ms: f64) {
		let Some(mut transition) = self.transition else {
			return;
		};
		transition.elapsed_ms += dt_ms;
		if transition.elapsed_ms >= transition.duration_ms {
			self.transform = transition.to;
			self.transition = None;
			return;
		}
		let progress = transition.elapsed_ms / transition.duration_ms;
		let eased = 1.0 - (1.0 - progress).powi(3);
		let lerp = |from: f64, to: f64| from + (to - from) * eased;
		self.transform = Transform {
			x: lerp(transition.from.x, transition.to.x),
			y: lerp(transition.from.y, transition.to.y),
			zoom: lerp(transition.from.zoom, transition.to.zoom),
		};
		self.transition = Some(transition);
	}
}
