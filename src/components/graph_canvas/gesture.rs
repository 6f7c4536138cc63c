//! Click recovery for drag-first canvases.
//!
//! The rendering surface reports every pointer movement as a pan, including
//! sub-pixel jitter, which suppresses the click events selection depends on.
//! The classifier sums pointer travel over a gesture and, when the total
//! stays under the threshold at release, re-dispatches a synthetic activation
//! through the host's [`ActivationSurface`].

use super::host::ActivationSurface;
use super::types::Point;

/// Accumulated pointer travel below this (strict) classifies a gesture as a
/// click rather than a drag.
pub const CLICK_DISTANCE_THRESHOLD_PX: f64 = 5.0;

/// Phase of a pointer gesture as reported by the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
	Start,
	Move,
	End,
}

/// Stateful pointer-event interpreter.
///
/// One instance per mounted canvas, owned by the component and passed by
/// reference into the pointer handlers. Keeping it instance-scoped prevents
/// gesture state leaking between canvases mounted at the same time.
#[derive(Debug, Default)]
pub struct GestureClassifier {
	last_position: Option<Point>,
	accumulated_distance: f64,
}

impl GestureClassifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Feed one pointer phase into the classifier.
	///
	/// `Start` unconditionally begins a new gesture, superseding any
	/// unfinished one. `Move`/`End` without a preceding `Start` are ignored
	/// (out-of-order event guard). A sub-threshold `End` hit-tests at the
	/// release position through `surface` and synthesizes an activation
	/// there; no element under the pointer means no event, not an error.
	pub fn on_pointer_phase(
		&mut self,
		phase: PointerPhase,
		position: Point,
		surface: &dyn ActivationSurface,
	) {
		match phase {
			PointerPhase::Start => {
				self.last_position = Some(position);
				self.accumulated_distance = 0.0;
			}
			PointerPhase::Move => {
				self.track(position);
			}
			PointerPhase::End => {
				if self.track(position) && self.accumulated_distance < CLICK_DISTANCE_THRESHOLD_PX
				{
					surface.activate_at(position);
				}
				self.last_position = None;
				self.accumulated_distance = 0.0;
			}
		}
	}

	/// Accumulate travel from the last seen position. Returns false when no
	/// gesture is in progress.
	fn track(&mut self, position: Point) -> bool {
		let Some(last) = self.last_position else {
			return false;
		};
		self.accumulated_distance += last.distance_to(position);
		self.last_position = Some(position);
		true
	}
}
