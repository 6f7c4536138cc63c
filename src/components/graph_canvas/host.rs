//! Outbound protocol and host-provided capabilities.
//!
//! The canvas never owns application state. Everything it decides is relayed
//! through the narrow interfaces here: actions toward the host's reducer,
//! telemetry events, navigation, notifications, and the environment tagging
//! API. All of them are fire-and-forget from the canvas' point of view.

use std::future::Future;
use std::pin::Pin;

use super::types::{Point, ResourceId};

/// Actions dispatched to the host's reducer-style state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	SelectResource(ResourceId),
	DeselectResource(ResourceId),
	SelectEdge(String),
	DeselectEdge(String),
	SelectIssue(String),
	ToggleNodeCollapsed(ResourceId),
	ExpandAll,
	CollapseAll,
	FitView { duration_ms: f64 },
	InitialRenderCompleted,
}

/// A single telemetry event. `kind` carries the resource or event type
/// classification where one applies.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetryEvent {
	pub name: &'static str,
	pub kind: Option<String>,
}

impl TelemetryEvent {
	pub fn named(name: &'static str) -> Self {
		Self { name, kind: None }
	}

	pub fn with_kind(name: &'static str, kind: impl Into<String>) -> Self {
		Self {
			name,
			kind: Some(kind.into()),
		}
	}
}

/// Consumes [`Action`]s. Owned by the host; the canvas only dispatches.
pub trait ActionSink {
	fn dispatch(&self, action: Action);
}

/// Consumes telemetry events. Failures on the sink side are its own problem;
/// the canvas never observes them.
pub trait TelemetrySink {
	fn record(&self, event: TelemetryEvent);
}

/// Hit-test plus synthetic-activation capability of the rendering target.
///
/// Drag-first canvases swallow clicks; when the gesture classifier decides a
/// release was really a click, it re-dispatches one through this capability.
/// Headless targets may not have it; a no-op implementation is legal and
/// simply loses click recovery.
pub trait ActivationSurface {
	/// Hit-test at `position` and, when an element is found there, dispatch a
	/// synthetic activation targeted at it. Returns whether one was
	/// dispatched. Finding nothing is not an error.
	fn activate_at(&self, position: Point) -> bool;
}

/// Host-application navigation.
pub trait Navigator {
	/// Bring the issues view up. Must be a no-op when it is already open.
	fn open_issues_view(&self);
}

/// User-facing, non-blocking notifications.
pub trait Notifier {
	/// Transient confirmation toast.
	fn confirm(&self, message: &str);
	/// Persistent, dismissable error notification.
	fn error(&self, message: &str);
}

/// Future returned by the environment tagging API.
pub type EnvironmentFuture = Pin<Box<dyn Future<Output = Result<(), String>>>>;

/// Network-backed environment tagging on a resource.
pub trait EnvironmentApi {
	fn tag(&self, resource: &ResourceId, name: &str) -> EnvironmentFuture;
	fn untag(&self, resource: &ResourceId, name: &str) -> EnvironmentFuture;
}
