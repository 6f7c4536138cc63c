//! Interactive topology graph canvas.
//!
//! Renders a collapsible graph of hierarchical resources and the event
//! chains between them, with:
//! - Click recovery on a drag-first canvas via gesture classification
//! - Hover-driven one-hop event-chain highlighting
//! - Edge polylines and label placement from externally routed paths
//! - Host-driven pan/zoom transitions with local zoom controls
//! - A selection bridge relaying every interaction to the host's reducer
//!   and telemetry sink
//!
//! Layout itself is not computed here: node positions and edge routes arrive
//! in the [`GraphSnapshot`] from an external layout engine.

mod component;
mod gesture;
pub mod geometry;
mod highlight;
pub mod host;
mod render;
mod selection;
pub mod style;
mod types;
mod viewport;

pub use component::GraphCanvas;
pub use gesture::{CLICK_DISTANCE_THRESHOLD_PX, GestureClassifier, PointerPhase};
pub use highlight::{HoverState, highlight};
pub use render::{CanvasHit, ContainerClass, NodeFrame, hit_test, node_frame};
pub use selection::SelectionBridge;
pub use types::{
	Dimensions, EdgeLabel, EdgeSection, EnvironmentTag, EventChainLink, GraphData, GraphEdge,
	GraphNode, GraphSnapshot, LayoutState, Point, ResourceEvent, ResourceId, ResourceSegment,
	SelectionChange, Viewport,
};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, Transform, ViewportController, ZOOM_STEP};
