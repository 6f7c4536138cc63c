//! Snapshot data structures supplied by the host application.
//!
//! The host owns the graph: which resources and events exist, their layout
//! positions and routed edge paths, the current selection, and the viewport.
//! Everything here is an immutable per-update input; the canvas never writes
//! back into it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::warn;
use serde::Deserialize;

/// A point in canvas coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to another point.
	pub fn distance_to(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}
}

/// Width/height pair for a laid-out node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Dimensions {
	pub width: f64,
	pub height: f64,
}

/// One `{kind, id}` step in a resource path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ResourceSegment {
	/// Resource type of this step (e.g. "cluster", "workload").
	pub kind: String,
	pub id: String,
}

/// Ordered, non-empty path of segments from the root ancestor down to the
/// resource itself. The terminal segment's `kind` classifies the resource
/// for telemetry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ResourceId(Vec<ResourceSegment>);

impl ResourceId {
	/// Build an id from segments. Returns `None` for an empty path.
	pub fn new(segments: Vec<ResourceSegment>) -> Option<Self> {
		if segments.is_empty() {
			None
		} else {
			Some(Self(segments))
		}
	}

	pub fn segments(&self) -> &[ResourceSegment] {
		&self.0
	}

	/// Kind of the terminal segment, i.e. the resource's own type.
	pub fn terminal_kind(&self) -> &str {
		// Non-empty by construction; deserialized ids are checked on snapshot build.
		self.0.last().map(|s| s.kind.as_str()).unwrap_or("unknown")
	}
}

impl fmt::Display for ResourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, seg) in self.0.iter().enumerate() {
			if i > 0 {
				write!(f, "/")?;
			}
			write!(f, "{}:{}", seg.kind, seg.id)?;
		}
		Ok(())
	}
}

/// An environment label attached to a resource.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentTag {
	pub name: String,
	/// Index into the environment color palette.
	pub color_index: usize,
	/// When set, the tag was inherited from this ancestor resource and is
	/// read-only on the node carrying it.
	#[serde(default)]
	pub inherited_from: Option<ResourceId>,
}

impl EnvironmentTag {
	pub fn is_inherited(&self) -> bool {
		self.inherited_from.is_some()
	}
}

/// A node of the topology graph, positioned by the external layout engine.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	pub id: ResourceId,
	/// Number of direct children. A node is collapsible only when positive.
	pub num_children: usize,
	pub collapsed: bool,
	#[serde(default)]
	pub environments: Vec<EnvironmentTag>,
	#[serde(default)]
	pub issue_ids: Vec<String>,
	pub absolute_position: Point,
	#[serde(default)]
	pub original_parent_id: Option<ResourceId>,
	#[serde(default)]
	pub original_dimensions: Option<Dimensions>,
	#[serde(default)]
	pub first_seen_at: Option<String>,
	#[serde(default)]
	pub last_seen_at: Option<String>,
	#[serde(default)]
	pub highlighted: bool,
}

impl GraphNode {
	/// Collapsing only makes sense for container nodes.
	pub fn is_collapsible(&self) -> bool {
		self.num_children > 0
	}
}

/// One event aggregated into an edge.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEvent {
	pub id: ResourceId,
	/// Event classification used for telemetry tagging.
	pub kind: String,
	#[serde(default)]
	pub summary: Option<String>,
}

/// Label placement hint produced by the layout engine.
///
/// All fields are optional; an incomplete label is rendered at whatever `y`
/// the layout engine supplied (see `geometry::correct_label_y`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EdgeLabel {
	#[serde(default)]
	pub text: Option<String>,
	#[serde(default)]
	pub x: Option<f64>,
	#[serde(default)]
	pub y: Option<f64>,
	#[serde(default)]
	pub width: Option<f64>,
}

/// Routed path for an edge: start, bends, end.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSection {
	pub start_point: Point,
	#[serde(default)]
	pub bend_points: Vec<Point>,
	pub end_point: Point,
}

/// An edge aggregating the events between two resources.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
	pub id: String,
	pub original_source_id: ResourceId,
	pub original_target_id: ResourceId,
	#[serde(default)]
	pub label: EdgeLabel,
	/// Absent until the layout engine has routed the edge; an edge without a
	/// section renders nothing.
	#[serde(default)]
	pub section: Option<EdgeSection>,
	#[serde(default)]
	pub events: Vec<ResourceEvent>,
	/// Set by the highlight propagator, never by the host.
	#[serde(default)]
	pub event_chain_hovered: bool,
}

/// One-hop causal/temporal neighbors of an edge, precomputed by the host.
///
/// Entries may reference edge ids no longer present in the current edge set;
/// such staleness is tolerated and silently skipped.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EventChainLink {
	#[serde(default)]
	pub preceding: Vec<String>,
	#[serde(default)]
	pub following: Vec<String>,
}

/// A pan/zoom transition descriptor. A *value change* between updates asks
/// the viewport controller to animate to the new transform.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
	pub x: f64,
	pub y: f64,
	pub zoom: f64,
	/// Transition length in milliseconds; 0 jumps immediately.
	#[serde(default)]
	pub duration_ms: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			zoom: 1.0,
			duration_ms: 0.0,
		}
	}
}

/// Whether the canvas has completed its first stable layout pass.
/// Monotonic within one mount: `Initial` to `LaidOut` exactly once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutState {
	#[default]
	Initial,
	LaidOut,
}

/// One entry of a selection change batch.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SelectionChange<Id> {
	pub id: Id,
	pub selected: bool,
}

/// Wire format of the snapshot as embedded by the host page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
	#[serde(default)]
	pub chain_links: HashMap<String, EventChainLink>,
	/// Mirror of the host-owned selection; the canvas reads it, never owns it.
	#[serde(default)]
	pub selected_node_ids: Vec<ResourceId>,
	#[serde(default)]
	pub selected_edge_ids: Vec<String>,
	#[serde(default)]
	pub layout_state: LayoutState,
	#[serde(default)]
	pub viewport: Viewport,
}

/// Indexed form of [`GraphData`] consumed by the interaction engine.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
	pub nodes: HashMap<ResourceId, GraphNode>,
	pub edges: HashMap<String, GraphEdge>,
	pub chain_links: HashMap<String, EventChainLink>,
	pub selected_node_ids: HashSet<ResourceId>,
	pub selected_edge_ids: HashSet<String>,
	pub layout_state: LayoutState,
	pub viewport: Viewport,
}

impl From<GraphData> for GraphSnapshot {
	fn from(data: GraphData) -> Self {
		let mut nodes = HashMap::with_capacity(data.nodes.len());
		for node in data.nodes {
			if node.id.segments().is_empty() {
				warn!("dropping node with empty resource id");
				continue;
			}
			if nodes.insert(node.id.clone(), node).is_some() {
				warn!("duplicate node id in snapshot, keeping the later one");
			}
		}
		let mut edges = HashMap::with_capacity(data.edges.len());
		for edge in data.edges {
			if edges.insert(edge.id.clone(), edge).is_some() {
				warn!("duplicate edge id in snapshot, keeping the later one");
			}
		}
		Self {
			nodes,
			edges,
			chain_links: data.chain_links,
			selected_node_ids: data.selected_node_ids.into_iter().collect(),
			selected_edge_ids: data.selected_edge_ids.into_iter().collect(),
			layout_state: data.layout_state,
			viewport: data.viewport,
		}
	}
}

/// Builds a [`ResourceId`] from `(kind, id)` pairs. Test helper shared by the
/// sibling modules' test suites.
#[cfg(test)]
pub(crate) fn resource_id(path: &[(&str, &str)]) -> ResourceId {
	ResourceId::new(
		path.iter()
			.map(|(kind, id)| ResourceSegment {
				kind: (*kind).into(),
				id: (*id).into(),
			})
			.collect(),
	)
	.unwrap()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn terminal_kind_is_last_segment() {
		let id = resource_id(&[("cluster", "c1"), ("namespace", "ns"), ("workload", "w1")]);
		assert_eq!(id.terminal_kind(), "workload");
		assert_eq!(id.to_string(), "cluster:c1/namespace:ns/workload:w1");
	}

	#[test]
	fn empty_resource_id_rejected() {
		assert!(ResourceId::new(Vec::new()).is_none());
	}

	#[test]
	fn snapshot_deserializes_from_host_json() {
		let json = r#"{
			"nodes": [{
				"id": [{"kind": "cluster", "id": "c1"}],
				"numChildren": 2,
				"collapsed": false,
				"absolutePosition": {"x": 10.0, "y": 20.0},
				"environments": [{"name": "prod", "colorIndex": 3}]
			}],
			"edges": [{
				"id": "e1",
				"originalSourceId": [{"kind": "cluster", "id": "c1"}],
				"originalTargetId": [{"kind": "cluster", "id": "c2"}],
				"events": [{"id": [{"kind": "event", "id": "ev1"}], "kind": "deployment"}]
			}],
			"chainLinks": {"e1": {"preceding": [], "following": ["e2"]}},
			"layoutState": "laidOut",
			"viewport": {"x": 0.0, "y": 0.0, "zoom": 0.5}
		}"#;
		let snapshot: GraphSnapshot = serde_json::from_str::<GraphData>(json).unwrap().into();
		assert_eq!(snapshot.nodes.len(), 1);
		assert_eq!(snapshot.layout_state, LayoutState::LaidOut);
		let edge = &snapshot.edges["e1"];
		assert!(edge.section.is_none());
		assert!(!edge.event_chain_hovered);
		assert_eq!(snapshot.chain_links["e1"].following, vec!["e2".to_string()]);
	}
}
