//! Visual configuration for the canvas.
//!
//! All tunables live here so the drawing code stays free of magic numbers.
//! Nodes render as containers: an expanded ("open") container shrinks to its
//! title bar because its children are drawn inside it as nodes of their own,
//! while a collapsed ("closed") container takes its full card height.

/// Pixel size of the issue indicator badge. Half of it doubles as the
/// lateral edge offset so edges do not run under a source node's badge.
pub const ISSUE_BADGE_SIZE_PX: f64 = 16.0;

/// Distance from an edge path within which a pointer counts as hovering it.
pub const EDGE_HOVER_TOLERANCE_PX: f64 = 6.0;

/// Colors and metrics of the rendered graph.
#[derive(Clone, Debug)]
pub struct CanvasStyle {
	pub background: &'static str,
	pub node_fill: &'static str,
	pub node_border: &'static str,
	pub node_border_selected: &'static str,
	pub title_bar_fill: &'static str,
	pub title_text: &'static str,
	pub edge_stroke: &'static str,
	pub edge_stroke_chain: &'static str,
	pub label_text: &'static str,
	pub issue_badge_fill: &'static str,
	/// Environment chip palette, indexed by `color_index` modulo its length.
	pub environment_palette: &'static [&'static str],
	/// Alpha applied to chips of inherited (read-only) environment tags.
	pub inherited_tag_alpha: f64,

	pub node_width: f64,
	/// Full card height of a leaf or closed container.
	pub closed_container_height: f64,
	/// Title-bar-only height of an open container.
	pub open_container_height: f64,
	pub title_bar_height: f64,
	pub edge_width: f64,
	pub edge_width_chain: f64,
	pub label_font: &'static str,
}

impl Default for CanvasStyle {
	fn default() -> Self {
		Self {
			background: "#10141a",
			node_fill: "#1d2430",
			node_border: "#3b4859",
			node_border_selected: "#62a0ea",
			title_bar_fill: "#283245",
			title_text: "#e8ecf1",
			edge_stroke: "#5c6b80",
			edge_stroke_chain: "#f5c211",
			label_text: "#aeb9c9",
			issue_badge_fill: "#e01b24",
			environment_palette: &[
				"#1976d2", "#7b1fa2", "#2e7d32", "#e65100", "#00838f", "#c62828",
			],
			inherited_tag_alpha: 0.45,
			node_width: 180.0,
			closed_container_height: 120.0,
			open_container_height: 40.0,
			title_bar_height: 28.0,
			edge_width: 1.5,
			edge_width_chain: 3.0,
			label_font: "11px sans-serif",
		}
	}
}

impl CanvasStyle {
	/// Lateral offset applied to every edge's start vertex.
	pub fn lateral_edge_offset(&self) -> f64 {
		ISSUE_BADGE_SIZE_PX / 2.0
	}

	/// Chip color for an environment tag.
	pub fn environment_color(&self, color_index: usize) -> &'static str {
		self.environment_palette[color_index % self.environment_palette.len()]
	}
}
