//! Canvas rendering of the topology snapshot.
//!
//! Drawing happens in passes under the viewport transform: edges first, then
//! node containers on top. The structural decisions (container class, hit
//! regions) are pure functions here so they can be tested without a canvas.

use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{build_path, distance_to_polyline, label_anchor_y};
use super::style::{CanvasStyle, EDGE_HOVER_TOLERANCE_PX, ISSUE_BADGE_SIZE_PX};
use super::types::{GraphEdge, GraphNode, GraphSnapshot, Point, ResourceId};
use super::viewport::Transform;

/// Structural rendering class of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerClass {
	/// No children: a plain resource card.
	Leaf,
	/// Expanded container: children render inside it, so the frame shrinks
	/// to its title bar.
	OpenContainer,
	/// Collapsed container: full card height, children hidden.
	ClosedContainer,
}

/// Resolved frame of a node: class plus the rectangle it occupies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeFrame {
	pub class: ContainerClass,
	pub width: f64,
	pub height: f64,
}

/// Decide how a node renders. Only nodes with children are containers at
/// all; the collapsed flag then switches between the open (title-bar-only)
/// and closed (full height) frame.
pub fn node_frame(node: &GraphNode, style: &CanvasStyle) -> NodeFrame {
	let width = node
		.original_dimensions
		.map(|d| d.width)
		.unwrap_or(style.node_width);
	let full_height = node
		.original_dimensions
		.map(|d| d.height)
		.unwrap_or(style.closed_container_height);
	if !node.is_collapsible() {
		NodeFrame {
			class: ContainerClass::Leaf,
			width,
			height: full_height,
		}
	} else if node.collapsed {
		NodeFrame {
			class: ContainerClass::ClosedContainer,
			width,
			height: full_height,
		}
	} else {
		NodeFrame {
			class: ContainerClass::OpenContainer,
			width,
			height: style.open_container_height,
		}
	}
}

/// Interactive element found under a canvas position.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasHit {
	Node(ResourceId),
	/// Collapse/expand chevron in a container's title bar.
	CollapseToggle(ResourceId),
	/// Issue indicator badge at a node's top-right corner.
	IssueBadge(ResourceId),
	/// Environment chip, identified by its index into the node's tag list.
	EnvironmentChip(ResourceId, usize),
	Edge(String),
}

const CHIP_HEIGHT: f64 = 14.0;
const CHIP_GAP: f64 = 4.0;
const CHIP_INSET: f64 = 8.0;

fn chip_width(tag: &super::types::EnvironmentTag) -> f64 {
	8.0 + tag.name.len() as f64 * 5.5
}

/// Index of the environment chip under `p`, if any. Chips only exist on
/// frames that are not open containers.
fn environment_chip_at(
	node: &GraphNode,
	frame: &NodeFrame,
	style: &CanvasStyle,
	p: Point,
) -> Option<usize> {
	if frame.class == ContainerClass::OpenContainer {
		return None;
	}
	let chip_y = node.absolute_position.y + style.title_bar_height + 6.0;
	if p.y < chip_y || p.y > chip_y + CHIP_HEIGHT {
		return None;
	}
	let mut chip_x = node.absolute_position.x + CHIP_INSET;
	for (index, tag) in node.environments.iter().enumerate() {
		let width = chip_width(tag);
		if p.x >= chip_x && p.x <= chip_x + width {
			return Some(index);
		}
		chip_x += width + CHIP_GAP;
	}
	None
}

/// Hit-test a graph-space position against the snapshot. Decorations win
/// over the node body, nodes win over edges.
pub fn hit_test(snapshot: &GraphSnapshot, style: &CanvasStyle, p: Point) -> Option<CanvasHit> {
	for node in snapshot.nodes.values() {
		let frame = node_frame(node, style);
		let origin = node.absolute_position;

		if !node.issue_ids.is_empty() {
			let badge = Point::new(origin.x + frame.width, origin.y);
			if p.distance_to(badge) <= ISSUE_BADGE_SIZE_PX / 2.0 {
				return Some(CanvasHit::IssueBadge(node.id.clone()));
			}
		}

		let inside = p.x >= origin.x
			&& p.x <= origin.x + frame.width
			&& p.y >= origin.y
			&& p.y <= origin.y + frame.height;
		if !inside {
			continue;
		}

		if node.is_collapsible()
			&& p.x <= origin.x + style.title_bar_height
			&& p.y <= origin.y + style.title_bar_height
		{
			return Some(CanvasHit::CollapseToggle(node.id.clone()));
		}
		if let Some(index) = environment_chip_at(node, &frame, style, p) {
			return Some(CanvasHit::EnvironmentChip(node.id.clone(), index));
		}
		return Some(CanvasHit::Node(node.id.clone()));
	}

	for edge in snapshot.edges.values() {
		let Some(section) = &edge.section else {
			continue;
		};
		let vertices = build_path(section, style.lateral_edge_offset());
		if distance_to_polyline(p, &vertices) <= EDGE_HOVER_TOLERANCE_PX {
			return Some(CanvasHit::Edge(edge.id.clone()));
		}
	}
	None
}

/// Draw the full snapshot. `edges` is the highlight-propagated view of the
/// snapshot's edge map, taken from the same update cycle.
pub fn render(
	snapshot: &GraphSnapshot,
	edges: &HashMap<String, GraphEdge>,
	ctx: &CanvasRenderingContext2d,
	transform: Transform,
	width: f64,
	height: f64,
	style: &CanvasStyle,
) {
	ctx.set_fill_style_str(style.background);
	ctx.fill_rect(0.0, 0.0, width, height);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.zoom, transform.zoom);

	for edge in edges.values() {
		draw_edge(edge, snapshot, ctx, style);
	}
	for node in snapshot.nodes.values() {
		draw_node(node, snapshot, ctx, style);
	}

	ctx.restore();
}

fn draw_edge(
	edge: &GraphEdge,
	snapshot: &GraphSnapshot,
	ctx: &CanvasRenderingContext2d,
	style: &CanvasStyle,
) {
	// Not yet positioned by the layout engine.
	let Some(section) = &edge.section else {
		return;
	};
	let vertices = build_path(section, style.lateral_edge_offset());
	if vertices.len() < 2 {
		return;
	}

	let selected = snapshot.selected_edge_ids.contains(&edge.id);
	if edge.event_chain_hovered {
		ctx.set_stroke_style_str(style.edge_stroke_chain);
		ctx.set_line_width(style.edge_width_chain);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(6.0),
			&JsValue::from_f64(3.0),
		));
	} else {
		ctx.set_stroke_style_str(if selected {
			style.node_border_selected
		} else {
			style.edge_stroke
		});
		ctx.set_line_width(if selected {
			style.edge_width_chain
		} else {
			style.edge_width
		});
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	ctx.begin_path();
	ctx.move_to(vertices[0].x, vertices[0].y);
	for v in &vertices[1..] {
		ctx.line_to(v.x, v.y);
	}
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if let (Some(text), Some(x)) = (&edge.label.text, edge.label.x) {
		if let Some(y) = label_anchor_y(&edge.label, &vertices) {
			ctx.set_fill_style_str(style.label_text);
			ctx.set_font(style.label_font);
			let _ = ctx.fill_text(text, x, y + 3.0);
		}
	}
}

fn draw_node(
	node: &GraphNode,
	snapshot: &GraphSnapshot,
	ctx: &CanvasRenderingContext2d,
	style: &CanvasStyle,
) {
	let frame = node_frame(node, style);
	let Point { x, y } = node.absolute_position;

	ctx.set_fill_style_str(style.node_fill);
	ctx.fill_rect(x, y, frame.width, frame.height);

	ctx.set_fill_style_str(style.title_bar_fill);
	ctx.fill_rect(x, y, frame.width, style.title_bar_height.min(frame.height));

	let selected = snapshot.selected_node_ids.contains(&node.id);
	ctx.set_stroke_style_str(if selected || node.highlighted {
		style.node_border_selected
	} else {
		style.node_border
	});
	ctx.set_line_width(if selected { 2.0 } else { 1.0 });
	ctx.stroke_rect(x, y, frame.width, frame.height);

	ctx.set_fill_style_str(style.title_text);
	ctx.set_font(style.label_font);
	let title = node
		.id
		.segments()
		.last()
		.map(|s| s.id.as_str())
		.unwrap_or_default();
	let text_x = if node.is_collapsible() {
		let glyph = if node.collapsed { "+" } else { "\u{2212}" };
		let _ = ctx.fill_text(glyph, x + 8.0, y + style.title_bar_height - 9.0);
		x + style.title_bar_height
	} else {
		x + 8.0
	};
	let _ = ctx.fill_text(title, text_x, y + style.title_bar_height - 9.0);

	if frame.class != ContainerClass::OpenContainer {
		draw_environment_chips(node, ctx, style, x, y + style.title_bar_height + 6.0);
	}

	if !node.issue_ids.is_empty() {
		draw_issue_badge(node, ctx, style, x + frame.width, y);
	}
}

fn draw_environment_chips(
	node: &GraphNode,
	ctx: &CanvasRenderingContext2d,
	style: &CanvasStyle,
	x: f64,
	y: f64,
) {
	let mut chip_x = x + CHIP_INSET;
	for tag in &node.environments {
		let width = chip_width(tag);
		if tag.is_inherited() {
			// Read-only inherited tags render dimmed.
			ctx.set_global_alpha(style.inherited_tag_alpha);
		}
		ctx.set_fill_style_str(style.environment_color(tag.color_index));
		ctx.fill_rect(chip_x, y, width, CHIP_HEIGHT);
		ctx.set_fill_style_str(style.title_text);
		ctx.set_font(style.label_font);
		let _ = ctx.fill_text(&tag.name, chip_x + 4.0, y + 11.0);
		ctx.set_global_alpha(1.0);
		chip_x += width + CHIP_GAP;
	}
}

fn draw_issue_badge(
	node: &GraphNode,
	ctx: &CanvasRenderingContext2d,
	style: &CanvasStyle,
	cx: f64,
	cy: f64,
) {
	ctx.set_fill_style_str(style.issue_badge_fill);
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, ISSUE_BADGE_SIZE_PX / 2.0, 0.0, std::f64::consts::TAU);
	ctx.fill();
	ctx.set_fill_style_str(style.title_text);
	ctx.set_font(style.label_font);
	let _ = ctx.fill_text(&node.issue_ids.len().to_string(), cx - 3.0, cy + 4.0);
}
