//! Edge polyline construction and label placement.
//!
//! The layout engine hands every edge a routed section (start, bends, end)
//! and a label hint. Geometry here is purely derived: straight segments
//! between consecutive vertices, no curve fitting. The engine's label `y` is
//! systematically off by a few units, so `correct_label_y` recomputes one
//! that centers the label over the specific segment it annotates.

use super::types::{EdgeLabel, EdgeSection, Point};

/// Vertices of the renderable polyline for a routed section.
///
/// The start point is shifted left by `lateral_offset` (half the issue-badge
/// size) so the edge does not run under a source node's badge decoration.
pub fn build_path(section: &EdgeSection, lateral_offset: f64) -> Vec<Point> {
	let mut vertices = Vec::with_capacity(section.bend_points.len() + 2);
	vertices.push(Point::new(
		section.start_point.x - lateral_offset,
		section.start_point.y,
	));
	vertices.extend_from_slice(&section.bend_points);
	vertices.push(section.end_point);
	vertices
}

/// Recomputed label `y`, centered on the path segment covering the label.
///
/// A consecutive vertex pair covers the label when its x-range contains
/// either end of the label's horizontal extent. Among the endpoint y values
/// of all covering pairs, the one closest to the engine's `label.y` wins;
/// ties keep the first value in vertex order. Incomplete labels (missing
/// `x`, `y` or `width`) are uncorrectable and pass `label.y` through. No
/// covering pair leaves the running minimum at its non-finite initial value;
/// callers must fall back to the original `label.y` on a non-finite result.
pub fn correct_label_y(label: &EdgeLabel, vertices: &[Point]) -> Option<f64> {
	let (Some(x), Some(y), Some(width)) = (label.x, label.y, label.width) else {
		return label.y;
	};

	let mut best = f64::INFINITY;
	for pair in vertices.windows(2) {
		let (a, b) = (pair[0], pair[1]);
		let (lo, hi) = (a.x.min(b.x), a.x.max(b.x));
		let covers =
			(lo <= x && x <= hi) || (lo <= x + width && x + width <= hi);
		if !covers {
			continue;
		}
		for candidate in [a.y, b.y] {
			// Strict < keeps the first-encountered value on ties.
			if (candidate - y).abs() < (best - y).abs() {
				best = candidate;
			}
		}
	}
	Some(best)
}

/// `correct_label_y` with the fallback applied: a non-finite correction
/// yields the engine's original `y`.
pub fn label_anchor_y(label: &EdgeLabel, vertices: &[Point]) -> Option<f64> {
	correct_label_y(label, vertices)
		.filter(|y| y.is_finite())
		.or(label.y)
}

/// Shortest distance from `p` to any segment of the polyline. Used for edge
/// hover hit-testing.
pub fn distance_to_polyline(p: Point, vertices: &[Point]) -> f64 {
	let mut best = f64::INFINITY;
	for pair in vertices.windows(2) {
		best = best.min(distance_to_segment(p, pair[0], pair[1]));
	}
	best
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (abx, aby) = (b.x - a.x, b.y - a.y);
	let len_sq = abx * abx + aby * aby;
	if len_sq == 0.0 {
		return p.distance_to(a);
	}
	let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
	p.distance_to(Point::new(a.x + t * abx, a.y + t * aby))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn section(start: (f64, f64), bends: &[(f64, f64)], end: (f64, f64)) -> EdgeSection {
		EdgeSection {
			start_point: Point::new(start.0, start.1),
			bend_points: bends.iter().map(|&(x, y)| Point::new(x, y)).collect(),
			end_point: Point::new(end.0, end.1),
		}
	}

	fn label(x: f64, y: f64, width: f64) -> EdgeLabel {
		EdgeLabel {
			text: Some("label".into()),
			x: Some(x),
			y: Some(y),
			width: Some(width),
		}
	}

	#[test]
	fn path_is_start_bends_end_with_lateral_shift() {
		let s = section((10.0, 5.0), &[(20.0, 5.0), (20.0, 15.0)], (30.0, 15.0));
		let vertices = build_path(&s, 8.0);
		assert_eq!(
			vertices,
			vec![
				Point::new(2.0, 5.0),
				Point::new(20.0, 5.0),
				Point::new(20.0, 15.0),
				Point::new(30.0, 15.0),
			]
		);
	}

	#[test]
	fn bendless_path_has_two_vertices() {
		let s = section((0.0, 0.0), &[], (10.0, 0.0));
		assert_eq!(build_path(&s, 0.0).len(), 2);
	}

	#[test]
	fn tie_between_covering_endpoints_keeps_first_in_vertex_order() {
		let vertices = [
			Point::new(0.0, 0.0),
			Point::new(10.0, 0.0),
			Point::new(10.0, 10.0),
		];
		// Both candidate y values (0 and 10) sit 5 units from label.y = 5.
		assert_eq!(correct_label_y(&label(10.0, 5.0, 0.0), &vertices), Some(0.0));
	}

	#[test]
	fn closest_covering_endpoint_wins() {
		let vertices = [
			Point::new(0.0, 0.0),
			Point::new(10.0, 0.0),
			Point::new(10.0, 10.0),
		];
		assert_eq!(
			correct_label_y(&label(10.0, 8.0, 0.0), &vertices),
			Some(10.0)
		);
	}

	#[test]
	fn missing_width_passes_label_y_through() {
		let incomplete = EdgeLabel {
			text: None,
			x: Some(3.0),
			y: Some(7.5),
			width: None,
		};
		assert_eq!(correct_label_y(&incomplete, &[]), Some(7.5));
	}

	#[test]
	fn uncovered_label_yields_non_finite_and_anchor_falls_back() {
		let vertices = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
		let far = label(50.0, 3.0, 5.0);
		let corrected = correct_label_y(&far, &vertices).unwrap();
		assert!(!corrected.is_finite());
		assert_eq!(label_anchor_y(&far, &vertices), Some(3.0));
	}

	#[test]
	fn polyline_distance_uses_nearest_segment() {
		let vertices = [
			Point::new(0.0, 0.0),
			Point::new(10.0, 0.0),
			Point::new(10.0, 10.0),
		];
		assert_eq!(distance_to_polyline(Point::new(5.0, 3.0), &vertices), 3.0);
		assert_eq!(distance_to_polyline(Point::new(13.0, 8.0), &vertices), 3.0);
		// Beyond the last vertex, distance is to the endpoint.
		assert_eq!(
			distance_to_polyline(Point::new(10.0, 14.0), &vertices),
			4.0
		);
	}
}
