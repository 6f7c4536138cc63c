//! Hover state and one-hop event-chain highlighting.
//!
//! Hover membership lives in the canvas and dies with it; it is never
//! synchronized into the host's selection state. Expanding a hovered edge to
//! its causal neighborhood uses the host-precomputed chain-link table, so the
//! propagation itself is a pure lookup with no graph traversal.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use super::types::{EventChainLink, GraphEdge};

/// Canvas-local set of hovered edge ids.
///
/// Ephemeral by design: reset on remount, separate from the externally owned
/// selection sets so a hover tick never triggers a full host state update.
#[derive(Debug, Default)]
pub struct HoverState {
	hovered: HashSet<String>,
}

impl HoverState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn enter(&mut self, id: impl Into<String>) {
		self.hovered.insert(id.into());
	}

	pub fn leave(&mut self, id: &str) {
		self.hovered.remove(id);
	}

	pub fn clear(&mut self) {
		self.hovered.clear();
	}

	pub fn hovered(&self) -> &HashSet<String> {
		&self.hovered
	}
}

/// Expand a hovered-edge set to its one-hop chain neighborhood.
///
/// Returns the input map untouched when nothing is hovered; that is the hot
/// path on every pointer move and must stay O(1). Otherwise every edge in
/// `{hovered} ∪ preceding ∪ following` that still exists in `edges` is marked
/// `event_chain_hovered`; stale ids (no chain-link entry, or referencing
/// removed edges) are silently skipped. Highlighting is never transitive:
/// neighbors of neighbors stay unmarked.
pub fn highlight<'a>(
	hovered: &HashSet<String>,
	edges: &'a HashMap<String, GraphEdge>,
	links: &HashMap<String, EventChainLink>,
) -> Cow<'a, HashMap<String, GraphEdge>> {
	if hovered.is_empty() {
		return Cow::Borrowed(edges);
	}

	let mut chain: HashSet<&str> = HashSet::new();
	for id in hovered {
		let Some(link) = links.get(id) else {
			continue;
		};
		chain.insert(id.as_str());
		chain.extend(link.preceding.iter().map(String::as_str));
		chain.extend(link.following.iter().map(String::as_str));
	}

	let mut result = edges.clone();
	for id in chain {
		if let Some(edge) = result.get_mut(id) {
			edge.event_chain_hovered = true;
		}
	}
	Cow::Owned(result)
}

#[cfg(test)]
mod tests {
	use super::super::types::{EdgeLabel, resource_id};
	use super::*;

	fn edge(id: &str) -> GraphEdge {
		GraphEdge {
			id: id.into(),
			original_source_id: resource_id(&[("workload", "src")]),
			original_target_id: resource_id(&[("workload", "tgt")]),
			label: EdgeLabel::default(),
			section: None,
			events: Vec::new(),
			event_chain_hovered: false,
		}
	}

	fn edge_map(ids: &[&str]) -> HashMap<String, GraphEdge> {
		ids.iter().map(|id| ((*id).to_string(), edge(id))).collect()
	}

	fn link(preceding: &[&str], following: &[&str]) -> EventChainLink {
		EventChainLink {
			preceding: preceding.iter().map(|s| (*s).to_string()).collect(),
			following: following.iter().map(|s| (*s).to_string()).collect(),
		}
	}

	#[test]
	fn empty_hover_returns_borrowed_input() {
		let edges = edge_map(&["a", "b"]);
		let links = HashMap::from([("a".to_string(), link(&[], &["b"]))]);
		let result = highlight(&HashSet::new(), &edges, &links);
		assert!(matches!(result, Cow::Borrowed(_)));
	}

	#[test]
	fn hovered_edge_and_one_hop_neighbors_are_marked() {
		let edges = edge_map(&["a", "b", "c", "d"]);
		let links = HashMap::from([
		    ("b".to_string(), link(&["a"], &["c"])),
		    // One hop only: c's own neighbors must not light up.
		    ("c".to_string(), link(&["b"], &["d"])),
		]);
		let hovered = HashSet::from(["b".to_string()]);
		let result = highlight(&hovered, &edges, &links);
		assert!(result["a"].event_chain_hovered);
		assert!(result["b"].event_chain_hovered);
		assert!(result["c"].event_chain_hovered);
		assert!(!result["d"].event_chain_hovered);
	}

	#[test]
	fn stale_hover_and_stale_link_targets_are_skipped() {
		let edges = edge_map(&["a"]);
		let links = HashMap::from([
		    ("a".to_string(), link(&["gone-1"], &["gone-2"])),
		]);
		// "missing" has no link entry at all; "a" references removed edges.
		let hovered = HashSet::from(["a".to_string(), "missing".to_string()]);
		let result = highlight(&hovered, &edges, &links);
		assert_eq!(result.len(), 1);
		assert!(result["a"].event_chain_hovered);
	}

	#[test]
	fn concurrent_hovers_union_their_neighborhoods() {
		let edges = edge_map(&["a", "b", "x", "y"]);
		let links = HashMap::from([
		    ("a".to_string(), link(&[], &["b"])),
		    ("x".to_string(), link(&["y"], &[])),
		]);
		let hovered = HashSet::from(["a".to_string(), "x".to_string()]);
		let result = highlight(&hovered, &edges, &links);
		assert!(["a", "b", "x", "y"]
			.iter()
			.all(|id| result[*id].event_chain_hovered));
	}

	#[test]
	fn leave_shrinks_the_hover_set() {
		let mut hover = HoverState::new();
		hover.enter("a");
		hover.enter("b");
		hover.leave("a");
		assert_eq!(hover.hovered().len(), 1);
		assert!(hover.hovered().contains("b"));
	}
}
