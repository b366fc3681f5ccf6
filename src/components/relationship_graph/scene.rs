//! What to draw for the current frame, computed without touching a canvas.

use super::state::{GraphViewState, ViewTransform};

const BASE_RADIUS: f64 = 15.0;
const RADIUS_PER_CONNECTION: f64 = 3.0;
const MAX_RADIUS: f64 = 50.0;
const HOVER_GROWTH: f64 = 0.2;
const DIMMED_ALPHA: f64 = 0.3;
const EDGE_ALPHA: f64 = 0.15;
const LABEL_CHARS: usize = 15;

pub fn node_radius(connections: usize) -> f64 {
	(BASE_RADIUS + RADIUS_PER_CONNECTION * connections as f64).min(MAX_RADIUS)
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	pub from: (f64, f64),
	pub to: (f64, f64),
	pub alpha: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub slot: usize,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub color: &'static str,
	pub alpha: f64,
	pub outlined: bool,
	pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub width: f64,
	pub height: f64,
	pub transform: ViewTransform,
	pub edges: Vec<SceneEdge>,
	/// Back to front.
	pub nodes: Vec<SceneNode>,
}

pub fn compose(state: &GraphViewState) -> Scene {
	let positions = state.layout.positions();
	let degrees = state.layout.degrees();
	let highlight = &state.highlight;
	let has_highlight = highlight.is_active();
	let t = ease_out_cubic(highlight.level());

	let edges = state
		.layout
		.edges()
		.iter()
		.zip(&state.visibility.edges)
		.filter(|(_, visible)| **visible)
		.map(|(&(src, tgt), _)| {
			let alpha = if !has_highlight {
				EDGE_ALPHA
			} else if highlight.is_lit(src) && highlight.is_lit(tgt) {
				EDGE_ALPHA + 0.45 * t
			} else {
				EDGE_ALPHA * (1.0 - 0.5 * t)
			};
			SceneEdge {
				from: positions[src],
				to: positions[tgt],
				alpha,
			}
		})
		.collect();

	let mut nodes: Vec<SceneNode> = state
		.data
		.nodes
		.iter()
		.enumerate()
		.filter(|&(slot, _)| state.is_visible(slot))
		.map(|(slot, node)| {
			let (x, y) = positions[slot];
			let hovered = highlight.is_center(slot);
			let dimmed = has_highlight && !highlight.is_lit(slot);
			let mut radius = node_radius(degrees[slot]);
			if hovered {
				radius *= 1.0 + HOVER_GROWTH * t;
			}
			SceneNode {
				slot,
				x,
				y,
				radius,
				color: node.kind.category().color(),
				alpha: if dimmed { 1.0 - (1.0 - DIMMED_ALPHA) * t } else { 1.0 },
				outlined: highlight.hovered() == Some(slot),
				label: node.entity.display_title().chars().take(LABEL_CHARS).collect(),
			}
		})
		.collect();
	// highlighted nodes on top, hovered last
	nodes.sort_by_key(|n| (highlight.is_lit(n.slot), highlight.is_center(n.slot)));

	Scene {
		width: state.width,
		height: state.height,
		transform: state.transform,
		edges,
		nodes,
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use super::*;
	use crate::components::relationship_graph::filter::VisibilityFilter;
	use crate::components::relationship_graph::options::GraphOptions;
	use crate::content::{ContentStore, DataResolver, EntityKind};

	fn state() -> GraphViewState {
		let store = ContentStore::bundled().unwrap();
		let graph = DataResolver::new(&store)
			.build_relationship_graph(EntityKind::Muscle, "trapezius-upper", 2);
		GraphViewState::new(Rc::new(graph), 800.0, 600.0, &GraphOptions::default())
	}

	#[test]
	fn radius_grows_with_connections_up_to_a_cap() {
		assert_eq!(node_radius(0), 15.0);
		assert!(node_radius(3) > node_radius(2));
		assert_eq!(node_radius(100), 50.0);
		assert_eq!(node_radius(12), node_radius(13));
	}

	#[test]
	fn scene_holds_every_visible_node_and_edge() {
		let state = state();
		let scene = compose(&state);
		assert_eq!(scene.nodes.len(), state.data.nodes.len());
		assert_eq!(scene.edges.len(), state.layout.edges().len());
	}

	#[test]
	fn filtered_nodes_are_left_out() {
		let mut state = state();
		let mut filter = VisibilityFilter::default();
		filter.threshold = usize::MAX;
		state.apply_filter(&filter);
		let scene = compose(&state);
		assert!(scene.nodes.is_empty());
		assert!(scene.edges.is_empty());
	}

	#[test]
	fn hover_enlarges_outlines_and_dims_the_rest() {
		let mut state = state();
		let plain = compose(&state);
		let root_radius = plain.nodes.iter().find(|n| n.slot == 0).unwrap().radius;

		state.set_hover(Some(0));
		for _ in 0..200 {
			state.tick(0.016);
		}
		let scene = compose(&state);
		let root = scene.nodes.last().unwrap();
		assert_eq!(root.slot, 0);
		assert!(root.outlined);
		assert!(root.radius > root_radius);
		let unrelated = scene
			.nodes
			.iter()
			.filter(|n| !state.highlight.is_lit(n.slot))
			.collect::<Vec<_>>();
		assert!(!unrelated.is_empty());
		assert!(unrelated.iter().all(|n| n.alpha < 0.5));
	}

	#[test]
	fn labels_are_cut_by_characters() {
		let scene = compose(&state());
		assert!(scene.nodes.iter().all(|n| n.label.chars().count() <= 15));
	}
}
