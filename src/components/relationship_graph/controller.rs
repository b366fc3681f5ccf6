//! Everything the relationship graph view does, minus the DOM.
//!
//! The Leptos component owns a [`GraphController`] behind `Rc<RefCell<_>>`
//! and forwards canvas size, frames and pointer input to it. Keeping the
//! browser out of this file lets the whole interaction model run in tests.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info, warn};

use super::filter::VisibilityFilter;
use super::gesture::{GestureAction, GestureTracker, Point};
use super::layout::LayoutPhase;
use super::options::{DeviceClass, GraphOptions};
use super::scene::{self, Scene};
use super::state::GraphViewState;
use crate::components::entity_facts::Facts;
use crate::content::{ContentStore, DataResolver, EntityKind, NodeCategory, RelationGraph};

const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphPhase {
	/// Nothing requested yet.
	Idle,
	/// Graph built, waiting for the surface to report a size.
	Loading,
	Simulating,
	Settled,
}

/// Outcome of [`GraphController::show`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowReport {
	pub nodes: usize,
	pub edges: usize,
	/// Set when the graph is larger than the device handles comfortably.
	pub warning: Option<String>,
	pub cached: bool,
}

/// What the detail panel shows for a tapped node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDetails {
	pub kind: EntityKind,
	pub entity_id: String,
	pub title: String,
	pub subtitle: Option<String>,
	pub description: String,
	pub icon: &'static str,
	pub facts: Facts,
	/// Edges of the shown graph touching this node, as "label: other title".
	pub links: Vec<String>,
	/// Direct neighbours in the whole content, counted per category.
	pub related: Vec<(NodeCategory, usize)>,
}

type CacheKey = (EntityKind, String, u32);

pub struct GraphController {
	store: Rc<ContentStore>,
	options: GraphOptions,
	device: DeviceClass,
	cache: HashMap<CacheKey, Rc<RelationGraph>>,
	filter: VisibilityFilter,
	pending: Option<Rc<RelationGraph>>,
	view: Option<GraphViewState>,
	depth: u32,
	surface: (f64, f64),
	gestures: GestureTracker<usize>,
}

impl GraphController {
	pub fn new(store: Rc<ContentStore>, options: GraphOptions, device: DeviceClass) -> Self {
		let gestures =
			GestureTracker::new(options.tap_slop, options.double_tap_ms, options.enable_drag);
		Self {
			store,
			depth: options.default_depth,
			options,
			device,
			cache: HashMap::new(),
			filter: VisibilityFilter::default(),
			pending: None,
			view: None,
			surface: (0.0, 0.0),
			gestures,
		}
	}

	/// Replaces the displayed graph with the one rooted at `kind`/`id`.
	/// The threshold goes back to 0; category toggles are kept.
	pub fn show(&mut self, kind: EntityKind, id: &str, depth: u32) -> ShowReport {
		let depth = depth.min(self.options.max_depth);
		self.depth = depth;

		let key = (kind, id.to_string(), depth);
		let cached = self.cache.contains_key(&key);
		let graph = match self.cache.get(&key) {
			Some(graph) => {
				debug!("graph cache hit for {kind}:{id} at depth {depth}");
				graph.clone()
			}
			None => {
				let resolver = DataResolver::new(&self.store);
				let graph = Rc::new(resolver.build_relationship_graph(kind, id, depth));
				self.cache.insert(key, graph.clone());
				graph
			}
		};

		self.filter.threshold = 0;
		self.view = None;
		self.pending = None;
		self.gestures = GestureTracker::new(
			self.options.tap_slop,
			self.options.double_tap_ms,
			self.options.enable_drag,
		);

		let mut report = ShowReport {
			nodes: graph.nodes.len(),
			edges: graph.edges.len(),
			warning: None,
			cached,
		};
		if graph.is_empty() {
			warn!("nothing to show for {kind}:{id}");
			return report;
		}

		let cap = self.options.node_cap(self.device);
		if report.nodes > cap {
			warn!("graph for {kind}:{id} has {} nodes, above the cap of {cap}", report.nodes);
			report.warning = Some(format!(
				"Large graph: {} nodes (recommended up to {cap}). Rendering may be slow.",
				report.nodes
			));
		}
		info!(
			"showing {kind}:{id} at depth {depth}: {} nodes, {} edges",
			report.nodes, report.edges
		);

		self.pending = Some(graph);
		self.start_layout();
		report
	}

	/// Re-roots the graph on another entity, keeping the current depth.
	pub fn focus(&mut self, kind: EntityKind, id: &str) -> ShowReport {
		self.show(kind, id, self.depth)
	}

	/// The drawing surface reported its size. A pending graph starts
	/// laying out once the size is non-zero.
	pub fn attach_surface(&mut self, width: f64, height: f64) {
		self.surface = (width, height);
		if let Some(view) = self.view.as_mut() {
			view.resize(width, height);
		}
		self.start_layout();
	}

	fn start_layout(&mut self) {
		let (width, height) = self.surface;
		if width <= 0.0 || height <= 0.0 {
			return;
		}
		if let Some(graph) = self.pending.take() {
			let mut view = GraphViewState::new(graph, width, height, &self.options);
			let dropped = view.layout.dropped_edges();
			if dropped > 0 {
				warn!("{dropped} edges left out of the layout");
			}
			view.apply_filter(&self.filter);
			self.view = Some(view);
		}
	}

	pub fn phase(&self) -> GraphPhase {
		match (&self.view, &self.pending) {
			(Some(view), _) => match view.layout.phase() {
				LayoutPhase::Simulating => GraphPhase::Simulating,
				LayoutPhase::Settled => GraphPhase::Settled,
			},
			(None, Some(_)) => GraphPhase::Loading,
			(None, None) => GraphPhase::Idle,
		}
	}

	#[cfg(test)]
	pub fn view(&self) -> Option<&GraphViewState> {
		self.view.as_ref()
	}

	#[cfg(test)]
	pub fn graph(&self) -> Option<Rc<RelationGraph>> {
		self.view
			.as_ref()
			.map(|v| v.data.clone())
			.or_else(|| self.pending.clone())
	}

	pub fn depth(&self) -> u32 {
		self.depth
	}

	pub fn filter(&self) -> &VisibilityFilter {
		&self.filter
	}

	pub fn set_threshold(&mut self, threshold: usize) {
		self.filter.threshold = threshold;
		self.refilter();
	}

	/// Returns whether the category is now shown.
	pub fn toggle_filter(&mut self, category: NodeCategory) -> bool {
		let enabled = self.filter.toggle(category);
		self.refilter();
		enabled
	}

	fn refilter(&mut self) {
		if let Some(view) = self.view.as_mut() {
			view.apply_filter(&self.filter);
		}
	}

	pub fn category_counts(&self) -> HashMap<NodeCategory, usize> {
		match &self.view {
			Some(view) => view.visibility.counts(&view.kinds),
			None => NodeCategory::ALL.iter().map(|&c| (c, 0)).collect(),
		}
	}

	pub fn max_degree(&self) -> usize {
		self.view
			.as_ref()
			.and_then(|v| v.layout.degrees().iter().copied().max())
			.unwrap_or(0)
	}

	/// Visible `(nodes, edges)`.
	pub fn visible_counts(&self) -> (usize, usize) {
		self.view
			.as_ref()
			.map(|v| (v.visibility.visible_nodes(), v.visibility.visible_edges()))
			.unwrap_or((0, 0))
	}

	/// Advances the layout and hover fade by `dt` seconds.
	pub fn frame(&mut self, dt: f32) {
		let Some(view) = self.view.as_mut() else {
			return;
		};
		let events = view.tick(dt);
		if events.auto_fit {
			view.fit_to_view(self.options.fit_padding);
		}
		if events.settled {
			debug!("layout settled at alpha {:.4}", view.layout.alpha());
		}
	}

	pub fn scene(&self) -> Option<Scene> {
		self.view.as_ref().map(scene::compose)
	}

	pub fn hovered_node(&self) -> Option<usize> {
		self.view.as_ref().and_then(|v| v.highlight.hovered())
	}

	pub fn is_dragging(&self) -> bool {
		self.gestures.is_dragging_node()
	}

	pub fn pointer_down(&mut self, at: Point) {
		let node = self.view.as_ref().and_then(|v| v.node_at_position(at));
		self.gestures.press(at, node);
	}

	pub fn pointer_move(&mut self, at: Point) {
		if self.gestures.is_active() {
			for action in self.gestures.move_to(at) {
				self.apply(action);
			}
		} else if self.device == DeviceClass::Desktop {
			if let Some(view) = self.view.as_mut() {
				let hovered = view.node_at_position(at);
				view.set_hover(hovered);
			}
		}
	}

	/// Ends a press. A tap on a node yields its details.
	pub fn pointer_up(&mut self, at: Point, now_ms: f64) -> Option<NodeDetails> {
		let mut details = None;
		for action in self.gestures.release(at, now_ms) {
			if let GestureAction::Tap { node: Some(slot), .. } = action {
				details = self.details(slot);
			}
			self.apply(action);
		}
		details
	}

	pub fn pointer_leave(&mut self) {
		if let Some(action) = self.gestures.cancel() {
			self.apply(action);
		}
		if let Some(view) = self.view.as_mut() {
			view.set_hover(None);
		}
	}

	pub fn pinch_start(&mut self, a: Point, b: Point) {
		if let Some(action) = self.gestures.pinch_start(a, b) {
			self.apply(action);
		}
	}

	pub fn pinch_move(&mut self, a: Point, b: Point) {
		if let Some(action) = self.gestures.pinch_move(a, b) {
			self.apply(action);
		}
	}

	pub fn wheel(&mut self, at: Point, delta_y: f64) {
		let factor = if delta_y > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
		self.apply(GestureAction::Pinch { factor, center: at });
	}

	pub fn reset_view(&mut self) {
		self.apply(GestureAction::ResetView);
	}

	pub fn details(&self, slot: usize) -> Option<NodeDetails> {
		let data = &self.view.as_ref()?.data;
		let node = data.nodes.get(slot)?;
		let links = data
			.edges
			.iter()
			.filter_map(|edge| {
				let other = if edge.source == node.id {
					&edge.target
				} else if edge.target == node.id {
					&edge.source
				} else {
					return None;
				};
				let other = data.node(other)?;
				Some(format!("{}: {}", edge.label(), other.entity.display_title()))
			})
			.collect();

		let mut related: Vec<(NodeCategory, usize)> = Vec::new();
		let resolver = DataResolver::new(&self.store);
		let neighbours = resolver.related_entities(node.kind, &node.entity.id);
		for (kind, entities) in neighbours {
			let category = kind.category();
			match related.iter_mut().find(|(c, _)| *c == category) {
				Some((_, count)) => *count += entities.len(),
				None => related.push((category, entities.len())),
			}
		}

		Some(NodeDetails {
			kind: node.kind,
			entity_id: node.entity.id.clone(),
			title: node.entity.display_title().to_string(),
			subtitle: node.entity.subtitle().map(str::to_string),
			description: node.entity.content.clone(),
			icon: node.kind.category().icon(),
			facts: Facts::of(&node.entity),
			links,
			related,
		})
	}

	fn apply(&mut self, action: GestureAction<usize>) {
		let Some(view) = self.view.as_mut() else {
			return;
		};
		match action {
			GestureAction::Pan { dx, dy } => view.pan(dx, dy),
			GestureAction::DragStart { node, at } => {
				let Some((nx, ny)) = view.layout.position(node) else {
					return;
				};
				let (gx, gy) = view.screen_to_graph(at);
				view.drag_offset = (nx - gx, ny - gy);
				view.layout.pin(node, nx, ny);
			}
			GestureAction::DragMove { node, at } => {
				let (gx, gy) = view.screen_to_graph(at);
				let (ox, oy) = view.drag_offset;
				view.layout.move_pinned(node, gx + ox, gy + oy);
			}
			GestureAction::DragEnd { node } => {
				view.layout.release(node);
				view.drag_offset = (0.0, 0.0);
			}
			GestureAction::Pinch { factor, center } => view.zoom_at(center, factor),
			GestureAction::ResetView => view.reset_view(),
			GestureAction::Tap { .. } => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relationship_graph::state::ViewTransform;

	const DT: f32 = 0.016;

	fn controller(options: GraphOptions) -> GraphController {
		let store = Rc::new(ContentStore::bundled().unwrap());
		GraphController::new(store, options, DeviceClass::Desktop)
	}

	fn shown() -> GraphController {
		let mut c = controller(GraphOptions::default());
		c.attach_surface(800.0, 600.0);
		c.show(EntityKind::Muscle, "trapezius-upper", 2);
		c
	}

	fn screen_position(c: &GraphController, slot: usize) -> Point {
		let view = c.view().unwrap();
		let (x, y) = view.layout.position(slot).unwrap();
		view.graph_to_screen(x, y)
	}

	#[test]
	fn graph_waits_for_a_sized_surface() {
		let mut c = controller(GraphOptions::default());
		assert_eq!(c.phase(), GraphPhase::Idle);
		c.show(EntityKind::Pain, "neck-pain", 1);
		assert_eq!(c.phase(), GraphPhase::Loading);
		c.attach_surface(0.0, 0.0);
		assert_eq!(c.phase(), GraphPhase::Loading);
		c.attach_surface(800.0, 600.0);
		assert_eq!(c.phase(), GraphPhase::Simulating);
	}

	#[test]
	fn drag_pins_and_release_lets_the_node_move_again() {
		let mut c = shown();
		for _ in 0..20 {
			c.frame(DT);
		}
		let start = screen_position(&c, 1);
		let slot = c.view().unwrap().node_at_position(start).unwrap();

		c.pointer_down(start);
		assert!(!c.view().unwrap().layout.is_pinned(slot));
		c.pointer_move(Point::new(start.x + 50.0, start.y + 40.0));
		assert!(c.view().unwrap().layout.is_pinned(slot));
		assert!(c.is_dragging());
		for _ in 0..5 {
			c.frame(DT);
		}
		assert_eq!(c.phase(), GraphPhase::Simulating);
		assert_eq!(c.pointer_up(Point::new(start.x + 50.0, start.y + 40.0), 0.0), None);
		assert!(!c.view().unwrap().layout.is_pinned(slot));

		let before = c.view().unwrap().layout.position(slot).unwrap();
		let mut moved = false;
		for _ in 0..30 {
			c.frame(DT);
			let (x, y) = c.view().unwrap().layout.position(slot).unwrap();
			if (x - before.0).abs() > 1e-3 || (y - before.1).abs() > 1e-3 {
				moved = true;
				break;
			}
		}
		assert!(moved, "released node stayed frozen");
	}

	#[test]
	fn tapping_a_node_returns_its_details() {
		let mut c = shown();
		let at = screen_position(&c, 0);
		let slot = c.view().unwrap().node_at_position(at).unwrap();
		c.pointer_down(at);
		assert!(!c.view().unwrap().layout.is_pinned(slot));
		let details = c.pointer_up(at, 0.0).unwrap();
		let node = &c.view().unwrap().data.nodes[slot];
		assert_eq!(details.entity_id, node.entity.id);
		assert_eq!(details.kind, node.kind);
		assert_eq!(details.facts, Facts::of(&node.entity));
		assert!(!c.view().unwrap().layout.is_pinned(slot));
	}

	#[test]
	fn details_list_links_and_related_counts() {
		let mut c = controller(GraphOptions::default());
		c.attach_surface(800.0, 600.0);
		c.show(EntityKind::Pain, "neck-pain", 1);
		let details = c.details(0).unwrap();
		assert_eq!(details.links.len(), c.graph().unwrap().edges.len());
		assert!(details.links.iter().any(|l| l.starts_with("high intensity: ")));
		let muscles = details
			.related
			.iter()
			.find(|(category, _)| *category == NodeCategory::Muscles)
			.map(|&(_, n)| n);
		assert!(muscles >= Some(2));
	}

	#[test]
	fn tapping_a_node_does_not_reheat_a_settled_graph() {
		let mut c = shown();
		for _ in 0..2000 {
			c.frame(DT);
			if c.phase() == GraphPhase::Settled {
				break;
			}
		}
		assert_eq!(c.phase(), GraphPhase::Settled);
		let at = screen_position(&c, 0);
		c.pointer_down(at);
		assert!(c.pointer_up(at, 0.0).is_some());
		assert_eq!(c.phase(), GraphPhase::Settled);
	}

	#[test]
	fn double_tap_resets_the_view() {
		let mut c = shown();
		c.wheel(Point::new(100.0, 100.0), -1.0);
		assert_ne!(c.view().unwrap().transform, ViewTransform::default());
		let at = Point::new(2.0, 2.0);
		c.pointer_down(at);
		c.pointer_up(at, 1000.0);
		c.pointer_down(at);
		c.pointer_up(at, 1150.0);
		assert_eq!(c.view().unwrap().transform, ViewTransform::default());
	}

	#[test]
	fn showing_the_same_root_again_hits_the_cache() {
		let mut c = shown();
		let first = c.graph().unwrap();
		c.show(EntityKind::Pain, "neck-pain", 2);
		let report = c.show(EntityKind::Muscle, "trapezius-upper", 2);
		assert!(report.cached);
		assert!(Rc::ptr_eq(&first, &c.graph().unwrap()));
	}

	#[test]
	fn oversized_graph_warns_but_still_renders() {
		let mut c = controller(GraphOptions {
			max_nodes_desktop: 3,
			..GraphOptions::default()
		});
		c.attach_surface(800.0, 600.0);
		let report = c.show(EntityKind::Muscle, "trapezius-upper", 2);
		assert!(report.warning.is_some());
		assert_eq!(c.visible_counts().0, report.nodes);
	}

	#[test]
	fn threshold_hides_and_show_resets_it() {
		let mut c = shown();
		c.set_threshold(c.max_degree() + 1);
		assert_eq!(c.visible_counts(), (0, 0));
		c.show(EntityKind::Pain, "neck-pain", 1);
		assert_eq!(c.filter().threshold, 0);
		assert!(c.visible_counts().0 > 0);
	}

	#[test]
	fn category_toggles_survive_a_new_graph() {
		let mut c = shown();
		assert!(!c.toggle_filter(NodeCategory::Exercises));
		assert_eq!(c.category_counts()[&NodeCategory::Exercises], 0);
		c.show(EntityKind::Pain, "neck-pain", 1);
		assert_eq!(c.category_counts()[&NodeCategory::Exercises], 0);
		assert!(c.category_counts()[&NodeCategory::Muscles] > 0);
	}

	#[test]
	fn unknown_root_shows_nothing() {
		let mut c = shown();
		let report = c.show(EntityKind::Muscle, "no-such-muscle", 2);
		assert_eq!(report.nodes, 0);
		assert_eq!(c.phase(), GraphPhase::Idle);
		assert!(c.scene().is_none());
	}

	#[test]
	fn focus_keeps_the_depth() {
		let mut c = shown();
		c.show(EntityKind::Muscle, "trapezius-upper", 1);
		c.focus(EntityKind::Pain, "neck-pain");
		assert_eq!(c.depth(), 1);
		let root = &c.graph().unwrap().nodes[0];
		assert_eq!(root.id.as_str(), "pain:neck-pain");
	}

	#[test]
	fn depth_is_clamped() {
		let mut c = shown();
		c.show(EntityKind::Pain, "neck-pain", 99);
		assert_eq!(c.depth(), GraphOptions::default().max_depth);
	}
}
