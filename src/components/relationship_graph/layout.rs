//! Force-directed layout of a [`RelationGraph`] on top of the `force_graph`
//! simulation, plus the heat, centering and collision passes it lacks.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};

use super::options::GraphOptions;
use crate::content::{NodeId, RelationGraph};

/// Graphs above this size get a tighter, weaker layout.
const DENSE_GRAPH: usize = 20;
const SEED_RADIUS: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct LayoutNode {
	/// Position of the node in `RelationGraph::nodes`.
	pub slot: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
	Simulating,
	Settled,
}

/// What happened during one [`ForceLayout::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepEvents {
	/// Fires once per layout, on the configured step or on settling.
	pub auto_fit: bool,
	pub settled: bool,
}

pub struct ForceLayout {
	graph: ForceGraph<LayoutNode, ()>,
	slots: Vec<DefaultNodeIdx>,
	edges: Vec<(usize, usize)>,
	degrees: Vec<usize>,
	dropped_edges: usize,
	center: (f32, f32),
	alpha: f32,
	alpha_target: f32,
	alpha_decay: f32,
	alpha_min: f32,
	drag_alpha_target: f32,
	center_strength: (f32, f32),
	collide_radius: f32,
	collide_strength: f32,
	phase: LayoutPhase,
	steps: u32,
	auto_fit_after: u32,
	auto_fitted: bool,
	pinned: Option<usize>,
}

impl ForceLayout {
	/// Seeds each breadth-first level on its own ring around the viewport
	/// centre, a lone root in the middle. Edges whose endpoints are not in
	/// the node set are dropped here.
	pub fn new(data: &RelationGraph, width: f64, height: f64, options: &GraphOptions) -> Self {
		let dense = data.nodes.len() > DENSE_GRAPH;
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: if dense { 100.0 } else { 200.0 },
			force_spring: 0.05,
			// caps how far repulsion reaches in practice
			force_max: if dense { 70.0 } else { 120.0 },
			node_speed: 3000.0,
			damping_factor: 1.0 - options.velocity_decay,
		});

		let (cx, cy) = (width / 2.0, height / 2.0);
		let mut ring_sizes: HashMap<u32, usize> = HashMap::new();
		for node in &data.nodes {
			*ring_sizes.entry(node.level).or_default() += 1;
		}
		let mut ring_seen: HashMap<u32, usize> = HashMap::new();
		let mut id_to_slot: HashMap<&NodeId, usize> = HashMap::new();
		let mut slots = Vec::with_capacity(data.nodes.len());
		for (slot, node) in data.nodes.iter().enumerate() {
			let size = ring_sizes.get(&node.level).copied().unwrap_or(1);
			let seen = ring_seen.entry(node.level).or_default();
			let angle = (*seen as f64) * 2.0 * PI / size as f64;
			*seen += 1;
			let radius = if node.level == 0 && size == 1 {
				0.0
			} else {
				SEED_RADIUS * node.level.max(1) as f64
			};
			let idx = graph.add_node(NodeData {
				x: (cx + radius * angle.cos()) as f32,
				y: (cy + radius * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: LayoutNode { slot },
			});
			id_to_slot.insert(&node.id, slot);
			slots.push(idx);
		}

		let mut edges = Vec::with_capacity(data.edges.len());
		let mut degrees = vec![0; data.nodes.len()];
		let mut dropped_edges = 0;
		for edge in &data.edges {
			match (id_to_slot.get(&edge.source), id_to_slot.get(&edge.target)) {
				(Some(&src), Some(&tgt)) => {
					graph.add_edge(slots[src], slots[tgt], EdgeData::default());
					edges.push((src, tgt));
					degrees[src] += 1;
					degrees[tgt] += 1;
				}
				_ => {
					warn!(
						"dropping edge {} -> {}: endpoint is not in the graph",
						edge.source, edge.target
					);
					dropped_edges += 1;
				}
			}
		}
		debug!(
			"layout seeded: {} nodes, {}/{} edges",
			slots.len(),
			edges.len(),
			data.edges.len()
		);

		Self {
			graph,
			slots,
			edges,
			degrees,
			dropped_edges,
			center: (cx as f32, cy as f32),
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: options.alpha_decay,
			alpha_min: options.alpha_min,
			drag_alpha_target: options.alpha_target,
			center_strength: (options.center_strength_x, options.center_strength_y),
			collide_radius: options.collide_radius,
			collide_strength: options.collide_strength,
			phase: LayoutPhase::Simulating,
			steps: 0,
			auto_fit_after: options.auto_fit_after_steps,
			auto_fitted: false,
			pinned: None,
		}
	}

	pub fn step(&mut self, dt: f32) -> StepEvents {
		let mut events = StepEvents::default();
		if self.phase == LayoutPhase::Settled {
			return events;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		self.graph.update(dt * self.alpha.min(1.0));
		self.apply_centering();
		self.apply_collisions();
		self.steps += 1;

		if !self.auto_fitted && self.steps >= self.auto_fit_after {
			self.auto_fitted = true;
			events.auto_fit = true;
		}
		if self.alpha < self.alpha_min && self.pinned.is_none() {
			self.phase = LayoutPhase::Settled;
			events.settled = true;
			if !self.auto_fitted {
				self.auto_fitted = true;
				events.auto_fit = true;
			}
		}
		events
	}

	/// Fixes `slot` at `(x, y)` and reheats the simulation.
	pub fn pin(&mut self, slot: usize, x: f64, y: f64) {
		self.pinned = Some(slot);
		self.alpha_target = self.drag_alpha_target;
		self.phase = LayoutPhase::Simulating;
		self.move_pinned(slot, x, y);
	}

	pub fn move_pinned(&mut self, slot: usize, x: f64, y: f64) {
		self.with_node(slot, |node| {
			node.x = x as f32;
			node.y = y as f32;
			node.is_anchor = true;
		});
	}

	/// Lets `slot` move freely again and lets the layout cool down.
	pub fn release(&mut self, slot: usize) {
		self.with_node(slot, |node| node.is_anchor = false);
		if self.pinned == Some(slot) {
			self.pinned = None;
		}
		self.alpha_target = 0.0;
	}

	#[cfg(test)]
	pub fn is_pinned(&self, slot: usize) -> bool {
		let mut anchored = false;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.slot == slot {
				anchored = node.data.is_anchor;
			}
		});
		anchored
	}

	pub fn position(&self, slot: usize) -> Option<(f64, f64)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.slot == slot {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// Positions indexed by slot.
	pub fn positions(&self) -> Vec<(f64, f64)> {
		let mut positions = vec![(0.0, 0.0); self.slots.len()];
		self.graph.visit_nodes(|node| {
			positions[node.data.user_data.slot] = (node.x() as f64, node.y() as f64);
		});
		positions
	}

	pub fn edges(&self) -> &[(usize, usize)] {
		&self.edges
	}

	pub fn degrees(&self) -> &[usize] {
		&self.degrees
	}

	pub fn dropped_edges(&self) -> usize {
		self.dropped_edges
	}

	pub fn phase(&self) -> LayoutPhase {
		self.phase
	}

	pub fn alpha(&self) -> f32 {
		self.alpha
	}

	fn with_node(&mut self, slot: usize, mut f: impl FnMut(&mut NodeData<LayoutNode>)) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.slot == slot {
				f(&mut node.data);
			}
		});
	}

	fn apply_centering(&mut self) {
		let (cx, cy) = self.center;
		let (sx, sy) = (self.center_strength.0 * self.alpha, self.center_strength.1 * self.alpha);
		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			node.data.x += (cx - node.data.x) * sx;
			node.data.y += (cy - node.data.y) * sy;
		});
	}

	fn apply_collisions(&mut self) {
		let mut bodies: Vec<(f32, f32, bool)> = vec![(0.0, 0.0, true); self.slots.len()];
		self.graph.visit_nodes(|node| {
			bodies[node.data.user_data.slot] = (node.data.x, node.data.y, node.data.is_anchor);
		});

		let min_dist = self.collide_radius * 2.0;
		let mut shifts = vec![(0.0f32, 0.0f32); bodies.len()];
		for i in 0..bodies.len() {
			for j in (i + 1)..bodies.len() {
				let (dx, dy) = (bodies[j].0 - bodies[i].0, bodies[j].1 - bodies[i].1);
				let dist = (dx * dx + dy * dy).sqrt();
				if dist >= min_dist {
					continue;
				}
				// coincident nodes get pushed apart along a slot-dependent axis
				let (ux, uy) = if dist > f32::EPSILON {
					(dx / dist, dy / dist)
				} else {
					let angle = (i + j) as f32;
					(angle.cos(), angle.sin())
				};
				let push = (min_dist - dist) * self.collide_strength * 0.5;
				shifts[i].0 -= ux * push;
				shifts[i].1 -= uy * push;
				shifts[j].0 += ux * push;
				shifts[j].1 += uy * push;
			}
		}

		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			let (sx, sy) = shifts[node.data.user_data.slot];
			node.data.x += sx;
			node.data.y += sy;
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::content::{Entity, EntityKind, GraphEdge, GraphNode, Relation};

	const DT: f32 = 0.016;

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: NodeId::new(EntityKind::Muscle, id),
			kind: EntityKind::Muscle,
			entity: Entity {
				id: id.into(),
				..Default::default()
			},
			level: 0,
		}
	}

	fn edge(source: &str, target: &str) -> GraphEdge {
		GraphEdge {
			source: NodeId::from(source),
			target: NodeId::from(target),
			relation: Relation::Affects,
			intensity: None,
		}
	}

	fn pair() -> RelationGraph {
		RelationGraph {
			nodes: vec![node("a"), node("b")],
			edges: vec![edge("muscle:a", "muscle:b")],
		}
	}

	#[test]
	fn levels_are_seeded_on_rings() {
		let mut far = node("c");
		far.level = 2;
		let mut near = node("b");
		near.level = 1;
		let data = RelationGraph {
			nodes: vec![node("a"), near, far],
			edges: Vec::new(),
		};
		let layout = ForceLayout::new(&data, 800.0, 600.0, &GraphOptions::default());
		let dist = |slot| {
			let (x, y) = layout.position(slot).unwrap();
			((x - 400.0).powi(2) + (y - 300.0).powi(2)).sqrt()
		};
		assert!(dist(0) < 1e-3);
		assert!((dist(1) - SEED_RADIUS).abs() < 1e-3);
		assert!((dist(2) - 2.0 * SEED_RADIUS).abs() < 1e-3);
	}

	#[test]
	fn dangling_edges_are_dropped() {
		let mut data = pair();
		data.edges.push(edge("muscle:a", "muscle:ghost"));
		let layout = ForceLayout::new(&data, 800.0, 600.0, &GraphOptions::default());
		assert_eq!(layout.edges(), &[(0, 1)]);
		assert_eq!(layout.dropped_edges(), 1);
		assert_eq!(layout.degrees(), &[1, 1]);
	}

	#[test]
	fn pinned_node_stays_put_and_moves_after_release() {
		let mut layout = ForceLayout::new(&pair(), 800.0, 600.0, &GraphOptions::default());
		for _ in 0..10 {
			layout.step(DT);
		}

		layout.pin(0, 700.0, 550.0);
		assert!(layout.is_pinned(0));
		for _ in 0..10 {
			layout.step(DT);
		}
		let (x, y) = layout.position(0).unwrap();
		assert!((x - 700.0).abs() < 1e-3 && (y - 550.0).abs() < 1e-3);

		layout.release(0);
		assert!(!layout.is_pinned(0));
		let mut moved = false;
		for _ in 0..20 {
			layout.step(DT);
			let (nx, ny) = layout.position(0).unwrap();
			if (nx - x).abs() > 1e-3 || (ny - y).abs() > 1e-3 {
				moved = true;
				break;
			}
		}
		assert!(moved, "released node never moved");
	}

	#[test]
	fn dragging_reheats_a_settled_layout() {
		let mut layout = ForceLayout::new(&pair(), 800.0, 600.0, &GraphOptions::default());
		while layout.phase() == LayoutPhase::Simulating {
			layout.step(DT);
		}
		let cold = layout.alpha();
		layout.pin(1, 10.0, 10.0);
		assert_eq!(layout.phase(), LayoutPhase::Simulating);
		layout.step(DT);
		assert!(layout.alpha() > cold);
	}

	#[test]
	fn layout_does_not_settle_while_pinned() {
		let options = GraphOptions {
			alpha_target: 0.0,
			..GraphOptions::default()
		};
		let mut layout = ForceLayout::new(&pair(), 800.0, 600.0, &options);
		layout.pin(0, 400.0, 300.0);
		for _ in 0..2000 {
			layout.step(DT);
		}
		assert_eq!(layout.phase(), LayoutPhase::Simulating);
		layout.release(0);
		layout.step(DT);
		assert_eq!(layout.phase(), LayoutPhase::Settled);
	}

	#[test]
	fn auto_fit_fires_exactly_once() {
		let options = GraphOptions {
			auto_fit_after_steps: 5,
			..GraphOptions::default()
		};
		let mut layout = ForceLayout::new(&pair(), 800.0, 600.0, &options);
		let mut fits = Vec::new();
		for step in 1..=1000 {
			if layout.step(DT).auto_fit {
				fits.push(step);
			}
		}
		assert_eq!(fits, vec![5]);
		assert_eq!(layout.phase(), LayoutPhase::Settled);
	}

	#[test]
	fn settling_early_triggers_the_fit() {
		let options = GraphOptions {
			auto_fit_after_steps: u32::MAX,
			alpha_decay: 0.5,
			..GraphOptions::default()
		};
		let mut layout = ForceLayout::new(&pair(), 800.0, 600.0, &options);
		let mut fits = 0;
		let mut settled = false;
		for _ in 0..100 {
			let events = layout.step(DT);
			fits += events.auto_fit as u32;
			settled |= events.settled;
		}
		assert!(settled);
		assert_eq!(fits, 1);
	}

	#[test]
	fn collision_separates_overlapping_nodes() {
		let mut layout = ForceLayout::new(&pair(), 800.0, 600.0, &GraphOptions::default());
		layout.pin(0, 400.0, 300.0);
		layout.move_pinned(1, 401.0, 300.0);
		layout.release(1);
		layout.step(DT);
		let (ax, ay) = layout.position(0).unwrap();
		let (bx, by) = layout.position(1).unwrap();
		let dist = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
		assert!(dist > 1.0);
	}
}
