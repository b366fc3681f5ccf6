use std::collections::HashMap;

use crate::content::{EntityKind, NodeCategory};

/// Connection threshold plus per-category toggles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityFilter {
	pub threshold: usize,
	enabled: HashMap<NodeCategory, bool>,
}

impl Default for VisibilityFilter {
	fn default() -> Self {
		Self {
			threshold: 0,
			enabled: NodeCategory::ALL.iter().map(|&c| (c, true)).collect(),
		}
	}
}

impl VisibilityFilter {
	pub fn is_enabled(&self, category: NodeCategory) -> bool {
		self.enabled.get(&category).copied().unwrap_or(true)
	}

	pub fn toggle(&mut self, category: NodeCategory) -> bool {
		let enabled = !self.is_enabled(category);
		self.enabled.insert(category, enabled);
		enabled
	}

	/// Node and edge visibility for a laid-out graph. A node needs
	/// `degree >= threshold` and an enabled category; an edge needs both ends.
	pub fn apply(
		&self,
		kinds: &[EntityKind],
		degrees: &[usize],
		edges: &[(usize, usize)],
	) -> Visibility {
		let nodes: Vec<bool> = kinds
			.iter()
			.zip(degrees)
			.map(|(kind, &degree)| degree >= self.threshold && self.is_enabled(kind.category()))
			.collect();
		let edges = edges
			.iter()
			.map(|&(src, tgt)| nodes[src] && nodes[tgt])
			.collect();
		Visibility { nodes, edges }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Visibility {
	pub nodes: Vec<bool>,
	pub edges: Vec<bool>,
}

impl Visibility {
	pub fn visible_nodes(&self) -> usize {
		self.nodes.iter().filter(|&&v| v).count()
	}

	pub fn visible_edges(&self) -> usize {
		self.edges.iter().filter(|&&v| v).count()
	}

	/// Visible nodes per category, for the filter buttons.
	pub fn counts(&self, kinds: &[EntityKind]) -> HashMap<NodeCategory, usize> {
		let mut counts: HashMap<NodeCategory, usize> =
			NodeCategory::ALL.iter().map(|&c| (c, 0)).collect();
		for (kind, _) in kinds.iter().zip(&self.nodes).filter(|(_, v)| **v) {
			*counts.entry(kind.category()).or_default() += 1;
		}
		counts
	}
}
