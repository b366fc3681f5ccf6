use std::fmt;

use super::model::{Entity, EntityKind, Intensity};

/// `"{prefix}:{entity id}"`, unique across all kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
	pub fn new(kind: EntityKind, id: &str) -> Self {
		Self(format!("{}:{}", kind.prefix(), id))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<&str> for NodeId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
	/// pain -> muscle
	Affects,
	/// exercise or goal -> muscle
	Targets,
	/// exercise -> pain
	Relieves,
	/// goal -> pain
	Addresses,
	/// goal -> exercise
	Includes,
	/// system block -> muscle or exercise
	Involves,
}

impl Relation {
	pub fn label(self) -> &'static str {
		match self {
			Relation::Affects => "Affects",
			Relation::Targets => "Targets",
			Relation::Relieves => "Relieves",
			Relation::Addresses => "Addresses",
			Relation::Includes => "Includes",
			Relation::Involves => "Involves",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: NodeId,
	pub kind: EntityKind,
	pub entity: Entity,
	/// Breadth-first distance from the root.
	pub level: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub source: NodeId,
	pub target: NodeId,
	pub relation: Relation,
	pub intensity: Option<Intensity>,
}

impl GraphEdge {
	/// Intensity on pain-to-muscle edges, the relation name otherwise.
	pub fn label(&self) -> String {
		match self.intensity {
			Some(intensity) => format!("{intensity} intensity"),
			None => self.relation.label().to_string(),
		}
	}
}

/// Nodes and edges reachable from one root entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationGraph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl RelationGraph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	#[cfg(test)]
	pub fn contains_edge(&self, source: &str, target: &str) -> bool {
		self.edges
			.iter()
			.any(|e| e.source.as_str() == source && e.target.as_str() == target)
	}

	/// Splits edges into those whose endpoints both exist and the rest.
	#[cfg(test)]
	pub fn partition_edges(&self) -> (Vec<&GraphEdge>, Vec<&GraphEdge>) {
		let ids: std::collections::HashSet<&NodeId> = self.nodes.iter().map(|n| &n.id).collect();
		self.edges
			.iter()
			.partition(|e| ids.contains(&e.source) && ids.contains(&e.target))
	}
}
