//! Static anatomy content and the queries the views run against it.

mod graph;
mod model;
mod resolver;
mod store;

#[cfg(test)]
pub use graph::{GraphEdge, GraphNode, Relation};
pub use graph::{NodeId, RelationGraph};
pub use model::{Entity, EntityKind, NodeCategory, Severity};
pub use resolver::DataResolver;
pub use store::ContentStore;
