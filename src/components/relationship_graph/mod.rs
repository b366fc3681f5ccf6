//! Force-directed canvas view of the relations around one entity.

mod component;
mod controller;
mod filter;
mod gesture;
mod highlight;
mod layout;
mod options;
mod render;
mod scene;
mod state;

pub use component::RelationshipGraph;
pub use options::GraphOptions;
