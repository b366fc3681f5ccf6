//! Body-system layers and the switcher that moves between them.

mod component;
mod layers;
mod stage;
mod switcher;

pub use component::LayerPanel;
