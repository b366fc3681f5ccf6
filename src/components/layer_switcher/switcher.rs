//! Serialized switching between body-system layers.
//!
//! A switch runs fade-out, clear, mount and fade-in on a [`LayerStage`].
//! Only one switch runs at a time; requests arriving meanwhile are dropped.

use std::cell::Cell;
use std::future::Future;

use log::{debug, error, info};

use super::layers::{LayerDef, LayerId};
use crate::error::SwitchError;

/// The surface a layer is drawn on.
pub trait LayerStage {
	fn fade_out(&self) -> impl Future<Output = ()>;
	fn clear(&self);
	/// Resolves once the layer's illustrations are ready, or fails.
	fn mount(&self, layer: &'static LayerDef) -> impl Future<Output = Result<(), SwitchError>>;
	fn fade_in(&self) -> impl Future<Output = ()>;
	/// First load: appear without a transition.
	fn show(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
	Switched(LayerId),
	AlreadyActive,
	/// Another switch was in flight.
	Ignored,
}

pub struct LayerSwitcher<S> {
	stage: S,
	current: Cell<Option<LayerId>>,
	in_flight: Cell<Option<LayerId>>,
}

/// Releases the switch lock, also when the switch future is dropped.
struct InFlight<'a>(&'a Cell<Option<LayerId>>);

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.0.set(None);
	}
}

impl<S: LayerStage> LayerSwitcher<S> {
	pub fn new(stage: S) -> Self {
		Self {
			stage,
			current: Cell::new(None),
			in_flight: Cell::new(None),
		}
	}

	#[cfg(test)]
	pub fn stage(&self) -> &S {
		&self.stage
	}

	pub fn current(&self) -> Option<LayerId> {
		self.current.get()
	}

	#[cfg(test)]
	pub fn in_flight(&self) -> Option<LayerId> {
		self.in_flight.get()
	}

	pub fn is_switching(&self) -> bool {
		self.in_flight.get().is_some()
	}

	pub async fn switch_to(&self, name: &str) -> Result<SwitchOutcome, SwitchError> {
		if let Some(target) = self.in_flight.get() {
			debug!("switch to {name} ignored, {target} is still loading");
			return Ok(SwitchOutcome::Ignored);
		}
		let target: LayerId = name.parse()?;
		if self.current.get() == Some(target) {
			debug!("already on layer {target}");
			return Ok(SwitchOutcome::AlreadyActive);
		}

		self.in_flight.set(Some(target));
		let _lock = InFlight(&self.in_flight);
		let previous = self.current.get();

		match self.run(target.def(), previous.is_none()).await {
			Ok(()) => {
				self.current.set(Some(target));
				info!("switched to layer {}", target.def().name_en);
				Ok(SwitchOutcome::Switched(target))
			}
			Err(err) => {
				error!("switching to layer {target} failed: {err}");
				self.restore(previous).await;
				Err(err)
			}
		}
	}

	/// Puts `previous` back on the emptied stage. Without a layer that
	/// can be shown, `current` is cleared so any layer can be picked again.
	async fn restore(&self, previous: Option<LayerId>) {
		self.stage.clear();
		let Some(layer) = previous else {
			self.current.set(None);
			self.stage.show();
			return;
		};
		match self.stage.mount(layer.def()).await {
			Ok(()) => {
				self.current.set(Some(layer));
				self.stage.fade_in().await;
				info!("restored layer {}", layer.def().name_en);
			}
			Err(err) => {
				error!("restoring layer {layer} failed: {err}");
				self.current.set(None);
				self.stage.show();
			}
		}
	}

	async fn run(&self, layer: &'static LayerDef, first_load: bool) -> Result<(), SwitchError> {
		if !first_load {
			self.stage.fade_out().await;
		}
		self.stage.clear();
		self.stage.mount(layer).await?;
		if first_load {
			self.stage.show();
		} else {
			self.stage.fade_in().await;
		}
		Ok(())
	}
}
