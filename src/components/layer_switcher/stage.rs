//! [`LayerStage`] over the front/back illustration containers.

use std::cell::RefCell;
use std::future::Future;
use std::pin::pin;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{Either, join_all, select};
use leptos::html::Div;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlElement, TransitionEvent};

use super::layers::{LayerDef, LayerKind, ViewSlot};
use super::switcher::LayerStage;
use crate::error::SwitchError;

const FADE_TIMEOUT_MS: u64 = 600;
const MOUNT_TIMEOUT_MS: u64 = 8000;

const TRANSITION: &str = "layer-transition";
const FADE_OUT: &str = "fade-out";
const FADE_IN: &str = "fade-in";

fn sleep(ms: u64) -> oneshot::Receiver<()> {
	let (tx, rx) = oneshot::channel();
	set_timeout(
		move || {
			let _ = tx.send(());
		},
		Duration::from_millis(ms),
	);
	rx
}

/// `None` when `ms` passed first.
async fn with_timeout<F: Future>(fut: F, ms: u64) -> Option<F::Output> {
	match select(pin!(fut), sleep(ms)).await {
		Either::Left((out, _)) => Some(out),
		Either::Right(_) => None,
	}
}

/// Resolves with the type of the first accepted event among `names`.
/// Listeners are removed when this is dropped.
struct EventWait {
	target: EventTarget,
	names: &'static [&'static str],
	listener: Closure<dyn FnMut(Event)>,
	rx: oneshot::Receiver<String>,
}

impl EventWait {
	fn new(
		target: EventTarget,
		names: &'static [&'static str],
		accept: impl Fn(&Event) -> bool + 'static,
	) -> Self {
		let (tx, rx) = oneshot::channel();
		let tx = Rc::new(RefCell::new(Some(tx)));
		let listener = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
			if !accept(&ev) {
				return;
			}
			if let Some(tx) = tx.borrow_mut().take() {
				let _ = tx.send(ev.type_());
			}
		});
		for name in names {
			let _ =
				target.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
		}
		Self {
			target,
			names,
			listener,
			rx,
		}
	}

	async fn recv(mut self) -> Option<String> {
		(&mut self.rx).await.ok()
	}
}

impl Drop for EventWait {
	fn drop(&mut self) {
		for name in self.names {
			let _ = self
				.target
				.remove_event_listener_with_callback(name, self.listener.as_ref().unchecked_ref());
		}
	}
}

fn is_opacity_transition(ev: &Event) -> bool {
	ev.dyn_ref::<TransitionEvent>()
		.is_some_and(|t| t.property_name() == "opacity")
}

fn set_classes(el: &HtmlElement, add: &[&str], remove: &[&str]) {
	let classes = el.class_list();
	for class in remove {
		let _ = classes.remove_1(class);
	}
	for class in add {
		let _ = classes.add_1(class);
	}
}

/// Front and back illustration containers of the body view.
pub struct DomStage {
	front: NodeRef<Div>,
	back: NodeRef<Div>,
}

impl DomStage {
	pub fn new(front: NodeRef<Div>, back: NodeRef<Div>) -> Self {
		Self { front, back }
	}

	fn front(&self) -> Option<HtmlElement> {
		self.front.get_untracked().map(Into::into)
	}

	fn back(&self) -> Option<HtmlElement> {
		self.back.get_untracked().map(Into::into)
	}

	fn containers(&self) -> Vec<HtmlElement> {
		self.front().into_iter().chain(self.back()).collect()
	}

	/// Waits for the opacity transition on the first container.
	async fn settle_transition(&self, containers: &[HtmlElement]) {
		let Some(first) = containers.first() else {
			return;
		};
		let wait = EventWait::new(first.clone().into(), &["transitionend"], is_opacity_transition);
		if with_timeout(wait.recv(), FADE_TIMEOUT_MS).await.is_none() {
			debug!("no transitionend within {FADE_TIMEOUT_MS} ms, continuing");
		}
	}

	fn add_illustration(
		&self,
		container: &HtmlElement,
		path: &'static str,
	) -> Result<EventWait, SwitchError> {
		let document = container
			.owner_document()
			.ok_or(SwitchError::MissingContainer("document"))?;
		let img = document
			.create_element("img")
			.map_err(|_| SwitchError::AssetLoad(path.to_string()))?;
		// listen before the request starts
		let wait = EventWait::new(img.clone().into(), &["load", "error"], |_| true);
		let _ = img.set_attribute("class", "layer-illustration");
		let _ = img.set_attribute("alt", "");
		let _ = img.set_attribute("src", path);
		container
			.append_child(&img)
			.map_err(|_| SwitchError::AssetLoad(path.to_string()))?;
		Ok(wait)
	}
}

impl LayerStage for DomStage {
	async fn fade_out(&self) {
		let containers = self.containers();
		for el in &containers {
			set_classes(el, &[TRANSITION, FADE_OUT], &[FADE_IN]);
		}
		self.settle_transition(&containers).await;
	}

	fn clear(&self) {
		for el in self.containers() {
			el.set_inner_html("");
			let _ = el.style().remove_property("display");
		}
	}

	async fn mount(&self, layer: &'static LayerDef) -> Result<(), SwitchError> {
		if layer.kind == LayerKind::BlocksOnly {
			debug!("{} has no illustrations", layer.key);
			return Ok(());
		}
		let mut waits = Vec::with_capacity(layer.illustrations.len());
		for illustration in layer.illustrations {
			let container = match illustration.slot {
				ViewSlot::Front | ViewSlot::Single => {
					self.front().ok_or(SwitchError::MissingContainer("front"))?
				}
				ViewSlot::Back => self.back().ok_or(SwitchError::MissingContainer("back"))?,
			};
			if illustration.slot == ViewSlot::Single {
				if let Some(back) = self.back() {
					let _ = back.style().set_property("display", "none");
				}
			}
			waits.push((illustration.path, self.add_illustration(&container, illustration.path)?));
		}
		if waits.is_empty() {
			return Ok(());
		}

		let (paths, waits): (Vec<_>, Vec<_>) = waits.into_iter().unzip();
		let loads = join_all(waits.into_iter().map(EventWait::recv));
		let Some(events) = with_timeout(loads, MOUNT_TIMEOUT_MS).await else {
			warn!("illustrations of {} not ready after {MOUNT_TIMEOUT_MS} ms", layer.key);
			return Err(SwitchError::AssetLoad(paths.join(", ")));
		};
		match paths
			.iter()
			.zip(&events)
			.find(|(_, event)| event.as_deref() != Some("load"))
		{
			Some((path, _)) => Err(SwitchError::AssetLoad(path.to_string())),
			None => Ok(()),
		}
	}

	async fn fade_in(&self) {
		let containers = self.containers();
		for el in &containers {
			set_classes(el, &[], &[FADE_OUT]);
			// force a reflow so the opacity change animates
			let _ = el.offset_height();
			set_classes(el, &[FADE_IN], &[]);
		}
		self.settle_transition(&containers).await;
		for el in &containers {
			set_classes(el, &[], &[TRANSITION, FADE_IN]);
		}
	}

	fn show(&self) {
		for el in self.containers() {
			set_classes(&el, &[], &[TRANSITION, FADE_OUT, FADE_IN]);
		}
	}
}
