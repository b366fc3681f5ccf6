use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent};

use super::controller::{GraphController, GraphPhase, NodeDetails, ShowReport};
use super::gesture::Point;
use super::options::{DeviceClass, GraphOptions};
use super::render::{self, CanvasSurface};
use crate::components::entity_facts::FactList;
use crate::components::onboarding::{GRAPH_HINT_KEY, LocalStorageHints, take_hint};
use crate::content::{ContentStore, EntityKind, NodeCategory};

const FRAME_DT: f32 = 0.016;
const THRESHOLD_MAX: usize = 10;

/// Reactive mirror of the controller state the markup shows.
#[derive(Clone, Copy)]
struct GraphUi {
	phase: RwSignal<GraphPhase>,
	threshold: RwSignal<usize>,
	counts: RwSignal<HashMap<NodeCategory, usize>>,
	enabled: RwSignal<HashMap<NodeCategory, bool>>,
	visible: RwSignal<(usize, usize)>,
	warning: RwSignal<Option<String>>,
	details: RwSignal<Option<NodeDetails>>,
	cursor: RwSignal<&'static str>,
	hint: RwSignal<bool>,
}

impl GraphUi {
	fn new(show_hint: bool) -> Self {
		Self {
			phase: RwSignal::new(GraphPhase::Idle),
			threshold: RwSignal::new(0),
			counts: RwSignal::new(HashMap::new()),
			enabled: RwSignal::new(NodeCategory::ALL.iter().map(|&c| (c, true)).collect()),
			visible: RwSignal::new((0, 0)),
			warning: RwSignal::new(None),
			details: RwSignal::new(None),
			cursor: RwSignal::new("grab"),
			hint: RwSignal::new(show_hint),
		}
	}

	fn sync(&self, c: &GraphController) {
		self.threshold.set(c.filter().threshold);
		self.counts.set(c.category_counts());
		self.enabled
			.set(NodeCategory::ALL.iter().map(|&cat| (cat, c.filter().is_enabled(cat))).collect());
		self.visible.set(c.visible_counts());
		self.phase.set(c.phase());
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((0.0, 0.0))
}

fn local_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	client_x: i32,
	client_y: i32,
) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

fn touch_points(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &TouchEvent) -> Vec<Point> {
	let touches = ev.touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.filter_map(|t| local_point(canvas_ref, t.client_x(), t.client_y()))
		.collect()
}

/// Canvas view of the relations around one entity.
///
/// `root` selects the entity; every change rebuilds (or fetches from cache)
/// its graph at the controller's current depth.
#[component]
pub fn RelationshipGraph(
	store: Rc<ContentStore>,
	#[prop(into)] root: Signal<Option<(EntityKind, String)>>,
	#[prop(optional)] options: Option<GraphOptions>,
) -> impl IntoView {
	let options = options.unwrap_or_default();
	let device = DeviceClass::detect();
	let warning_ms = options.warning_ms;
	let controller = Rc::new(RefCell::new(GraphController::new(store, options, device)));
	let ui = GraphUi::new(take_hint(&mut LocalStorageHints::open(), GRAPH_HINT_KEY));

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let warning_gen = Rc::new(Cell::new(0u32));

	// the warning fades on its own; a newer warning cancels the old timer
	let report_shown = {
		let warning_gen = warning_gen.clone();
		move |report: ShowReport| {
			let generation = warning_gen.get().wrapping_add(1);
			warning_gen.set(generation);
			ui.warning.set(report.warning.clone());
			if report.warning.is_some() {
				let warning_gen = warning_gen.clone();
				set_timeout(
					move || {
						if warning_gen.get() == generation {
							ui.warning.set(None);
						}
					},
					Duration::from_millis(warning_ms),
				);
			}
		}
	};

	let ctrl_root = controller.clone();
	let report_root = report_shown.clone();
	Effect::new(move |_| {
		let Some((kind, id)) = root.get() else {
			return;
		};
		let mut c = ctrl_root.borrow_mut();
		let depth = c.depth();
		let report = c.show(kind, &id, depth);
		ui.details.set(None);
		ui.sync(&c);
		report_root(report);
	});

	let ctrl_init = controller.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window, relationship graph disabled");
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			error!("2d canvas context unavailable");
			return;
		};

		let (ctrl_resize, canvas_resize) = (ctrl_init.clone(), canvas.clone());
		let mut fit_canvas = move || {
			let (w, h) = parent_size(&canvas_resize);
			canvas_resize.set_width(w as u32);
			canvas_resize.set_height(h as u32);
			let mut c = ctrl_resize.borrow_mut();
			c.attach_surface(w, h);
			ui.sync(&c);
		};
		fit_canvas();
		*resize_cb.borrow_mut() = Some(Closure::new(fit_canvas));
		if let Some(ref cb) = *resize_cb.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (ctrl_anim, animate_inner) = (ctrl_init.clone(), animate.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			{
				let mut c = ctrl_anim.borrow_mut();
				c.frame(FRAME_DT);
				if let Some(scene) = c.scene() {
					render::draw(&scene, &mut CanvasSurface::new(&ctx));
				}
				let phase = c.phase();
				if ui.phase.get_untracked() != phase {
					ui.phase.set(phase);
				}
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let ctrl_md = controller.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		ui.hint.set(false);
		ctrl_md.borrow_mut().pointer_down(p);
	};

	let ctrl_mm = controller.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let mut c = ctrl_mm.borrow_mut();
		c.pointer_move(p);
		let cursor = if c.is_dragging() {
			"grabbing"
		} else if c.hovered_node().is_some() {
			"pointer"
		} else {
			"grab"
		};
		if ui.cursor.get_untracked() != cursor {
			ui.cursor.set(cursor);
		}
	};

	let ctrl_mu = controller.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(details) = ctrl_mu.borrow_mut().pointer_up(p, js_sys::Date::now()) {
			ui.details.set(Some(details));
		}
	};

	let ctrl_ml = controller.clone();
	let on_mouseleave = move |_: MouseEvent| {
		ctrl_ml.borrow_mut().pointer_leave();
		ui.cursor.set("grab");
	};

	let ctrl_wh = controller.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			ctrl_wh.borrow_mut().wheel(p, ev.delta_y());
		}
	};

	let ctrl_ts = controller.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		ui.hint.set(false);
		let mut c = ctrl_ts.borrow_mut();
		match touch_points(canvas_ref, &ev).as_slice() {
			[p] => c.pointer_down(*p),
			[a, b, ..] => c.pinch_start(*a, *b),
			[] => {}
		}
	};

	let ctrl_tm = controller.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let mut c = ctrl_tm.borrow_mut();
		match touch_points(canvas_ref, &ev).as_slice() {
			[p] => c.pointer_move(*p),
			[a, b, ..] => c.pinch_move(*a, *b),
			[] => {}
		}
	};

	let ctrl_te = controller.clone();
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		if ev.touches().length() > 0 {
			return;
		}
		let lifted = ev
			.changed_touches()
			.get(0)
			.and_then(|t| local_point(canvas_ref, t.client_x(), t.client_y()));
		let Some(p) = lifted else {
			ctrl_te.borrow_mut().pointer_leave();
			return;
		};
		if let Some(details) = ctrl_te.borrow_mut().pointer_up(p, js_sys::Date::now()) {
			ui.details.set(Some(details));
		}
	};

	let ctrl_th = controller.clone();
	let on_threshold = move |ev| {
		let Ok(threshold) = event_target_value(&ev).parse::<usize>() else {
			return;
		};
		let mut c = ctrl_th.borrow_mut();
		c.set_threshold(threshold);
		ui.sync(&c);
	};

	let filter_buttons = NodeCategory::ALL
		.iter()
		.map(|&category| {
			let ctrl = controller.clone();
			let on_click = move |_| {
				let mut c = ctrl.borrow_mut();
				c.toggle_filter(category);
				ui.sync(&c);
			};
			view! {
				<button
					class="graph-filter"
					class:off=move || !ui.enabled.get().get(&category).copied().unwrap_or(true)
					style:border-color=category.color()
					on:click=on_click
				>
					{category.icon()}
					" "
					{category.label()}
					" "
					<span class="graph-filter-count">
						{move || ui.counts.get().get(&category).copied().unwrap_or(0)}
					</span>
				</button>
			}
		})
		.collect_view();

	let legend = NodeCategory::ALL
		.iter()
		.map(|&category| {
			view! {
				<li class="graph-legend-item">
					<span class="graph-legend-dot" style:background=category.color()></span>
					{category.label()}
				</li>
			}
		})
		.collect_view();

	let ctrl_focus = controller.clone();
	let on_focus = move |_| {
		let Some(details) = ui.details.get_untracked() else {
			return;
		};
		let mut c = ctrl_focus.borrow_mut();
		let report = c.focus(details.kind, &details.entity_id);
		ui.details.set(None);
		ui.sync(&c);
		report_shown(report);
	};

	let ctrl_reset = controller.clone();
	let on_reset = move |_| ctrl_reset.borrow_mut().reset_view();

	let hint_text = match device {
		DeviceClass::Touch => {
			"Drag a node to move it, pinch to zoom, double tap to reset the view."
		}
		DeviceClass::Desktop => {
			"Drag nodes or the canvas, scroll to zoom, double click to reset the view."
		}
	};

	view! {
		<div class="relationship-graph">
			<div class="graph-toolbar">
				<label class="graph-threshold">
					"Min connections: "
					<span>{move || ui.threshold.get()}</span>
					<input
						type="range"
						min="0"
						max=THRESHOLD_MAX.to_string()
						prop:value=move || ui.threshold.get().to_string()
						on:input=on_threshold
					/>
				</label>
				<div class="graph-filters">{filter_buttons}</div>
				<button class="graph-reset" on:click=on_reset>"Reset view"</button>
				<span class="graph-stats">
					{move || {
						let (nodes, edges) = ui.visible.get();
						format!("{nodes} nodes, {edges} links")
					}}
				</span>
			</div>

			<div class="graph-stage">
				<canvas
					node_ref=canvas_ref
					class="relationship-graph-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					on:touchstart=on_touchstart
					on:touchmove=on_touchmove
					on:touchend=on_touchend
					style:display="block"
					style:touch-action="none"
					style:cursor=move || ui.cursor.get()
				/>
				<div
					class="graph-loading"
					class:visible=move || ui.phase.get() == GraphPhase::Loading
				>
					"Loading graph..."
				</div>
				<div class="graph-empty" class:visible=move || ui.phase.get() == GraphPhase::Idle>
					"Pick a muscle, pain or exercise to see its relations."
				</div>
				<div class="graph-warning" class:visible=move || ui.warning.get().is_some()>
					{move || ui.warning.get().unwrap_or_default()}
				</div>
				<div
					class="graph-hint"
					class:visible=move || ui.hint.get()
					on:click=move |_| ui.hint.set(false)
				>
					{hint_text}
				</div>
			</div>

			<ul class="graph-legend">{legend}</ul>

			<aside class="graph-details" class:open=move || ui.details.get().is_some()>
				<button class="graph-details-close" on:click=move |_| ui.details.set(None)>
					"×"
				</button>
				<h3>
					{move || {
						ui.details
							.get()
							.map(|d| format!("{} {}", d.icon, d.title))
							.unwrap_or_default()
					}}
				</h3>
				<p class="graph-details-subtitle">
					{move || ui.details.get().and_then(|d| d.subtitle).unwrap_or_default()}
				</p>
				<p class="graph-details-description">
					{move || ui.details.get().map(|d| d.description).unwrap_or_default()}
				</p>
				{move || {
					ui.details.get().map(|d| {
						let related = d
							.related
							.into_iter()
							.map(|(category, count)| {
								let (icon, label) = (category.icon(), category.label());
								let text = format!("{icon} {label} {count}");
								view! { <li>{text}</li> }
							})
							.collect_view();
						let links = d
							.links
							.into_iter()
							.map(|link| view! { <li>{link}</li> })
							.collect_view();
						view! {
							<FactList facts=d.facts />
							<ul class="graph-details-related">{related}</ul>
							<ul class="graph-details-links">{links}</ul>
						}
					})
				}}
				<button class="graph-details-focus" on:click=on_focus>
					"Show its relations"
				</button>
			</aside>
		</div>
	}
}
