use std::rc::Rc;

use super::filter::{Visibility, VisibilityFilter};
use super::gesture::Point;
use super::highlight::{FadeTiming, Highlight};
use super::layout::{ForceLayout, StepEvents};
use super::options::GraphOptions;
use super::scene::node_radius;
use crate::content::{EntityKind, RelationGraph};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Screen = graph * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

/// One displayed graph: its layout, view transform, hover and visibility.
pub struct GraphViewState {
	pub data: Rc<RelationGraph>,
	pub layout: ForceLayout,
	pub kinds: Vec<EntityKind>,
	pub transform: ViewTransform,
	pub highlight: Highlight,
	pub visibility: Visibility,
	pub width: f64,
	pub height: f64,
	/// Pointer-to-node offset of the drag in progress, in graph space.
	pub drag_offset: (f64, f64),
	hit_radius: f64,
}

impl GraphViewState {
	pub fn new(data: Rc<RelationGraph>, width: f64, height: f64, options: &GraphOptions) -> Self {
		let layout = ForceLayout::new(&data, width, height, options);
		let kinds = data.nodes.iter().map(|n| n.kind).collect();
		let mut state = Self {
			data,
			layout,
			kinds,
			transform: ViewTransform::default(),
			highlight: Highlight::new(FadeTiming::from(options)),
			visibility: Visibility::default(),
			width,
			height,
			drag_offset: (0.0, 0.0),
			hit_radius: options.hit_radius,
		};
		state.apply_filter(&VisibilityFilter::default());
		state
	}

	pub fn apply_filter(&mut self, filter: &VisibilityFilter) {
		self.visibility = filter.apply(&self.kinds, self.layout.degrees(), self.layout.edges());
		if self.highlight.hovered().is_some_and(|node| !self.is_visible(node)) {
			self.set_hover(None);
		}
	}

	pub fn is_visible(&self, slot: usize) -> bool {
		self.visibility.nodes.get(slot).copied().unwrap_or(false)
	}

	pub fn screen_to_graph(&self, p: Point) -> (f64, f64) {
		(
			(p.x - self.transform.x) / self.transform.k,
			(p.y - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, x: f64, y: f64) -> Point {
		Point::new(
			x * self.transform.k + self.transform.x,
			y * self.transform.k + self.transform.y,
		)
	}

	/// Topmost visible node under the screen point.
	pub fn node_at_position(&self, p: Point) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(p);
		let degrees = self.layout.degrees();
		self.layout
			.positions()
			.into_iter()
			.enumerate()
			.filter(|&(slot, _)| self.is_visible(slot))
			.filter(|&(slot, (x, y))| {
				let radius = node_radius(degrees[slot]).max(self.hit_radius);
				((x - gx).powi(2) + (y - gy).powi(2)).sqrt() < radius
			})
			.map(|(slot, _)| slot)
			.last()
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.highlight.point_at(node, self.layout.edges());
	}

	/// Advances the layout and the hover fade by `dt` seconds.
	pub fn tick(&mut self, dt: f32) -> StepEvents {
		self.highlight.advance(dt as f64);
		self.layout.step(dt)
	}

	pub fn pan(&mut self, dx: f64, dy: f64) {
		self.transform.x += dx;
		self.transform.y += dy;
	}

	/// Scales by `factor` keeping the screen point `at` fixed.
	pub fn zoom_at(&mut self, at: Point, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = at.x - (at.x - self.transform.x) * ratio;
		self.transform.y = at.y - (at.y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::default();
	}

	/// Frames every visible node, never zooming in past 1:1.
	pub fn fit_to_view(&mut self, padding: f64) {
		let positions = self.layout.positions();
		let visible = positions
			.iter()
			.enumerate()
			.filter(|&(slot, _)| self.is_visible(slot))
			.map(|(_, &p)| p);
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for (x, y) in visible {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		}
		if !min_x.is_finite() || self.width <= 0.0 || self.height <= 0.0 {
			return;
		}

		let (graph_w, graph_h) = (max_x - min_x + padding * 2.0, max_y - min_y + padding * 2.0);
		let k = (self.width / graph_w).min(self.height / graph_h).min(1.0);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
