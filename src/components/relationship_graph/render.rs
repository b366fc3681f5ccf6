use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::Scene;
use super::state::ViewTransform;

const BACKGROUND: &str = "#1a1a2e";
const EDGE_RGB: &str = "255, 255, 255";
const EDGE_WIDTH: f64 = 2.0;
const OUTLINE: &str = "#ffffff";
const OUTLINE_WIDTH: f64 = 3.0;
const LABEL_COLOR: &str = "#ffffff";
const LABEL_FONT: &str = "300 11px Inter, sans-serif";
const LABEL_GAP: f64 = 16.0;

/// The immediate-mode drawing calls the graph needs.
pub trait DrawSurface {
	fn clear(&mut self, width: f64, height: f64, color: &str);
	fn set_transform(&mut self, transform: &ViewTransform);
	fn reset_transform(&mut self);
	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64);
	fn circle(
		&mut self,
		center: (f64, f64),
		radius: f64,
		fill: &str,
		alpha: f64,
		outline: Option<(&str, f64)>,
	);
	fn text(&mut self, at: (f64, f64), text: &str, color: &str, font: &str);
}

pub fn draw(scene: &Scene, surface: &mut impl DrawSurface) {
	surface.clear(scene.width, scene.height, BACKGROUND);
	surface.set_transform(&scene.transform);

	for edge in &scene.edges {
		let color = format!("rgba({EDGE_RGB}, {})", edge.alpha);
		surface.line(edge.from, edge.to, &color, EDGE_WIDTH);
	}

	for node in &scene.nodes {
		let outline = node.outlined.then_some((OUTLINE, OUTLINE_WIDTH));
		surface.circle((node.x, node.y), node.radius, node.color, node.alpha, outline);
		if !node.label.is_empty() {
			let at = (node.x, node.y + node.radius + LABEL_GAP);
			surface.text(at, &node.label, LABEL_COLOR, LABEL_FONT);
		}
	}

	surface.reset_transform();
}

/// [`DrawSurface`] over a 2D canvas context.
pub struct CanvasSurface<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl DrawSurface for CanvasSurface<'_> {
	fn clear(&mut self, width: f64, height: f64, color: &str) {
		self.ctx.set_fill_style_str(color);
		self.ctx.fill_rect(0.0, 0.0, width, height);
	}

	fn set_transform(&mut self, transform: &ViewTransform) {
		self.ctx.save();
		let _ = self.ctx.translate(transform.x, transform.y);
		let _ = self.ctx.scale(transform.k, transform.k);
	}

	fn reset_transform(&mut self) {
		self.ctx.restore();
	}

	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64) {
		self.ctx.set_stroke_style_str(color);
		self.ctx.set_line_width(width);
		self.ctx.begin_path();
		self.ctx.move_to(from.0, from.1);
		self.ctx.line_to(to.0, to.1);
		self.ctx.stroke();
	}

	fn circle(
		&mut self,
		center: (f64, f64),
		radius: f64,
		fill: &str,
		alpha: f64,
		outline: Option<(&str, f64)>,
	) {
		self.ctx.set_global_alpha(alpha);
		self.ctx.begin_path();
		let _ = self.ctx.arc(center.0, center.1, radius, 0.0, 2.0 * PI);
		self.ctx.set_fill_style_str(fill);
		self.ctx.fill();
		if let Some((color, width)) = outline {
			self.ctx.set_stroke_style_str(color);
			self.ctx.set_line_width(width);
			self.ctx.stroke();
		}
		self.ctx.set_global_alpha(1.0);
	}

	fn text(&mut self, at: (f64, f64), text: &str, color: &str, font: &str) {
		self.ctx.set_fill_style_str(color);
		self.ctx.set_shadow_color("rgba(0, 0, 0, 0.8)");
		self.ctx.set_shadow_blur(6.0);
		self.ctx.set_shadow_offset_y(2.0);
		self.ctx.set_font(font);
		self.ctx.set_text_align("center");
		let _ = self.ctx.fill_text(text, at.0, at.1);
		self.ctx.set_shadow_blur(0.0);
		self.ctx.set_shadow_offset_y(0.0);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relationship_graph::scene::{SceneEdge, SceneNode};

	#[derive(Default)]
	struct Recorder {
		calls: Vec<String>,
	}

	impl DrawSurface for Recorder {
		fn clear(&mut self, _: f64, _: f64, _: &str) {
			self.calls.push("clear".into());
		}
		fn set_transform(&mut self, t: &ViewTransform) {
			self.calls.push(format!("transform {}", t.k));
		}
		fn reset_transform(&mut self) {
			self.calls.push("reset".into());
		}
		fn line(&mut self, from: (f64, f64), to: (f64, f64), _: &str, _: f64) {
			self.calls.push(format!("line {:?} {:?}", from, to));
		}
		fn circle(&mut self, _: (f64, f64), _: f64, _: &str, _: f64, outline: Option<(&str, f64)>) {
			self.calls.push(format!("circle outlined={}", outline.is_some()));
		}
		fn text(&mut self, _: (f64, f64), text: &str, _: &str, _: &str) {
			self.calls.push(format!("text {text}"));
		}
	}

	fn node(slot: usize, outlined: bool) -> SceneNode {
		SceneNode {
			slot,
			x: 0.0,
			y: 0.0,
			radius: 15.0,
			color: "#ff5252",
			alpha: 1.0,
			outlined,
			label: format!("n{slot}"),
		}
	}

	#[test]
	fn edges_are_drawn_under_nodes_inside_the_transform() {
		let scene = Scene {
			width: 100.0,
			height: 100.0,
			transform: ViewTransform { x: 0.0, y: 0.0, k: 2.0 },
			edges: vec![SceneEdge {
				from: (0.0, 0.0),
				to: (10.0, 5.0),
				alpha: 0.15,
			}],
			nodes: vec![node(0, false), node(1, true)],
		};
		let mut recorder = Recorder::default();
		draw(&scene, &mut recorder);
		assert_eq!(
			recorder.calls,
			vec![
				"clear",
				"transform 2",
				"line (0.0, 0.0) (10.0, 5.0)",
				"circle outlined=false",
				"text n0",
				"circle outlined=true",
				"text n1",
				"reset",
			]
		);
	}
}
