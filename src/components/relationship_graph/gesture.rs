//! Turns raw pointer and touch input into graph gestures.
//!
//! Mouse and single-finger touch both go through `press`/`move_to`/`release`;
//! a second finger switches to pinching until all fingers lift.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureAction<N> {
	Pan { dx: f64, dy: f64 },
	DragStart { node: N, at: Point },
	DragMove { node: N, at: Point },
	DragEnd { node: N },
	Pinch { factor: f64, center: Point },
	Tap { at: Point, node: Option<N> },
	ResetView,
}

#[derive(Clone, Copy, Debug)]
enum Mode<N> {
	Idle,
	Pressed {
		start: Point,
		last: Point,
		node: Option<N>,
		/// The press landed on a node that may be dragged.
		grab: bool,
		moved: bool,
	},
	Pinching {
		distance: f64,
	},
}

pub struct GestureTracker<N> {
	mode: Mode<N>,
	last_tap: Option<(f64, Point)>,
	slop: f64,
	double_tap_ms: f64,
	drag_enabled: bool,
}

impl<N: Copy> GestureTracker<N> {
	pub fn new(slop: f64, double_tap_ms: f64, drag_enabled: bool) -> Self {
		Self {
			mode: Mode::Idle,
			last_tap: None,
			slop,
			double_tap_ms,
			drag_enabled,
		}
	}

	/// `node` is whatever sits under the pointer. Nothing happens until
	/// the pointer leaves the slop circle or lifts.
	pub fn press(&mut self, at: Point, node: Option<N>) {
		self.mode = Mode::Pressed {
			start: at,
			last: at,
			node,
			grab: node.is_some() && self.drag_enabled,
			moved: false,
		};
	}

	/// Crossing the slop on a node yields `DragStart` at the press point
	/// followed by the first `DragMove`.
	pub fn move_to(&mut self, at: Point) -> Vec<GestureAction<N>> {
		let Mode::Pressed {
			start,
			last,
			node,
			grab,
			moved,
		} = &mut self.mode
		else {
			return Vec::new();
		};
		let mut actions = Vec::new();
		if !*moved {
			if start.distance(at) <= self.slop {
				return actions;
			}
			*moved = true;
			if let (Some(node), true) = (*node, *grab) {
				actions.push(GestureAction::DragStart { node, at: *start });
			}
		}
		let (dx, dy) = (at.x - last.x, at.y - last.y);
		*last = at;
		actions.push(match *node {
			Some(node) if *grab => GestureAction::DragMove { node, at },
			_ => GestureAction::Pan { dx, dy },
		});
		actions
	}

	/// `now_ms` is only used to pair taps into double taps.
	pub fn release(&mut self, at: Point, now_ms: f64) -> Vec<GestureAction<N>> {
		let mode = std::mem::replace(&mut self.mode, Mode::Idle);
		let Mode::Pressed { node, grab, moved, .. } = mode else {
			return Vec::new();
		};

		if moved {
			return match node {
				Some(node) if grab => vec![GestureAction::DragEnd { node }],
				_ => Vec::new(),
			};
		}
		let mut actions = Vec::new();

		let double = self.last_tap.is_some_and(|(t, p)| {
			now_ms - t <= self.double_tap_ms && p.distance(at) <= self.slop * 4.0
		});
		if double {
			self.last_tap = None;
			actions.push(GestureAction::ResetView);
		} else {
			self.last_tap = Some((now_ms, at));
			actions.push(GestureAction::Tap { at, node });
		}
		actions
	}

	/// A second finger landed. Any node drag in progress ends.
	pub fn pinch_start(&mut self, a: Point, b: Point) -> Option<GestureAction<N>> {
		let released = self.cancel();
		self.mode = Mode::Pinching {
			distance: a.distance(b),
		};
		released
	}

	pub fn pinch_move(&mut self, a: Point, b: Point) -> Option<GestureAction<N>> {
		let Mode::Pinching { distance } = &mut self.mode else {
			return None;
		};
		let current = a.distance(b);
		if *distance <= f64::EPSILON || current <= f64::EPSILON {
			*distance = current;
			return None;
		}
		let factor = current / *distance;
		*distance = current;
		Some(GestureAction::Pinch {
			factor,
			center: a.midpoint(b),
		})
	}

	/// Pointer left the surface; ends whatever was going on without a tap.
	pub fn cancel(&mut self) -> Option<GestureAction<N>> {
		match std::mem::replace(&mut self.mode, Mode::Idle) {
			Mode::Pressed {
				node: Some(node),
				grab: true,
				moved: true,
				..
			} => Some(GestureAction::DragEnd { node }),
			_ => None,
		}
	}

	pub fn is_dragging_node(&self) -> bool {
		matches!(
			self.mode,
			Mode::Pressed {
				grab: true,
				moved: true,
				..
			}
		)
	}

	pub fn is_active(&self) -> bool {
		!matches!(self.mode, Mode::Idle)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tracker() -> GestureTracker<usize> {
		GestureTracker::new(4.0, 300.0, true)
	}

	#[test]
	fn drag_on_empty_canvas_pans() {
		let mut g = tracker();
		g.press(Point::new(10.0, 10.0), None);
		assert!(g.move_to(Point::new(11.0, 10.0)).is_empty());
		assert_eq!(
			g.move_to(Point::new(30.0, 15.0)),
			vec![GestureAction::Pan { dx: 20.0, dy: 5.0 }]
		);
		assert_eq!(
			g.move_to(Point::new(31.0, 15.0)),
			vec![GestureAction::Pan { dx: 1.0, dy: 0.0 }]
		);
		assert!(g.release(Point::new(31.0, 15.0), 100.0).is_empty());
		assert!(!g.is_active());
	}

	#[test]
	fn drag_on_node_starts_past_the_slop() {
		let mut g = tracker();
		let start = Point::new(5.0, 5.0);
		g.press(start, Some(7));
		assert!(!g.is_dragging_node());
		assert!(g.move_to(Point::new(7.0, 6.0)).is_empty());
		assert!(!g.is_dragging_node());

		let to = Point::new(50.0, 60.0);
		assert_eq!(
			g.move_to(to),
			vec![
				GestureAction::DragStart { node: 7, at: start },
				GestureAction::DragMove { node: 7, at: to }
			]
		);
		assert!(g.is_dragging_node());
		let next = Point::new(52.0, 60.0);
		assert_eq!(g.move_to(next), vec![GestureAction::DragMove { node: 7, at: next }]);
		assert_eq!(g.release(next, 0.0), vec![GestureAction::DragEnd { node: 7 }]);
	}

	#[test]
	fn still_press_on_node_is_only_a_tap() {
		let mut g = tracker();
		let at = Point::new(5.0, 5.0);
		g.press(at, Some(3));
		assert_eq!(g.release(at, 0.0), vec![GestureAction::Tap { at, node: Some(3) }]);
	}

	#[test]
	fn quick_second_tap_resets_the_view() {
		let mut g = tracker();
		let at = Point::new(100.0, 100.0);
		g.press(at, None);
		assert_eq!(g.release(at, 1000.0), vec![GestureAction::Tap { at, node: None }]);
		g.press(at, None);
		assert_eq!(g.release(at, 1200.0), vec![GestureAction::ResetView]);
		// a third tap starts a new pair
		g.press(at, None);
		assert_eq!(g.release(at, 1300.0), vec![GestureAction::Tap { at, node: None }]);
	}

	#[test]
	fn slow_second_tap_is_just_a_tap() {
		let mut g = tracker();
		let at = Point::new(0.0, 0.0);
		g.press(at, None);
		g.release(at, 0.0);
		g.press(at, None);
		assert_eq!(g.release(at, 500.0), vec![GestureAction::Tap { at, node: None }]);
	}

	#[test]
	fn second_finger_ends_drag_and_pinches() {
		let mut g = tracker();
		g.press(Point::new(0.0, 0.0), Some(1));
		g.move_to(Point::new(20.0, 0.0));
		assert_eq!(
			g.pinch_start(Point::new(0.0, 0.0), Point::new(100.0, 0.0)),
			Some(GestureAction::DragEnd { node: 1 })
		);
		assert_eq!(
			g.pinch_move(Point::new(0.0, 0.0), Point::new(200.0, 0.0)),
			Some(GestureAction::Pinch {
				factor: 2.0,
				center: Point::new(100.0, 0.0)
			})
		);
		// lifting fingers after a pinch is not a tap
		assert!(g.release(Point::new(0.0, 0.0), 0.0).is_empty());
	}

	#[test]
	fn second_finger_on_a_pressed_node_releases_nothing() {
		let mut g = tracker();
		g.press(Point::new(0.0, 0.0), Some(1));
		assert_eq!(g.pinch_start(Point::new(0.0, 0.0), Point::new(100.0, 0.0)), None);
	}

	#[test]
	fn disabled_drag_turns_node_presses_into_pans() {
		let mut g: GestureTracker<usize> = GestureTracker::new(4.0, 300.0, false);
		g.press(Point::new(0.0, 0.0), Some(2));
		assert_eq!(
			g.move_to(Point::new(10.0, 0.0)),
			vec![GestureAction::Pan { dx: 10.0, dy: 0.0 }]
		);
	}

	#[test]
	fn cancel_releases_a_dragged_node() {
		let mut g = tracker();
		g.press(Point::new(0.0, 0.0), Some(4));
		g.move_to(Point::new(10.0, 10.0));
		assert_eq!(g.cancel(), Some(GestureAction::DragEnd { node: 4 }));
		assert_eq!(g.cancel(), None);
	}
}
