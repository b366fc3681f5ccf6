//! Hover highlight: a node with its direct neighbours stays bright while the
//! rest of the graph dims. The dimming eases in after a short delay and eases
//! out after the pointer leaves.

use std::collections::HashSet;

use super::options::GraphOptions;

/// A node together with every node it shares an edge with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neighborhood {
	pub center: usize,
	pub members: HashSet<usize>,
}

impl Neighborhood {
	pub fn around(center: usize, edges: &[(usize, usize)]) -> Self {
		let members = edges
			.iter()
			.filter_map(|&(src, tgt)| match (src == center, tgt == center) {
				(true, false) => Some(tgt),
				(false, true) => Some(src),
				_ => None,
			})
			.collect();
		Self { center, members }
	}

	pub fn contains(&self, slot: usize) -> bool {
		slot == self.center || self.members.contains(&slot)
	}
}

/// Durations of the hover fade, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeTiming {
	pub delay: f64,
	pub fade_in: f64,
	pub fade_out: f64,
}

impl From<&GraphOptions> for FadeTiming {
	fn from(options: &GraphOptions) -> Self {
		Self {
			delay: options.hover_delay_ms / 1000.0,
			fade_in: options.hover_fade_in_ms / 1000.0,
			fade_out: options.hover_fade_out_ms / 1000.0,
		}
	}
}

#[derive(Clone, Debug)]
pub struct Highlight {
	timing: FadeTiming,
	target: Option<Neighborhood>,
	/// Previous target, drawn until the fade-out completes.
	leaving: Option<Neighborhood>,
	/// 0 = no dimming, 1 = fully dimmed.
	level: f64,
	waited: f64,
}

impl Highlight {
	pub fn new(timing: FadeTiming) -> Self {
		Self {
			timing,
			target: None,
			leaving: None,
			level: 0.0,
			waited: 0.0,
		}
	}

	pub fn hovered(&self) -> Option<usize> {
		self.target.as_ref().map(|n| n.center)
	}

	/// Moves the highlight to `node`, or starts fading it out on `None`.
	pub fn point_at(&mut self, node: Option<usize>, edges: &[(usize, usize)]) {
		if self.hovered() == node {
			return;
		}
		match node {
			Some(center) => {
				// hopping between nodes keeps the current level
				if self.target.is_none() {
					self.waited = 0.0;
				}
				self.leaving = None;
				self.target = Some(Neighborhood::around(center, edges));
			}
			None => self.leaving = self.target.take(),
		}
	}

	pub fn advance(&mut self, dt: f64) {
		if self.target.is_some() {
			self.waited = (self.waited + dt).min(self.timing.delay);
			if self.waited >= self.timing.delay {
				self.level = step_toward(self.level, 1.0, dt, self.timing.fade_in);
			}
		} else {
			self.level = step_toward(self.level, 0.0, dt, self.timing.fade_out);
			if self.level == 0.0 {
				self.leaving = None;
			}
		}
	}

	pub fn level(&self) -> f64 {
		self.level
	}

	fn shown(&self) -> Option<&Neighborhood> {
		self.target.as_ref().or(self.leaving.as_ref())
	}

	pub fn is_active(&self) -> bool {
		self.shown().is_some()
	}

	/// Inside the hovered or fading neighbourhood.
	pub fn is_lit(&self, slot: usize) -> bool {
		self.shown().is_some_and(|n| n.contains(slot))
	}

	pub fn is_center(&self, slot: usize) -> bool {
		self.shown().is_some_and(|n| n.center == slot)
	}
}

/// Linear step of `from` toward `to`, covering the full range in `duration`.
fn step_toward(from: f64, to: f64, dt: f64, duration: f64) -> f64 {
	if duration <= 0.0 {
		return to;
	}
	let step = dt / duration;
	if from < to {
		(from + step).min(to)
	} else {
		(from - step).max(to)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EDGES: [(usize, usize); 3] = [(0, 1), (2, 0), (3, 4)];

	fn highlight() -> Highlight {
		Highlight::new(FadeTiming {
			delay: 0.1,
			fade_in: 0.2,
			fade_out: 0.4,
		})
	}

	#[test]
	fn neighborhood_follows_edges_both_ways() {
		let n = Neighborhood::around(0, &EDGES);
		assert!(n.contains(0) && n.contains(1) && n.contains(2));
		assert!(!n.contains(3));
	}

	#[test]
	fn dimming_waits_for_the_delay() {
		let mut h = highlight();
		h.point_at(Some(0), &EDGES);
		h.advance(0.05);
		assert_eq!(h.level(), 0.0);
		h.advance(0.05);
		h.advance(0.1);
		assert!(h.level() > 0.0 && h.level() < 1.0);
		h.advance(1.0);
		assert_eq!(h.level(), 1.0);
	}

	#[test]
	fn leaving_node_stays_lit_until_faded() {
		let mut h = highlight();
		h.point_at(Some(0), &EDGES);
		h.advance(1.0);
		h.point_at(None, &EDGES);
		assert_eq!(h.hovered(), None);
		assert!(h.is_lit(1) && h.is_center(0));

		h.advance(0.2);
		assert!(h.is_active());
		h.advance(0.2);
		assert_eq!(h.level(), 0.0);
		assert!(!h.is_active());
		assert!(!h.is_lit(0));
	}

	#[test]
	fn moving_to_another_node_keeps_the_level() {
		let mut h = highlight();
		h.point_at(Some(0), &EDGES);
		h.advance(1.0);
		h.point_at(Some(3), &EDGES);
		assert_eq!(h.level(), 1.0);
		assert!(h.is_lit(4) && !h.is_lit(1));
	}
}
