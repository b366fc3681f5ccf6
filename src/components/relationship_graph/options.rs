/// Coarse input class, decides the node cap and whether hover is tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
	Touch,
	Desktop,
}

impl DeviceClass {
	pub fn from_user_agent(ua: &str) -> Self {
		const TOUCH_AGENTS: [&str; 4] = ["iphone", "ipad", "ipod", "android"];
		let ua = ua.to_lowercase();
		if TOUCH_AGENTS.iter().any(|agent| ua.contains(agent)) {
			DeviceClass::Touch
		} else {
			DeviceClass::Desktop
		}
	}

	/// Reads `navigator.userAgent`; anything unreadable counts as desktop.
	pub fn detect() -> Self {
		web_sys::window()
			.and_then(|w| w.navigator().user_agent().ok())
			.map(|ua| Self::from_user_agent(&ua))
			.unwrap_or(DeviceClass::Desktop)
	}
}

/// Tunables of the relationship graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphOptions {
	pub default_depth: u32,
	pub max_depth: u32,
	pub max_nodes_touch: usize,
	pub max_nodes_desktop: usize,
	pub enable_drag: bool,
	/// Fraction of velocity lost per step.
	pub velocity_decay: f32,
	/// Heat held while a node is dragged.
	pub alpha_target: f32,
	pub alpha_decay: f32,
	pub alpha_min: f32,
	pub center_strength_x: f32,
	pub center_strength_y: f32,
	pub collide_radius: f32,
	pub collide_strength: f32,
	/// Layout steps before the one-shot fit to viewport.
	pub auto_fit_after_steps: u32,
	pub fit_padding: f64,
	pub warning_ms: u64,
	pub tap_slop: f64,
	pub double_tap_ms: f64,
	pub hit_radius: f64,
	/// Hover time before the rest of the graph starts to dim.
	pub hover_delay_ms: f64,
	pub hover_fade_in_ms: f64,
	pub hover_fade_out_ms: f64,
}

impl Default for GraphOptions {
	fn default() -> Self {
		Self {
			default_depth: 2,
			max_depth: 3,
			max_nodes_touch: 50,
			max_nodes_desktop: 200,
			enable_drag: true,
			velocity_decay: 0.4,
			alpha_target: 0.3,
			alpha_decay: 0.02,
			alpha_min: 0.001,
			center_strength_x: 0.05,
			center_strength_y: 0.15,
			collide_radius: 25.0,
			collide_strength: 0.9,
			auto_fit_after_steps: 50,
			fit_padding: 100.0,
			warning_ms: 5000,
			tap_slop: 4.0,
			double_tap_ms: 300.0,
			hit_radius: 25.0,
			hover_delay_ms: 80.0,
			hover_fade_in_ms: 250.0,
			hover_fade_out_ms: 400.0,
		}
	}
}

impl GraphOptions {
	pub fn node_cap(&self, device: DeviceClass) -> usize {
		match device {
			DeviceClass::Touch => self.max_nodes_touch,
			DeviceClass::Desktop => self.max_nodes_desktop,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn phones_and_tablets_are_touch() {
		let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
		let android = "Mozilla/5.0 (Linux; Android 14; Pixel 8)";
		let linux = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0";
		assert_eq!(DeviceClass::from_user_agent(iphone), DeviceClass::Touch);
		assert_eq!(DeviceClass::from_user_agent(android), DeviceClass::Touch);
		assert_eq!(DeviceClass::from_user_agent(linux), DeviceClass::Desktop);
	}

	#[test]
	fn touch_devices_get_the_lower_cap() {
		let options = GraphOptions::default();
		assert!(options.node_cap(DeviceClass::Touch) < options.node_cap(DeviceClass::Desktop));
	}
}
