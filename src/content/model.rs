use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Every table the content store knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
	Muscle,
	Pain,
	Nervous,
	Respiratory,
	Cardiovascular,
	Gadget,
	Exercise,
	Goal,
}

impl EntityKind {
	pub const ALL: [EntityKind; 8] = [
		EntityKind::Muscle,
		EntityKind::Pain,
		EntityKind::Nervous,
		EntityKind::Respiratory,
		EntityKind::Cardiovascular,
		EntityKind::Gadget,
		EntityKind::Exercise,
		EntityKind::Goal,
	];

	/// Prefix used in graph node ids, e.g. `muscle:trapezius-upper`.
	pub fn prefix(self) -> &'static str {
		match self {
			EntityKind::Muscle => "muscle",
			EntityKind::Pain => "pain",
			EntityKind::Nervous => "nervous",
			EntityKind::Respiratory => "respiratory",
			EntityKind::Cardiovascular => "cardiovascular",
			EntityKind::Gadget => "gadget",
			EntityKind::Exercise => "exercise",
			EntityKind::Goal => "goal",
		}
	}

	pub fn category(self) -> NodeCategory {
		match self {
			EntityKind::Muscle => NodeCategory::Muscles,
			EntityKind::Pain => NodeCategory::Pain,
			EntityKind::Exercise => NodeCategory::Exercises,
			EntityKind::Goal => NodeCategory::Goals,
			EntityKind::Nervous
			| EntityKind::Respiratory
			| EntityKind::Cardiovascular
			| EntityKind::Gadget => NodeCategory::Systems,
		}
	}

	/// Information blocks of the simplified body-system layers.
	pub fn is_system_block(self) -> bool {
		self.category() == NodeCategory::Systems
	}
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.prefix())
	}
}

impl FromStr for EntityKind {
	type Err = ();

	/// Accepts both the node-id prefix and the plural table name.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"muscle" | "muscles" => Ok(EntityKind::Muscle),
			"pain" => Ok(EntityKind::Pain),
			"nervous" => Ok(EntityKind::Nervous),
			"respiratory" => Ok(EntityKind::Respiratory),
			"cardiovascular" => Ok(EntityKind::Cardiovascular),
			"gadget" | "gadgets" => Ok(EntityKind::Gadget),
			"exercise" | "exercises" => Ok(EntityKind::Exercise),
			"goal" | "goals" => Ok(EntityKind::Goal),
			_ => Err(()),
		}
	}
}

/// Filter buttons of the graph view group entity kinds into these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
	Goals,
	Exercises,
	Muscles,
	Pain,
	Systems,
}

impl NodeCategory {
	pub const ALL: [NodeCategory; 5] = [
		NodeCategory::Goals,
		NodeCategory::Exercises,
		NodeCategory::Muscles,
		NodeCategory::Pain,
		NodeCategory::Systems,
	];

	pub fn label(self) -> &'static str {
		match self {
			NodeCategory::Goals => "Goals",
			NodeCategory::Exercises => "Exercises",
			NodeCategory::Muscles => "Muscles",
			NodeCategory::Pain => "Pain",
			NodeCategory::Systems => "Systems",
		}
	}

	pub fn icon(self) -> &'static str {
		match self {
			NodeCategory::Goals => "🎯",
			NodeCategory::Exercises => "🏋️",
			NodeCategory::Muscles => "💪",
			NodeCategory::Pain => "⚠️",
			NodeCategory::Systems => "🧠",
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			NodeCategory::Goals => "#4caf50",
			NodeCategory::Exercises => "#00d4ff",
			NodeCategory::Muscles => "#ff5252",
			NodeCategory::Pain => "#f44336",
			NodeCategory::Systems => "#999999",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
	Low,
	Medium,
	High,
}

impl fmt::Display for Intensity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Intensity::Low => "low",
			Intensity::Medium => "medium",
			Intensity::High => "high",
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Common,
	Moderate,
	Severe,
}

impl Severity {
	pub fn key(self) -> &'static str {
		match self {
			Severity::Common => "common",
			Severity::Moderate => "moderate",
			Severity::Severe => "severe",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Severity::Common => "Common",
			Severity::Moderate => "Moderate",
			Severity::Severe => "Severe",
		}
	}
}

/// A muscle region a pain issue shows up in.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AffectedArea {
	pub muscle_id: String,
	pub intensity: Intensity,
}

/// One record of the content store. Which fields are populated depends on
/// the table it lives in; the table itself determines its [`EntityKind`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Entity {
	pub id: String,
	pub title: String,
	pub title_en: Option<String>,
	pub latin_name: Option<String>,
	pub content: String,
	pub tags: Vec<String>,
	pub severity: Option<Severity>,
	pub causes: Vec<String>,
	pub symptoms: Vec<String>,
	pub affected_areas: Vec<AffectedArea>,
	/// Muscle ids a system block talks about. `"all"` marks blocks that
	/// concern every muscle and is never expanded into edges.
	pub related_muscles: Vec<String>,
	pub exercise_ids: Vec<String>,
	pub goal_ids: Vec<String>,
	pub muscle_ids: Vec<String>,
}

impl Entity {
	pub fn display_title(&self) -> &str {
		if self.title.is_empty() {
			&self.id
		} else {
			&self.title
		}
	}

	/// English or Latin name shown under the title.
	pub fn subtitle(&self) -> Option<&str> {
		self.title_en.as_deref().or(self.latin_name.as_deref())
	}
}
