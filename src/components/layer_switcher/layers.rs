//! The body-system layers and what each of them shows.

use std::fmt;
use std::str::FromStr;

use crate::content::EntityKind;
use crate::error::SwitchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerId {
	Muscles,
	Pain,
	Nervous,
	Respiratory,
	Cardiovascular,
	Gadgets,
}

impl LayerId {
	pub const ALL: [LayerId; 6] = [
		LayerId::Muscles,
		LayerId::Pain,
		LayerId::Nervous,
		LayerId::Respiratory,
		LayerId::Cardiovascular,
		LayerId::Gadgets,
	];

	pub fn as_str(self) -> &'static str {
		self.def().key
	}

	pub fn def(self) -> &'static LayerDef {
		match self {
			LayerId::Muscles => &LAYERS[0],
			LayerId::Pain => &LAYERS[1],
			LayerId::Nervous => &LAYERS[2],
			LayerId::Respiratory => &LAYERS[3],
			LayerId::Cardiovascular => &LAYERS[4],
			LayerId::Gadgets => &LAYERS[5],
		}
	}

	/// Table whose entries are listed as cards on this layer.
	pub fn entity_kind(self) -> EntityKind {
		match self {
			LayerId::Muscles => EntityKind::Muscle,
			LayerId::Pain => EntityKind::Pain,
			LayerId::Nervous => EntityKind::Nervous,
			LayerId::Respiratory => EntityKind::Respiratory,
			LayerId::Cardiovascular => EntityKind::Cardiovascular,
			LayerId::Gadgets => EntityKind::Gadget,
		}
	}
}

impl fmt::Display for LayerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LayerId {
	type Err = SwitchError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		LayerId::ALL
			.into_iter()
			.find(|id| id.as_str() == s)
			.ok_or_else(|| SwitchError::UnknownLayer(s.to_string()))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
	/// Full illustration with individual elements.
	Detailed,
	/// Illustration with information blocks on top.
	Overlay,
	/// No illustration at all.
	BlocksOnly,
}

/// Which container an illustration goes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewSlot {
	Front,
	Back,
	/// Occupies the front container; the back one is hidden.
	Single,
}

#[derive(Debug)]
pub struct Illustration {
	pub slot: ViewSlot,
	pub path: &'static str,
}

#[derive(Debug)]
pub struct LayerDef {
	pub id: LayerId,
	pub key: &'static str,
	pub name: &'static str,
	pub name_en: &'static str,
	pub icon: &'static str,
	pub color: &'static str,
	pub illustrations: &'static [Illustration],
	pub kind: LayerKind,
	pub description: &'static str,
}

impl LayerDef {
	/// Layers with a single illustration have no front/back toggle.
	pub fn has_two_views(&self) -> bool {
		self.illustrations.len() == 2
	}
}

pub static LAYERS: [LayerDef; 6] = [
	LayerDef {
		id: LayerId::Muscles,
		key: "muscles",
		name: "Мышечная система",
		name_en: "Muscular System",
		icon: "💪",
		color: "#00d4ff",
		illustrations: &[
			Illustration {
				slot: ViewSlot::Front,
				path: "img/body-front.svg",
			},
			Illustration {
				slot: ViewSlot::Back,
				path: "img/body-back.svg",
			},
		],
		kind: LayerKind::Detailed,
		description: "Детальная анатомия мышечной системы",
	},
	LayerDef {
		id: LayerId::Pain,
		key: "pain",
		name: "Боли и травмы",
		name_en: "Pain & Injuries",
		icon: "🩹",
		color: "#ff5252",
		illustrations: &[
			Illustration {
				slot: ViewSlot::Front,
				path: "img/body-front-color.svg",
			},
			Illustration {
				slot: ViewSlot::Back,
				path: "img/body-back-color.svg",
			},
		],
		kind: LayerKind::Overlay,
		description: "Распространённые боли и травмы с поражёнными областями",
	},
	LayerDef {
		id: LayerId::Nervous,
		key: "nervous",
		name: "Нервная система",
		name_en: "Nervous System",
		icon: "🧠",
		color: "#ffeb3b",
		illustrations: &[Illustration {
			slot: ViewSlot::Single,
			path: "img/nervous-system.svg",
		}],
		kind: LayerKind::Overlay,
		description: "Центральная и периферическая нервная система",
	},
	LayerDef {
		id: LayerId::Respiratory,
		key: "respiratory",
		name: "Дыхательная система",
		name_en: "Respiratory System",
		icon: "🫁",
		color: "#4caf50",
		illustrations: &[Illustration {
			slot: ViewSlot::Single,
			path: "img/respiratory-system.svg",
		}],
		kind: LayerKind::Overlay,
		description: "Лёгкие, диафрагма, паттерны дыхания",
	},
	LayerDef {
		id: LayerId::Cardiovascular,
		key: "cardiovascular",
		name: "Сердечно-сосудистая система",
		name_en: "Cardiovascular System",
		icon: "❤️",
		color: "#f44336",
		illustrations: &[Illustration {
			slot: ViewSlot::Single,
			path: "img/circulatory-system.svg",
		}],
		kind: LayerKind::Overlay,
		description: "Сердце, сосуды, зоны ЧСС",
	},
	LayerDef {
		id: LayerId::Gadgets,
		key: "gadgets",
		name: "Гаджеты и технологии",
		name_en: "Gadgets & Technology",
		icon: "⌚",
		color: "#9c27b0",
		illustrations: &[],
		kind: LayerKind::BlocksOnly,
		description: "Фитнес-трекеры, пульсометры, умные весы",
	},
];
