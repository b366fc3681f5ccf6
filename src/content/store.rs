use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use super::model::{Entity, EntityKind};
use crate::error::ContentError;

const BUNDLED: &str = include_str!("content.json");

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTables {
	muscles: Vec<Entity>,
	pain: Vec<Entity>,
	nervous: Vec<Entity>,
	respiratory: Vec<Entity>,
	cardiovascular: Vec<Entity>,
	gadgets: Vec<Entity>,
	exercises: Vec<Entity>,
	goals: Vec<Entity>,
}

/// Read-only tables of entities, one per [`EntityKind`], in document order.
#[derive(Debug, Default)]
pub struct ContentStore {
	tables: BTreeMap<EntityKind, Vec<Entity>>,
	index: HashMap<(EntityKind, String), usize>,
}

impl ContentStore {
	/// The content shipped with the app.
	pub fn bundled() -> Result<Self, ContentError> {
		Self::from_json(BUNDLED)
	}

	pub fn from_json(json: &str) -> Result<Self, ContentError> {
		let raw: RawTables = serde_json::from_str(json)?;
		let mut store = Self::default();
		for (kind, entities) in [
			(EntityKind::Muscle, raw.muscles),
			(EntityKind::Pain, raw.pain),
			(EntityKind::Nervous, raw.nervous),
			(EntityKind::Respiratory, raw.respiratory),
			(EntityKind::Cardiovascular, raw.cardiovascular),
			(EntityKind::Gadget, raw.gadgets),
			(EntityKind::Exercise, raw.exercises),
			(EntityKind::Goal, raw.goals),
		] {
			store.insert_table(kind, entities)?;
		}
		Ok(store)
	}

	fn insert_table(
		&mut self,
		kind: EntityKind,
		entities: Vec<Entity>,
	) -> Result<(), ContentError> {
		for (pos, entity) in entities.iter().enumerate() {
			if entity.id.trim().is_empty() {
				return Err(ContentError::MissingId { kind, position: pos });
			}
			if self.index.insert((kind, entity.id.clone()), pos).is_some() {
				return Err(ContentError::DuplicateId {
					kind,
					id: entity.id.clone(),
				});
			}
		}
		self.tables.insert(kind, entities);
		Ok(())
	}

	pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
		let pos = *self.index.get(&(kind, id.to_string()))?;
		self.tables.get(&kind)?.get(pos)
	}

	pub fn all(&self, kind: EntityKind) -> &[Entity] {
		self.tables.get(&kind).map(Vec::as_slice).unwrap_or(&[])
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}
}
