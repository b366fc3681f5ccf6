//! Lookups, bounded relationship traversal and search over a [`ContentStore`].

use std::collections::{BTreeMap, HashSet, VecDeque};

use log::debug;

use super::graph::{GraphEdge, GraphNode, NodeId, RelationGraph, Relation};
use super::model::{Entity, EntityKind, Intensity};
use super::store::ContentStore;

const TITLE_PREFIX_SCORE: u32 = 10;
const TITLE_SCORE: u32 = 5;
const TAG_SCORE: u32 = 4;
const SECONDARY_TITLE_SCORE: u32 = 3;
const CONTENT_SCORE: u32 = 2;

/// Marks system blocks that concern every muscle.
const ALL_MUSCLES: &str = "all";

/// One neighbour of an entity, with the edge direction seen from that entity.
struct Link<'a> {
	kind: EntityKind,
	entity: &'a Entity,
	relation: Relation,
	outgoing: bool,
	intensity: Option<Intensity>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit<'a> {
	pub kind: EntityKind,
	pub entity: &'a Entity,
	pub score: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentStats {
	pub per_kind: BTreeMap<EntityKind, usize>,
	pub total: usize,
}

#[derive(Clone, Copy)]
pub struct DataResolver<'a> {
	store: &'a ContentStore,
}

impl<'a> DataResolver<'a> {
	pub fn new(store: &'a ContentStore) -> Self {
		Self { store }
	}

	pub fn resolve_entity(&self, kind: EntityKind, id: &str) -> Option<&'a Entity> {
		self.store.get(kind, id)
	}

	pub fn all_entities(&self, kind: EntityKind) -> &'a [Entity] {
		self.store.all(kind)
	}

	/// Breadth-first expansion from `kind:id`, at most `max_depth` hops.
	/// Unknown roots give an empty graph.
	pub fn build_relationship_graph(
		&self,
		kind: EntityKind,
		id: &str,
		max_depth: u32,
	) -> RelationGraph {
		let mut graph = RelationGraph::default();
		let Some(root) = self.resolve_entity(kind, id) else {
			debug!("no {kind} `{id}`, nothing to traverse");
			return graph;
		};

		let root_id = NodeId::new(kind, id);
		let mut visited: HashSet<NodeId> = HashSet::from([root_id.clone()]);
		let mut seen_edges: HashSet<(NodeId, NodeId, Relation)> = HashSet::new();
		let mut queue = VecDeque::from([(kind, root, root_id.clone(), 0u32)]);
		graph.nodes.push(GraphNode {
			id: root_id,
			kind,
			entity: root.clone(),
			level: 0,
		});

		while let Some((kind, entity, node_id, level)) = queue.pop_front() {
			if level >= max_depth {
				continue;
			}
			for link in self.links(kind, entity) {
				let other = NodeId::new(link.kind, &link.entity.id);
				if visited.insert(other.clone()) {
					graph.nodes.push(GraphNode {
						id: other.clone(),
						kind: link.kind,
						entity: link.entity.clone(),
						level: level + 1,
					});
					queue.push_back((link.kind, link.entity, other.clone(), level + 1));
				}

				let (source, target) = if link.outgoing {
					(node_id.clone(), other)
				} else {
					(other, node_id.clone())
				};
				if seen_edges.insert((source.clone(), target.clone(), link.relation)) {
					graph.edges.push(GraphEdge {
						source,
						target,
						relation: link.relation,
						intensity: link.intensity,
					});
				}
			}
		}
		graph
	}

	/// Direct neighbours of `kind:id`, grouped by kind.
	pub fn related_entities(
		&self,
		kind: EntityKind,
		id: &str,
	) -> BTreeMap<EntityKind, Vec<&'a Entity>> {
		let mut related: BTreeMap<EntityKind, Vec<&'a Entity>> = BTreeMap::new();
		let Some(entity) = self.resolve_entity(kind, id) else {
			return related;
		};
		for link in self.links(kind, entity) {
			let bucket = related.entry(link.kind).or_default();
			if !bucket.iter().any(|e| e.id == link.entity.id) {
				bucket.push(link.entity);
			}
		}
		related
	}

	/// Entities of `kinds` matching `query`, best match first.
	pub fn search(&self, query: &str, kinds: &[EntityKind]) -> Vec<SearchHit<'a>> {
		let lowered = query.trim().to_lowercase();
		if lowered.is_empty() {
			return Vec::new();
		}
		let query = lowered.as_str();
		let mut hits: Vec<SearchHit<'a>> = kinds
			.iter()
			.flat_map(|&kind| {
				self.all_entities(kind).iter().map(move |entity| SearchHit {
					kind,
					entity,
					score: search_score(entity, query),
				})
			})
			.filter(|hit| hit.score > 0)
			.collect();
		hits.sort_by(|a, b| b.score.cmp(&a.score));
		hits
	}

	pub fn statistics(&self) -> ContentStats {
		let per_kind: BTreeMap<EntityKind, usize> = EntityKind::ALL
			.iter()
			.map(|&kind| (kind, self.all_entities(kind).len()))
			.collect();
		let total = per_kind.values().sum();
		ContentStats { per_kind, total }
	}

	fn links(&self, kind: EntityKind, entity: &'a Entity) -> Vec<Link<'a>> {
		let mut links = Vec::new();
		match kind {
			EntityKind::Muscle => {
				for pain in self.all_entities(EntityKind::Pain) {
					for area in pain.affected_areas.iter().filter(|a| a.muscle_id == entity.id) {
						links.push(Link {
							kind: EntityKind::Pain,
							entity: pain,
							relation: Relation::Affects,
							outgoing: false,
							intensity: Some(area.intensity),
						});
					}
				}
				self.referencing(
					&mut links,
					EntityKind::Exercise,
					Relation::Targets,
					|e| &e.muscle_ids,
					&entity.id,
				);
				self.referencing(
					&mut links,
					EntityKind::Goal,
					Relation::Targets,
					|e| &e.muscle_ids,
					&entity.id,
				);
				for block_kind in EntityKind::ALL.into_iter().filter(|k| k.is_system_block()) {
					self.referencing(
						&mut links,
						block_kind,
						Relation::Involves,
						|e| &e.related_muscles,
						&entity.id,
					);
				}
			}
			EntityKind::Pain => {
				for area in &entity.affected_areas {
					if let Some(muscle) = self.resolve_entity(EntityKind::Muscle, &area.muscle_id) {
						links.push(Link {
							kind: EntityKind::Muscle,
							entity: muscle,
							relation: Relation::Affects,
							outgoing: true,
							intensity: Some(area.intensity),
						});
					}
				}
				self.referenced(
					&mut links,
					EntityKind::Exercise,
					Relation::Relieves,
					false,
					&entity.exercise_ids,
				);
				self.referenced(
					&mut links,
					EntityKind::Goal,
					Relation::Addresses,
					false,
					&entity.goal_ids,
				);
			}
			EntityKind::Exercise => {
				self.referenced(
					&mut links,
					EntityKind::Muscle,
					Relation::Targets,
					true,
					&entity.muscle_ids,
				);
				for pain in self.all_entities(EntityKind::Pain) {
					if pain.exercise_ids.contains(&entity.id) {
						links.push(Link {
							kind: EntityKind::Pain,
							entity: pain,
							relation: Relation::Relieves,
							outgoing: true,
							intensity: None,
						});
					}
				}
				self.referencing(
					&mut links,
					EntityKind::Goal,
					Relation::Includes,
					|e| &e.exercise_ids,
					&entity.id,
				);
				for block_kind in EntityKind::ALL.into_iter().filter(|k| k.is_system_block()) {
					self.referencing(
						&mut links,
						block_kind,
						Relation::Involves,
						|e| &e.exercise_ids,
						&entity.id,
					);
				}
			}
			EntityKind::Goal => {
				self.referenced(
					&mut links,
					EntityKind::Muscle,
					Relation::Targets,
					true,
					&entity.muscle_ids,
				);
				self.referenced(
					&mut links,
					EntityKind::Exercise,
					Relation::Includes,
					true,
					&entity.exercise_ids,
				);
				for pain in self.all_entities(EntityKind::Pain) {
					if pain.goal_ids.contains(&entity.id) {
						links.push(Link {
							kind: EntityKind::Pain,
							entity: pain,
							relation: Relation::Addresses,
							outgoing: true,
							intensity: None,
						});
					}
				}
			}
			EntityKind::Nervous
			| EntityKind::Respiratory
			| EntityKind::Cardiovascular
			| EntityKind::Gadget => {
				let muscles: Vec<String> = entity
					.related_muscles
					.iter()
					.filter(|id| id.as_str() != ALL_MUSCLES)
					.cloned()
					.collect();
				self.referenced(&mut links, EntityKind::Muscle, Relation::Involves, true, &muscles);
				self.referenced(
					&mut links,
					EntityKind::Exercise,
					Relation::Involves,
					true,
					&entity.exercise_ids,
				);
			}
		}
		links
	}

	/// Entities of `kind` named by `ids`; ids that do not resolve are skipped.
	fn referenced(
		&self,
		links: &mut Vec<Link<'a>>,
		kind: EntityKind,
		relation: Relation,
		outgoing: bool,
		ids: &[String],
	) {
		for id in ids {
			if let Some(entity) = self.resolve_entity(kind, id) {
				links.push(Link {
					kind,
					entity,
					relation,
					outgoing,
					intensity: None,
				});
			}
		}
	}

	/// Entities of `kind` whose `field` lists `id`; the edge points at `id`.
	fn referencing(
		&self,
		links: &mut Vec<Link<'a>>,
		kind: EntityKind,
		relation: Relation,
		field: impl Fn(&Entity) -> &Vec<String>,
		id: &str,
	) {
		for entity in self.all_entities(kind) {
			if field(entity).iter().any(|r| r == id) {
				links.push(Link {
					kind,
					entity,
					relation,
					outgoing: false,
					intensity: None,
				});
			}
		}
	}
}

/// `query` must already be lowercased.
fn search_score(entity: &Entity, query: &str) -> u32 {
	let mut score = 0;
	let title = entity.title.to_lowercase();
	if title.starts_with(query) {
		score += TITLE_PREFIX_SCORE;
	} else if title.contains(query) {
		score += TITLE_SCORE;
	}
	let secondary = [entity.title_en.as_deref(), entity.latin_name.as_deref()];
	if secondary
		.into_iter()
		.flatten()
		.any(|s| s.to_lowercase().contains(query))
	{
		score += SECONDARY_TITLE_SCORE;
	}
	if entity.content.to_lowercase().contains(query) {
		score += CONTENT_SCORE;
	}
	if entity.tags.iter().any(|t| t.to_lowercase().contains(query)) {
		score += TAG_SCORE;
	}
	score
}

#[cfg(test)]
mod tests {
	use super::*;

	const FIXTURE: &str = r#"{
		"muscles": [
			{ "id": "trapezius-upper", "title": "Upper trapezius", "content": "Elevates the shoulder blade." },
			{ "id": "levator-scapulae", "title": "Levator scapulae", "content": "Lifts the scapula." },
			{ "id": "diaphragm", "title": "Diaphragm", "content": "Main breathing muscle." }
		],
		"pain": [
			{
				"id": "neck-pain",
				"title": "Neck pain",
				"content": "Typical for office workers.",
				"affected_areas": [
					{ "muscle_id": "trapezius-upper", "intensity": "high" },
					{ "muscle_id": "levator-scapulae", "intensity": "high" },
					{ "muscle_id": "ghost-muscle", "intensity": "low" }
				],
				"exercise_ids": ["chin-tuck", "missing-exercise"],
				"goal_ids": ["improve-posture"]
			}
		],
		"respiratory": [
			{ "id": "diaphragm-block", "title": "Diaphragm block", "related_muscles": ["diaphragm", "all"] }
		],
		"exercises": [
			{ "id": "chin-tuck", "title": "Chin tuck", "muscle_ids": ["levator-scapulae"], "tags": ["neck"] }
		],
		"goals": [
			{
				"id": "improve-posture",
				"title": "Improve posture",
				"muscle_ids": ["trapezius-upper"],
				"exercise_ids": ["chin-tuck"]
			}
		]
	}"#;

	fn store() -> ContentStore {
		ContentStore::from_json(FIXTURE).unwrap()
	}

	fn ids(graph: &RelationGraph) -> Vec<&str> {
		graph.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn unknown_entities_resolve_to_none() {
		let store = store();
		let resolver = DataResolver::new(&store);
		assert!(resolver.resolve_entity(EntityKind::Muscle, "nope").is_none());
		assert!(resolver.resolve_entity(EntityKind::Gadget, "trapezius-upper").is_none());
		assert!(resolver.build_relationship_graph(EntityKind::Pain, "nope", 3).is_empty());
		assert!(resolver.related_entities(EntityKind::Goal, "nope").is_empty());
	}

	#[test]
	fn neck_pain_links_both_shoulder_muscles() {
		let store = store();
		let graph = DataResolver::new(&store)
			.build_relationship_graph(EntityKind::Muscle, "trapezius-upper", 2);
		let ids = ids(&graph);
		assert!(ids.contains(&"muscle:trapezius-upper"));
		assert!(ids.contains(&"pain:neck-pain"));
		assert!(ids.contains(&"muscle:levator-scapulae"));
		assert!(graph.contains_edge("pain:neck-pain", "muscle:trapezius-upper"));
		assert!(graph.contains_edge("pain:neck-pain", "muscle:levator-scapulae"));
	}

	#[test]
	fn bundled_content_links_both_shoulder_muscles() {
		let store = ContentStore::bundled().unwrap();
		let graph = DataResolver::new(&store)
			.build_relationship_graph(EntityKind::Muscle, "trapezius-upper", 2);
		assert!(graph.contains_edge("pain:neck-pain", "muscle:trapezius-upper"));
		assert!(graph.contains_edge("pain:neck-pain", "muscle:levator-scapulae"));
	}

	#[test]
	fn depth_zero_is_just_the_root() {
		let store = store();
		let graph = DataResolver::new(&store)
			.build_relationship_graph(EntityKind::Pain, "neck-pain", 0);
		assert_eq!(ids(&graph), vec!["pain:neck-pain"]);
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn levels_follow_breadth_first_order() {
		let store = store();
		let graph = DataResolver::new(&store)
			.build_relationship_graph(EntityKind::Muscle, "trapezius-upper", 1);
		let pain = graph.node(&NodeId::from("pain:neck-pain")).unwrap();
		assert_eq!(pain.level, 1);
		// levator is two hops away
		assert!(graph.node(&NodeId::from("muscle:levator-scapulae")).is_none());
	}

	#[test]
	fn cyclic_references_terminate_without_duplicates() {
		let store = store();
		let resolver = DataResolver::new(&store);
		for depth in 0..8 {
			for (kind, id) in [
				(EntityKind::Muscle, "trapezius-upper"),
				(EntityKind::Pain, "neck-pain"),
				(EntityKind::Goal, "improve-posture"),
				(EntityKind::Exercise, "chin-tuck"),
			] {
				let graph = resolver.build_relationship_graph(kind, id, depth);
				let unique: HashSet<&str> = ids(&graph).into_iter().collect();
				assert_eq!(unique.len(), graph.nodes.len());
				let (_, dangling) = graph.partition_edges();
				assert!(dangling.is_empty(), "dangling edge from {id} at depth {depth}");
			}
		}
	}

	#[test]
	fn edge_direction_does_not_depend_on_the_root() {
		let store = store();
		let resolver = DataResolver::new(&store);
		let from_goal = resolver.build_relationship_graph(EntityKind::Goal, "improve-posture", 1);
		let from_exercise = resolver.build_relationship_graph(EntityKind::Exercise, "chin-tuck", 1);
		assert!(from_goal.contains_edge("goal:improve-posture", "exercise:chin-tuck"));
		assert!(from_exercise.contains_edge("goal:improve-posture", "exercise:chin-tuck"));
		assert!(from_exercise.contains_edge("exercise:chin-tuck", "pain:neck-pain"));
	}

	#[test]
	fn intensity_is_carried_on_affect_edges() {
		let store = store();
		let graph = DataResolver::new(&store)
			.build_relationship_graph(EntityKind::Pain, "neck-pain", 1);
		let edge = graph
			.edges
			.iter()
			.find(|e| e.target.as_str() == "muscle:trapezius-upper")
			.unwrap();
		assert_eq!(edge.intensity, Some(Intensity::High));
		assert_eq!(edge.label(), "high intensity");
		// unresolved references are skipped
		assert!(graph.node(&NodeId::from("muscle:ghost-muscle")).is_none());
		assert!(graph.node(&NodeId::from("exercise:missing-exercise")).is_none());
	}

	#[test]
	fn wildcard_muscle_reference_is_not_expanded() {
		let store = store();
		let graph = DataResolver::new(&store)
			.build_relationship_graph(EntityKind::Respiratory, "diaphragm-block", 3);
		assert_eq!(ids(&graph), vec!["respiratory:diaphragm-block", "muscle:diaphragm"]);
	}

	#[test]
	fn related_entities_are_grouped_by_kind() {
		let store = store();
		let related = DataResolver::new(&store).related_entities(EntityKind::Pain, "neck-pain");
		assert_eq!(related[&EntityKind::Muscle].len(), 2);
		assert_eq!(related[&EntityKind::Exercise][0].id, "chin-tuck");
		assert_eq!(related[&EntityKind::Goal][0].id, "improve-posture");
	}

	#[test]
	fn search_ranks_title_prefix_highest() {
		let store = store();
		let hits = DataResolver::new(&store).search("neck", &EntityKind::ALL);
		assert_eq!(hits[0].entity.id, "neck-pain");
		assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
		assert!(hits.iter().any(|h| h.entity.id == "chin-tuck"));
	}

	#[test]
	fn exact_title_beats_description_match() {
		let store = store();
		let resolver = DataResolver::new(&store);
		let title_hits = resolver.search("Diaphragm", &[EntityKind::Muscle]);
		let content_hits = resolver.search("breathing", &[EntityKind::Muscle]);
		assert!(title_hits[0].score >= content_hits[0].score);
	}

	#[test]
	fn search_respects_requested_kinds_and_empty_queries() {
		let store = store();
		let resolver = DataResolver::new(&store);
		assert!(resolver.search("neck", &[EntityKind::Goal]).is_empty());
		assert!(resolver.search("   ", &EntityKind::ALL).is_empty());
	}

	#[test]
	fn statistics_count_every_table() {
		let store = store();
		let stats = DataResolver::new(&store).statistics();
		assert_eq!(stats.per_kind[&EntityKind::Muscle], 3);
		assert_eq!(stats.per_kind[&EntityKind::Gadget], 0);
		assert_eq!(stats.total, 7);
	}
}
