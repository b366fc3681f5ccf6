//! Severity, causes and symptoms of a content entry.

use leptos::prelude::*;

use crate::content::{Entity, Severity};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Facts {
	pub severity: Option<Severity>,
	pub causes: Vec<String>,
	pub symptoms: Vec<String>,
}

impl Facts {
	pub fn of(entity: &Entity) -> Self {
		Self {
			severity: entity.severity,
			causes: entity.causes.clone(),
			symptoms: entity.symptoms.clone(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.severity.is_none() && self.causes.is_empty() && self.symptoms.is_empty()
	}
}

fn fact_list(heading: &'static str, items: Vec<String>) -> Option<impl IntoView> {
	if items.is_empty() {
		return None;
	}
	let items = items.into_iter().map(|item| view! { <li>{item}</li> }).collect_view();
	Some(view! {
		<div class="fact-list">
			<h5>{heading}</h5>
			<ul>{items}</ul>
		</div>
	})
}

#[component]
pub fn FactList(facts: Facts) -> impl IntoView {
	if facts.is_empty() {
		return None;
	}
	let Facts {
		severity,
		causes,
		symptoms,
	} = facts;
	let badge = severity.map(|s| {
		view! { <span class=format!("severity severity-{}", s.key())>{s.label()}</span> }
	});
	Some(view! {
		<div class="entity-facts">
			{badge}
			{fact_list("Causes", causes)}
			{fact_list("Symptoms", symptoms)}
		</div>
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::content::{ContentStore, EntityKind};

	#[test]
	fn pain_entries_carry_their_facts() {
		let store = ContentStore::bundled().unwrap();
		let pain = store.get(EntityKind::Pain, "lower-back-pain").unwrap();
		let facts = Facts::of(pain);
		assert_eq!(facts.severity, Some(Severity::Common));
		assert_eq!(facts.causes.len(), 4);
		assert_eq!(facts.symptoms.len(), 3);
	}

	#[test]
	fn muscles_have_no_facts() {
		let store = ContentStore::bundled().unwrap();
		let muscle = store.get(EntityKind::Muscle, "trapezius-upper").unwrap();
		assert!(Facts::of(muscle).is_empty());
	}
}
