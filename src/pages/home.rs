use std::rc::Rc;

use leptos::prelude::*;
use log::error;

use crate::components::layer_switcher::LayerPanel;
use crate::components::relationship_graph::RelationshipGraph;
use crate::content::{ContentStore, DataResolver, EntityKind};

const SEARCH_LIMIT: usize = 12;
const DEFAULT_ROOT: (EntityKind, &str) = (EntityKind::Muscle, "trapezius-upper");

#[derive(Clone, Debug, PartialEq)]
struct SearchRow {
	kind: EntityKind,
	id: String,
	title: String,
	icon: &'static str,
}

fn load_store() -> Rc<ContentStore> {
	let store = ContentStore::bundled().unwrap_or_else(|err| {
		error!("bundled content failed to load: {err}");
		ContentStore::default()
	});
	Rc::new(store)
}

/// Atlas page: search, body layers and the relationship graph.
#[component]
pub fn Home() -> impl IntoView {
	let store = load_store();
	let stats = DataResolver::new(&store).statistics();
	let footer = if store.is_empty() {
		"No content loaded".to_string()
	} else {
		let per_kind = stats
			.per_kind
			.iter()
			.filter(|(_, count)| **count > 0)
			.map(|(kind, count)| format!("{count} {kind}"))
			.collect::<Vec<_>>()
			.join(" · ");
		format!("{} entries: {per_kind}", stats.total)
	};

	let root = RwSignal::new(Some((DEFAULT_ROOT.0, DEFAULT_ROOT.1.to_string())));
	let on_select = Callback::new(move |selected: (EntityKind, String)| root.set(Some(selected)));

	let query = RwSignal::new(String::new());
	let results = RwSignal::new(Vec::<SearchRow>::new());
	let search_store = store.clone();
	let on_search = move |ev| {
		let text = event_target_value(&ev);
		let rows = DataResolver::new(&search_store)
			.search(&text, &EntityKind::ALL)
			.into_iter()
			.take(SEARCH_LIMIT)
			.map(|hit| SearchRow {
				kind: hit.kind,
				id: hit.entity.id.clone(),
				title: hit.entity.display_title().to_string(),
				icon: hit.kind.category().icon(),
			})
			.collect();
		query.set(text);
		results.set(rows);
	};

	let pick = move |row: &SearchRow| {
		let selected = (row.kind, row.id.clone());
		move |_| {
			on_select.run(selected.clone());
			query.set(String::new());
			results.set(Vec::new());
		}
	};

	view! {
		<div class="atlas">
			<header class="atlas-header">
				<h1>"Anatomy Atlas"</h1>
				<div class="atlas-search">
					<input
						type="search"
						placeholder="Search muscles, pain, exercises..."
						prop:value=move || query.get()
						on:input=on_search
					/>
					<ul class="atlas-search-results">
						{move || {
							results
								.get()
								.iter()
								.map(|row| {
									view! {
										<li on:click=pick(row)>
											{row.icon}
											" "
											{row.title.clone()}
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</div>
			</header>

			<main class="atlas-main">
				<LayerPanel store=store.clone() on_select=on_select />
				<RelationshipGraph store=store root=root />
			</main>

			<footer class="atlas-footer">
				{footer}
			</footer>
		</div>
	}
}
