use std::collections::HashMap;
use std::rc::Rc;

use leptos::html::Div;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;

use super::layers::LayerId;
use super::stage::DomStage;
use super::switcher::LayerSwitcher;
use crate::components::entity_facts::{FactList, Facts};
use crate::content::{ContentStore, EntityKind};

const SUMMARY_CHARS: usize = 120;

#[derive(Clone, Debug)]
struct Card {
	kind: EntityKind,
	id: String,
	title: String,
	summary: String,
	facts: Facts,
}

fn cards_by_layer(store: &ContentStore) -> HashMap<LayerId, Vec<Card>> {
	LayerId::ALL
		.into_iter()
		.map(|layer| {
			let kind = layer.entity_kind();
			let cards = store
				.all(kind)
				.iter()
				.map(|entity| {
					let mut summary: String = entity.content.chars().take(SUMMARY_CHARS).collect();
					if entity.content.chars().count() > SUMMARY_CHARS {
						summary.push('…');
					}
					Card {
						kind,
						id: entity.id.clone(),
						title: entity.display_title().to_string(),
						summary,
						facts: Facts::of(entity),
					}
				})
				.collect();
			(layer, cards)
		})
		.collect()
}

/// Layer buttons, the body illustration and the active layer's cards.
/// Picking a card reports its entity through `on_select`.
#[component]
pub fn LayerPanel(
	store: Rc<ContentStore>,
	on_select: Callback<(EntityKind, String)>,
) -> impl IntoView {
	let front_ref = NodeRef::<Div>::new();
	let back_ref = NodeRef::<Div>::new();
	let switcher = Rc::new(LayerSwitcher::new(DomStage::new(front_ref, back_ref)));
	let active = RwSignal::new(None::<LayerId>);
	let switching = RwSignal::new(false);
	let cards = cards_by_layer(&store);

	let request = move |layer: LayerId| {
		let switcher = switcher.clone();
		spawn_local(async move {
			switching.set(true);
			// failures are logged by the switcher and leave the old layer active
			if let Ok(outcome) = switcher.switch_to(layer.as_str()).await {
				debug!("layer request {layer}: {outcome:?}");
			}
			active.set(switcher.current());
			switching.set(switcher.is_switching());
		});
	};

	let request_initial = request.clone();
	Effect::new(move |_| {
		if front_ref.get().is_some() {
			request_initial(LayerId::Muscles);
		}
	});

	let buttons = LayerId::ALL
		.into_iter()
		.map(|layer| {
			let request = request.clone();
			let def = layer.def();
			view! {
				<button
					class="layer-button"
					class:active=move || active.get() == Some(layer)
					style:border-color=def.color
					title=def.name_en
					on:click=move |_| request(layer)
				>
					<span class="layer-icon">{def.icon}</span>
					<span class="layer-name">{def.name}</span>
				</button>
			}
		})
		.collect_view();

	let card_list = move || {
		let layer = active.get()?;
		let cards = cards.get(&layer)?.clone();
		Some(
			cards
				.into_iter()
				.map(|card| {
					let Card {
						kind,
						id,
						title,
						summary,
						facts,
					} = card;
					view! {
						<li class="layer-card" on:click=move |_| on_select.run((kind, id.clone()))>
							<h4>{title}</h4>
							<p>{summary}</p>
							<FactList facts=facts />
						</li>
					}
				})
				.collect_view(),
		)
	};

	view! {
		<section class="layer-panel" class:busy=move || switching.get()>
			<nav class="layer-buttons">{buttons}</nav>
			<div class="body-view">
				<div
					class="view-indicators"
					class:hidden=move || !active.get().is_some_and(|l| l.def().has_two_views())
				>
					<span>"Front"</span>
					<span>"Back"</span>
				</div>
				<div node_ref=front_ref id="front-svg-wrapper" class="svg-wrapper"></div>
				<div node_ref=back_ref id="back-svg-wrapper" class="svg-wrapper"></div>
			</div>
			<header class="layer-header">
				<h2>
					{move || active.get().map(|l| format!("{} {}", l.def().icon, l.def().name))}
				</h2>
				<p>{move || active.get().map(|l| l.def().description)}</p>
			</header>
			<ul class="layer-cards">{card_list}</ul>
		</section>
	}
}
