pub mod entity_facts;
pub mod layer_switcher;
pub mod onboarding;
pub mod relationship_graph;
