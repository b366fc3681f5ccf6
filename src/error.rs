//! Error types for the content store and the layer switcher.

use thiserror::Error;

use crate::content::EntityKind;

#[derive(Debug, Error)]
pub enum ContentError {
	#[error("content document is not valid JSON: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("{kind} entry #{position} has no id")]
	MissingId { kind: EntityKind, position: usize },
	#[error("duplicate {kind} id `{id}`")]
	DuplicateId { kind: EntityKind, id: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwitchError {
	#[error("unknown layer `{0}`")]
	UnknownLayer(String),
	#[error("layer container `{0}` is not mounted")]
	MissingContainer(&'static str),
	#[error("illustration `{0}` did not load")]
	AssetLoad(String),
}
