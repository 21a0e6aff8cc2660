pub mod attribute;
pub mod keyword;
pub mod semantic;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// One candidate note as reported by a search backend, normalized from the
/// backend's native payload at this boundary. Display defaults and scoring
/// fallbacks are applied by the service layer, not here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackendHit {
	pub note_id: String,
	pub title: Option<String>,
	pub preview: Option<String>,
	pub score: Option<f32>,
	pub similarity: Option<f32>,
	pub date_created: Option<OffsetDateTime>,
	pub date_modified: Option<OffsetDateTime>,
	pub parent_id: Option<String>,
}

pub(crate) fn request_headers(
	api_key: Option<&str>,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = api_key {
		headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	}
	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header values must be strings."));
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Parse the legacy keyword/attribute response shape: either a bare JSON
/// string carrying the error message, or an object whose `results` array
/// holds the hits. An object without `results` means zero hits.
pub(crate) fn parse_legacy_response(json: Value, backend: &str) -> Result<Vec<BackendHit>> {
	match json {
		Value::String(message) => Err(eyre::eyre!("{backend} backend failed: {message}")),
		other => match other.get("results") {
			Some(results) => parse_hits(results),
			None => Ok(Vec::new()),
		},
	}
}

pub(crate) fn parse_hits(value: &Value) -> Result<Vec<BackendHit>> {
	let Some(items) = value.as_array() else {
		return Err(eyre::eyre!("Search results must be an array."));
	};

	items.iter().map(parse_hit).collect()
}

fn parse_hit(item: &Value) -> Result<BackendHit> {
	let note_id = item
		.get("noteId")
		.and_then(|v| v.as_str())
		.ok_or_else(|| eyre::eyre!("Search hit is missing noteId."))?;

	Ok(BackendHit {
		note_id: note_id.to_string(),
		title: string_field(item, "title"),
		// Older backends report `contentPreview` instead of `preview`.
		preview: string_field(item, "preview").or_else(|| string_field(item, "contentPreview")),
		score: float_field(item, "score"),
		similarity: float_field(item, "similarity"),
		date_created: date_field(item, "dateCreated"),
		date_modified: date_field(item, "dateModified"),
		parent_id: string_field(item, "parentId"),
	})
}

fn string_field(item: &Value, key: &str) -> Option<String> {
	item.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn float_field(item: &Value, key: &str) -> Option<f32> {
	item.get(key).and_then(|v| v.as_f64()).map(|v| v as f32)
}

fn date_field(item: &Value, key: &str) -> Option<OffsetDateTime> {
	let raw = item.get(key)?.as_str()?;

	OffsetDateTime::parse(raw, &Rfc3339).ok()
}
