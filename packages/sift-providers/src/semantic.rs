use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use crate::BackendHit;

pub async fn search(
	cfg: &sift_config::BackendEndpoint,
	query: &str,
	parent_note_id: Option<&str>,
	max_results: u32,
	summarize: bool,
) -> Result<Vec<BackendHit>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"query": query,
		"parentNoteId": parent_note_id,
		"maxResults": max_results,
		"summarize": summarize,
	});
	let res = client
		.post(url)
		.headers(crate::request_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_semantic_response(json)
}

fn parse_semantic_response(json: Value) -> Result<Vec<BackendHit>> {
	let success = json.get("success").and_then(|v| v.as_bool()).unwrap_or(false);

	if !success {
		let message = json
			.get("error")
			.and_then(|v| v.as_str())
			.unwrap_or("Semantic backend reported an unspecified failure.");

		return Err(eyre::eyre!("{message}"));
	}

	match json.get("result").and_then(|v| v.get("results")) {
		Some(results) => crate::parse_hits(results),
		None => Ok(Vec::new()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_successful_response() {
		let json = serde_json::json!({
			"success": true,
			"result": {
				"results": [
					{ "noteId": "n1", "title": "First", "similarity": 0.91 },
					{ "noteId": "n2", "title": "Second", "similarity": 0.64 }
				]
			}
		});
		let hits = parse_semantic_response(json).expect("parse failed");

		assert_eq!(hits.len(), 2);
		assert_eq!(hits[0].note_id, "n1");
		assert_eq!(hits[1].similarity, Some(0.64));
	}

	#[test]
	fn successful_response_without_results_is_empty() {
		let hits =
			parse_semantic_response(serde_json::json!({ "success": true })).expect("parse failed");

		assert!(hits.is_empty());
	}

	#[test]
	fn failure_carries_backend_error_message() {
		let json = serde_json::json!({ "success": false, "error": "embedding model unavailable" });
		let err = parse_semantic_response(json).expect_err("failure expected");

		assert!(err.to_string().contains("embedding model unavailable"));
	}

	#[test]
	fn missing_success_flag_is_a_failure() {
		assert!(parse_semantic_response(serde_json::json!({ "result": {} })).is_err());
	}
}
