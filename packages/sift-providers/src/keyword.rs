use std::time::Duration;

use color_eyre::Result;
use reqwest::Client;
use serde_json::Value;

use crate::BackendHit;

pub async fn search(
	cfg: &sift_config::BackendEndpoint,
	query: &str,
	max_results: u32,
	include_archived: bool,
) -> Result<Vec<BackendHit>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"query": query,
		"maxResults": max_results,
		"includeArchived": include_archived,
	});
	let res = client
		.post(url)
		.headers(crate::request_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	crate::parse_legacy_response(json, "Keyword")
}

#[cfg(test)]
mod tests {
	use crate::parse_legacy_response;

	#[test]
	fn parses_results_object() {
		let json = serde_json::json!({
			"results": [{ "noteId": "k1", "title": "Keyword match", "score": 0.7 }]
		});
		let hits = parse_legacy_response(json, "Keyword").expect("parse failed");

		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].score, Some(0.7));
	}
}
