use std::time::Duration;

use sift_domain::QueryAnalysis;

use super::{RankedHit, SearchOutcome, attribute_kind_label};

/// Structured reply for one `smart_search` call. Serializes to either the
/// success envelope or the error envelope, distinguished by `success`.
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum SearchReply {
	Success(Box<SearchSuccess>),
	Failure(SearchFailure),
}

#[derive(Debug, serde::Serialize)]
pub struct SearchSuccess {
	pub success: bool,
	pub count: usize,
	pub results: Vec<RankedHit>,
	pub query: String,
	pub analysis: AnalysisReport,
	pub next_steps: NextSteps,
	pub metadata: SearchMetadata,
}

#[derive(Debug, serde::Serialize)]
pub struct AnalysisReport {
	pub detected_method: String,
	pub confidence: f32,
	pub used_methods: Vec<String>,
	pub attributes: Vec<AttributeReport>,
	pub temporal_patterns: Vec<String>,
	pub exact_phrases: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct AttributeReport {
	pub kind: String,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct NextSteps {
	pub suggested: String,
	pub alternatives: Vec<String>,
	pub examples: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SearchMetadata {
	pub execution_time_ms: u64,
	pub search_methods: Vec<String>,
	pub primary_method: String,
	pub fallback_enabled: bool,
	pub max_results_requested: u32,
	pub query_analysis_confidence: f32,
	pub errors: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SearchFailure {
	pub success: bool,
	pub error: String,
	pub query: String,
	pub possible_causes: Vec<String>,
	pub suggestions: Vec<String>,
	pub examples: Vec<String>,
}

impl SearchReply {
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}
}

pub(crate) fn build(outcome: SearchOutcome, elapsed: Duration) -> SearchReply {
	if outcome.results.is_empty() {
		return no_results(outcome);
	}

	let suggested = outcome
		.results
		.first()
		.map(|hit| format!("read_note(\"{}\")", hit.note_id))
		.unwrap_or_default();
	let examples = vec![
		format!("smart_search(\"{} related concepts\")", outcome.query),
		format!("smart_search(\"{}\", forceMethod=\"keyword\")", outcome.query),
	];

	SearchReply::Success(Box::new(SearchSuccess {
		success: true,
		count: outcome.results.len(),
		metadata: SearchMetadata {
			execution_time_ms: elapsed.as_millis() as u64,
			search_methods: outcome.used_methods.clone(),
			primary_method: outcome.primary_method.as_str().to_string(),
			fallback_enabled: outcome.fallback_enabled,
			max_results_requested: outcome.max_results,
			query_analysis_confidence: outcome.analysis.confidence,
			errors: outcome.errors,
		},
		analysis: analysis_report(&outcome.analysis, outcome.used_methods),
		next_steps: NextSteps {
			suggested,
			alternatives: outcome.analysis.suggestions,
			examples,
		},
		results: outcome.results,
		query: outcome.query,
	}))
}

fn no_results(outcome: SearchOutcome) -> SearchReply {
	let mut possible_causes = vec![
		format!("Primary method ({}) found no matches", outcome.primary_method.as_str()),
		"Search terms may be too specific".to_string(),
		"Content may not exist in the knowledge base".to_string(),
	];

	possible_causes.extend(outcome.errors.iter().map(|error| format!("Search error: {error}")));

	let mut suggestions = fallback_suggestions(&outcome.analysis);

	suggestions.push("Try the suggested alternative queries below".to_string());

	let mut examples = outcome.analysis.suggestions.clone();

	if outcome.analysis.terms.len() >= 2 {
		examples.push(format!(
			"smart_search(\"{} {}\")",
			outcome.analysis.terms[0], outcome.analysis.terms[1]
		));
	}
	examples.push("smart_search(\"general topic\") for broader results".to_string());

	SearchReply::Failure(SearchFailure {
		success: false,
		error: format!("No results found for query: \"{}\"", outcome.query),
		query: outcome.query,
		possible_causes,
		suggestions,
		examples,
	})
}

fn fallback_suggestions(analysis: &QueryAnalysis) -> Vec<String> {
	let mut suggestions = Vec::new();

	if analysis.terms.len() > 1 {
		let keywords =
			analysis.terms.iter().take(3).map(String::as_str).collect::<Vec<_>>().join(" OR ");

		suggestions.push(format!("Try individual keywords: {keywords}"));

		if let Some(first) = analysis.terms.first() {
			suggestions.push(format!("Try broader search: {first} concepts"));
		}
	}
	if let Some(attribute) = analysis.attributes.first() {
		suggestions.push(format!("Search content instead: {}", attribute.name));
	}
	if let Some(phrase) = analysis.exact_phrases.first() {
		suggestions.push(format!("Try without quotes: {phrase}"));
	}
	suggestions.push("Check spelling of search terms".to_string());
	suggestions.push("Try simpler or more general terms".to_string());
	suggestions.push("Use different keywords for the same concept".to_string());

	suggestions
}

fn analysis_report(analysis: &QueryAnalysis, used_methods: Vec<String>) -> AnalysisReport {
	AnalysisReport {
		detected_method: analysis.primary_method.as_str().to_string(),
		confidence: analysis.confidence,
		used_methods,
		attributes: analysis
			.attributes
			.iter()
			.map(|attribute| AttributeReport {
				kind: attribute_kind_label(attribute.kind).to_string(),
				name: attribute.name.clone(),
				value: attribute.value.clone(),
			})
			.collect(),
		temporal_patterns: analysis.temporal_patterns.clone(),
		exact_phrases: analysis.exact_phrases.clone(),
	}
}

pub(crate) fn invalid_parameter(query: &str, message: &str) -> SearchReply {
	SearchReply::Failure(SearchFailure {
		success: false,
		error: message.to_string(),
		query: query.to_string(),
		possible_causes: vec![
			"A required parameter is missing or out of range".to_string(),
			"No search was attempted".to_string(),
		],
		suggestions: vec![
			"Provide a non-empty query string".to_string(),
			"Keep maxResults between 1 and 50".to_string(),
		],
		examples: vec![
			"smart_search(\"project planning notes\")".to_string(),
			"smart_search(\"#book\", maxResults=20)".to_string(),
		],
	})
}

pub(crate) fn internal_failure(query: &str) -> SearchReply {
	SearchReply::Failure(SearchFailure {
		success: false,
		error: "Smart search failed due to an internal error.".to_string(),
		query: query.to_string(),
		possible_causes: vec![
			"A search backend may be unreachable".to_string(),
			"The configured backend endpoints may be wrong".to_string(),
		],
		suggestions: vec![
			"Retry the search".to_string(),
			"Check the service logs for details".to_string(),
		],
		examples: Vec::new(),
	})
}
