pub mod factors;
pub mod fusion;
pub mod response;

use std::time::Instant;

use sift_domain::{AttributeKind, QueryAnalysis, SearchMethod, analyze, preprocess};
use sift_providers::BackendHit;
use time::OffsetDateTime;

pub use response::{
	AnalysisReport, AttributeReport, NextSteps, SearchFailure, SearchMetadata, SearchReply,
	SearchSuccess,
};

use crate::{ServiceError, ServiceResult, SmartSearch};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	pub query: String,
	#[serde(default)]
	pub parent_note_id: Option<String>,
	#[serde(default)]
	pub max_results: Option<u32>,
	#[serde(default)]
	pub force_method: Option<ForceMethod>,
	#[serde(default)]
	pub include_archived: Option<bool>,
	#[serde(default)]
	pub enable_fallback: Option<bool>,
	#[serde(default)]
	pub summarize: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMethod {
	Auto,
	Semantic,
	Keyword,
	Attribute,
	MultiMethod,
}

/// One fused result as presented to the caller. Display defaults are applied
/// here so the envelope never carries empty titles or previews.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RankedHit {
	pub note_id: String,
	pub title: String,
	pub preview: String,
	pub score: f32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub similarity: Option<f32>,
	pub search_method: String,
	pub relevance_factors: Vec<String>,
	#[serde(with = "crate::time_serde::option", skip_serializing_if = "Option::is_none")]
	pub date_created: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option", skip_serializing_if = "Option::is_none")]
	pub date_modified: Option<OffsetDateTime>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<String>,
}

/// One scored hit prior to fusion, tagged with the method that produced it.
#[derive(Clone, Debug)]
pub(crate) struct ScoredCandidate {
	pub(crate) hit: BackendHit,
	pub(crate) method: SearchMethod,
	pub(crate) score: f32,
	pub(crate) factors: Vec<String>,
}

pub(crate) struct SearchOutcome {
	pub(crate) query: String,
	pub(crate) analysis: QueryAnalysis,
	pub(crate) primary_method: SearchMethod,
	pub(crate) results: Vec<RankedHit>,
	pub(crate) used_methods: Vec<String>,
	pub(crate) errors: Vec<String>,
	pub(crate) fallback_enabled: bool,
	pub(crate) max_results: u32,
}

impl SmartSearch {
	/// Run the full routing pipeline for one request. Never returns a raw
	/// error: validation problems and backend failures both come back as
	/// structured reply envelopes.
	pub async fn search(&self, req: SearchRequest) -> SearchReply {
		let started = Instant::now();
		let now = OffsetDateTime::now_utc();

		match self.run(&req, now).await {
			Ok(outcome) => response::build(outcome, started.elapsed()),
			Err(ServiceError::InvalidRequest { message }) =>
				response::invalid_parameter(&req.query, &message),
			Err(err) => {
				tracing::error!(error = %err, query = %req.query, "Smart search failed.");

				response::internal_failure(&req.query)
			},
		}
	}

	async fn run(&self, req: &SearchRequest, now: OffsetDateTime) -> ServiceResult<SearchOutcome> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "query must be a non-empty string.".to_string(),
			});
		}

		let cap = self.cfg.search.max_results_cap;
		let max_results = req.max_results.unwrap_or(self.cfg.search.default_max_results);

		if max_results == 0 || max_results > cap {
			return Err(ServiceError::InvalidRequest {
				message: format!("maxResults must be between 1 and {cap}."),
			});
		}

		let fallback_enabled = req.enable_fallback.unwrap_or(true);
		let analysis = analyze(query);
		let force = req.force_method.unwrap_or(ForceMethod::Auto);
		let mut used_methods: Vec<String> = Vec::new();
		let mut errors: Vec<String> = Vec::new();
		let mut candidates: Vec<ScoredCandidate> = Vec::new();

		if force == ForceMethod::MultiMethod {
			let mut methods = vec![SearchMethod::Semantic, SearchMethod::Keyword];

			if !analysis.attributes.is_empty() {
				methods.push(SearchMethod::Attribute);
			}
			for method in methods {
				self.run_method(RunMethodArgs {
					method,
					analysis: &analysis,
					req,
					budget: max_results,
					now,
					used_methods: &mut used_methods,
					errors: &mut errors,
					candidates: &mut candidates,
				})
				.await;
			}
		} else {
			let (primary, fallbacks) = plan_methods(force, &analysis);
			let primary_failed = !self
				.run_method(RunMethodArgs {
					method: primary,
					analysis: &analysis,
					req,
					budget: max_results,
					now,
					used_methods: &mut used_methods,
					errors: &mut errors,
					candidates: &mut candidates,
				})
				.await;
			let threshold = max_results as f32 * self.cfg.search.fallback_ratio;

			if fallback_enabled && (primary_failed || (candidates.len() as f32) < threshold) {
				for method in fallbacks {
					if used_methods.iter().any(|used| used == method.as_str()) {
						continue;
					}
					if candidates.len() as u32 >= max_results {
						break;
					}

					let budget = self
						.cfg
						.search
						.fallback_floor
						.max(max_results.saturating_sub(candidates.len() as u32));

					self.run_method(RunMethodArgs {
						method,
						analysis: &analysis,
						req,
						budget,
						now,
						used_methods: &mut used_methods,
						errors: &mut errors,
						candidates: &mut candidates,
					})
					.await;
				}
			}
		}

		let mut results = fusion::merge(candidates);

		results.truncate(max_results as usize);

		Ok(SearchOutcome {
			query: query.to_string(),
			primary_method: match force {
				ForceMethod::Semantic => SearchMethod::Semantic,
				ForceMethod::Keyword => SearchMethod::Keyword,
				ForceMethod::Attribute => SearchMethod::Attribute,
				ForceMethod::Auto | ForceMethod::MultiMethod => analysis.primary_method,
			},
			analysis,
			results,
			used_methods,
			errors,
			fallback_enabled,
			max_results,
		})
	}

	/// Dispatch one method to its backend and fold the outcome into the
	/// running collection. Returns false when the backend call failed.
	async fn run_method(&self, args: RunMethodArgs<'_>) -> bool {
		let RunMethodArgs { method, analysis, req, budget, now, used_methods, errors, candidates } =
			args;
		let query = preprocess(&req.query, method);
		let outcome = self.dispatch(method, analysis, req, &query, budget).await;

		match outcome {
			Ok(hits) => {
				used_methods.push(method.as_str().to_string());

				for hit in hits {
					let score = hit.score.or(hit.similarity).unwrap_or(1.0);
					let factors =
						factors::relevance_factors(&hit, &req.query, method, score, now);

					candidates.push(ScoredCandidate { hit, method, score, factors });
				}

				true
			},
			Err(err) => {
				tracing::warn!(method = method.as_str(), error = %err, "Search backend failed.");
				errors.push(format!("{}: {err}", method.as_str()));

				false
			},
		}
	}

	async fn dispatch(
		&self,
		method: SearchMethod,
		analysis: &QueryAnalysis,
		req: &SearchRequest,
		query: &str,
		budget: u32,
	) -> color_eyre::Result<Vec<BackendHit>> {
		match method {
			SearchMethod::Semantic =>
				self.backends
					.semantic
					.search(
						&self.cfg.backends.semantic,
						query,
						req.parent_note_id.as_deref(),
						budget,
						req.summarize.unwrap_or(false),
					)
					.await,
			// Exact-phrase and temporal queries are rewritten into
			// keyword-engine syntax by the preprocessor.
			SearchMethod::Keyword | SearchMethod::ExactPhrase | SearchMethod::Temporal =>
				self.backends
					.keyword
					.search(
						&self.cfg.backends.keyword,
						query,
						budget,
						req.include_archived.unwrap_or(false),
					)
					.await,
			SearchMethod::Attribute => {
				let Some(attribute) = analysis.attributes.first() else {
					return Ok(Vec::new());
				};

				self.backends
					.attribute
					.search(
						&self.cfg.backends.attribute,
						attribute_kind_label(attribute.kind),
						&attribute.name,
						attribute.value.as_deref(),
						budget,
					)
					.await
			},
		}
	}
}

struct RunMethodArgs<'a> {
	method: SearchMethod,
	analysis: &'a QueryAnalysis,
	req: &'a SearchRequest,
	budget: u32,
	now: OffsetDateTime,
	used_methods: &'a mut Vec<String>,
	errors: &'a mut Vec<String>,
	candidates: &'a mut Vec<ScoredCandidate>,
}

fn plan_methods(force: ForceMethod, analysis: &QueryAnalysis) -> (SearchMethod, Vec<SearchMethod>) {
	let primary = match force {
		ForceMethod::Semantic => SearchMethod::Semantic,
		ForceMethod::Keyword => SearchMethod::Keyword,
		ForceMethod::Attribute => SearchMethod::Attribute,
		ForceMethod::Auto | ForceMethod::MultiMethod => analysis.primary_method,
	};
	let fallbacks =
		analysis.fallback_methods.iter().copied().filter(|method| *method != primary).collect();

	(primary, fallbacks)
}

pub(crate) fn attribute_kind_label(kind: AttributeKind) -> &'static str {
	match kind {
		AttributeKind::Label => "label",
		AttributeKind::Relation => "relation",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn forced_method_overrides_primary_and_dedups_fallbacks() {
		let analysis = analyze("meeting notes");

		assert_eq!(analysis.primary_method, SearchMethod::Semantic);

		let (primary, fallbacks) = plan_methods(ForceMethod::Keyword, &analysis);

		assert_eq!(primary, SearchMethod::Keyword);
		assert!(!fallbacks.contains(&SearchMethod::Keyword));
	}

	#[test]
	fn auto_keeps_analyzer_plan() {
		let analysis = analyze("#book author=Tolkien");
		let (primary, fallbacks) = plan_methods(ForceMethod::Auto, &analysis);

		assert_eq!(primary, SearchMethod::Attribute);
		assert_eq!(fallbacks, vec![SearchMethod::Semantic, SearchMethod::Keyword]);
	}
}
