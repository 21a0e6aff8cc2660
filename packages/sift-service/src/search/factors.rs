use sift_domain::SearchMethod;
use sift_providers::BackendHit;
use time::{Duration, OffsetDateTime};

const HIGH_SCORE: f32 = 0.8;
const HIGH_SIMILARITY: f32 = 0.8;
const RECENT_WINDOW: Duration = Duration::days(7);

/// Human-readable reasons why a hit was returned. `now` is injected so the
/// recency factor is deterministic under test.
pub(crate) fn relevance_factors(
	hit: &BackendHit,
	query: &str,
	method: SearchMethod,
	score: f32,
	now: OffsetDateTime,
) -> Vec<String> {
	let mut factors = vec![format!("Found via {} search", method.as_str())];

	if score > HIGH_SCORE {
		factors.push("High relevance score".to_string());
	}
	if hit.similarity.map(|similarity| similarity > HIGH_SIMILARITY).unwrap_or(false) {
		factors.push("High similarity".to_string());
	}
	if let Some(title) = hit.title.as_deref() {
		let matched = matching_title_words(title, query);

		if !matched.is_empty() {
			factors.push(format!("Title matches: {}", matched.join(", ")));
		}
	}
	if hit.date_modified.map(|modified| now - modified < RECENT_WINDOW).unwrap_or(false) {
		factors.push("Recently modified".to_string());
	}

	factors
}

fn matching_title_words(title: &str, query: &str) -> Vec<String> {
	let title = title.to_lowercase();

	query
		.to_lowercase()
		.split_whitespace()
		.filter(|word| title.contains(*word))
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(title: &str) -> BackendHit {
		BackendHit { note_id: "n".to_string(), title: Some(title.to_string()), ..Default::default() }
	}

	#[test]
	fn provenance_is_always_first() {
		let factors =
			relevance_factors(&hit("x"), "y", SearchMethod::Keyword, 0.1, OffsetDateTime::UNIX_EPOCH);

		assert_eq!(factors, vec!["Found via keyword search".to_string()]);
	}

	#[test]
	fn high_score_and_similarity_are_called_out() {
		let mut subject = hit("x");

		subject.similarity = Some(0.95);

		let factors = relevance_factors(
			&subject,
			"y",
			SearchMethod::Semantic,
			0.95,
			OffsetDateTime::UNIX_EPOCH,
		);

		assert!(factors.contains(&"High relevance score".to_string()));
		assert!(factors.contains(&"High similarity".to_string()));
	}

	#[test]
	fn title_overlap_lists_matched_words_in_query_order() {
		let factors = relevance_factors(
			&hit("Project Roadmap Draft"),
			"draft roadmap ox",
			SearchMethod::Semantic,
			0.5,
			OffsetDateTime::UNIX_EPOCH,
		);

		assert!(factors.contains(&"Title matches: draft, roadmap".to_string()));
	}

	#[test]
	fn short_query_words_still_count_for_title_overlap() {
		let factors = relevance_factors(
			&hit("an ox"),
			"an ox",
			SearchMethod::Semantic,
			0.5,
			OffsetDateTime::UNIX_EPOCH,
		);

		assert!(factors.contains(&"Title matches: an, ox".to_string()));
	}

	#[test]
	fn recent_modification_is_flagged_inside_the_window() {
		let now = OffsetDateTime::UNIX_EPOCH + Duration::days(100);
		let mut subject = hit("x");

		subject.date_modified = Some(now - Duration::days(3));

		let recent = relevance_factors(&subject, "y", SearchMethod::Keyword, 0.1, now);

		assert!(recent.contains(&"Recently modified".to_string()));

		subject.date_modified = Some(now - Duration::days(8));

		let stale = relevance_factors(&subject, "y", SearchMethod::Keyword, 0.1, now);

		assert!(!stale.contains(&"Recently modified".to_string()));
	}
}
