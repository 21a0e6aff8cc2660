use std::{cmp::Ordering, collections::HashMap};

use super::{RankedHit, ScoredCandidate};

pub(crate) const UNKNOWN_TITLE: &str = "[Unknown title]";
pub(crate) const NO_PREVIEW: &str = "[No preview]";

/// Fuse per-method candidates into one ranked list. Candidates are grouped
/// by note id in first-seen order, each group collapses onto its best-scored
/// duplicate (earliest wins a tie), and the fused list is stably sorted by
/// score descending. No truncation happens here.
pub(crate) fn merge(candidates: Vec<ScoredCandidate>) -> Vec<RankedHit> {
	let mut order: Vec<String> = Vec::new();
	let mut buckets: HashMap<String, Vec<ScoredCandidate>> = HashMap::new();

	for candidate in candidates {
		let note_id = candidate.hit.note_id.clone();

		if !buckets.contains_key(&note_id) {
			order.push(note_id.clone());
		}
		buckets.entry(note_id).or_default().push(candidate);
	}

	let mut merged = Vec::with_capacity(order.len());

	for note_id in order {
		let Some(group) = buckets.remove(&note_id) else { continue };

		merged.push(merge_group(group));
	}

	merged.sort_by(|left, right| cmp_f32_desc(left.score, right.score));

	merged
}

fn merge_group(group: Vec<ScoredCandidate>) -> RankedHit {
	let mut methods: Vec<&'static str> = Vec::new();
	let mut factors: Vec<String> = Vec::new();
	let mut best_index = 0;
	let mut score = f32::NEG_INFINITY;

	for (index, candidate) in group.iter().enumerate() {
		let method = candidate.method.as_str();

		if !methods.contains(&method) {
			methods.push(method);
		}
		for factor in &candidate.factors {
			if !factors.contains(factor) {
				factors.push(factor.clone());
			}
		}
		// Strictly greater, so the earliest candidate wins a tied score.
		if candidate.score > score {
			best_index = index;
			score = candidate.score;
		}
	}

	let best = &group[best_index];

	RankedHit {
		note_id: best.hit.note_id.clone(),
		title: best.hit.title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
		preview: best.hit.preview.clone().unwrap_or_else(|| NO_PREVIEW.to_string()),
		score: if score.is_finite() { score } else { best.score },
		similarity: best.hit.similarity,
		search_method: methods.join(" + "),
		relevance_factors: factors,
		date_created: best.hit.date_created,
		date_modified: best.hit.date_modified,
		parent_id: best.hit.parent_id.clone(),
	}
}

pub(crate) fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
