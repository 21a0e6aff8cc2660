use regex::Regex;

use crate::analysis::SearchMethod;

/// Date-field hint understood by the keyword engine's structured query
/// language; appended so temporal queries match against note timestamps.
const TEMPORAL_FIELD_HINT: &str = " note.dateModified note.dateCreated";

/// Rewrite a raw query into the syntax the target method's backend expects.
///
/// Applied independently per method: the primary and each fallback get their
/// own rewrite of the same raw query, never a chained one.
pub fn preprocess(query: &str, method: SearchMethod) -> String {
	let trimmed = query.trim();

	match method {
		SearchMethod::Semantic => {
			let without_quotes = trimmed.replace('"', "");
			let without_operators = match Regex::new(r"(?i)\b(AND|OR|NOT)\b") {
				Ok(re) => re.replace_all(&without_quotes, " ").into_owned(),
				Err(_) => without_quotes,
			};

			without_operators.split_whitespace().collect::<Vec<_>>().join(" ")
		},
		// Operators, field syntax, and attribute prefixes must survive.
		SearchMethod::Keyword | SearchMethod::Attribute => trimmed.to_string(),
		SearchMethod::ExactPhrase =>
			if trimmed.contains('"') {
				trimmed.to_string()
			} else {
				format!("\"{trimmed}\"")
			},
		SearchMethod::Temporal => format!("{trimmed}{TEMPORAL_FIELD_HINT}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn semantic_strips_quotes_and_operators() {
		let processed = preprocess(r#""machine learning" AND notes"#, SearchMethod::Semantic);

		assert_eq!(processed, "machine learning notes");
	}

	#[test]
	fn semantic_collapses_whitespace() {
		let processed = preprocess("  fuzzy   concepts  ", SearchMethod::Semantic);

		assert_eq!(processed, "fuzzy concepts");
	}

	#[test]
	fn keyword_passes_through() {
		let processed = preprocess("tasks AND note.type = text", SearchMethod::Keyword);

		assert_eq!(processed, "tasks AND note.type = text");
	}

	#[test]
	fn attribute_passes_through() {
		let processed = preprocess("#urgent=high", SearchMethod::Attribute);

		assert_eq!(processed, "#urgent=high");
	}

	#[test]
	fn exact_phrase_wraps_unquoted_queries() {
		assert_eq!(preprocess("project notes", SearchMethod::ExactPhrase), "\"project notes\"");
		assert_eq!(
			preprocess(r#""project notes""#, SearchMethod::ExactPhrase),
			r#""project notes""#
		);
	}

	#[test]
	fn temporal_appends_date_field_hint() {
		let processed = preprocess("meetings last week", SearchMethod::Temporal);

		assert_eq!(processed, "meetings last week note.dateModified note.dateCreated");
	}
}
