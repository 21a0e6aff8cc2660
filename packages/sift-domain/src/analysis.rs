use regex::Regex;
use serde::{Deserialize, Serialize};

/// Cap on extracted fallback terms, matching the upstream tool contract.
pub const MAX_TERMS: usize = 5;

const CONFIDENCE_ATTRIBUTE: f32 = 0.95;
const CONFIDENCE_EXACT_PHRASE: f32 = 0.9;
const CONFIDENCE_STRUCTURED: f32 = 0.9;
const CONFIDENCE_BOOLEAN: f32 = 0.85;
const CONFIDENCE_TEMPORAL: f32 = 0.8;
const CONFIDENCE_SEMANTIC: f32 = 0.7;

const BOOLEAN_OPERATORS: &str = r"(?i)\b(AND|OR|NOT)\b";
const STOPWORDS: &str = r"(?i)\b(and|or|not|the|a|an|is|are|was|were|in|on|at|to|for|of|with)\b";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
	Semantic,
	Keyword,
	Attribute,
	ExactPhrase,
	Temporal,
}
impl SearchMethod {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Semantic => "semantic",
			Self::Keyword => "keyword",
			Self::Attribute => "attribute",
			Self::ExactPhrase => "exact_phrase",
			Self::Temporal => "temporal",
		}
	}
}
impl std::fmt::Display for SearchMethod {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
	Label,
	Relation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
	pub kind: AttributeKind,
	pub name: String,
	pub value: Option<String>,
}

/// One-shot classification of a raw query. Immutable after construction and
/// discarded once the request is answered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryAnalysis {
	pub primary_method: SearchMethod,
	pub fallback_methods: Vec<SearchMethod>,
	pub confidence: f32,
	pub processed_query: String,
	pub terms: Vec<String>,
	pub attributes: Vec<AttributeRef>,
	pub temporal_patterns: Vec<String>,
	pub exact_phrases: Vec<String>,
	pub suggestions: Vec<String>,
}

/// Classify a query into a primary search method plus ordered fallbacks.
///
/// Detection rules are layered: every extractor runs and records what it
/// found, but the primary method is chosen by fixed priority. Attribute
/// syntax wins over quoted phrases; temporal hints are recorded without
/// overriding either; boolean and structured operators route to the keyword
/// engine; everything else defaults to semantic search.
pub fn analyze(query: &str) -> QueryAnalysis {
	let exact_phrases = extract_exact_phrases(query);
	let attributes = extract_attributes(query);
	let temporal_patterns = extract_temporal_patterns(query);
	let boolean = has_boolean_operators(query);
	let structured = has_structured_operators(query);
	let terms = extract_terms(query);
	let mut suggestions = Vec::new();

	if !exact_phrases.is_empty() {
		suggestions.push("Remove quotes for broader semantic search".to_string());
	}
	if !attributes.is_empty() {
		suggestions.push("Try without attribute prefixes for content search".to_string());
	}
	if boolean {
		suggestions.push("Remove operators for natural language search".to_string());
	}
	if structured {
		suggestions.push("Use natural language for semantic search".to_string());
	}

	let (primary_method, confidence, fallback_methods) = if !attributes.is_empty() {
		(
			SearchMethod::Attribute,
			CONFIDENCE_ATTRIBUTE,
			vec![SearchMethod::Semantic, SearchMethod::Keyword],
		)
	} else if !exact_phrases.is_empty() {
		(
			SearchMethod::ExactPhrase,
			CONFIDENCE_EXACT_PHRASE,
			vec![SearchMethod::Keyword, SearchMethod::Semantic],
		)
	} else if !temporal_patterns.is_empty() {
		(
			SearchMethod::Temporal,
			CONFIDENCE_TEMPORAL,
			vec![SearchMethod::Semantic, SearchMethod::Keyword],
		)
	} else if boolean {
		(SearchMethod::Keyword, CONFIDENCE_BOOLEAN, vec![SearchMethod::Semantic])
	} else if structured {
		(SearchMethod::Keyword, CONFIDENCE_STRUCTURED, vec![SearchMethod::Semantic])
	} else {
		suggestions.push("Use quotes for exact phrases".to_string());
		suggestions.push("Add #tag or ~relation for attribute search".to_string());

		(SearchMethod::Semantic, CONFIDENCE_SEMANTIC, vec![SearchMethod::Keyword])
	};

	QueryAnalysis {
		primary_method,
		fallback_methods,
		confidence,
		processed_query: query.trim().to_string(),
		terms,
		attributes,
		temporal_patterns,
		exact_phrases,
		suggestions,
	}
}

/// Quoted substrings, without the quotes.
pub fn extract_exact_phrases(query: &str) -> Vec<String> {
	let Ok(re) = Regex::new(r#""([^"]+)""#) else { return Vec::new() };

	re.captures_iter(query).map(|caps| caps[1].to_string()).collect()
}

/// `#label`, `~relation`, and verbose `label:`/`relation:` syntax, with
/// optional `=value` (quoted or bare).
pub fn extract_attributes(query: &str) -> Vec<AttributeRef> {
	let mut out = Vec::new();
	let shorthand = [
		(r#"#(\w+)(?:=([^"\s]+|"[^"]*"))?"#, AttributeKind::Label),
		(r#"~(\w+)(?:=([^"\s]+|"[^"]*"))?"#, AttributeKind::Relation),
	];

	for (pattern, kind) in shorthand {
		let Ok(re) = Regex::new(pattern) else { continue };

		for caps in re.captures_iter(query) {
			out.push(AttributeRef {
				kind,
				name: caps[1].to_string(),
				value: caps.get(2).map(|m| m.as_str().replace('"', "")),
			});
		}
	}

	let Ok(re) = Regex::new(r#"(?i)(label|relation):(\w+)(?:=([^"\s]+|"[^"]*"))?"#) else {
		return out;
	};

	for caps in re.captures_iter(query) {
		let kind = if caps[1].eq_ignore_ascii_case("label") {
			AttributeKind::Label
		} else {
			AttributeKind::Relation
		};

		out.push(AttributeRef {
			kind,
			name: caps[2].to_string(),
			value: caps.get(3).map(|m| m.as_str().replace('"', "")),
		});
	}

	out
}

/// Relative time phrases, ISO-ish dates, and month-name dates.
pub fn extract_temporal_patterns(query: &str) -> Vec<String> {
	let patterns = [
		r"(?i)\b(?:last|past|previous)\s+(?:week|month|year|day)\b",
		r"(?i)\b(?:this|current)\s+(?:week|month|year|day)\b",
		r"(?i)\b(?:yesterday|today|tomorrow)\b",
		r"(?i)\b(?:recent|recently|latest)\b",
		r"\b\d{4}[-/]\d{1,2}[-/]\d{1,2}\b",
		r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\w*\s+\d{1,2},?\s+\d{4}\b",
	];
	let mut out = Vec::new();

	for pattern in patterns {
		let Ok(re) = Regex::new(pattern) else { continue };

		for m in re.find_iter(query) {
			out.push(m.as_str().to_string());
		}
	}

	out
}

pub fn has_boolean_operators(query: &str) -> bool {
	Regex::new(BOOLEAN_OPERATORS).map(|re| re.is_match(query)).unwrap_or(false)
}

/// Field qualifiers (`note.title` etc.) and comparison operators used by the
/// keyword engine's structured query language.
pub fn has_structured_operators(query: &str) -> bool {
	let patterns = [r"(?i)note\.(title|content|type)", r"\*=", r"\^=", r"\$="];

	patterns
		.iter()
		.any(|pattern| Regex::new(pattern).map(|re| re.is_match(query)).unwrap_or(false))
}

/// Meaningful fallback terms: syntax characters stripped, stopwords removed,
/// tokens longer than two characters, capped at [`MAX_TERMS`] in original
/// order.
pub fn extract_terms(query: &str) -> Vec<String> {
	let stripped: String = query.chars().filter(|ch| !matches!(ch, '"' | '#' | '~')).collect();
	let Ok(stop) = Regex::new(STOPWORDS) else { return Vec::new() };
	let cleaned = stop.replace_all(&stripped, "");

	cleaned
		.split_whitespace()
		.filter(|term| term.chars().count() > 2)
		.take(MAX_TERMS)
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quoted_query_is_exact_phrase() {
		let analysis = analyze(r#""project notes""#);

		assert_eq!(analysis.primary_method, SearchMethod::ExactPhrase);
		assert_eq!(analysis.confidence, 0.9);
		assert_eq!(analysis.exact_phrases, vec!["project notes".to_string()]);
		assert_eq!(
			analysis.fallback_methods,
			vec![SearchMethod::Keyword, SearchMethod::Semantic]
		);
	}

	#[test]
	fn label_shorthand_is_attribute() {
		let analysis = analyze("#urgent");

		assert_eq!(analysis.primary_method, SearchMethod::Attribute);
		assert_eq!(analysis.confidence, 0.95);
		assert_eq!(analysis.attributes, vec![AttributeRef {
			kind: AttributeKind::Label,
			name: "urgent".to_string(),
			value: None,
		}]);
	}

	#[test]
	fn attribute_wins_over_exact_phrase() {
		let analysis = analyze(r#"#urgent "project notes""#);

		assert_eq!(analysis.primary_method, SearchMethod::Attribute);
		assert_eq!(analysis.exact_phrases, vec!["project notes".to_string()]);
	}

	#[test]
	fn temporal_hints_do_not_override_attributes() {
		let analysis = analyze("#meeting last week");

		assert_eq!(analysis.primary_method, SearchMethod::Attribute);
		assert_eq!(analysis.temporal_patterns, vec!["last week".to_string()]);
	}

	#[test]
	fn plain_temporal_query_routes_to_temporal() {
		let analysis = analyze("notes from last week");

		assert_eq!(analysis.primary_method, SearchMethod::Temporal);
		assert_eq!(analysis.confidence, 0.8);
		assert_eq!(
			analysis.fallback_methods,
			vec![SearchMethod::Semantic, SearchMethod::Keyword]
		);
	}

	#[test]
	fn boolean_operators_route_to_keyword() {
		let analysis = analyze("tasks AND reports");

		assert_eq!(analysis.primary_method, SearchMethod::Keyword);
		assert_eq!(analysis.confidence, 0.85);
		assert_eq!(analysis.fallback_methods, vec![SearchMethod::Semantic]);
	}

	#[test]
	fn structured_operators_route_to_keyword() {
		let analysis = analyze("note.title *= meeting");

		assert_eq!(analysis.primary_method, SearchMethod::Keyword);
		assert_eq!(analysis.confidence, 0.9);
	}

	#[test]
	fn natural_language_defaults_to_semantic() {
		let analysis = analyze("meeting notes");

		assert_eq!(analysis.primary_method, SearchMethod::Semantic);
		assert_eq!(analysis.confidence, 0.7);
		assert_eq!(analysis.fallback_methods, vec![SearchMethod::Keyword]);
		assert!(analysis.suggestions.iter().any(|s| s.contains("quotes")));
		assert!(analysis.suggestions.iter().any(|s| s.contains("#tag")));
	}

	#[test]
	fn extracts_attribute_values_and_strips_value_quotes() {
		let attributes = extract_attributes(r#"#status="in progress" ~linkedTo=projectX"#);

		assert_eq!(attributes, vec![
			AttributeRef {
				kind: AttributeKind::Label,
				name: "status".to_string(),
				value: Some("in progress".to_string()),
			},
			AttributeRef {
				kind: AttributeKind::Relation,
				name: "linkedTo".to_string(),
				value: Some("projectX".to_string()),
			},
		]);
	}

	#[test]
	fn extracts_verbose_attribute_syntax() {
		let attributes = extract_attributes("label:urgent relation:linkedTo=projectX");

		assert_eq!(attributes, vec![
			AttributeRef {
				kind: AttributeKind::Label,
				name: "urgent".to_string(),
				value: None,
			},
			AttributeRef {
				kind: AttributeKind::Relation,
				name: "linkedTo".to_string(),
				value: Some("projectX".to_string()),
			},
		]);
	}

	#[test]
	fn term_extraction_removes_stopwords_and_short_tokens() {
		let terms = extract_terms("the quick fox is on a log at dawn");

		assert_eq!(terms, vec!["quick", "fox", "log", "dawn"]);
	}

	#[test]
	fn term_extraction_caps_at_five_in_order() {
		let terms = extract_terms("alpha bravo charlie delta echo foxtrot golf");

		assert_eq!(terms, vec!["alpha", "bravo", "charlie", "delta", "echo"]);
	}

	#[test]
	fn term_extraction_strips_syntax_characters() {
		let terms = extract_terms(r##"#urgent "project plan""##);

		assert_eq!(terms, vec!["urgent", "project", "plan"]);
	}

	#[test]
	fn iso_dates_are_temporal() {
		let matches = extract_temporal_patterns("standup 2025-03-14 summary");

		assert_eq!(matches, vec!["2025-03-14".to_string()]);
	}

	#[test]
	fn method_labels_are_stable() {
		for (method, label) in [
			(SearchMethod::Semantic, "semantic"),
			(SearchMethod::Keyword, "keyword"),
			(SearchMethod::Attribute, "attribute"),
			(SearchMethod::ExactPhrase, "exact_phrase"),
			(SearchMethod::Temporal, "temporal"),
		] {
			assert_eq!(method.as_str(), label);
			assert_eq!(serde_json::to_value(method).expect("serializes"), label);
		}
	}

	#[test]
	fn month_name_dates_are_temporal() {
		let matches = extract_temporal_patterns("review from March 14, 2025");

		assert_eq!(matches, vec!["March 14, 2025".to_string()]);
	}
}
