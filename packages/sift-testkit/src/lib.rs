//! Test doubles for the search service: scripted backends with recorded
//! calls, plus a ready-made config pointing at unreachable endpoints.

use std::{
	collections::VecDeque,
	sync::{Arc, Mutex},
};

use color_eyre::eyre;
use sift_config::{BackendEndpoint, Backends as BackendsConfig, Config, Search, Security, Service};
use sift_providers::BackendHit;
use sift_service::{AttributeBackend, Backends, BoxFuture, KeywordBackend, SemanticBackend};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
	pub method: &'static str,
	pub query: String,
	pub budget: u32,
}

/// A backend whose outcomes are queued ahead of time. Each call pops the
/// next queued outcome; an empty queue yields an empty success. Every call
/// is recorded for assertion.
#[derive(Default)]
pub struct ScriptedBackend {
	outcomes: Mutex<VecDeque<Result<Vec<BackendHit>, String>>>,
	calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn push_hits(&self, hits: Vec<BackendHit>) {
		self.outcomes.lock().unwrap_or_else(|err| err.into_inner()).push_back(Ok(hits));
	}

	pub fn push_error(&self, message: &str) {
		self.outcomes
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push_back(Err(message.to_string()));
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	fn record(&self, method: &'static str, query: &str, budget: u32) {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(RecordedCall {
			method,
			query: query.to_string(),
			budget,
		});
	}

	fn next_outcome(&self) -> color_eyre::Result<Vec<BackendHit>> {
		let outcome = self.outcomes.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

		match outcome {
			Some(Ok(hits)) => Ok(hits),
			Some(Err(message)) => Err(eyre::eyre!("{message}")),
			None => Ok(Vec::new()),
		}
	}
}

impl SemanticBackend for ScriptedBackend {
	fn search<'a>(
		&'a self,
		_cfg: &'a BackendEndpoint,
		query: &'a str,
		_parent_note_id: Option<&'a str>,
		max_results: u32,
		_summarize: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>> {
		self.record("semantic", query, max_results);

		let outcome = self.next_outcome();

		Box::pin(async move { outcome })
	}
}

impl KeywordBackend for ScriptedBackend {
	fn search<'a>(
		&'a self,
		_cfg: &'a BackendEndpoint,
		query: &'a str,
		max_results: u32,
		_include_archived: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>> {
		self.record("keyword", query, max_results);

		let outcome = self.next_outcome();

		Box::pin(async move { outcome })
	}
}

impl AttributeBackend for ScriptedBackend {
	fn search<'a>(
		&'a self,
		_cfg: &'a BackendEndpoint,
		_attribute_type: &'a str,
		attribute_name: &'a str,
		_attribute_value: Option<&'a str>,
		max_results: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>> {
		self.record("attribute", attribute_name, max_results);

		let outcome = self.next_outcome();

		Box::pin(async move { outcome })
	}
}

pub struct ScriptedBackends {
	pub semantic: Arc<ScriptedBackend>,
	pub keyword: Arc<ScriptedBackend>,
	pub attribute: Arc<ScriptedBackend>,
}

impl ScriptedBackends {
	pub fn new() -> Self {
		Self {
			semantic: ScriptedBackend::new(),
			keyword: ScriptedBackend::new(),
			attribute: ScriptedBackend::new(),
		}
	}

	pub fn as_backends(&self) -> Backends {
		Backends::new(self.semantic.clone(), self.keyword.clone(), self.attribute.clone())
	}
}

impl Default for ScriptedBackends {
	fn default() -> Self {
		Self::new()
	}
}

pub fn hit(note_id: &str, score: f32) -> BackendHit {
	BackendHit {
		note_id: note_id.to_string(),
		title: Some(format!("Note {note_id}")),
		preview: Some(format!("Preview of {note_id}")),
		score: Some(score),
		..Default::default()
	}
}

pub fn similarity_hit(note_id: &str, similarity: f32) -> BackendHit {
	BackendHit {
		note_id: note_id.to_string(),
		title: Some(format!("Note {note_id}")),
		preview: Some(format!("Preview of {note_id}")),
		similarity: Some(similarity),
		..Default::default()
	}
}

pub fn test_config() -> Config {
	let endpoint = |path: &str| BackendEndpoint {
		api_base: "http://127.0.0.1:1".to_string(),
		path: path.to_string(),
		timeout_ms: 100,
		api_key: None,
		default_headers: Default::default(),
	};

	Config {
		service: Service {
			mcp_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		search: Search::default(),
		backends: BackendsConfig {
			semantic: endpoint("/search/semantic"),
			keyword: endpoint("/search/keyword"),
			attribute: endpoint("/search/attribute"),
		},
		security: Security::default(),
	}
}
