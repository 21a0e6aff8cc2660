pub mod search;
pub mod time_serde;

use std::{future::Future, pin::Pin, sync::Arc};

use sift_config::{BackendEndpoint, Config};
use sift_providers::{BackendHit, attribute, keyword, semantic};

pub use search::{
	AnalysisReport, AttributeReport, ForceMethod, NextSteps, RankedHit, SearchFailure,
	SearchMetadata, SearchReply, SearchRequest, SearchSuccess,
};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SemanticBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a BackendEndpoint,
		query: &'a str,
		parent_note_id: Option<&'a str>,
		max_results: u32,
		summarize: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>>;
}

pub trait KeywordBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a BackendEndpoint,
		query: &'a str,
		max_results: u32,
		include_archived: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>>;
}

pub trait AttributeBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a BackendEndpoint,
		attribute_type: &'a str,
		attribute_name: &'a str,
		attribute_value: Option<&'a str>,
		max_results: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Backend { message: String },
}

#[derive(Clone)]
pub struct Backends {
	pub semantic: Arc<dyn SemanticBackend>,
	pub keyword: Arc<dyn KeywordBackend>,
	pub attribute: Arc<dyn AttributeBackend>,
}

pub struct SmartSearch {
	pub cfg: Config,
	pub backends: Backends,
}

struct DefaultBackends;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Backend { message } => write!(f, "Backend error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Backend { message: err.to_string() }
	}
}

impl SemanticBackend for DefaultBackends {
	fn search<'a>(
		&'a self,
		cfg: &'a BackendEndpoint,
		query: &'a str,
		parent_note_id: Option<&'a str>,
		max_results: u32,
		summarize: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>> {
		Box::pin(semantic::search(cfg, query, parent_note_id, max_results, summarize))
	}
}

impl KeywordBackend for DefaultBackends {
	fn search<'a>(
		&'a self,
		cfg: &'a BackendEndpoint,
		query: &'a str,
		max_results: u32,
		include_archived: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>> {
		Box::pin(keyword::search(cfg, query, max_results, include_archived))
	}
}

impl AttributeBackend for DefaultBackends {
	fn search<'a>(
		&'a self,
		cfg: &'a BackendEndpoint,
		attribute_type: &'a str,
		attribute_name: &'a str,
		attribute_value: Option<&'a str>,
		max_results: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<BackendHit>>> {
		Box::pin(attribute::search(
			cfg,
			attribute_type,
			attribute_name,
			attribute_value,
			max_results,
		))
	}
}

impl Backends {
	pub fn new(
		semantic: Arc<dyn SemanticBackend>,
		keyword: Arc<dyn KeywordBackend>,
		attribute: Arc<dyn AttributeBackend>,
	) -> Self {
		Self { semantic, keyword, attribute }
	}
}

impl Default for Backends {
	fn default() -> Self {
		let backend = Arc::new(DefaultBackends);
		Self { semantic: backend.clone(), keyword: backend.clone(), attribute: backend }
	}
}

impl SmartSearch {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, backends: Backends::default() }
	}

	pub fn with_backends(cfg: Config, backends: Backends) -> Self {
		Self { cfg, backends }
	}
}
