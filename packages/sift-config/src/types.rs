use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub search: Search,
	pub backends: Backends,
	#[serde(default)]
	pub security: Security,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub mcp_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// Tuning knobs for the executor. The fallback trigger and budget floor come
/// from observed upstream behavior; both are configurable rather than baked
/// in.
#[derive(Clone, Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_max_results")]
	pub default_max_results: u32,
	#[serde(default = "default_max_results_cap")]
	pub max_results_cap: u32,
	/// Fallback methods run when the primary collected fewer than
	/// `max_results * fallback_ratio` hits.
	#[serde(default = "default_fallback_ratio")]
	pub fallback_ratio: f32,
	/// Minimum per-call budget handed to a fallback backend.
	#[serde(default = "default_fallback_floor")]
	pub fallback_floor: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_max_results: default_max_results(),
			max_results_cap: default_max_results_cap(),
			fallback_ratio: default_fallback_ratio(),
			fallback_floor: default_fallback_floor(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Backends {
	pub semantic: BackendEndpoint,
	pub keyword: BackendEndpoint,
	pub attribute: BackendEndpoint,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BackendEndpoint {
	pub api_base: String,
	pub path: String,
	pub timeout_ms: u64,
	pub api_key: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Security {
	#[serde(default = "default_auth_mode")]
	pub auth_mode: String,
	pub auth_token: Option<String>,
}
impl Default for Security {
	fn default() -> Self {
		Self { auth_mode: default_auth_mode(), auth_token: None }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_max_results() -> u32 {
	10
}

fn default_max_results_cap() -> u32 {
	50
}

fn default_fallback_ratio() -> f32 {
	0.3
}

fn default_fallback_floor() -> u32 {
	5
}

fn default_auth_mode() -> String {
	"off".to_string()
}
