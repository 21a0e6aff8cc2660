mod error;
mod types;

pub use error::{Error, Result};
pub use types::{BackendEndpoint, Backends, Config, Search, Security, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.mcp_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.mcp_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if !cfg.search.fallback_ratio.is_finite() {
		return Err(Error::Validation {
			message: "search.fallback_ratio must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.search.fallback_ratio) {
		return Err(Error::Validation {
			message: "search.fallback_ratio must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.search.fallback_floor == 0 {
		return Err(Error::Validation {
			message: "search.fallback_floor must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_results_cap == 0 || cfg.search.max_results_cap > 50 {
		return Err(Error::Validation {
			message: "search.max_results_cap must be in the range 1-50.".to_string(),
		});
	}
	if cfg.search.default_max_results == 0
		|| cfg.search.default_max_results > cfg.search.max_results_cap
	{
		return Err(Error::Validation {
			message: "search.default_max_results must be in the range 1-max_results_cap."
				.to_string(),
		});
	}

	for (label, endpoint) in [
		("semantic", &cfg.backends.semantic),
		("keyword", &cfg.backends.keyword),
		("attribute", &cfg.backends.attribute),
	] {
		if endpoint.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("backends.{label}.api_base must be non-empty."),
			});
		}
		if endpoint.path.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("backends.{label}.path must be non-empty."),
			});
		}
		if endpoint.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("backends.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	match cfg.security.auth_mode.as_str() {
		"off" => {},
		"static_keys" =>
			if cfg.security.auth_token.is_none() {
				return Err(Error::Validation {
					message: "security.auth_token is required when security.auth_mode=static_keys."
						.to_string(),
				});
			},
		_ => {
			return Err(Error::Validation {
				message: "security.auth_mode must be one of off or static_keys.".to_string(),
			});
		},
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for endpoint in [
		&mut cfg.backends.semantic,
		&mut cfg.backends.keyword,
		&mut cfg.backends.attribute,
	] {
		if endpoint.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
			endpoint.api_key = None;
		}
	}

	if cfg.security.auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false) {
		cfg.security.auth_token = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_toml() -> String {
		r#"
[service]
mcp_bind = "127.0.0.1:9090"

[backends.semantic]
api_base   = "http://127.0.0.1:8080"
path       = "/search/semantic"
timeout_ms = 5000

[backends.keyword]
api_base   = "http://127.0.0.1:8080"
path       = "/search/keyword"
timeout_ms = 5000

[backends.attribute]
api_base   = "http://127.0.0.1:8080"
path       = "/search/attribute"
timeout_ms = 5000
"#
		.to_string()
	}

	fn parse(raw: &str) -> Config {
		let mut cfg: Config = toml::from_str(raw).expect("config parses");

		normalize(&mut cfg);

		cfg
	}

	#[test]
	fn defaults_apply_when_sections_are_omitted() {
		let cfg = parse(&sample_toml());

		assert_eq!(cfg.service.log_level, "info");
		assert_eq!(cfg.search.default_max_results, 10);
		assert_eq!(cfg.search.max_results_cap, 50);
		assert_eq!(cfg.search.fallback_ratio, 0.3);
		assert_eq!(cfg.search.fallback_floor, 5);
		assert_eq!(cfg.security.auth_mode, "off");
		assert!(validate(&cfg).is_ok());
	}

	#[test]
	fn rejects_out_of_range_fallback_ratio() {
		let mut cfg = parse(&sample_toml());

		cfg.search.fallback_ratio = 1.5;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_zero_fallback_floor() {
		let mut cfg = parse(&sample_toml());

		cfg.search.fallback_floor = 0;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_cap_above_tool_contract() {
		let mut cfg = parse(&sample_toml());

		cfg.search.max_results_cap = 100;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_default_above_cap() {
		let mut cfg = parse(&sample_toml());

		cfg.search.max_results_cap = 10;
		cfg.search.default_max_results = 20;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_zero_backend_timeout() {
		let mut cfg = parse(&sample_toml());

		cfg.backends.keyword.timeout_ms = 0;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn static_keys_mode_requires_a_token() {
		let mut cfg = parse(&sample_toml());

		cfg.security.auth_mode = "static_keys".to_string();

		assert!(validate(&cfg).is_err());

		cfg.security.auth_token = Some("token-1".to_string());

		assert!(validate(&cfg).is_ok());
	}

	#[test]
	fn normalize_drops_blank_optional_secrets() {
		let mut cfg = parse(&sample_toml());

		cfg.backends.semantic.api_key = Some("   ".to_string());
		cfg.security.auth_token = Some("".to_string());
		normalize(&mut cfg);

		assert!(cfg.backends.semantic.api_key.is_none());
		assert!(cfg.security.auth_token.is_none());
	}
}
