mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Matching, Postgres, Providers, Service, Storage,
};

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
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.matching.search_limit == 0 {
		return Err(Error::Validation {
			message: "matching.search_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.max_attempts == 0 {
		return Err(Error::Validation {
			message: "matching.max_attempts must be greater than zero.".to_string(),
		});
	}
	if !cfg.matching.harmony_max_chaos.is_finite() || !cfg.matching.balanced_max_chaos.is_finite()
	{
		return Err(Error::Validation {
			message: "matching chaos thresholds must be finite numbers.".to_string(),
		});
	}
	if cfg.matching.harmony_max_chaos < 0.0 {
		return Err(Error::Validation {
			message: "matching.harmony_max_chaos must be zero or greater.".to_string(),
		});
	}
	if cfg.matching.balanced_max_chaos < cfg.matching.harmony_max_chaos {
		return Err(Error::Validation {
			message: "matching.balanced_max_chaos must not be below matching.harmony_max_chaos."
				.to_string(),
		});
	}
	if cfg.matching.balanced_max_chaos > 10.0 {
		return Err(Error::Validation {
			message: "matching.balanced_max_chaos must be 10.0 or less.".to_string(),
		});
	}
	if !(0..=10).contains(&cfg.matching.neutral_answer) {
		return Err(Error::Validation {
			message: "matching.neutral_answer must be in the range 0-10.".to_string(),
		});
	}
	if !cfg.matching.confidence_norm.is_finite() || cfg.matching.confidence_norm <= 0.0 {
		return Err(Error::Validation {
			message: "matching.confidence_norm must be a positive finite number.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let base = cfg.providers.embedding.api_base.trim_end_matches('/').to_string();

	cfg.providers.embedding.api_base = base;
}
