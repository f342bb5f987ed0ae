use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub matching: Matching,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

/// Engine policy knobs. Thresholds are deliberately configuration, not code:
/// a chaos level at or below `harmony_max_chaos` matches for similarity, at
/// or below `balanced_max_chaos` matches at random, above it matches for
/// dissimilarity.
#[derive(Debug, Deserialize)]
pub struct Matching {
	#[serde(default = "default_search_limit")]
	pub search_limit: u32,
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_harmony_max_chaos")]
	pub harmony_max_chaos: f32,
	#[serde(default = "default_balanced_max_chaos")]
	pub balanced_max_chaos: f32,
	/// Answer assumed for an opinion the attendee never answered. Midpoint of
	/// the [0,10] answer range: absence of data reads as indifference.
	#[serde(default = "default_neutral_answer")]
	pub neutral_answer: i32,
	/// Candidate count at which match confidence saturates at 1.0.
	#[serde(default = "default_confidence_norm")]
	pub confidence_norm: f32,
}

fn default_search_limit() -> u32 {
	10
}

fn default_max_attempts() -> u32 {
	3
}

fn default_harmony_max_chaos() -> f32 {
	3.0
}

fn default_balanced_max_chaos() -> f32 {
	6.0
}

fn default_neutral_answer() -> i32 {
	5
}

fn default_confidence_norm() -> f32 {
	10.0
}
