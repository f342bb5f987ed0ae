pub mod answers;
pub mod facts;
pub mod opinions;
pub mod pairing;
pub mod run;
pub mod scorer;

use std::{
	collections::HashMap,
	future::Future,
	pin::Pin,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};

use sqlx::PgPool;

use mingle_config::{Config, EmbeddingProviderConfig};
use mingle_providers::embedding;
use mingle_storage::{
	db::Db,
	models::FactMatch,
	queries::{self, SearchDirection},
};

pub use facts::AddFactsResult;
pub use opinions::PgOpinionSource;
pub use pairing::{AttendeeProfile, PairingReport};
pub use run::{FailureReason, RunResult, spawn_matching};
pub use scorer::{EngineScorer, MatchOutcome, MatchRequest};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;

	/// Embed texts one at a time, skipping items that fail instead of
	/// aborting the batch. Returns `(input index, vector)` pairs for the
	/// items that succeeded.
	fn embed_each<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Vec<(usize, Vec<f32>)>> {
		Box::pin(async move {
			let mut out = Vec::with_capacity(texts.len());

			for (index, text) in texts.iter().enumerate() {
				match self.embed(cfg, std::slice::from_ref(text)).await {
					Ok(vectors) =>
						if let Some(vector) = vectors.into_iter().next() {
							out.push((index, vector));
						},
					Err(err) => {
						tracing::warn!(index, error = %err, "Failed to embed item. Skipping.");
					},
				}
			}

			out
		})
	}
}

pub trait SimilarityIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query_vec: &'a [f32],
		event_id: i64,
		exclude_ids: &'a [i64],
		limit: u32,
		direction: SearchDirection,
	) -> BoxFuture<'a, color_eyre::Result<Vec<FactMatch>>>;
}

pub trait OpinionSource
where
	Self: Send + Sync,
{
	fn vectors<'a>(
		&'a self,
		event_id: i64,
		attendee_ids: &'a [i64],
		neutral: i32,
	) -> BoxFuture<'a, color_eyre::Result<HashMap<i64, Vec<f32>>>>;
}

pub trait CandidateScorer
where
	Self: Send + Sync,
{
	fn find_match<'a>(
		&'a self,
		req: MatchRequest<'a>,
	) -> BoxFuture<'a, ServiceResult<MatchOutcome>>;
}

/// Infrastructure and request errors. Run-level outcomes (event not found,
/// too few attendees, no pairs) are not errors; they come back inside
/// `RunResult` with a `FailureReason`.
#[derive(Debug)]
pub enum ServiceError {
	EventNotFound { event_id: i64 },
	InvalidRequest { message: String },
	Provider { message: String },
	Storage { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub index: Arc<dyn SimilarityIndex>,
	pub opinions: Arc<dyn OpinionSource>,
}

pub struct MatchService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}

/// Cooperative cancellation for a matching run. Checked between pairing
/// iterations only, so a cancelled run never records half a pair.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

struct DefaultEmbedding;

/// The production similarity index: pgvector cosine distance with event and
/// exclusion filtering executed in SQL.
pub struct PgFactIndex {
	db: Db,
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::EventNotFound { event_id } => write!(f, "Event {event_id} not found."),
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<sqlx::Error> for ServiceError {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl EmbeddingProvider for DefaultEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}

	fn embed_each<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Vec<(usize, Vec<f32>)>> {
		Box::pin(embedding::embed_each(cfg, texts))
	}
}

impl PgFactIndex {
	pub fn new(pool: PgPool) -> Self {
		Self { db: Db::from_pool(pool) }
	}
}

impl SimilarityIndex for PgFactIndex {
	fn search<'a>(
		&'a self,
		query_vec: &'a [f32],
		event_id: i64,
		exclude_ids: &'a [i64],
		limit: u32,
		direction: SearchDirection,
	) -> BoxFuture<'a, color_eyre::Result<Vec<FactMatch>>> {
		Box::pin(queries::search_facts(
			&self.db, query_vec, event_id, exclude_ids, limit, direction,
		))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		index: Arc<dyn SimilarityIndex>,
		opinions: Arc<dyn OpinionSource>,
	) -> Self {
		Self { embedding, index, opinions }
	}

	pub fn for_pool(pool: PgPool) -> Self {
		Self {
			embedding: Arc::new(DefaultEmbedding),
			index: Arc::new(PgFactIndex::new(pool.clone())),
			opinions: Arc::new(PgOpinionSource::new(pool)),
		}
	}
}

impl MatchService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let providers = Providers::for_pool(db.pool.clone());

		Self { cfg, db, providers }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}
}

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

pub(crate) fn storage_err(err: color_eyre::Report) -> ServiceError {
	ServiceError::Storage { message: err.to_string() }
}
