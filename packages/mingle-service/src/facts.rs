use std::collections::HashMap;

use tracing::{info, warn};

use mingle_storage::queries;

use crate::{MatchService, ServiceError, ServiceResult, storage_err};

#[derive(Clone, Copy, Debug)]
pub struct AddFactsResult {
	pub inserted: u32,
	/// Facts stored without an embedding after their item failed to embed.
	/// They are invisible to similarity search until re-embedded.
	pub skipped_embeddings: u32,
}

impl MatchService {
	/// Embed and store a batch of facts for an attendee. Embedding is
	/// partial-failure tolerant: an item that fails to embed is stored with
	/// a NULL vector and counted, the rest of the batch proceeds.
	pub async fn add_facts(
		&self,
		attendee_id: i64,
		texts: &[String],
	) -> ServiceResult<AddFactsResult> {
		if texts.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "At least one fact text is required.".to_string(),
			});
		}
		if texts.iter().any(|text| text.trim().is_empty()) {
			return Err(ServiceError::InvalidRequest {
				message: "Fact texts must be non-empty.".to_string(),
			});
		}

		let embed_cfg = &self.cfg.providers.embedding;
		let mut embedded: HashMap<usize, Vec<f32>> =
			self.providers.embedding.embed_each(embed_cfg, texts).await.into_iter().collect();

		for vector in embedded.values() {
			if vector.len() != embed_cfg.dimensions as usize {
				return Err(ServiceError::Provider {
					message: "Embedding vector dimension mismatch.".to_string(),
				});
			}
		}

		let records: Vec<(String, Option<Vec<f32>>)> = texts
			.iter()
			.enumerate()
			.map(|(index, text)| (text.clone(), embedded.remove(&index)))
			.collect();
		let skipped_embeddings =
			records.iter().filter(|(_, embedding)| embedding.is_none()).count() as u32;

		if skipped_embeddings > 0 {
			warn!(
				attendee_id,
				skipped = skipped_embeddings,
				"Some facts stored without embeddings."
			);
		}

		queries::insert_facts(&self.db, attendee_id, &records).await.map_err(storage_err)?;

		info!(attendee_id, count = records.len(), "Stored facts.");

		Ok(AddFactsResult { inserted: records.len() as u32, skipped_embeddings })
	}
}
