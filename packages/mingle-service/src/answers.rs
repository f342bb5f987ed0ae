use tracing::info;

use mingle_storage::{models::Opinion, queries};

use crate::{MatchService, ServiceError, ServiceResult, storage_err};

impl MatchService {
	/// Register an opinion question for an event. Questions are shared by
	/// every attendee of the event and define one component of its opinion
	/// vectors.
	pub async fn register_opinion(
		&self,
		event_id: i64,
		question: &str,
	) -> ServiceResult<Opinion> {
		let question = question.trim();

		if question.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Opinion question must be non-empty.".to_string(),
			});
		}
		if queries::fetch_event(&self.db, event_id).await.map_err(storage_err)?.is_none() {
			return Err(ServiceError::EventNotFound { event_id });
		}

		let opinion =
			queries::insert_opinion(&self.db, event_id, question).await.map_err(storage_err)?;

		info!(event_id, opinion_id = opinion.opinion_id, "Registered opinion.");

		Ok(opinion)
	}

	/// Record an attendee's answer to an opinion. At most one answer exists
	/// per (attendee, opinion) pair; recording again replaces the previous
	/// answer.
	pub async fn record_answer(
		&self,
		attendee_id: i64,
		opinion_id: i64,
		answer: i32,
	) -> ServiceResult<()> {
		if !(0..=10).contains(&answer) {
			return Err(ServiceError::InvalidRequest {
				message: format!("Answer must be in the range 0-10, got {answer}."),
			});
		}

		queries::upsert_answer(&self.db, attendee_id, opinion_id, answer)
			.await
			.map_err(storage_err)?;

		Ok(())
	}
}
