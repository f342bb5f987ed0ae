use std::collections::HashMap;

use sqlx::PgPool;

use mingle_domain::opinions::opinion_vector;
use mingle_storage::{db::Db, models::OpinionAnswer, queries};

use crate::{BoxFuture, OpinionSource};

/// Opinion vectors straight from Postgres: dimensionality is the number of
/// opinions registered for the event, component order ascending opinion id,
/// unanswered components filled with the neutral value.
pub struct PgOpinionSource {
	db: Db,
}

impl PgOpinionSource {
	pub fn new(pool: PgPool) -> Self {
		Self { db: Db::from_pool(pool) }
	}
}

impl OpinionSource for PgOpinionSource {
	fn vectors<'a>(
		&'a self,
		event_id: i64,
		attendee_ids: &'a [i64],
		neutral: i32,
	) -> BoxFuture<'a, color_eyre::Result<HashMap<i64, Vec<f32>>>> {
		Box::pin(async move {
			let opinion_ids = queries::fetch_event_opinion_ids(&self.db, event_id).await?;

			if opinion_ids.is_empty() {
				return Ok(attendee_ids.iter().map(|id| (*id, Vec::new())).collect());
			}

			let answers = queries::fetch_answers(&self.db, &opinion_ids, attendee_ids).await?;

			Ok(vectors_from_answers(&opinion_ids, &answers, attendee_ids, neutral))
		})
	}
}

pub(crate) fn vectors_from_answers(
	opinion_ids: &[i64],
	answers: &[OpinionAnswer],
	attendee_ids: &[i64],
	neutral: i32,
) -> HashMap<i64, Vec<f32>> {
	let mut by_attendee: HashMap<i64, HashMap<i64, i32>> = HashMap::new();

	for row in answers {
		by_attendee.entry(row.attendee_id).or_default().insert(row.opinion_id, row.answer);
	}

	attendee_ids
		.iter()
		.map(|id| {
			let own = by_attendee.get(id);
			let empty = HashMap::new();
			let vector = opinion_vector(opinion_ids, own.unwrap_or(&empty), neutral);

			(*id, vector)
		})
		.collect()
}
