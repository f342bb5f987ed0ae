use color_eyre::Result;
use sqlx::QueryBuilder;

use mingle_domain::seating::SeatPlan;

use crate::{
	db::Db,
	models::{Attendee, Event, Fact, FactMatch, Opinion, OpinionAnswer},
};

/// Which end of the distance ordering a similarity search returns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchDirection {
	/// Ascending cosine distance; score reported as `1 - distance`.
	Nearest,
	/// Descending cosine distance; score reported as the raw distance.
	Farthest,
}

pub async fn insert_event(
	db: &Db,
	name: &str,
	total_tables: i32,
	ppl_per_table: i32,
	chaos_level: f32,
) -> Result<Event> {
	let event = sqlx::query_as::<_, Event>(
		"\
INSERT INTO events (name, total_tables, ppl_per_table, chaos_level)
VALUES ($1, $2, $3, $4)
RETURNING event_id, name, total_tables, ppl_per_table, chaos_level",
	)
	.bind(name)
	.bind(total_tables)
	.bind(ppl_per_table)
	.bind(chaos_level)
	.fetch_one(&db.pool)
	.await?;

	Ok(event)
}

pub async fn fetch_event(db: &Db, event_id: i64) -> Result<Option<Event>> {
	let event = sqlx::query_as::<_, Event>(
		"\
SELECT event_id, name, total_tables, ppl_per_table, chaos_level
FROM events
WHERE event_id = $1",
	)
	.bind(event_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(event)
}

pub async fn insert_attendee(
	db: &Db,
	event_id: i64,
	name: &str,
	phone: &str,
	email: &str,
	going: bool,
) -> Result<Attendee> {
	let attendee = sqlx::query_as::<_, Attendee>(
		"\
INSERT INTO attendees (event_id, name, phone, email, going)
VALUES ($1, $2, $3, $4, $5)
RETURNING attendee_id, event_id, name, phone, email, rsvp, going, table_no, seat_no",
	)
	.bind(event_id)
	.bind(name)
	.bind(phone)
	.bind(email)
	.bind(going)
	.fetch_one(&db.pool)
	.await?;

	Ok(attendee)
}

pub async fn fetch_going_attendees(db: &Db, event_id: i64) -> Result<Vec<Attendee>> {
	let attendees = sqlx::query_as::<_, Attendee>(
		"\
SELECT attendee_id, event_id, name, phone, email, rsvp, going, table_no, seat_no
FROM attendees
WHERE event_id = $1 AND going = TRUE
ORDER BY attendee_id",
	)
	.bind(event_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(attendees)
}

/// Bulk-insert facts for one attendee. A `None` embedding stores the fact
/// text with a NULL vector; such rows are invisible to similarity search.
pub async fn insert_facts(
	db: &Db,
	attendee_id: i64,
	facts: &[(String, Option<Vec<f32>>)],
) -> Result<u64> {
	if facts.is_empty() {
		return Ok(0);
	}

	let mut builder = QueryBuilder::new("INSERT INTO facts (attendee_id, fact, embedding) ");

	builder.push_values(facts, |mut b, (text, embedding)| {
		b.push_bind(attendee_id)
			.push_bind(text.as_str())
			.push_bind(embedding.as_deref().map(vector_to_pg))
			.push_unseparated("::text::vector");
	});

	let result = builder.build().execute(&db.pool).await?;

	Ok(result.rows_affected())
}

pub async fn fetch_attendee_facts(db: &Db, attendee_id: i64) -> Result<Vec<Fact>> {
	let facts = sqlx::query_as::<_, Fact>(
		"\
SELECT fact_id, attendee_id, fact, created_at
FROM facts
WHERE attendee_id = $1
ORDER BY fact_id",
	)
	.bind(attendee_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(facts)
}

/// Fact texts for a set of attendees, ordered by insertion (fact_id) within
/// each attendee.
pub async fn fetch_fact_texts(db: &Db, attendee_ids: &[i64]) -> Result<Vec<(i64, String)>> {
	let rows: Vec<(i64, String)> = sqlx::query_as(
		"\
SELECT attendee_id, fact
FROM facts
WHERE attendee_id = ANY($1)
ORDER BY attendee_id, fact_id",
	)
	.bind(attendee_ids.to_vec())
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn insert_opinion(db: &Db, event_id: i64, question: &str) -> Result<Opinion> {
	let opinion = sqlx::query_as::<_, Opinion>(
		"\
INSERT INTO opinions (event_id, question)
VALUES ($1, $2)
RETURNING opinion_id, event_id, question",
	)
	.bind(event_id)
	.bind(question)
	.fetch_one(&db.pool)
	.await?;

	Ok(opinion)
}

/// Opinion ids for an event in ascending id order. This ordering defines the
/// component order of every opinion vector built for the event.
pub async fn fetch_event_opinion_ids(db: &Db, event_id: i64) -> Result<Vec<i64>> {
	let ids: Vec<(i64,)> = sqlx::query_as(
		"\
SELECT opinion_id
FROM opinions
WHERE event_id = $1
ORDER BY opinion_id",
	)
	.bind(event_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(ids.into_iter().map(|(id,)| id).collect())
}

/// Insert-or-update an attendee's answer to an opinion, keyed on the
/// (attendee, opinion) pair.
pub async fn upsert_answer(
	db: &Db,
	attendee_id: i64,
	opinion_id: i64,
	answer: i32,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO opinion_answers (attendee_id, opinion_id, answer)
VALUES ($1, $2, $3)
ON CONFLICT (attendee_id, opinion_id) DO UPDATE
SET answer = EXCLUDED.answer",
	)
	.bind(attendee_id)
	.bind(opinion_id)
	.bind(answer)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn fetch_answers(
	db: &Db,
	opinion_ids: &[i64],
	attendee_ids: &[i64],
) -> Result<Vec<OpinionAnswer>> {
	let answers = sqlx::query_as::<_, OpinionAnswer>(
		"\
SELECT answer_id, attendee_id, opinion_id, answer
FROM opinion_answers
WHERE opinion_id = ANY($1) AND attendee_id = ANY($2)",
	)
	.bind(opinion_ids.to_vec())
	.bind(attendee_ids.to_vec())
	.fetch_all(&db.pool)
	.await?;

	Ok(answers)
}

/// Answered-opinion counts per attendee. Attendees without answers are
/// absent from the result.
pub async fn fetch_answer_counts(db: &Db, attendee_ids: &[i64]) -> Result<Vec<(i64, i64)>> {
	let rows: Vec<(i64, i64)> = sqlx::query_as(
		"\
SELECT attendee_id, count(*)
FROM opinion_answers
WHERE attendee_id = ANY($1)
GROUP BY attendee_id",
	)
	.bind(attendee_ids.to_vec())
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Rank an event's facts against a query vector. Event scoping and the
/// exclusion list are applied in SQL so a concurrently-written fact can
/// never smuggle an excluded attendee back in. The secondary attendee_id
/// sort makes equal-distance orderings stable.
pub async fn search_facts(
	db: &Db,
	query_vec: &[f32],
	event_id: i64,
	exclude_ids: &[i64],
	limit: u32,
	direction: SearchDirection,
) -> Result<Vec<FactMatch>> {
	let sql = match direction {
		SearchDirection::Nearest =>
			"\
SELECT
	f.attendee_id,
	f.fact,
	(1 - (f.embedding <=> $1::text::vector))::real AS score
FROM facts f
JOIN attendees a ON a.attendee_id = f.attendee_id
WHERE a.event_id = $2
	AND a.going = TRUE
	AND f.embedding IS NOT NULL
	AND f.attendee_id <> ALL($3)
ORDER BY f.embedding <=> $1::text::vector ASC, f.attendee_id ASC
LIMIT $4",
		SearchDirection::Farthest =>
			"\
SELECT
	f.attendee_id,
	f.fact,
	(f.embedding <=> $1::text::vector)::real AS score
FROM facts f
JOIN attendees a ON a.attendee_id = f.attendee_id
WHERE a.event_id = $2
	AND a.going = TRUE
	AND f.embedding IS NOT NULL
	AND f.attendee_id <> ALL($3)
ORDER BY f.embedding <=> $1::text::vector DESC, f.attendee_id ASC
LIMIT $4",
	};
	let matches = sqlx::query_as::<_, FactMatch>(sql)
		.bind(vector_to_pg(query_vec))
		.bind(event_id)
		.bind(exclude_ids.to_vec())
		.bind(limit as i64)
		.fetch_all(&db.pool)
		.await?;

	Ok(matches)
}

/// Rewrite an event's seat assignments in one transaction: every seat for
/// the event is cleared, then the plan's assignments are applied. Rolls
/// back as a whole on any failure, so readers never observe a half-seated
/// event.
pub async fn apply_seat_plan(db: &Db, event_id: i64, plan: &SeatPlan) -> Result<()> {
	let mut tx = db.pool.begin().await?;

	sqlx::query("UPDATE attendees SET table_no = NULL, seat_no = NULL WHERE event_id = $1")
		.bind(event_id)
		.execute(&mut *tx)
		.await?;

	for seat in &plan.assignments {
		sqlx::query(
			"\
UPDATE attendees
SET table_no = $1, seat_no = $2
WHERE attendee_id = $3 AND event_id = $4",
		)
		.bind(seat.table_no)
		.bind(seat.seat_no)
		.bind(seat.attendee_id)
		.bind(event_id)
		.execute(&mut *tx)
		.await?;
	}

	tx.commit().await?;

	Ok(())
}

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);
	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}
		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}
