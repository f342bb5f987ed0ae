use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct Event {
	pub event_id: i64,
	pub name: String,
	pub total_tables: i32,
	pub ppl_per_table: i32,
	pub chaos_level: f32,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Attendee {
	pub attendee_id: i64,
	pub event_id: i64,
	pub name: String,
	pub phone: String,
	pub email: String,
	pub rsvp: bool,
	pub going: bool,
	pub table_no: Option<i32>,
	pub seat_no: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Fact {
	pub fact_id: i64,
	pub attendee_id: i64,
	pub fact: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Opinion {
	pub opinion_id: i64,
	pub event_id: i64,
	pub question: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct OpinionAnswer {
	pub answer_id: i64,
	pub attendee_id: i64,
	pub opinion_id: i64,
	pub answer: i32,
}

/// One similarity-search hit: a fact row with its reported score. For a
/// nearest search the score is `1 - distance`; for a farthest search it is
/// the raw distance.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct FactMatch {
	pub attendee_id: i64,
	pub fact: String,
	pub score: f32,
}
