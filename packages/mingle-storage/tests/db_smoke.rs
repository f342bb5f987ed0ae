use mingle_config::Postgres;
use mingle_domain::seating::{SeatAssignment, SeatPlan};
use mingle_storage::{db::Db, queries};
use mingle_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set MINGLE_PG_DSN to run."]
async fn schema_bootstraps_and_tables_exist() {
	let Some(base_dsn) = mingle_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstraps_and_tables_exist; set MINGLE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(8).await.expect("Failed to ensure schema.");

	for table in ["events", "attendees", "facts", "opinions", "opinion_answers"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Expected table {table} to exist.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set MINGLE_PG_DSN to run."]
async fn answer_upsert_replaces_prior_answer() {
	let Some(base_dsn) = mingle_testkit::env_dsn() else {
		eprintln!("Skipping answer_upsert_replaces_prior_answer; set MINGLE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(8).await.expect("Failed to ensure schema.");

	let event = queries::insert_event(&db, "Launch dinner", 2, 4, 1.0)
		.await
		.expect("Failed to insert event.");
	let attendee =
		queries::insert_attendee(&db, event.event_id, "Ada", "+1555", "ada@example.com", true)
			.await
			.expect("Failed to insert attendee.");
	let opinion = queries::insert_opinion(&db, event.event_id, "Pineapple on pizza?")
		.await
		.expect("Failed to insert opinion.");

	queries::upsert_answer(&db, attendee.attendee_id, opinion.opinion_id, 2)
		.await
		.expect("Failed to insert answer.");
	queries::upsert_answer(&db, attendee.attendee_id, opinion.opinion_id, 9)
		.await
		.expect("Failed to upsert answer.");

	let answers =
		queries::fetch_answers(&db, &[opinion.opinion_id], &[attendee.attendee_id])
			.await
			.expect("Failed to fetch answers.");

	assert_eq!(answers.len(), 1);
	assert_eq!(answers[0].answer, 9);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set MINGLE_PG_DSN to run."]
async fn similarity_search_filters_event_and_exclusions() {
	let Some(base_dsn) = mingle_testkit::env_dsn() else {
		eprintln!("Skipping similarity_search_filters_event_and_exclusions; set MINGLE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(3).await.expect("Failed to ensure schema.");

	let event = queries::insert_event(&db, "Mixer", 2, 4, 1.0)
		.await
		.expect("Failed to insert event.");
	let other_event = queries::insert_event(&db, "Other", 2, 4, 1.0)
		.await
		.expect("Failed to insert event.");
	let near =
		queries::insert_attendee(&db, event.event_id, "Near", "+1", "near@example.com", true)
			.await
			.expect("Failed to insert attendee.");
	let far = queries::insert_attendee(&db, event.event_id, "Far", "+2", "far@example.com", true)
		.await
		.expect("Failed to insert attendee.");
	let outsider = queries::insert_attendee(
		&db,
		other_event.event_id,
		"Outsider",
		"+3",
		"out@example.com",
		true,
	)
	.await
	.expect("Failed to insert attendee.");

	queries::insert_facts(&db, near.attendee_id, &[(
		"likes pizza too".to_string(),
		Some(vec![1.0, 0.0, 0.0]),
	)])
	.await
	.expect("Failed to insert facts.");
	queries::insert_facts(&db, far.attendee_id, &[(
		"dislikes all food".to_string(),
		Some(vec![0.0, 1.0, 0.0]),
	)])
	.await
	.expect("Failed to insert facts.");
	queries::insert_facts(&db, outsider.attendee_id, &[(
		"likes pizza exactly".to_string(),
		Some(vec![1.0, 0.0, 0.0]),
	)])
	.await
	.expect("Failed to insert facts.");

	let stored = queries::fetch_attendee_facts(&db, near.attendee_id)
		.await
		.expect("Failed to fetch facts.");

	assert_eq!(stored.len(), 1);
	assert_eq!(stored[0].fact, "likes pizza too");

	let query = [1.0_f32, 0.0, 0.0];
	let nearest = queries::search_facts(
		&db,
		&query,
		event.event_id,
		&[],
		10,
		queries::SearchDirection::Nearest,
	)
	.await
	.expect("Failed to search facts.");

	// The other event's attendee never appears, even with an identical vector.
	assert_eq!(nearest.first().map(|m| m.attendee_id), Some(near.attendee_id));
	assert!(nearest.iter().all(|m| m.attendee_id != outsider.attendee_id));

	let farthest = queries::search_facts(
		&db,
		&query,
		event.event_id,
		&[],
		10,
		queries::SearchDirection::Farthest,
	)
	.await
	.expect("Failed to search facts.");

	assert_eq!(farthest.first().map(|m| m.attendee_id), Some(far.attendee_id));

	let excluded = queries::search_facts(
		&db,
		&query,
		event.event_id,
		&[near.attendee_id],
		10,
		queries::SearchDirection::Nearest,
	)
	.await
	.expect("Failed to search facts.");

	assert!(excluded.iter().all(|m| m.attendee_id != near.attendee_id));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set MINGLE_PG_DSN to run."]
async fn seat_plan_clears_then_rewrites_assignments() {
	let Some(base_dsn) = mingle_testkit::env_dsn() else {
		eprintln!("Skipping seat_plan_clears_then_rewrites_assignments; set MINGLE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(3).await.expect("Failed to ensure schema.");

	let event = queries::insert_event(&db, "Mixer", 2, 2, 1.0)
		.await
		.expect("Failed to insert event.");
	let a = queries::insert_attendee(&db, event.event_id, "A", "+1", "a@example.com", true)
		.await
		.expect("Failed to insert attendee.");
	let b = queries::insert_attendee(&db, event.event_id, "B", "+2", "b@example.com", true)
		.await
		.expect("Failed to insert attendee.");

	let first = SeatPlan {
		assignments: vec![
			SeatAssignment { attendee_id: a.attendee_id, table_no: 0, seat_no: 0 },
			SeatAssignment { attendee_id: b.attendee_id, table_no: 0, seat_no: 1 },
		],
		unseated: Vec::new(),
	};

	queries::apply_seat_plan(&db, event.event_id, &first)
		.await
		.expect("Failed to apply seat plan.");

	// A second run that seats only one attendee must clear the other's seat.
	let second = SeatPlan {
		assignments: vec![SeatAssignment { attendee_id: b.attendee_id, table_no: 1, seat_no: 0 }],
		unseated: Vec::new(),
	};

	queries::apply_seat_plan(&db, event.event_id, &second)
		.await
		.expect("Failed to apply seat plan.");

	let attendees = queries::fetch_going_attendees(&db, event.event_id)
		.await
		.expect("Failed to fetch attendees.");
	let seat_of = |id: i64| {
		attendees
			.iter()
			.find(|row| row.attendee_id == id)
			.map(|row| (row.table_no, row.seat_no))
			.expect("Attendee must exist.")
	};

	assert_eq!(seat_of(a.attendee_id), (None, None));
	assert_eq!(seat_of(b.attendee_id), (Some(1), Some(0)));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
