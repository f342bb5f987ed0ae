use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use mingle_domain::{seating, strategy::clamp_chaos};
use mingle_storage::{models::Attendee, queries};

use crate::{
	AttendeeProfile, CancelToken, EngineScorer, MatchService, ServiceResult, pairing, storage_err,
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
	EventNotFound,
	InsufficientAttendees,
	NoPairsProduced,
	AllocatorOverflow,
	Cancelled,
}

/// Summary of one matching run. `failure` is set for every aborted run and
/// also marks the one degraded-but-successful case: a capacity overflow
/// seats what fits and reports `AllocatorOverflow` with `success` still
/// true.
#[derive(Clone, Debug, Serialize)]
pub struct RunResult {
	pub run_id: Uuid,
	pub event_id: i64,
	pub success: bool,
	pub attendee_count: u32,
	pub pair_count: u32,
	pub seated_count: u32,
	pub unallocated_count: u32,
	pub failure: Option<FailureReason>,
}

impl RunResult {
	fn failed(run_id: Uuid, event_id: i64, attendee_count: u32, reason: FailureReason) -> Self {
		Self {
			run_id,
			event_id,
			success: false,
			attendee_count,
			pair_count: 0,
			seated_count: 0,
			unallocated_count: attendee_count,
			failure: Some(reason),
		}
	}
}

impl MatchService {
	/// Run matching and seat allocation for one event, start to finish.
	/// Event-level precondition failures come back as an unsuccessful
	/// `RunResult`; only infrastructure errors surface as `Err`.
	pub async fn run_matching(&self, event_id: i64) -> ServiceResult<RunResult> {
		self.run_matching_with_cancel(event_id, &CancelToken::new()).await
	}

	pub async fn run_matching_with_cancel(
		&self,
		event_id: i64,
		cancel: &CancelToken,
	) -> ServiceResult<RunResult> {
		let run_id = Uuid::new_v4();

		info!(%run_id, event_id, "Starting matching run.");

		let Some(event) = queries::fetch_event(&self.db, event_id).await.map_err(storage_err)?
		else {
			warn!(%run_id, event_id, "Event not found.");

			return Ok(RunResult::failed(run_id, event_id, 0, FailureReason::EventNotFound));
		};
		let chaos_level = clamp_chaos(event.chaos_level);
		let attendees =
			queries::fetch_going_attendees(&self.db, event_id).await.map_err(storage_err)?;
		let attendee_count = attendees.len() as u32;

		info!(
			%run_id,
			event = %event.name,
			chaos_level,
			total_tables = event.total_tables,
			ppl_per_table = event.ppl_per_table,
			going = attendee_count,
			"Loaded event."
		);

		if attendee_count < 2 {
			warn!(%run_id, event_id, going = attendee_count, "Not enough going attendees.");

			return Ok(RunResult::failed(
				run_id,
				event_id,
				attendee_count,
				FailureReason::InsufficientAttendees,
			));
		}

		let profiles = self.load_profiles(&attendees).await?;
		let scorer = EngineScorer::new(&self.cfg, &self.providers);
		let report = pairing::pair_attendees(
			event_id,
			chaos_level,
			&profiles,
			&scorer,
			self.cfg.matching.max_attempts,
			cancel,
		)
		.await;

		if report.cancelled {
			warn!(%run_id, event_id, "Run cancelled; seats untouched.");

			return Ok(RunResult::failed(
				run_id,
				event_id,
				attendee_count,
				FailureReason::Cancelled,
			));
		}
		if report.pairs.is_empty() {
			warn!(%run_id, event_id, "No pairs produced.");

			return Ok(RunResult::failed(
				run_id,
				event_id,
				attendee_count,
				FailureReason::NoPairsProduced,
			));
		}

		let plan = seating::allocate(&report.pairs, event.total_tables, event.ppl_per_table);

		if plan.overflowed() {
			warn!(
				%run_id,
				event_id,
				unseated = plan.unseated.len(),
				capacity = event.total_tables * event.ppl_per_table,
				"Seating capacity exceeded; seating the prefix."
			);
		}

		queries::apply_seat_plan(&self.db, event_id, &plan).await.map_err(storage_err)?;

		let seated_count = plan.seated_count() as u32;
		let result = RunResult {
			run_id,
			event_id,
			success: true,
			attendee_count,
			pair_count: report.pairs.len() as u32,
			seated_count,
			unallocated_count: attendee_count - seated_count,
			failure: plan.overflowed().then_some(FailureReason::AllocatorOverflow),
		};

		info!(
			%run_id,
			event_id,
			pairs = result.pair_count,
			seated = result.seated_count,
			unallocated = result.unallocated_count,
			"Matching run complete."
		);

		Ok(result)
	}

	/// One snapshot of facts and answered-opinion counts for the whole run,
	/// so pairing iterations never observe concurrently-mutated data.
	async fn load_profiles(
		&self,
		attendees: &[Attendee],
	) -> ServiceResult<BTreeMap<i64, AttendeeProfile>> {
		let ids: Vec<i64> = attendees.iter().map(|attendee| attendee.attendee_id).collect();
		let mut profiles: BTreeMap<i64, AttendeeProfile> =
			ids.iter().map(|id| (*id, AttendeeProfile::default())).collect();

		for (attendee_id, fact) in
			queries::fetch_fact_texts(&self.db, &ids).await.map_err(storage_err)?
		{
			if let Some(profile) = profiles.get_mut(&attendee_id) {
				profile.facts.push(fact);
			}
		}
		for (attendee_id, count) in
			queries::fetch_answer_counts(&self.db, &ids).await.map_err(storage_err)?
		{
			if let Some(profile) = profiles.get_mut(&attendee_id) {
				profile.answered_opinions = count as u32;
			}
		}

		Ok(profiles)
	}
}

/// Fire-and-forget entry point: runs matching on a background task and hands
/// back the join handle. Callers that want the synchronous profile use
/// `run_matching` directly.
pub fn spawn_matching(
	service: Arc<MatchService>,
	event_id: i64,
) -> JoinHandle<ServiceResult<RunResult>> {
	tokio::spawn(async move { service.run_matching(event_id).await })
}
