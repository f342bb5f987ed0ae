use std::collections::BTreeMap;

use tracing::{info, warn};

use mingle_domain::roster::Roster;

use crate::{CancelToken, CandidateScorer, MatchRequest};

/// Per-run snapshot of one attendee's matching signal.
#[derive(Clone, Debug, Default)]
pub struct AttendeeProfile {
	pub facts: Vec<String>,
	pub answered_opinions: u32,
}

impl AttendeeProfile {
	pub fn has_opinions(&self) -> bool {
		self.answered_opinions > 0
	}

	pub fn has_data(&self) -> bool {
		!self.facts.is_empty() || self.has_opinions()
	}
}

#[derive(Debug, Default)]
pub struct PairingReport {
	pub pairs: Vec<(i64, i64)>,
	pub skipped_no_data: Vec<i64>,
	pub unmatched: Vec<i64>,
	/// Ids still unallocated at termination (zero or one on a completed run,
	/// more after cancellation).
	pub leftover: Vec<i64>,
	pub cancelled: bool,
}

/// Pair attendees until fewer than two remain unallocated. The lowest
/// unallocated id goes first; each attendee gets up to `max_attempts`
/// scorer invocations walking the retry ladder. A scorer error, a sentinel
/// no-match, and an id outside the unallocated set all consume one attempt.
pub async fn pair_attendees(
	event_id: i64,
	chaos_level: f32,
	profiles: &BTreeMap<i64, AttendeeProfile>,
	scorer: &dyn CandidateScorer,
	max_attempts: u32,
	cancel: &CancelToken,
) -> PairingReport {
	let mut roster = Roster::new(profiles.keys().copied());
	let mut report = PairingReport::default();

	while roster.unallocated_len() >= 2 {
		if cancel.is_cancelled() {
			warn!(event_id, "Pairing cancelled between iterations.");

			report.cancelled = true;

			break;
		}

		let Some(attendee_id) = roster.next_unallocated() else {
			break;
		};
		let profile = profiles.get(&attendee_id).cloned().unwrap_or_default();

		if !profile.has_data() {
			warn!(event_id, attendee_id, "Attendee has no facts or opinions. Skipping.");

			roster.retire(attendee_id);
			report.skipped_no_data.push(attendee_id);

			continue;
		}

		let exclude_ids = roster.exclusion_for(attendee_id);
		let candidates = roster.candidates_for(attendee_id);

		info!(
			event_id,
			attendee_id,
			remaining = roster.unallocated_len(),
			excluded = exclude_ids.len(),
			"Matching attendee."
		);

		let mut matched = None;

		for attempt in 0..max_attempts {
			let req = MatchRequest {
				event_id,
				attendee_id,
				facts: &profile.facts,
				has_opinions: profile.has_opinions(),
				chaos_level,
				exclude_ids: &exclude_ids,
				candidates: &candidates,
				attempt,
			};

			match scorer.find_match(req).await {
				Ok(outcome) => match outcome.matched {
					Some(candidate) if roster.is_unallocated(candidate)
						&& candidate != attendee_id =>
					{
						info!(
							event_id,
							attendee_id,
							candidate,
							confidence = outcome.confidence,
							reasoning = %outcome.reasoning,
							"Matched pair."
						);

						matched = Some(candidate);

						break;
					},
					Some(candidate) => {
						warn!(
							event_id,
							attendee_id,
							candidate,
							attempt,
							"Scorer returned a candidate outside the unallocated set."
						);
					},
					None => {
						info!(
							event_id,
							attendee_id,
							attempt,
							reasoning = %outcome.reasoning,
							"No match this attempt."
						);
					},
				},
				Err(err) => {
					warn!(event_id, attendee_id, attempt, error = %err, "Scorer attempt failed.");
				},
			}
		}

		match matched {
			Some(candidate) if roster.commit_pair(attendee_id, candidate) => {
				report.pairs.push((attendee_id, candidate));
			},
			_ => {
				warn!(event_id, attendee_id, "No match found after {max_attempts} attempts.");

				roster.retire(attendee_id);
				report.unmatched.push(attendee_id);
			},
		}
	}

	report.leftover = roster.leftover();

	if !report.leftover.is_empty() && !report.cancelled {
		warn!(event_id, leftover = ?report.leftover, "Odd attendee count; leftover unallocated.");
	}

	info!(
		event_id,
		pairs = report.pairs.len(),
		unmatched = report.unmatched.len(),
		skipped = report.skipped_no_data.len(),
		"Pairing complete."
	);

	report
}
