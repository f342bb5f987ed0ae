use serde::{Deserialize, Serialize};

/// How a candidate is chosen for an attendee. Selected once per attendee
/// from the event's chaos level; `OpinionDivergence` is chosen instead when
/// the attendee has answered opinions but no facts to search with.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
	Harmony,
	Balanced,
	Chaos,
	OpinionDivergence,
}

#[derive(Clone, Copy, Debug)]
pub struct ChaosThresholds {
	pub harmony_max: f32,
	pub balanced_max: f32,
}

impl Strategy {
	pub fn from_chaos(chaos_level: f32, thresholds: ChaosThresholds) -> Self {
		let chaos = clamp_chaos(chaos_level);

		if chaos <= thresholds.harmony_max {
			Self::Harmony
		} else if chaos <= thresholds.balanced_max {
			Self::Balanced
		} else {
			Self::Chaos
		}
	}
}

/// Chaos levels live in [0,10]; out-of-range caller input is clamped rather
/// than rejected. NaN falls to 0 (full harmony).
pub fn clamp_chaos(chaos_level: f32) -> f32 {
	if chaos_level.is_nan() {
		return 0.0;
	}

	chaos_level.clamp(0.0, 10.0)
}
