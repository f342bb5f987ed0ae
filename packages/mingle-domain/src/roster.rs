use std::collections::BTreeSet;

/// Per-run partition of an event's going attendees into unallocated and
/// excluded sets. One roster per run; never shared across runs. Every id
/// that leaves `unallocated` lands in `excluded`, so after the loop the two
/// sets are disjoint and their union is the initial attendee set.
#[derive(Debug)]
pub struct Roster {
	all: BTreeSet<i64>,
	unallocated: BTreeSet<i64>,
	excluded: BTreeSet<i64>,
}

impl Roster {
	pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
		let all: BTreeSet<i64> = ids.into_iter().collect();
		let unallocated = all.clone();

		Self { all, unallocated, excluded: BTreeSet::new() }
	}

	/// Lowest unallocated id. Deterministic pick order keeps runs
	/// reproducible.
	pub fn next_unallocated(&self) -> Option<i64> {
		self.unallocated.iter().next().copied()
	}

	pub fn unallocated_len(&self) -> usize {
		self.unallocated.len()
	}

	pub fn is_unallocated(&self, id: i64) -> bool {
		self.unallocated.contains(&id)
	}

	/// Everyone a candidate search for `attendee` must not return: all ids
	/// no longer unallocated, plus the attendee itself. Grows monotonically
	/// as the run progresses.
	pub fn exclusion_for(&self, attendee: i64) -> Vec<i64> {
		let mut excluded: Vec<i64> =
			self.all.difference(&self.unallocated).copied().collect();

		if !excluded.contains(&attendee) {
			excluded.push(attendee);
		}

		excluded.sort_unstable();

		excluded
	}

	/// The candidate pool for `attendee`: every other unallocated id.
	pub fn candidates_for(&self, attendee: i64) -> Vec<i64> {
		self.unallocated.iter().copied().filter(|id| *id != attendee).collect()
	}

	/// Remove `id` from the unallocated set without pairing it (no data, no
	/// match after all attempts, or an invalid candidate budget exhausted).
	pub fn retire(&mut self, id: i64) {
		if self.unallocated.remove(&id) {
			self.excluded.insert(id);
		}
	}

	/// Commit `(a, b)` as a pair. Both sides must still be unallocated and
	/// distinct; returns false (and mutates nothing) otherwise.
	pub fn commit_pair(&mut self, a: i64, b: i64) -> bool {
		if a == b || !self.unallocated.contains(&a) || !self.unallocated.contains(&b) {
			return false;
		}

		self.unallocated.remove(&a);
		self.unallocated.remove(&b);
		self.excluded.insert(a);
		self.excluded.insert(b);

		true
	}

	/// Ids still unallocated, in ascending order.
	pub fn leftover(&self) -> Vec<i64> {
		self.unallocated.iter().copied().collect()
	}

	pub fn excluded_len(&self) -> usize {
		self.excluded.len()
	}
}
