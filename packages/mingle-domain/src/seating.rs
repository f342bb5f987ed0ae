#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SeatAssignment {
	pub attendee_id: i64,
	pub table_no: i32,
	pub seat_no: i32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SeatPlan {
	pub assignments: Vec<SeatAssignment>,
	/// Attendees that did not fit the grid, in pair order. A capacity
	/// shortfall degrades the plan; it never invalidates seats already
	/// assigned.
	pub unseated: Vec<i64>,
}

impl SeatPlan {
	pub fn seated_count(&self) -> usize {
		self.assignments.len()
	}

	pub fn overflowed(&self) -> bool {
		!self.unseated.is_empty()
	}
}

/// Pack pairs into the table/seat grid in order: pair order and within-pair
/// order are preserved, seat index `i` maps to table `i / ppl_per_table`,
/// seat `i % ppl_per_table`. Pure and idempotent for a given pair list.
pub fn allocate(pairs: &[(i64, i64)], total_tables: i32, ppl_per_table: i32) -> SeatPlan {
	let mut plan = SeatPlan::default();

	if total_tables <= 0 || ppl_per_table <= 0 {
		plan.unseated = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();

		return plan;
	}

	for (index, attendee_id) in pairs.iter().flat_map(|&(a, b)| [a, b]).enumerate() {
		let table_no = index as i32 / ppl_per_table;

		if table_no >= total_tables {
			plan.unseated.push(attendee_id);

			continue;
		}

		plan.assignments.push(SeatAssignment {
			attendee_id,
			table_no,
			seat_no: index as i32 % ppl_per_table,
		});
	}

	plan
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pairs(ids: &[i64]) -> Vec<(i64, i64)> {
		ids.chunks(2).map(|pair| (pair[0], pair[1])).collect()
	}

	#[test]
	fn four_pairs_fit_three_tables_of_three() {
		let plan = allocate(&pairs(&[1, 2, 3, 4, 5, 6, 7, 8]), 3, 3);

		assert_eq!(plan.seated_count(), 8);
		assert!(!plan.overflowed());
		assert!(plan.assignments.iter().all(|seat| (0..3).contains(&seat.table_no)));
		assert!(plan.assignments.iter().all(|seat| (0..3).contains(&seat.seat_no)));

		// Pair order and within-pair order are preserved.
		let order: Vec<i64> = plan.assignments.iter().map(|seat| seat.attendee_id).collect();

		assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7, 8]);
		assert_eq!(plan.assignments[0], SeatAssignment { attendee_id: 1, table_no: 0, seat_no: 0 });
		assert_eq!(plan.assignments[3], SeatAssignment { attendee_id: 4, table_no: 1, seat_no: 0 });
	}

	#[test]
	fn overflow_seats_prefix_and_reports_remainder() {
		let ids: Vec<i64> = (1..=20).collect();
		let plan = allocate(&pairs(&ids), 3, 6);

		assert_eq!(plan.seated_count(), 18);
		assert_eq!(plan.unseated, vec![19, 20]);
		assert!(plan.overflowed());

		let max_table = plan.assignments.iter().map(|seat| seat.table_no).max();

		assert_eq!(max_table, Some(2));
	}

	#[test]
	fn allocation_is_idempotent() {
		let input = pairs(&[5, 9, 2, 7]);
		let first = allocate(&input, 2, 2);
		let second = allocate(&input, 2, 2);

		assert_eq!(first, second);
	}

	#[test]
	fn capacity_invariant_holds_for_every_assignment() {
		let ids: Vec<i64> = (1..=14).collect();
		let plan = allocate(&pairs(&ids), 4, 3);

		for seat in &plan.assignments {
			assert!(seat.table_no >= 0 && seat.table_no < 4);
			assert!(seat.seat_no >= 0 && seat.seat_no < 3);
		}

		assert_eq!(plan.seated_count() + plan.unseated.len(), 14);
	}

	#[test]
	fn empty_pairs_produce_empty_plan() {
		let plan = allocate(&[], 3, 3);

		assert_eq!(plan, SeatPlan::default());
	}

	#[test]
	fn degenerate_grid_seats_nobody() {
		let plan = allocate(&pairs(&[1, 2]), 0, 3);

		assert_eq!(plan.seated_count(), 0);
		assert_eq!(plan.unseated, vec![1, 2]);
	}
}
