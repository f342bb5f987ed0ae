use std::collections::HashMap;

/// Assemble an attendee's opinion vector. Component order follows
/// `opinion_ids` (callers pass them in ascending id order so vectors from
/// different calls are comparable); an unanswered opinion takes the neutral
/// value.
pub fn opinion_vector(
	opinion_ids: &[i64],
	answers: &HashMap<i64, i32>,
	neutral: i32,
) -> Vec<f32> {
	opinion_ids
		.iter()
		.map(|opinion_id| answers.get(opinion_id).copied().unwrap_or(neutral) as f32)
		.collect()
}

/// Raw dot product over answer vectors. Answers are unsigned magnitudes in
/// [0,10], not centered, so this is not cosine similarity and favors
/// large-magnitude profiles regardless of agreement direction.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unanswered_opinions_take_the_neutral_value() {
		let opinion_ids = [10_i64, 20, 30];
		let answers = HashMap::from([(10, 8), (30, 1)]);
		let vector = opinion_vector(&opinion_ids, &answers, 5);

		assert_eq!(vector, vec![8.0, 5.0, 1.0]);
	}

	#[test]
	fn zero_registered_opinions_give_zero_length_vectors() {
		let answers = HashMap::from([(10, 8)]);

		assert!(opinion_vector(&[], &answers, 5).is_empty());
	}

	#[test]
	fn component_order_follows_opinion_id_order() {
		let answers = HashMap::from([(1, 2), (2, 9)]);

		assert_eq!(opinion_vector(&[1, 2], &answers, 5), vec![2.0, 9.0]);
		assert_eq!(opinion_vector(&[2, 1], &answers, 5), vec![9.0, 2.0]);
	}

	#[test]
	fn dot_product_multiplies_componentwise() {
		assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
		assert_eq!(dot(&[], &[]), 0.0);
	}

	#[test]
	fn dot_product_favors_magnitude_over_agreement() {
		// Two maxed-out profiles outscore a genuinely opposed pair; the
		// selection preserves this behavior on purpose.
		let loud_a = [10.0, 10.0];
		let loud_b = [10.0, 10.0];
		let opposed = [0.0, 10.0];

		assert!(dot(&loud_a, &loud_b) > dot(&loud_a, &opposed));
	}
}
