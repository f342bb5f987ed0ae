pub fn render_schema(vector_dim: u32) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<VECTOR_DIM>", &vector_dim.to_string())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_events.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_events.sql")),
				"tables/002_attendees.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_attendees.sql")),
				"tables/003_facts.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_facts.sql")),
				"tables/004_opinions.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_opinions.sql")),
				"tables/005_opinion_answers.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_opinion_answers.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rendered_schema_substitutes_vector_dim() {
		let sql = render_schema(768);

		assert!(sql.contains("vector(768)"));
		assert!(!sql.contains("<VECTOR_DIM>"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS opinion_answers"));
	}
}
