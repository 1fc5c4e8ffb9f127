//! Identifier casing helpers for emitted module and file names.

/// `TaskNote` -> `task_note`, `HTTPServer` -> `httpserver` is avoided by
/// breaking on each upper-to-lower boundary.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let chars: Vec<char> = s.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_lowercase();
            let next_lower = i + 1 < chars.len() && chars[i + 1].is_lowercase();
            if i > 0 && (prev_lower || (chars[i - 1].is_uppercase() && next_lower)) {
                out.push('_');
            }
            for l in c.to_lowercase() {
                out.push(l);
            }
        } else {
            out.push(*c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_pascal_case() {
        assert_eq!(to_snake_case("Task"), "task");
        assert_eq!(to_snake_case("TaskNote"), "task_note");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn handles_acronym_runs() {
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("ParsedURL"), "parsed_url");
    }
}
