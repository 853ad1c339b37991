/// Returns the input unless it is empty or only whitespace.
pub fn non_blank(input: &str) -> Option<&str> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}

pub fn first_line(input: &str) -> &str {
    input.lines().next().unwrap_or("").trim_end_matches('\r')
}

/// Every line after the first, trimmed, blank lines dropped, joined by single spaces.
pub fn remaining_lines(input: &str) -> String {
    input
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cuts `input` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut buf = String::with_capacity(byte_idx + 3);
            buf.push_str(&input[..byte_idx]);
            buf.push('…');
            buf
        }
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_of_commit_message() {
        assert_eq!(first_line("Add feature\nmore detail"), "Add feature");
        assert_eq!(first_line("Windows\r\nline"), "Windows");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn remaining_lines_skip_blank_separator() {
        assert_eq!(remaining_lines("Subject\n\nBody one\n  body two  "), "Body one body two");
        assert_eq!(remaining_lines("Subject only"), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé…");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank("x"), Some("x"));
    }
}
