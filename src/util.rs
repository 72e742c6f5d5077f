/// Return at most `max_chars` characters of `input`, cut on a char boundary.
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// Truncate for display, appending `...` when anything was cut.
pub fn preview(input: &str, max_chars: usize) -> String {
    let head = truncate_chars(input, max_chars);
    if head.len() < input.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}
