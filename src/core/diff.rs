use std::collections::HashSet;

/// Titles of `current` that appear nowhere in `previous`, in `current` order.
/// Matching is exact string equality and repeated titles are kept.
pub fn new_titles(current: &[String], previous: &[String]) -> Vec<String> {
    let seen: HashSet<&str> = previous.iter().map(String::as_str).collect();

    current
        .iter()
        .filter(|title| !seen.contains(title.as_str()))
        .cloned()
        .collect()
}
