use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// A random code for shareable room links
pub fn link_code(length: usize) -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

/// Joins names for a chat line, mentioning how many were left out past `limit`
pub fn name_list(names: &[String], limit: usize) -> String {
    let shown = names
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    match names.len().saturating_sub(limit) {
        0 => shown,
        rest => format!("{} and {} more", shown, rest),
    }
}
