/// Drops `;` comments and blank lines; what is left is trimmed, in source order.
pub fn clean_lines(source: &str) -> Vec<&str> {
    source
        .lines()
        .map(|raw| raw.split(';').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .collect()
}
