//! Prose helpers shared by the differ and the renderer.

/// Join items as English prose: `A`, `A and B`, `A, B and C`.
///
/// Callers only format non-empty lists; an empty slice yields an empty string.
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [head @ .., last] => {
            let head: Vec<&str> = head.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Pick the singular or plural form of a noun for `count` items.
pub fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}
