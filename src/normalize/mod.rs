pub mod fields;
pub mod organization;
pub mod project;

pub use organization::normalize_organization;
pub use project::normalize_project;

/// First present value in declared precedence order.
pub(crate) fn first_present<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

/// Like `first_present`, but a blank string falls through to the next spelling.
/// Used for display names, where `""` means "not filled in".
pub(crate) fn first_non_blank(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_display_names_fall_through() {
        let picked = first_non_blank([Some("  ".to_string()), None, Some("Bangkhen".to_string())]);
        assert_eq!(picked.as_deref(), Some("Bangkhen"));
        assert_eq!(first_non_blank([Some(String::new())]), None);
        // first_present keeps its literal meaning
        assert_eq!(first_present([Some(""), Some("x")]), Some(""));
    }
}
