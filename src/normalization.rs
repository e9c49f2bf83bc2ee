/// Normalizes free text by stripping leading and trailing whitespace.
/// Inner whitespace is preserved.
///
/// ```
/// use survey::normalization::normalize_comment;
/// assert_eq!(normalize_comment("  hello  "), "hello");
/// ```
pub fn normalize_comment(comment: impl AsRef<str>) -> String {
    comment.as_ref().trim().to_owned()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::normalize_comment;

    fn count_whitespace(s: impl AsRef<str>) -> usize {
        s.as_ref().chars().filter(|c| c.is_whitespace()).count()
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(normalize_comment(" \t\n "), "");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 10000, ..ProptestConfig::default()
        })]

        #[test]
        fn normalization_works(string in "(\\S.*\\S|\\S+)", space_before in "\\s*", space_after in "\\s*") {
            let normalized = normalize_comment(format!("{}{}{}", space_before, string, space_after));

            prop_assert!(!normalized.starts_with(char::is_whitespace) && !normalized.ends_with(char::is_whitespace), "{:?} (normalized form of {:?}) has no leading or trailing whitespace", normalized, string);

            prop_assert_eq!(count_whitespace(&normalized), count_whitespace(&string), "{:?} (normalized form of {:?}) preserves inner whitespace", normalized, string);
        }
    }
}
