//! Small string helpers shared by the prompt builders.

/// Keeps the first `max_chars` characters and marks the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// Same cut as [`truncate_chars`] without the marker.
pub fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello...");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w...");
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("añb", 2), "añ");
        assert_eq!(take_chars("", 3), "");
    }

    proptest::proptest! {
        #[test]
        fn prop_truncation_keeps_prefix(text in ".{0,80}", max in 0usize..100) {
            let out = truncate_chars(&text, max);
            if text.chars().count() <= max {
                proptest::prop_assert_eq!(&out, &text);
            } else {
                proptest::prop_assert!(out.ends_with("..."));
                proptest::prop_assert_eq!(out.chars().count(), max + 3);
                proptest::prop_assert!(text.starts_with(take_chars(&text, max)));
            }
        }
    }
}
