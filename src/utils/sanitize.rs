use regex::Regex;
use std::sync::OnceLock;

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\-_\.]").expect("static regex"))
}

/// Replace characters that aren't safe in file names.
pub fn sanitize_target(target: &str) -> String {
    unsafe_chars().replace_all(target, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("example.com", "example.com")]
    #[case("https://example.com/admin", "https___example.com_admin")]
    #[case("2001:db8::1", "2001_db8__1")]
    #[case("api-1_test.io", "api-1_test.io")]
    fn test_sanitize_target(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_target(input), expected);
    }
}
