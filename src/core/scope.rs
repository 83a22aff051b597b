use super::target::normalize_scope_entry;
use serde::{Deserialize, Serialize};

/// How a scope entry authorizes a host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopePolicy {
    /// Host ends with the entry. `example.com` also admits `badexample.com`.
    #[default]
    Suffix,
    /// Host equals the entry or is a subdomain of it on a label boundary.
    Subdomain,
    Exact,
}

impl ScopePolicy {
    fn admits(self, host: &str, entry: &str) -> bool {
        match self {
            ScopePolicy::Suffix => host.ends_with(entry),
            ScopePolicy::Subdomain => {
                host == entry
                    || host
                        .strip_suffix(entry)
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
            ScopePolicy::Exact => host == entry,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeGuard {
    policy: ScopePolicy,
}

impl ScopeGuard {
    pub fn new(policy: ScopePolicy) -> Self {
        Self { policy }
    }

    /// True iff `host` is authorized by at least one entry of `allowed`.
    ///
    /// Entries are lowercased and stripped of scheme, path and trailing dot,
    /// but keep a leading `www.`. Blank entries are dropped: an empty suffix
    /// would otherwise authorize every host.
    pub fn check<S: AsRef<str>>(&self, host: &str, allowed: &[S]) -> bool {
        allowed
            .iter()
            .map(|entry| normalize_scope_entry(entry.as_ref()))
            .filter(|entry| !entry.is_empty())
            .any(|entry| self.policy.admits(host, &entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("example.com", &["example.com"], true)]
    #[case("sub.example.com", &["example.com"], true)]
    #[case("evil.net", &["example.com"], false)]
    #[case("badexample.com", &["example.com"], true)]
    #[case("example.com", &["other.org", "example.com"], true)]
    #[case("example.com", &["https://Example.com/"], true)]
    #[case("example.com", &["https://www.Example.com/"], false)]
    #[case("example.com", &["", "  "], false)]
    fn test_suffix_policy(#[case] host: &str, #[case] scope: &[&str], #[case] expected: bool) {
        assert_eq!(ScopeGuard::default().check(host, scope), expected);
    }

    #[rstest]
    #[case(ScopePolicy::Subdomain, "sub.example.com", true)]
    #[case(ScopePolicy::Subdomain, "example.com", true)]
    #[case(ScopePolicy::Subdomain, "badexample.com", false)]
    #[case(ScopePolicy::Exact, "example.com", true)]
    #[case(ScopePolicy::Exact, "sub.example.com", false)]
    fn test_stricter_policies(#[case] policy: ScopePolicy, #[case] host: &str, #[case] expected: bool) {
        assert_eq!(ScopeGuard::new(policy).check(host, &["example.com"]), expected);
    }

    #[rstest]
    #[case(ScopePolicy::Suffix, "mail.corp.com", false)]
    #[case(ScopePolicy::Suffix, "evilcorp.com", false)]
    #[case(ScopePolicy::Suffix, "corp.com", false)]
    #[case(ScopePolicy::Suffix, "www.corp.com", true)]
    #[case(ScopePolicy::Subdomain, "mail.corp.com", false)]
    #[case(ScopePolicy::Subdomain, "corp.com", false)]
    #[case(ScopePolicy::Subdomain, "app.www.corp.com", true)]
    #[case(ScopePolicy::Exact, "corp.com", false)]
    #[case(ScopePolicy::Exact, "www.corp.com", true)]
    fn test_www_entry_is_not_widened(#[case] policy: ScopePolicy, #[case] host: &str, #[case] expected: bool) {
        assert_eq!(ScopeGuard::new(policy).check(host, &["www.corp.com"]), expected);
    }

    #[test]
    fn test_empty_scope_rejects_everything() {
        let empty: [&str; 0] = [];
        assert!(!ScopeGuard::default().check("example.com", &empty));
    }

    proptest! {
        #[test]
        fn suffix_check_matches_ends_with(
            host in "[a-z0-9]{1,8}(\\.[a-z0-9]{1,8}){0,3}",
            scope in proptest::collection::vec("[a-z0-9]{1,8}(\\.[a-z0-9]{1,8}){0,2}", 0..4),
        ) {
            let expected = scope.iter().any(|entry| host.ends_with(entry.as_str()));
            prop_assert_eq!(ScopeGuard::default().check(&host, &scope), expected);
        }
    }
}
