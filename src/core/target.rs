use super::errors::{ReconError, ReconResult};
use regex::Regex;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::OnceLock;

const SCHEMES: &[&str] = &["https://", "http://"];
const CANONICAL_SCHEME: &str = "https://";
const MAX_HOST_LEN: usize = 253;

fn hostname_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$")
            .expect("hostname pattern is valid")
    })
}

/// A scan target that passed host validation.
///
/// Tools disagree on how they want the target spelled: port scanners take a
/// bare host, web fuzzers want a full URL. Both forms are derived from the same
/// normalized host so they can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    raw: String,
    host: String,
}

impl Target {
    pub fn parse(raw: &str) -> ReconResult<Self> {
        let host = normalize_host(raw);
        validate_host(&host).map_err(|reason| ReconError::invalid_target(raw.trim(), reason))?;

        Ok(Self {
            raw: raw.trim().to_string(),
            host,
        })
    }

    /// The target as the caller typed it (trimmed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn bare_host(&self) -> &str {
        &self.host
    }

    pub fn canonical_url(&self) -> String {
        normalize_url(&self.host)
    }
}

/// Reduce any spelling of a target to its bare host: lowercase, no scheme,
/// no path, no leading `www.`, no trailing dot.
///
/// Steps are applied until nothing changes, which makes the function
/// idempotent for arbitrary input.
pub fn normalize_host(raw: &str) -> String {
    fixpoint(raw, |value| {
        let value = strip_location(value);
        value.strip_prefix("www.").unwrap_or(&value).trim_end_matches('.').to_string()
    })
}

/// Normalizes an allow-list entry. Unlike [`normalize_host`] a leading `www.`
/// is kept: `www.corp.com` must not widen to `corp.com`.
pub fn normalize_scope_entry(raw: &str) -> String {
    fixpoint(raw, strip_location)
}

fn fixpoint(raw: &str, step: impl Fn(&str) -> String) -> String {
    let mut current = raw.to_string();
    loop {
        let next = step(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Canonical URL form of a target: `https://` plus the normalized host.
pub fn normalize_url(raw: &str) -> String {
    let host = normalize_host(raw);
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("{}[{}]", CANONICAL_SCHEME, host)
    } else {
        format!("{}{}", CANONICAL_SCHEME, host)
    }
}

/// Lowercase, drop every leading scheme, cut at the path and unwrap an IPv6
/// literal.
fn strip_location(value: &str) -> String {
    let mut value = value.trim().to_ascii_lowercase();

    while let Some(rest) = SCHEMES.iter().find_map(|scheme| value.strip_prefix(scheme)) {
        value = rest.trim_start().to_string();
    }

    if let Some(idx) = value.find(['/', '?', '#']) {
        value.truncate(idx);
    }

    if value.starts_with('[') && value.ends_with(']') && value.len() >= 2 {
        value = value[1..value.len() - 1].to_string();
    }

    value.trim_end_matches('.').to_string()
}

/// Hosts end up as a single argv element of an external tool, so anything
/// that is not a plain DNS name or IP literal is refused outright.
fn validate_host(host: &str) -> Result<(), String> {
    if host.is_empty() {
        return Err("host is empty".to_string());
    }
    if host.starts_with('-') {
        return Err("host may not start with '-'".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if host.len() > MAX_HOST_LEN {
        return Err(format!("host is longer than {} characters", MAX_HOST_LEN));
    }
    if !hostname_pattern().is_match(host) {
        return Err("host contains characters not allowed in a domain name".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("example.com", "example.com", "https://example.com")]
    #[case("  Example.COM ", "example.com", "https://example.com")]
    #[case("http://www.example.com", "example.com", "https://example.com")]
    #[case("https://sub.example.com/login?next=/", "sub.example.com", "https://sub.example.com")]
    #[case("www.example.com.", "example.com", "https://example.com")]
    #[case("10.0.0.5", "10.0.0.5", "https://10.0.0.5")]
    #[case("[::1]", "::1", "https://[::1]")]
    fn test_target_forms(#[case] raw: &str, #[case] host: &str, #[case] url: &str) {
        let target = Target::parse(raw).unwrap();
        assert_eq!(target.bare_host(), host);
        assert_eq!(target.canonical_url(), url);
    }

    #[rstest]
    #[case("")]
    #[case("https://")]
    #[case("example.com; rm -rf /")]
    #[case("-oN /tmp/x")]
    #[case("$(id).example.com")]
    #[case("example.com:8080")]
    #[case("exa mple.com")]
    fn test_rejects_unsafe_targets(#[case] raw: &str) {
        let err = Target::parse(raw).unwrap_err();
        assert!(matches!(err, ReconError::InvalidTarget { .. }), "{raw:?} -> {err}");
    }

    #[test]
    fn test_raw_is_preserved() {
        let target = Target::parse(" https://www.Example.com ").unwrap();
        assert_eq!(target.raw(), "https://www.Example.com");
    }

    #[rstest]
    #[case("https://http://www.www.example.com", "example.com")]
    #[case("http://https://example.com/path", "example.com")]
    #[case("HTTPS://HTTPS://www.Example.com./", "example.com")]
    fn test_nested_prefixes_collapse(#[case] raw: &str, #[case] host: &str) {
        assert_eq!(normalize_host(raw), host);
        assert_eq!(Target::parse(raw).unwrap().bare_host(), host);
    }

    #[rstest]
    #[case("www.corp.com", "www.corp.com")]
    #[case("https://www.Corp.com/login", "www.corp.com")]
    #[case(" corp.com. ", "corp.com")]
    fn test_scope_entry_keeps_www(#[case] raw: &str, #[case] entry: &str) {
        assert_eq!(normalize_scope_entry(raw), entry);
    }

    proptest! {
        #[test]
        fn normalize_host_is_idempotent(raw in ".{0,40}") {
            let once = normalize_host(&raw);
            prop_assert_eq!(normalize_host(&once), once);
        }

        #[test]
        fn normalize_scope_entry_is_idempotent(raw in ".{0,40}") {
            let once = normalize_scope_entry(&raw);
            prop_assert_eq!(normalize_scope_entry(&once), once);
        }

        #[test]
        fn normalize_url_is_idempotent(raw in ".{0,40}") {
            let once = normalize_url(&raw);
            prop_assert_eq!(normalize_url(&once), once);
        }

        #[test]
        fn urlish_input_normalizes_like_host(host in "[a-v][a-z0-9]{0,10}(\\.[a-z]{2,5}){1,2}") {
            prop_assert_eq!(normalize_url(&format!("http://www.{}/", host)), format!("https://{}", host));
        }
    }
}
