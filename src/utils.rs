// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Utility functions for duckchat

/// Local Tor Browser SOCKS endpoint
pub const TOR_BROWSER_PROXY: &str = "socks5://127.0.0.1:9150";

/// Expand the `tb` proxy alias to the local Tor Browser endpoint.
///
/// Empty strings are treated as "no proxy".
pub fn expand_proxy_alias(proxy: Option<&str>) -> Option<String> {
    match proxy.map(str::trim) {
        None | Some("") => None,
        Some("tb") => Some(TOR_BROWSER_PROXY.to_string()),
        Some(other) => Some(other.to_string()),
    }
}

/// Proxy schemes the transport accepts
pub fn is_supported_proxy_scheme(proxy: &str) -> bool {
    let scheme = proxy.split("://").next().unwrap_or_default();
    proxy.contains("://") && matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https" | "socks5" | "socks5h")
}

/// Approximate token count of an outgoing message: a quarter of its
/// character count, never less than one.
pub fn estimate_tokens(text: &str) -> u64 {
    ((text.chars().count() / 4) as u64).max(1)
}

/// Position of the first occurrence of `needle` in `haystack`
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_proxy_alias() {
        assert_eq!(expand_proxy_alias(Some("tb")), Some(TOR_BROWSER_PROXY.to_string()));
        assert_eq!(
            expand_proxy_alias(Some("socks5://10.0.0.1:1080")),
            Some("socks5://10.0.0.1:1080".to_string())
        );
        assert_eq!(expand_proxy_alias(Some("  ")), None);
        assert_eq!(expand_proxy_alias(None), None);
    }

    #[test]
    fn test_supported_proxy_schemes() {
        assert!(is_supported_proxy_scheme("http://127.0.0.1:8080"));
        assert!(is_supported_proxy_scheme("HTTPS://proxy.example.com"));
        assert!(is_supported_proxy_scheme("socks5://127.0.0.1:9150"));
        assert!(!is_supported_proxy_scheme("ftp://127.0.0.1"));
        assert!(!is_supported_proxy_scheme("127.0.0.1:8080"));
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("Hi"), 1);
        assert_eq!(estimate_tokens("Hello, world!"), 3);
        // counts characters, not bytes
        assert_eq!(estimate_tokens("привет мир!!"), 3);
    }

    #[test]
    fn test_find_subslice() {
        assert_eq!(find_subslice(b"data: x\n\ndata:", b"\n\n"), Some(7));
        assert_eq!(find_subslice(b"abc", b"abcd"), None);
        assert_eq!(find_subslice(b"abc", b""), None);
        assert_eq!(find_subslice(b"abc", b"z"), None);
    }
}
