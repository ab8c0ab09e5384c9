//! URI reference syntax check.
//!
//! A safe parse of the generic URI reference grammar: scheme characters,
//! no spaces or forbidden ASCII, well-formed percent escapes, a single
//! fragment and square brackets only around an IP-literal host. The empty
//! string is a valid (empty relative) reference.

use once_cell::sync::Lazy;
use regex::Regex;

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*$").expect("valid scheme pattern"));

/// ASCII characters never allowed anywhere in a URI reference.
const FORBIDDEN: &[char] = &['"', '<', '>', '\\', '^', '`', '{', '|', '}'];

/// Components of a syntactically valid URI reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UriReference<'a> {
    pub scheme: Option<&'a str>,
    pub authority: Option<&'a str>,
    /// Path, or the scheme-specific part of an opaque URI
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl<'a> UriReference<'a> {
    /// Parse `input`; `None` when it is not a valid URI reference.
    pub fn parse(input: &'a str) -> Option<Self> {
        if !valid_characters(input) {
            return None;
        }

        let (before_fragment, fragment) = match input.split_once('#') {
            Some((head, fragment)) => {
                if fragment.contains('#') {
                    return None;
                }
                (head, Some(fragment))
            }
            None => (input, None),
        };

        let (scheme, rest) = match before_fragment.find([':', '/', '?']) {
            Some(p) if before_fragment[p..].starts_with(':') => {
                let scheme = &before_fragment[..p];
                if !SCHEME.is_match(scheme) {
                    return None;
                }
                let rest = &before_fragment[p + 1..];
                if rest.is_empty() {
                    return None;
                }
                (Some(scheme), rest)
            }
            _ => (None, before_fragment),
        };

        if scheme.is_some() && !rest.starts_with('/') {
            return Some(Self {
                scheme,
                authority: None,
                path: rest,
                query: None,
                fragment,
            });
        }

        let (hierarchical, query) = match rest.split_once('?') {
            Some((head, query)) => (head, Some(query)),
            None => (rest, None),
        };

        let (authority, path) = match hierarchical.strip_prefix("//") {
            Some(after) => {
                let end = after.find('/').unwrap_or(after.len());
                let (authority, path) = after.split_at(end);
                if authority.is_empty() && path.is_empty() {
                    return None;
                }
                if !valid_authority(authority) {
                    return None;
                }
                (Some(authority), path)
            }
            None => (None, hierarchical),
        };

        if path.contains(['[', ']']) {
            return None;
        }

        Some(Self {
            scheme,
            authority,
            path,
            query,
            fragment,
        })
    }

    /// Whether the reference has a scheme.
    pub fn is_absolute(&self) -> bool {
        self.scheme.is_some()
    }
}

fn valid_characters(input: &str) -> bool {
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c.is_whitespace() || c.is_control() || FORBIDDEN.contains(&c) {
            return false;
        }
        if c == '%' {
            let hex = (chars.next(), chars.next());
            match hex {
                (Some(h), Some(l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => {}
                _ => return false,
            }
        }
    }
    true
}

/// Brackets may only enclose an IP-literal host, optionally followed by a port.
fn valid_authority(authority: &str) -> bool {
    let (userinfo, host_port) = match authority.rsplit_once('@') {
        Some((userinfo, host_port)) => (Some(userinfo), host_port),
        None => (None, authority),
    };
    if userinfo.is_some_and(|u| u.contains(['[', ']'])) {
        return false;
    }
    if !host_port.contains(['[', ']']) {
        return true;
    }

    let Some(literal) = host_port.strip_prefix('[') else {
        return false;
    };
    let Some((address, after)) = literal.split_once(']') else {
        return false;
    };
    let address_ok = !address.is_empty()
        && address
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.');
    let port_ok = after.is_empty()
        || after
            .strip_prefix(':')
            .is_some_and(|port| port.chars().all(|c| c.is_ascii_digit()));
    address_ok && port_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_uri_components() {
        let uri = UriReference::parse("https://example.org/a/b?x=1#top").unwrap();
        assert_eq!(uri.scheme, Some("https"));
        assert_eq!(uri.authority, Some("example.org"));
        assert_eq!(uri.path, "/a/b");
        assert_eq!(uri.query, Some("x=1"));
        assert_eq!(uri.fragment, Some("top"));
        assert!(uri.is_absolute());
    }

    #[test]
    fn test_opaque_and_relative_references() {
        assert!(UriReference::parse("mailto:someone@example.org").is_some());
        assert!(UriReference::parse("chapter2.html").is_some());
        assert!(UriReference::parse("example.org").is_some());
        assert!(UriReference::parse("Click").is_some());
        assert!(UriReference::parse("").is_some());
    }

    #[test]
    fn test_rejects_spaces_and_forbidden_characters() {
        assert!(UriReference::parse("Click here").is_none());
        assert!(UriReference::parse("a<b").is_none());
        assert!(UriReference::parse("a|b").is_none());
        assert!(UriReference::parse("tab\there").is_none());
    }

    #[test]
    fn test_percent_escapes() {
        assert!(UriReference::parse("a%20b").is_some());
        assert!(UriReference::parse("a%2").is_none());
        assert!(UriReference::parse("a%zz").is_none());
    }

    #[test]
    fn test_scheme_rules() {
        assert!(UriReference::parse(":foo").is_none());
        assert!(UriReference::parse("http:").is_none());
        assert!(UriReference::parse("1http:foo").is_none());
        assert!(UriReference::parse("http://").is_none());
        assert!(UriReference::parse("file:///tmp/x").is_some());
    }

    #[test]
    fn test_fragment_and_brackets() {
        assert!(UriReference::parse("a#b#c").is_none());
        assert!(UriReference::parse("http://[::1]:8080/x").is_some());
        assert!(UriReference::parse("http://[zz]/").is_none());
        assert!(UriReference::parse("/path[1]").is_none());
    }
}
