//! Canonical host redirect decision.
//!
//! Compares the authority a request arrived on with the configured canonical host
//! and decides whether the client must be sent to the canonical address instead.
//! A host without an explicit port is treated as port 443, so `example.com` and
//! `example.com:443` name the same endpoint and never redirect to each other.

use axum::http::header::{HeaderValue, InvalidHeaderValue, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::{DEFAULT_HTTPS_PORT, REDIRECT_SCHEME};

/// Result of comparing a request host with the canonical host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    NoRedirect,
    /// Redirect to this host, exactly as configured
    RedirectTo(String),
}

/// Host and effective port of an authority string.
#[derive(Debug, Clone, Copy)]
pub struct HostPort<'a> {
    pub host: &'a str,
    pub port: u16,
}

impl<'a> HostPort<'a> {
    /// Split `host[:port]`, filling in the default HTTPS port.
    ///
    /// Returns `None` for a non-numeric or out-of-range port, a multi-colon host
    /// without brackets, or a malformed bracketed literal.
    pub fn parse(authority: &'a str) -> Option<Self> {
        let (host, port) = split_host_port(authority)?;
        Some(Self {
            host,
            port: port.unwrap_or(DEFAULT_HTTPS_PORT),
        })
    }
}

impl PartialEq for HostPort<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.port == other.port && self.host.eq_ignore_ascii_case(other.host)
    }
}

impl Eq for HostPort<'_> {}

/// `None` when malformed; the port is `None` when absent or empty after `:`.
fn split_host_port(authority: &str) -> Option<(&str, Option<u16>)> {
    // Bracketed IPv6 literal, e.g. [::1]:8443
    if authority.starts_with('[') {
        let end = authority.find(']')?;
        let (host, rest) = authority.split_at(end + 1);
        return match rest {
            "" => Some((host, None)),
            _ => Some((host, parse_port(rest.strip_prefix(':')?)?)),
        };
    }

    match authority.rsplit_once(':') {
        // More than one colon without brackets is not host:port
        Some((host, _)) if host.contains(':') => None,
        Some((host, port)) => Some((host, parse_port(port)?)),
        None => Some((authority, None)),
    }
}

/// Empty is a valid "no port"; anything else must be a decimal u16.
fn parse_port(port: &str) -> Option<Option<u16>> {
    if port.is_empty() {
        return Some(None);
    }
    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse().ok().map(Some)
}

/// Decide whether a request that arrived on `request_host` must be redirected.
///
/// An empty canonical host disables enforcement. A request host that is empty
/// (no Host header at all) or does not split into host and port is never
/// redirected, and neither is anything when the canonical host itself is malformed.
pub fn decide(request_host: &str, canonical_host: &str) -> RedirectOutcome {
    if canonical_host.is_empty() || request_host.is_empty() {
        return RedirectOutcome::NoRedirect;
    }

    let (Some(request), Some(canonical)) =
        (HostPort::parse(request_host), HostPort::parse(canonical_host))
    else {
        return RedirectOutcome::NoRedirect;
    };

    if request == canonical {
        RedirectOutcome::NoRedirect
    } else {
        RedirectOutcome::RedirectTo(canonical_host.to_string())
    }
}

/// Redirect target for a canonical host.
///
/// Always the site root: the original path and query are not carried over.
pub fn redirect_url(canonical_host: &str) -> String {
    format!("{}://{}/", REDIRECT_SCHEME, canonical_host)
}

/// Build a `301 Moved Permanently` response pointing at `location`.
pub fn redirect_response(location: &str) -> Result<Response, InvalidHeaderValue> {
    let location = HeaderValue::from_str(location)?;
    Ok((StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response())
}
