//! Issuer redirect decision.
//!
//! A credential issued by one node of a cluster (`api2.example.com`) is only
//! honoured by that node. When the page is served by a sister node
//! (`api.example.com`, `api3.example.com`) the browser is sent to the issuer;
//! unrelated hosts never redirect.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

/// `scheme://<service letters><optional cluster digit>.<rest>`
static CLUSTER_HOST: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"http[s]*://([a-zA-Z]+)(\d)?\.(\w.+)").ok());

/// Current page location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Scheme, host and port, e.g. `https://api.example.com`.
    pub origin: String,
    /// Full URL of the page.
    pub href: String,
}

impl Location {
    pub fn new(origin: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            href: href.into(),
        }
    }

    /// Builds a location from a full URL.
    ///
    /// # Errors
    /// Returns an error if `href` is not an absolute URL.
    pub fn parse(href: &str) -> Result<Self> {
        let url = url::Url::parse(href).with_context(|| format!("Invalid page URL {href}"))?;
        Ok(Self {
            origin: url.origin().ascii_serialization(),
            href: url.to_string(),
        })
    }
}

struct ClusterHost<'a> {
    service: &'a str,
    domain: &'a str,
}

fn cluster_host(url: &str) -> Option<ClusterHost<'_>> {
    let caps = CLUSTER_HOST.as_ref()?.captures(url)?;
    Some(ClusterHost {
        service: caps.get(1)?.as_str(),
        domain: caps.get(3)?.as_str(),
    })
}

/// Returns the URL to navigate to, or `None` when the page should stay.
pub fn redirect_target(issuer: Option<&str>, location: &Location) -> Option<String> {
    let issuer = issuer?;
    if issuer == location.origin {
        return None;
    }

    let theirs = cluster_host(issuer)?;
    let ours = cluster_host(&location.origin)?;
    if theirs.service != ours.service || theirs.domain != ours.domain {
        return None;
    }

    Some(location.href.replacen(&location.origin, issuer, 1))
}
