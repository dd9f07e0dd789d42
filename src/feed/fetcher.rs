//! Feed fetching and parsing.
//!
//! `HttpFeedFetcher` downloads RSS/Atom documents with SSRF validation and a
//! size limit, then parses them with feed-rs. The `FeedFetcher` trait lets
//! tests substitute canned feeds for the network.

use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use super::types::{ParsedEntry, ParsedFeed, MAX_ENTRIES_PER_FETCH, MAX_FEED_SIZE};
use crate::{CatnewsError, Result};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TOTAL_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 5;
const USER_AGENT: &str = concat!("catnews/", env!("CARGO_PKG_VERSION"));

/// Fetches and parses a feed document from a URL.
pub trait FeedFetcher: Send + Sync {
    /// Fetch and parse the feed at `url`.
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ParsedFeed>> + Send + 'a>>;
}

/// Fetcher backed by an HTTP client.
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// Create a fetcher with default timeouts.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatnewsError::Fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn fetch_inner(&self, url: &str) -> Result<ParsedFeed> {
        validate_url(url)?;
        debug!("Fetching feed {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatnewsError::Fetch(format!("failed to fetch feed: {e}")))?;

        if !response.status().is_success() {
            return Err(CatnewsError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_FEED_SIZE {
                return Err(CatnewsError::Fetch(format!(
                    "feed too large: {len} bytes (max {MAX_FEED_SIZE} bytes)"
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatnewsError::Fetch(format!("failed to read response: {e}")))?;

        if bytes.len() as u64 > MAX_FEED_SIZE {
            return Err(CatnewsError::Fetch(format!(
                "feed too large: {} bytes (max {MAX_FEED_SIZE} bytes)",
                bytes.len()
            )));
        }

        parse_feed(&bytes)
    }
}

impl FeedFetcher for HttpFeedFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ParsedFeed>> + Send + 'a>> {
        Box::pin(self.fetch_inner(url))
    }
}

/// Validate a feed URL before fetching it.
///
/// Rejects non-HTTP schemes, loopback and private addresses, and internal
/// hostnames, so a subscription URL cannot be pointed at internal services.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| CatnewsError::Fetch(format!("invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(CatnewsError::Fetch(format!(
                "unsupported URL scheme: {scheme}"
            )));
        }
    }

    let host = parsed
        .host()
        .ok_or_else(|| CatnewsError::Fetch("URL has no host".to_string()))?;

    match host {
        url::Host::Domain(domain) => {
            if is_forbidden_hostname(domain) {
                return Err(CatnewsError::Fetch(format!("forbidden host: {domain}")));
            }
        }
        url::Host::Ipv4(ipv4) => {
            if is_private_ip(&IpAddr::V4(ipv4)) {
                return Err(CatnewsError::Fetch(format!(
                    "private IP address not allowed: {ipv4}"
                )));
            }
        }
        url::Host::Ipv6(ipv6) => {
            if is_private_ip(&IpAddr::V6(ipv6)) {
                return Err(CatnewsError::Fetch(format!(
                    "private IP address not allowed: {ipv6}"
                )));
            }
        }
    }

    Ok(())
}

fn is_forbidden_hostname(host: &str) -> bool {
    let host = host.to_lowercase();

    if host == "localhost" {
        return true;
    }

    [".local", ".localhost", ".internal", ".intranet", ".lan"]
        .iter()
        .any(|suffix| host.ends_with(suffix))
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || (o[0] == 192 && o[1] == 0 && o[2] == 2)
                || (o[0] == 198 && o[1] == 51 && o[2] == 100)
                || (o[0] == 203 && o[1] == 0 && o[2] == 113)
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            v6.is_loopback()
                || v6.is_unspecified()
                // Unique local: fc00::/7
                || (segments[0] & 0xfe00) == 0xfc00
                // Link-local: fe80::/10
                || (segments[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Parse feed bytes into a `ParsedFeed`.
///
/// Entries without a link are skipped; the link is the deduplication key.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let feed = parser::parse(bytes)
        .map_err(|e| CatnewsError::Fetch(format!("failed to parse feed: {e}")))?;

    let title = feed
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled Feed".to_string());

    let entries: Vec<ParsedEntry> = feed
        .entries
        .into_iter()
        .take(MAX_ENTRIES_PER_FETCH)
        .filter_map(|entry| {
            let url = entry.links.first().map(|l| l.href.clone())?;
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            let content = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body));
            let published_at = entry.published.or(entry.updated);

            Some(ParsedEntry {
                title,
                url,
                content,
                published_at,
            })
        })
        .collect();

    Ok(ParsedFeed { title, entries })
}
