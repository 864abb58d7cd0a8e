//! HTTP transport for relay endpoints.
//!
//! # Responsibilities
//! - GET an envelope from a relay URL (redirects per [`RedirectPolicy`])
//! - POST a signed envelope back to the same URL
//! - Map connection failures to `Network` and non-200 answers to `Protocol`
//!
//! # Design Decisions
//! - Redirects are followed by hand so the policy is explicit and testable
//! - POST never follows redirects; anything but 200 fails
//! - No retries; every request has the configured deadline

use std::time::Duration;

use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use url::Url;

use crate::config::schema::{RedirectPolicy, RelayConfig};
use crate::error::{CosignError, CosignResult};

/// Bytes re-escaped after a redirect path is decoded. `/` is not among them.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Content type of posted envelopes.
pub const POST_CONTENT_TYPE: &str = "application/text";

pub const FETCH_FAILED: &str = "error downloading multisig identifier";
pub const POST_FAILED: &str = "error posting signed RLP";

/// Client for one relay round-trip.
#[derive(Debug, Clone)]
pub struct RelayTransport {
    client: reqwest::Client,
    redirect_policy: RedirectPolicy,
    max_redirects: usize,
}

impl RelayTransport {
    pub fn new(config: &RelayConfig) -> CosignResult<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("cosign-relay/", env!("CARGO_PKG_VERSION")));
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        let client = builder
            .build()
            .map_err(|e| CosignError::Input(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            redirect_policy: config.redirect_policy,
            max_redirects: config.max_redirects,
        })
    }

    pub fn redirect_policy(&self) -> RedirectPolicy {
        self.redirect_policy
    }

    /// Fetch the envelope at `url`. The body is returned unmodified.
    pub async fn retrieve(&self, url: &str) -> CosignResult<Vec<u8>> {
        let mut current = parse_relay_url(url)?;
        let mut hops = 0;

        loop {
            tracing::debug!(url = %current, hop = hops, "Fetching envelope");

            let resp = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| network_error(&current, e))?;
            let status = resp.status();

            if status.is_redirection() && self.redirect_policy != RedirectPolicy::None {
                let location = resp
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok());

                if let Some(location) = location {
                    if hops >= self.max_redirects {
                        return Err(CosignError::Protocol {
                            message: format!("too many redirects fetching {}", url),
                            status: status.as_u16(),
                        });
                    }

                    let next = follow_redirect(&current, location, self.redirect_policy)
                        .ok_or_else(|| CosignError::Protocol {
                            message: format!("invalid redirect location '{}'", location),
                            status: status.as_u16(),
                        })?;

                    tracing::debug!(from = %current, to = %next, "Following redirect");
                    current = next;
                    hops += 1;
                    continue;
                }
            }

            if status != StatusCode::OK {
                tracing::warn!(url = %current, status = status.as_u16(), "Envelope fetch rejected");
                return Err(CosignError::Protocol {
                    message: FETCH_FAILED.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| network_error(&current, e))?;

            tracing::info!(url = %current, bytes = body.len(), "RLP retrieved");
            return Ok(body.to_vec());
        }
    }

    /// Deliver `payload` to `url`. Only a 200 response counts as success.
    pub async fn post(&self, url: &str, payload: &str) -> CosignResult<()> {
        let target = parse_relay_url(url)?;

        let resp = self
            .client
            .post(target.clone())
            .header(CONTENT_TYPE, POST_CONTENT_TYPE)
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| network_error(&target, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            tracing::warn!(url = %target, status = status.as_u16(), "Signed RLP rejected");
            return Err(CosignError::Protocol {
                message: POST_FAILED.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::info!(url = %target, "Signed RLP posted");
        Ok(())
    }
}

fn network_error(url: &Url, source: reqwest::Error) -> CosignError {
    CosignError::Network {
        url: url.to_string(),
        source,
    }
}

/// Parse a relay URL, accepting only http and https.
pub fn parse_relay_url(url: &str) -> CosignResult<Url> {
    if url.trim().is_empty() {
        return Err(CosignError::Input("multisig url is empty".to_string()));
    }

    let parsed = Url::parse(url.trim())
        .map_err(|e| CosignError::Input(format!("invalid relay url '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CosignError::Input(format!(
            "relay url must use http or https, got '{}'",
            other
        ))),
    }
}

/// Resolve a `Location` header against the current URL and apply `policy`.
///
/// Returns `None` when the target is unparsable or not http(s).
pub fn follow_redirect(current: &Url, location: &str, policy: RedirectPolicy) -> Option<Url> {
    let mut next = current.join(location).ok()?;
    if !matches!(next.scheme(), "http" | "https") {
        return None;
    }
    if policy == RedirectPolicy::PreserveRawPath {
        preserve_raw_path(&mut next);
    }
    Some(next)
}

/// Replace the URL path with its percent-decoded form.
///
/// The path is decoded to raw bytes and re-escaped with [`PATH_ESCAPE`], so
/// `%2F` reaches the server as `/` while bytes that cannot appear literally
/// (space, `?`, `%`, non-ASCII) keep an escape. Non-UTF-8 bytes survive as
/// their original `%XX`. The query string is left alone.
pub fn preserve_raw_path(url: &mut Url) {
    let decoded: Vec<u8> = percent_decode_str(url.path()).collect();
    let escaped = percent_encode(&decoded, PATH_ESCAPE).to_string();
    url.set_path(&escaped);
}
