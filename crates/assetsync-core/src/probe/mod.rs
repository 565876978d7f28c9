//! Remote digest discovery.
//!
//! Tries an ordered list of strategies, cheapest first: `Content-MD5` from a
//! HEAD response, then an MD5-shaped `ETag` from the same response, then a
//! full GET whose body is hashed. The HEAD request is shared by the first two
//! tiers and issued at most once per probe. Remote digests are never cached.

mod header;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::checksum::Digest;
use crate::fetch_head::HeadResult;
use crate::error::NetworkError;
use crate::transport::Transport;

pub use header::{digest_from_content_md5, digest_from_etag};

/// One way of learning the remote digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeStrategy {
    /// Base64 `Content-MD5` header of a successful HEAD.
    ContentMd5,
    /// 32-hex-character `ETag` of a successful HEAD.
    EntityTag,
    /// GET the whole body and hash it.
    FullContent,
}

impl ProbeStrategy {
    pub const DEFAULT_ORDER: [ProbeStrategy; 3] = [
        ProbeStrategy::ContentMd5,
        ProbeStrategy::EntityTag,
        ProbeStrategy::FullContent,
    ];

    /// Whether the strategy reads the HEAD response.
    pub fn uses_head(self) -> bool {
        matches!(self, ProbeStrategy::ContentMd5 | ProbeStrategy::EntityTag)
    }

    /// Digest carried by a successful HEAD response, for header-based strategies.
    pub fn digest_from_head(self, head: &HeadResult) -> Option<Digest> {
        match self {
            ProbeStrategy::ContentMd5 => head
                .content_md5
                .as_deref()
                .and_then(digest_from_content_md5),
            ProbeStrategy::EntityTag => head.etag.as_deref().and_then(digest_from_etag),
            ProbeStrategy::FullContent => None,
        }
    }
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeStrategy::ContentMd5 => "content-md5",
            ProbeStrategy::EntityTag => "entity-tag",
            ProbeStrategy::FullContent => "full-content",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ProbeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProbeStrategy::DEFAULT_ORDER
            .into_iter()
            .find(|p| p.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown probe strategy {:?} (expected content-md5, entity-tag or full-content)",
                    s
                )
            })
    }
}

/// Remote digest and the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteDigest {
    pub digest: Digest,
    pub strategy: ProbeStrategy,
}

pub struct RemoteProbe {
    transport: Arc<dyn Transport>,
    strategies: Vec<ProbeStrategy>,
}

impl RemoteProbe {
    pub fn new(transport: Arc<dyn Transport>, strategies: Vec<ProbeStrategy>) -> Self {
        Self {
            transport,
            strategies,
        }
    }

    pub fn with_default_order(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, ProbeStrategy::DEFAULT_ORDER.to_vec())
    }

    pub fn strategies(&self) -> &[ProbeStrategy] {
        &self.strategies
    }

    /// Learn the remote digest of `url`. `None` means no strategy could
    /// determine it (the "not found" result that validation reports as Unknown).
    pub async fn probe(&self, url: &str) -> Option<RemoteDigest> {
        let mut head: Option<Result<HeadResult, NetworkError>> = None;

        for &strategy in &self.strategies {
            let found = if strategy.uses_head() {
                if head.is_none() {
                    let res = self.transport.head(url).await;
                    if let Err(e) = &res {
                        tracing::warn!("metadata probe failed, falling through: {}", e);
                    }
                    head = Some(res);
                }
                match &head {
                    Some(Ok(h)) => strategy.digest_from_head(h),
                    _ => None,
                }
            } else {
                self.full_content(url).await
            };

            if let Some(digest) = found {
                tracing::debug!("remote digest of {} via {}: {}", url, strategy, digest);
                return Some(RemoteDigest { digest, strategy });
            }
            tracing::debug!("probe strategy {} yielded no digest for {}", strategy, url);
        }

        tracing::warn!("remote digest of {} could not be determined", url);
        None
    }

    /// Run a single strategy on its own, with its own HEAD request if needed.
    pub async fn probe_with(&self, strategy: ProbeStrategy, url: &str) -> Option<Digest> {
        if strategy.uses_head() {
            match self.transport.head(url).await {
                Ok(h) => strategy.digest_from_head(&h),
                Err(e) => {
                    tracing::warn!("metadata probe failed: {}", e);
                    None
                }
            }
        } else {
            self.full_content(url).await
        }
    }

    async fn full_content(&self, url: &str) -> Option<Digest> {
        match self.transport.digest_body(url).await {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::warn!("content fetch for validation failed: {}", e);
                None
            }
        }
    }
}
