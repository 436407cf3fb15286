use crate::encode::encode;
use serde::{Deserialize, Serialize};

/// Builds the fully qualified redirect target for a short id.
pub fn short_url(base_url: &str, id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), id)
}

/// A stored short-link record.
///
/// The wire and file shape exposes `original_url` and `short_url` only;
/// the id is never serialized because it is a deterministic function of
/// the original URL and can always be recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Short textual identifier, `encode(original_url)`.
    #[serde(skip)]
    pub id: String,
    /// The full target URL.
    pub original_url: String,
    /// `base_url + "/" + id` at creation time.
    pub short_url: String,
    /// Opaque token correlating records to a browser session.
    /// `None` means anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Soft-delete marker; records are flagged, never removed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl LinkRecord {
    /// Creates an active record for `original_url`, deriving the id and
    /// the short URL from `base_url`.
    pub fn new(
        original_url: impl Into<String>,
        base_url: &str,
        owner: Option<String>,
    ) -> Self {
        let original_url = original_url.into();
        let id = encode(&original_url);
        let short_url = short_url(base_url, &id);
        Self {
            id,
            original_url,
            short_url,
            owner,
            deleted: false,
        }
    }
}

/// One unit of a batch-insert request. The correlation id is caller
/// supplied and links the input item to its result positionally,
/// independent of generated ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: String,
    /// Filled in by the caller from its session, never from the wire.
    #[serde(skip)]
    pub owner: Option<String>,
}

/// One unit of a batch-insert result, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCreated {
    pub correlation_id: String,
    pub short_url: String,
}
