/// Typed failures of the catalog layer.
///
/// Everything else in the crate reports errors through `anyhow`; catalog
/// failures get their own enum because the store inspects the kind when it
/// logs them and the health check reports it.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("catalog request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The catalog answered with a non-OK status.
    #[error("catalog returned HTTP {code} for {url}")]
    Status { code: u16, url: String },

    /// The body was not the JSON shape we expect.
    #[error("could not decode catalog response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// A valid response with zero items.
    #[error("catalog returned no {what}")]
    Empty { what: String },
}

impl CatalogError {
    /// Short machine-friendly kind, used as the diagnostic log level tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
            Self::Empty { .. } => "empty",
        }
    }
}
