//! Reading and rewriting the `URI` elements of DisplayCluster state files.

pub mod parser;
pub mod rewriter;

pub use parser::{parse_media_references, parse_media_references_from_str};
pub use rewriter::{rewrite_state_file, rewrite_state_str};

/// Element whose text content names a media file.
pub(crate) const URI_TAG: &[u8] = b"URI";
