use crate::media::MediaReference;
use crate::request::ValidatedRequest;
use crate::storage::CopiedAsset;

/// Per-run working state. Created fresh for every run so references from an
/// earlier migration can never leak into a later one.
pub struct MigrationContext {
    // Input
    pub request: ValidatedRequest,

    // Parsing result
    pub references: Vec<MediaReference>,

    // Copying result, one entry per reference
    pub assets: Vec<CopiedAsset>,

    // Rewriting result, in document order
    pub rewritten_uris: Vec<String>,
}

impl MigrationContext {
    pub fn new(request: ValidatedRequest) -> Self {
        Self {
            request,
            references: Vec::new(),
            assets: Vec::new(),
            rewritten_uris: Vec::new(),
        }
    }
}
