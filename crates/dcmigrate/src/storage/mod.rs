pub mod copier;
pub mod tree;

pub use copier::{AssetCopier, CopiedAsset, CopyOutcome};
pub use tree::copy_tree;
