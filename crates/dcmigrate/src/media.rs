use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A media path taken verbatim from a `URI` element of a state document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaReference(String);

impl MediaReference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Final path component. The copier names destination files with it and
    /// the rewriter recomputes new URIs with it, so both go through here.
    pub fn base_name(&self) -> Option<&str> {
        base_name(&self.0)
    }

    pub fn stem(&self) -> Option<&str> {
        self.path().file_stem().and_then(|s| s.to_str())
    }

    pub fn extension(&self) -> Option<&str> {
        self.path().extension().and_then(|s| s.to_str())
    }

    /// Exact, case-sensitive match against the pyramid descriptor extension.
    pub fn is_pyramid(&self, pyramid_extension: &str) -> bool {
        self.extension() == Some(pyramid_extension)
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

pub fn base_name(uri: &str) -> Option<&str> {
    Path::new(uri).file_name().and_then(|n| n.to_str())
}

/// Companion tile directory named on the first line of a pyramid descriptor:
/// the text before the first space, with every `"` removed and surrounding
/// whitespace trimmed.
pub fn companion_directory(first_line: &str) -> String {
    let token = first_line
        .split_once(' ')
        .map(|(head, _)| head)
        .unwrap_or(first_line);
    token.replace('"', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_and_extension() {
        let media = MediaReference::new("/src/images/img.jpg");
        assert_eq!(media.base_name(), Some("img.jpg"));
        assert_eq!(media.stem(), Some("img"));
        assert_eq!(media.extension(), Some("jpg"));
    }

    #[test]
    fn test_base_name_of_empty_reference() {
        assert_eq!(MediaReference::new("").base_name(), None);
        assert_eq!(MediaReference::new("/").base_name(), None);
    }

    #[test]
    fn test_pyramid_detection_is_case_sensitive() {
        assert!(MediaReference::new("/src/map.pyr").is_pyramid("pyr"));
        assert!(!MediaReference::new("/src/map.PYR").is_pyramid("pyr"));
        assert!(!MediaReference::new("/src/map.pyramid").is_pyramid("pyr"));
    }

    #[test]
    fn test_companion_directory_quoted() {
        assert_eq!(
            companion_directory("\"/src/tiles\" 4096 4096 256\n"),
            "/src/tiles"
        );
    }

    #[test]
    fn test_companion_directory_single_token_line() {
        assert_eq!(companion_directory("/src/tiles\n"), "/src/tiles");
    }

    #[test]
    fn test_companion_directory_strips_inner_quotes() {
        assert_eq!(companion_directory("\"/src/\"tiles 1"), "/src/tiles");
    }
}
