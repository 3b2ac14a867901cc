use serde::{Deserialize, Serialize};

/// Tunables for a migration run. Every field has a default so an empty JSON
/// object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default = "default_version")]
    pub version: String,
    /// Extension (without the dot) required of the old state file.
    #[serde(default = "default_state_extension")]
    pub state_extension: String,
    /// Extension (without the dot) marking a pyramid descriptor.
    #[serde(default = "default_pyramid_extension")]
    pub pyramid_extension: String,
    /// Name of the media directory created under the output directory.
    #[serde(default = "default_content_directory")]
    pub content_directory: String,
    /// Suffix of the tile directory copied next to each pyramid descriptor.
    #[serde(default = "default_pyramid_directory_suffix")]
    pub pyramid_directory_suffix: String,
    /// Prefix of the scratch copy made while rewriting a descriptor.
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,
    #[serde(default)]
    pub defaults: FieldDefaults,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_state_extension() -> String {
    "dcx".to_string()
}

fn default_pyramid_extension() -> String {
    "pyr".to_string()
}

fn default_content_directory() -> String {
    "Content".to_string()
}

fn default_pyramid_directory_suffix() -> String {
    "pyramid".to_string()
}

fn default_temp_prefix() -> String {
    "copy-".to_string()
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            state_extension: default_state_extension(),
            pyramid_extension: default_pyramid_extension(),
            content_directory: default_content_directory(),
            pyramid_directory_suffix: default_pyramid_directory_suffix(),
            temp_prefix: default_temp_prefix(),
            defaults: FieldDefaults::default(),
        }
    }
}

/// Values a front-end pre-fills its three input fields with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefaults {
    #[serde(default)]
    pub old_state: Option<String>,
    #[serde(default = "default_new_state_name")]
    pub new_state_name: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
}

fn default_new_state_name() -> Option<String> {
    Some("sampleState.dcx".to_string())
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            old_state: None,
            new_state_name: default_new_state_name(),
            output_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: MigrationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.content_directory, "Content");
        assert_eq!(config.pyramid_extension, "pyr");
    }

    #[test]
    fn test_partial_defaults_keep_new_state_name() {
        let config: MigrationConfig =
            serde_json::from_str(r#"{"defaults": {"output_dir": "/wall/sessions"}}"#).unwrap();
        assert_eq!(config.defaults.output_dir.as_deref(), Some("/wall/sessions"));
        assert_eq!(
            config.defaults.new_state_name.as_deref(),
            Some("sampleState.dcx")
        );
        assert!(config.defaults.old_state.is_none());
    }
}
