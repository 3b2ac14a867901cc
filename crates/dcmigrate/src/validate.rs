//! Checks for the three user-supplied fields of a migration request.
//!
//! Each check is independent and performs no mutation, apart from the
//! writability probe on the output directory which removes its probe file
//! before returning.

use std::path::Path;

use crate::error::{Field, ValidationError, ValidationErrorKind};

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Characters allowed in the new state file name.
fn is_allowed_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/' | '\\')
}

pub fn validate_old_state(value: &str, extension: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::new(
            Field::OldState,
            ValidationErrorKind::EmptyInput,
            format!("Please select a .{} file.", extension),
        ));
    }

    if !Path::new(value).exists() {
        return Err(ValidationError::new(
            Field::OldState,
            ValidationErrorKind::NotFound,
            format!(
                "The {} file does not exist. Verify your spelling and format.",
                extension
            ),
        ));
    }

    let suffix = format!(".{}", extension.to_lowercase());
    if !value.to_lowercase().ends_with(&suffix) {
        return Err(ValidationError::new(
            Field::OldState,
            ValidationErrorKind::BadExtension,
            format!("The file must have a {} extension.", suffix),
        ));
    }

    Ok(())
}

pub fn validate_new_state_name(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::new(
            Field::NewStateName,
            ValidationErrorKind::EmptyInput,
            "Please enter a file name.",
        ));
    }

    if let Some(bad) = value.chars().find(|c| !is_allowed_name_char(*c)) {
        return Err(ValidationError::new(
            Field::NewStateName,
            ValidationErrorKind::InvalidCharacters,
            format!(
                "Filename can only contain letters, numbers, hyphens, underscores, dots and path separators (found {:?}).",
                bad
            ),
        ));
    }

    Ok(())
}

pub fn validate_output_dir(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::new(
            Field::OutputDir,
            ValidationErrorKind::EmptyInput,
            "Please enter an output directory.",
        ));
    }

    let dir = Path::new(value);
    if !dir.is_dir() {
        return Err(ValidationError::new(
            Field::OutputDir,
            ValidationErrorKind::NotFound,
            "The directory does not exist. Verify your spelling and format.",
        ));
    }

    probe_writable(dir).map_err(|e| {
        ValidationError::new(
            Field::OutputDir,
            ValidationErrorKind::NotWritable,
            format!("The directory is not writable: {}", e),
        )
    })
}

/// Rejects a new state path that resolves to the old state file. Copying a
/// file onto itself truncates it.
pub fn validate_distinct_target(
    old_state: &Path,
    new_state: &Path,
) -> Result<(), ValidationError> {
    // A target that does not exist yet cannot be the old state file.
    let same = match (old_state.canonicalize(), new_state.canonicalize()) {
        (Ok(old), Ok(new)) => old == new,
        _ => false,
    };

    if same {
        return Err(ValidationError::new(
            Field::NewStateName,
            ValidationErrorKind::SameAsSource,
            "The new state file would overwrite the old state file. Choose another name or directory.",
        ));
    }

    Ok(())
}

fn probe_writable(dir: &Path) -> std::io::Result<()> {
    let probe = dir.join(format!(".dcmigrate-probe-{}", std::process::id()));
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)?;
    std::fs::remove_file(&probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_old_state_empty() {
        let err = validate_old_state("", "dcx").unwrap_err();
        assert_eq!(err.field, Field::OldState);
        assert_eq!(err.kind, ValidationErrorKind::EmptyInput);
    }

    #[test]
    fn test_old_state_whitespace_is_blank() {
        let err = validate_old_state("   ", "dcx").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::EmptyInput);
    }

    #[test]
    fn test_old_state_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.dcx");
        let err = validate_old_state(path.to_str().unwrap(), "dcx").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NotFound);
    }

    #[test]
    fn test_old_state_bad_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "<state/>").unwrap();

        let err = validate_old_state(path.to_str().unwrap(), "dcx").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::BadExtension);
    }

    #[test]
    fn test_old_state_extension_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("SESSION.DCX");
        std::fs::write(&path, "<state/>").unwrap();

        assert!(validate_old_state(path.to_str().unwrap(), "dcx").is_ok());
    }

    #[test]
    fn test_new_state_name_accepts_allowed_set() {
        assert!(validate_new_state_name("sample_State-2.dcx").is_ok());
        assert!(validate_new_state_name("sessions/wall.dcx").is_ok());
    }

    #[test]
    fn test_new_state_name_rejects_space() {
        let err = validate_new_state_name("my state.dcx").unwrap_err();
        assert_eq!(err.field, Field::NewStateName);
        assert_eq!(err.kind, ValidationErrorKind::InvalidCharacters);
    }

    #[test]
    fn test_new_state_name_rejects_non_ascii_letters() {
        let err = validate_new_state_name("sitzung-ü.dcx").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidCharacters);
    }

    #[test]
    fn test_new_state_name_empty() {
        let err = validate_new_state_name("").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::EmptyInput);
    }

    #[test]
    fn test_output_dir_empty() {
        let err = validate_output_dir("").unwrap_err();
        assert_eq!(err.field, Field::OutputDir);
        assert_eq!(err.kind, ValidationErrorKind::EmptyInput);
    }

    #[test]
    fn test_output_dir_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope");
        let err = validate_output_dir(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NotFound);
    }

    #[test]
    fn test_output_dir_file_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file");
        std::fs::write(&path, b"x").unwrap();

        let err = validate_output_dir(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NotFound);
    }

    #[test]
    fn test_distinct_target_rejects_same_file() {
        let temp_dir = TempDir::new().unwrap();
        let state = temp_dir.path().join("session.dcx");
        std::fs::write(&state, "<state/>").unwrap();
        let same = temp_dir.path().join(".").join("session.dcx");

        let err = validate_distinct_target(&state, &same).unwrap_err();
        assert_eq!(err.field, Field::NewStateName);
        assert_eq!(err.kind, ValidationErrorKind::SameAsSource);
    }

    #[test]
    fn test_distinct_target_allows_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let state = temp_dir.path().join("session.dcx");
        std::fs::write(&state, "<state/>").unwrap();

        assert!(validate_distinct_target(&state, &temp_dir.path().join("new.dcx")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_dir_read_only_is_not_writable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o555)).unwrap();

        let result = validate_output_dir(out.to_str().unwrap());
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Root ignores directory permissions.
        if let Err(err) = result {
            assert_eq!(err.field, Field::OutputDir);
            assert_eq!(err.kind, ValidationErrorKind::NotWritable);
        }
    }

    #[test]
    fn test_output_dir_valid_leaves_no_probe() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_output_dir(temp_dir.path().to_str().unwrap()).is_ok());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
