//! Table-driven tests for migration request validation.

mod common;

use dcmigrate::{Field, MigrationConfig, MigrationRequest, ValidationErrorKind};

use common::WallFixture;

/// A single validation case. Paths are relative to the fixture root; `{root}`
/// expands to it.
struct ValidationCase {
    name: &'static str,
    old_state: &'static str,
    new_state_name: &'static str,
    output_dir: &'static str,
    expected: Option<(Field, ValidationErrorKind)>,
}

const CASES: &[ValidationCase] = &[
    ValidationCase {
        name: "valid",
        old_state: "{root}/src/old.dcx",
        new_state_name: "new.dcx",
        output_dir: "{root}/out",
        expected: None,
    },
    ValidationCase {
        name: "valid_uppercase_extension",
        old_state: "{root}/src/LOUD.DCX",
        new_state_name: "new.dcx",
        output_dir: "{root}/out",
        expected: None,
    },
    ValidationCase {
        name: "old_state_empty",
        old_state: "",
        new_state_name: "new.dcx",
        output_dir: "{root}/out",
        expected: Some((Field::OldState, ValidationErrorKind::EmptyInput)),
    },
    ValidationCase {
        name: "old_state_missing",
        old_state: "{root}/src/gone.dcx",
        new_state_name: "new.dcx",
        output_dir: "{root}/out",
        expected: Some((Field::OldState, ValidationErrorKind::NotFound)),
    },
    ValidationCase {
        name: "old_state_txt",
        old_state: "{root}/src/notes.txt",
        new_state_name: "new.dcx",
        output_dir: "{root}/out",
        expected: Some((Field::OldState, ValidationErrorKind::BadExtension)),
    },
    ValidationCase {
        name: "new_state_empty",
        old_state: "{root}/src/old.dcx",
        new_state_name: "",
        output_dir: "{root}/out",
        expected: Some((Field::NewStateName, ValidationErrorKind::EmptyInput)),
    },
    ValidationCase {
        name: "new_state_with_space",
        old_state: "{root}/src/old.dcx",
        new_state_name: "new state.dcx",
        output_dir: "{root}/out",
        expected: Some((Field::NewStateName, ValidationErrorKind::InvalidCharacters)),
    },
    ValidationCase {
        name: "new_state_with_colon",
        old_state: "{root}/src/old.dcx",
        new_state_name: "new:state.dcx",
        output_dir: "{root}/out",
        expected: Some((Field::NewStateName, ValidationErrorKind::InvalidCharacters)),
    },
    ValidationCase {
        name: "output_dir_empty",
        old_state: "{root}/src/old.dcx",
        new_state_name: "new.dcx",
        output_dir: "",
        expected: Some((Field::OutputDir, ValidationErrorKind::EmptyInput)),
    },
    ValidationCase {
        name: "output_dir_missing",
        old_state: "{root}/src/old.dcx",
        new_state_name: "new.dcx",
        output_dir: "{root}/elsewhere",
        expected: Some((Field::OutputDir, ValidationErrorKind::NotFound)),
    },
];

#[test]
fn test_validation_cases() {
    let fx = WallFixture::new();
    fx.state("old.dcx", &[]);
    fx.state("LOUD.DCX", &[]);
    fx.media("notes.txt", b"<state/>");
    let root = fx.root().to_string_lossy().into_owned();
    let config = MigrationConfig::default();

    for case in CASES {
        let request = MigrationRequest::new(
            case.old_state.replace("{root}", &root),
            case.new_state_name,
            case.output_dir.replace("{root}", &root),
        );

        match (request.validate(&config), case.expected) {
            (Ok(_), None) => {}
            (Err(err), Some((field, kind))) => {
                assert_eq!(err.field, field, "case '{}'", case.name);
                assert_eq!(err.kind, kind, "case '{}'", case.name);
                assert!(!err.message.is_empty(), "case '{}'", case.name);
            }
            (result, expected) => panic!(
                "case '{}': expected {:?}, got {:?}",
                case.name, expected, result
            ),
        }
    }
}

#[test]
fn test_validation_has_no_side_effects() {
    let fx = WallFixture::new();
    let state = fx.state("old.dcx", &[]);
    let request = fx.request(&state, "bad name.dcx");

    assert!(request.validate(&MigrationConfig::default()).is_err());
    assert_eq!(std::fs::read_dir(&fx.out).unwrap().count(), 0);
}
