//! Line-based prompts for `--interactive`.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};

use dcmigrate::{Field, MigrationRequest};

/// Asks for every field that is still blank.
pub fn fill_missing(mut request: MigrationRequest) -> Result<MigrationRequest> {
    for field in [Field::OldState, Field::NewStateName, Field::OutputDir] {
        if value_mut(&mut request, field).trim().is_empty() {
            request = reprompt(request, field)?;
        }
    }
    Ok(request)
}

/// Asks for one field again, offering the current value as default.
pub fn reprompt(mut request: MigrationRequest, field: Field) -> Result<MigrationRequest> {
    let stdin = io::stdin();
    let value = value_mut(&mut request, field);
    *value = ask(&mut stdin.lock(), &mut io::stderr(), field, value)?;
    Ok(request)
}

fn value_mut(request: &mut MigrationRequest, field: Field) -> &mut String {
    match field {
        Field::OldState => &mut request.old_state,
        Field::NewStateName => &mut request.new_state_name,
        Field::OutputDir => &mut request.output_dir,
    }
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    field: Field,
    current: &str,
) -> Result<String> {
    if current.is_empty() {
        write!(output, "{}: ", field)?;
    } else {
        write!(output, "{} [{}]: ", field, current)?;
    }
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Input closed while asking for {}", field);
    }

    let answer = line.trim_end_matches(['\r', '\n']);
    if answer.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(answer.to_string())
    }
}
