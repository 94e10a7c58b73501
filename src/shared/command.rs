use std::ffi::OsStr;
use std::process::Command;

use encoding_rs::Encoding;
use log::{trace, warn};

use crate::shared::error::QueryError;

/// Runs an OS tool and returns its stdout decoded with `encoding`.
///
/// A non-zero exit status is a failed query, not an empty result.
pub fn run_tool<P, I, S>(program: P, args: I, encoding: &'static Encoding) -> Result<String, QueryError>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let command = program.to_string_lossy().into_owned();
    let output = Command::new(program).args(args).output()?;

    if !output.status.success() {
        let (stderr, _, _) = encoding.decode(&output.stderr);
        return Err(QueryError::Command {
            command,
            reason: format!("{} {}", output.status, stderr.trim()),
        });
    }

    let (stdout, _, had_errors) = encoding.decode(&output.stdout);
    if had_errors {
        warn!("Output of {} is not valid {}", command, encoding.name());
    }
    trace!("{} produced {} bytes", command, output.stdout.len());
    Ok(stdout.into_owned())
}

/// Resolves an encoding label such as `utf-8`, `gbk` or `ibm866`.
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}
