//! Entrypoint for the robolink daemon.
//!
//! Delegates to [`robolinkd::run_daemon`] and prints the error chain when
//! launch fails, since telemetry may not be installed yet at that point.

use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match robolinkd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut stderr = io::stderr().lock();
            let _ = report(&mut stderr, &error);
            ExitCode::FAILURE
        }
    }
}

fn report(out: &mut impl Write, error: &dyn Error) -> io::Result<()> {
    writeln!(out, "robolinkd: {error}")?;
    let mut source = error.source();
    while let Some(cause) = source {
        writeln!(out, "  caused by: {cause}")?;
        source = cause.source();
    }
    Ok(())
}
