//! Interactive yes/no prompts.

use anyhow::{Context, Result};

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Writes `prompt [y/N] ` and reads one answer line.
/// Anything but `y`/`yes` (case-insensitive), including end of input, is a no.
pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read answer from stdin")?;
    if read == 0 {
        writeln!(output)?;
        return Ok(false);
    }

    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

impl RealRuntime {
    pub(crate) fn confirm_impl(&self, prompt: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        confirm_with_io(prompt, &mut stdin_lock, &mut stdout)
    }
}
