//! Interactive disambiguation prompts
//!
//! Resolvers never read stdin directly; they ask a [Prompter] to pick one of
//! a numbered list of options. Option `0` is always "none of the above".

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Label printed for the escape option
pub const NONE_OF_THE_ABOVE: &str = "None of the above";

/// Chooses one of `options` for a prompt.
///
/// Returns `Some(index)` into `options`, or `None` when the operator picks
/// "none of the above". Implementations block until an answer is available.
pub trait Prompter {
    fn select(&mut self, prompt: &str, options: &[String]) -> Result<Option<usize>>;
}

/// Parse a numbered answer. `0` means none, `1..=option_count` picks an option.
pub fn parse_selection(answer: &str, option_count: usize) -> Option<Option<usize>> {
    let choice: usize = answer.trim().parse().ok()?;
    match choice {
        0 => Some(None),
        n if n <= option_count => Some(Some(n - 1)),
        _ => None,
    }
}

/// Prompter reading numbered answers from a line-oriented input.
///
/// Malformed or out-of-range answers are re-prompted. End of input is an error
/// rather than an endless loop.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn render(&mut self, prompt: &str, options: &[String]) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", prompt)?;
        writeln!(self.output, "  0) {}", NONE_OF_THE_ABOVE)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn select(&mut self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        self.render(prompt, options)?;

        loop {
            write!(self.output, "Select [0-{}]: ", options.len())?;
            self.output.flush()?;

            let mut answer = String::new();
            let read = self
                .input
                .read_line(&mut answer)
                .context("Failed to read selection")?;
            if read == 0 {
                bail!("Input closed while waiting for a selection");
            }

            match parse_selection(&answer, options.len()) {
                Some(selection) => return Ok(selection),
                None => {
                    debug!(answer = %answer.trim(), "Rejected malformed selection");
                    writeln!(
                        self.output,
                        "'{}' is not a valid choice, enter a number between 0 and {}",
                        answer.trim(),
                        options.len()
                    )?;
                }
            }
        }
    }
}
