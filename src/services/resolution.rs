//! Outcomes shared by the series and episode resolvers
//!
//! Both resolvers follow the same small state machine:
//!
//! ```text
//! PENDING → AUTO_CONFIRMED
//!         → AWAITING_INPUT → CONFIRMED
//!                          → REJECTED
//! ```
//!
//! A series search can additionally come back empty ([Resolution::NotFound]).

use super::prompt::Prompter;

/// Terminal state of one resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Unambiguous, no operator input needed
    AutoConfirmed(T),
    /// Picked by the operator
    Confirmed(T),
    /// Operator chose "none of the above"
    Rejected,
    /// Nothing to choose from
    NotFound,
}

impl<T> Resolution<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Resolution::AutoConfirmed(value) | Resolution::Confirmed(value) => Some(value),
            Resolution::Rejected | Resolution::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::AutoConfirmed(value) => Resolution::AutoConfirmed(f(value)),
            Resolution::Confirmed(value) => Resolution::Confirmed(f(value)),
            Resolution::Rejected => Resolution::Rejected,
            Resolution::NotFound => Resolution::NotFound,
        }
    }
}

/// Ask the operator to pick one of `choices`, rendering each with `label`.
///
/// This is the AWAITING_INPUT step: it blocks until the prompter answers.
pub fn await_selection<'c, C>(
    prompter: &mut dyn Prompter,
    prompt: &str,
    choices: &[&'c C],
    label: impl Fn(&C) -> String,
) -> anyhow::Result<Resolution<&'c C>> {
    let options: Vec<String> = choices.iter().map(|&c| label(c)).collect();
    let selection = prompter.select(prompt, &options)?;
    Ok(match selection.and_then(|i| choices.get(i)) {
        Some(choice) => Resolution::Confirmed(*choice),
        None => Resolution::Rejected,
    })
}
