//! Call-site wrappers around engine operations.
//!
//! Applied in a fixed order: error catching outermost (see
//! [`catch_errors`]), then confirmation, then timing around the engine call.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::display::{self, OutputMode};

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers every question the same way. Used when there is no terminal to
/// ask (`--exec` and pipe modes).
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Outcome of a guarded action.
#[derive(Debug, PartialEq)]
pub enum Confirmed<T> {
    Done(T),
    Cancelled,
}

/// The prompt shown before a destructive action.
pub fn confirmation_prompt(action: &str) -> String {
    format!("Are you sure you want to perform \"{action}\"? [y/n]: ")
}

/// Whether a typed answer counts as "yes".
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Run `f` only if the user agrees to `action`.
pub fn confirm_action<T, E>(
    confirm: &mut dyn Confirm,
    action: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<Confirmed<T>, E> {
    if !confirm.confirm(&confirmation_prompt(action)) {
        debug!(action, "declined");
        return Ok(Confirmed::Cancelled);
    }
    f().map(Confirmed::Done)
}

/// Run `f` and measure how long it took.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    debug!(operation = label, elapsed_us = elapsed.as_micros() as u64, "timed");
    (result, elapsed)
}

/// Run `f`, rendering any error instead of propagating it.
pub fn catch_errors<T, E: std::fmt::Display>(
    mode: &OutputMode,
    f: impl FnOnce() -> Result<T, E>,
) -> Option<T> {
    match f() {
        Ok(value) => Some(value),
        Err(e) => {
            display::render_error(&e, mode);
            None
        }
    }
}
