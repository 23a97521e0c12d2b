//! JSON and eval argument modes.
//!
//! Mode flags are thread-local and scoped: entering a mode saves the previous
//! state and a guard restores it on every exit path, including panics. The two
//! modes exclude each other, and the conflict is raised before the scope is
//! entered.

pub mod eval;
pub mod json;

use std::cell::Cell;

use crate::error::{DocargsError, Result};
use crate::value::{KeywordArgs, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ModeState {
    json: bool,
    eval: bool,
    eval_lax: bool,
}

thread_local! {
    static MODE_STATE: Cell<ModeState> = const {
        Cell::new(ModeState { json: false, eval: false, eval_lax: false })
    };
}

/// Restores the saved mode state when dropped
struct ModeGuard {
    previous: ModeState,
}

impl ModeGuard {
    fn enter(next: ModeState) -> Self {
        let previous = MODE_STATE.with(|state| state.replace(next));
        Self { previous }
    }
}

impl Drop for ModeGuard {
    fn drop(&mut self) {
        MODE_STATE.with(|state| state.set(self.previous));
    }
}

fn current() -> ModeState {
    MODE_STATE.with(Cell::get)
}

/// Scoped access to the json/eval argument modes
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentModeController;

impl ArgumentModeController {
    pub fn new() -> Self {
        Self
    }

    pub fn json_mode(&self) -> bool {
        current().json
    }

    pub fn eval_mode(&self) -> bool {
        current().eval
    }

    pub fn eval_lax(&self) -> bool {
        current().eval && current().eval_lax
    }

    /// True when either mode is active; the value converter is bypassed then
    pub fn raw_mode(&self) -> bool {
        let state = current();
        state.json || state.eval
    }

    /// Run `f` with json mode set to `enabled`
    pub fn with_json_mode<T, F>(&self, enabled: bool, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let state = current();
        if enabled && state.eval {
            return Err(DocargsError::ModeConflict);
        }
        let _guard = ModeGuard::enter(ModeState {
            json: enabled,
            ..state
        });
        f()
    }

    /// Run `f` with eval mode set to `enabled`; `lax` keeps unevaluable strings
    pub fn with_eval_mode<T, F>(&self, enabled: bool, lax: bool, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let state = current();
        if enabled && state.json {
            return Err(DocargsError::ModeConflict);
        }
        let _guard = ModeGuard::enter(ModeState {
            eval: enabled,
            eval_lax: enabled && lax,
            ..state
        });
        f()
    }

    /// Coerce every positional and keyword value with the active mode, in place
    pub fn apply_argument_coercions(
        &self,
        positional: &mut Vec<Value>,
        keywords: &mut KeywordArgs,
    ) -> Result<()> {
        let state = current();
        if state.json && state.eval {
            return Err(DocargsError::ModeConflict);
        }

        if state.json {
            coerce_all(positional, keywords, json::coerce_json_value)?;
        }
        if state.eval {
            coerce_all(positional, keywords, |value| {
                eval::coerce_eval_value(value, state.eval_lax)
            })?;
        }
        Ok(())
    }
}

fn coerce_all<F>(positional: &mut Vec<Value>, keywords: &mut KeywordArgs, coerce: F) -> Result<()>
where
    F: Fn(Value) -> Result<Value>,
{
    for slot in positional.iter_mut().chain(keywords.values_mut()) {
        let value = std::mem::replace(slot, Value::Nil);
        *slot = coerce(value)?;
    }
    Ok(())
}
