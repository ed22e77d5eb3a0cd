//! Errors raised before any computation starts.
//!
//! Everything that can happen once input is accepted (no candidate, no
//! bridge, unreachable clusters) is a valid outcome recorded in the
//! [`JumpMap`](crate::assembler::JumpMap), never an error.

use crate::region::SystemId;
use crate::rules::RuleError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("region contains system id `{0}` more than once")]
    DuplicateSystemId(SystemId),

    #[error("system `{id}` has a non-finite position ({x}, {y}, {z})")]
    InvalidPosition { id: SystemId, x: f64, y: f64, z: f64 },

    #[error("no system with id `{0}` in region")]
    NotFound(SystemId),

    #[error("invalid gate rules: {}", format_rule_errors(.0))]
    InvalidRules(Vec<RuleError>),
}

fn format_rule_errors(errors: &[RuleError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
