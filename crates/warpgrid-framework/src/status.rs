//! Extension-point result codes.

use std::fmt;

use serde::Serialize;

/// Outcome class of an extension-point call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Code {
    Success,
    /// Internal plugin failure; the cycle should not proceed on this result.
    Error,
    /// The pod does not fit right now; preemption might help.
    Unschedulable,
    /// The pod does not fit and preemption would not change that.
    UnschedulableAndUnresolvable,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Code::Success => "Success",
            Code::Error => "Error",
            Code::Unschedulable => "Unschedulable",
            Code::UnschedulableAndUnresolvable => "UnschedulableAndUnresolvable",
        };
        f.write_str(s)
    }
}

/// Result of running a plugin: a code plus human-readable reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    code: Code,
    reasons: Vec<String>,
}

impl Status {
    pub fn new(code: Code, reasons: Vec<String>) -> Self {
        Self { code, reasons }
    }

    pub fn success() -> Self {
        Self::new(Code::Success, Vec::new())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Code::Error, vec![message.into()])
    }

    pub fn unschedulable(reason: impl Into<String>) -> Self {
        Self::new(Code::Unschedulable, vec![reason.into()])
    }

    pub fn unresolvable(reasons: Vec<String>) -> Self {
        Self::new(Code::UnschedulableAndUnresolvable, reasons)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn is_success(&self) -> bool {
        self.code == Code::Success
    }

    pub fn is_unschedulable(&self) -> bool {
        matches!(
            self.code,
            Code::Unschedulable | Code::UnschedulableAndUnresolvable
        )
    }

    /// Reasons joined with `", "`.
    pub fn message(&self) -> String {
        self.reasons.join(", ")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reasons.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message())
        }
    }
}
