// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error types for the heavy-hitter protocol.

use std::fmt;

/// The kind of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A configuration value or input is malformed.
    InvalidArgument,
    /// The domain bit length is zero or does not fit a 64-bit value, or a value does not belong
    /// to the configured domain.
    InvalidDomain,
    /// The privacy budget is not a positive finite number, or a slice exceeds what remains.
    InvalidBudget,
    /// Too few participants with budget left to run a statistically meaningful round.
    ///
    /// This is fatal: the run is aborted and partial results are discarded.
    InsufficientPopulation,
    /// A participant was asked a fresh question after spending its whole budget.
    ///
    /// This only removes that participant's vote from the current round.
    BudgetExhausted,
    /// The run was cancelled between rounds.
    Cancelled,
}

impl ErrorKind {
    /// Returns the kind as a static string.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::InvalidDomain => "InvalidDomain",
            ErrorKind::InvalidBudget => "InvalidBudget",
            ErrorKind::InsufficientPopulation => "InsufficientPopulation",
            ErrorKind::BudgetExhausted => "BudgetExhausted",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.into_static())
    }
}

/// Error returned by the fallible operations of this crate.
///
/// An error carries its [`ErrorKind`], a human readable message, and optional key/value
/// context describing where it happened (for example the search depth).
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
}

impl Error {
    /// Creates a new error of `kind` with `message`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Adds a key/value pair of context to this error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the context of this error.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub(crate) fn invalid_domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDomain, message)
    }

    pub(crate) fn invalid_budget(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidBudget, message)
    }

    pub(crate) fn insufficient_population(required: usize, available: usize) -> Self {
        Self::new(
            ErrorKind::InsufficientPopulation,
            format!("need {required} participants with budget left, {available} available"),
        )
    }

    pub(crate) fn budget_exhausted(spent: f64, requested: f64, total: f64) -> Self {
        Self::new(
            ErrorKind::BudgetExhausted,
            format!("spent {spent} of {total}, cannot spend another {requested}"),
        )
    }

    pub(crate) fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: {value}")?;
            }
            write!(f, " }}")?;
        }
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use `{:#?}` for the struct layout.
        if f.alternate() {
            return f
                .debug_struct("Error")
                .field("kind", &self.kind)
                .field("message", &self.message)
                .field("context", &self.context)
                .finish();
        }
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_and_message() {
        let err = Error::insufficient_population(2000, 150)
            .with_context("depth", 3)
            .with_context("frontier", 2);
        insta::assert_snapshot!(
            err.to_string(),
            @"InsufficientPopulation, context: { depth: 3, frontier: 2 } => need 2000 participants with budget left, 150 available"
        );
    }

    #[test]
    fn display_without_context() {
        let err = Error::cancelled("cancelled before depth 4");
        insta::assert_snapshot!(err.to_string(), @"Cancelled => cancelled before depth 4");
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(err.context().is_empty());
    }
}
