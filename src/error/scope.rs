// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of misusing performance and performable scopes.
//!
//! All of these are programming errors of the caller feeding events in.

use derive_more::with_trait::{Display, Error};

use crate::event::PerformanceId;

/// Misuse of a performance or performable scope.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum ScopeError {
    /// Performance with the same identity was begun twice.
    #[display("Performance `{performance}` was begun twice")]
    DoubleBegin {
        /// Identity of the performance.
        #[error(not(source))]
        performance: PerformanceId,
    },

    /// Operation was invoked before its scope was begun.
    #[display("`{operation}` was invoked outside of any open scope")]
    OperationOnUnopenedScope {
        /// Name of the rejected operation.
        #[error(not(source))]
        operation: &'static str,
    },

    /// Operation was invoked after the report was finalised.
    #[display("`{operation}` was invoked after the report was finalised")]
    OperationAfterFinalisation {
        /// Name of the rejected operation.
        #[error(not(source))]
        operation: &'static str,
    },

    /// Ended performable isn't the innermost open one.
    #[display(
        "Ending performable `{actual}`, but the innermost open one is \
         `{expected}`"
    )]
    MismatchedPerformable {
        /// Type of the innermost open performable.
        #[error(not(source))]
        expected: String,

        /// Type of the performable being ended.
        actual: String,
    },
}

/// Result type alias for scope-checked operations.
pub type ScopeResult<T> = Result<T, ScopeError>;

impl ScopeError {
    /// Creates a new [`ScopeError::OperationOnUnopenedScope`].
    #[must_use]
    pub const fn unopened(operation: &'static str) -> Self {
        Self::OperationOnUnopenedScope { operation }
    }

    /// Creates a new [`ScopeError::OperationAfterFinalisation`].
    #[must_use]
    pub const fn finalised(operation: &'static str) -> Self {
        Self::OperationAfterFinalisation { operation }
    }

    /// Returns the name of the rejected operation, if any.
    #[must_use]
    pub const fn operation(&self) -> Option<&'static str> {
        match self {
            Self::OperationOnUnopenedScope { operation }
            | Self::OperationAfterFinalisation { operation } => Some(operation),
            Self::DoubleBegin { .. } | Self::MismatchedPerformable { .. } => {
                None
            }
        }
    }
}
