// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level [`ReportError`].

use std::io;

use derive_more::with_trait::{Display, Error, From};

use super::{FormatterError, ScopeError, WriterError};

/// Top-level error of the reporting subsystem.
#[derive(Debug, Display, Error, From)]
pub enum ReportError {
    /// Performance or performable scope was misused.
    #[display("Reporting contract violated: {_0}")]
    Scope(ScopeError),

    /// Value formatter chain is misconfigured.
    #[display("Value formatting failed: {_0}")]
    Formatter(FormatterError),

    /// Output artifact couldn't be written.
    #[display("Report writing failed: {_0}")]
    Writer(WriterError),
}

/// Result type alias using [`ReportError`].
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    /// Indicates whether this error leaves the report of its performance
    /// unreliable, so the performance has to be omitted from the artifact.
    ///
    /// A repeated begin, an event after the finish, or a failed write don't
    /// corrupt the report being built, so they're only recorded.
    #[must_use]
    pub const fn aborts_performance(&self) -> bool {
        match self {
            Self::Scope(
                ScopeError::DoubleBegin { .. }
                | ScopeError::OperationAfterFinalisation { .. },
            )
            | Self::Writer(_) => false,
            Self::Scope(
                ScopeError::OperationOnUnopenedScope { .. }
                | ScopeError::MismatchedPerformable { .. },
            )
            | Self::Formatter(_) => true,
        }
    }
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        Self::Writer(WriterError::Io(err))
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Writer(WriterError::Serialization(err))
    }
}
