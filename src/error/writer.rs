// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Artifact writing errors.
//!
//! This module defines errors that can occur while streaming the JSON
//! artifact, including I/O errors, serialization failures and writes into an
//! already completed artifact.

use std::io;

use derive_more::with_trait::{Display, Error, From};

/// Artifact writing errors.
#[derive(Debug, Display, Error, From)]
pub enum WriterError {
    /// I/O error during output operations.
    #[display("I/O error: {_0}")]
    Io(io::Error),

    /// Failed to serialize a report.
    #[display("Serialization failed: {_0}")]
    Serialization(serde_json::Error),

    /// Output is unavailable for writing.
    #[display("Output unavailable: {reason}")]
    #[from(skip)]
    Unavailable {
        /// Reason why output is unavailable.
        #[error(not(source))]
        reason: String,
    },
}

/// Result type alias for writer operations.
pub type WriterResult<T> = Result<T, WriterError>;

impl WriterError {
    /// Creates a new [`WriterError::Unavailable`].
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable { reason: reason.into() }
    }

    /// Returns the unavailable reason if applicable.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Unavailable { reason } => Some(reason),
            Self::Io(_) | Self::Serialization(_) => None,
        }
    }
}
