// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Failure`] of a performable.

use std::error::Error as StdError;

use derive_more::with_trait::{Display, Error};

/// Failure of a performable, as recorded into a report.
///
/// Once a [`Failure`] has been recorded for the performable it happened in,
/// it's [marked as reported][1] while bubbling up, so the enclosing
/// performables record it as consumed instead of as a new failure.
///
/// [1]: Failure::into_reported
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("{message}")]
pub struct Failure {
    /// Full diagnostic text of this [`Failure`].
    #[error(not(source))]
    message: String,

    /// Whether this [`Failure`] has already been recorded by a nested
    /// performable.
    already_reported: bool,
}

impl Failure {
    /// Creates a new, not yet reported [`Failure`] with the given diagnostic
    /// `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), already_reported: false }
    }

    /// Creates a new, not yet reported [`Failure`] out of the given `error`,
    /// rendering its whole [`source()`] chain as the diagnostic text.
    ///
    /// [`source()`]: StdError::source
    #[must_use]
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        let mut chain = vec![error.to_string()];
        let mut current = error.source();
        while let Some(err) = current {
            chain.push(err.to_string());
            current = err.source();
        }

        let message = match chain.split_first() {
            Some((head, tail)) if !tail.is_empty() => {
                format!("{head} (caused by: {})", tail.join(" -> "))
            }
            _ => chain.concat(),
        };
        Self::new(message)
    }

    /// Marks this [`Failure`] as already recorded into a report.
    #[must_use]
    pub fn into_reported(mut self) -> Self {
        self.already_reported = true;
        self
    }

    /// Indicates whether this [`Failure`] has already been recorded into a
    /// report by a nested performable.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        self.already_reported
    }

    /// Returns the full diagnostic text of this [`Failure`].
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
