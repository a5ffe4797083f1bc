// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Value formatter chain errors.

use derive_more::with_trait::{Display, Error};

/// Error of a misconfigured [`ValueFormatterRegistry`].
///
/// [`ValueFormatterRegistry`]: crate::format::ValueFormatterRegistry
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum FormatterError {
    /// No registered formatter is able to format a value.
    ///
    /// Only happens when the catch-all formatter is missing from the chain,
    /// which is a deployment bug.
    #[display(
        "No registered value formatter is able to format a value of type \
         `{type_name}`"
    )]
    Exhausted {
        /// Type of the unformattable value, or `<null>`.
        #[error(not(source))]
        type_name: String,
    },
}

/// Result type alias for value formatting.
pub type FormatterResult<T> = Result<T, FormatterError>;

impl FormatterError {
    /// Creates a new [`FormatterError::Exhausted`].
    #[must_use]
    pub fn exhausted(type_name: impl Into<String>) -> Self {
        Self::Exhausted { type_name: type_name.into() }
    }
}
