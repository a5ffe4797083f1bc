// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolution of the [`FormatValue`] matching a value.

use std::{fmt, sync::{Arc, OnceLock}};

use super::{
    FormatValue, Registration, ValueFormatterRegistry, formatter::NULL_TEXT,
};
use crate::{ReportValue, error::{FormatterError, FormatterResult}};

/// Provider of the first [`FormatValue`] (in registration order) able to
/// format a value.
///
/// Formatters are constructed lazily, once per registration, and reused
/// afterwards.
pub struct ValueFormatterProvider {
    /// Registrations with their lazily constructed instances.
    formatters: Vec<(Registration, OnceLock<Arc<dyn FormatValue>>)>,
}

impl fmt::Debug for ValueFormatterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.formatters.iter().map(|(r, _)| r))
            .finish()
    }
}

impl Default for ValueFormatterProvider {
    fn default() -> Self {
        Self::new(&ValueFormatterRegistry::default())
    }
}

impl ValueFormatterProvider {
    /// Creates a new [`ValueFormatterProvider`] snapshotting the current
    /// order of the given `registry`.
    #[must_use]
    pub fn new(registry: &ValueFormatterRegistry) -> Self {
        Self {
            formatters: registry
                .registrations()
                .iter()
                .map(|r| (*r, OnceLock::new()))
                .collect(),
        }
    }

    /// Returns the first registered [`FormatValue`] able to format the given
    /// `value`.
    ///
    /// # Errors
    ///
    /// With [`FormatterError::Exhausted`] if no registered formatter matches,
    /// which means the catch-all formatter is missing.
    pub fn formatter_for(
        &self,
        value: Option<&dyn ReportValue>,
    ) -> FormatterResult<Arc<dyn FormatValue>> {
        self.formatters
            .iter()
            .map(|(reg, cell)| cell.get_or_init(|| reg.construct()))
            .find(|f| f.can_format(value))
            .cloned()
            .ok_or_else(|| {
                FormatterError::exhausted(
                    value.map_or(NULL_TEXT, |v| v.type_name()),
                )
            })
    }

    /// Formats the given `value` with the first matching [`FormatValue`].
    ///
    /// # Errors
    ///
    /// See [`ValueFormatterProvider::formatter_for()`].
    pub fn format(
        &self,
        value: Option<&dyn ReportValue>,
    ) -> FormatterResult<String> {
        let formatter = self.formatter_for(value)?;
        Ok(formatter.format_for_report(value))
    }
}
