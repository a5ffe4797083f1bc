// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`ReportFragment`]s and their formatting.

use std::sync::Arc;

use derive_more::with_trait::Display;

use super::{NameAndValue, ReportFormat, ValueFormatterProvider, template};
use crate::{ReportValue, error::FormatterResult};

/// Human-readable text of a single reportable event, along with the template
/// and values it was made of.
///
/// Immutable once created.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("{formatted_text}")]
pub struct ReportFragment {
    /// Template this [`ReportFragment`] was made of.
    original_template: String,

    /// Resulting text.
    formatted_text: String,

    /// Placeholder names with their formatted values.
    named_values: Vec<NameAndValue<String>>,
}

impl ReportFragment {
    /// Returns the template this [`ReportFragment`] was made of.
    #[must_use]
    pub fn original_template(&self) -> &str {
        &self.original_template
    }

    /// Returns the resulting text of this [`ReportFragment`].
    #[must_use]
    pub fn formatted_text(&self) -> &str {
        &self.formatted_text
    }

    /// Returns placeholder names with their formatted values, in order of
    /// their first appearance.
    #[must_use]
    pub fn named_values(&self) -> &[NameAndValue<String>] {
        &self.named_values
    }

    /// Returns the formatted value of the placeholder with the given `name`.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.named_values
            .iter()
            .find(|nv| nv.name == name)
            .and_then(|nv| nv.value.as_deref())
    }

    /// Unwraps the resulting text of this [`ReportFragment`].
    #[must_use]
    pub fn into_text(self) -> String {
        self.formatted_text
    }
}

/// Formatter of report templates into [`ReportFragment`]s, formatting the
/// template values through a [`ValueFormatterProvider`].
#[derive(Clone, Debug, Default)]
pub struct FragmentFormatter {
    /// [`ValueFormatterProvider`] to format template values with.
    values: Arc<ValueFormatterProvider>,
}

impl FragmentFormatter {
    /// Creates a new [`FragmentFormatter`] on top of the given
    /// [`ValueFormatterProvider`].
    #[must_use]
    pub const fn new(values: Arc<ValueFormatterProvider>) -> Self {
        Self { values }
    }

    /// Returns the underlying [`ValueFormatterProvider`].
    #[must_use]
    pub fn value_formatters(&self) -> &ValueFormatterProvider {
        &self.values
    }

    /// Formats the given `template` with the given `values`.
    ///
    /// Placeholders without a supplied value are formatted as nulls.
    ///
    /// # Errors
    ///
    /// If any of the values cannot be formatted.
    pub fn format(
        &self,
        template: &str,
        values: &[&dyn ReportValue],
    ) -> FormatterResult<ReportFragment> {
        let format = ReportFormat::parse(template, values.iter().copied())
            .try_map_values(|v| self.values.format(v))?;

        let args = format
            .values
            .iter()
            .map(|nv| nv.value.as_deref().unwrap_or_default())
            .collect::<Vec<_>>();
        let formatted_text = template::render(&format.format_template, &args);

        Ok(ReportFragment {
            original_template: format.original_template,
            formatted_text,
            named_values: format.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Actor, format::{FormatValue, ValueFormatterRegistry}};

    #[derive(Debug)]
    struct TheDoor;

    impl ReportValue for TheDoor {
        fn format_for_report(&self) -> Option<String> {
            Some("the front door".into())
        }
    }

    #[test]
    fn formats_named_placeholders() {
        let joe = Actor::named("Joe");
        let fragment = FragmentFormatter::default()
            .format("{Actor} opens {Target}", &[&joe, &TheDoor])
            .unwrap();

        assert_eq!(fragment.to_string(), "Joe opens the front door");
        assert_eq!(fragment.original_template(), "{Actor} opens {Target}");
        assert_eq!(fragment.value_of("Actor"), Some("Joe"));
        assert_eq!(fragment.value_of("Target"), Some("the front door"));
        assert_eq!(fragment.value_of("Nobody"), None);
    }

    #[test]
    fn formats_missing_values_as_null() {
        let fragment = FragmentFormatter::default()
            .format("{Actor} waits for {Whom}", &[&Actor::named("Joe")])
            .unwrap();

        assert_eq!(fragment.formatted_text(), "Joe waits for <null>");
    }

    #[test]
    fn unescapes_braces() {
        let fragment = FragmentFormatter::default()
            .format("{{literal}} {x} and {x}", &[&5_u8])
            .unwrap();

        assert_eq!(fragment.formatted_text(), "{literal} 5 and 5");
        assert_eq!(fragment.named_values().len(), 1);
    }

    #[test]
    fn propagates_exhaustion() {
        #[derive(Default)]
        struct Nothing;

        impl FormatValue for Nothing {
            fn can_format(&self, _: Option<&dyn ReportValue>) -> bool {
                false
            }

            fn format_for_report(&self, _: Option<&dyn ReportValue>) -> String {
                String::new()
            }
        }

        let mut registry = ValueFormatterRegistry::new();
        registry.register::<Nothing>();
        let formatter = FragmentFormatter::new(Arc::new(
            ValueFormatterProvider::new(&registry),
        ));

        assert!(formatter.format("{Actor} leaves", &[&5_u8]).is_err());
        assert!(formatter.format("Nobody leaves", &[]).is_ok());
    }
}
