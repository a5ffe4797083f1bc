// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`FormatValue`] strategies, including the built-in ones.

use std::{
    any::Any,
    time::{Duration, SystemTime},
};

use inflector::Inflector as _;
use itertools::Itertools as _;

use crate::ReportValue;

/// Text the catch-all formatter produces for a null value.
pub const NULL_TEXT: &str = "<null>";

/// Strategy turning a runtime value into a short human-readable text.
///
/// A [`None`] value stands for a null.
pub trait FormatValue: Send + Sync {
    /// Indicates whether this strategy is able to format the given `value`.
    fn can_format(&self, value: Option<&dyn ReportValue>) -> bool;

    /// Formats the given `value` for a report.
    ///
    /// Is only called if [`FormatValue::can_format()`] returned `true` for
    /// the same `value`.
    fn format_for_report(&self, value: Option<&dyn ReportValue>) -> String;
}

/// Formats values describing themselves via
/// [`ReportValue::format_for_report()`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FormattableFormatter;

impl FormatValue for FormattableFormatter {
    fn can_format(&self, value: Option<&dyn ReportValue>) -> bool {
        value.is_some_and(|v| v.format_for_report().is_some())
    }

    fn format_for_report(&self, value: Option<&dyn ReportValue>) -> String {
        value.and_then(|v| v.format_for_report()).unwrap_or_default()
    }
}

/// Humanizes durations, timestamps, string collections and enum variants.
///
/// Only English is supported.
#[derive(Clone, Copy, Debug, Default)]
pub struct HumanizerFormatter;

impl HumanizerFormatter {
    /// Humanizes the given `value`, if it's of a supported kind.
    fn humanize(value: &dyn ReportValue) -> Option<String> {
        if let Some(variant) = value.variant_name() {
            return Some(variant.to_sentence_case().to_lowercase());
        }

        let any: &dyn Any = value;
        if let Some(duration) = any.downcast_ref::<Duration>() {
            Some(humantime::format_duration(*duration).to_string())
        } else if let Some(at) = any.downcast_ref::<SystemTime>() {
            Some(humantime::format_rfc3339_seconds(*at).to_string())
        } else if let Some(items) = any.downcast_ref::<Vec<String>>() {
            Some(humanize_list(items))
        } else {
            any.downcast_ref::<Vec<&'static str>>().map(|s| humanize_list(s))
        }
    }
}

impl FormatValue for HumanizerFormatter {
    fn can_format(&self, value: Option<&dyn ReportValue>) -> bool {
        value.is_some_and(|v| Self::humanize(v).is_some())
    }

    fn format_for_report(&self, value: Option<&dyn ReportValue>) -> String {
        value.and_then(|v| Self::humanize(v)).unwrap_or_default()
    }
}

/// Joins the given `items` into an English enumeration: `a, b and c`.
fn humanize_list(items: &[impl AsRef<str>]) -> String {
    match items {
        [] => String::new(),
        [single] => single.as_ref().to_owned(),
        [init @ .., last] => format!(
            "{} and {}",
            init.iter().map(AsRef::<str>::as_ref).join(", "),
            last.as_ref(),
        ),
    }
}

/// Formats named values via [`ReportValue::name()`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NameFormatter;

impl FormatValue for NameFormatter {
    fn can_format(&self, value: Option<&dyn ReportValue>) -> bool {
        value.is_some_and(|v| v.name().is_some())
    }

    fn format_for_report(&self, value: Option<&dyn ReportValue>) -> String {
        value.and_then(|v| v.name()).unwrap_or_default().to_owned()
    }
}

/// Catch-all formatter using [`ReportValue::describe()`], or [`NULL_TEXT`]
/// for a null.
///
/// Always matches, so should be registered last.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToStringFormatter;

impl FormatValue for ToStringFormatter {
    fn can_format(&self, _: Option<&dyn ReportValue>) -> bool {
        true
    }

    fn format_for_report(&self, value: Option<&dyn ReportValue>) -> String {
        value.map_or_else(|| NULL_TEXT.to_owned(), |v| v.describe())
    }
}
