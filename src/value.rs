// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime values appearing in reports.
//!
//! Anything an [`Actor`] may gain, perform or receive as a result is a
//! [`ReportValue`]. Its optional capabilities are what the
//! [value formatter chain][1] dispatches on.
//!
//! [`Actor`]: crate::Actor
//! [1]: crate::format::ValueFormatterProvider

use std::{
    any::{self, Any},
    fmt::Debug,
    sync::Arc,
    time::{Duration, SystemTime},
};

use crate::{
    Actor,
    error::FormatterResult,
    format::{FragmentFormatter, ReportFragment},
};

/// Value that may be written into a report.
///
/// Every capability method is opt-in and returns [`None`] by default, so the
/// minimal implementation is an empty `impl` block.
pub trait ReportValue: Any + Debug + Send + Sync + 'static {
    /// Fully qualified name of the concrete type of this value.
    fn type_name(&self) -> &'static str {
        any::type_name::<Self>()
    }

    /// Universal "describe yourself" operation, used as the last resort.
    ///
    /// Defaults to the [`ReportValue::type_name()`].
    fn describe(&self) -> String {
        self.type_name().to_owned()
    }

    /// Explicit human-readable description of this value for a report.
    fn format_for_report(&self) -> Option<String> {
        None
    }

    /// Name of this value, if it's a named thing.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Name of the enum variant this value represents, to be humanized.
    fn variant_name(&self) -> Option<&'static str> {
        None
    }

    /// Returns this value as able to build its own [`ReportFragment`].
    ///
    /// Abilities and performables implement this to control the text of the
    /// report entry they produce.
    fn as_reporting(&self) -> Option<&dyn CanReport> {
        None
    }
}

/// Ability of a value to build its own [`ReportFragment`] on behalf of an
/// [`Actor`].
pub trait CanReport {
    /// Builds a [`ReportFragment`] describing this value used by the `actor`.
    ///
    /// # Errors
    ///
    /// If the `formatter` fails to format any of the template values.
    fn report_fragment(
        &self,
        actor: &Actor,
        formatter: &FragmentFormatter,
    ) -> FormatterResult<ReportFragment>;
}

/// Shared [`ReportValue`] travelling along events.
pub type SharedValue = Arc<dyn ReportValue>;

/// Short name of the given fully qualified type name, stripped of its module
/// path and generic parameters.
#[must_use]
pub fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

macro_rules! displayed_value {
    ($($ty:ty),* $(,)?) => {$(
        impl ReportValue for $ty {
            fn describe(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

displayed_value!(
    String,
    &'static str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);

impl ReportValue for Duration {
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

impl ReportValue for SystemTime {}

impl ReportValue for Vec<String> {}

impl ReportValue for Vec<&'static str> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct OpenTheBook;

    impl ReportValue for OpenTheBook {}

    #[test]
    fn describes_with_type_name_by_default() {
        let value: &dyn ReportValue = &OpenTheBook;

        assert!(value.type_name().ends_with("OpenTheBook"));
        assert_eq!(value.describe(), value.type_name());
        assert!(value.format_for_report().is_none());
        assert!(value.name().is_none());
        assert!(value.as_reporting().is_none());
    }

    #[test]
    fn describes_displayable_values() {
        assert_eq!(42_u8.describe(), "42");
        assert_eq!("plain".describe(), "plain");
        assert_eq!(String::from("owned").describe(), "owned");
        assert_eq!(true.describe(), "true");
    }

    #[test]
    fn keeps_concrete_type_name_behind_dyn() {
        let value: SharedValue = Arc::new(OpenTheBook);

        assert!(value.type_name().ends_with("::OpenTheBook"));
    }

    #[test]
    fn shortens_type_names() {
        assert_eq!(
            short_type_name("my_crate::tasks::OpenTheBook"),
            "OpenTheBook",
        );
        assert_eq!(short_type_name("OpenTheBook"), "OpenTheBook");
        assert_eq!(
            short_type_name("my_crate::Wait<my_crate::Seconds>"),
            "Wait",
        );
    }
}
