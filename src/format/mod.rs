// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Turning runtime values and report templates into human-readable text.
//!
//! - [`formatter`]: [`FormatValue`] strategies and the built-in ones
//! - [`registry`]: ordered [`ValueFormatterRegistry`] of formatter types
//! - [`provider`]: first-match [`ValueFormatterProvider`]
//! - [`template`]: named placeholder [`ReportFormat`]s
//! - [`fragment`]: [`ReportFragment`]s built by a [`FragmentFormatter`]

pub mod formatter;
pub mod fragment;
pub mod provider;
pub mod registry;
pub mod template;

pub use self::{
    formatter::{
        FormatValue, FormattableFormatter, HumanizerFormatter, NameFormatter,
        ToStringFormatter,
    },
    fragment::{FragmentFormatter, ReportFragment},
    provider::ValueFormatterProvider,
    registry::{Registration, ValueFormatterRegistry},
    template::{NameAndValue, ReportFormat},
};
