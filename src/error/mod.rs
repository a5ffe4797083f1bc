// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types of the reporting subsystem.
//!
//! Every kind here is a contract violation local to reporting: it aborts the
//! reporting of the affected performance only, never the whole process.
//!
//! # Modules
//!
//! - [`core`] - Top-level [`ReportError`] consolidating everything below
//! - [`scope`] - Misuse of performance and performable scopes
//! - [`format`] - Value formatter chain configuration errors
//! - [`writer`] - Output artifact writing errors

pub mod core;
pub mod format;
pub mod scope;
pub mod writer;

pub use self::{
    core::{ReportError, Result},
    format::{FormatterError, FormatterResult},
    scope::{ScopeError, ScopeResult},
    writer::{WriterError, WriterResult},
};
