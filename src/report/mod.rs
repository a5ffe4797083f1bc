// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Report document and its per-performance builder.

pub mod builder;
pub mod model;

#[doc(inline)]
pub use self::{
    builder::PerformanceReportBuilder,
    model::{
        ActorReport, NamingItem, Outcome, PerformableAsset, PerformableReport,
        PerformancePhase, PerformanceReport, REPORT_FORMAT_VERSION,
        ReportMetadata, Reportable, ScreenplayReport,
    },
};
