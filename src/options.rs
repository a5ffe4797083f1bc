// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration of reporting.

use std::{path::PathBuf, time::SystemTime};

use smart_default::SmartDefault;

use crate::format::ValueFormatterRegistry;

/// Options of a [`Screenplay`].
///
/// [`Screenplay`]: crate::Screenplay
#[derive(Clone, Debug, SmartDefault)]
pub struct ScreenplayOptions {
    /// Path to write the JSON report into.
    ///
    /// [`None`] disables writing the report to a file.
    #[default(Some(default_report_path(SystemTime::now())))]
    pub report_path: Option<PathBuf>,

    /// Value formatters to format report values with, in the order they're
    /// tried.
    pub value_formatters: ValueFormatterRegistry,
}

impl ScreenplayOptions {
    /// Sets the [`ScreenplayOptions::report_path`].
    #[must_use]
    pub fn report_path(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.report_path = path.map(Into::into);
        self
    }

    /// Sets the [`ScreenplayOptions::value_formatters`].
    #[must_use]
    pub fn value_formatters(
        mut self,
        registry: ValueFormatterRegistry,
    ) -> Self {
        self.value_formatters = registry;
        self
    }

    /// Overrides these [`ScreenplayOptions`] with the given [`Cli`] options.
    #[must_use]
    pub fn apply_cli(mut self, cli: Cli) -> Self {
        if cli.no_report {
            self.report_path = None;
        } else if let Some(path) = cli.report_path {
            self.report_path = Some(path);
        }
        self
    }
}

/// Default report path: `ScreenplayReport_<timestamp>.json` in the current
/// directory.
///
/// The timestamp has no colons, so it's a valid file name everywhere.
#[must_use]
pub fn default_report_path(at: SystemTime) -> PathBuf {
    let stamp =
        humantime::format_rfc3339_seconds(at).to_string().replace(':', "");
    PathBuf::from(format!("ScreenplayReport_{stamp}.json"))
}

/// CLI options of reporting.
#[derive(Clone, Debug, Default, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Path to write the JSON Screenplay report into.
    #[arg(
        long = "screenplay-report-path",
        value_name = "PATH",
        env = "SCREENPLAY_REPORT_PATH",
        global = true
    )]
    pub report_path: Option<PathBuf>,

    /// Disables writing the JSON Screenplay report.
    #[arg(
        long = "no-screenplay-report",
        conflicts_with = "report_path",
        global = true
    )]
    pub no_report: bool,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Args {
        #[command(flatten)]
        screenplay: Cli,
    }

    #[test]
    fn defaults() {
        let options = ScreenplayOptions::default();

        let path = options.report_path.unwrap().display().to_string();
        assert!(path.starts_with("ScreenplayReport_"));
        assert!(path.ends_with(".json"));
        assert_eq!(options.value_formatters.len(), 4);
    }

    #[test]
    fn report_path_has_no_colons() {
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(3_661);

        assert_eq!(
            default_report_path(at),
            PathBuf::from("ScreenplayReport_1970-01-01T010101Z.json"),
        );
    }

    #[test]
    fn applies_report_path_from_cli() {
        let args = Args::try_parse_from([
            "test",
            "--screenplay-report-path",
            "out/report.json",
        ])
        .unwrap();

        let options = ScreenplayOptions::default().apply_cli(args.screenplay);

        assert_eq!(options.report_path, Some(PathBuf::from("out/report.json")));
    }

    #[test]
    fn disables_report_from_cli() {
        let args =
            Args::try_parse_from(["test", "--no-screenplay-report"]).unwrap();

        let options = ScreenplayOptions::default().apply_cli(args.screenplay);

        assert_eq!(options.report_path, None);
    }

    #[test]
    fn rejects_conflicting_flags() {
        assert!(Args::try_parse_from([
            "test",
            "--no-screenplay-report",
            "--screenplay-report-path",
            "x.json",
        ])
        .is_err());
    }

    #[test]
    fn keeps_options_without_cli() {
        let options = ScreenplayOptions::default()
            .report_path(Some("kept.json"))
            .apply_cli(Cli::default());

        assert_eq!(options.report_path, Some(PathBuf::from("kept.json")));
    }
}
