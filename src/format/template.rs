// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Report templates with named placeholders.
//!
//! A template like `"{Actor} opens {Target}"` is turned into a positional
//! format template `"{0} opens {1}"` plus the ordered table of placeholder
//! names zipped with the supplied values.
//!
//! Doubled braces (`{{` and `}}`) are escapes and never delimit a
//! placeholder.

use std::iter;

/// Placeholder name paired with the value supplied for it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameAndValue<V> {
    /// Name of the placeholder.
    pub name: String,

    /// Value supplied for the placeholder, or [`None`] if there were fewer
    /// values than placeholders.
    pub value: Option<V>,
}

/// Parsed report template.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportFormat<V> {
    /// Template as it was given.
    pub original_template: String,

    /// Template with every placeholder replaced by the zero-based position
    /// of its name's first occurrence.
    pub format_template: String,

    /// Distinct placeholder names in order of their first appearance.
    pub values: Vec<NameAndValue<V>>,
}

impl<V> ReportFormat<V> {
    /// Parses the given `template`, zipping its distinct placeholder names
    /// with the `values` by position.
    ///
    /// Excess placeholders get [`None`], excess values are discarded.
    #[must_use]
    pub fn parse(template: &str, values: impl IntoIterator<Item = V>) -> Self {
        let mut names = Vec::<&str>::new();
        let mut format_template = String::with_capacity(template.len());

        let mut rest = template;
        while let Some(pos) = rest.find(['{', '}']) {
            format_template.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                format_template.push_str(&tail[..2]);
                rest = &tail[2..];
                continue;
            }

            if let Some(name) = placeholder_at(tail) {
                let seen = names.iter().position(|n| *n == name);
                let index = seen.unwrap_or_else(|| {
                    names.push(name);
                    names.len() - 1
                });
                format_template.push('{');
                format_template.push_str(&index.to_string());
                format_template.push('}');
                rest = &tail[name.len() + 2..];
                continue;
            }

            format_template.push_str(&tail[..1]);
            rest = &tail[1..];
        }
        format_template.push_str(rest);

        let values = names
            .into_iter()
            .zip(values.into_iter().map(Some).chain(iter::repeat_with(|| None)))
            .map(|(name, value)| NameAndValue { name: name.to_owned(), value })
            .collect();

        Self {
            original_template: template.to_owned(),
            format_template,
            values,
        }
    }

    /// Maps the values of this [`ReportFormat`] with the given function.
    ///
    /// # Errors
    ///
    /// If the function fails for any value.
    pub fn try_map_values<T, E>(
        self,
        mut f: impl FnMut(Option<V>) -> Result<T, E>,
    ) -> Result<ReportFormat<T>, E> {
        let values = self
            .values
            .into_iter()
            .map(|NameAndValue { name, value }| {
                Ok(NameAndValue { name, value: Some(f(value)?) })
            })
            .collect::<Result<_, E>>()?;

        Ok(ReportFormat {
            original_template: self.original_template,
            format_template: self.format_template,
            values,
        })
    }
}

/// Returns the placeholder name if `tail` starts with `{name}`.
fn placeholder_at(tail: &str) -> Option<&str> {
    let body = tail.strip_prefix('{')?;
    let end = body.find(|c: char| !is_identifier_char(c))?;
    (end > 0 && body[end..].starts_with('}')).then(|| &body[..end])
}

/// Checks whether the given `c` may be a part of a placeholder name.
fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Renders a positional `format_template` with the given `args`.
///
/// `{{` and `}}` are unescaped into single braces. Markers without a
/// corresponding argument and unmatched braces are left as is.
#[must_use]
pub fn render(format_template: &str, args: &[impl AsRef<str>]) -> String {
    let mut out = String::with_capacity(format_template.len());

    let mut rest = format_template;
    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        let marker = tail
            .strip_prefix('{')
            .and_then(|body| body.split_once('}'))
            .and_then(|(digits, _)| {
                let n = digits.parse::<usize>().ok()?;
                Some((digits, args.get(n)?))
            });
        if let Some((digits, arg)) = marker {
            out.push_str(arg.as_ref());
            rest = &tail[digits.len() + 2..];
            continue;
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    out.push_str(rest);

    out
}
