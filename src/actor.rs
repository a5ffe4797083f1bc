// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Actor`] definitions.

use std::sync::Arc;

use derive_more::with_trait::Display;

use crate::ReportValue;

/// Named subject performing performables and gaining abilities.
///
/// Cheap to clone, as it travels along almost every event.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{name}")]
pub struct Actor {
    /// Name of this [`Actor`].
    name: Arc<str>,
}

impl Actor {
    /// Creates a new [`Actor`] with the given `name`.
    #[must_use]
    pub fn named(name: impl AsRef<str>) -> Self {
        Self { name: Arc::from(name.as_ref()) }
    }

    /// Returns the name of this [`Actor`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ReportValue for Actor {
    fn describe(&self) -> String {
        self.name.to_string()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_named_value() {
        let joe = Actor::named("Joe");

        assert_eq!(joe.name(), "Joe");
        assert_eq!(joe.to_string(), "Joe");
        assert_eq!(ReportValue::name(&joe), Some("Joe"));
        assert_eq!(joe.clone(), joe);
    }
}
