// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ordered registry of [`FormatValue`] types.

use std::{
    any::{self, TypeId},
    fmt,
    sync::Arc,
};

use super::{
    FormatValue, FormattableFormatter, HumanizerFormatter, NameFormatter,
    ToStringFormatter,
};

/// Registered [`FormatValue`] type.
#[derive(Clone, Copy)]
pub struct Registration {
    /// [`TypeId`] of the registered [`FormatValue`].
    type_id: TypeId,

    /// Name of the registered [`FormatValue`] type.
    name: &'static str,

    /// Constructor of the registered [`FormatValue`].
    construct: fn() -> Arc<dyn FormatValue>,
}

impl Registration {
    /// Creates a new [`Registration`] of the `F` formatter.
    #[must_use]
    pub fn of<F: FormatValue + Default + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<F>(),
            name: any::type_name::<F>(),
            construct: construct::<F>,
        }
    }

    /// Returns the name of the registered [`FormatValue`] type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Constructs a new instance of the registered [`FormatValue`].
    #[must_use]
    pub fn construct(&self) -> Arc<dyn FormatValue> {
        (self.construct)()
    }

    /// Indicates whether this [`Registration`] is of the `F` formatter.
    #[must_use]
    pub fn is<F: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<F>()
    }
}

/// Constructs a new default instance of the `F` formatter.
fn construct<F: FormatValue + Default + 'static>() -> Arc<dyn FormatValue> {
    Arc::new(F::default())
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Registration").field(&self.name).finish()
    }
}

/// Ordered list of [`FormatValue`] types, from the most specific to the most
/// generic one.
///
/// Types are registered rather than instances: a [`ValueFormatterProvider`]
/// constructs them on demand.
///
/// [`ValueFormatterProvider`]: super::ValueFormatterProvider
#[derive(Clone, Debug)]
pub struct ValueFormatterRegistry {
    /// Registered [`FormatValue`] types in the order they're tried.
    registrations: Vec<Registration>,
}

impl Default for ValueFormatterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ValueFormatterRegistry {
    /// Creates a new empty [`ValueFormatterRegistry`].
    ///
    /// # Warning
    ///
    /// A registry without a catch-all formatter (like [`ToStringFormatter`])
    /// fails to format values no other formatter matches.
    #[must_use]
    pub const fn new() -> Self {
        Self { registrations: Vec::new() }
    }

    /// Creates a new [`ValueFormatterRegistry`] with all the built-in
    /// formatters, ending with the [`ToStringFormatter`] catch-all.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register::<FormattableFormatter>()
            .register::<HumanizerFormatter>()
            .register::<NameFormatter>()
            .register::<ToStringFormatter>();
        registry
    }

    /// Appends the `F` formatter to the end of this registry.
    pub fn register<F>(&mut self) -> &mut Self
    where
        F: FormatValue + Default + 'static,
    {
        self.registrations.push(Registration::of::<F>());
        self
    }

    /// Inserts the `F` formatter at the given `index`, so it's tried before
    /// every formatter registered after that position.
    ///
    /// An `index` beyond the end appends.
    pub fn insert<F>(&mut self, index: usize) -> &mut Self
    where
        F: FormatValue + Default + 'static,
    {
        let index = index.min(self.registrations.len());
        self.registrations.insert(index, Registration::of::<F>());
        self
    }

    /// Removes every registration of the `F` formatter, returning whether
    /// there was any.
    pub fn remove<F: 'static>(&mut self) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| !r.is::<F>());
        self.registrations.len() != before
    }

    /// Returns the number of registered formatters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Indicates whether no formatters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Returns names of the registered formatter types in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registrations.iter().map(Registration::name)
    }

    /// Returns the registrations in order.
    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }
}
