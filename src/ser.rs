// The MIT License (MIT)

// Copyright (c) 2015 Y. T. Chung <zonyitoo@gmail.com>

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Drive a [`Generator`] from any [`serde::Serialize`] value.
//!
//! Structs and maps become documents, sequences and tuples become arrays, and enum variants with
//! data become single-entry documents keyed by the variant name. [`ObjectId`] and [`DateTime`]
//! serialize as their native BSON types when written through this module, and as a hex string
//! and an `i64` of milliseconds respectively everywhere else.

mod document_serializer;
mod key_serializer;
mod value_serializer;

use std::io::Write;

use serde::Serialize;

pub(crate) use self::value_serializer::SerializerHint;
pub use self::value_serializer::ValueSerializer;
use crate::{
    error::Result,
    generator::ScopeSerializer,
    oid::ObjectId,
    DateTime,
    Generator,
    GeneratorOptions,
};

pub(crate) const OBJECT_ID_NEWTYPE_NAME: &str = "$__bson_generator_private_oid";
pub(crate) const DATETIME_NEWTYPE_NAME: &str = "$__bson_generator_private_datetime";

impl<W: Write> Generator<W> {
    /// Write `value` at the current position, exactly as if each of its parts had been written
    /// through the corresponding generator call.
    ///
    /// ```
    /// use bson_generator::Generator;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Point {
    ///     x: i32,
    ///     y: i32,
    /// }
    ///
    /// let mut generator = Generator::new(Vec::new());
    /// generator.serialize(&Point { x: 1, y: 2 })?;
    /// generator.close()?;
    /// assert_eq!(generator.into_inner().len(), 19);
    /// # Ok::<(), bson_generator::error::Error>(())
    /// ```
    pub fn serialize<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let result = value.serialize(ValueSerializer::new(self));
        self.track(result)
    }
}

/// Serialize `value` into a complete BSON document.
pub fn serialize_to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    serialize_to_vec_with_options(value, GeneratorOptions::default())
}

/// Serialize `value` into a BSON document using a generator configured with `options`.
pub fn serialize_to_vec_with_options<T>(value: &T, options: GeneratorOptions) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut generator = Generator::with_options(Vec::new(), options);
    generator.serialize(value)?;
    generator.close()?;
    Ok(generator.into_inner())
}

/// A [`ScopeSerializer`] that writes the fields of any `Serialize` struct or map into the scope
/// of a code-with-scope value.
///
/// ```
/// use std::collections::BTreeMap;
///
/// use bson_generator::{ser::SerdeScope, Generator};
///
/// let scope = BTreeMap::from([("limit", 10)]);
/// let mut generator = Generator::new(Vec::new());
/// generator.begin_document()?;
/// generator.write_field_name("where")?;
/// generator.write_code_with_scope("this.n < limit", &scope, &SerdeScope)?;
/// generator.end_document()?;
/// # Ok::<(), bson_generator::error::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeScope;

impl<T, W> ScopeSerializer<T, W> for SerdeScope
where
    T: Serialize + ?Sized,
    W: Write,
{
    fn serialize_scope(&self, scope: &T, generator: &mut Generator<W>) -> Result<()> {
        scope.serialize(ValueSerializer::with_hint(
            generator,
            SerializerHint::ScopeEntries,
        ))
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_newtype_struct(OBJECT_ID_NEWTYPE_NAME, &self.to_hex())
    }
}

impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_newtype_struct(DATETIME_NEWTYPE_NAME, &self.timestamp_millis())
    }
}
