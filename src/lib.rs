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

//! BSON is a binary format in which zero or more key/value pairs are stored as a single entity.
//! We call this entity a document.
//!
//! This library writes BSON incrementally. A [`Generator`] receives a depth-first sequence of
//! structural calls (begin a document, write a field name, write a value, end the document) and
//! produces length-prefixed BSON into any [`std::io::Write`] sink, without ever building a
//! document tree in memory.
//!
//! ## Basic usage
//!
//! ```rust
//! use bson_generator::{Generator, Regex, RegexFlags};
//!
//! let mut generator = Generator::new(Vec::new());
//! generator.begin_document()?;
//! generator.write_field_name("name")?;
//! generator.write_string("widget")?;
//! generator.write_field_name("tags")?;
//! generator.begin_array()?;
//! generator.write_string("a")?;
//! generator.write_string("b")?;
//! generator.end_array()?;
//! generator.write_field_name("match")?;
//! generator.write_regex(&Regex::new("^w", RegexFlags::CASE_INSENSITIVE))?;
//! generator.end_document()?;
//! generator.close()?;
//!
//! let bytes = generator.into_inner();
//! assert_eq!(bytes.len(), i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize);
//! # Ok::<(), bson_generator::error::Error>(())
//! ```
//!
//! ## Streaming
//!
//! A document's length comes before its contents, so by default the generator keeps everything
//! in memory until the outermost document ends. With
//! [`GeneratorOptions::enable_streaming`] the length fields are left at zero and bytes are
//! flushed to the sink after every value. The result is not valid BSON for readers that rely
//! on the lengths.
//!
//! ## Serde
//!
//! With the default `serde` feature, any [`serde::Serialize`] value can be written with
//! [`Generator::serialize`] or [`ser::serialize_to_vec`].

mod bson;
mod buffer;
mod context;
mod datetime;
pub mod error;
pub mod escape;
mod generator;
mod nesting;
pub mod oid;
#[cfg(feature = "serde")]
pub mod ser;
pub mod spec;

pub use self::{
    bson::{Regex, RegexFlags, Timestamp},
    datetime::DateTime,
    generator::{Generator, GeneratorOptions, GeneratorOptionsBuilder, ScopeSerializer, ValueWriter},
    oid::ObjectId,
    spec::BinarySubtype,
};

pub use bigdecimal::BigDecimal;
pub use num_bigint::BigInt;
