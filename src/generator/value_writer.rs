use std::io::Write;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

use super::{Generator, ScopeSerializer, TagSlot};
use crate::{
    bson::{Regex, Timestamp},
    error::{Error, ErrorKind, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    DateTime,
};

/// The slot for exactly one value: the value of a field name, the next element of an array, or
/// a top-level document.
///
/// Every write method consumes the slot, so a second value for the same field name cannot be
/// written through it. Dropping the slot without writing a value leaves a type byte that was
/// never filled in, so it fails the session with a protocol violation.
#[must_use = "a field name must be followed by exactly one value"]
pub struct ValueWriter<'a, W: Write> {
    generator: &'a mut Generator<W>,
    slot: Option<TagSlot>,
    filled: bool,
}

impl<'a, W: Write> ValueWriter<'a, W> {
    pub(super) fn new(generator: &'a mut Generator<W>, slot: Option<TagSlot>) -> Self {
        Self {
            generator,
            slot,
            filled: false,
        }
    }

    pub fn begin_document(self) -> Result<()> {
        self.begin_container(false)
    }

    pub fn begin_array(self) -> Result<()> {
        self.begin_container(true)
    }

    fn begin_container(mut self, is_array: bool) -> Result<()> {
        self.filled = true;
        let slot = self.slot.take();
        let generator = &mut *self.generator;
        let element_type = if is_array {
            ElementType::Array
        } else {
            ElementType::EmbeddedDocument
        };
        let result = generator.fill_tag(slot, element_type).map(|()| {
            generator.open_container(is_array);
        });
        generator.track(result)
    }

    /// Fill the type byte, write the payload, then give streaming a chance to flush.
    fn encode<F>(mut self, element_type: ElementType, payload: F) -> Result<()>
    where
        F: FnOnce(&mut Generator<W>) -> Result<()>,
    {
        self.filled = true;
        let slot = self.slot.take();
        let generator = &mut *self.generator;
        if slot.is_none() {
            let e = Error::protocol_violation(format!(
                "cannot write {element_type:?} at the top level, expecting a document"
            ));
            return Err(generator.poison(e));
        }
        let result = generator
            .fill_tag(slot, element_type)
            .and_then(|()| payload(generator))
            .and_then(|()| generator.flush_if_streaming());
        generator.track(result)
    }

    pub fn write_string(self, s: &str) -> Result<()> {
        self.encode(ElementType::String, |g| g.write_string_payload(s).map(drop))
    }

    /// Write bytes that are already UTF-8 encoded as a string. No escaping is applied.
    pub fn write_utf8_string(self, bytes: &[u8]) -> Result<()> {
        self.encode(ElementType::String, |g| {
            let s = simdutf8::basic::from_utf8(bytes).map_err(|_| Error::from(ErrorKind::InvalidUtf8))?;
            g.append_string(s).map(drop)
        })
    }

    /// Write `text` as generic binary data holding its UTF-16 code units, little-endian.
    pub fn write_raw_text(self, text: &str) -> Result<()> {
        self.encode(ElementType::Binary, |g| {
            let length = text.encode_utf16().count() * 2;
            g.buffer.append_i32(wire_length(length)?);
            g.buffer.append_byte(BinarySubtype::Generic.into());
            g.buffer.append_utf16(text);
            Ok(())
        })
    }

    pub fn write_binary(self, subtype: BinarySubtype, bytes: &[u8]) -> Result<()> {
        self.write_binary_range(subtype, bytes, 0, bytes.len())
    }

    /// Write `len` bytes of `data` starting at `offset`.
    ///
    /// The length field always holds `len`. If `data` ends before `offset + len`, only the bytes
    /// that exist are written, which leaves the length field larger than the payload.
    pub fn write_binary_range(
        self,
        subtype: BinarySubtype,
        data: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<()> {
        self.encode(ElementType::Binary, |g| {
            g.buffer.append_i32(wire_length(len)?);
            g.buffer.append_byte(subtype.into());
            let start = offset.min(data.len());
            let end = offset.saturating_add(len).min(data.len());
            g.buffer.append_bytes(&data[start..end]);
            Ok(())
        })
    }

    pub fn write_i32(self, v: i32) -> Result<()> {
        self.encode(ElementType::Int32, |g| {
            g.buffer.append_i32(v);
            Ok(())
        })
    }

    pub fn write_i64(self, v: i64) -> Result<()> {
        self.encode(ElementType::Int64, |g| {
            g.buffer.append_i64(v);
            Ok(())
        })
    }

    /// BSON has no single-precision type; `v` is widened to a double.
    pub fn write_f32(self, v: f32) -> Result<()> {
        self.write_f64(v.into())
    }

    pub fn write_f64(self, v: f64) -> Result<()> {
        self.encode(ElementType::Double, |g| {
            g.buffer.append_f64(v);
            Ok(())
        })
    }

    pub fn write_bool(self, v: bool) -> Result<()> {
        self.encode(ElementType::Boolean, |g| {
            g.buffer.append_byte(v as u8);
            Ok(())
        })
    }

    pub fn write_null(self) -> Result<()> {
        self.encode(ElementType::Null, |_| Ok(()))
    }

    /// Write `v` as an `Int32` if it needs fewer than 32 bits, as an `Int64` if it needs fewer
    /// than 64, and otherwise as its decimal string.
    pub fn write_big_integer(self, v: &BigInt) -> Result<()> {
        let bits = bit_length(v);
        if bits < 32 {
            if let Some(n) = v.to_i32() {
                return self.write_i32(n);
            }
        } else if bits < 64 {
            if let Some(n) = v.to_i64() {
                return self.write_i64(n);
            }
        }
        self.write_string(&v.to_string())
    }

    /// Write `v` as a double holding its nearest `f32` if that is finite, else its nearest `f64`
    /// if that is finite, else as its decimal string. With
    /// [`force_decimals_as_strings`](crate::GeneratorOptions::force_decimals_as_strings) set it is
    /// always a string.
    pub fn write_big_decimal(self, v: &BigDecimal) -> Result<()> {
        if self.generator.options.force_decimals_as_strings {
            return self.write_string(&v.to_string());
        }
        if let Some(f) = v.to_f32().filter(|f| f.is_finite()) {
            return self.write_f32(f);
        }
        if let Some(d) = v.to_f64().filter(|d| d.is_finite()) {
            return self.write_f64(d);
        }
        self.write_string(&v.to_string())
    }

    /// Write a number that is already encoded as text. BSON has no textual number type, so it is
    /// written as a string.
    pub fn write_number_str(self, encoded: &str) -> Result<()> {
        self.write_string(encoded)
    }

    pub fn write_datetime(self, v: DateTime) -> Result<()> {
        self.encode(ElementType::DateTime, |g| {
            g.buffer.append_i64(v.timestamp_millis());
            Ok(())
        })
    }

    pub fn write_object_id(self, v: ObjectId) -> Result<()> {
        self.encode(ElementType::ObjectId, |g| {
            // each word is big-endian inside the otherwise little-endian document
            for word in [v.time(), v.machine(), v.increment()] {
                g.buffer.append_i32(word.swap_bytes());
            }
            Ok(())
        })
    }

    pub fn write_regex(self, v: &Regex) -> Result<()> {
        self.encode(ElementType::RegularExpression, |g| {
            g.write_cstring(&v.pattern)?;
            g.write_cstring(&v.flags.options())?;
            Ok(())
        })
    }

    pub fn write_timestamp(self, v: Timestamp) -> Result<()> {
        self.encode(ElementType::Timestamp, |g| {
            g.buffer.append_i32(v.increment);
            g.buffer.append_i32(v.time);
            Ok(())
        })
    }

    pub fn write_symbol(self, v: &str) -> Result<()> {
        self.encode(ElementType::Symbol, |g| g.write_string_payload(v).map(drop))
    }

    pub fn write_code(self, code: &str) -> Result<()> {
        self.encode(ElementType::JavaScriptCode, |g| {
            g.write_string_payload(code).map(drop)
        })
    }

    /// Write `code` followed by a scope document whose entries `serializer` writes.
    ///
    /// The generator opens and ends the scope document itself; `serializer` only writes field
    /// names and values into it.
    pub fn write_code_with_scope<T, S>(self, code: &str, scope: &T, serializer: &S) -> Result<()>
    where
        T: ?Sized,
        S: ScopeSerializer<T, W> + ?Sized,
    {
        self.encode(ElementType::JavaScriptCodeWithScope, |g| {
            let start = g.buffer.size();
            g.buffer.append_i32(0);
            g.write_string_payload(code)?;

            g.begin_embedded_document();
            let depth = g.context.depth();
            serializer.serialize_scope(scope, g)?;
            if g.context.depth() != depth {
                return Err(Error::protocol_violation(
                    "scope serializer left the scope document unbalanced",
                ));
            }
            g.end_document()?;

            if !g.options.enable_streaming {
                g.backpatch_length(start)?;
            }
            Ok(())
        })
    }
}

impl<W: Write> Drop for ValueWriter<'_, W> {
    fn drop(&mut self) {
        if !self.filled {
            self.generator.poison(Error::protocol_violation(
                "a field name or array slot was dropped without a value",
            ));
        }
    }
}

fn wire_length(length: usize) -> Result<i32> {
    i32::try_from(length).map_err(|_| Error::length_overflow(length))
}

/// The number of bits needed to represent `v` in two's complement, excluding the sign bit.
fn bit_length(v: &BigInt) -> u64 {
    match v.sign() {
        Sign::Minus => (-v - 1u32).bits(),
        _ => v.bits(),
    }
}
