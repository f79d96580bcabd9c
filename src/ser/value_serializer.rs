use std::io::Write;

use num_bigint::BigInt;
use serde::Serialize;

use super::{document_serializer::DocumentSerializer, DATETIME_NEWTYPE_NAME, OBJECT_ID_NEWTYPE_NAME};
use crate::{
    error::{Error, Result},
    oid::ObjectId,
    spec::BinarySubtype,
    DateTime,
    Generator,
};

/// Tells a [`ValueSerializer`] how to treat the next value it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SerializerHint {
    None,

    /// The next string is the hex form of an [`ObjectId`].
    ObjectId,

    /// The next `i64` is a [`DateTime`] in milliseconds.
    DateTime,

    /// A document is already open; a struct or map writes its entries into it and leaves it
    /// open.
    ScopeEntries,
}

/// A [`serde::Serializer`] that writes one value through a [`Generator`].
pub struct ValueSerializer<'a, W: Write> {
    generator: &'a mut Generator<W>,
    hint: SerializerHint,
}

impl<'a, W: Write> ValueSerializer<'a, W> {
    pub fn new(generator: &'a mut Generator<W>) -> Self {
        Self::with_hint(generator, SerializerHint::None)
    }

    pub(crate) fn with_hint(generator: &'a mut Generator<W>, hint: SerializerHint) -> Self {
        Self { generator, hint }
    }
}

impl<'a, W: Write> serde::Serializer for ValueSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = DocumentSerializer<'a, W>;
    type SerializeTuple = DocumentSerializer<'a, W>;
    type SerializeTupleStruct = DocumentSerializer<'a, W>;
    type SerializeTupleVariant = DocumentSerializer<'a, W>;
    type SerializeMap = DocumentSerializer<'a, W>;
    type SerializeStruct = DocumentSerializer<'a, W>;
    type SerializeStructVariant = DocumentSerializer<'a, W>;

    fn is_human_readable(&self) -> bool {
        false
    }

    #[inline]
    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        self.generator.write_bool(v)
    }

    #[inline]
    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        self.serialize_i32(v.into())
    }

    #[inline]
    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        self.serialize_i32(v.into())
    }

    #[inline]
    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        self.generator.write_i32(v)
    }

    #[inline]
    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        match self.hint {
            SerializerHint::DateTime => self.generator.write_datetime(DateTime::from_millis(v)),
            _ => self.generator.write_i64(v),
        }
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok> {
        self.generator.write_big_integer(&BigInt::from(v))
    }

    #[inline]
    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        self.serialize_i32(v.into())
    }

    #[inline]
    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        self.serialize_i32(v.into())
    }

    #[inline]
    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        self.generator.write_i64(v.into())
    }

    #[inline]
    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        match i64::try_from(v) {
            Ok(n) => self.generator.write_i64(n),
            Err(_) => self.generator.write_big_integer(&BigInt::from(v)),
        }
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok> {
        self.generator.write_big_integer(&BigInt::from(v))
    }

    #[inline]
    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        self.generator.write_f32(v)
    }

    #[inline]
    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        self.generator.write_f64(v)
    }

    #[inline]
    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut s = [0; 4];
        self.serialize_str(v.encode_utf8(&mut s))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        match self.hint {
            SerializerHint::ObjectId => {
                let oid = ObjectId::parse_str(v)?;
                self.generator.write_object_id(oid)
            }
            _ => self.generator.write_string(v),
        }
    }

    #[inline]
    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        self.generator.write_binary(BinarySubtype::Generic, v)
    }

    #[inline]
    fn serialize_none(self) -> Result<Self::Ok> {
        self.generator.write_null()
    }

    #[inline]
    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_unit(self) -> Result<Self::Ok> {
        self.serialize_none()
    }

    #[inline]
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        self.serialize_unit()
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(mut self, name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: Serialize + ?Sized,
    {
        match name {
            OBJECT_ID_NEWTYPE_NAME => self.hint = SerializerHint::ObjectId,
            DATETIME_NEWTYPE_NAME => self.hint = SerializerHint::DateTime,
            _ => {}
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok>
    where
        T: Serialize + ?Sized,
    {
        self.generator.begin_document()?;
        self.generator.write_field_name(variant)?;
        value.serialize(ValueSerializer::new(&mut *self.generator))?;
        self.generator.end_document()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        DocumentSerializer::array(self.generator)
    }

    #[inline]
    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    #[inline]
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        DocumentSerializer::variant(self.generator, variant, true)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        match self.hint {
            SerializerHint::ScopeEntries => Ok(DocumentSerializer::entries(self.generator)),
            _ => DocumentSerializer::document(self.generator),
        }
    }

    #[inline]
    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        DocumentSerializer::variant(self.generator, variant, false)
    }
}
