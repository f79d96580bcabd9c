use std::io::Write;

use serde::{
    ser::{
        SerializeMap,
        SerializeSeq,
        SerializeStruct,
        SerializeStructVariant,
        SerializeTuple,
        SerializeTupleStruct,
        SerializeTupleVariant,
    },
    Serialize,
};

use super::{key_serializer::KeySerializer, ValueSerializer};
use crate::{error::Result, Generator};

/// What has to be ended once the last entry is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Document,
    Array,

    /// Entries of a document the caller opened and will end.
    Entries,

    /// `{ <variant>: [...] }` or `{ <variant>: {...} }`
    Variant { is_array: bool },
}

/// Writes the entries of a document or the elements of an array.
pub struct DocumentSerializer<'a, W: Write> {
    generator: &'a mut Generator<W>,
    frame: Frame,
}

impl<'a, W: Write> DocumentSerializer<'a, W> {
    pub(super) fn document(generator: &'a mut Generator<W>) -> Result<Self> {
        generator.begin_document()?;
        Ok(Self {
            generator,
            frame: Frame::Document,
        })
    }

    pub(super) fn array(generator: &'a mut Generator<W>) -> Result<Self> {
        generator.begin_array()?;
        Ok(Self {
            generator,
            frame: Frame::Array,
        })
    }

    pub(super) fn entries(generator: &'a mut Generator<W>) -> Self {
        Self {
            generator,
            frame: Frame::Entries,
        }
    }

    pub(super) fn variant(
        generator: &'a mut Generator<W>,
        variant: &'static str,
        is_array: bool,
    ) -> Result<Self> {
        generator.begin_document()?;
        generator.write_field_name(variant)?;
        if is_array {
            generator.begin_array()?;
        } else {
            generator.begin_document()?;
        }
        Ok(Self {
            generator,
            frame: Frame::Variant { is_array },
        })
    }

    fn write_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(ValueSerializer::new(&mut *self.generator))
    }

    fn write_entry<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.generator.write_field_name(key)?;
        self.write_value(value)
    }

    fn finish(self) -> Result<()> {
        match self.frame {
            Frame::Document => self.generator.end_document(),
            Frame::Array => self.generator.end_array(),
            Frame::Entries => Ok(()),
            Frame::Variant { is_array } => {
                if is_array {
                    self.generator.end_array()?;
                } else {
                    self.generator.end_document()?;
                }
                self.generator.end_document()
            }
        }
    }
}

impl<W: Write> SerializeSeq for DocumentSerializer<'_, W> {
    type Ok = ();
    type Error = crate::error::Error;

    #[inline]
    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_value(value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<W: Write> SerializeTuple for DocumentSerializer<'_, W> {
    type Ok = ();
    type Error = crate::error::Error;

    #[inline]
    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_value(value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<W: Write> SerializeTupleStruct for DocumentSerializer<'_, W> {
    type Ok = ();
    type Error = crate::error::Error;

    #[inline]
    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_value(value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<W: Write> SerializeTupleVariant for DocumentSerializer<'_, W> {
    type Ok = ();
    type Error = crate::error::Error;

    #[inline]
    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_value(value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<W: Write> SerializeMap for DocumentSerializer<'_, W> {
    type Ok = ();
    type Error = crate::error::Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let key = key.serialize(KeySerializer)?;
        self.generator.write_field_name(&key)
    }

    #[inline]
    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_value(value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<W: Write> SerializeStruct for DocumentSerializer<'_, W> {
    type Ok = ();
    type Error = crate::error::Error;

    #[inline]
    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_entry(key, value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<W: Write> SerializeStructVariant for DocumentSerializer<'_, W> {
    type Ok = ();
    type Error = crate::error::Error;

    #[inline]
    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_entry(key, value)
    }

    #[inline]
    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}
