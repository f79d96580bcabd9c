//! The incremental BSON generator.

mod options;
mod scope;
mod value_writer;

use std::{io::Write, sync::Arc};

pub use self::{
    options::{GeneratorOptions, GeneratorOptionsBuilder},
    scope::ScopeSerializer,
    value_writer::ValueWriter,
};

use crate::{
    bson::{Regex, Timestamp},
    buffer::OutputBuffer,
    context::{ContextStack, ValueKind, WriteContext},
    error::{Error, ErrorKind, Result},
    escape::{self, CharacterEscapes},
    nesting::DocumentStack,
    oid::ObjectId,
    spec::{BinarySubtype, ElementType, END_OF_DOCUMENT, END_OF_STRING},
    DateTime,
};

/// The buffer offset of a reserved element type byte, to be filled in by exactly one value write.
#[derive(Debug)]
pub(crate) struct TagSlot {
    offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Open,
    Failed,
    Closed,
}

/// Writes BSON to a sink, one structural call at a time.
///
/// The generator does not walk any data structure itself: callers issue `begin_document`,
/// `write_field_name`, value writes and `end_document` in depth-first order, and the generator
/// turns them into length-prefixed BSON. Each container's length is reserved when it begins and
/// backpatched when it ends, so output stays in memory until [`flush`](Generator::flush) or
/// [`close`](Generator::close), unless [`GeneratorOptions::enable_streaming`] is set.
///
/// Any error is fatal to the session: later calls fail with a protocol violation, and the sink
/// may hold a partially written document.
///
/// ```
/// use bson_generator::Generator;
///
/// let mut generator = Generator::new(Vec::new());
/// generator.begin_document()?;
/// generator.write_field_name("a")?;
/// generator.write_i32(1)?;
/// generator.end_document()?;
/// generator.close()?;
///
/// assert_eq!(
///     generator.into_inner(),
///     vec![0x0C, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0]
/// );
/// # Ok::<(), bson_generator::error::Error>(())
/// ```
pub struct Generator<W: Write> {
    sink: W,
    buffer: OutputBuffer,
    context: ContextStack,
    documents: DocumentStack,

    /// The type byte reserved by the last field name, waiting for its value.
    pending: Option<TagSlot>,

    escapes: Option<Arc<dyn CharacterEscapes>>,
    options: GeneratorOptions,
    state: SessionState,
}

impl<W: Write> Generator<W> {
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, GeneratorOptions::default())
    }

    pub fn with_options(sink: W, options: GeneratorOptions) -> Self {
        Self::with_storage(sink, options, Vec::new())
    }

    /// Create a generator whose buffer starts out with storage recycled from an earlier session,
    /// see [`Generator::into_parts`].
    pub fn with_storage(sink: W, options: GeneratorOptions, storage: Vec<u8>) -> Self {
        Self {
            sink,
            buffer: OutputBuffer::with_storage(storage, options.reuse_buffers()),
            context: ContextStack::default(),
            documents: DocumentStack::default(),
            pending: None,
            escapes: None,
            options,
            state: SessionState::Open,
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Install (or with `None`, remove) the escaping policy applied to field names and strings.
    pub fn set_character_escapes(&mut self, escapes: Option<Arc<dyn CharacterEscapes>>) {
        self.escapes = escapes;
    }

    pub fn character_escapes(&self) -> Option<&Arc<dyn CharacterEscapes>> {
        self.escapes.as_ref()
    }

    /// The number of documents and arrays currently open.
    pub fn depth(&self) -> usize {
        self.documents.depth()
    }

    /// Bytes written but not yet flushed to the sink.
    pub fn buffered(&self) -> &[u8] {
        self.buffer.pending()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Unwrap the sink. Bytes still buffered are discarded; call [`close`](Generator::close) or
    /// [`flush`](Generator::flush) first.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Unwrap the sink together with the buffer's storage, for reuse by the next session.
    pub fn into_parts(self) -> (W, Vec<u8>) {
        (self.sink, self.buffer.into_storage())
    }

    pub fn begin_document(&mut self) -> Result<()> {
        self.value_writer(ValueKind::Container, "start an object")?
            .begin_document()
    }

    pub fn end_document(&mut self) -> Result<()> {
        self.check_open()?;
        let result = self
            .context
            .pop_object()
            .and_then(|()| self.close_container());
        self.track(result)
    }

    pub fn begin_array(&mut self) -> Result<()> {
        self.value_writer(ValueKind::Container, "start an array")?
            .begin_array()
    }

    pub fn end_array(&mut self) -> Result<()> {
        self.check_open()?;
        let result = self
            .context
            .pop_array()
            .and_then(|()| self.close_container());
        self.track(result)
    }

    /// Write the name of the next field of the current document. Exactly one value write must
    /// follow.
    pub fn write_field_name(&mut self, name: &str) -> Result<()> {
        self.check_open()?;
        let result = self.field_name(name).map_err(|e| e.with_key(name));
        self.track(result)
    }

    fn field_name(&mut self, name: &str) -> Result<()> {
        self.context.write_field_name()?;
        let slot = self.write_key(name)?;
        self.pending = Some(slot);
        Ok(())
    }

    /// Write a field name and return the slot its value must be written through.
    ///
    /// ```
    /// use bson_generator::Generator;
    ///
    /// let mut generator = Generator::new(Vec::new());
    /// generator.begin_document()?;
    /// generator.field("n")?.write_i64(5)?;
    /// generator.field("tags")?.begin_array()?;
    /// generator.element()?.write_string("x")?;
    /// generator.end_array()?;
    /// generator.end_document()?;
    /// # Ok::<(), bson_generator::error::Error>(())
    /// ```
    pub fn field(&mut self, name: &str) -> Result<ValueWriter<'_, W>> {
        self.write_field_name(name)?;
        self.value_writer(ValueKind::Scalar, "write a value")
    }

    /// Return the slot for the next element of the current array.
    pub fn element(&mut self) -> Result<ValueWriter<'_, W>> {
        self.check_open()?;
        if self.context.current() != WriteContext::ArrayExpectValue {
            let e = Error::protocol_violation("cannot write an array element outside of an array");
            return Err(self.poison(e));
        }
        self.value_writer(ValueKind::Scalar, "write an array element")
    }

    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write string")?
            .write_string(s)
    }

    /// Write bytes that are already UTF-8 encoded as a string. No escaping is applied.
    pub fn write_utf8_string(&mut self, bytes: &[u8]) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write raw utf8 string")?
            .write_utf8_string(bytes)
    }

    /// Write `text` as generic binary data holding its UTF-16 code units.
    pub fn write_raw_text(&mut self, text: &str) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write raw string")?
            .write_raw_text(text)
    }

    pub fn write_binary(&mut self, subtype: BinarySubtype, bytes: &[u8]) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write binary")?
            .write_binary(subtype, bytes)
    }

    /// Write `len` bytes of `data` starting at `offset`, see [`ValueWriter::write_binary_range`].
    pub fn write_binary_range(
        &mut self,
        subtype: BinarySubtype,
        data: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write binary")?
            .write_binary_range(subtype, data, offset, len)
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write number")?
            .write_i32(v)
    }

    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write number")?
            .write_i64(v)
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write number")?
            .write_f32(v)
    }

    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write number")?
            .write_f64(v)
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write boolean")?
            .write_bool(v)
    }

    pub fn write_null(&mut self) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write null")?
            .write_null()
    }

    pub fn write_big_integer(&mut self, v: &num_bigint::BigInt) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write number")?
            .write_big_integer(v)
    }

    pub fn write_big_decimal(&mut self, v: &bigdecimal::BigDecimal) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write number")?
            .write_big_decimal(v)
    }

    pub fn write_number_str(&mut self, encoded: &str) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write number")?
            .write_number_str(encoded)
    }

    pub fn write_datetime(&mut self, v: DateTime) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write datetime")?
            .write_datetime(v)
    }

    pub fn write_object_id(&mut self, v: ObjectId) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write object id")?
            .write_object_id(v)
    }

    pub fn write_regex(&mut self, v: &Regex) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write regex")?
            .write_regex(v)
    }

    pub fn write_timestamp(&mut self, v: Timestamp) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write timestamp")?
            .write_timestamp(v)
    }

    pub fn write_symbol(&mut self, v: &str) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write symbol")?
            .write_symbol(v)
    }

    pub fn write_code(&mut self, code: &str) -> Result<()> {
        self.value_writer(ValueKind::Scalar, "write javascript")?
            .write_code(code)
    }

    /// Write JavaScript code together with a scope document produced by `serializer`.
    pub fn write_code_with_scope<T, S>(&mut self, code: &str, scope: &T, serializer: &S) -> Result<()>
    where
        T: ?Sized,
        S: ScopeSerializer<T, W> + ?Sized,
    {
        self.value_writer(ValueKind::Scalar, "write javascript")?
            .write_code_with_scope(code, scope, serializer)
    }

    /// Write every buffered byte to the sink and flush it.
    ///
    /// With streaming disabled, flushing while a container is open makes its length impossible
    /// to backpatch: ending it then fails with
    /// [`ErrorKind::FlushedRegion`](crate::error::ErrorKind::FlushedRegion).
    pub fn flush(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(Error::protocol_violation("generator is closed"));
        }
        let result = self.flush_sink();
        self.track(result)
    }

    fn flush_sink(&mut self) -> Result<()> {
        self.buffer.flush_to(&mut self.sink)?;
        self.sink.flush()?;
        Ok(())
    }

    /// Finish the session: end any open containers (if
    /// [`GeneratorOptions::auto_close_content`] is set) and flush everything to the sink.
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            SessionState::Closed => return Ok(()),
            SessionState::Failed => {
                self.state = SessionState::Closed;
                self.buffer.clear();
                return Ok(());
            }
            SessionState::Open => {}
        }

        if self.options.auto_close_content {
            while let Some(top) = self.documents.top() {
                if top.is_array() {
                    self.end_array()?;
                } else {
                    self.end_document()?;
                }
            }
        }

        let result = self.flush_sink();
        self.track(result)?;
        self.state = SessionState::Closed;
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Failed => Err(Error::protocol_violation(
                "generator cannot be used after an earlier error",
            )),
            SessionState::Closed => Err(Error::protocol_violation("generator is closed")),
        }
    }

    fn poison(&mut self, e: Error) -> Error {
        if self.state == SessionState::Open {
            self.state = SessionState::Failed;
        }
        e
    }

    pub(crate) fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        result.map_err(|e| self.poison(e))
    }

    fn value_writer(&mut self, kind: ValueKind, what: &str) -> Result<ValueWriter<'_, W>> {
        match self.start_value(kind, what) {
            Ok(slot) => Ok(ValueWriter::new(self, slot)),
            Err(e) => Err(self.poison(e)),
        }
    }

    /// Validate a value write and return the type slot it fills: the synthesized array key's,
    /// the pending field name's, or none for a top-level document.
    fn start_value(&mut self, kind: ValueKind, what: &str) -> Result<Option<TagSlot>> {
        self.check_open()?;
        self.context.write_value(kind, what)?;
        if let Some(index) = self.documents.next_array_key() {
            return self.write_key(&index.to_string()).map(Some);
        }
        Ok(self.pending.take())
    }

    /// Reserve a type byte and write `name` as an element key.
    fn write_key(&mut self, name: &str) -> Result<TagSlot> {
        let offset = self.buffer.size();
        self.buffer.append_byte(0);
        self.write_cstring(name)?;
        Ok(TagSlot { offset })
    }

    fn fill_tag(&mut self, slot: Option<TagSlot>, element_type: ElementType) -> Result<()> {
        match slot {
            Some(slot) => self.buffer.patch_byte(slot.offset, element_type as u8),
            None => Ok(()),
        }
    }

    /// Reserve a length field and push a new container.
    fn open_container(&mut self, is_array: bool) {
        let header_offset = self.buffer.size();
        self.buffer.append_i32(0);
        self.documents.open(header_offset, is_array);
        if is_array {
            self.context.push_array();
        } else {
            self.context.push_object();
        }
    }

    /// Open the scope document of a code-with-scope value. The value's own type byte has already
    /// been written, so no key or type is emitted.
    fn begin_embedded_document(&mut self) {
        self.open_container(false);
    }

    fn close_container(&mut self) -> Result<()> {
        let Some(container) = self.documents.close() else {
            return Err(Error::protocol_violation(
                "cannot end a container that was never started",
            ));
        };
        self.buffer.append_byte(END_OF_DOCUMENT);
        if !self.options.enable_streaming {
            let length = container.length(self.buffer.size());
            self.patch_length(container.header_offset, length)?;
        }
        self.flush_if_streaming()
    }

    /// Overwrite the length field at `offset` with the number of bytes from it to the cursor.
    fn backpatch_length(&mut self, offset: usize) -> Result<()> {
        self.patch_length(offset, self.buffer.size() - offset)
    }

    fn patch_length(&mut self, offset: usize, length: usize) -> Result<()> {
        let value = i32::try_from(length).map_err(|_| Error::length_overflow(length))?;
        self.buffer.patch_i32(offset, value)
    }

    fn flush_if_streaming(&mut self) -> Result<()> {
        if self.options.enable_streaming {
            self.buffer.flush_to(&mut self.sink)?;
        }
        Ok(())
    }

    /// Escape `s` and write it as a null-terminated cstring.
    fn write_cstring(&mut self, s: &str) -> Result<usize> {
        let escaped = escape::escape(self.escapes.as_deref(), s)?;
        if escaped.contains('\0') {
            return Err(ErrorKind::InvalidCString(escaped.into_owned()).into());
        }
        let written = self.buffer.append_utf8(&escaped);
        self.buffer.append_byte(END_OF_STRING);
        Ok(written + 1)
    }

    /// Escape `s` and write it as a length-prefixed string.
    fn write_string_payload(&mut self, s: &str) -> Result<usize> {
        let escaped = escape::escape(self.escapes.as_deref(), s)?;
        self.append_string(&escaped)
    }

    fn append_string(&mut self, s: &str) -> Result<usize> {
        let length = s.len() + 1;
        let prefix = i32::try_from(length).map_err(|_| Error::length_overflow(length))?;
        self.buffer.append_i32(prefix);
        self.buffer.append_utf8(s);
        self.buffer.append_byte(END_OF_STRING);
        Ok(length + 4)
    }
}

impl<W: Write> std::fmt::Debug for Generator<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("options", &self.options)
            .field("depth", &self.documents.depth())
            .field("offset", &self.buffer.size())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
