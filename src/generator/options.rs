/// Options used to configure a [`Generator`](crate::Generator).
///
/// ```
/// use bson_generator::GeneratorOptions;
///
/// let options = GeneratorOptions::builder()
///     .enable_streaming(true)
///     .force_decimals_as_strings(true)
///     .build();
/// assert!(options.reuse_buffers());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct GeneratorOptions {
    /// Leave every document's length field at zero so that the buffer can be flushed after each
    /// value instead of being held until the whole document is complete.
    ///
    /// Documents produced this way do not comply with the BSON specification. Only enable this
    /// if the reader ignores the length fields, or has agreed to out-of-band.
    pub enable_streaming: bool,

    /// Write arbitrary-precision decimals as strings instead of trying `f32` and `f64` first.
    pub force_decimals_as_strings: bool,

    /// End every container that is still open when [`Generator::close`](crate::Generator::close)
    /// is called.
    pub auto_close_content: bool,

    /// Keep the buffer's allocation between flushes. Follows `enable_streaming` when unset.
    pub reuse_buffers: Option<bool>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            enable_streaming: false,
            force_decimals_as_strings: false,
            auto_close_content: true,
            reuse_buffers: None,
        }
    }
}

impl GeneratorOptions {
    /// Create a builder used to construct a new [`GeneratorOptions`].
    pub fn builder() -> GeneratorOptionsBuilder {
        GeneratorOptionsBuilder {
            options: Default::default(),
        }
    }

    pub fn reuse_buffers(&self) -> bool {
        self.reuse_buffers.unwrap_or(self.enable_streaming)
    }
}

/// A builder used to construct new [`GeneratorOptions`] structs.
#[derive(Debug, Clone)]
pub struct GeneratorOptionsBuilder {
    options: GeneratorOptions,
}

impl GeneratorOptionsBuilder {
    /// Set the value for [`GeneratorOptions::enable_streaming`].
    pub fn enable_streaming(mut self, value: bool) -> Self {
        self.options.enable_streaming = value;
        self
    }

    /// Set the value for [`GeneratorOptions::force_decimals_as_strings`].
    pub fn force_decimals_as_strings(mut self, value: bool) -> Self {
        self.options.force_decimals_as_strings = value;
        self
    }

    /// Set the value for [`GeneratorOptions::auto_close_content`].
    pub fn auto_close_content(mut self, value: bool) -> Self {
        self.options.auto_close_content = value;
        self
    }

    /// Set the value for [`GeneratorOptions::reuse_buffers`].
    pub fn reuse_buffers(mut self, value: bool) -> Self {
        self.options.reuse_buffers = Some(value);
        self
    }

    /// Consume this builder and produce a [`GeneratorOptions`].
    pub fn build(self) -> GeneratorOptions {
        self.options
    }
}
