//! Character substitution applied to field names and string values before they are written.

use std::{borrow::Cow, fmt};

use crate::error::{Error, Result};

/// How a character is treated when strings are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeCode {
    /// The character is written as is.
    #[default]
    None,

    /// The character is replaced by [`CharacterEscapes::escape_sequence`].
    Custom,
}

/// A character escaping policy.
///
/// [`escape_codes`](CharacterEscapes::escape_codes) is indexed by character code; characters
/// beyond its end are never escaped. Every character whose code is [`EscapeCode::Custom`] must
/// have an [`escape_sequence`](CharacterEscapes::escape_sequence), otherwise writing it fails with
/// [`ErrorKind::EscapeConfiguration`](crate::error::ErrorKind::EscapeConfiguration).
pub trait CharacterEscapes: fmt::Debug + Send + Sync {
    fn escape_codes(&self) -> &[EscapeCode];

    fn escape_sequence(&self, c: char) -> Option<Cow<'_, str>>;
}

/// A [`CharacterEscapes`] table covering the ASCII range.
///
/// ```
/// use bson_generator::escape::{AsciiEscapes, CharacterEscapes};
///
/// let escapes = AsciiEscapes::new().with_escape('.', "\\u002e");
/// assert_eq!(escapes.escape_sequence('.').as_deref(), Some("\\u002e"));
/// ```
#[derive(Debug, Clone)]
pub struct AsciiEscapes {
    codes: [EscapeCode; 128],
    sequences: Vec<Option<String>>,
}

impl Default for AsciiEscapes {
    fn default() -> Self {
        Self {
            codes: [EscapeCode::None; 128],
            sequences: vec![None; 128],
        }
    }
}

impl AsciiEscapes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `c` with `sequence` whenever it is written. Non-ASCII characters are ignored.
    pub fn with_escape(mut self, c: char, sequence: impl Into<String>) -> Self {
        if c.is_ascii() {
            self.codes[c as usize] = EscapeCode::Custom;
            self.sequences[c as usize] = Some(sequence.into());
        }
        self
    }

    /// Set only the escape code of `c`, leaving its sequence as it is.
    pub fn with_code(mut self, c: char, code: EscapeCode) -> Self {
        if c.is_ascii() {
            self.codes[c as usize] = code;
        }
        self
    }
}

impl CharacterEscapes for AsciiEscapes {
    fn escape_codes(&self) -> &[EscapeCode] {
        &self.codes
    }

    fn escape_sequence(&self, c: char) -> Option<Cow<'_, str>> {
        self.sequences
            .get(c as usize)?
            .as_deref()
            .map(Cow::Borrowed)
    }
}

/// Apply `escapes` to `s`. Borrows `s` unchanged when there is nothing to substitute.
pub(crate) fn escape<'a>(escapes: Option<&dyn CharacterEscapes>, s: &'a str) -> Result<Cow<'a, str>> {
    let Some(escapes) = escapes else {
        return Ok(Cow::Borrowed(s));
    };
    let codes = escapes.escape_codes();

    let mut out: Option<String> = None;
    let mut last = 0;
    for (i, c) in s.char_indices() {
        if codes.get(c as usize) != Some(&EscapeCode::Custom) {
            continue;
        }
        let sequence = escapes
            .escape_sequence(c)
            .ok_or_else(|| Error::escape_configuration(c))?;
        let buf = out.get_or_insert_with(|| String::with_capacity(s.len() + sequence.len()));
        buf.push_str(&s[last..i]);
        buf.push_str(&sequence);
        last = i + c.len_utf8();
    }

    Ok(match out {
        Some(mut buf) => {
            buf.push_str(&s[last..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(s),
    })
}
