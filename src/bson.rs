//! Extended BSON values that have no native Rust counterpart.

use std::{
    fmt::{self, Display},
    ops::{BitOr, BitOrAssign},
};

/// Matching flags of a [`Regex`].
///
/// On the wire they become an option string whose letters are always ordered `i`, `m`, `s`, `u`,
/// no matter in which order the flags were combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegexFlags(u8);

impl RegexFlags {
    pub const NONE: Self = Self(0);
    /// `i`
    pub const CASE_INSENSITIVE: Self = Self(1);
    /// `m`
    pub const MULTILINE: Self = Self(1 << 1);
    /// `s`: `.` also matches line terminators.
    pub const DOT_ALL: Self = Self(1 << 2);
    /// `u`: case-insensitive matching follows Unicode rather than ASCII rules.
    pub const UNICODE_CASE: Self = Self(1 << 3);

    const LETTERS: [(RegexFlags, char); 4] = [
        (Self::CASE_INSENSITIVE, 'i'),
        (Self::MULTILINE, 'm'),
        (Self::DOT_ALL, 's'),
        (Self::UNICODE_CASE, 'u'),
    ];

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The BSON option string for these flags.
    pub fn options(self) -> String {
        Self::LETTERS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, letter)| *letter)
            .collect()
    }
}

impl BitOr for RegexFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RegexFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A BSON regular expression: a pattern plus its [`RegexFlags`].
///
/// ```
/// use bson_generator::{Regex, RegexFlags};
///
/// let re = Regex::new("^a.c$", RegexFlags::UNICODE_CASE | RegexFlags::CASE_INSENSITIVE);
/// assert_eq!(re.flags.options(), "iu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regex {
    pub pattern: String,
    pub flags: RegexFlags,
}

impl Regex {
    pub fn new(pattern: impl Into<String>, flags: RegexFlags) -> Self {
        Self {
            pattern: pattern.into(),
            flags,
        }
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags.options())
    }
}

/// A BSON timestamp, as used by MongoDB replication.
///
/// Written as the increment followed by the seconds, each as a little-endian `i32`.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct Timestamp {
    /// The number of seconds since the Unix epoch.
    pub time: i32,

    /// An incrementing value to order timestamps with the same number of seconds in the `time`
    /// field.
    pub increment: i32,
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}, {})", self.time, self.increment)
    }
}
