//! ObjectId

use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicI32, Ordering},
        LazyLock,
    },
    time::SystemTime,
};

use crate::error::{Error, Result};

const TIME_OFFSET: usize = 0;
const MACHINE_OFFSET: usize = 4;
const INCREMENT_OFFSET: usize = 8;

static MACHINE: LazyLock<i32> = LazyLock::new(rand::random);
static INCREMENT: LazyLock<AtomicI32> = LazyLock::new(|| AtomicI32::new(rand::random()));

/// A 12-byte object identifier made of three words: the creation time in seconds, a machine
/// identifier and an increment.
///
/// Each word is stored big-endian, both in [`ObjectId::bytes`] and on the wire, even though every
/// other BSON integer is little-endian.
///
/// ```
/// use bson_generator::oid::ObjectId;
///
/// let oid = ObjectId::from_parts(0x5e4d_a0f1, 7, 42);
/// assert_eq!(oid.to_string(), "5e4da0f1000000070000002a");
/// assert_eq!(oid.increment(), 42);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    id: [u8; 12],
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectId {
    /// Generates a new [`ObjectId`] from the current time, a per-process random machine word and
    /// a process-wide counter.
    pub fn new() -> ObjectId {
        let time = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs() as i32)
            .unwrap_or(0);
        let increment = INCREMENT.fetch_add(1, Ordering::SeqCst);
        Self::from_parts(time, *MACHINE, increment)
    }

    pub const fn from_parts(time: i32, machine: i32, increment: i32) -> ObjectId {
        let t = time.to_be_bytes();
        let m = machine.to_be_bytes();
        let i = increment.to_be_bytes();
        ObjectId {
            id: [
                t[0], t[1], t[2], t[3], m[0], m[1], m[2], m[3], i[0], i[1], i[2], i[3],
            ],
        }
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> ObjectId {
        ObjectId { id: bytes }
    }

    /// Creates an [`ObjectId`] from a 24-character hexadecimal string.
    pub fn parse_str(s: impl AsRef<str>) -> Result<ObjectId> {
        let s = s.as_ref();
        let bytes: Vec<u8> = hex::decode(s.as_bytes()).map_err(|e| Error::from_hex_error(e, s.len()))?;
        let id: [u8; 12] = bytes
            .try_into()
            .map_err(|_| Error::from_hex_error(hex::FromHexError::InvalidStringLength, s.len()))?;
        Ok(Self::from_bytes(id))
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.id
    }

    /// Seconds since the Unix epoch at which this id was generated.
    pub fn time(&self) -> i32 {
        self.word(TIME_OFFSET)
    }

    pub fn machine(&self) -> i32 {
        self.word(MACHINE_OFFSET)
    }

    pub fn increment(&self) -> i32 {
        self.word(INCREMENT_OFFSET)
    }

    fn word(&self, offset: usize) -> i32 {
        let mut buf = [0; 4];
        buf.copy_from_slice(&self.id[offset..offset + 4]);
        i32::from_be_bytes(buf)
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.id)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}
