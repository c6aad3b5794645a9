//! Deterministic content hashing for table rows.
//!
//! A row's content hash covers every user-editable field and nothing else:
//! identity, computed status and validation-cache fields are excluded, so two
//! rows with equal editable values hash equally regardless of who they are.
//!
//! Each field is encoded canonically (type tag + little-endian bytes, strings
//! length-prefixed), digested with SHA-256 and truncated to 64 bits. Field
//! digests are folded into a running seed with a boost-style `hash_combine`,
//! which makes the result sensitive to field order. Nothing here depends on
//! per-process state, so hashes are stable across runs and can be persisted.

use crate::{Error, VersionToken};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const TAG_STR: u8 = 0x01;
const TAG_BOOL: u8 = 0x02;
const TAG_INT: u8 = 0x03;
const TAG_UINT: u8 = 0x04;
const TAG_FLOAT: u8 = 0x05;
const TAG_NONE: u8 = 0x06;
const TAG_SOME: u8 = 0x07;
const TAG_SEQ: u8 = 0x08;
const TAG_UUID: u8 = 0x09;

/// Golden-ratio constant used by the 64-bit `hash_combine`.
const COMBINE_MAGIC: u64 = 0x9e37_79b9_7f4a_7c15;

/// 64-bit content hash of a row's editable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentHash(u64);

impl ContentHash {
    /// Wraps a raw hash value.
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw hash value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Hashes a single value as if it were a one-field row.
    #[must_use]
    pub fn of<T: HashField + ?Sized>(value: &T) -> Self {
        ContentHasher::new().field(value).finish()
    }

    /// Folds `other` into this hash (order-sensitive).
    #[must_use]
    pub const fn combine(self, other: ContentHash) -> Self {
        Self(hash_combine(self.0, other.0))
    }

    /// Folds a rule-version token into this hash.
    ///
    /// Used by the validation cache: the cached result is only reusable while
    /// both the row content and the token are unchanged.
    #[must_use]
    pub fn combine_token(self, token: &VersionToken) -> Self {
        self.combine(ContentHash::of(token))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for ContentHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| Error::InvalidHash(format!("{s}: {e}")))
    }
}

// Serialized as a hex string so JSON consumers never lose precision.
impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Boost-style 64-bit `hash_combine`.
const fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(COMBINE_MAGIC)
        .wrapping_add(seed << 12)
        .wrapping_add(seed >> 4)
}

/// Digests one canonically encoded field down to 64 bits.
fn field_digest(encoded: &[u8]) -> u64 {
    let digest = Sha256::digest(encoded);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Builder that folds editable fields, in order, into a [`ContentHash`].
///
/// ```
/// use tablesync_types::ContentHasher;
///
/// let a = ContentHasher::new().field("Blacksmith").field(&3u32).field(&false).finish();
/// let b = ContentHasher::new().field("Blacksmith").field(&3u32).field(&false).finish();
/// let c = ContentHasher::new().field(&3u32).field("Blacksmith").field(&false).finish();
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    seed: u64,
    scratch: Vec<u8>,
}

impl ContentHasher {
    /// Creates an empty hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field and returns the hasher (builder style).
    #[must_use]
    pub fn field<T: HashField + ?Sized>(mut self, value: &T) -> Self {
        self.push(value);
        self
    }

    /// Adds a field in place.
    pub fn push<T: HashField + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.scratch.clear();
        value.encode(&mut self.scratch);
        self.seed = hash_combine(self.seed, field_digest(&self.scratch));
        self
    }

    /// Returns the hash of all fields added so far.
    #[must_use]
    pub fn finish(&self) -> ContentHash {
        ContentHash(self.seed)
    }
}

/// A value that can take part in a content hash.
///
/// Implementations must write a canonical, platform-independent encoding:
/// equal values produce equal bytes, and values of different types never
/// share an encoding.
pub trait HashField {
    /// Appends the canonical encoding of `self` to `out`.
    fn encode(&self, out: &mut Vec<u8>);
}

impl<T: HashField + ?Sized> HashField for &T {
    fn encode(&self, out: &mut Vec<u8>) {
        (**self).encode(out);
    }
}

impl HashField for str {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_STR);
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        out.extend_from_slice(self.as_bytes());
    }
}

impl HashField for String {
    fn encode(&self, out: &mut Vec<u8>) {
        self.as_str().encode(out);
    }
}

impl HashField for bool {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_BOOL);
        out.push(u8::from(*self));
    }
}

macro_rules! hash_signed {
    ($($t:ty),*) => {$(
        impl HashField for $t {
            fn encode(&self, out: &mut Vec<u8>) {
                out.push(TAG_INT);
                out.extend_from_slice(&i64::from(*self).to_le_bytes());
            }
        }
    )*};
}

macro_rules! hash_unsigned {
    ($($t:ty),*) => {$(
        impl HashField for $t {
            fn encode(&self, out: &mut Vec<u8>) {
                out.push(TAG_UINT);
                out.extend_from_slice(&u64::from(*self).to_le_bytes());
            }
        }
    )*};
}

hash_signed!(i8, i16, i32, i64);
hash_unsigned!(u8, u16, u32, u64);

impl HashField for f32 {
    fn encode(&self, out: &mut Vec<u8>) {
        f64::from(*self).encode(out);
    }
}

impl HashField for f64 {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_FLOAT);
        // -0.0 and 0.0 are the same authored value.
        let normalized = if *self == 0.0 { 0.0f64 } else { *self };
        out.extend_from_slice(&normalized.to_bits().to_le_bytes());
    }
}

impl HashField for Uuid {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_UUID);
        out.extend_from_slice(self.as_bytes());
    }
}

impl HashField for VersionToken {
    fn encode(&self, out: &mut Vec<u8>) {
        self.as_uuid().encode(out);
    }
}

impl<T: HashField> HashField for Option<T> {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            None => out.push(TAG_NONE),
            Some(value) => {
                out.push(TAG_SOME);
                value.encode(out);
            }
        }
    }
}

impl<T: HashField> HashField for [T] {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_SEQ);
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: HashField> HashField for Vec<T> {
    fn encode(&self, out: &mut Vec<u8>) {
        self.as_slice().encode(out);
    }
}
