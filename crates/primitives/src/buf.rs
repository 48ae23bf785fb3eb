use std::{fmt, str, str::FromStr};

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length in bytes of a [`Buf32`].
pub const BUF32_LEN: usize = 32;

type RawBuf32 = [u8; BUF32_LEN];

/// A fixed 32-byte buffer, the raw material of the workspace's identifier
/// types.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct Buf32(#[serde(with = "hex::serde")] RawBuf32);

impl Buf32 {
    /// The all-zeroes buffer.
    pub const fn zero() -> Self {
        Self([0; BUF32_LEN])
    }

    /// A buffer with every byte set to `b`.  Handy for tests and sentinel
    /// values.
    pub const fn fill(b: u8) -> Self {
        Self([b; BUF32_LEN])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub const fn as_bytes(&self) -> &RawBuf32 {
        &self.0
    }
}

impl_opaque_thin_wrapper!(Buf32 => RawBuf32);

impl AsRef<[u8; BUF32_LEN]> for Buf32 {
    fn as_ref(&self) -> &[u8; BUF32_LEN] {
        &self.0
    }
}

impl fmt::Display for Buf32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0; BUF32_LEN * 2];
        hex::encode_to_slice(self.0, &mut buf).expect("buf: encode hex");
        f.write_str(str::from_utf8(&buf).expect("buf: hex is ascii"))
    }
}

impl fmt::Debug for Buf32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Error decoding a [`Buf32`] from its hex form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Buf32DecodeError {
    /// The input was not the expected length.
    #[error("expected {expected} hex chars, got {got}")]
    BadLength { expected: usize, got: usize },

    /// The input contained a non-hex character.
    #[error("invalid hex input")]
    InvalidHex,
}

impl FromStr for Buf32 {
    type Err = Buf32DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != BUF32_LEN * 2 {
            return Err(Buf32DecodeError::BadLength {
                expected: BUF32_LEN * 2,
                got: s.len(),
            });
        }
        let mut out = [0; BUF32_LEN];
        hex::decode_to_slice(s, &mut out).map_err(|_| Buf32DecodeError::InvalidHex)?;
        Ok(Self(out))
    }
}
