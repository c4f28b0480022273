//! # Wire Envelope
//!
//! The inner envelope carried as the payload of every cross-chain message:
//! `(nonce, sender, receiver, inner payload)`. The source aggregator wraps
//! the caller's payload in an envelope; the destination aggregator unwraps
//! it before invoking the receiver.
//!
//! ## Layout
//!
//! The codec is an explicit, deterministic byte layout rather than a serde
//! format because message ids are derived from these bytes and must be
//! stable across versions:
//!
//! ```text
//! nonce    : u64, big-endian (8 bytes)
//! sender   : u32 BE length || UTF-8 bytes   (CAIP-10 string)
//! receiver : u32 BE length || UTF-8 bytes   (CAIP-10 string)
//! payload  : u32 BE length || raw bytes
//! ```
//!
//! Decoding rejects truncation, trailing bytes, and non-UTF-8 identity
//! fields with [`RelayTypesError::MalformedEnvelope`].

use crate::errors::RelayTypesError;
use serde::{Deserialize, Serialize};

/// The inner wire envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Strictly increasing per-source-aggregator nonce. Nonce uniqueness is
    /// the root of message-id uniqueness.
    pub nonce: u64,
    /// CAIP-10 identity of the original sender on the source chain.
    pub sender: String,
    /// CAIP-10 identity of the destination receiver.
    pub receiver: String,
    /// The caller's opaque payload.
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Encode to the deterministic wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            8 + 4 + self.sender.len() + 4 + self.receiver.len() + 4 + self.payload.len(),
        );
        out.extend_from_slice(&self.nonce.to_be_bytes());
        put_bytes(&mut out, self.sender.as_bytes());
        put_bytes(&mut out, self.receiver.as_bytes());
        put_bytes(&mut out, &self.payload);
        out
    }

    /// Decode from the wire layout, rejecting malformed input.
    pub fn decode(bytes: &[u8]) -> Result<Self, RelayTypesError> {
        let mut cursor = Cursor { bytes, pos: 0 };
        let nonce = cursor.take_u64("nonce")?;
        let sender = cursor.take_string("sender")?;
        let receiver = cursor.take_string("receiver")?;
        let payload = cursor.take_bytes("payload")?.to_vec();
        if cursor.pos != bytes.len() {
            return Err(RelayTypesError::MalformedEnvelope {
                reason: format!("{} trailing bytes", bytes.len() - cursor.pos),
            });
        }
        Ok(Self {
            nonce,
            sender,
            receiver,
            payload,
        })
    }
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8], RelayTypesError> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(RelayTypesError::MalformedEnvelope {
                reason: format!("truncated at {field}"),
            }),
        }
    }

    fn take_u64(&mut self, field: &str) -> Result<u64, RelayTypesError> {
        let raw = self.take(8, field)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        Ok(u64::from_be_bytes(buf))
    }

    fn take_bytes(&mut self, field: &str) -> Result<&'a [u8], RelayTypesError> {
        let raw = self.take(4, field)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(raw);
        let len = u32::from_be_bytes(buf) as usize;
        self.take(len, field)
    }

    fn take_string(&mut self, field: &str) -> Result<String, RelayTypesError> {
        let raw = self.take_bytes(field)?;
        String::from_utf8(raw.to_vec()).map_err(|_| RelayTypesError::MalformedEnvelope {
            reason: format!("{field} is not valid UTF-8"),
        })
    }
}
