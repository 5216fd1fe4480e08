//! Extra field framing for the Unicode Path record.
//! A ZIP extra field is `header id (u16 LE) ‖ data size (u16 LE) ‖ data`.

use crate::error::{UnicodePathError, UnicodePathResult};
use crate::unicode_path::UnicodePath;

pub const HEADER_ID: u16 = 0x7075; // "up"
pub const HEADER_LEN: usize = 4;

/// Builds a record from an unframed payload.
pub type Constructor = fn(&[u8]) -> UnicodePathResult<UnicodePath>;

/// Entry for a host's header id → constructor table.
pub const REGISTRATION: (u16, Constructor) = (HEADER_ID, UnicodePath::parse as Constructor);

/// Split an extra field into header id, declared data size and the bytes
/// following the header (which may run past the declared size).
pub fn split_header(buf: &[u8]) -> UnicodePathResult<(u16, usize, &[u8])> {
    if buf.len() < HEADER_LEN {
        return Err(UnicodePathError::Truncated {
            declared: HEADER_LEN,
            available: buf.len(),
        });
    }
    let id = u16::from_le_bytes([buf[0], buf[1]]);
    let size = u16::from_le_bytes([buf[2], buf[3]]) as usize;
    Ok((id, size, &buf[HEADER_LEN..]))
}

impl UnicodePath {
    pub fn parse_framed(buf: &[u8]) -> UnicodePathResult<Self> {
        if buf.is_empty() {
            return Err(UnicodePathError::EmptyPayload);
        }
        let (id, size, content) = split_header(buf)?;
        if id != HEADER_ID {
            return Err(UnicodePathError::WrongHeaderId(id));
        }
        Self::parse_with_declared_len(size, content)
    }

    pub fn merge_framed(&mut self, buf: &[u8]) -> UnicodePathResult<()> {
        if buf.is_empty() {
            return Err(UnicodePathError::EmptyPayload);
        }
        let (id, size, content) = split_header(buf)?;
        if id != HEADER_ID {
            return Err(UnicodePathError::WrongHeaderId(id));
        }
        self.merge_with_declared_len(size, content)
    }

    pub fn to_framed(&self) -> UnicodePathResult<Vec<u8>> {
        let payload = self.serialize();
        let size = u16::try_from(payload.len())
            .map_err(|_| UnicodePathError::PayloadTooLarge(payload.len()))?;

        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(&HEADER_ID.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }
}
