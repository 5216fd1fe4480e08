//! Info-ZIP Unicode Path extra field (0x7075): version, CRC-32 of the
//! header name, and the UTF-8 name to use while that CRC still matches.

use std::borrow::Cow;

use encoding_rs::Encoding;
use log::{debug, trace};

use crate::encoding::{DEFAULT_LEGACY_ENCODING, legacy_to_utf8};
use crate::error::{UnicodePathError, UnicodePathResult};

pub const SUPPORTED_VERSIONS: &[u8] = &[1];

// version (1) + entry name CRC-32 (4)
const MIN_PAYLOAD_LEN: usize = 5;

/// Where in the archive a record is written. Both placements carry the
/// same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Local,
    CentralDirectory,
}

/// Unicode Path extra field: a UTF-8 name bound by CRC-32 to the legacy
/// entry name it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicodePath {
    version: u8,
    entry_name_crc32: u32,
    value: String,
}

impl Default for UnicodePath {
    fn default() -> Self {
        UnicodePath {
            version: 1,
            entry_name_crc32: 0,
            value: String::new(),
        }
    }
}

impl UnicodePath {
    /// Build a record whose checksum covers `legacy` and whose value is `unicode`.
    pub fn with_names(legacy: &[u8], unicode: &str) -> Self {
        let mut record = UnicodePath::default();
        record.set_names(legacy, unicode);
        record
    }

    /// Parse a payload whose declared length is its own length.
    pub fn parse(payload: &[u8]) -> UnicodePathResult<Self> {
        Self::parse_with_declared_len(payload.len(), payload)
    }

    /// Parse a payload as handed over by the extra field framing: the
    /// declared length from the field header plus the bytes that follow it.
    /// Bytes past `declared` belong to the next field and are ignored.
    pub fn parse_with_declared_len(declared: usize, content: &[u8]) -> UnicodePathResult<Self> {
        if declared == 0 && content.is_empty() {
            return Err(UnicodePathError::EmptyPayload);
        }
        if declared < MIN_PAYLOAD_LEN {
            return Err(UnicodePathError::TooShort { len: declared });
        }
        if content.len() < declared {
            return Err(UnicodePathError::Truncated {
                declared,
                available: content.len(),
            });
        }
        let content = &content[..declared];

        let version = content[0];
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(UnicodePathError::UnsupportedVersion(version));
        }

        let entry_name_crc32 = u32::from_le_bytes([content[1], content[2], content[3], content[4]]);
        let value = std::str::from_utf8(&content[MIN_PAYLOAD_LEN..])?.to_owned();

        Ok(UnicodePath {
            version,
            entry_name_crc32,
            value,
        })
    }

    /// Replace this record with the one parsed from `payload`.
    /// On any error the record is left exactly as it was.
    pub fn merge(&mut self, payload: &[u8]) -> UnicodePathResult<()> {
        *self = Self::parse(payload)?;
        Ok(())
    }

    /// Like `merge`, with the length taken from the field header.
    pub fn merge_with_declared_len(
        &mut self,
        declared: usize,
        content: &[u8],
    ) -> UnicodePathResult<()> {
        *self = Self::parse_with_declared_len(declared, content)?;
        Ok(())
    }

    /// Default record updated from `payload` if it is acceptable.
    /// The field is optional metadata, so a bad payload only gets logged.
    pub fn from_payload_lenient(payload: &[u8]) -> Self {
        let mut record = UnicodePath::default();
        match record.merge(payload) {
            Ok(()) | Err(UnicodePathError::EmptyPayload) => {}
            Err(e) => debug!("ignoring unicode path extra field: {e}"),
        }
        record
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn entry_name_crc32(&self) -> u32 {
        self.entry_name_crc32
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// True if the stored checksum was computed over exactly `entry_name`.
    pub fn is_trusted_for(&self, entry_name: &[u8]) -> bool {
        crc32fast::hash(entry_name) == self.entry_name_crc32
    }

    /// Name to show for an entry whose header name is `entry_name`.
    /// Stale records fall back to the header name, decoded as CP949 when it
    /// is not UTF-8.
    pub fn resolve_name<'a>(&'a self, entry_name: &'a [u8]) -> Cow<'a, str> {
        self.resolve_name_with(entry_name, DEFAULT_LEGACY_ENCODING)
    }

    pub fn resolve_name_with<'a>(
        &'a self,
        entry_name: &'a [u8],
        encoding: &'static Encoding,
    ) -> Cow<'a, str> {
        if self.is_trusted_for(entry_name) {
            return Cow::Borrowed(&self.value);
        }

        trace!(
            "unicode path crc mismatch (stored {:08x}), using header name",
            self.entry_name_crc32
        );
        legacy_to_utf8(entry_name, encoding)
    }

    /// Derive checksum and value from a name that is itself UTF-8.
    pub fn set_entry_name(&mut self, name: &[u8]) -> UnicodePathResult<()> {
        let value = std::str::from_utf8(name)?;
        self.entry_name_crc32 = crc32fast::hash(name);
        self.value = value.to_owned();
        Ok(())
    }

    /// Bind `unicode` to the legacy header bytes it stands in for.
    pub fn set_names(&mut self, legacy: &[u8], unicode: &str) {
        self.entry_name_crc32 = crc32fast::hash(legacy);
        self.value = unicode.to_owned();
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_PAYLOAD_LEN + self.value.len());
        out.push(self.version);
        out.extend_from_slice(&self.entry_name_crc32.to_le_bytes());
        out.extend_from_slice(self.value.as_bytes());
        out
    }

    pub fn pack_for(&self, placement: Placement) -> Vec<u8> {
        match placement {
            Placement::Local | Placement::CentralDirectory => self.serialize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(version: u8, crc: u32, name: &[u8]) -> Vec<u8> {
        let mut buf = vec![version];
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(name);
        buf
    }

    fn sample() -> UnicodePath {
        UnicodePath::with_names(b"old.txt", "old.txt")
    }

    #[test]
    fn test_default() {
        let r = UnicodePath::default();
        assert_eq!(r.version(), 1);
        assert_eq!(r.entry_name_crc32(), 0);
        assert_eq!(r.value(), "");
    }

    #[test]
    fn test_parse() {
        let r = UnicodePath::parse(&payload(1, 0xdeadbeef, "파일.txt".as_bytes())).unwrap();
        assert_eq!(r.version(), 1);
        assert_eq!(r.entry_name_crc32(), 0xdeadbeef);
        assert_eq!(r.value(), "파일.txt");
    }

    #[test]
    fn test_parse_header_only() {
        let r = UnicodePath::parse(&payload(1, 7, b"")).unwrap();
        assert_eq!(r.entry_name_crc32(), 7);
        assert_eq!(r.value(), "");
    }

    #[test]
    fn test_roundtrip() {
        let original = UnicodePath::with_names(b"\xbf\xee\xbf\xb5.txt", "운영.txt");
        assert_eq!(UnicodePath::parse(&original.serialize()).unwrap(), original);
    }

    #[test]
    fn test_merge_empty_keeps_state() {
        let mut r = sample();
        assert_eq!(r.merge(b""), Err(UnicodePathError::EmptyPayload));
        assert_eq!(r, sample());
    }

    #[test]
    fn test_merge_short_keeps_state() {
        let mut r = sample();
        assert_eq!(
            r.merge(&[1, 0, 0, 0]),
            Err(UnicodePathError::TooShort { len: 4 })
        );
        assert_eq!(r, sample());
    }

    #[test]
    fn test_merge_unsupported_version_keeps_state() {
        let mut r = sample();
        assert_eq!(
            r.merge(&payload(2, 1, b"new.txt")),
            Err(UnicodePathError::UnsupportedVersion(2))
        );
        assert_eq!(r, sample());
    }

    #[test]
    fn test_merge_invalid_utf8_keeps_state() {
        let mut r = sample();
        let err = r.merge(&payload(1, 1, b"bad\xff\xfe")).unwrap_err();
        assert!(matches!(err, UnicodePathError::InvalidUtf8(_)));
        assert_eq!(r, sample());
    }

    #[test]
    fn test_merge_replaces_all_fields() {
        let mut r = sample();
        r.merge(&payload(1, 42, b"new.txt")).unwrap();
        assert_eq!(r.entry_name_crc32(), 42);
        assert_eq!(r.value(), "new.txt");
    }

    #[test]
    fn test_declared_len_short_despite_extra_bytes() {
        // Declared length governs, not the bytes that happen to follow.
        let bytes = payload(1, 1, b"name");
        assert_eq!(
            UnicodePath::parse_with_declared_len(3, &bytes),
            Err(UnicodePathError::TooShort { len: 3 })
        );
    }

    #[test]
    fn test_declared_len_truncated() {
        let bytes = payload(1, 1, b"name");
        assert_eq!(
            UnicodePath::parse_with_declared_len(20, &bytes),
            Err(UnicodePathError::Truncated {
                declared: 20,
                available: 9
            })
        );
    }

    #[test]
    fn test_declared_len_ignores_trailing_fields() {
        let mut bytes = payload(1, 5, b"a.txt");
        bytes.extend_from_slice(&[0x55, 0x54, 0x05, 0x00]);
        let r = UnicodePath::parse_with_declared_len(10, &bytes).unwrap();
        assert_eq!(r.value(), "a.txt");
    }

    #[test]
    fn test_merge_declared_len_keeps_state_on_error() {
        let mut r = sample();
        assert_eq!(
            r.merge_with_declared_len(0, &[0x55, 0x54, 0, 0]),
            Err(UnicodePathError::TooShort { len: 0 })
        );
        assert_eq!(
            r.merge_with_declared_len(12, &payload(1, 1, b"abc")),
            Err(UnicodePathError::Truncated {
                declared: 12,
                available: 8
            })
        );
        assert_eq!(r, sample());

        r.merge_with_declared_len(8, &payload(1, 9, b"abc")).unwrap();
        assert_eq!(r.entry_name_crc32(), 9);
        assert_eq!(r.value(), "abc");
    }

    #[test]
    fn test_lenient_falls_back_to_default() {
        assert_eq!(
            UnicodePath::from_payload_lenient(&payload(9, 1, b"x")),
            UnicodePath::default()
        );
        let r = UnicodePath::from_payload_lenient(&payload(1, 3, b"x"));
        assert_eq!(r.value(), "x");
    }

    #[test]
    fn test_resolve_trusted() {
        let r = UnicodePath::with_names("café.txt".as_bytes(), "café.txt");
        assert_eq!(r.resolve_name("café.txt".as_bytes()), "café.txt");
    }

    #[test]
    fn test_resolve_mismatch_returns_candidate() {
        let r = UnicodePath::with_names("café.txt".as_bytes(), "café.txt");
        assert_eq!(r.resolve_name(b"other.txt"), "other.txt");
    }

    #[test]
    fn test_resolve_legacy_bytes() {
        let legacy = b"\xbf\xee\xbf\xb5.txt";
        let r = UnicodePath::with_names(legacy, "unicode-name.txt");
        assert_eq!(r.resolve_name(legacy), "unicode-name.txt");
        // A renamed entry falls back to its decoded header name.
        assert_eq!(r.resolve_name(b"\xbf\xee.txt"), "운.txt");
        assert_eq!(
            r.resolve_name_with(b"caf\xe9", encoding_rs::WINDOWS_1252),
            "café"
        );
    }

    #[test]
    fn test_set_entry_name() {
        let mut r = UnicodePath::default();
        r.set_entry_name(b"report.txt").unwrap();
        assert_eq!(r.entry_name_crc32(), crc32fast::hash(b"report.txt"));
        assert_eq!(r.value(), "report.txt");
        assert!(r.is_trusted_for(b"report.txt"));
    }

    #[test]
    fn test_set_entry_name_rejects_non_utf8() {
        let mut r = sample();
        assert!(r.set_entry_name(b"\xbf\xee").is_err());
        assert_eq!(r, sample());
    }

    #[test]
    fn test_serialize_layout() {
        let mut r = UnicodePath::default();
        r.merge(&payload(1, 0x04030201, b"ab")).unwrap();
        assert_eq!(r.serialize(), vec![1, 0x01, 0x02, 0x03, 0x04, b'a', b'b']);
    }

    #[test]
    fn test_placements_identical() {
        let r = UnicodePath::with_names(b"\xbf\xee", "운");
        assert_eq!(
            r.pack_for(Placement::Local),
            r.pack_for(Placement::CentralDirectory)
        );
        assert_eq!(r.pack_for(Placement::Local), r.serialize());
    }

    #[test]
    fn test_equality() {
        let a = UnicodePath::with_names(b"a", "a");
        assert_eq!(a, UnicodePath::with_names(b"a", "a"));
        assert_ne!(a, UnicodePath::with_names(b"b", "a"));
        assert_ne!(a, UnicodePath::with_names(b"a", "b"));
    }
}
