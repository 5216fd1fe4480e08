use std::borrow::Cow;

use encoding_rs::Encoding;

/// Encoding assumed for legacy entry names when the caller does not pick one.
/// Korean archivers write names in CP949, which `encoding_rs::EUC_KR` decodes.
pub static DEFAULT_LEGACY_ENCODING: &Encoding = &encoding_rs::EUC_KR_INIT;

/// Convert a legacy entry name to text.
/// Bytes that are already valid UTF-8 are borrowed as-is; anything else is
/// decoded with `encoding`, replacing malformed sequences.
pub fn legacy_to_utf8<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(s);
    }

    let (cow, _encoding_used, _had_errors) = encoding.decode(bytes);
    cow
}
