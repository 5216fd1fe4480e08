use std::fmt;
use std::str::Utf8Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnicodePathError {
    EmptyPayload,
    TooShort { len: usize },
    Truncated { declared: usize, available: usize },
    UnsupportedVersion(u8),
    InvalidUtf8(Utf8Error),
    WrongHeaderId(u16),
    PayloadTooLarge(usize),
}

impl fmt::Display for UnicodePathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "empty payload"),
            Self::TooShort { len } => {
                write!(f, "payload too short: {len} bytes, need at least 5")
            }
            Self::Truncated {
                declared,
                available,
            } => write!(
                f,
                "truncated extra field: declared {declared} bytes, got {available}"
            ),
            Self::UnsupportedVersion(v) => write!(f, "unsupported version: {v}"),
            Self::InvalidUtf8(e) => write!(f, "unicode name is not valid UTF-8: {e}"),
            Self::WrongHeaderId(id) => write!(f, "unexpected header id: 0x{id:04x}"),
            Self::PayloadTooLarge(n) => write!(f, "payload too large: {n} bytes"),
        }
    }
}

impl std::error::Error for UnicodePathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUtf8(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Utf8Error> for UnicodePathError {
    fn from(e: Utf8Error) -> Self {
        Self::InvalidUtf8(e)
    }
}

pub type UnicodePathResult<T> = Result<T, UnicodePathError>;
