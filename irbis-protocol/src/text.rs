//! Text and encoding helpers shared by the frame, file specification and
//! reply parsers.
//!
//! The protocol mixes a single-byte national codepage with UTF-8 inside one
//! frame. [`LegacyCodec`] wraps the codepage side; [`cp866`] and
//! [`windows1251`] hand out process-wide cached instances that can be passed
//! into [`RequestFrame::with_codec`](crate::RequestFrame::with_codec) and
//! [`Response::with_codec`](crate::Response::with_codec).

use crate::error::ProtocolError;
use encoding_rs::{Encoding, EncoderResult, IBM866, WINDOWS_1251};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Line delimiter used by the server inside inline text content.
pub const IRBIS_DELIMITER: &str = "\x1F\x1E";

/// Ordinary CR LF line delimiter.
pub const MSDOS_DELIMITER: &str = "\r\n";

/// Byte written for characters the codepage cannot represent.
const REPLACEMENT_BYTE: u8 = b'?';

static CP866: OnceLock<LegacyCodec> = OnceLock::new();
static WINDOWS_1251_CODEC: OnceLock<LegacyCodec> = OnceLock::new();

/// Single-byte codepages understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodePage {
    /// DOS Cyrillic (OEM).
    #[serde(rename = "cp866", alias = "866", alias = "ibm866")]
    Cp866,
    /// Windows Cyrillic (ANSI).
    #[serde(rename = "windows-1251", alias = "1251", alias = "cp1251")]
    Windows1251,
}

impl CodePage {
    /// Numeric codepage identifier.
    pub fn code(&self) -> u16 {
        match self {
            CodePage::Cp866 => 866,
            CodePage::Windows1251 => 1251,
        }
    }

    /// Returns the cached codec for this codepage.
    pub fn codec(&self) -> &'static LegacyCodec {
        match self {
            CodePage::Cp866 => cp866(),
            CodePage::Windows1251 => windows1251(),
        }
    }

    fn encoding(&self) -> &'static Encoding {
        match self {
            CodePage::Cp866 => IBM866,
            CodePage::Windows1251 => WINDOWS_1251,
        }
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodePage::Cp866 => write!(f, "cp866"),
            CodePage::Windows1251 => write!(f, "windows-1251"),
        }
    }
}

impl FromStr for CodePage {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cp866" | "866" | "ibm866" => Ok(CodePage::Cp866),
            "windows-1251" | "cp1251" | "1251" => Ok(CodePage::Windows1251),
            _ => Err(ProtocolError::UnsupportedCodePage(s.to_string())),
        }
    }
}

/// Immutable handle on a single-byte legacy codepage.
#[derive(Debug)]
pub struct LegacyCodec {
    code_page: CodePage,
    encoding: &'static Encoding,
}

impl LegacyCodec {
    fn new(code_page: CodePage) -> Self {
        tracing::debug!("Initializing {} codec", code_page);
        Self {
            code_page,
            encoding: code_page.encoding(),
        }
    }

    /// Resolves a cached codec by numeric codepage.
    pub fn for_code_page(code: u16) -> Result<&'static LegacyCodec, ProtocolError> {
        match code {
            866 => Ok(cp866()),
            1251 => Ok(windows1251()),
            other => Err(ProtocolError::UnsupportedCodePage(other.to_string())),
        }
    }

    pub fn code_page(&self) -> CodePage {
        self.code_page
    }

    /// Encodes text, writing `?` for every unmappable character.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut encoder = self.encoding.new_encoder();
        let mut out = Vec::with_capacity(text.len());
        let mut rest = text;
        loop {
            let (result, read) =
                encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
            rest = &rest[read..];
            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::OutputFull => out.reserve(rest.len().max(1)),
                EncoderResult::Unmappable(_) => out.push(REPLACEMENT_BYTE),
            }
        }
        out
    }

    /// Decodes bytes; every byte of a single-byte codepage maps to a character.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _) = self.encoding.decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

/// Cached DOS Cyrillic codec.
pub fn cp866() -> &'static LegacyCodec {
    CP866.get_or_init(|| LegacyCodec::new(CodePage::Cp866))
}

/// Cached Windows Cyrillic codec, the default for ANSI fields.
pub fn windows1251() -> &'static LegacyCodec {
    WINDOWS_1251_CODEC.get_or_init(|| LegacyCodec::new(CodePage::Windows1251))
}

/// Encodes text for a UTF-8 field.
pub fn utf8_encode(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

pub fn is_arabic_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_latin_letter_or_arabic_digit(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Cyrillic letter from `А` to `я`, or `Ё`/`ё`.
pub fn is_russian_letter(c: char) -> bool {
    ('А'..='я').contains(&c) || c == 'Ё' || c == 'ё'
}

/// Locale-independent decimal rendering of integers.
pub trait InvariantString {
    fn to_invariant_string(&self) -> String;
}

macro_rules! impl_invariant_string {
    ($($t:ty),*) => {
        $(
            impl InvariantString for $t {
                fn to_invariant_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_invariant_string!(i16, u16, i32, u32, i64, u64);

/// Maps a character to its single-character uppercase form. Characters
/// whose uppercase expands to several characters (such as 'ß') map to
/// themselves.
pub fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Compares two characters ignoring case.
pub fn same_char(one: char, two: char) -> bool {
    simple_uppercase(one) == simple_uppercase(two)
}

/// Compares two optional strings ignoring case. Absent equals only absent.
pub fn same_string<'a, 'b>(
    one: impl Into<Option<&'a str>>,
    two: impl Into<Option<&'b str>>,
) -> bool {
    match (one.into(), two.into()) {
        (None, None) => true,
        (Some(a), Some(b)) => a
            .chars()
            .map(simple_uppercase)
            .eq(b.chars().map(simple_uppercase)),
        _ => false,
    }
}

/// Parses an integer, falling back to `default` for absent, empty or
/// unparsable text.
pub fn safe_to_int<'a>(text: impl Into<Option<&'a str>>, default: i32) -> i32 {
    match text.into() {
        Some(text) if !text.is_empty() => text.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Like [`safe_to_int`], but a value outside `min..=max` also yields
/// `default`. The value is never clamped.
pub fn safe_to_int_in_range<'a>(
    text: impl Into<Option<&'a str>>,
    default: i32,
    min: i32,
    max: i32,
) -> i32 {
    let value = safe_to_int(text, default);
    if (min..=max).contains(&value) {
        value
    } else {
        default
    }
}

pub fn empty_to_none<'a>(text: impl Into<Option<&'a str>>) -> Option<&'a str> {
    text.into().filter(|t| !t.is_empty())
}

/// Replaces CR LF with the server's inline delimiter.
pub fn windows_to_irbis(text: &str) -> String {
    text.replace(MSDOS_DELIMITER, IRBIS_DELIMITER)
}

/// Replaces the server's inline delimiter with CR LF.
pub fn irbis_to_windows(text: &str) -> String {
    text.replace(IRBIS_DELIMITER, MSDOS_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_cache_returns_same_instance() {
        assert!(std::ptr::eq(cp866(), cp866()));
        assert!(std::ptr::eq(windows1251(), windows1251()));
        assert!(!std::ptr::eq(cp866(), windows1251()));
    }

    #[test]
    fn test_codec_cache_concurrent_first_access() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| cp866() as *const LegacyCodec as usize))
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_windows1251_roundtrip_cyrillic() {
        let codec = windows1251();
        let bytes = codec.encode("Привет");
        assert_eq!(bytes, vec![0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2]);
        assert_eq!(codec.decode(&bytes), "Привет");
    }

    #[test]
    fn test_cp866_encodes_differently() {
        let bytes = cp866().encode("Ая");
        assert_eq!(bytes, vec![0x80, 0xEF]);
        assert_eq!(cp866().decode(&bytes), "Ая");
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        let bytes = windows1251().encode("a\u{4E2D}b");
        assert_eq!(bytes, b"a?b".to_vec());
    }

    #[test]
    fn test_for_code_page() {
        assert_eq!(
            LegacyCodec::for_code_page(866).unwrap().code_page(),
            CodePage::Cp866
        );
        assert_eq!(
            LegacyCodec::for_code_page(1251).unwrap().code_page(),
            CodePage::Windows1251
        );
        assert!(matches!(
            LegacyCodec::for_code_page(437),
            Err(ProtocolError::UnsupportedCodePage(_))
        ));
    }

    #[test]
    fn test_code_page_from_str() {
        assert_eq!("CP866".parse::<CodePage>().unwrap(), CodePage::Cp866);
        assert_eq!("1251".parse::<CodePage>().unwrap(), CodePage::Windows1251);
        assert_eq!(
            "Windows-1251".parse::<CodePage>().unwrap(),
            CodePage::Windows1251
        );
        assert!("koi8-r".parse::<CodePage>().is_err());
        assert_eq!(CodePage::Cp866.to_string(), "cp866");
        assert_eq!(CodePage::Windows1251.code(), 1251);
    }

    #[test]
    fn test_char_predicates() {
        assert!(is_arabic_digit('7'));
        assert!(!is_arabic_digit('a'));
        assert!(!is_arabic_digit('٣'));

        assert!(is_latin_letter('q'));
        assert!(is_latin_letter('Z'));
        assert!(!is_latin_letter('Ж'));

        assert!(is_latin_letter_or_arabic_digit('0'));
        assert!(!is_latin_letter_or_arabic_digit('_'));

        assert!(is_russian_letter('Ж'));
        assert!(is_russian_letter('я'));
        assert!(is_russian_letter('Ё'));
        assert!(is_russian_letter('ё'));
        assert!(!is_russian_letter('z'));
    }

    #[test]
    fn test_invariant_string() {
        assert_eq!((-12i16).to_invariant_string(), "-12");
        assert_eq!(65535u16.to_invariant_string(), "65535");
        assert_eq!(1_000_000i32.to_invariant_string(), "1000000");
        assert_eq!(u64::MAX.to_invariant_string(), "18446744073709551615");
    }

    #[test]
    fn test_same_char() {
        assert!(same_char('a', 'A'));
        assert!(same_char('ж', 'Ж'));
        assert!(!same_char('a', 'b'));
    }

    #[test]
    fn test_same_string() {
        assert!(same_string("IBIS", "ibis"));
        assert!(same_string("Каталог", "КАТАЛОГ"));
        assert!(!same_string("IBIS", "RDR"));
        assert!(same_string(None::<&str>, None::<&str>));
        assert!(!same_string(None::<&str>, ""));
        assert!(!same_string("abc", "abcd"));
    }

    #[test]
    fn test_case_mapping_is_one_to_one() {
        assert_eq!(simple_uppercase('ß'), 'ß');
        assert_eq!(simple_uppercase('ё'), 'Ё');
        assert!(!same_char('ß', 'S'));
        assert!(!same_string("straße", "STRASSE"));
        assert!(same_string("STRAßE", "straße"));
    }

    #[test]
    fn test_safe_to_int() {
        assert_eq!(safe_to_int("abc", 42), 42);
        assert_eq!(safe_to_int("", 7), 7);
        assert_eq!(safe_to_int(None::<&str>, 7), 7);
        assert_eq!(safe_to_int(" 15 ", 0), 15);
        assert_eq!(safe_to_int("-3", 0), -3);
        assert_eq!(safe_to_int("99999999999", 1), 1);
    }

    #[test]
    fn test_safe_to_int_in_range_falls_back_not_clamps() {
        assert_eq!(safe_to_int_in_range("150", 0, 0, 100), 0);
        assert_eq!(safe_to_int_in_range("-1", 5, 0, 100), 5);
        assert_eq!(safe_to_int_in_range("100", 0, 0, 100), 100);
        assert_eq!(safe_to_int_in_range("x", 3, 0, 100), 3);
    }

    #[test]
    fn test_empty_to_none() {
        assert_eq!(empty_to_none(""), None);
        assert_eq!(empty_to_none(None::<&str>), None);
        assert_eq!(empty_to_none("IBIS"), Some("IBIS"));
    }

    #[test]
    fn test_delimiter_transform() {
        let text = "line one\r\nline two";
        let irbis = windows_to_irbis(text);
        assert_eq!(irbis, "line one\x1F\x1Eline two");
        assert_eq!(irbis_to_windows(&irbis), text);
        assert_eq!(windows_to_irbis("no breaks"), "no breaks");
    }
}
