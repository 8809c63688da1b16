//! 字元編碼轉換：依設定的編碼與錯誤策略解碼輸入、編碼輸出。

use encoding_rs::{DecoderResult, EncoderResult, Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CHARACTER_ENCODING: &str = "utf-8";
pub const DEFAULT_ENCODING_ERRORS: DecodeErrorPolicy = DecodeErrorPolicy::BackslashReplace;

/// 遇到無法解碼的位元組（或無法編碼的字元）時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeErrorPolicy {
    Strict,
    Replace,
    Ignore,
    #[default]
    BackslashReplace,
}

impl DecodeErrorPolicy {
    pub const NAMES: [&'static str; 4] = ["strict", "replace", "ignore", "backslashreplace"];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeErrorPolicy::Strict => "strict",
            DecodeErrorPolicy::Replace => "replace",
            DecodeErrorPolicy::Ignore => "ignore",
            DecodeErrorPolicy::BackslashReplace => "backslashreplace",
        }
    }
}

impl fmt::Display for DecodeErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecodeErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(DecodeErrorPolicy::Strict),
            "replace" => Ok(DecodeErrorPolicy::Replace),
            "ignore" => Ok(DecodeErrorPolicy::Ignore),
            "backslashreplace" => Ok(DecodeErrorPolicy::BackslashReplace),
            other => Err(format!(
                "unknown encoding error policy '{}', expected one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("'{encoding}' codec can't decode byte(s) {bytes} at position {offset}")]
    Undecodable {
        encoding: &'static str,
        bytes: String,
        offset: usize,
    },

    #[error("'{encoding}' codec can't encode character {character:?} at position {offset}")]
    Unencodable {
        encoding: &'static str,
        character: char,
        offset: usize,
    },
}

/// 依標籤尋找編碼，接受 WHATWG 標籤（"utf-8"、"latin1"、"cp1252"、"shift_jis" 等）
pub fn lookup_encoding(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    Encoding::for_label(label.as_bytes()).or_else(|| match label.to_ascii_lowercase().as_str() {
        "utf8" | "utf_8" => Some(UTF_8),
        "latin-1" | "latin_1" => Some(encoding_rs::WINDOWS_1252),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct TextCodec {
    encoding: &'static Encoding,
    errors: DecodeErrorPolicy,
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::new(UTF_8, DEFAULT_ENCODING_ERRORS)
    }
}

impl TextCodec {
    pub fn new(encoding: &'static Encoding, errors: DecodeErrorPolicy) -> Self {
        Self { encoding, errors }
    }

    pub fn for_label(label: &str, errors: DecodeErrorPolicy) -> Option<Self> {
        lookup_encoding(label).map(|encoding| Self::new(encoding, errors))
    }

    /// 解碼整份輸入；開頭符合此編碼的 BOM 會被移除
    pub fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let mut decoder = self.encoding.new_decoder_with_bom_removal();
        let mut out = String::with_capacity(
            decoder
                .max_utf8_buffer_length_without_replacement(bytes.len())
                .unwrap_or(bytes.len()),
        );
        let mut pos = 0;

        loop {
            let (result, read) =
                decoder.decode_to_string_without_replacement(&bytes[pos..], &mut out, true);
            pos += read;

            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => {
                    let remaining = bytes.len() - pos;
                    out.reserve(
                        decoder
                            .max_utf8_buffer_length_without_replacement(remaining)
                            .unwrap_or(remaining * 3)
                            .max(16),
                    );
                }
                DecoderResult::Malformed(bad, extra) => {
                    let end = pos.saturating_sub(extra as usize);
                    let start = end.saturating_sub(bad as usize);
                    let malformed = &bytes[start..end];

                    match self.errors {
                        DecodeErrorPolicy::Strict => {
                            return Err(CodecError::Undecodable {
                                encoding: self.encoding.name(),
                                bytes: escape_bytes(malformed),
                                offset: start,
                            });
                        }
                        DecodeErrorPolicy::Replace => out.push(char::REPLACEMENT_CHARACTER),
                        DecodeErrorPolicy::Ignore => {}
                        DecodeErrorPolicy::BackslashReplace => out.push_str(&escape_bytes(malformed)),
                    }
                }
            }
        }

        Ok(out)
    }

    /// 編碼輸出文字；UTF-16 系列依 WHATWG 規則輸出為 UTF-8
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        let output = self.encoding.output_encoding();
        if output == UTF_8 {
            return Ok(text.as_bytes().to_vec());
        }

        let mut encoder = output.new_encoder();
        let mut out = Vec::with_capacity(
            encoder
                .max_buffer_length_from_utf8_without_replacement(text.len())
                .unwrap_or(text.len()),
        );
        let mut pos = 0;

        loop {
            let (result, read) =
                encoder.encode_from_utf8_to_vec_without_replacement(&text[pos..], &mut out, true);
            pos += read;

            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::OutputFull => {
                    let remaining = text.len() - pos;
                    out.reserve(
                        encoder
                            .max_buffer_length_from_utf8_without_replacement(remaining)
                            .unwrap_or(remaining * 4)
                            .max(16),
                    );
                }
                EncoderResult::Unmappable(character) => match self.errors {
                    DecodeErrorPolicy::Strict => {
                        return Err(CodecError::Unencodable {
                            encoding: output.name(),
                            character,
                            offset: pos - character.len_utf8(),
                        });
                    }
                    DecodeErrorPolicy::Replace => out.push(b'?'),
                    DecodeErrorPolicy::Ignore => {}
                    DecodeErrorPolicy::BackslashReplace => {
                        out.extend_from_slice(escape_char(character).as_bytes())
                    }
                },
            }
        }

        Ok(out)
    }
}

fn escape_bytes(bytes: &[u8]) -> String {
    let mut escaped = String::with_capacity(bytes.len() * 4);
    for byte in bytes {
        escaped.push_str(&format!("\\x{:02x}", byte));
    }
    escaped
}

fn escape_char(character: char) -> String {
    let code = character as u32;
    if code <= 0xff {
        format!("\\x{:02x}", code)
    } else if code <= 0xffff {
        format!("\\u{:04x}", code)
    } else {
        format!("\\U{:08x}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "BackslashReplace".parse::<DecodeErrorPolicy>().unwrap(),
            DecodeErrorPolicy::BackslashReplace
        );
        assert_eq!("strict".parse::<DecodeErrorPolicy>().unwrap(), DecodeErrorPolicy::Strict);
        let err = "surrogateescape".parse::<DecodeErrorPolicy>().unwrap_err();
        assert!(err.contains("surrogateescape"));
        assert_eq!(DecodeErrorPolicy::default(), DEFAULT_ENCODING_ERRORS);
    }

    #[test]
    fn test_lookup_encoding_labels() {
        assert_eq!(lookup_encoding("utf-8").unwrap(), UTF_8);
        assert_eq!(lookup_encoding("UTF8").unwrap(), UTF_8);
        assert_eq!(lookup_encoding("latin-1").unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(lookup_encoding("cp1252").unwrap(), encoding_rs::WINDOWS_1252);
        assert!(lookup_encoding("no-such-encoding").is_none());
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let codec = TextCodec::default();
        let text = codec.decode(b"\xef\xbb\xbfid,name\n").unwrap();
        assert_eq!(text, "id,name\n");
    }

    #[test]
    fn test_decode_error_policies() {
        let bytes = b"ab\xffcd";

        let strict = TextCodec::new(UTF_8, DecodeErrorPolicy::Strict);
        let err = strict.decode(bytes).unwrap_err();
        assert_eq!(
            err,
            CodecError::Undecodable {
                encoding: "UTF-8",
                bytes: "\\xff".to_string(),
                offset: 2,
            }
        );

        let replace = TextCodec::new(UTF_8, DecodeErrorPolicy::Replace);
        assert_eq!(replace.decode(bytes).unwrap(), "ab\u{FFFD}cd");

        let ignore = TextCodec::new(UTF_8, DecodeErrorPolicy::Ignore);
        assert_eq!(ignore.decode(bytes).unwrap(), "abcd");

        let backslash = TextCodec::new(UTF_8, DecodeErrorPolicy::BackslashReplace);
        assert_eq!(backslash.decode(bytes).unwrap(), "ab\\xffcd");
    }

    #[test]
    fn test_windows_1252_round_trip() {
        let codec = TextCodec::for_label("cp1252", DecodeErrorPolicy::Strict).unwrap();
        let bytes = codec.encode("café,€5").unwrap();
        assert_eq!(bytes, b"caf\xe9,\x805");
        assert_eq!(codec.decode(&bytes).unwrap(), "café,€5");
    }

    #[test]
    fn test_encode_error_policies() {
        let strict = TextCodec::for_label("cp1252", DecodeErrorPolicy::Strict).unwrap();
        assert!(matches!(
            strict.encode("a\u{4e2d}b"),
            Err(CodecError::Unencodable { character: '\u{4e2d}', offset: 1, .. })
        ));

        let replace = TextCodec::for_label("cp1252", DecodeErrorPolicy::Replace).unwrap();
        assert_eq!(replace.encode("a\u{4e2d}b").unwrap(), b"a?b");

        let backslash =
            TextCodec::for_label("cp1252", DecodeErrorPolicy::BackslashReplace).unwrap();
        assert_eq!(backslash.encode("a\u{4e2d}b").unwrap(), b"a\\u4e2db");
        assert_eq!(backslash.encode("\u{1F600}").unwrap(), b"\\U0001f600");
    }

    #[test]
    fn test_utf8_encode_is_passthrough() {
        let codec = TextCodec::default();
        assert_eq!(codec.encode("中文,ok").unwrap(), "中文,ok".as_bytes());
    }
}
