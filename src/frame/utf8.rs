//! Streaming UTF-8 decoding that tolerates code points split across fragments.

use std::str;

/// Maximum number of bytes held back while waiting for a code point to complete.
const MAX_TAIL: usize = 3;

/// Incremental UTF-8 decoder.
///
/// Bytes forming an incomplete sequence at the end of a fragment are kept and
/// prepended to the next one. Sequences that can never become valid are
/// replaced with U+FFFD, matching a lossy streaming text decoder.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    tail: Vec<u8>,
}

impl Utf8Decoder {
    /// Decode `bytes`, appending the text to `out`.
    pub(crate) fn decode_into(&mut self, bytes: &[u8], out: &mut String) {
        if bytes.is_empty() {
            return;
        }
        if self.tail.is_empty() {
            self.decode_chunk(bytes, out);
        } else {
            let mut joined = std::mem::take(&mut self.tail);
            joined.extend_from_slice(bytes);
            self.decode_chunk(&joined, out);
        }
    }

    /// Flush held-back bytes as replacement characters.
    pub(crate) fn flush_into(&mut self, out: &mut String) {
        if !self.tail.is_empty() {
            out.push_str(&String::from_utf8_lossy(&self.tail));
            self.tail.clear();
        }
    }

    /// Number of bytes awaiting continuation.
    pub(crate) fn pending(&self) -> usize { self.tail.len() }

    pub(crate) fn clear(&mut self) { self.tail.clear(); }

    fn decode_chunk(&mut self, mut input: &[u8], out: &mut String) {
        loop {
            match str::from_utf8(input) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    // `valid_up_to` marks a UTF-8 prefix, so this never falls back.
                    out.push_str(str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[invalid..];
                        }
                        None => {
                            debug_assert!(rest.len() <= MAX_TAIL);
                            self.tail.extend_from_slice(rest);
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Utf8Decoder;

    fn decode_all(chunks: &[&[u8]]) -> String {
        let mut decoder = Utf8Decoder::default();
        let mut out = String::new();
        for chunk in chunks {
            decoder.decode_into(chunk, &mut out);
        }
        decoder.flush_into(&mut out);
        out
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn code_point_split_at_every_offset_decodes_intact(#[case] split: usize) {
        let text = "\u{1F600}";
        let bytes = text.as_bytes();
        let (head, tail) = bytes.split_at(split);
        assert_eq!(decode_all(&[head, tail]), text);
    }

    #[test]
    fn byte_by_byte_feeding_matches_whole_input() {
        let text = "id=ü€𝄞 done";
        let chunks: Vec<&[u8]> = text.as_bytes().chunks(1).collect();
        assert_eq!(decode_all(&chunks), text);
    }

    #[test]
    fn incomplete_sequence_is_held_back() {
        let mut decoder = Utf8Decoder::default();
        let mut out = String::new();
        decoder.decode_into(&"é".as_bytes()[..1], &mut out);
        assert!(out.is_empty());
        assert_eq!(decoder.pending(), 1);
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        assert_eq!(decode_all(&[b"a\xFFb"]), "a\u{FFFD}b");
    }

    #[test]
    fn dangling_tail_is_flushed_lossily() {
        assert_eq!(decode_all(&[b"ok\xE2\x82"]), "ok\u{FFFD}");
    }
}
