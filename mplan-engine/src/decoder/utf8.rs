//! Incremental UTF-8 decoding for byte-level feeds
//!
//! Transport chunks may split a multi-byte character. The trailing partial
//! sequence is held back until the next chunk completes it. Invalid sequences
//! become U+FFFD.

#[derive(Debug, Default)]
pub(crate) struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    /// Decode as much of `pending + bytes` as is complete
    pub fn push(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush a dangling partial sequence as U+FFFD
    pub fn finish(&mut self) -> Option<char> {
        if self.pending.is_empty() {
            None
        } else {
            self.pending.clear();
            Some(char::REPLACEMENT_CHARACTER)
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multibyte_character() {
        let bytes = "é".as_bytes();
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.push(&bytes[..1]), "");
        assert_eq!(carry.push(&bytes[1..]), "é");
        assert_eq!(carry.finish(), None);
    }

    #[test]
    fn test_invalid_byte_replaced() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.push(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_dangling_sequence_flushed() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.push(&"🍮".as_bytes()[..2]), "");
        assert_eq!(carry.finish(), Some('\u{FFFD}'));
        assert_eq!(carry.finish(), None);
    }
}
