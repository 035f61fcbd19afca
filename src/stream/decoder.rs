use super::error::StreamError;

/// Incremental UTF-8 decoder.
///
/// A multi-byte character whose bytes straddle a chunk boundary is held back
/// until the rest of it arrives.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Decodes `chunk` and appends the result to `out`.
    ///
    /// On malformed input the valid prefix is still written to `out` before
    /// the error is returned.
    pub fn decode(&mut self, chunk: &[u8], out: &mut String) -> Result<(), StreamError> {
        if chunk.is_empty() {
            return Ok(());
        }

        let owned;
        let bytes: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            owned = joined;
            &owned
        };

        match std::str::from_utf8(bytes) {
            Ok(text) => {
                out.push_str(text);
                Ok(())
            }
            Err(e) => {
                let valid = e.valid_up_to();
                out.push_str(valid_prefix(bytes, valid));

                match e.error_len() {
                    None => {
                        self.pending.extend_from_slice(&bytes[valid..]);
                        Ok(())
                    }
                    Some(len) => Err(StreamError::Decode(format!(
                        "invalid UTF-8 sequence of {len} byte(s) at offset {valid}"
                    ))),
                }
            }
        }
    }

    /// Signals end of input. Bytes still held back never formed a character.
    pub fn finish(&mut self) -> Result<(), StreamError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let dangling = std::mem::take(&mut self.pending);
        Err(StreamError::Decode(format!(
            "stream ended inside a multi-byte character ({} dangling byte(s))",
            dangling.len()
        )))
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

fn valid_prefix(bytes: &[u8], valid: usize) -> &str {
    std::str::from_utf8(&bytes[..valid]).unwrap_or_default()
}
