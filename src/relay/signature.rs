//! Callback signature verification.
//!
//! A callback is authentic when `sign` equals the lowercase hex md5 of
//! `"data=" + payload + "&" + key`, where `payload` is the `data` field
//! after one more round of query unescaping with spaces put back to `+`.

use md5::{Digest, Md5};

use crate::error::PipelineError;

/// The shared key callbacks are signed with.
#[derive(Clone)]
pub struct SigningKey(String);

impl SigningKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Query-unescape the raw `data` value and restore `+` characters that
/// form decoding turned into spaces.
pub fn normalize_payload(raw: &str) -> Result<Vec<u8>, PipelineError> {
    let mut payload = unescape(raw)?;
    for b in &mut payload {
        if *b == b' ' {
            *b = b'+';
        }
    }
    Ok(payload)
}

/// Strict query unescaping: `+` becomes a space and every `%` must start
/// a two-digit hex escape.
fn unescape(raw: &str) -> Result<Vec<u8>, PipelineError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escape = bytes.get(i + 1..i + 3).unwrap_or(&bytes[i + 1..]);
                let mut decoded = [0u8; 1];
                if escape.len() != 2 || hex::decode_to_slice(escape, &mut decoded).is_err() {
                    let end = (i + 3).min(bytes.len());
                    return Err(PipelineError::MalformedInput(
                        String::from_utf8_lossy(&bytes[i..end]).into_owned(),
                    ));
                }
                out.push(decoded[0]);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Lowercase hex md5 of `"data=" + payload + "&" + key`.
#[must_use]
pub fn sign(payload: &[u8], key: &SigningKey) -> String {
    let mut hasher = Md5::new();
    hasher.update(b"data=");
    hasher.update(payload);
    hasher.update(b"&");
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a presented signature against the normalized payload.
pub fn verify(payload: &[u8], presented: &str, key: &SigningKey) -> Result<(), PipelineError> {
    if constant_time_eq(sign(payload, key).as_bytes(), presented.as_bytes()) {
        Ok(())
    } else {
        Err(PipelineError::InvalidSignature)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
