//! Identity cipher used when no encryption is configured.

use crate::Cipher;

/// Cipher that stores payloads as their raw UTF-8 bytes.
///
/// This is the engine default: the storage pipeline always runs through a
/// cipher, and the passthrough keeps the pipeline uniform when encryption
/// is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCipher;

impl Cipher for PassthroughCipher {
    fn encrypt(&self, plaintext: &str, _key: &str) -> Option<Vec<u8>> {
        if plaintext.is_empty() {
            return None;
        }
        Some(plaintext.as_bytes().to_vec())
    }

    fn decrypt(&self, data: &[u8], _key: &str) -> Option<String> {
        if data.is_empty() {
            return None;
        }
        String::from_utf8(data.to_vec()).ok()
    }
}
