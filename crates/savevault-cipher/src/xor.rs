//! Repeating-key XOR cipher.
//!
//! Obfuscation, not cryptography: the goal is keeping casual editors out of
//! save files, matching what shipping save systems typically do. Swap in a
//! real [`Cipher`] implementation for anything stronger.

use crate::Cipher;

/// Repeating-key XOR over the UTF-8 bytes of the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorCipher;

fn xor_with_key(input: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return input.to_vec();
    }
    input
        .iter()
        .zip(key.iter().cycle())
        .map(|(byte, key_byte)| byte ^ key_byte)
        .collect()
}

impl Cipher for XorCipher {
    fn encrypt(&self, plaintext: &str, key: &str) -> Option<Vec<u8>> {
        if plaintext.is_empty() {
            return None;
        }
        Some(xor_with_key(plaintext.as_bytes(), key.as_bytes()))
    }

    fn decrypt(&self, data: &[u8], key: &str) -> Option<String> {
        if data.is_empty() {
            return None;
        }
        String::from_utf8(xor_with_key(data, key.as_bytes())).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round_trip() {
        let cipher = XorCipher;
        let secret = cipher.encrypt("save data", "QplEVJveOQ");
        let restored = secret.and_then(|bytes| cipher.decrypt(&bytes, "QplEVJveOQ"));
        assert_eq!(restored.as_deref(), Some("save data"));
    }

    #[test]
    fn test_output_differs_from_input() {
        let cipher = XorCipher;
        let secret = cipher.encrypt("save data", "key");
        assert_ne!(secret.as_deref(), Some(b"save data".as_slice()));
    }

    #[test]
    fn test_empty_input_is_identity() {
        let cipher = XorCipher;
        assert!(cipher.encrypt("", "key").is_none());
        assert!(cipher.decrypt(&[], "key").is_none());
    }

    #[test]
    fn test_wrong_key_does_not_round_trip() {
        let cipher = XorCipher;
        let secret = cipher.encrypt("save data", "key-a").unwrap_or_default();
        assert_ne!(cipher.decrypt(&secret, "key-b").as_deref(), Some("save data"));
    }

    #[tokio::test]
    async fn test_async_surface_delegates_to_sync() {
        let cipher = XorCipher;
        let secret = cipher.encrypt_async("save data", "key").await;
        assert_eq!(secret, cipher.encrypt("save data", "key"));
        let restored = cipher
            .decrypt_async(&secret.unwrap_or_default(), "key")
            .await;
        assert_eq!(restored.as_deref(), Some("save data"));
    }

    proptest! {
        #[test]
        fn prop_round_trip(text in "\\PC{1,256}", key in "[a-zA-Z0-9]{1,32}") {
            let cipher = XorCipher;
            let secret = cipher.encrypt(&text, &key);
            prop_assert!(secret.is_some());
            let restored = secret.and_then(|bytes| cipher.decrypt(&bytes, &key));
            prop_assert_eq!(restored, Some(text));
        }
    }
}
