//! Pluggable payload ciphers for SaveVault
//!
//! Every payload that reaches the storage backend passes through a
//! [`Cipher`]: buffers in memory hold plaintext, bytes on disk hold the
//! cipher output. Implementations are intentionally lightweight — the
//! engine's durability machinery, not the cipher, is the hard part — and
//! obfuscation-grade [`XorCipher`] plus identity [`PassthroughCipher`] are
//! provided out of the box.
//!
//! The contract mirrors the storage engine's null-propagation rule: empty
//! input produces `None` on both directions, so a missing file never turns
//! into a phantom empty payload.
//!
//! # Example
//!
//! ```
//! use savevault_cipher::{Cipher, XorCipher};
//!
//! let cipher = XorCipher;
//! let secret = cipher.encrypt("hello", "key").unwrap();
//! assert_ne!(secret.as_slice(), b"hello");
//! assert_eq!(cipher.decrypt(&secret, "key").as_deref(), Some("hello"));
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod passthrough;
pub mod prelude;
pub mod xor;

pub use passthrough::PassthroughCipher;
pub use xor::XorCipher;

use async_trait::async_trait;

/// Symmetric transformation applied to every payload crossing the backend
/// boundary.
///
/// `encrypt` consumes plaintext and produces the on-disk byte form;
/// `decrypt` reverses it. Both return `None` for empty input (identity on
/// empty), and `decrypt` returns `None` when the bytes cannot be reversed
/// into valid UTF-8 text. The async variants exist for implementations that
/// offload real cryptography; the defaults delegate to the synchronous
/// methods.
#[async_trait]
pub trait Cipher: Send + Sync {
    /// Transform plaintext into its stored byte form.
    fn encrypt(&self, plaintext: &str, key: &str) -> Option<Vec<u8>>;

    /// Reverse stored bytes into plaintext.
    fn decrypt(&self, data: &[u8], key: &str) -> Option<String>;

    /// Asynchronous variant of [`Cipher::encrypt`].
    async fn encrypt_async(&self, plaintext: &str, key: &str) -> Option<Vec<u8>> {
        self.encrypt(plaintext, key)
    }

    /// Asynchronous variant of [`Cipher::decrypt`].
    async fn decrypt_async(&self, data: &[u8], key: &str) -> Option<String> {
        self.decrypt(data, key)
    }
}
