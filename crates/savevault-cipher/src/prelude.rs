//! Prelude module for convenient cipher imports.

pub use crate::{Cipher, PassthroughCipher, XorCipher};
