//! Authenticated Encryption with Associated Data (AEAD)

mod aad;
mod tag;
pub mod chacha20_poly1305;

pub use aad::{Aad, AadSlice};
pub use tag::Tag;

#[doc(inline)]
pub use chacha20_poly1305::ChaCha20Poly1305;
