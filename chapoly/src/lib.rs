//! `ChaCha20`, `Poly1305` and the `ChaCha20-Poly1305` AEAD (RFC 8439) in pure Rust.
//!
//! - [`chacha`]: the `ChaCha20` stream cipher.
//! - [`mac::poly1305`]: the `Poly1305` one-time authenticator.
//! - [`aead::chacha20_poly1305`]: the AEAD session, writing a padded authenticated stream to a
//!   [`Sink`](io::Sink).
//!
//! # Features
//!
//! - `std` (default): `std::io` sinks and sources, `std::error::Error` impls.
//! - `alloc`: `Vec` returning conveniences.
//! - `embedded-io`: `embedded_io` sinks and sources for `no_std` targets.
//!
//! Diagnostics are emitted through `tracing` and never include key material, keystream, data, or
//! tags.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(
    clippy::pedantic,
    clippy::nursery,
    clippy::all
)]
// limb arithmetic truncates on purpose
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// keys and nonces are taken by value so they can be moved in and zeroed
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::inline_always)]
// constant-time bitwise hacks
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::many_single_char_names)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

#[macro_use]
mod macros;

mod sealed;
mod error;
pub mod buf;
pub mod ct;
pub mod io;

pub mod chacha;
pub mod mac;
pub mod aead;

#[cfg(test)]
mod test_utils;

pub use error::{Error, SessionError};
