//! Session states for [`ChaCha20Poly1305`].
//!
//! A session starts [`Fresh`]. Providing associated data moves it to [`Associating`], where
//! more associated data may follow. Providing data from either moves it to [`Updating`], after
//! which only data may follow. Any state may be finalized, only a [`Fresh`] session may decrypt.
//!
//! [`ChaCha20Poly1305`]: super::ChaCha20Poly1305
use crate::sealed::Sealed;

/// A state of the AEAD session.
pub trait State: Sealed {}

define_state! {
    /// Nothing has been authenticated yet.
    Fresh,
    /// Only associated data has been authenticated.
    Associating,
    /// Data has been encrypted, no further associated data may follow.
    Updating,
}

/// States in which associated data may still be provided.
pub trait CanSetAad: State {}

impl CanSetAad for Fresh {}
impl CanSetAad for Associating {}
