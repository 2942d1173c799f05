//! One-time keys for the `Poly1305` MAC.
//!
//! The first half of a key is the multiplier `r`, which is clamped on use, and the second half
//! is the additive component `s`. A key must only ever authenticate a single message.

use zeroize::Zeroize;
use crate::sealed::Sealed;
use crate::Error;

/// The size of the Poly1305 key in bytes.
pub const KEY_SIZE: usize = 32;

/// A sealed trait for generic key types used in Poly1305.
///
/// This trait is sealed and cannot be implemented outside of this crate.
pub trait GenericKey : Sealed {
    #[doc(hidden)]
    fn as_array(&self) -> &[u8; KEY_SIZE];
}

/// Represents a 32-byte one-time key for `Poly1305`.
///
/// The key material is zeroed from memory when dropped.
#[repr(transparent)]
#[derive(Clone)]
pub struct Key {
    inner: [u8; KEY_SIZE]
}

arb_key! { struct Key::new([u8; 32]) }

impl Key {
    /// Creates a new `Key` from a 32-byte array.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chapoly::mac::poly1305::Key;
    ///
    /// let key = Key::new([0u8; 32]);
    /// # drop(key);
    /// ```
    #[inline]
    pub const fn new(inner: [u8; KEY_SIZE]) -> Self {
        Self { inner }
    }

    /// Returns a [`KeyRef`] borrowing this key.
    #[inline]
    pub const fn as_ref(&self) -> KeyRef {
        KeyRef::new(&self.inner)
    }
}

opaque_dbg! { Key }

impl Zeroize for Key {
    #[inline]
    fn zeroize(&mut self) {
        self.inner.zeroize();
    }
}

impl Drop for Key {
    #[inline]
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl From<[u8; KEY_SIZE]> for Key {
    #[inline]
    fn from(value: [u8; KEY_SIZE]) -> Self {
        Self::new(value)
    }
}

impl<'s> TryFrom<&'s [u8]> for Key {
    type Error = Error;

    /// # Errors
    ///
    /// [`Error::InvalidKeyLength`] if `value` is not exactly 32 bytes.
    #[inline]
    fn try_from(value: &'s [u8]) -> Result<Self, Self::Error> {
        KeyRef::try_from(value).map(|key| key.copy())
    }
}

impl Sealed for Key {}
impl GenericKey for Key {
    #[inline]
    fn as_array(&self) -> &[u8; KEY_SIZE] {
        &self.inner
    }
}

/// A borrowed `Poly1305` key.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct KeyRef<'r> {
    inner: &'r [u8; KEY_SIZE]
}

impl<'r> KeyRef<'r> {
    /// Creates a new `KeyRef` from a reference to a 32-byte array.
    #[inline]
    pub const fn new(inner: &'r [u8; KEY_SIZE]) -> Self {
        Self { inner }
    }

    /// Copies the referenced material into an owned [`Key`].
    #[inline]
    pub const fn copy(&self) -> Key {
        Key::new(*self.inner)
    }
}

opaque_dbg! { KeyRef<'r> }

impl<'r> Sealed for KeyRef<'r> {}
impl<'r> GenericKey for KeyRef<'r> {
    #[inline]
    fn as_array(&self) -> &[u8; KEY_SIZE] {
        self.inner
    }
}

impl<'r> GenericKey for &'r [u8; KEY_SIZE] {
    #[inline]
    fn as_array(&self) -> &[u8; KEY_SIZE] {
        *self
    }
}

impl<'r> From<&'r [u8; KEY_SIZE]> for KeyRef<'r> {
    #[inline]
    fn from(value: &'r [u8; KEY_SIZE]) -> Self {
        Self::new(value)
    }
}

impl<'r> TryFrom<&'r [u8]> for KeyRef<'r> {
    type Error = Error;

    /// # Errors
    ///
    /// [`Error::InvalidKeyLength`] if `value` is not exactly 32 bytes.
    #[inline]
    fn try_from(value: &'r [u8]) -> Result<Self, Self::Error> {
        value.try_into().map(Self::new).map_err(|_| Error::InvalidKeyLength)
    }
}
