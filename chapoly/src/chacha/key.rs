//! 256-bit `ChaCha20` keys.
use crate::sealed::Sealed;
use crate::Error;
use zeroize::Zeroize;

/// The size of a `ChaCha20` key in bytes.
pub const KEY_SIZE: usize = 32;

/// Types which may be used as a `ChaCha20` key.
///
/// This trait is sealed, it is implemented for [`Key`], [`KeyRef`], and references to
/// 32-byte arrays.
pub trait GenericKey : Sealed {
    #[doc(hidden)]
    fn as_array(&self) -> &[u8; KEY_SIZE];
}

/// An owned 256-bit key, zeroed from memory when dropped.
#[must_use]
#[derive(Clone)]
#[repr(transparent)]
pub struct Key {
    inner: [u8; KEY_SIZE]
}

arb_key! { struct Key::new([u8; 32]) }

impl Key {
    /// Creates a new `Key` from a 32-byte array.
    #[inline]
    pub const fn new(inner: [u8; KEY_SIZE]) -> Self {
        Self { inner }
    }

    /// Borrows the key as a [`KeyRef`].
    #[inline]
    pub const fn as_ref(&self) -> KeyRef {
        KeyRef::new(&self.inner)
    }

    /// Returns the raw key material.
    #[inline]
    pub const fn as_slice(&self) -> &[u8] {
        self.inner.as_slice()
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

/// A borrowed 256-bit key.
#[must_use]
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct KeyRef<'r> {
    inner: &'r [u8; KEY_SIZE]
}

impl<'r> KeyRef<'r> {
    /// Creates a new `KeyRef` from a reference to a 32-byte array.
    #[inline]
    pub const fn new(inner: &'r [u8; KEY_SIZE]) -> Self {
        Self { inner }
    }

    /// Creates an owned copy of the key.
    #[inline]
    pub const fn copy(&self) -> Key {
        Key::new(*self.inner)
    }
}

opaque_dbg! { KeyRef<'r> }

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
