//! Nonces and the traits used to accept them generically.
use zeroize::Zeroize;
use core::convert::TryFrom;
use crate::Error;

/// The size of a `ChaCha20` nonce in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// A trait for types that can be used as a 96-bit nonce.
pub trait GenericIv {
    /// Returns a reference to the nonce bytes.
    fn as_array(&self) -> &[u8; NONCE_SIZE];

    /// Returns a reference to the nonce as a byte slice.
    #[inline]
    fn as_slice(&self) -> &[u8] {
        self.as_array().as_slice()
    }
}

/// A 96-bit nonce.
///
/// A nonce must never repeat for a given key. Generating nonces and enforcing their uniqueness
/// is the caller's responsibility.
#[repr(transparent)]
#[cfg_attr(test, derive(Debug))]
pub struct Nonce {
    inner: [u8; NONCE_SIZE]
}

impl Nonce {
    /// Creates a new nonce.
    pub const fn new(inner: [u8; NONCE_SIZE]) -> Self {
        Self { inner }
    }

    /// Returns a reference to the nonce as a slice.
    #[inline]
    pub const fn slice(&self) -> &[u8] {
        self.inner.as_slice()
    }

    /// Zeros out the contents of the nonce.
    #[inline]
    pub fn zero(&mut self) {
        self.inner.zeroize();
    }

    /// Creates a copy of the nonce.
    ///
    /// This type purposefully does not derive the `Copy` trait, to ensure that nonce reuse is
    /// explicit.
    #[inline]
    #[must_use]
    pub const fn copy(&self) -> Self {
        Self::new(self.inner)
    }
}

impl GenericIv for Nonce {
    #[inline]
    fn as_array(&self) -> &[u8; NONCE_SIZE] {
        &self.inner
    }
}

impl From<[u8; NONCE_SIZE]> for Nonce {
    fn from(value: [u8; NONCE_SIZE]) -> Self {
        Self::new(value)
    }
}

impl<'s> From<&'s [u8; NONCE_SIZE]> for Nonce {
    fn from(value: &'s [u8; NONCE_SIZE]) -> Self {
        Self::new(*value)
    }
}

impl<'s> TryFrom<&'s [u8]> for Nonce {
    type Error = Error;

    /// # Errors
    ///
    /// [`Error::InvalidNonceLength`] if `value` is not exactly 12 bytes.
    fn try_from(value: &'s [u8]) -> Result<Self, Self::Error> {
        match value.try_into() {
            Ok(res) => Ok(Self::new(res)),
            Err(_) => Err(Error::InvalidNonceLength)
        }
    }
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for Nonce {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::strategy::Strategy as _;
        proptest::arbitrary::any::<[u8; NONCE_SIZE]>().prop_map(Nonce::new).boxed()
    }

    type Strategy = proptest::prelude::BoxedStrategy<Self>;
}

impl<'r> GenericIv for &'r [u8; NONCE_SIZE] {
    #[inline]
    fn as_array(&self) -> &[u8; NONCE_SIZE] {
        *self
    }
}

impl GenericIv for [u8; NONCE_SIZE] {
    #[inline]
    fn as_array(&self) -> &[u8; NONCE_SIZE] {
        self
    }
}

impl<'r> GenericIv for &'r Nonce {
    #[inline]
    fn as_array(&self) -> &[u8; NONCE_SIZE] {
        &self.inner
    }
}
