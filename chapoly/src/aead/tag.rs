use core::fmt;
use crate::ct::ct_eq;

/// Represents the authentication tag for AEADs and MACs
#[must_use = "You must use the tag, or the authenticator is doing nothing for you"]
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct Tag {
    inner: [u8; 16],
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_fmt(format_args!("Tag({:?})", &self.inner))
    }
}

impl Tag {
    /// The size of the authentication tag in bytes.
    pub const CAPACITY: usize = 16;

    /// Creates a new `Tag` instance from a 16-byte array.
    pub const fn new(inner: [u8; Self::CAPACITY]) -> Self {
        Self { inner }
    }

    /// Creates a new `Tag` instance filled with zeros.
    ///
    /// # Example
    ///
    /// ```
    /// use chapoly::aead::Tag;
    ///
    /// let tag = Tag::new_zeroed();
    /// assert_eq!(tag.as_slice(), &[0u8; 16]);
    /// ```
    pub const fn new_zeroed() -> Self {
        Self::new([0u8; Self::CAPACITY])
    }

    /// Consumes the `Tag` and returns the underlying 16-byte array.
    #[inline]
    pub const fn take(self) -> [u8; Self::CAPACITY] {
        self.inner
    }

    /// Returns a reference to the tag as a byte slice.
    pub const fn as_slice(&self) -> &[u8] {
        self.inner.as_slice()
    }

    /// Compares the tag against `other` in constant time.
    ///
    /// # Example
    ///
    /// ```
    /// use chapoly::aead::Tag;
    ///
    /// let tag = Tag::new([3u8; 16]);
    /// assert!(tag.verify(&[3u8; 16]));
    /// assert!(!tag.verify(&[3u8; 15]));
    /// ```
    #[inline]
    #[must_use]
    pub fn verify(&self, other: &[u8]) -> bool {
        ct_eq(self.inner, other)
    }
}

impl From<[u8; Tag::CAPACITY]> for Tag {
    #[inline]
    fn from(value: [u8; Tag::CAPACITY]) -> Self {
        Self::new(value)
    }
}

impl AsRef<[u8]> for Tag {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for Tag {
    /// Constant Time Equivalence
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        ct_eq(self.inner, other.inner)
    }
}

impl Eq for Tag {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_bytewise() {
        let mut other = [9u8; 16];
        assert_eq!(Tag::new([9u8; 16]), Tag::new(other));

        other[15] ^= 0x80;
        assert_ne!(Tag::new([9u8; 16]), Tag::new(other));
    }
}
