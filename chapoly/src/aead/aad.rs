use crate::sealed::AadSealed as Sealed;
use core::fmt;

/// A generic representation of additional authenticated data (AAD)
///
/// Associated data is authenticated but never encrypted. An empty AAD is represented by `()`,
/// `None`, [`AadSlice::EMPTY`] or any empty byte sequence, and contributes nothing (not even
/// padding) to the authenticated stream.
pub trait Aad: Sealed {
    /// Returns the associated data as bytes.
    #[must_use]
    fn as_bytes(&self) -> &[u8];

    /// Returns the length of the associated data in bytes.
    #[inline]
    #[must_use]
    fn size(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    /// Returns `true` if there is no associated data.
    #[inline]
    #[must_use]
    fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Represents Additional Authenticated Data (AAD) Slice.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct AadSlice<'s> {
    inner: Option<&'s [u8]>
}

impl<'s> fmt::Debug for AadSlice<'s> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AadSlice(")
            .and_then(|()| match self.inner {
                None => f.write_str("EMPTY"),
                Some(inner) => <[u8] as fmt::Debug>::fmt(inner, f)
            })
            .and_then(|()| f.write_str(")"))
    }
}

impl<'a> PartialEq<[u8]> for AadSlice<'a> {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl<'s> AadSlice<'s> {
    /// An empty AAD.
    pub const EMPTY: Self = Self { inner: None };

    /// Create a new AAD instance from a byte slice.
    pub const fn new(aad: &'s [u8]) -> Self {
        Self { inner: Some(aad) }
    }

    /// Returns the underlying bytes, empty for [`AadSlice::EMPTY`].
    #[inline]
    pub const fn as_slice(&self) -> &'s [u8] {
        match self.inner {
            Some(inner) => inner,
            None => &[]
        }
    }
}

impl<'a> From<&'a [u8]> for AadSlice<'a> {
    #[inline]
    fn from(value: &'a [u8]) -> Self {
        Self::new(value)
    }
}

impl<'a> Sealed for AadSlice<'a> {}
impl<'a> Aad for AadSlice<'a> {
    #[inline]
    fn as_bytes(&self) -> &[u8] { self.as_slice() }
}

impl<T: ?Sized + Sealed> Sealed for &T {}
impl<T: ?Sized + Aad> Aad for &T {
    #[inline]
    fn as_bytes(&self) -> &[u8] { T::as_bytes(self) }
}

impl<T: ?Sized + Sealed> Sealed for &mut T {}
impl<T: ?Sized + Aad> Aad for &mut T {
    #[inline]
    fn as_bytes(&self) -> &[u8] { T::as_bytes(self) }
}

impl Sealed for [u8] {}
impl Aad for [u8] {
    #[inline]
    fn as_bytes(&self) -> &[u8] { self }
}

impl<const C: usize> Sealed for [u8; C] {}
impl<const C: usize> Aad for [u8; C] {
    #[inline]
    fn as_bytes(&self) -> &[u8] { self.as_slice() }
}

impl Sealed for str {}
impl Aad for str {
    #[inline]
    fn as_bytes(&self) -> &[u8] { str::as_bytes(self) }
}

impl Sealed for () {}
impl Aad for () {
    #[inline]
    fn as_bytes(&self) -> &[u8] { &[] }
}

impl<T: Sealed> Sealed for Option<T> {}
impl<T: Aad> Aad for Option<T> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        match self {
            None => &[],
            Some(inner) => inner.as_bytes()
        }
    }
}

alloc! {
    impl Sealed for alloc::vec::Vec<u8> {}
    impl Aad for alloc::vec::Vec<u8> {
        #[inline]
        fn as_bytes(&self) -> &[u8] { self.as_slice() }
    }

    impl Sealed for alloc::string::String {}
    impl Aad for alloc::string::String {
        #[inline]
        fn as_bytes(&self) -> &[u8] { self.as_str().as_bytes() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_representations() {
        assert!(().is_empty());
        assert!(Option::<&[u8]>::None.is_empty());
        assert!(AadSlice::EMPTY.is_empty());
        assert_eq!(AadSlice::EMPTY, *b"".as_slice());
        assert_eq!(Some(b"abc").size(), 3);
    }

    #[test]
    fn str_and_bytes_agree() {
        assert_eq!("header".as_bytes(), Aad::as_bytes(b"header"));
        assert_eq!(AadSlice::new(b"header").size(), 6);
    }
}
