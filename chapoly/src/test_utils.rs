//! Arbitrary bounded buffers for property tests.
use core::fmt;
use core::ops;
use proptest::arbitrary::{any, Arbitrary};
use proptest::array;
use proptest::num::u8::Any;
use proptest::strategy::{BoxedStrategy, Strategy};

/// A stack allocated byte list with an arbitrary length no greater than `C`.
#[derive(Clone, Copy)]
pub struct BoundList<const C: usize> {
    inner: [u8; C],
    len: usize
}

impl<const C: usize> fmt::Debug for BoundList<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dbg = f.debug_struct("BoundList");
        dbg.field("len", &self.len());

        if C <= 32 {
            dbg.field("inner", &self.as_slice());
        }

        dbg.finish()
    }
}

impl<const C: usize> Default for BoundList<C> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> BoundList<C> {
    pub const fn new_with_unchecked(inner: [u8; C], len: usize) -> Self {
        Self { inner, len }
    }

    #[inline]
    pub const fn new_zeroes_unchecked(len: usize) -> Self {
        Self::new_with_unchecked([0u8; C], len)
    }

    #[inline]
    pub const fn new() -> Self {
        Self::new_zeroes_unchecked(0)
    }

    #[inline]
    #[track_caller]
    pub fn new_zeroes(len: usize) -> Self {
        assert!(len <= C, "New zeroes provided len greater than capacity");
        Self::new_zeroes_unchecked(len)
    }

    /// A zeroed list of the same length as `self`.
    #[inline]
    pub const fn create_self(&self) -> Self {
        Self::new_zeroes_unchecked(self.len)
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[track_caller]
    #[inline]
    pub fn new_from_slice(slice: &[u8]) -> Self {
        assert!(slice.len() <= C, "Attempted to create `BoundList` from slice too large");
        let mut buf = [0u8; C];
        buf[..slice.len()].copy_from_slice(slice);

        Self::new_with_unchecked(buf, slice.len())
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.inner[..self.len]
    }
}

impl<const C: usize> PartialEq for BoundList<C> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const C: usize> ops::Deref for BoundList<C> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<const C: usize> ops::DerefMut for BoundList<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<const C: usize> Arbitrary for BoundList<C> {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (0..=C, array::uniform::<Any, C>(any::<u8>()))
            .prop_map(|(len, buf)| BoundList::new_with_unchecked(buf, len))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

/// A list of up to `C` arbitrary `T`s, used to model arbitrary chunk boundaries.
#[derive(Clone, Copy)]
pub struct AnyList<const C: usize, T: Copy + Default> {
    inner: [T; C],
    len: usize
}

impl<const C: usize, T: fmt::Debug + Copy + Default> fmt::Debug for AnyList<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AnyList").field("len", &self.len()).finish()
    }
}

impl<const C: usize, T: Copy + Default> AnyList<C, T> {
    pub fn new_with_slice(slice: &[T]) -> Self {
        debug_assert!(slice.len() <= C);

        let mut inner = [T::default(); C];
        inner[..slice.len()].copy_from_slice(slice);

        Self { inner, len: slice.len() }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.inner[..self.len]
    }
}

impl<const C: usize, const B: usize> AnyList<C, BoundList<B>> {
    /// Concatenates every list, in order.
    pub fn join(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((C * B) / 2);

        for e in self.as_slice() {
            out.extend_from_slice(e.as_slice());
        }

        out
    }
}

impl<const C: usize, T> Arbitrary for AnyList<C, T>
    where
        T: Arbitrary + Copy + Default + 'static,
        <T as Arbitrary>::Strategy: 'static
{
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (0..=C, array::uniform::<<T as Arbitrary>::Strategy, C>(any::<T>()))
            .prop_map(|(len, buf)| Self::new_with_slice(&buf.as_slice()[..len]))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
