//! Byte sinks and sources used by the streaming AEAD.
//!
//! With the `std` feature every [`std::io::Write`] is a [`Sink`] and every [`std::io::Read`] is
//! a [`Source`]. Without `std`, the `embedded-io` feature provides the same for
//! `embedded_io::Write` and `embedded_io::Read`. Errors from either side are carried through
//! unchanged, nothing here retries.

/// An append-only destination for bytes.
pub trait Sink {
    /// The error the sink may fail with.
    type Error;

    /// Writes the entirety of `buf`.
    ///
    /// # Errors
    ///
    /// Whatever the underlying sink fails with.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
}

/// A source of bytes for streaming encryption.
pub trait Source {
    /// The error the source may fail with.
    type Error;

    /// Reads at most `buf.len()` bytes into `buf`, returning how many were read. `0` signals the
    /// end of the source.
    ///
    /// # Errors
    ///
    /// Whatever the underlying source fails with.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Reads until `buf` is full or the source is exhausted, returning how many bytes were read.
    ///
    /// # Errors
    ///
    /// Whatever the underlying source fails with.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.read(&mut buf[filled..])? {
                0 => break,
                read => filled += read
            }
        }

        Ok(filled)
    }
}

std! {
    use std::io;

    impl<W: io::Write + ?Sized> Sink for W {
        type Error = io::Error;

        #[inline]
        fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            io::Write::write_all(self, buf)
        }
    }

    impl<R: io::Read + ?Sized> Source for R {
        type Error = io::Error;

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            loop {
                match io::Read::read(self, buf) {
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    res => return res
                }
            }
        }
    }
}

no_std_io! {
    use embedded_io as eio;

    impl<W: eio::Write + ?Sized> Sink for W {
        type Error = W::Error;

        #[inline]
        fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            eio::Write::write_all(self, buf)
        }
    }

    impl<R: eio::Read + ?Sized> Source for R {
        type Error = R::Error;

        #[inline]
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            eio::Read::read(self, buf)
        }
    }
}

#[cfg(not(any(feature = "std", feature = "embedded-io")))]
mod bare {
    use super::{Sink, Source};
    use core::convert::Infallible;

    impl<S: Sink + ?Sized> Sink for &mut S {
        type Error = S::Error;

        #[inline]
        fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            S::write_all(self, buf)
        }
    }

    impl<'a> Source for &'a [u8] {
        type Error = Infallible;

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let amount = core::cmp::min(buf.len(), self.len());
            let (head, tail) = self.split_at(amount);
            buf[..amount].copy_from_slice(head);
            *self = tail;
            Ok(amount)
        }
    }

    #[cfg(feature = "alloc")]
    impl Sink for alloc::vec::Vec<u8> {
        type Error = Infallible;

        #[inline]
        fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            self.extend_from_slice(buf);
            Ok(())
        }
    }
}

/// Appends everything written to a vector, never failing.
#[cfg(feature = "alloc")]
pub(crate) struct VecSink<'v>(pub(crate) &'v mut alloc::vec::Vec<u8>);

#[cfg(feature = "alloc")]
impl<'v> Sink for VecSink<'v> {
    type Error = core::convert::Infallible;

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.0.extend_from_slice(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most three bytes per read.
    struct Trickle<'a>(&'a [u8]);

    impl<'a> Source for Trickle<'a> {
        type Error = ();

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let amount = buf.len().min(self.0.len()).min(3);
            buf[..amount].copy_from_slice(&self.0[..amount]);
            self.0 = &self.0[amount..];
            Ok(amount)
        }
    }

    #[test]
    fn fill_handles_short_reads() {
        let mut source = Trickle(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut buf = [0u8; 5];

        assert_eq!(source.fill(&mut buf), Ok(5));
        assert_eq!(buf, [1, 2, 3, 4, 5]);
        assert_eq!(source.fill(&mut buf), Ok(3));
        assert_eq!(source.fill(&mut buf), Ok(0));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn vec_sink_appends() {
        let mut out = std::vec::Vec::new();
        let mut sink = VecSink(&mut out);
        assert!(Sink::write_all(&mut sink, b"abc").is_ok());
        assert!(Sink::write_all(&mut sink, b"def").is_ok());
        assert_eq!(out, b"abcdef");
    }
}
