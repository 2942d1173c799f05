use core::fmt;

/// The ways in which a cipher, authenticator, or AEAD operation can fail.
///
/// None of the variants carry data. In cryptographic contexts the reason for a failure should
/// reveal as little as possible, so `Display` only writes the name of the variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Error {
    /// The provided key was not exactly 32 bytes.
    InvalidKeyLength,
    /// The provided nonce was not exactly 12 bytes.
    InvalidNonceLength,
    /// Producing the requested keystream would wrap the 32-bit block counter.
    ///
    /// This is fatal, continuing would reuse keystream under the same key and nonce.
    CounterOverflow,
    /// The computed authentication tag did not match the expected tag.
    TagMismatch,
    /// A buffer did not have the size the operation requires.
    BufferSizeMismatch,
    /// `Poly1305` key derivation was requested from a `ChaCha20` instance which already
    /// produced keystream.
    KeystreamConsumed,
}

impl Error {
    /// Returns the name of the error variant.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidKeyLength => "InvalidKeyLength",
            Self::InvalidNonceLength => "InvalidNonceLength",
            Self::CounterOverflow => "CounterOverflow",
            Self::TagMismatch => "TagMismatch",
            Self::BufferSizeMismatch => "BufferSizeMismatch",
            Self::KeystreamConsumed => "KeystreamConsumed",
        }
    }
}

impl fmt::Display for Error {
    /// Writes the name of the variant to the formatter.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

std! { impl std::error::Error for Error {} }

/// An error from an AEAD session which writes to a [`Sink`].
///
/// Failures of the sink are propagated unchanged, the session never retries a write.
///
/// [`Sink`]: crate::io::Sink
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionError<E> {
    /// The cryptographic operation failed.
    Crypto(Error),
    /// The sink rejected a write, or the source of a streaming update failed to read.
    Sink(E),
}

impl<E> SessionError<E> {
    /// Returns the cryptographic error, if this was not a sink failure.
    #[inline]
    pub const fn crypto(&self) -> Option<Error> {
        match self {
            Self::Crypto(err) => Some(*err),
            Self::Sink(_) => None,
        }
    }
}

impl SessionError<core::convert::Infallible> {
    /// Returns the cryptographic error of a session whose sink cannot fail.
    #[inline]
    pub const fn into_crypto(self) -> Error {
        match self {
            Self::Crypto(err) => err,
            Self::Sink(never) => match never {},
        }
    }
}

impl<E> From<Error> for SessionError<E> {
    #[inline]
    fn from(value: Error) -> Self {
        Self::Crypto(value)
    }
}

impl<E: fmt::Display> fmt::Display for SessionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Crypto(err) => fmt::Display::fmt(err, f),
            Self::Sink(err) => f.write_fmt(format_args!("Sink({err})")),
        }
    }
}

std! {
    impl<E: std::error::Error + 'static> std::error::Error for SessionError<E> {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::Crypto(err) => Some(err),
                Self::Sink(err) => Some(err),
            }
        }
    }
}
