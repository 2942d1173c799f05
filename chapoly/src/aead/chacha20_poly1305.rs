//! The `ChaCha20-Poly1305` AEAD (RFC 8439) over a padded output stream.
//!
//! A session writes everything it authenticates to a [`Sink`], producing the stream
//!
//! ```text
//! pad16(aad) || pad16(ciphertext) || le64(aad_len) || le64(ciphertext_len)
//! ```
//!
//! where `pad16` appends zeros up to the next multiple of 16 bytes (nothing if already aligned,
//! or empty). The tag is the `Poly1305` MAC of exactly this stream, keyed with the first half of
//! keystream block zero. It is returned separately and never written to the sink.
//!
//! Each call to [`aad`] or [`update`] pads its own remainder, so only the final call of each
//! kind may have a length which is not a multiple of 16. Once a call has been padded, a further
//! non-empty call of the same kind fails with [`Error::BufferSizeMismatch`] before anything is
//! written, keeping every stream decryptable with [`decrypt`].
//!
//! [`aad`]: ChaCha20Poly1305::aad
//! [`update`]: ChaCha20Poly1305::update
//! [`decrypt`]: ChaCha20Poly1305::decrypt

pub mod states;
mod io;

use core::fmt;
use core::marker::PhantomData;
use zeroize::Zeroize;

use states::{State, CanSetAad};

#[doc(inline)]
pub use states::{Fresh, Associating, Updating};

pub use crate::chacha::{Key, KeyRef, GenericKey, KEY_SIZE};

use crate::aead::{Aad, Tag};
use crate::buf::{GenericIv, Nonce};
use crate::chacha::ChaCha20;
use crate::io::Sink;
use crate::mac::poly1305::{Poly1305, StreamPoly1305};
use crate::{Error, SessionError};

/// Alignment of every segment of the output stream.
const ALIGN: usize = 16;

/// Size of the trailing length footer.
pub const FOOTER_SIZE: usize = 16;

/// Size of the stack scratch buffer used by [`ChaCha20Poly1305::update`].
const SCRATCH_SIZE: usize = 256;

/// Rounds `len` up to the next multiple of 16.
#[inline]
const fn pad16(len: u64) -> Option<u64> {
    match len.checked_add(15) {
        Some(len) => Some(len & !15),
        None => None
    }
}

/// The length of the stream a session produces for the given AAD and data lengths.
///
/// Returns `None` if the length is not representable as a `usize`.
///
/// # Example
///
/// ```
/// use chapoly::aead::chacha20_poly1305::sealed_len;
///
/// assert_eq!(sealed_len(0, 0), Some(16));
/// assert_eq!(sealed_len(12, 114), Some(16 + 128 + 16));
/// assert_eq!(sealed_len(32, 16), Some(32 + 16 + 16));
/// ```
#[must_use]
pub const fn sealed_len(aad_len: usize, data_len: usize) -> Option<usize> {
    let aad = match aad_len.checked_add(15) {
        Some(len) => len & !15,
        None => return None
    };
    let data = match data_len.checked_add(15) {
        Some(len) => len & !15,
        None => return None
    };

    match aad.checked_add(data) {
        Some(body) => body.checked_add(FOOTER_SIZE),
        None => None
    }
}

/// Writes `data` to the sink and the MAC, zero padding any remainder to a whole block.
fn write_aligned<W: Sink>(
    sink: &mut W,
    mac: &mut StreamPoly1305,
    data: &[u8]
) -> Result<(), W::Error> {
    let aligned = data.len() & !(ALIGN - 1);
    let (head, rem) = data.split_at(aligned);

    if !head.is_empty() {
        sink.write_all(head)?;
        mac.update_mut(head);
    }

    if !rem.is_empty() {
        let mut block = [0u8; ALIGN];
        block[..rem.len()].copy_from_slice(rem);
        sink.write_all(&block)?;
        mac.update_mut(&block);
    }

    Ok(())
}

/// Reads the footer and checks it describes a buffer of exactly `buffer.len()` bytes.
fn parse_footer(buffer: &[u8]) -> Result<(usize, usize), Error> {
    let body = buffer.len() - FOOTER_SIZE;

    let mut aad_len = [0u8; 8];
    let mut data_len = [0u8; 8];
    aad_len.copy_from_slice(&buffer[body..body + 8]);
    data_len.copy_from_slice(&buffer[body + 8..]);

    let aad_len = u64::from_le_bytes(aad_len);
    let data_len = u64::from_le_bytes(data_len);

    let expected = match (pad16(aad_len), pad16(data_len)) {
        (Some(aad), Some(data)) => aad.checked_add(data),
        _ => None
    };

    if expected != Some(body as u64) {
        return Err(Error::BufferSizeMismatch);
    }

    // both are bounded by `body`
    Ok((aad_len as usize, data_len as usize))
}

/// The `ChaCha20-Poly1305` Authenticated Encryption with Associated Data (AEAD) session.
///
/// # Type Parameters
///
/// * `W` - The [`Sink`] the authenticated stream is written to.
/// * `S` - The [state](states) of the session, this ensures associated data is never provided
///   after data.
///
/// # Example
///
/// ```
/// use chapoly::aead::chacha20_poly1305::{ChaCha20Poly1305, Key};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (key, nonce) = (Key::new([7u8; 32]), [42u8; 12]);
///
/// let mut stream = Vec::new();
/// let tag = ChaCha20Poly1305::new(key.as_ref(), nonce, &mut stream)
///     .aad(b"header")?
///     .update(b"hello world")?
///     .finalize()?;
///
/// assert_eq!(stream.len(), 16 + 16 + 16);
///
/// let mut plain = Vec::new();
/// let aad = ChaCha20Poly1305::new(key, nonce, &mut plain)
///     .decrypt(stream.as_mut_slice(), tag)?;
///
/// assert_eq!(aad, b"header");
/// assert_eq!(plain, b"hello world");
/// # Ok(()) }
/// ```
#[must_use]
pub struct ChaCha20Poly1305<W, S: State = Fresh> {
    cipher: ChaCha20,
    mac: StreamPoly1305,
    aad_len: u64,
    data_len: u64,
    sink: W,
    _state: PhantomData<S>
}

/// Fails if a previous segment of `len` bytes was padded and `next` bytes would follow it.
#[inline]
fn ensure_unpadded(len: u64, next: usize) -> Result<(), Error> {
    if next != 0 && len % ALIGN as u64 != 0 {
        tracing::debug!(len, next, "chacha20-poly1305 segment after padding");
        return Err(Error::BufferSizeMismatch);
    }
    Ok(())
}

impl<W, S: State> fmt::Debug for ChaCha20Poly1305<W, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ChaCha20Poly1305")
            .field("aad_len", &self.aad_len)
            .field("data_len", &self.data_len)
            .finish_non_exhaustive()
    }
}

impl<W: Sink> ChaCha20Poly1305<W, Fresh> {
    /// Creates a new session writing to `sink`.
    ///
    /// The one-time `Poly1305` key is taken from keystream block zero, encryption starts at
    /// block one.
    pub fn new<K: GenericKey, IV: GenericIv>(key: K, iv: IV, sink: W) -> Self {
        let cipher = ChaCha20::with_counter(key, iv, 1);
        let mac = StreamPoly1305::from(Poly1305::from_block(&mut cipher.block_at(0)));

        tracing::debug!("chacha20-poly1305 session created");

        Self {
            cipher,
            mac,
            aad_len: 0,
            data_len: 0,
            sink,
            _state: PhantomData
        }
    }

    /// Creates a new session from unsized key and nonce material.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKeyLength`] if `key` is not 32 bytes.
    /// - [`Error::InvalidNonceLength`] if `iv` is not 12 bytes.
    pub fn try_new(key: &[u8], iv: &[u8], sink: W) -> Result<Self, Error> {
        let key = KeyRef::try_from(key)?;
        let iv = Nonce::try_from(iv)?;
        Ok(Self::new(key, iv, sink))
    }

    /// Verifies and decrypts a stream produced by a session with the same key and nonce.
    ///
    /// The tag is checked over the entirety of `buffer` before anything else. Only once it
    /// matches is the footer trusted, the ciphertext decrypted in place and the plaintext
    /// written to the sink.
    ///
    /// # Returns
    ///
    /// The associated data, without padding.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferSizeMismatch`] if `buffer` is not a non-zero multiple of 16 bytes, or if
    ///   its authenticated footer does not describe its length.
    /// - [`Error::TagMismatch`] if `tag` is not the tag of `buffer`. Nothing is decrypted or
    ///   written.
    /// - [`SessionError::Sink`] if writing the plaintext failed.
    pub fn decrypt<'b>(
        self,
        buffer: &'b mut [u8],
        tag: Tag
    ) -> Result<&'b [u8], SessionError<W::Error>> {
        let len = buffer.len();
        if len < FOOTER_SIZE || len % ALIGN != 0 {
            return Err(Error::BufferSizeMismatch.into());
        }

        let Self { mut cipher, mac, mut sink, .. } = self;

        if mac.update(buffer).finalize() != tag {
            tracing::warn!(len, "chacha20-poly1305 tag mismatch");
            return Err(Error::TagMismatch.into());
        }

        let (aad_len, data_len) = parse_footer(buffer)?;

        // `aad_len` is bounded by the buffer, so its padded length is as well
        let data_start = (aad_len + ALIGN - 1) & !(ALIGN - 1);
        let (head, tail) = buffer.split_at_mut(data_start);
        let plain = &mut tail[..data_len];

        cipher.apply_keystream(plain)?;
        sink.write_all(plain).map_err(SessionError::Sink)?;

        tracing::debug!(aad_len, data_len, "chacha20-poly1305 stream decrypted");

        let head: &'b [u8] = head;
        Ok(&head[..aad_len])
    }
}

impl<W, S: State> ChaCha20Poly1305<W, S> {
    #[inline]
    fn with_state<N: State>(self) -> ChaCha20Poly1305<W, N> {
        ChaCha20Poly1305 {
            cipher: self.cipher,
            mac: self.mac,
            aad_len: self.aad_len,
            data_len: self.data_len,
            sink: self.sink,
            _state: PhantomData
        }
    }

    /// The number of bytes of associated data provided so far.
    #[inline]
    pub const fn aad_len(&self) -> u64 {
        self.aad_len
    }

    /// The number of bytes of data encrypted so far.
    #[inline]
    pub const fn data_len(&self) -> u64 {
        self.data_len
    }
}

impl<W: Sink, S: CanSetAad> ChaCha20Poly1305<W, S> {
    /// Authenticates `aad` and writes it, padded, to the sink.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferSizeMismatch`] if `aad` is non-empty and the associated data provided
    ///   so far is not a multiple of 16 bytes, nothing is written.
    /// - [`SessionError::Sink`] if the sink failed.
    ///
    /// Either way the session is lost.
    pub fn aad<A: Aad>(
        mut self,
        aad: A
    ) -> Result<ChaCha20Poly1305<W, Associating>, SessionError<W::Error>> {
        let bytes = aad.as_bytes();
        tracing::trace!(len = bytes.len(), "chacha20-poly1305 aad");
        ensure_unpadded(self.aad_len, bytes.len())?;

        write_aligned(&mut self.sink, &mut self.mac, bytes).map_err(SessionError::Sink)?;
        self.aad_len += bytes.len() as u64;

        Ok(self.with_state())
    }
}

impl<W: Sink, S: State> ChaCha20Poly1305<W, S> {
    /// Writes freshly encrypted `ciphertext` through the alignment primitive.
    fn emit_data(&mut self, ciphertext: &[u8]) -> Result<(), SessionError<W::Error>> {
        write_aligned(&mut self.sink, &mut self.mac, ciphertext).map_err(SessionError::Sink)?;
        self.data_len += ciphertext.len() as u64;
        Ok(())
    }

    /// Encrypts `data` in place and writes the ciphertext, padded, to the sink.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferSizeMismatch`] if `data` is non-empty and the data encrypted so far is
    ///   not a multiple of 16 bytes.
    /// - [`Error::CounterOverflow`] if `data` would exhaust the keystream.
    /// - [`SessionError::Sink`] if the sink failed.
    ///
    /// `data` is left unmodified by the first two. Either way the session is lost.
    pub fn update_in_place(
        mut self,
        data: &mut [u8]
    ) -> Result<ChaCha20Poly1305<W, Updating>, SessionError<W::Error>> {
        tracing::trace!(len = data.len(), "chacha20-poly1305 data");
        ensure_unpadded(self.data_len, data.len())?;

        self.cipher.apply_keystream(data)?;
        self.emit_data(data)?;

        Ok(self.with_state())
    }

    /// Encrypts `data` and writes the ciphertext, padded, to the sink.
    ///
    /// The ciphertext is produced in a stack buffer, only the final partial block of `data` is
    /// padded.
    ///
    /// # Errors
    ///
    /// See [`update_in_place`](Self::update_in_place). Both are detected before anything is
    /// written.
    pub fn update(
        mut self,
        data: &[u8]
    ) -> Result<ChaCha20Poly1305<W, Updating>, SessionError<W::Error>> {
        tracing::trace!(len = data.len(), "chacha20-poly1305 data");
        ensure_unpadded(self.data_len, data.len())?;
        self.cipher.check_capacity(data.len())?;

        let mut scratch = [0u8; SCRATCH_SIZE];

        for chunk in data.chunks(SCRATCH_SIZE) {
            let out = &mut scratch[..chunk.len()];
            self.cipher.encrypt_into(chunk, out)?;
            self.emit_data(out)?;
        }

        scratch.zeroize();
        Ok(self.with_state())
    }

    /// Writes the length footer and returns the tag, consuming the session.
    ///
    /// # Errors
    ///
    /// [`SessionError::Sink`] if the footer could not be written.
    #[inline]
    pub fn finalize(self) -> Result<Tag, SessionError<W::Error>> {
        self.finish().map(|(tag, _)| tag)
    }

    /// Writes the length footer, returning the tag and the sink.
    ///
    /// # Errors
    ///
    /// [`SessionError::Sink`] if the footer could not be written.
    pub fn finish(mut self) -> Result<(Tag, W), SessionError<W::Error>> {
        let mut footer = [0u8; FOOTER_SIZE];
        footer[..8].copy_from_slice(&self.aad_len.to_le_bytes());
        footer[8..].copy_from_slice(&self.data_len.to_le_bytes());

        write_aligned(&mut self.sink, &mut self.mac, &footer).map_err(SessionError::Sink)?;

        tracing::debug!(
            aad_len = self.aad_len,
            data_len = self.data_len,
            "chacha20-poly1305 session finalized"
        );

        let Self { mac, sink, .. } = self;
        Ok((mac.finalize(), sink))
    }
}

/// Encrypts `plain` with `aad` in a single session, writing the stream to `sink`.
///
/// # Errors
///
/// See [`ChaCha20Poly1305::update`] and [`ChaCha20Poly1305::finalize`].
pub fn encrypt<K, IV, A, W>(
    key: K, iv: IV,
    aad: A, plain: &[u8],
    sink: W
) -> Result<Tag, SessionError<W::Error>>
    where
        K: GenericKey,
        IV: GenericIv,
        A: Aad,
        W: Sink
{
    ChaCha20Poly1305::new(key, iv, sink)
        .aad(aad)?
        .update(plain)?
        .finalize()
}

/// Verifies and decrypts `buffer` in a single session, writing the plaintext to `sink`.
///
/// # Errors
///
/// See [`ChaCha20Poly1305::decrypt`].
pub fn decrypt<'b, K, IV, W>(
    key: K, iv: IV,
    buffer: &'b mut [u8], tag: Tag,
    sink: W
) -> Result<&'b [u8], SessionError<W::Error>>
    where
        K: GenericKey,
        IV: GenericIv,
        W: Sink
{
    ChaCha20Poly1305::new(key, iv, sink).decrypt(buffer, tag)
}

alloc! {
    use crate::io::VecSink;
    use alloc::vec::Vec;

    /// Encrypts `plain` with `aad`, returning the stream and its tag.
    ///
    /// # Errors
    ///
    /// [`Error::CounterOverflow`] if `plain` exceeds the keystream available under one nonce.
    ///
    /// # Example
    ///
    /// ```
    /// use chapoly::aead::chacha20_poly1305::{seal_to_vec, open_to_vec};
    ///
    /// let (mut stream, tag) = seal_to_vec(&[3u8; 32], [9u8; 12], "id=7", b"secret").unwrap();
    /// let (aad, plain) = open_to_vec(&[3u8; 32], [9u8; 12], &mut stream, tag).unwrap();
    ///
    /// assert_eq!(aad, b"id=7");
    /// assert_eq!(plain, b"secret");
    /// ```
    pub fn seal_to_vec<K, IV, A>(
        key: K, iv: IV,
        aad: A, plain: &[u8]
    ) -> Result<(Vec<u8>, Tag), Error>
        where
            K: GenericKey,
            IV: GenericIv,
            A: Aad
    {
        let mut out = Vec::with_capacity(
            sealed_len(aad.as_bytes().len(), plain.len()).unwrap_or_default()
        );
        let tag = encrypt(key, iv, aad, plain, VecSink(&mut out))
            .map_err(SessionError::into_crypto)?;

        Ok((out, tag))
    }

    /// Verifies and decrypts `buffer`, returning the associated data and the plaintext.
    ///
    /// # Errors
    ///
    /// See [`ChaCha20Poly1305::decrypt`].
    pub fn open_to_vec<'b, K, IV>(
        key: K, iv: IV,
        buffer: &'b mut [u8], tag: Tag
    ) -> Result<(&'b [u8], Vec<u8>), Error>
        where
            K: GenericKey,
            IV: GenericIv
    {
        let mut plain = Vec::new();
        let aad = decrypt(key, iv, buffer, tag, VecSink(&mut plain))
            .map_err(SessionError::into_crypto)?;

        Ok((aad, plain))
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::test_utils::BoundList;
    use proptest::prelude::*;
    use std::vec::Vec;

    use chacha20poly1305::aead::{AeadInPlace, KeyInit};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(5_000))]

        #[test]
        fn bijectivity(
            input in any::<BoundList<1024>>(),
            aad in any::<BoundList<64>>(),
            key in any::<Key>(),
            iv in any::<Nonce>()
        ) {
            let mut stream = Vec::new();
            let tag = encrypt(
                key.as_ref(), iv.copy(),
                aad.as_slice(), input.as_slice(),
                &mut stream
            ).unwrap();

            prop_assert_eq!(Some(stream.len()), sealed_len(aad.len(), input.len()));

            let mut plain = Vec::new();
            let d_aad = decrypt(key, iv, stream.as_mut_slice(), tag, &mut plain).unwrap();

            prop_assert_eq!(d_aad, aad.as_slice());
            prop_assert_eq!(plain.as_slice(), input.as_slice());
        }

        #[test]
        fn matches_rust_crypto(
            input in any::<BoundList<1024>>(),
            aad in any::<BoundList<64>>(),
            key in any::<[u8; 32]>(),
            iv in any::<[u8; 12]>()
        ) {
            let mut stream = Vec::new();
            let tag = encrypt(&key, iv, aad.as_slice(), input.as_slice(), &mut stream).unwrap();

            let mut theirs = input;
            let their_tag = chacha20poly1305::ChaCha20Poly1305::new(
                chacha20poly1305::Key::from_slice(&key)
            )
                .encrypt_in_place_detached(
                    chacha20poly1305::Nonce::from_slice(&iv),
                    aad.as_slice(),
                    theirs.as_mut_slice()
                )
                .unwrap();

            let start = (aad.len() + 15) & !15;
            prop_assert_eq!(&stream[start..start + input.len()], theirs.as_slice());
            prop_assert_eq!(tag.as_slice(), their_tag.as_slice());
        }
    }
}
