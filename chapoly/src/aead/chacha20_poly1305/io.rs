//! Streaming encryption from a [`Source`].
use zeroize::Zeroize;
use crate::aead::chacha20_poly1305::{ChaCha20Poly1305, SCRATCH_SIZE, ALIGN, ensure_unpadded};
use crate::aead::chacha20_poly1305::states::{State, Updating};
use crate::io::{Sink, Source};
use crate::{Error, SessionError};

impl<W: Sink, S: State> ChaCha20Poly1305<W, S> {
    /// Encrypts everything `source` yields, writing the ciphertext to the sink.
    ///
    /// The source is read in whole chunks, so only the final chunk is padded and the resulting
    /// stream is the same as a single [`update`] over all of the source's bytes.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Sink`] if reading the source or writing the sink failed.
    /// - [`Error::CounterOverflow`] if the source outlasts the keystream.
    /// - [`Error::BufferSizeMismatch`] if the source is non-empty and the data encrypted so far
    ///   is not a multiple of 16 bytes.
    ///
    /// Chunks before the failure have already been written.
    ///
    /// # Example
    ///
    /// ```
    /// use chapoly::aead::chacha20_poly1305::ChaCha20Poly1305;
    ///
    /// let mut streamed = Vec::new();
    /// let tag = ChaCha20Poly1305::new(&[1u8; 32], [2u8; 12], &mut streamed)
    ///     .update_from(&b"the quick brown fox"[..]).unwrap()
    ///     .finalize().unwrap();
    ///
    /// let mut direct = Vec::new();
    /// let d_tag = ChaCha20Poly1305::new(&[1u8; 32], [2u8; 12], &mut direct)
    ///     .update(b"the quick brown fox").unwrap()
    ///     .finalize().unwrap();
    ///
    /// assert_eq!(streamed, direct);
    /// assert_eq!(tag, d_tag);
    /// ```
    ///
    /// [`update`]: ChaCha20Poly1305::update
    #[inline]
    pub fn update_from<R>(
        self,
        source: R
    ) -> Result<ChaCha20Poly1305<W, Updating>, SessionError<W::Error>>
        where R: Source<Error = W::Error>
    {
        self.update_from_chunked::<R, SCRATCH_SIZE>(source)
    }

    /// [`update_from`] with a stack buffer of `CHUNK` bytes.
    ///
    /// Only the largest multiple of 16 not exceeding `CHUNK` is used.
    ///
    /// # Errors
    ///
    /// [`Error::BufferSizeMismatch`] if `CHUNK` is less than 16, otherwise see [`update_from`].
    ///
    /// [`update_from`]: ChaCha20Poly1305::update_from
    pub fn update_from_chunked<R, const CHUNK: usize>(
        mut self,
        mut source: R
    ) -> Result<ChaCha20Poly1305<W, Updating>, SessionError<W::Error>>
        where R: Source<Error = W::Error>
    {
        let usable = CHUNK - CHUNK % ALIGN;
        if usable == 0 { return Err(Error::BufferSizeMismatch.into()) }

        let mut buf = [0u8; CHUNK];
        let mut total = 0u64;

        loop {
            let read = source.fill(&mut buf[..usable]).map_err(SessionError::Sink)?;
            if read == 0 { break }
            if total == 0 { ensure_unpadded(self.data_len, read)?; }

            let chunk = &mut buf[..read];
            self.cipher.apply_keystream(chunk)?;
            self.emit_data(chunk)?;
            total += read as u64;

            if read < usable { break }
        }

        buf.zeroize();
        tracing::trace!(len = total, "chacha20-poly1305 data from source");

        Ok(self.with_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    const KEY: [u8; 32] = [0x42; 32];
    const NONCE: [u8; 12] = [0x24; 12];

    fn direct(aad: &[u8], plain: &[u8]) -> (Vec<u8>, crate::aead::Tag) {
        let mut out = Vec::new();
        let tag = ChaCha20Poly1305::new(&KEY, NONCE, &mut out)
            .aad(aad).unwrap()
            .update(plain).unwrap()
            .finalize().unwrap();
        (out, tag)
    }

    #[test]
    fn chunk_sizes_do_not_change_stream() {
        let plain = [0x5au8; 200];
        let expected = direct(b"meta", &plain);

        let mut out = Vec::new();
        let tag = ChaCha20Poly1305::new(&KEY, NONCE, &mut out)
            .aad(b"meta").unwrap()
            .update_from_chunked::<_, 16>(&plain[..]).unwrap()
            .finalize().unwrap();
        assert_eq!((out, tag), expected);

        // 40 rounds down to 32
        let mut out = Vec::new();
        let tag = ChaCha20Poly1305::new(&KEY, NONCE, &mut out)
            .aad(b"meta").unwrap()
            .update_from_chunked::<_, 40>(&plain[..]).unwrap()
            .finalize().unwrap();
        assert_eq!((out, tag), expected);
    }

    #[test]
    fn exact_multiple_of_chunk() {
        let plain = [0x11u8; 64];
        let expected = direct(&[], &plain);

        let mut out = Vec::new();
        let tag = ChaCha20Poly1305::new(&KEY, NONCE, &mut out)
            .update_from_chunked::<_, 32>(&plain[..]).unwrap()
            .finalize().unwrap();

        assert_eq!((out, tag), expected);
    }

    #[test]
    fn empty_source() {
        let expected = direct(&[], &[]);

        let mut out = Vec::new();
        let tag = ChaCha20Poly1305::new(&KEY, NONCE, &mut out)
            .update_from(&[0u8; 0][..]).unwrap()
            .finalize().unwrap();

        assert_eq!((out, tag), expected);
    }

    #[test]
    fn source_after_padded_update_is_rejected() {
        let res = ChaCha20Poly1305::new(&KEY, NONCE, Vec::new())
            .update(&[1u8; 3]).unwrap()
            .update_from(&[2u8; 16][..]);

        assert_eq!(res.unwrap_err().crypto(), Some(Error::BufferSizeMismatch));

        // an exhausted source adds nothing
        let expected = direct(&[], &[1u8; 3]);
        let mut out = Vec::new();
        let tag = ChaCha20Poly1305::new(&KEY, NONCE, &mut out)
            .update(&[1u8; 3]).unwrap()
            .update_from(&[0u8; 0][..]).unwrap()
            .finalize().unwrap();
        assert_eq!((out, tag), expected);
    }

    #[test]
    fn chunk_too_small() {
        let res = ChaCha20Poly1305::new(&KEY, NONCE, Vec::new())
            .update_from_chunked::<_, 15>(&[1u8; 4][..]);

        assert_eq!(
            res.unwrap_err().crypto(),
            Some(Error::BufferSizeMismatch)
        );
    }
}
