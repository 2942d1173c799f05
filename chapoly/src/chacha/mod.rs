//! The `ChaCha20` Stream Cipher (RFC 8439)

mod key;

pub use key::{Key, KeyRef, GenericKey, KEY_SIZE};

use core::fmt;
use zeroize::Zeroize;
use crate::buf::GenericIv;
use crate::Error;

/// The size of a single keystream block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// The number of 32-bit words in the `ChaCha20` state.
pub const STATE_WORDS: usize = 16;

/// The `"expand 32-byte k"` constant, as little-endian words.
const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Index of the block counter in the state.
const COUNTER: usize = 12;

/// Performs the `ChaCha` quarter round on the words at `a`, `b`, `c` and `d` of `state`.
///
/// ```
/// use chapoly::chacha::quarter_round;
///
/// let mut state = [0u32; 16];
/// state[..4].copy_from_slice(&[0x1111_1111, 0x0102_0304, 0x9b8d_6f43, 0x0123_4567]);
///
/// quarter_round(&mut state, 0, 1, 2, 3);
///
/// assert_eq!(&state[..4], &[0xea2a_92f4, 0xcb1c_f8ce, 0x4581_472e, 0x5881_c4bb]);
/// ```
///
/// # Panics
///
/// If any index is not less than `16`.
#[inline(always)]
pub fn quarter_round(state: &mut [u32; STATE_WORDS], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(7);
}

/// The 20 round `ChaCha` permutation followed by the feed-forward of the input state.
fn block_function(input: &[u32; STATE_WORDS]) -> [u32; STATE_WORDS] {
    let mut working = *input;

    for _ in 0..10 {
        // columns
        quarter_round(&mut working, 0, 4, 8, 12);
        quarter_round(&mut working, 1, 5, 9, 13);
        quarter_round(&mut working, 2, 6, 10, 14);
        quarter_round(&mut working, 3, 7, 11, 15);

        // diagonals
        quarter_round(&mut working, 0, 5, 10, 15);
        quarter_round(&mut working, 1, 6, 11, 12);
        quarter_round(&mut working, 2, 7, 8, 13);
        quarter_round(&mut working, 3, 4, 9, 14);
    }

    for (w, i) in working.iter_mut().zip(input) {
        *w = w.wrapping_add(*i);
    }

    working
}

/// Serializes a block of words into little-endian bytes.
#[inline]
pub fn serialize_block(block: &[u32; STATE_WORDS], out: &mut [u8; BLOCK_SIZE]) {
    for (chunk, word) in out.chunks_exact_mut(4).zip(block) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}

#[inline]
fn xor_in_place(data: &mut [u8], keystream: &[u8]) {
    debug_assert!(data.len() <= keystream.len());
    for (d, k) in data.iter_mut().zip(keystream) {
        *d ^= k;
    }
}

/// The `ChaCha20` Stream Cipher
///
/// # Warning
///
/// `ChaCha20` alone does not ensure that the ciphertext is authentic, unless you have a reason
/// for using this directly, it is generally recommended to use `ChaCha20-Poly1305`.
///
/// # State
///
/// The cipher holds the sixteen word `ChaCha` state, where only the block counter ever changes
/// after construction. Keystream is consumed from the front, and the unused tail of the most
/// recent block is retained so that streaming across multiple calls produces exactly the same
/// output as a single call over the concatenated input.
///
/// The block counter never wraps. Once the counter reaches [`u32::MAX`] every request for
/// further keystream fails with [`Error::CounterOverflow`] and leaves its input untouched.
///
/// # Example
///
/// ```
/// use chapoly::chacha::ChaCha20;
///
/// let mut chacha = ChaCha20::new(&[7u8; 32], [3u8; 12]);
/// let ciphertext = chacha.encrypt_exact(b"hello world").unwrap();
///
/// chacha.reset();
/// let plaintext = chacha.decrypt_exact(&ciphertext).unwrap();
///
/// assert_eq!(b"hello world", &plaintext);
/// ```
pub struct ChaCha20 {
    state: [u32; STATE_WORDS],
    initial_counter: u32,
    keystream: [u8; BLOCK_SIZE],
    /// Bytes of `keystream` already consumed, `BLOCK_SIZE` when nothing is buffered.
    used: usize,
}

impl fmt::Debug for ChaCha20 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ChaCha20")
            .field("counter", &self.counter())
            .finish_non_exhaustive()
    }
}

impl ChaCha20 {
    /// Create a new `ChaCha20` instance with the block counter starting at zero.
    ///
    /// # Arguments
    ///
    /// * `key` - The 256-bit key material.
    /// * `iv` - The 96-bit nonce.
    pub fn new<K: GenericKey, IV: GenericIv>(key: K, iv: IV) -> Self {
        Self::with_counter(key, iv, 0)
    }

    /// Create a new `ChaCha20` instance with the block counter starting at `counter`.
    ///
    /// The `counter` provided here is the value [`reset`] returns to.
    ///
    /// [`reset`]: ChaCha20::reset
    pub fn with_counter<K: GenericKey, IV: GenericIv>(key: K, iv: IV, counter: u32) -> Self {
        let mut state = [0u32; STATE_WORDS];

        state[..4].copy_from_slice(&CONSTANTS);

        for (word, chunk) in state[4..12].iter_mut().zip(key.as_array().chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        state[COUNTER] = counter;

        for (word, chunk) in state[13..].iter_mut().zip(iv.as_array().chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        Self {
            state,
            initial_counter: counter,
            keystream: [0u8; BLOCK_SIZE],
            used: BLOCK_SIZE,
        }
    }

    /// Create a new `ChaCha20` instance from unsized key and nonce material.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKeyLength`] if `key` is not 32 bytes.
    /// - [`Error::InvalidNonceLength`] if `nonce` is not 12 bytes.
    pub fn try_new(key: &[u8], nonce: &[u8], counter: u32) -> Result<Self, Error> {
        let key: &[u8; KEY_SIZE] = key.try_into().map_err(|_| Error::InvalidKeyLength)?;
        let nonce: &[u8; 12] = nonce.try_into().map_err(|_| Error::InvalidNonceLength)?;
        Ok(Self::with_counter(key, nonce, counter))
    }

    /// The counter of the next block which will be generated.
    #[inline]
    pub const fn counter(&self) -> u32 {
        self.state[COUNTER]
    }

    /// The counter this instance was constructed with.
    #[inline]
    pub const fn initial_counter(&self) -> u32 {
        self.initial_counter
    }

    /// The number of full blocks which may still be generated before the counter is exhausted.
    #[inline]
    pub const fn remaining_blocks(&self) -> u32 {
        u32::MAX - self.counter()
    }

    /// Returns `true` if no keystream has been produced since construction or the last
    /// [`reset`].
    ///
    /// [`reset`]: ChaCha20::reset
    #[inline]
    pub const fn is_pristine(&self) -> bool {
        self.counter() == self.initial_counter && self.used == BLOCK_SIZE
    }

    /// Sets the counter back to the value this instance was constructed with, discarding any
    /// buffered keystream. The key and nonce are unchanged.
    pub fn reset(&mut self) {
        self.set_counter(self.initial_counter);
    }

    /// Moves the block counter to `counter`, discarding any buffered keystream.
    pub fn set_counter(&mut self, counter: u32) {
        self.state[COUNTER] = counter;
        self.keystream.zeroize();
        self.used = BLOCK_SIZE;
    }

    /// Generates the next keystream block as words and advances the counter.
    ///
    /// This bypasses the buffered keystream used by the streaming methods, the returned block
    /// is the one at [`counter`] regardless of any partially consumed block.
    ///
    /// # Errors
    ///
    /// [`Error::CounterOverflow`] if the counter is [`u32::MAX`]. Generating that block would
    /// wrap the counter, so no block is produced and the counter is left as is.
    ///
    /// [`counter`]: ChaCha20::counter
    pub fn next_block(&mut self) -> Result<[u32; STATE_WORDS], Error> {
        let counter = self.counter();
        if counter == u32::MAX {
            tracing::warn!(counter, "chacha20 block counter exhausted");
            return Err(Error::CounterOverflow);
        }

        let block = block_function(&self.state);
        self.state[COUNTER] = counter.wrapping_add(1);
        Ok(block)
    }

    /// Computes the block at `counter` without changing any state.
    pub(crate) fn block_at(&self, counter: u32) -> [u32; STATE_WORDS] {
        let mut input = self.state;
        input[COUNTER] = counter;
        let block = block_function(&input);
        input.zeroize();
        block
    }

    /// Replaces the buffered keystream with the next block.
    #[inline]
    fn refill(&mut self) -> Result<(), Error> {
        let mut block = self.next_block()?;
        serialize_block(&block, &mut self.keystream);
        block.zeroize();
        self.used = 0;
        Ok(())
    }

    /// Ensures `len` bytes of keystream can be produced without overflowing the counter.
    pub(crate) fn check_capacity(&self, len: usize) -> Result<(), Error> {
        let buffered = BLOCK_SIZE - self.used;
        if len <= buffered { return Ok(()) }

        let needed = (len - buffered).div_ceil(BLOCK_SIZE) as u64;
        if needed > u64::from(self.remaining_blocks()) {
            tracing::warn!(
                counter = self.counter(),
                requested_blocks = needed,
                "chacha20 request would overflow the block counter"
            );
            return Err(Error::CounterOverflow);
        }

        Ok(())
    }

    /// XORs the keystream into `in_out`. Capacity must already be checked.
    fn xor_keystream(&mut self, in_out: &mut [u8]) -> Result<(), Error> {
        let mut pos = 0usize;

        while pos < in_out.len() {
            if self.used == BLOCK_SIZE { self.refill()?; }

            let take = core::cmp::min(BLOCK_SIZE - self.used, in_out.len() - pos);
            xor_in_place(
                &mut in_out[pos..pos + take],
                &self.keystream[self.used..self.used + take]
            );

            self.used += take;
            pos += take;
        }

        Ok(())
    }

    /// Encrypt / Decrypt `in_out` in place, continuing from wherever the keystream was left.
    ///
    /// Splitting a message across any number of calls produces the same output as a single
    /// call over the whole message.
    ///
    /// # Errors
    ///
    /// [`Error::CounterOverflow`] if the keystream required would wrap the block counter. In
    /// this case `in_out` is not modified.
    pub fn apply_keystream(&mut self, in_out: &mut [u8]) -> Result<(), Error> {
        self.check_capacity(in_out.len())?;
        self.xor_keystream(in_out)
    }

    /// Encrypts `in_out` in place.
    ///
    /// # Errors
    ///
    /// See [`apply_keystream`](ChaCha20::apply_keystream).
    #[inline]
    pub fn encrypt_in_place(&mut self, in_out: &mut [u8]) -> Result<(), Error> {
        self.apply_keystream(in_out)
    }

    /// Decrypts `in_out` in place.
    ///
    /// # Errors
    ///
    /// See [`apply_keystream`](ChaCha20::apply_keystream).
    #[inline]
    pub fn decrypt_in_place(&mut self, in_out: &mut [u8]) -> Result<(), Error> {
        self.apply_keystream(in_out)
    }

    /// Encrypts `input` into `output`.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferSizeMismatch`] if `output` is not the same length as `input`.
    /// - [`Error::CounterOverflow`] see [`apply_keystream`](ChaCha20::apply_keystream).
    pub fn encrypt_into(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        if input.len() != output.len() { return Err(Error::BufferSizeMismatch) }
        self.check_capacity(input.len())?;
        output.copy_from_slice(input);
        self.xor_keystream(output)
    }

    /// Decrypts `input` into `output`.
    ///
    /// # Errors
    ///
    /// See [`encrypt_into`](ChaCha20::encrypt_into).
    #[inline]
    pub fn decrypt_into(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        self.encrypt_into(input, output)
    }

    /// Encrypts whole blocks in place.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferSizeMismatch`] if the length of `in_out` is not a multiple of
    ///   [`BLOCK_SIZE`].
    /// - [`Error::CounterOverflow`] see [`apply_keystream`](ChaCha20::apply_keystream).
    pub fn encrypt_blocks(&mut self, in_out: &mut [u8]) -> Result<(), Error> {
        if in_out.len() % BLOCK_SIZE != 0 { return Err(Error::BufferSizeMismatch) }
        self.apply_keystream(in_out)
    }

    /// Writes raw keystream into `out`, overwriting its contents.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferSizeMismatch`] if the length of `out` is not a multiple of
    ///   [`BLOCK_SIZE`].
    /// - [`Error::CounterOverflow`] see [`apply_keystream`](ChaCha20::apply_keystream).
    pub fn keystream_into(&mut self, out: &mut [u8]) -> Result<(), Error> {
        if out.len() % BLOCK_SIZE != 0 { return Err(Error::BufferSizeMismatch) }
        self.check_capacity(out.len())?;
        out.fill(0);
        self.xor_keystream(out)
    }

    /// Encrypts the plaintext array and returns the ciphertext array.
    ///
    /// # Errors
    ///
    /// See [`apply_keystream`](ChaCha20::apply_keystream).
    #[inline]
    pub fn encrypt_exact<const C: usize>(&mut self, plain: &[u8; C]) -> Result<[u8; C], Error> {
        let mut output = *plain;
        self.apply_keystream(&mut output).map(move |()| output)
    }

    /// Decrypts the ciphertext array and returns the plaintext array.
    ///
    /// # Errors
    ///
    /// See [`apply_keystream`](ChaCha20::apply_keystream).
    #[inline]
    pub fn decrypt_exact<const C: usize>(&mut self, cipher: &[u8; C]) -> Result<[u8; C], Error> {
        self.encrypt_exact(cipher)
    }

    alloc! {
        /// Encrypts the plaintext and returns the ciphertext as a vector.
        ///
        /// # Errors
        ///
        /// See [`apply_keystream`](ChaCha20::apply_keystream).
        pub fn encrypt(&mut self, plain: &[u8]) -> Result<alloc::vec::Vec<u8>, Error> {
            let mut output = plain.to_vec();
            self.apply_keystream(output.as_mut_slice()).map(move |()| output)
        }

        /// Decrypts the ciphertext and returns the plaintext as a vector.
        ///
        /// # Errors
        ///
        /// See [`apply_keystream`](ChaCha20::apply_keystream).
        #[inline]
        pub fn decrypt(&mut self, cipher: &[u8]) -> Result<alloc::vec::Vec<u8>, Error> {
            self.encrypt(cipher)
        }
    }

    std! {
        /// Wraps `writer` so that everything written through it is encrypted first.
        ///
        /// # Type Parameters
        ///
        /// * `CHUNK` - The size of the intermediary buffer stored on the stack in bytes for the
        ///             `write` and `write_all` implementations.
        pub const fn writer<W: io::Write, const CHUNK: usize>(self, writer: W) -> Writer<W, CHUNK> {
            Writer::new(self, writer)
        }

        /// Creates a new `Writer` with a chunk size of 256 bytes.
        pub const fn default_writer<W: io::Write>(self, writer: W) -> Writer<W, 256> {
            Writer::new(self, writer)
        }
    }
}

impl Drop for ChaCha20 {
    fn drop(&mut self) {
        self.state.zeroize();
        self.keystream.zeroize();
    }
}

std! {
    use std::io;

    /// A wrapper for any implementor of `std::io::Write`.
    ///
    /// `Writer` implements `std::io::Write` and takes a child which also implements this trait.
    /// All data passed through the `Writer` is encrypted before it reaches the child.
    pub struct Writer<W, const CHUNK: usize> {
        chacha: ChaCha20,
        writer: W
    }

    impl<W, const CHUNK: usize> Writer<W, CHUNK> {
        const NON_ZERO_CHUNK: () = assert!(CHUNK > 0, "`Writer` requires a non-zero CHUNK");

        /// Creates a new `Writer` instance.
        ///
        /// A `CHUNK` of zero is rejected at compile time.
        ///
        /// ```compile_fail
        /// use chapoly::chacha::{ChaCha20, Writer};
        ///
        /// let _writer = Writer::<_, 0>::new(ChaCha20::new(&[0u8; 32], [0u8; 12]), Vec::new());
        /// ```
        pub const fn new(chacha: ChaCha20, writer: W) -> Self {
            let () = Self::NON_ZERO_CHUNK;
            Self { chacha, writer }
        }

        /// Returns the cipher and the wrapped writer.
        #[inline]
        pub fn finish(self) -> (ChaCha20, W) {
            (self.chacha, self.writer)
        }
    }

    impl<W: io::Write, const CHUNK: usize> io::Write for Writer<W, CHUNK> {
        /// Encrypts and writes at most `CHUNK` bytes of `buf`.
        ///
        /// The encrypted chunk is always written in full, so the keystream never runs ahead
        /// of what the child writer accepted.
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut out = [0u8; CHUNK];
            let to_write = core::cmp::min(CHUNK, buf.len());

            self.chacha.encrypt_into(&buf[..to_write], &mut out[..to_write])
                .map_err(io::Error::other)?;

            self.writer.write_all(&out[..to_write]).map(|()| to_write)
        }

        /// Encrypts and writes the entire buffer.
        fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
            self.chacha.check_capacity(buf.len()).map_err(io::Error::other)?;
            let mut out = [0u8; CHUNK];

            for chunk in buf.chunks(CHUNK) {
                let out = &mut out[..chunk.len()];
                out.copy_from_slice(chunk);
                self.chacha.xor_keystream(out).map_err(io::Error::other)?;
                self.writer.write_all(out)?;
            }

            Ok(())
        }

        #[inline]
        fn flush(&mut self) -> io::Result<()> {
            self.writer.flush()
        }
    }
}


#[cfg(test)]
mod property_tests {
    use crate::test_utils::{AnyList, BoundList};
    use proptest::prelude::*;
    use crate::chacha::{ChaCha20, Key};
    use crate::buf::Nonce;

    use chacha20::cipher::{KeyIvInit, StreamCipher};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(5_000))]

        #[test]
        fn in_place_bijectivity(
            input in any::<BoundList<1024>>(),
            key in any::<Key>(),
            iv in any::<Nonce>()
        ) {
            let mut in_out = input;

            ChaCha20::new(key.as_ref(), iv.copy())
                .encrypt_in_place(in_out.as_mut_slice())
                .unwrap();

            if in_out.len() >= 3 {
                prop_assert_ne!(in_out, input);
            }

            ChaCha20::new(key, iv)
                .decrypt_in_place(in_out.as_mut_slice())
                .unwrap();

            prop_assert_eq!(in_out, input);
        }

        #[test]
        fn enc_into_dec_in_place(
            input in any::<BoundList<1024>>(),
            key in any::<Key>(),
            iv in any::<Nonce>()
        ) {
            let mut enc = input.create_self();

            ChaCha20::new(key.as_ref(), iv.copy())
                .encrypt_into(input.as_slice(), enc.as_mut_slice())
                .unwrap();

            ChaCha20::new(key.as_ref(), iv)
                .decrypt_in_place(enc.as_mut_slice())
                .unwrap();

            prop_assert_eq!(enc, input);
        }

        #[test]
        fn matches_rust_crypto(
            input in any::<BoundList<1024>>(),
            key in any::<[u8; 32]>(),
            iv in any::<[u8; 12]>()
        ) {
            let mut ours = input;
            let mut theirs = input;

            ChaCha20::new(&key, iv).apply_keystream(ours.as_mut_slice()).unwrap();
            chacha20::ChaCha20::new(&key.into(), &iv.into())
                .apply_keystream(theirs.as_mut_slice());

            prop_assert_eq!(ours, theirs);
        }

        #[test]
        fn bijective_arb_updates(
            inputs in any::<AnyList<32, BoundList<128>>>(),
            key in any::<Key>(),
            iv in any::<[u8; 12]>()
        ) {
            let mut chacha = ChaCha20::new(key.as_ref(), &iv);
            let mut streamed = std::vec::Vec::new();

            for input in inputs.as_slice() {
                let mut chunk = *input;
                chacha.apply_keystream(chunk.as_mut_slice()).unwrap();
                streamed.extend_from_slice(chunk.as_slice());
            }

            let expected = inputs.join();
            ChaCha20::new(key, iv)
                .decrypt_in_place(streamed.as_mut_slice())
                .unwrap();

            prop_assert_eq!(streamed, expected);
        }
    }
}
