//! The `Poly1305` one-time Message Authentication Code (RFC 8439)
//!
//! Arithmetic modulo 2^130 - 5 uses five 26-bit limbs with 64-bit products, all carries are
//! propagated explicitly and the final reduction selects between `h` and `h - p` with a mask
//! rather than a branch.

mod key;

pub use key::{GenericKey, Key, KeyRef, KEY_SIZE};

use zeroize::Zeroize;
use crate::aead::Tag;
use crate::chacha::{self, ChaCha20};
use crate::Error;

/// The size of a `Poly1305` block in bytes.
pub const BLOCK_SIZE: usize = 16;

const MASK26: u32 = 0x03ff_ffff;

#[inline(always)]
const fn load_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

/// Accumulator, clamped multiplier, additive key and the pending partial block.
struct State {
    r: [u32; 5],
    s: [u32; 4],
    h: [u32; 5],
    buffer: [u8; BLOCK_SIZE],
    buffer_len: usize
}

impl State {
    fn new(key: &[u8; KEY_SIZE]) -> Self {
        // clamp: r &= 0x0ffffffc0ffffffc0ffffffc0fffffff
        let t0 = load_le(key, 0) & 0x0fff_ffff;
        let t1 = load_le(key, 4) & 0x0fff_fffc;
        let t2 = load_le(key, 8) & 0x0fff_fffc;
        let t3 = load_le(key, 12) & 0x0fff_fffc;

        Self {
            r: [
                t0 & MASK26,
                ((t0 >> 26) | (t1 << 6)) & MASK26,
                ((t1 >> 20) | (t2 << 12)) & MASK26,
                ((t2 >> 14) | (t3 << 18)) & MASK26,
                t3 >> 8,
            ],
            s: [load_le(key, 16), load_le(key, 20), load_le(key, 24), load_le(key, 28)],
            h: [0; 5],
            buffer: [0; BLOCK_SIZE],
            buffer_len: 0
        }
    }

    /// `h = ((h + block) * r) mod (2^130 - 5)`, `hibit` is `1 << 24` for full blocks.
    fn process_block(&mut self, block: &[u8], hibit: u32) {
        let t0 = load_le(block, 0);
        let t1 = load_le(block, 4);
        let t2 = load_le(block, 8);
        let t3 = load_le(block, 12);

        let h0 = u64::from(self.h[0] + (t0 & MASK26));
        let h1 = u64::from(self.h[1] + (((t0 >> 26) | (t1 << 6)) & MASK26));
        let h2 = u64::from(self.h[2] + (((t1 >> 20) | (t2 << 12)) & MASK26));
        let h3 = u64::from(self.h[3] + (((t2 >> 14) | (t3 << 18)) & MASK26));
        let h4 = u64::from(self.h[4] + ((t3 >> 8) | hibit));

        let [r0, r1, r2, r3, r4] = self.r.map(u64::from);

        // 2^130 = 5 (mod p)
        let s1 = r1 * 5;
        let s2 = r2 * 5;
        let s3 = r3 * 5;
        let s4 = r4 * 5;

        let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
        let mut d1 = h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
        let mut d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
        let mut d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
        let mut d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        let mut c = d0 >> 26;
        self.h[0] = (d0 as u32) & MASK26;
        d1 += c;
        c = d1 >> 26;
        self.h[1] = (d1 as u32) & MASK26;
        d2 += c;
        c = d2 >> 26;
        self.h[2] = (d2 as u32) & MASK26;
        d3 += c;
        c = d3 >> 26;
        self.h[3] = (d3 as u32) & MASK26;
        d4 += c;
        c = d4 >> 26;
        self.h[4] = (d4 as u32) & MASK26;

        self.h[0] += (c * 5) as u32;
        let c = self.h[0] >> 26;
        self.h[0] &= MASK26;
        self.h[1] += c;
    }

    fn absorb(&mut self, mut data: &[u8]) {
        if self.buffer_len != 0 {
            let take = core::cmp::min(BLOCK_SIZE - self.buffer_len, data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];

            if self.buffer_len < BLOCK_SIZE { return }

            let block = self.buffer;
            self.process_block(&block, 1 << 24);
            self.buffer_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            self.process_block(block, 1 << 24);
        }

        let rem = blocks.remainder();
        self.buffer[..rem.len()].copy_from_slice(rem);
        self.buffer_len = rem.len();
    }

    fn finish(&mut self) -> Tag {
        if self.buffer_len != 0 {
            // the final partial block is `len + 1` bytes wide, so no hibit
            let mut block = [0u8; BLOCK_SIZE];
            block[..self.buffer_len].copy_from_slice(&self.buffer[..self.buffer_len]);
            block[self.buffer_len] = 1;
            self.process_block(&block, 0);
            block.zeroize();
            self.buffer_len = 0;
        }

        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;

        let mut c = h1 >> 26;
        h1 &= MASK26;
        h2 += c;
        c = h2 >> 26;
        h2 &= MASK26;
        h3 += c;
        c = h3 >> 26;
        h3 &= MASK26;
        h4 += c;
        c = h4 >> 26;
        h4 &= MASK26;
        h0 += c * 5;
        c = h0 >> 26;
        h0 &= MASK26;
        h1 += c;

        // g = h + 5 - 2^130
        let mut g0 = h0 + 5;
        c = g0 >> 26;
        g0 &= MASK26;
        let mut g1 = h1 + c;
        c = g1 >> 26;
        g1 &= MASK26;
        let mut g2 = h2 + c;
        c = g2 >> 26;
        g2 &= MASK26;
        let mut g3 = h3 + c;
        c = g3 >> 26;
        g3 &= MASK26;
        let mut g4 = (h4 + c).wrapping_sub(1 << 26);

        // all ones when g did not borrow, meaning h >= p
        let mask = (g4 >> 31).wrapping_sub(1);
        g0 &= mask;
        g1 &= mask;
        g2 &= mask;
        g3 &= mask;
        g4 &= mask;
        let keep = !mask;
        h0 = (h0 & keep) | g0;
        h1 = (h1 & keep) | g1;
        h2 = (h2 & keep) | g2;
        h3 = (h3 & keep) | g3;
        h4 = (h4 & keep) | g4;

        // h mod 2^128
        let words = [
            h0 | (h1 << 26),
            (h1 >> 6) | (h2 << 20),
            (h2 >> 12) | (h3 << 14),
            (h3 >> 18) | (h4 << 8),
        ];

        let mut out = [0u8; Tag::CAPACITY];
        let mut f = 0u64;

        for ((chunk, word), s) in out.chunks_exact_mut(4).zip(words).zip(self.s) {
            f = u64::from(word) + u64::from(s) + (f >> 32);
            chunk.copy_from_slice(&(f as u32).to_le_bytes());
        }

        Tag::new(out)
    }
}

impl Drop for State {
    fn drop(&mut self) {
        self.r.zeroize();
        self.s.zeroize();
        self.h.zeroize();
        self.buffer.zeroize();
    }
}

/// The `Poly1305` Message Authentication Code (MAC)
///
/// Every key must only be used for a single message. `finalize` and `mac` take ownership, so a
/// finished instance can never be updated or finalized a second time.
///
/// # Example
///
/// ```
/// use chapoly::mac::{Poly1305, poly1305::Key};
///
/// let key: Key = [7u8; 32].into();
///
/// let tag = Poly1305::new(key.as_ref())
///     .update(b"hello world")
///     .update(b", how are you")
///     .finalize();
///
/// let o_tag = Poly1305::new(key.as_ref())
///     .mac(b"hello world, how are you");
///
/// assert_eq!(tag, o_tag);
/// ```
pub struct Poly1305 {
    state: State
}

opaque_dbg! { Poly1305 }

impl Poly1305 {
    /// Creates a new `Poly1305` instance with the provided one-time key.
    ///
    /// The first half of the key is clamped to form the multiplier `r`, the second half is used
    /// unmodified as `s`.
    pub fn new<K: GenericKey>(key: K) -> Self {
        Self { state: State::new(key.as_array()) }
    }

    /// Derives the one-time key from the first 32 bytes of the next keystream block of
    /// `cipher`.
    ///
    /// This consumes that block, so subsequent encryption with `cipher` starts at the following
    /// counter.
    ///
    /// # Errors
    ///
    /// - [`Error::KeystreamConsumed`] if `cipher` has already produced keystream since
    ///   construction or its last reset. Its pending block may have encrypted data, and a MAC
    ///   key derived from it would be known to anyone holding that ciphertext and plaintext.
    /// - [`Error::CounterOverflow`] if `cipher` has no blocks remaining.
    ///
    /// # Example
    ///
    /// ```
    /// use chapoly::{chacha::ChaCha20, mac::Poly1305};
    ///
    /// let mut cipher = ChaCha20::new(&[1u8; 32], [2u8; 12]);
    /// let _tag = Poly1305::from_cipher(&mut cipher).unwrap().mac(b"message");
    ///
    /// assert_eq!(cipher.counter(), 1);
    /// assert!(Poly1305::from_cipher(&mut cipher).is_err());
    /// ```
    pub fn from_cipher(cipher: &mut ChaCha20) -> Result<Self, Error> {
        if !cipher.is_pristine() {
            tracing::debug!(
                counter = cipher.counter(),
                "refusing to derive poly1305 key from consumed keystream"
            );
            return Err(Error::KeystreamConsumed);
        }

        let mut words = cipher.next_block()?;
        Ok(Self::from_block(&mut words))
    }

    /// Keys a new instance with the first 32 bytes of a serialized keystream block, zeroing
    /// `words` afterward.
    pub(crate) fn from_block(words: &mut [u32; chacha::STATE_WORDS]) -> Self {
        let mut block = [0u8; chacha::BLOCK_SIZE];
        chacha::serialize_block(words, &mut block);

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&block[..KEY_SIZE]);
        let this = Self::new(&key);

        words.zeroize();
        block.zeroize();
        key.zeroize();

        this
    }

    /// Computes the tag of `input` in a single step.
    #[inline]
    pub fn mac(mut self, input: &[u8]) -> Tag {
        self.state.absorb(input);
        self.state.finish()
    }

    /// Begins a streaming computation with `input`.
    #[inline]
    pub fn update(self, input: &[u8]) -> StreamPoly1305 {
        StreamPoly1305::from(self).update(input)
    }
}

/// A `Poly1305` computation in progress.
///
/// Input is buffered to whole blocks internally, so the chunk boundaries of successive updates
/// do not affect the resulting tag.
pub struct StreamPoly1305 {
    state: State
}

opaque_dbg! { StreamPoly1305 }

impl From<Poly1305> for StreamPoly1305 {
    #[inline]
    fn from(value: Poly1305) -> Self {
        Self { state: value.state }
    }
}

impl StreamPoly1305 {
    /// Absorbs `input`.
    #[inline]
    pub fn update(mut self, input: &[u8]) -> Self {
        self.state.absorb(input);
        self
    }

    /// Absorbs `input` without taking ownership.
    #[inline]
    pub fn update_mut(&mut self, input: &[u8]) {
        self.state.absorb(input);
    }

    /// Completes the computation, returning the tag and consuming the instance.
    #[inline]
    pub fn finalize(mut self) -> Tag {
        self.state.finish()
    }
}
