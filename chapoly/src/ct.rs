//! Constant-Time Comparison Utilities
//!
//! Authentication tags are compared with these functions so that the time taken to reject a
//! forged tag does not depend on how many of its leading bytes were correct.

#[inline(always)]
fn volatile(byte: u8) -> u8 {
    // SAFETY: reading a local through a valid reference.
    unsafe { core::ptr::read_volatile(&byte) }
}

/// Returns the high bit of `xor | -xor`, which is set iff `xor` is non-zero.
#[inline(always)]
fn eq_hsb(xor: u8) -> u8 {
    // The volatile read keeps LLVM from folding this back into a compare and select.
    volatile(xor | volatile(xor.wrapping_neg())) >> 7
}

/// Compares two bytes in constant-time.
///
/// # Returns
///
/// * `0`: `a != b`
/// * `1`: `a == b`
#[inline(always)]
#[must_use]
pub fn byte_eq(a: u8, b: u8) -> u8 {
    eq_hsb(b ^ a) ^ volatile(1)
}

/// Compare two slices in constant-time.
///
/// # Note
///
/// If the length of slice `a` and slice `b` are not equivalent, this will exit early. In short,
/// there is variable timing on length comparisons. Lengths are public for every caller in this
/// crate.
///
/// # Returns
///
/// * `0`: `a != b`
/// * `1`: `a == b`
#[must_use]
pub fn cmp_slice(a: &[u8], b: &[u8]) -> u8 {
    if a.len() != b.len() { return 0 }

    let mut res = volatile(1u8);

    for (left, right) in a.iter().zip(b) {
        res &= byte_eq(*left, *right);
    }

    res
}

/// Compare two byte sequences in constant-time.
///
/// # Arguments
///
/// The two arguments being compared in constant-time, both of these arguments must implement
/// `AsRef<[u8]>` (such as `&str`, `&[u8]` itself, etc.)
///
/// # Warning
///
/// Constant-time programming is nuanced, this is a *best-effort* constant-time equivalence
/// check. There is no guarantee of constant-time properties across all existing hardware.
///
/// # Returns
///
/// `true` if `a == b`, `false` otherwise.
#[must_use]
pub fn ct_eq<A: AsRef<[u8]>, B: AsRef<[u8]>>(a: A, b: B) -> bool {
    cmp_slice(a.as_ref(), b.as_ref()) != 0
}
