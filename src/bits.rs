//! Fixed-width field helpers shared by the encoder and decoder.

use num_traits::{PrimInt, Signed};

/// All-ones value of the low `bits` bits.
pub fn mask<T: PrimInt>(bits: u32) -> T {
    let width = T::zero().count_zeros();
    if bits >= width {
        !T::zero()
    } else {
        (T::one() << bits as usize) - T::one()
    }
}

/// Inclusive range of an n-bit two's-complement field: `[-2^(n-1), 2^(n-1)-1]`.
/// A zero-width field holds only 0.
pub fn signed_bounds<T: PrimInt + Signed>(bits: u32) -> (T, T) {
    if bits == 0 {
        return (T::zero(), T::zero());
    }
    let max = mask::<T>(bits - 1);
    (-max - T::one(), max)
}

pub fn fits_signed<T: PrimInt + Signed>(value: T, bits: u32) -> bool {
    let (lo, hi) = signed_bounds::<T>(bits);
    value >= lo && value <= hi
}

pub fn twos_complement(value: i64, bits: u32) -> u16 {
    (value as u16) & mask::<u16>(bits)
}

pub fn sign_extend(raw: u16, bits: u32) -> i16 {
    let s = 16 - bits;
    ((raw << s) as i16) >> s
}

/// Places `value` (masked to `bits`) at `shift`.
pub fn pack(value: u16, shift: u32, bits: u32) -> u16 {
    (value & mask::<u16>(bits)) << shift
}

pub fn field(word: u16, shift: u32, bits: u32) -> u16 {
    (word >> shift) & mask::<u16>(bits)
}
