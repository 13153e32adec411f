//! Delta codec for numeric sequences.
//!
//! The first value is kept verbatim and every following value is replaced by
//! its difference from the predecessor. Works on any copyable type with
//! subtraction and addition, so the same kernels serve `Decimal` coordinates,
//! `i64` epochs and `f64` statistics input.

use std::ops::{Add, Sub};

use num_traits::{CheckedAdd, CheckedSub};

/// Delta-encodes `data` in place.
///
/// Walks backwards so every subtraction still sees the original predecessor.
pub fn encode_in_place<T>(data: &mut [T])
where
    T: Copy + Sub<Output = T>,
{
    for i in (1..data.len()).rev() {
        data[i] = data[i] - data[i - 1];
    }
}

/// Reverses [`encode_in_place`] (running sum).
///
/// Walks forwards so every addition builds on the already decoded value.
pub fn decode_in_place<T>(data: &mut [T])
where
    T: Copy + Add<Output = T>,
{
    for i in 1..data.len() {
        data[i] = data[i] + data[i - 1];
    }
}

/// Returns the delta-encoded copy of `values`.
///
/// # Examples
/// ```text
/// [10, 20, 30, 25]  ->  [10, 10, 10, -5]
/// [7]               ->  [7]
/// []                ->  []
/// ```
pub fn encode<T>(values: &[T]) -> Vec<T>
where
    T: Copy + Sub<Output = T>,
{
    let mut data = values.to_vec();
    encode_in_place(&mut data);
    data
}

/// Returns the delta-decoded copy of `values`.
///
/// # Examples
/// ```text
/// [10, 10, 10, -5]  ->  [10, 20, 30, 25]
/// ```
pub fn decode<T>(values: &[T]) -> Vec<T>
where
    T: Copy + Add<Output = T>,
{
    let mut data = values.to_vec();
    decode_in_place(&mut data);
    data
}

/// Like [`encode`], but `None` when a difference overflows `T`.
pub fn checked_encode<T>(values: &[T]) -> Option<Vec<T>>
where
    T: Copy + CheckedSub,
{
    let mut data = values.to_vec();
    for i in (1..data.len()).rev() {
        data[i] = data[i].checked_sub(&data[i - 1])?;
    }
    Some(data)
}

/// Like [`decode_in_place`], but `None` when a running sum overflows `T`.
/// `data` is left partially decoded in that case.
pub fn checked_decode_in_place<T>(data: &mut [T]) -> Option<()>
where
    T: Copy + CheckedAdd,
{
    for i in 1..data.len() {
        data[i] = data[i].checked_add(&data[i - 1])?;
    }
    Some(())
}
