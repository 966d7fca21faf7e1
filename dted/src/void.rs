//! Void posting handling.
//!
//! DTED marks unmeasured postings with the sentinel [`VOID_VALUE`] (-32767).
//! Every read and interpolation call takes a [`VoidPolicy`] deciding whether
//! the sentinel is passed through untouched or replaced with zero before the
//! value takes part in any further computation.

use serde::{Deserialize, Serialize};

/// Value indicating no data (void) in DTED files.
pub const VOID_VALUE: i16 = -32767;

/// How void postings are treated by a read or interpolation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoidPolicy {
    /// Keep the sentinel value as-is. The caller is responsible for
    /// recognising it; it participates in blending unguarded.
    #[default]
    Preserve,
    /// Replace the sentinel with `0` before it is used.
    ZeroFill,
}

impl VoidPolicy {
    /// Map the boolean `ignore_voids` flag onto a policy.
    pub fn from_ignore_voids(ignore_voids: bool) -> Self {
        if ignore_voids {
            VoidPolicy::ZeroFill
        } else {
            VoidPolicy::Preserve
        }
    }

    /// Returns `true` if sentinels are zero-filled.
    pub fn ignores_voids(&self) -> bool {
        matches!(self, VoidPolicy::ZeroFill)
    }
}

impl From<bool> for VoidPolicy {
    fn from(ignore_voids: bool) -> Self {
        VoidPolicy::from_ignore_voids(ignore_voids)
    }
}

/// A numeric type that can hold an elevation posting.
///
/// Implemented for the integer and float widths postings are commonly widened
/// to, so repair preserves the caller's numeric type.
pub trait Posting: Copy + PartialEq {
    /// The void sentinel expressed in this type.
    const VOID: Self;
    /// Zero in this type.
    const ZERO: Self;
}

macro_rules! impl_posting {
    ($($t:ty => $void:expr, $zero:expr);* $(;)?) => {
        $(impl Posting for $t {
            const VOID: Self = $void;
            const ZERO: Self = $zero;
        })*
    };
}

impl_posting! {
    i16 => VOID_VALUE, 0;
    i32 => VOID_VALUE as i32, 0;
    i64 => VOID_VALUE as i64, 0;
    f32 => VOID_VALUE as f32, 0.0;
    f64 => VOID_VALUE as f64, 0.0;
}

/// Repair a single posting according to `policy`.
///
/// With [`VoidPolicy::ZeroFill`] the sentinel becomes zero; every other value,
/// negative elevations included, is returned unchanged.
///
/// # Examples
///
/// ```
/// use dted::{repair, VoidPolicy, VOID_VALUE};
///
/// assert_eq!(repair(VOID_VALUE, VoidPolicy::Preserve), VOID_VALUE);
/// assert_eq!(repair(VOID_VALUE, VoidPolicy::ZeroFill), 0);
/// assert_eq!(repair(-5i16, VoidPolicy::ZeroFill), -5);
/// ```
#[inline]
pub fn repair<T: Posting>(value: T, policy: VoidPolicy) -> T {
    match policy {
        VoidPolicy::ZeroFill if value == T::VOID => T::ZERO,
        _ => value,
    }
}

/// Repair a slice of postings in place.
pub fn repair_values<T: Posting>(values: &mut [T], policy: VoidPolicy) {
    if policy == VoidPolicy::Preserve {
        return;
    }
    for v in values.iter_mut() {
        *v = repair(*v, policy);
    }
}

/// Return a repaired copy of `values`.
pub fn repaired<T: Posting>(values: &[T], policy: VoidPolicy) -> Vec<T> {
    let mut out = values.to_vec();
    repair_values(&mut out, policy);
    out
}
