//! One bit per allocation unit over borrowed byte storage. A set bit means
//! the unit is unavailable, whether allocated or structurally reserved.

use crate::MapInvalid;
use bitvec::prelude::{BitSlice, Lsb0};
use core::ops::Range;

pub struct UnitBitmap<'a> {
    bits: &'a mut BitSlice<u8, Lsb0>,
}

impl<'a> UnitBitmap<'a> {
    /// Take the first `units.div_ceil(8)` bytes of `storage` and mark every unit used.
    ///
    /// # Errors
    /// [`MapInvalid::StorageTooSmall`] if `storage` cannot hold `units` bits.
    pub fn new(storage: &'a mut [u8], units: usize) -> Result<Self, MapInvalid> {
        let required = units.div_ceil(8);
        let available = storage.len();
        let storage = storage
            .get_mut(..required)
            .ok_or(MapInvalid::StorageTooSmall {
                required,
                available,
            })?;

        // Padding bits past `units` stay outside the slice and are never handed out.
        let bits = &mut BitSlice::<u8, Lsb0>::from_slice_mut(storage)[..units];
        bits.fill(true);
        Ok(Self { bits })
    }

    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Set bit `index` to `value` and return its previous value.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    pub fn replace(&mut self, index: usize, value: bool) -> bool {
        self.bits.replace(index, value)
    }

    /// Lowest clear bit.
    #[inline]
    #[must_use]
    pub fn first_clear(&self) -> Option<usize> {
        self.bits.first_zero()
    }

    /// Clear all bits in `range`; returns how many were set before.
    pub fn clear_range(&mut self, range: Range<usize>) -> usize {
        let span = &mut self.bits[range];
        let changed = span.count_ones();
        span.fill(false);
        changed
    }

    /// Set all bits in `range`; returns how many were clear before.
    pub fn set_range(&mut self, range: Range<usize>) -> usize {
        let span = &mut self.bits[range];
        let changed = span.count_zeros();
        span.fill(true);
        changed
    }
}
