//! # Region Canonicalization
//!
//! Sorting, merging and usable-region extraction. All passes are pure and
//! operate on fixed-capacity storage.
//!
//! Merging ignores region kinds: any region starting at or before the end of
//! its predecessor is folded into it. This keeps the merged list bounded by
//! the raw list for any input, but a usable region can absorb the bookkeeping
//! of a differently-typed neighbor it overlaps or touches.

use crate::region::{MergedRegionList, RawRegion, RegionList, UsableRegion};
use kernel_memory_addresses::PhysicalAddress;

/// Stable in-place sort by start address.
///
/// Insertion sort: region lists are tiny and this needs no scratch space.
pub fn sort_by_start(regions: &mut [RawRegion]) {
    for i in 1..regions.len() {
        let mut j = i;
        while j > 0 && regions[j - 1].start > regions[j].start {
            regions.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Coalesce a start-sorted slice in one left-to-right pass.
///
/// A region is folded into its predecessor when `current.start <= previous.end`;
/// the predecessor keeps its kind and grows to the larger end.
#[must_use]
pub fn merge<const N: usize>(sorted: &[RawRegion]) -> RegionList<N> {
    let mut out = RegionList::<N>::new();
    for region in sorted {
        if let Some(last) = out.last_mut()
            && region.start <= last.end
        {
            last.end = last.end.max(region.end);
            continue;
        }
        out.push(*region);
    }
    out
}

/// Sort and merge a raw region list.
#[must_use]
pub fn canonicalize<const N: usize>(raw: &RegionList<N>) -> MergedRegionList<N> {
    let mut sorted = raw.clone();
    sort_by_start(sorted.as_mut_slice());
    MergedRegionList::from_merged(merge(sorted.as_slice()))
}

/// Write the usable entries of `merged` into `out`, clipped to start at `floor`.
///
/// Entries ending at or below `floor` are dropped. At most `out.len()` entries
/// are written, in the order of `merged`; returns the number written.
pub fn extract_usable(merged: &[RawRegion], floor: PhysicalAddress, out: &mut [UsableRegion]) -> usize {
    let mut count = 0;
    for region in merged.iter().filter(|r| r.kind.is_usable()) {
        if region.end <= floor {
            continue;
        }
        if count == out.len() {
            log::warn!("usable region output full; ignoring {region} and beyond");
            break;
        }
        let start = region.start.max(floor);
        out[count] = UsableRegion::new(start, region.end.as_u64() - start.as_u64());
        count += 1;
    }
    count
}
