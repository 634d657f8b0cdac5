mod common;

use common::{InfoBuilder, legacy_info};
use kernel_bootmap::{BootMemoryMap, MapSource, ParseError, RegionKind, UsableRegion, parse};
use kernel_memory_addresses::{MIB, PhysicalAddress};

fn usable(info: &[u8]) -> Vec<UsableRegion> {
    let mut out = [UsableRegion::EMPTY; 32];
    let n = parse(Some(info), &mut out);
    out[..n].to_vec()
}

fn assert_canonical(regions: &[UsableRegion]) {
    for r in regions {
        assert!(r.addr.as_u64() >= MIB, "{r} starts below 1 MiB");
        assert!(r.len > 0, "{r} is empty");
    }
    for pair in regions.windows(2) {
        assert!(pair[0].end() <= pair[1].addr, "{} overlaps {}", pair[0], pair[1]);
    }
}

#[test]
fn typical_pc_map_single_usable_region() {
    let info = InfoBuilder::new()
        .mmap(&[
            (0x0, 0x9_FC00, 2),
            (0x10_0000, 0x7EF_0000, 1),
            (0xFFFC_0000, 0x4_0000, 2),
        ])
        .build();

    let regions = usable(&info);
    assert_eq!(
        regions,
        vec![UsableRegion::new(PhysicalAddress::new(0x10_0000), 0x7EF_0000)]
    );
}

#[test]
fn zero_total_size_yields_nothing() {
    let mut info = InfoBuilder::new().mmap(&[(0x10_0000, 0x100_0000, 1)]).build();
    info[0..4].copy_from_slice(&0u32.to_le_bytes());

    assert!(usable(&info).is_empty());
    assert_eq!(BootMemoryMap::parse(&info).err(), Some(ParseError::EmptyStream));
}

#[test]
fn missing_info_yields_nothing() {
    let mut out = [UsableRegion::EMPTY; 4];
    assert_eq!(parse(None, &mut out), 0);
    assert_eq!(parse(Some(&[1u8, 2, 3][..]), &mut out), 0);
}

#[test]
fn legacy_fallback_synthesizes_region_above_one_mib() {
    let info = legacy_info(0x1, 639, 130_048);
    let map = BootMemoryMap::parse(&info).expect("legacy map");
    assert_eq!(map.source(), MapSource::Legacy);

    let regions = usable(&info);
    assert_eq!(
        regions,
        vec![UsableRegion::new(PhysicalAddress::new(MIB), 130_048 * 1024)]
    );
}

#[test]
fn legacy_fallback_requires_mem_flag() {
    // only the mmap bit is set, mem_lower/mem_upper are not valid
    let info = legacy_info(0x40, 639, 130_048);
    assert_eq!(BootMemoryMap::parse(&info).err(), Some(ParseError::NoRegions));
    assert!(usable(&info).is_empty());
}

#[test]
fn tag_stream_takes_precedence_over_legacy_fields() {
    let info = InfoBuilder::new().mmap(&[(0x20_0000, 0x10_0000, 1)]).build();
    let map = BootMemoryMap::parse(&info).expect("tag map");
    assert_eq!(map.source(), MapSource::TagStream);
    assert_eq!(map.raw().len(), 1);
}

#[test]
fn module_and_framebuffer_become_reserved_regions() {
    let info = InfoBuilder::new()
        .cmdline("console=debugcon")
        .mmap(&[(0x10_0000, 0x3F0_0000, 1)])
        .module(0x80_0000, 0x88_0000)
        .framebuffer(0xFD00_0000, 4096, 1024, 768)
        .elf_sections(12)
        .build();

    let map = BootMemoryMap::parse(&info).expect("map");
    let raw = map.raw().as_slice();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw[1].kind, RegionKind::Module);
    assert_eq!(raw[1].start.as_u64(), 0x80_0000);
    assert_eq!(raw[2].kind, RegionKind::Framebuffer);
    assert_eq!(raw[2].end.as_u64(), 0xFD00_0000 + 4096 * 768);

    // the module lies inside usable RAM and is swallowed by the merge
    assert_eq!(map.merged().len(), 2);
    assert_eq!(
        usable(&info),
        vec![UsableRegion::new(PhysicalAddress::new(0x10_0000), 0x3F0_0000)]
    );
}

#[test]
fn zero_entry_size_defaults_to_standard_stride() {
    let info = InfoBuilder::new()
        .mmap_with(0, 24, &[(0x10_0000, 0x10_0000, 1), (0x40_0000, 0x10_0000, 1)])
        .build();
    assert_eq!(usable(&info).len(), 2);
}

#[test]
fn larger_entry_size_skips_padding() {
    let info = InfoBuilder::new()
        .mmap_with(40, 40, &[(0x10_0000, 0x10_0000, 1), (0x40_0000, 0x10_0000, 3)])
        .build();
    let map = BootMemoryMap::parse(&info).expect("map");
    assert_eq!(map.raw().as_slice()[1].kind, RegionKind::AcpiReclaimable);
    assert_eq!(usable(&info).len(), 1);
}

#[test]
fn unknown_tags_are_skipped() {
    let info = InfoBuilder::new()
        .raw_tag(21, 12, &[1, 2, 3, 4])
        .raw_tag(0x1234, 8, &[])
        .mmap(&[(0x10_0000, 0x10_0000, 1)])
        .build();
    assert_eq!(usable(&info).len(), 1);
}

#[test]
fn malformed_tag_keeps_regions_collected_so_far() {
    let info = InfoBuilder::new()
        .mmap(&[(0x10_0000, 0x10_0000, 1)])
        .raw_tag(1, 4, &[0; 8])
        .mmap(&[(0x80_0000, 0x10_0000, 1)])
        .build();
    let regions = usable(&info);
    assert_eq!(
        regions,
        vec![UsableRegion::new(PhysicalAddress::new(0x10_0000), 0x10_0000)]
    );
}

#[test]
fn short_known_tag_is_skipped() {
    // module tag with no room for mod_end
    let info = InfoBuilder::new()
        .raw_tag(3, 12, &[0, 0, 0x80, 0])
        .mmap(&[(0x10_0000, 0x10_0000, 1)])
        .build();
    assert_eq!(usable(&info).len(), 1);
}

#[test]
fn unterminated_stream_stops_at_declared_end() {
    let info = InfoBuilder::new()
        .mmap(&[(0x10_0000, 0x10_0000, 1)])
        .build_unterminated();
    assert_eq!(usable(&info).len(), 1);
}

#[test]
fn oversized_total_is_clamped_to_buffer() {
    let mut info = InfoBuilder::new().mmap(&[(0x10_0000, 0x10_0000, 1)]).build();
    info[0..4].copy_from_slice(&0x10_0000u32.to_le_bytes());
    assert_eq!(usable(&info).len(), 1);
}

#[test]
fn zero_length_and_wrapping_entries() {
    let info = InfoBuilder::new()
        .mmap(&[
            (0x20_0000, 0, 1),
            (u64::MAX - 0xFFF, 0x10_0000, 1),
            (0x10_0000, 0x10_0000, 1),
        ])
        .build();
    let map = BootMemoryMap::parse(&info).expect("map");
    assert_eq!(map.raw().len(), 2);

    let regions = usable(&info);
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[1].end().as_u64(), u64::MAX);
}

#[test]
fn raw_list_overflow_is_dropped() {
    let entries: Vec<_> = (0..40u64)
        .map(|i| (0x100_0000 + i * 0x2_0000, 0x1_0000, 1))
        .collect();
    let info = InfoBuilder::new().mmap(&entries).build();

    let map = BootMemoryMap::parse(&info).expect("map");
    assert_eq!(map.raw().len(), 32);
    assert_eq!(map.raw().dropped(), 8);
    assert_eq!(usable(&info).len(), 32);
}

#[test]
fn output_capacity_limits_result() {
    let info = InfoBuilder::new()
        .mmap(&[
            (0x10_0000, 0x1000, 1),
            (0x20_0000, 0x1000, 1),
            (0x30_0000, 0x1000, 1),
        ])
        .build();
    let mut out = [UsableRegion::EMPTY; 2];
    assert_eq!(parse(Some(info.as_slice()), &mut out), 2);
    assert_eq!(out[1].addr.as_u64(), 0x20_0000);
    assert_eq!(parse(Some(info.as_slice()), &mut []), 0);
}

#[test]
fn output_is_sorted_disjoint_and_above_floor() {
    let info = InfoBuilder::new()
        .mmap(&[
            (0x8000_0000, 0x1000_0000, 1),
            (0x0, 0x9_FC00, 1),
            (0xE_0000, 0x1_0000, 2),
            (0x10_0000, 0x100_0000, 1),
            (0x80_0000, 0x100_0000, 1),
            (0x4000_0000, 0x1000, 5),
            (0x3000_0000, 0x1000_0000, 1),
        ])
        .module(0x200_0000, 0x210_0000)
        .build();

    let regions = usable(&info);
    assert_canonical(&regions);
    assert_eq!(regions.len(), 3);
    assert_eq!(regions[0], UsableRegion::new(PhysicalAddress::new(MIB), 0x170_0000));
}
