//! Address Decomposition Tests.
//!
//! Addresses split as `[ tag_high | set | tag_low | offset ]` from the most
//! significant bit down. These tests pin the field extraction for both
//! reference levels and the line-base reconstruction used by write-back.

use memsim_core::common::PhysAddr;
use memsim_core::config::CacheConfig;
use memsim_core::core::units::cache::geometry::{CacheGeometry, Tag};
use proptest::prelude::*;
use rstest::rstest;

fn reference_l1() -> CacheGeometry {
    CacheConfig::default_l1().geometry(27)
}

fn reference_l2() -> CacheGeometry {
    CacheConfig::default_l2().geometry(27)
}

#[test]
fn derived_tag_high_widths() {
    assert_eq!(reference_l1().addr_bits(), 27);
    assert_eq!(reference_l2().addr_bits(), 27);
    assert_eq!(reference_l1().memory_size(), 1 << 27);
    assert_eq!(reference_l2().num_sets(), 4096);
}

#[rstest]
#[case(0x234_5678, 0x38, 0x9, 0xD15, 0x8)]
#[case(0x1000, 0x0, 0x0, 0x4, 0x0)]
#[case(0x7FF_FFFF, 0x3F, 0xF, 0xFFF, 0x1F)]
fn reference_l2_fields(
    #[case] addr: u64,
    #[case] offset: usize,
    #[case] tag_low: u64,
    #[case] set: usize,
    #[case] tag_high: u64,
) {
    let fields = reference_l2().decompose(PhysAddr::new(addr));
    assert_eq!(fields.offset, offset);
    assert_eq!(fields.tag_low, tag_low);
    assert_eq!(fields.set, set);
    assert_eq!(fields.tag_high, tag_high);
}

#[test]
fn reference_l1_fields_of_0x1000() {
    let fields = reference_l1().decompose(PhysAddr::new(0x1000));
    assert_eq!(fields.offset, 0);
    assert_eq!(fields.tag_low, 0);
    assert_eq!(fields.set, 8);
    assert_eq!(fields.tag_high, 0);
    assert_eq!(fields.tag(), Tag { high: 0, low: 0 });
}

/// Addresses `2^(W+Q+R)` apart share a set and tag-low but not a tag.
#[test]
fn set_stride_changes_only_tag_high() {
    let l2 = reference_l2();
    let a = l2.decompose(PhysAddr::new(0x1000));
    let b = l2.decompose(PhysAddr::new(0x1000 + (1 << 22)));
    assert_eq!(a.set, b.set);
    assert_eq!(a.tag_low, b.tag_low);
    assert_eq!(a.offset, b.offset);
    assert_ne!(a.tag(), b.tag());
}

#[test]
fn line_base_is_line_aligned() {
    let l2 = reference_l2();
    for addr in [0x1000_u64, 0x1001, 0x103F] {
        let fields = l2.decompose(PhysAddr::new(addr));
        assert_eq!(l2.line_base(fields.tag(), fields.set), PhysAddr::new(0x1000));
    }
}

proptest! {
    /// Every field stays inside its width and reassembles to the same address.
    #[test]
    fn fields_fit_and_compose_back(addr in 0u64..(1 << 27)) {
        let l2 = reference_l2();
        let fields = l2.decompose(PhysAddr::new(addr));
        prop_assert!(fields.offset < 64);
        prop_assert!(fields.tag_low < 16);
        prop_assert!(fields.set < 4096);
        prop_assert!(fields.tag_high < 32);
        prop_assert_eq!(l2.compose(&fields), PhysAddr::new(addr));
        prop_assert_eq!(
            l2.line_base(fields.tag(), fields.set),
            PhysAddr::new(addr).align_down(64)
        );
    }
}
