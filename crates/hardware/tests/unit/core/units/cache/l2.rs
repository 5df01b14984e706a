//! Second-Level Cache Tests.
//!
//! Drives `L2Cache` directly against a recording backing store to check
//! write-allocate, dirty tracking, the order of write-back and fill on
//! eviction, and flushing.
//!
//! ```text
//! W=5 (32 B lines), Q=1, R=2 (4 sets), F=4, 2 ways, burst 8
//! set = (addr >> 6) & 3, tag_low = (addr >> 5) & 1, tag_high = addr >> 8
//! ```
//!
//! 0x000, 0x100 and 0x200 all map to set 0 with tag-low 0.

use memsim_core::common::PhysAddr;
use memsim_core::core::units::cache::L2Cache;
use memsim_core::stats::CacheStats;
use pretty_assertions::assert_eq;

use crate::common::harness::{SMALL_ADDR_BITS, SMALL_MEM, small_config};
use crate::common::mocks::backing::{RecordingStore, StoreOp};
use crate::common::mocks::policy::{ScriptedPolicy, VictimLog};

const BURST: usize = 8;
const L1_LINE: usize = 16;
const FULL: [bool; BURST] = [true; BURST];

fn setup(victims: &[usize]) -> (L2Cache, RecordingStore, VictimLog) {
    let config = small_config();
    let (policy, log) = ScriptedPolicy::new(victims);
    let l2 = L2Cache::new(
        config.cache.l2.geometry(SMALL_ADDR_BITS),
        config.cache.l2.ways,
        BURST,
        Box::new(policy),
    );
    (l2, RecordingStore::with_pattern(SMALL_MEM, 0xA5), log)
}

fn pattern(addr: usize, len: usize) -> Vec<u8> {
    (addr..addr + len).map(|i| 0xA5 ^ (i as u8)).collect()
}

fn read(l2: &mut L2Cache, store: &mut RecordingStore, addr: u64) -> (Vec<u8>, Vec<u8>) {
    let mut out = vec![0; BURST];
    let mut line = vec![0; L1_LINE];
    l2.read_fill(PhysAddr::new(addr), &mut out, &mut line, store);
    (out, line)
}

fn write(l2: &mut L2Cache, store: &mut RecordingStore, addr: u64, fill: u8) {
    l2.write_burst(PhysAddr::new(addr), &[fill; BURST], &FULL, store);
}

// ══════════════════════════════════════════════════════════
// 1. Reads
// ══════════════════════════════════════════════════════════

/// A miss fetches the whole line at its base and hands back one burst
/// plus the L1-sized window holding it.
#[test]
fn read_miss_fills_whole_line() {
    let (mut l2, mut store, _) = setup(&[]);
    let (out, line) = read(&mut l2, &mut store, 0x008);

    assert_eq!(store.ops(), vec![StoreOp::Read { addr: 0x000, len: 32 }]);
    assert_eq!(out, pattern(0x008, BURST));
    assert_eq!(line, pattern(0x000, L1_LINE));
    assert_eq!(l2.stats().read_misses, 1);
}

#[test]
fn read_fill_window_is_upper_half_for_upper_offsets() {
    let (mut l2, mut store, _) = setup(&[]);
    let (out, line) = read(&mut l2, &mut store, 0x018);
    assert_eq!(out, pattern(0x018, BURST));
    assert_eq!(line, pattern(0x010, L1_LINE));
}

#[test]
fn read_hit_does_not_touch_backing_store() {
    let (mut l2, mut store, _) = setup(&[]);
    let _ = read(&mut l2, &mut store, 0x000);
    store.clear_log();

    let (out, _) = read(&mut l2, &mut store, 0x010);
    assert!(store.ops().is_empty());
    assert_eq!(out, pattern(0x010, BURST));
    assert_eq!(l2.stats().read_hits, 1);
}

#[test]
#[should_panic(expected = "outside of the physical memory")]
fn read_past_end_of_memory_panics() {
    let (mut l2, mut store, _) = setup(&[]);
    let _ = read(&mut l2, &mut store, SMALL_MEM as u64);
}

// ══════════════════════════════════════════════════════════
// 2. Writes
// ══════════════════════════════════════════════════════════

/// Write-allocate: the line is fetched, merged and left dirty; the backing
/// store keeps its old bytes.
#[test]
fn write_miss_allocates_dirty_line() {
    let (mut l2, mut store, _) = setup(&[]);
    write(&mut l2, &mut store, 0x048, 0x11);

    assert_eq!(store.ops(), vec![StoreOp::Read { addr: 0x040, len: 32 }]);
    let probe = l2.probe(PhysAddr::new(0x048), 4).unwrap();
    assert!(probe.dirty);
    assert_eq!(probe.content, 0x1111_1111);
    assert_eq!(&store.bytes()[0x048..0x050], pattern(0x048, BURST).as_slice());
    assert_eq!(l2.stats().write_misses, 1);
}

#[test]
fn masked_write_changes_only_selected_bytes() {
    let (mut l2, mut store, _) = setup(&[]);
    let mut mask = [false; BURST];
    mask[2] = true;
    mask[3] = true;
    l2.write_burst(PhysAddr::new(0x000), &[0xEE; BURST], &mask, &mut store);

    let mut expected = pattern(0x000, 4);
    expected[2] = 0xEE;
    expected[3] = 0xEE;
    let probe = l2.probe(PhysAddr::new(0x000), 4).unwrap();
    assert_eq!(probe.content, u32::from_le_bytes(expected.try_into().unwrap()));
}

#[test]
fn write_hit_stays_in_cache() {
    let (mut l2, mut store, _) = setup(&[]);
    let _ = read(&mut l2, &mut store, 0x000);
    store.clear_log();

    write(&mut l2, &mut store, 0x000, 0x22);
    assert!(store.ops().is_empty());
    assert!(l2.probe(PhysAddr::new(0x000), 1).unwrap().dirty);
    assert_eq!(l2.stats().write_hits, 1);
}

// ══════════════════════════════════════════════════════════
// 3. Replacement
// ══════════════════════════════════════════════════════════

/// A fill into a free way neither asks the policy for a victim nor
/// disturbs the other way of the set.
#[test]
fn free_way_fill_never_evicts() {
    let (mut l2, mut store, log) = setup(&[]);
    write(&mut l2, &mut store, 0x000, 0x33);
    let _ = read(&mut l2, &mut store, 0x100);

    assert!(log.lock().unwrap().is_empty());
    assert!(store.writes().is_empty());
    let kept = l2.probe(PhysAddr::new(0x000), 4).unwrap();
    assert!(kept.dirty);
    assert_eq!(kept.content, 0x3333_3333);
    assert_eq!(l2.stats().evictions, 0);
}

/// The dirty victim is written back in full, at its own base, before the
/// new line is fetched.
#[test]
fn dirty_victim_written_back_before_fill() {
    let (mut l2, mut store, log) = setup(&[0]);
    write(&mut l2, &mut store, 0x000, 0x44);
    let _ = read(&mut l2, &mut store, 0x100);
    store.clear_log();

    let _ = read(&mut l2, &mut store, 0x200);

    let mut victim = pattern(0x000, 32);
    victim[..BURST].fill(0x44);
    assert_eq!(
        store.ops(),
        vec![
            StoreOp::Write {
                addr: 0x000,
                data: victim
            },
            StoreOp::Read { addr: 0x200, len: 32 },
        ]
    );
    assert_eq!(*log.lock().unwrap(), vec![(0, 0)]);
    assert_eq!(l2.probe(PhysAddr::new(0x000), 4), None);
    assert_eq!(l2.stats().evictions, 1);
    assert_eq!(l2.stats().writebacks, 1);
}

/// The write-back address is rebuilt from both tag fields and the set.
#[test]
fn write_back_address_uses_tag_low() {
    let (mut l2, mut store, _) = setup(&[0]);
    // 0x120, 0x220, 0x320: set 0, tag-low 1.
    write(&mut l2, &mut store, 0x128, 0x55);
    let _ = read(&mut l2, &mut store, 0x220);
    let _ = read(&mut l2, &mut store, 0x320);

    assert_eq!(store.writes(), vec![0x120]);
    assert_eq!(&store.bytes()[0x128..0x130], &[0x55; BURST]);
}

#[test]
fn clean_victim_is_dropped_silently() {
    let (mut l2, mut store, _) = setup(&[1]);
    for addr in [0x000, 0x100, 0x200] {
        let _ = read(&mut l2, &mut store, addr);
    }
    assert!(store.writes().is_empty());
    assert_eq!(l2.probe(PhysAddr::new(0x100), 4), None);
    assert!(l2.probe(PhysAddr::new(0x000), 4).is_some());
    assert_eq!(
        *l2.stats(),
        CacheStats {
            read_misses: 3,
            evictions: 1,
            ..CacheStats::default()
        }
    );
}

// ══════════════════════════════════════════════════════════
// 4. Flush and invalidate
// ══════════════════════════════════════════════════════════

#[test]
fn flush_writes_back_each_dirty_line_once() {
    let (mut l2, mut store, _) = setup(&[]);
    write(&mut l2, &mut store, 0x000, 0x66);
    write(&mut l2, &mut store, 0x0C0, 0x77);
    let _ = read(&mut l2, &mut store, 0x040);

    assert_eq!(l2.flush(&mut store), 2);
    let mut written = store.writes();
    written.sort_unstable();
    assert_eq!(written, vec![0x000, 0x0C0]);
    assert_eq!(&store.bytes()[0x0C0..0x0C8], &[0x77; BURST]);

    let probe = l2.probe(PhysAddr::new(0x000), 4).unwrap();
    assert!(!probe.dirty);
    assert_eq!(l2.flush(&mut store), 0);
}

/// Invalidation drops dirty data without writing it back.
#[test]
fn invalidate_discards_dirty_lines() {
    let (mut l2, mut store, _) = setup(&[]);
    write(&mut l2, &mut store, 0x000, 0x88);
    l2.invalidate_all();

    assert_eq!(l2.flush(&mut store), 0);
    assert!(store.writes().is_empty());
    assert_eq!(l2.probe(PhysAddr::new(0x000), 4), None);
}
