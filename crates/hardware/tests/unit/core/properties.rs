//! Randomized Model Tests.
//!
//! Runs random read/write/flush traces against the small hierarchy and a
//! flat byte array side by side. Every load must match the array, every
//! line either level reports must hold the array's bytes, and after a final
//! flush the backing store must equal the array.

use memsim_core::MemoryHierarchy;
use memsim_core::common::PhysAddr;
use memsim_core::soc::BackingStore;
use proptest::prelude::*;

use crate::common::harness::{L2_SET_STRIDE, SMALL_MEM, small_config};

#[derive(Clone, Debug)]
enum Op {
    Read { addr: u64, len: usize },
    Write { addr: u64, len: usize, value: u32 },
    Flush,
}

fn width() -> impl Strategy<Value = usize> {
    prop_oneof![Just(1usize), Just(2), Just(4)]
}

/// Half the addresses are spread over memory; the rest pile into L2 set 0
/// so evictions and write-backs are frequent.
fn address() -> impl Strategy<Value = u64> {
    prop_oneof![
        0..(SMALL_MEM as u64 - 4),
        (0u64..15, 0u64..12).prop_map(|(k, off)| k * L2_SET_STRIDE + off),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (address(), width()).prop_map(|(addr, len)| Op::Read { addr, len }),
        4 => (address(), width(), any::<u32>())
            .prop_map(|(addr, len, value)| Op::Write { addr, len, value }),
        1 => Just(Op::Flush),
    ]
}

fn model_read(model: &[u8], addr: u64, len: usize) -> u32 {
    let mut bytes = [0u8; 4];
    let a = addr as usize;
    bytes[..len].copy_from_slice(&model[a..a + len]);
    u32::from_le_bytes(bytes)
}

fn model_write(model: &mut [u8], addr: u64, len: usize, value: u32) {
    let a = addr as usize;
    model[a..a + len].copy_from_slice(&value.to_le_bytes()[..len]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hierarchy_matches_flat_memory(
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..200),
    ) {
        let mut config = small_config();
        config.general.seed = Some(seed);
        let mut mem = MemoryHierarchy::new(&config).unwrap();
        mem.init_caches();
        let mut model = vec![0u8; SMALL_MEM];

        for op in &ops {
            match *op {
                Op::Read { addr, len } => {
                    prop_assert_eq!(mem.read(addr, len), model_read(&model, addr, len), "read {:#x}/{}", addr, len);
                }
                Op::Write { addr, len, value } => {
                    mem.write(addr, len, value);
                    model_write(&mut model, addr, len, value);
                }
                Op::Flush => {
                    let _ = mem.flush();
                }
            }

            let addr = match *op {
                Op::Read { addr, .. } | Op::Write { addr, .. } => addr,
                Op::Flush => 0,
            };
            if let Some(p) = mem.probe_l1(addr, 4) {
                prop_assert!(!p.dirty);
                prop_assert_eq!(p.content, model_read(&model, addr, p.len));
            }
            if let Some(p) = mem.probe_l2(addr, 4) {
                prop_assert_eq!(p.content, model_read(&model, addr, p.len));
            }
        }

        let _ = mem.flush();
        let mut backing = vec![0u8; SMALL_MEM];
        mem.backing().read(PhysAddr::new(0), &mut backing);
        prop_assert!(backing == model, "backing store differs from model after flush");
    }
}
