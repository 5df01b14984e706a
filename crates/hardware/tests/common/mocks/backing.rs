use std::cell::RefCell;

use memsim_core::common::PhysAddr;
use memsim_core::soc::BackingStore;
use mockall::mock;

mock! {
    pub Backing {}
    impl BackingStore for Backing {
        fn size(&self) -> u64;
        fn read(&self, addr: PhysAddr, buf: &mut [u8]);
        fn write(&mut self, addr: PhysAddr, data: &[u8]);
        fn write_masked(&mut self, addr: PhysAddr, data: &[u8], mask: &[bool]);
    }
}

/// One transaction seen by a [`RecordingStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOp {
    Read { addr: u64, len: usize },
    Write { addr: u64, data: Vec<u8> },
    WriteMasked { addr: u64, data: Vec<u8>, mask: Vec<bool> },
}

/// A byte-array backing store that logs every transaction in order.
#[derive(Debug)]
pub struct RecordingStore {
    bytes: Vec<u8>,
    log: RefCell<Vec<StoreOp>>,
}

impl RecordingStore {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            log: RefCell::new(Vec::new()),
        }
    }

    /// Fills the store with `byte ^ (addr as u8)` so every address has a
    /// distinct, predictable value.
    pub fn with_pattern(size: usize, byte: u8) -> Self {
        let mut store = Self::new(size);
        for (i, b) in store.bytes.iter_mut().enumerate() {
            *b = byte ^ (i as u8);
        }
        store
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn peek_u32(&self, addr: u64) -> u32 {
        let a = addr as usize;
        u32::from_le_bytes(self.bytes[a..a + 4].try_into().unwrap())
    }

    pub fn poke(&mut self, addr: u64, data: &[u8]) {
        let a = addr as usize;
        self.bytes[a..a + data.len()].copy_from_slice(data);
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Addresses of every full-line write, in order.
    pub fn writes(&self) -> Vec<u64> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                StoreOp::Write { addr, .. } => Some(*addr),
                _ => None,
            })
            .collect()
    }

    /// Addresses of every read, in order.
    pub fn reads(&self) -> Vec<u64> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                StoreOp::Read { addr, .. } => Some(*addr),
                _ => None,
            })
            .collect()
    }
}

impl BackingStore for RecordingStore {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read(&self, addr: PhysAddr, buf: &mut [u8]) {
        let a = addr.val() as usize;
        buf.copy_from_slice(&self.bytes[a..a + buf.len()]);
        self.log.borrow_mut().push(StoreOp::Read {
            addr: addr.val(),
            len: buf.len(),
        });
    }

    fn write(&mut self, addr: PhysAddr, data: &[u8]) {
        let a = addr.val() as usize;
        self.bytes[a..a + data.len()].copy_from_slice(data);
        self.log.get_mut().push(StoreOp::Write {
            addr: addr.val(),
            data: data.to_vec(),
        });
    }

    fn write_masked(&mut self, addr: PhysAddr, data: &[u8], mask: &[bool]) {
        let a = addr.val() as usize;
        for (i, (&byte, &m)) in data.iter().zip(mask).enumerate() {
            if m {
                self.bytes[a + i] = byte;
            }
        }
        self.log.get_mut().push(StoreOp::WriteMasked {
            addr: addr.val(),
            data: data.to_vec(),
            mask: mask.to_vec(),
        });
    }
}
