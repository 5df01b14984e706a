//! Configuration system for the cache hierarchy.
//!
//! This module defines all configuration structures used to parameterize the
//! hierarchy. It provides:
//! 1. **Defaults:** The reference sizing (128 MiB store, 64 KiB 8-way L1, 4 MiB 16-way L2).
//! 2. **Structures:** Hierarchical config for general, memory and per-level cache settings.
//! 3. **Validation:** Geometry checks performed before any storage is allocated.
//!
//! Configuration is supplied as JSON (see [`Config::from_json`]) or built from
//! [`Config::default()`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants::MAX_ACCESS_BYTES;
use crate::common::error::ConfigError;
use crate::core::units::cache::geometry::CacheGeometry;

/// Default configuration constants.
///
/// These values reproduce the reference sizing: a 27-bit physical address
/// space split as 6/3/7/11 bits for L1 and 6/4/12/5 bits for L2.
mod defaults {
    /// Physical address width in bits (128 MiB of backing store).
    pub const ADDR_BITS: u32 = 27;

    /// Bytes per elementary bus transfer.
    pub const BURST_LEN: usize = crate::common::constants::BURST_LEN;

    /// L1 line offset width (64-byte lines).
    pub const L1_OFFSET_BITS: u32 = 6;
    /// L1 tag-low field width.
    pub const L1_TAG_LOW_BITS: u32 = 3;
    /// L1 set-index width (128 sets).
    pub const L1_SET_BITS: u32 = 7;
    /// L1 associativity.
    pub const L1_WAYS: usize = 8;

    /// L2 line offset width (64-byte lines).
    pub const L2_OFFSET_BITS: u32 = 6;
    /// L2 tag-low field width.
    pub const L2_TAG_LOW_BITS: u32 = 4;
    /// L2 set-index width (4096 sets).
    pub const L2_SET_BITS: u32 = 12;
    /// L2 associativity.
    pub const L2_WAYS: usize = 16;
}

/// Widest physical address the model accepts (4 GiB of backing store).
pub const MAX_ADDR_BITS: u32 = 32;

/// Largest data array a single cache level may allocate.
pub const MAX_CACHE_BYTES: u64 = 1 << 30;

/// Root configuration structure containing all hierarchy settings.
///
/// # Examples
///
/// ```
/// use memsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.memory.addr_bits, 27);
/// assert_eq!(config.cache.l1.ways, 8);
/// assert_eq!(config.cache.l2.ways, 16);
/// assert!(config.validate().is_ok());
/// ```
///
/// Overriding part of the hierarchy from JSON:
///
/// ```
/// use memsim_core::config::Config;
///
/// let json = r#"{
///     "general": { "seed": 7 },
///     "cache": {
///         "l1": { "offset_bits": 4, "tag_low_bits": 1, "set_bits": 1, "ways": 2 }
///     }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.general.seed, Some(7));
/// assert_eq!(config.cache.l1.line_bytes(), 16);
/// assert_eq!(config.cache.l2.ways, 16);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General settings (replacement seed).
    #[serde(default)]
    pub general: GeneralConfig,
    /// Backing store and bus parameters.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Cache hierarchy geometry.
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Returns the size of the backing store in bytes (`2^addr_bits`).
    pub const fn memory_size(&self) -> u64 {
        self.memory.memory_size()
    }

    /// Checks that the geometry describes a buildable hierarchy.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: address width out of range,
    /// field widths wider than the address, zero ways, a data array above
    /// [`MAX_CACHE_BYTES`], an unusable burst
    /// length, a burst longer than a line, or an L1 line longer than an L2 line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bits = self.memory.addr_bits;
        if bits == 0 || bits > MAX_ADDR_BITS {
            return Err(ConfigError::AddressWidth {
                bits,
                max: MAX_ADDR_BITS,
            });
        }

        let burst = self.memory.burst_len;
        if !burst.is_power_of_two() || burst < MAX_ACCESS_BYTES {
            return Err(ConfigError::BurstLength {
                len: burst,
                min: MAX_ACCESS_BYTES,
            });
        }

        for (level, cache) in [("L1", &self.cache.l1), ("L2", &self.cache.l2)] {
            let used = u64::from(cache.offset_bits)
                + u64::from(cache.tag_low_bits)
                + u64::from(cache.set_bits);
            if used > u64::from(bits) {
                return Err(ConfigError::FieldWidths {
                    level,
                    used,
                    available: bits,
                });
            }
            if cache.ways == 0 {
                return Err(ConfigError::ZeroWays { level });
            }
            let capacity = (cache.ways as u64)
                .checked_mul(cache.num_sets() as u64)
                .and_then(|lines| lines.checked_mul(cache.line_bytes() as u64));
            if capacity.is_none_or(|bytes| bytes > MAX_CACHE_BYTES) {
                return Err(ConfigError::CacheTooLarge {
                    level,
                    max: MAX_CACHE_BYTES,
                });
            }
            if burst > cache.line_bytes() {
                return Err(ConfigError::BurstExceedsLine {
                    level,
                    burst,
                    line: cache.line_bytes(),
                });
            }
        }

        if self.cache.l1.line_bytes() > self.cache.l2.line_bytes() {
            return Err(ConfigError::L1LineTooLarge {
                l1: self.cache.l1.line_bytes(),
                l2: self.cache.l2.line_bytes(),
            });
        }

        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Seed for the replacement generators. When absent the hierarchy seeds
    /// once from the wall clock at construction.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Backing store and bus configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Physical address width in bits
    #[serde(default = "MemoryConfig::default_addr_bits")]
    pub addr_bits: u32,

    /// Bytes per elementary bus transfer
    #[serde(default = "MemoryConfig::default_burst_len")]
    pub burst_len: usize,
}

impl MemoryConfig {
    /// Returns the default physical address width.
    const fn default_addr_bits() -> u32 {
        defaults::ADDR_BITS
    }

    /// Returns the default burst length.
    const fn default_burst_len() -> usize {
        defaults::BURST_LEN
    }

    /// Returns the size of the backing store in bytes.
    pub const fn memory_size(&self) -> u64 {
        1u64 << self.addr_bits
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            addr_bits: defaults::ADDR_BITS,
            burst_len: defaults::BURST_LEN,
        }
    }
}

/// Cache hierarchy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheHierarchyConfig {
    /// Write-through, no-write-allocate first level
    #[serde(default = "CacheConfig::default_l1")]
    pub l1: CacheConfig,
    /// Write-back, write-allocate second level
    #[serde(default = "CacheConfig::default_l2")]
    pub l2: CacheConfig,
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            l1: CacheConfig::default_l1(),
            l2: CacheConfig::default_l2(),
        }
    }
}

/// Individual cache level configuration.
///
/// The three low address fields are given explicitly; the tag-high field
/// takes whatever bits of the physical address remain. Associativity is
/// independent of the field widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Line offset width (line size is `2^offset_bits` bytes)
    pub offset_bits: u32,

    /// Tag-low field width
    pub tag_low_bits: u32,

    /// Set-index width (`2^set_bits` sets)
    pub set_bits: u32,

    /// Associativity (number of ways per set)
    pub ways: usize,
}

impl CacheConfig {
    /// Returns the reference L1 geometry.
    pub const fn default_l1() -> Self {
        Self {
            offset_bits: defaults::L1_OFFSET_BITS,
            tag_low_bits: defaults::L1_TAG_LOW_BITS,
            set_bits: defaults::L1_SET_BITS,
            ways: defaults::L1_WAYS,
        }
    }

    /// Returns the reference L2 geometry.
    pub const fn default_l2() -> Self {
        Self {
            offset_bits: defaults::L2_OFFSET_BITS,
            tag_low_bits: defaults::L2_TAG_LOW_BITS,
            set_bits: defaults::L2_SET_BITS,
            ways: defaults::L2_WAYS,
        }
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        1 << self.offset_bits
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        1 << self.set_bits
    }

    /// Builds the address decomposer for a physical address of `addr_bits`.
    ///
    /// The caller must have validated that the fields fit.
    pub const fn geometry(&self, addr_bits: u32) -> CacheGeometry {
        CacheGeometry::new(
            self.offset_bits,
            self.tag_low_bits,
            self.set_bits,
            addr_bits - self.offset_bits - self.tag_low_bits - self.set_bits,
        )
    }
}
