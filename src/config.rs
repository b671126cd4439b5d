use crate::address;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum number of lanes (threads) per warp.
pub const MAX_WARP_SIZE: usize = 32;

/// Maximum number of hardware block slots tracked per core.
pub const MAX_CONCURRENT_BLOCKS: usize = 32;

/// Size of the per-lane access buffer in bytes.
pub const MAX_ACCESS_BUFFER_SIZE: u32 = 16;

/// Shader core config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Core {
    /// shader core pipeline warp size (number of lane ports)
    pub warp_size: usize,
    /// log2 of the memory hierarchy block size
    pub block_size_bits: u32,
    /// largest element size of a memory instruction in bytes
    pub max_data_size: u32,
    /// largest access (element size * vector length) of a single lane in bytes
    pub max_access_size: u32,
    /// number of hardware block (CTA) slots
    pub max_concurrent_blocks: usize,
    /// clock period of the core in ticks
    pub ticks_per_cycle: u64,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            warp_size: 32,
            block_size_bits: 6,
            max_data_size: 8,
            max_access_size: 16,
            max_concurrent_blocks: 32,
            ticks_per_cycle: 1000,
        }
    }
}

impl Core {
    pub fn from_yaml_str(config: &str) -> eyre::Result<Self> {
        let config: Self = serde_yaml::from_str(config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let config = std::fs::read_to_string(path)
            .map_err(|err| eyre::eyre!("failed to read config {}: {err}", path.display()))?;
        Self::from_yaml_str(&config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.warp_size == 0 || self.warp_size > MAX_WARP_SIZE {
            eyre::bail!(
                "warp size {} must be in 1..={}",
                self.warp_size,
                MAX_WARP_SIZE
            );
        }
        if self.block_size_bits == 0 || self.block_size_bits >= 32 {
            eyre::bail!("invalid block size bits {}", self.block_size_bits);
        }
        if self.max_data_size == 0 || self.max_data_size > self.max_access_size {
            eyre::bail!(
                "max data size {} must be in 1..={}",
                self.max_data_size,
                self.max_access_size
            );
        }
        if self.max_access_size > MAX_ACCESS_BUFFER_SIZE {
            eyre::bail!(
                "max access size {} exceeds lane buffer of {} bytes",
                self.max_access_size,
                MAX_ACCESS_BUFFER_SIZE
            );
        }
        if self.max_concurrent_blocks == 0 || self.max_concurrent_blocks > MAX_CONCURRENT_BLOCKS {
            eyre::bail!(
                "max concurrent blocks {} must be in 1..={}",
                self.max_concurrent_blocks,
                MAX_CONCURRENT_BLOCKS
            );
        }
        if self.ticks_per_cycle == 0 {
            eyre::bail!("clock period must be at least one tick");
        }
        Ok(())
    }

    /// Block size of the memory hierarchy in bytes.
    #[inline]
    #[must_use]
    pub fn line_size(&self) -> u32 {
        1 << self.block_size_bits
    }

    /// Line address
    #[inline]
    #[must_use]
    pub fn line_addr(&self, addr: address) -> address {
        addr & (u64::MAX << self.block_size_bits)
    }

    #[inline]
    #[must_use]
    pub fn tick(&self, cycle: u64) -> u64 {
        cycle * self.ticks_per_cycle
    }
}
