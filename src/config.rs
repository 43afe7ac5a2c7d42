use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::Diagnostics,
    error::Result,
    region::{RegionKind, KB},
    rtc::RtcModel,
};

/// First bank of the extension ROM window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtStart {
    #[default]
    E0,
    F0,
}

impl ExtStart {
    pub fn bank(&self) -> usize {
        match self {
            ExtStart::E0 => 0xE0,
            ExtStart::F0 => 0xF0,
        }
    }
}

/// Agnus revision, which limits how far the DMA engines can reach.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AgnusRevision {
    /// 512 KB Agnus
    Ocs,
    /// 1 MB Fat Agnus
    #[default]
    Ecs1Mb,
    /// 2 MB Fatter Agnus
    Ecs2Mb,
}

impl AgnusRevision {
    pub fn is_ecs(&self) -> bool {
        !matches!(self, AgnusRevision::Ocs)
    }

    /// Mask applied to every DMA pointer.
    pub fn ptr_mask(&self) -> u32 {
        match self {
            AgnusRevision::Ocs => 0x07FFFF,
            AgnusRevision::Ecs1Mb => 0x0FFFFF,
            AgnusRevision::Ecs2Mb => 0x1FFFFF,
        }
    }
}

/// RAM contents after power-on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RamInitPattern {
    #[default]
    AllZeroes,
    AllOnes,
    Randomized,
}

/// Value returned by the CPU when reading from an unmapped bank.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnmappedMemory {
    /// Whatever was last on the data bus
    Floating,
    AllOnes,
    #[default]
    AllZeroes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryConfig {
    pub chip_size: usize,
    pub slow_size: usize,
    pub fast_size: usize,
    pub ext_start: ExtStart,

    /// Slow RAM accesses have to wait for a free bus
    pub slow_ram_delay: bool,

    /// ECS Agnus makes Slow RAM visible to DMA
    pub slow_ram_mirror: bool,

    pub agnus: AgnusRevision,
    pub ram_init: RamInitPattern,
    pub unmapped: UnmappedMemory,
    pub rtc: RtcModel,

    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            chip_size: 512 * KB,
            slow_size: 512 * KB,
            fast_size: 0,
            ext_start: ExtStart::E0,
            slow_ram_delay: true,
            slow_ram_mirror: true,
            agnus: AgnusRevision::Ecs1Mb,
            ram_init: RamInitPattern::AllZeroes,
            unmapped: UnmappedMemory::AllZeroes,
            rtc: RtcModel::Oki,
            diagnostics: Diagnostics::default(),
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> Result<()> {
        RegionKind::Chip.validate_size(self.chip_size)?;
        RegionKind::Slow.validate_size(self.slow_size)?;
        RegionKind::Fast.validate_size(self.fast_size)?;
        Ok(())
    }
}
