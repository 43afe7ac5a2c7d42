use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use crate::config::{AgnusRevision, ExtStart};

pub const BANK_COUNT: usize = 256;
pub const BANK_SIZE: u32 = 0x10000;

pub const CHIP_RAM_BANKS: usize = 0x20;
pub const FAST_RAM_START: u32 = 0x200000;
pub const CIA_BANKS: (usize, usize) = (0xA0, 0xBF);
pub const CUSTOM_BANKS: (usize, usize) = (0xC0, 0xDF);
pub const SLOW_RAM_START: usize = 0xC0;
pub const RTC_BANKS: (usize, usize) = (0xDC, 0xDE);
pub const AUTOCONF_BANKS: (usize, usize) = (0xE8, 0xEF);
pub const EXT_BANKS: usize = 8;
pub const ROM_MIRROR_START: usize = 0xF8;
pub const OVERLAY_BANKS: usize = 8;

#[inline]
pub fn bank(addr: u32) -> usize {
    ((addr >> 16) & 0xFF) as usize
}

/// Resource that answers an access to a 64 KB bank.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MemorySource {
    #[default]
    Unmapped,
    Chip,
    Slow,
    Fast,
    Cia,
    Rtc,
    Custom,
    Autoconf,
    Rom,
    Wom,
    Ext,
}

impl MemorySource {
    pub fn is_ram(&self) -> bool {
        matches!(
            self,
            MemorySource::Chip | MemorySource::Slow | MemorySource::Fast
        )
    }

    pub fn is_firmware(&self) -> bool {
        matches!(
            self,
            MemorySource::Rom | MemorySource::Wom | MemorySource::Ext
        )
    }
}

impl fmt::Display for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemorySource::Unmapped => "Unmapped",
            MemorySource::Chip => "Chip RAM",
            MemorySource::Slow => "Slow RAM",
            MemorySource::Fast => "Fast RAM",
            MemorySource::Cia => "CIA",
            MemorySource::Rtc => "RTC",
            MemorySource::Custom => "Custom chips",
            MemorySource::Autoconf => "Autoconfig",
            MemorySource::Rom => "ROM",
            MemorySource::Wom => "WOM",
            MemorySource::Ext => "Extension ROM",
        };
        write!(f, "{}", name)
    }
}

/// Everything the bank maps are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub chip_size: usize,
    pub slow_size: usize,
    pub fast_size: usize,
    pub has_rom: bool,
    pub has_wom: bool,
    pub has_ext: bool,
    pub wom_lock: bool,
    pub overlay: bool,
    pub rtc: bool,
    pub ext_start: ExtStart,
    pub agnus: AgnusRevision,
    pub slow_ram_mirror: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BankMap(#[serde(with = "BigArray")] [MemorySource; BANK_COUNT]);

impl Default for BankMap {
    fn default() -> Self {
        BankMap([MemorySource::Unmapped; BANK_COUNT])
    }
}

impl Index<usize> for BankMap {
    type Output = MemorySource;

    fn index(&self, bank: usize) -> &MemorySource {
        &self.0[bank & 0xFF]
    }
}

impl BankMap {
    /// Classifies every bank as seen by the CPU.
    pub fn cpu(params: &LayoutParams) -> Self {
        let mut map = [MemorySource::Unmapped; BANK_COUNT];

        let chip_banks = params.chip_size / BANK_SIZE as usize;
        let slow_banks = params.slow_size / BANK_SIZE as usize;
        let fast_banks = params.fast_size / BANK_SIZE as usize;

        if chip_banks > 0 {
            map[..CHIP_RAM_BANKS].fill(MemorySource::Chip);
        }

        let fast_start = bank(FAST_RAM_START);
        map[fast_start..fast_start + fast_banks].fill(MemorySource::Fast);

        map[CIA_BANKS.0..=CIA_BANKS.1].fill(MemorySource::Cia);

        map[CUSTOM_BANKS.0..=CUSTOM_BANKS.1].fill(MemorySource::Custom);
        map[SLOW_RAM_START..SLOW_RAM_START + slow_banks].fill(MemorySource::Slow);

        if params.rtc {
            map[RTC_BANKS.0..=RTC_BANKS.1].fill(MemorySource::Rtc);
        }

        map[AUTOCONF_BANKS.0..=AUTOCONF_BANKS.1].fill(MemorySource::Autoconf);

        if params.has_ext {
            let start = params.ext_start.bank();
            map[start..start + EXT_BANKS].fill(MemorySource::Ext);
        }

        let mem_wom = if params.has_wom {
            MemorySource::Wom
        } else if params.has_rom {
            MemorySource::Rom
        } else {
            MemorySource::Unmapped
        };
        map[ROM_MIRROR_START..].fill(mem_wom);

        // The boot ROM shows up while the WOM can still be written
        if params.has_wom && !params.wom_lock {
            let rom = if params.has_rom {
                MemorySource::Rom
            } else {
                MemorySource::Unmapped
            };
            map[ROM_MIRROR_START..ROM_MIRROR_START + 4].fill(rom);
        }

        if params.overlay {
            for i in 0..OVERLAY_BANKS {
                let src = map[ROM_MIRROR_START + i];
                if src == MemorySource::Unmapped {
                    break;
                }
                map[i] = src;
            }
        }

        BankMap(map)
    }

    /// Classifies every bank as seen by the DMA engines.
    pub fn agnus(params: &LayoutParams) -> Self {
        let mut map = [MemorySource::Unmapped; BANK_COUNT];

        let chip_banks = (params.chip_size / BANK_SIZE as usize).min(CHIP_RAM_BANKS);
        map[..chip_banks].fill(MemorySource::Chip);

        if slow_ram_is_mirrored_in(params) {
            map[0x08..=0x0F].fill(MemorySource::Slow);
        }

        BankMap(map)
    }

    pub fn as_slice(&self) -> &[MemorySource] {
        &self.0
    }

    /// Collapses the map into runs of equally tagged banks.
    pub fn segments(&self) -> Vec<MemorySegment> {
        let mut segments: Vec<MemorySegment> = Vec::new();

        for (i, &source) in self.0.iter().enumerate() {
            match segments.last_mut() {
                Some(segment) if segment.source == source => {
                    segment.end = ((i as u32) << 16) | 0xFFFF;
                }
                _ => segments.push(MemorySegment {
                    start: (i as u32) << 16,
                    end: ((i as u32) << 16) | 0xFFFF,
                    source,
                }),
            }
        }

        segments
    }
}

/// The ECS Agnus can reach Slow RAM through the second half of the 1 MB
/// chip address range when the machine has 512 KB of each.
fn slow_ram_is_mirrored_in(params: &LayoutParams) -> bool {
    params.slow_ram_mirror
        && params.agnus.is_ecs()
        && params.chip_size == 512 * 1024
        && params.slow_size == 512 * 1024
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct MemorySegment {
    pub start: u32,
    pub end: u32,
    pub source: MemorySource,
}

impl fmt::Display for MemorySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:06X} - 0x{:06X} - {}",
            self.start, self.end, self.source
        )
    }
}
