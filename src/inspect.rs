use serde::{Deserialize, Serialize};

use crate::{
    bank_map::BankMap,
    board::Board,
    memory::Memory,
    utils::{self, printable},
};

/// Summary of the memory configuration for debuggers and front ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryInfo {
    pub has_rom: bool,
    pub has_wom: bool,
    pub has_ext: bool,
    pub has_boot_rom: bool,
    pub has_kick_rom: bool,
    pub wom_lock: bool,
    pub overlay: bool,

    pub rom_mask: u32,
    pub wom_mask: u32,
    pub ext_mask: u32,
    pub chip_mask: u32,
    pub slow_mask: u32,
    pub fast_mask: u32,

    pub cpu_map: BankMap,
    pub agnus_map: BankMap,
}

impl<B: Board> Memory<B> {
    pub fn info(&self) -> MemoryInfo {
        MemoryInfo {
            has_rom: self.has_rom(),
            has_wom: self.has_wom(),
            has_ext: self.has_ext(),
            has_boot_rom: self.has_boot_rom(),
            has_kick_rom: self.has_kick_rom(),
            wom_lock: self.wom_lock,
            overlay: self.overlay,
            rom_mask: self.rom.mask(),
            wom_mask: self.wom.mask(),
            ext_mask: self.ext.mask(),
            chip_mask: self.chip.mask(),
            slow_mask: self.slow.mask(),
            fast_mask: self.fast.mask(),
            cpu_map: self.cpu_map,
            agnus_map: self.agnus_map,
        }
    }

    /// 16 characters starting at `addr`, read as 8 words.
    pub fn ascii(&self, addr: u32) -> String {
        (0..8u32)
            .flat_map(|i| self.spypeek16(addr.wrapping_add(2 * i)).to_be_bytes())
            .map(printable)
            .collect()
    }

    /// `bytes` bytes starting at `addr` as space separated hex words.
    pub fn hex(&self, addr: u32, bytes: usize) -> String {
        (0..(bytes as u32 + 1) / 2)
            .map(|i| format!("{:04X}", self.spypeek16(addr.wrapping_add(2 * i))))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn hexdump(&self, addr: u32, len: usize) -> String {
        let buffer: Vec<u8> = (0..len as u32)
            .map(|i| self.spypeek8(addr.wrapping_add(i)))
            .collect();
        utils::hexdump(&buffer, addr)
    }
}
