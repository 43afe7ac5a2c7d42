//! Boot ROM, Kickstart ROM, WOM and extension ROM handling.
//!
//! An A1000 boots from a 64K boot ROM which copies Kickstart into the WOM.
//! The WOM stays writable until the boot ROM writes to its own mirror, which
//! locks the WOM for good (until the next power cycle).

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use crate::{
    board::Board,
    error::{MemoryError, Result},
    memory::{Memory, Message},
    region::{RegionKind, KB},
    utils::fnv_1a_32,
};

/// Images up to this size are boot ROMs.
pub const BOOT_ROM_SIZE: usize = 64 * KB;
pub const WOM_SIZE: usize = 256 * KB;

fn check_image(kind: RegionKind, image: &[u8]) -> Result<()> {
    if image.is_empty() {
        return Err(MemoryError::InvalidSize {
            region: kind,
            size: 0,
        });
    }
    if image.len() > kind.max_size() {
        return Err(MemoryError::FirmwareTooLarge {
            region: kind,
            size: image.len(),
            max: kind.max_size(),
        });
    }
    Ok(())
}

fn read_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}

impl<B: Board> Memory<B> {
    pub fn has_rom(&self) -> bool {
        self.rom.is_allocated()
    }

    pub fn has_boot_rom(&self) -> bool {
        self.has_rom() && self.rom.size() <= BOOT_ROM_SIZE
    }

    pub fn has_kick_rom(&self) -> bool {
        self.has_rom() && self.rom.size() > BOOT_ROM_SIZE
    }

    pub fn has_wom(&self) -> bool {
        self.wom.is_allocated()
    }

    pub fn has_ext(&self) -> bool {
        self.ext.is_allocated()
    }

    pub fn wom_is_locked(&self) -> bool {
        self.wom_lock
    }

    /// True while writes to the ROM mirror still reach the WOM.
    pub fn wom_is_writable(&self) -> bool {
        self.has_wom() && !self.wom_lock
    }

    /// Installs a boot ROM or a Kickstart ROM, depending on the image size.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<()> {
        check_image(RegionKind::Rom, image)?;

        if image.len() <= BOOT_ROM_SIZE {
            tracing::info!("[MEM] Installing boot ROM ({} bytes)", image.len());
            self.alloc(RegionKind::Rom, BOOT_ROM_SIZE)?;
            self.alloc(RegionKind::Wom, WOM_SIZE)?;
            self.alloc(RegionKind::Ext, 0)?;
            self.wom.fill(0);
            self.wom_lock = false;
        } else {
            tracing::info!("[MEM] Installing Kickstart ROM ({} bytes)", image.len());
            self.alloc(RegionKind::Rom, image.len().next_power_of_two())?;
            self.alloc(RegionKind::Wom, 0)?;
        }

        self.rom.load(image);
        self.update_mem_src_tables();
        Ok(())
    }

    pub fn load_ext(&mut self, image: &[u8]) -> Result<()> {
        check_image(RegionKind::Ext, image)?;

        tracing::info!("[MEM] Installing extension ROM ({} bytes)", image.len());
        let size = image.len().next_power_of_two().max(64 * KB);
        self.alloc(RegionKind::Ext, size)?;
        self.ext.load(image);
        Ok(())
    }

    /// Copies a Kickstart image straight into the WOM, as the boot ROM would.
    pub fn load_wom(&mut self, image: &[u8]) -> Result<()> {
        if !self.has_wom() {
            return Err(MemoryError::NoWom);
        }
        check_image(RegionKind::Wom, image)?;

        tracing::info!("[WOM] Loading {} bytes", image.len());
        self.wom.load(image);
        Ok(())
    }

    pub fn load_rom_from_file<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<()> {
        let image = read_file(path)?;
        self.load_rom(&image)?;
        Ok(())
    }

    pub fn load_ext_from_file<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<()> {
        let image = read_file(path)?;
        self.load_ext(&image)?;
        Ok(())
    }

    pub fn load_wom_from_file<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<()> {
        let image = read_file(path)?;
        self.load_wom(&image)?;
        Ok(())
    }

    fn save_region<P: AsRef<Path>>(&self, kind: RegionKind, path: P) -> anyhow::Result<()> {
        let region = self.region(kind);
        if !region.is_allocated() {
            return Err(MemoryError::NoFirmware(kind).into());
        }

        let mut file = File::create(path)?;
        file.write_all(region.contents())?;
        Ok(())
    }

    pub fn save_rom<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        self.save_region(RegionKind::Rom, path)
    }

    pub fn save_wom<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        self.save_region(RegionKind::Wom, path)
    }

    pub fn save_ext<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        self.save_region(RegionKind::Ext, path)
    }

    pub fn rom_fingerprint(&self) -> u32 {
        fnv_1a_32(self.rom.contents())
    }

    pub fn wom_fingerprint(&self) -> u32 {
        fnv_1a_32(self.wom.contents())
    }

    pub fn ext_fingerprint(&self) -> u32 {
        fnv_1a_32(self.ext.contents())
    }

    /// Write through the ROM mirror. Byte writes are dropped.
    pub(crate) fn poke_rom8(&mut self, addr: u32, value: u8) {
        if self.config.diagnostics.mem {
            tracing::trace!("[MEM] Ignoring byte write to ROM {:06X} = {:02X}", addr, value);
        }
    }

    /// Write through the ROM mirror. The first word written while the WOM is
    /// writable locks it.
    pub(crate) fn poke_rom16(&mut self, addr: u32, value: u16) {
        if self.wom_is_writable() {
            tracing::debug!("[WOM] Locked by write to {:06X} = {:04X}", addr, value);
            self.wom_lock = true;
            self.update_mem_src_tables();
            self.queue().borrow_mut().push_back(Message::WomLocked);
        } else if self.config.diagnostics.mem {
            tracing::trace!("[MEM] Ignoring write to ROM {:06X} = {:04X}", addr, value);
        }
    }

    pub(crate) fn poke_wom8(&mut self, addr: u32, value: u8) {
        if self.wom_lock {
            if self.config.diagnostics.mem {
                tracing::trace!("[WOM] Locked, ignoring {:06X} = {:02X}", addr, value);
            }
            return;
        }
        self.wom.write8(addr, value);
    }

    pub(crate) fn poke_wom16(&mut self, addr: u32, value: u16) {
        if self.wom_lock {
            if self.config.diagnostics.mem {
                tracing::trace!("[WOM] Locked, ignoring {:06X} = {:04X}", addr, value);
            }
            return;
        }
        self.wom.write16(addr, value);
    }
}
