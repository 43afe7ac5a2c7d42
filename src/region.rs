use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, Result};

/// Extra bytes allocated behind every region so a misaligned word access at
/// the last byte of a region stays inside the buffer.
pub const REGION_PADDING: usize = 3;

pub const KB: usize = 1024;
pub const MB: usize = 1024 * KB;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Boot ROM or Kickstart ROM
    Rom,
    /// Write-once Kickstart memory of the A1000
    Wom,
    /// Extension ROM
    Ext,
    Chip,
    Slow,
    Fast,
}

impl RegionKind {
    pub const ALL: [RegionKind; 6] = [
        RegionKind::Rom,
        RegionKind::Wom,
        RegionKind::Ext,
        RegionKind::Chip,
        RegionKind::Slow,
        RegionKind::Fast,
    ];

    /// Largest size the 24-bit address map can make visible for this region.
    pub fn max_size(&self) -> usize {
        match self {
            RegionKind::Rom => 512 * KB,
            RegionKind::Wom => 256 * KB,
            RegionKind::Ext => 512 * KB,
            RegionKind::Chip => 2 * MB,
            RegionKind::Slow => MB,
            RegionKind::Fast => 8 * MB,
        }
    }

    pub fn is_ram(&self) -> bool {
        matches!(self, RegionKind::Chip | RegionKind::Slow | RegionKind::Fast)
    }

    /// Checks a requested size against the address map: zero, or a power of
    /// two covering whole banks and not exceeding the region's window.
    pub fn validate_size(&self, size: usize) -> Result<()> {
        if size == 0 {
            return Ok(());
        }

        let min = match self {
            RegionKind::Chip | RegionKind::Slow => 256 * KB,
            _ => 64 * KB,
        };

        if !size.is_power_of_two() || size < min || size > self.max_size() {
            return Err(MemoryError::InvalidSize {
                region: *self,
                size,
            });
        }

        Ok(())
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Rom => write!(f, "ROM"),
            RegionKind::Wom => write!(f, "WOM"),
            RegionKind::Ext => write!(f, "Extension ROM"),
            RegionKind::Chip => write!(f, "Chip RAM"),
            RegionKind::Slow => write!(f, "Slow RAM"),
            RegionKind::Fast => write!(f, "Fast RAM"),
        }
    }
}

/// A physically distinct block of memory.
///
/// The buffer is empty exactly when the region is unallocated. Accesses are
/// big-endian and wrap through `mask`, which mirrors the region across any
/// bank window larger than the region itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub kind: RegionKind,
    data: Vec<u8>,
    size: usize,
    mask: u32,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_allocated() {
            write!(f, "{} size={:#08X} mask={:#08X}", self.kind, self.size, self.mask)
        } else {
            write!(f, "{} (none)", self.kind)
        }
    }
}

impl Region {
    pub fn new(kind: RegionKind) -> Self {
        Region {
            kind,
            data: Vec::new(),
            size: 0,
            mask: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn is_allocated(&self) -> bool {
        self.size != 0
    }

    /// Logical contents without the padding bytes.
    pub fn contents(&self) -> &[u8] {
        &self.data[..self.size]
    }

    pub fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.size]
    }

    /// Resizes the region. Returns `Ok(false)` if the size did not change.
    ///
    /// On allocation failure the region is left unallocated.
    pub fn allocate(&mut self, size: usize) -> Result<bool> {
        if size == self.size {
            return Ok(false);
        }

        self.data = Vec::new();
        self.size = 0;
        self.mask = 0;

        if size == 0 {
            return Ok(true);
        }

        let mut data = Vec::new();
        data.try_reserve_exact(size + REGION_PADDING)
            .map_err(|_| MemoryError::OutOfMemory {
                region: self.kind,
                size,
            })?;
        data.resize(size + REGION_PADDING, 0);

        self.data = data;
        self.size = size;
        self.mask = (size - 1) as u32;

        Ok(true)
    }

    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Copies an image into the region, zero-padding or truncating it.
    pub fn load(&mut self, image: &[u8]) {
        let len = image.len().min(self.size);
        self.data[..len].copy_from_slice(&image[..len]);
        self.data[len..].fill(0);
    }

    #[inline]
    fn offset(&self, addr: u32) -> usize {
        debug_assert!(self.is_allocated(), "access to unallocated {}", self.kind);
        (addr & self.mask) as usize
    }

    #[inline]
    pub fn read8(&self, addr: u32) -> u8 {
        let offset = self.offset(addr);
        self.data.get(offset).copied().unwrap_or(0)
    }

    #[inline]
    pub fn read16(&self, addr: u32) -> u16 {
        let offset = self.offset(addr);
        match self.data.get(offset..offset + 2) {
            Some(bytes) => u16::from_be_bytes([bytes[0], bytes[1]]),
            None => 0,
        }
    }

    #[inline]
    pub fn write8(&mut self, addr: u32, value: u8) {
        let offset = self.offset(addr);
        if let Some(byte) = self.data.get_mut(offset) {
            *byte = value;
        }
    }

    #[inline]
    pub fn write16(&mut self, addr: u32, value: u16) {
        let offset = self.offset(addr);
        if let Some(bytes) = self.data.get_mut(offset..offset + 2) {
            bytes.copy_from_slice(&value.to_be_bytes());
        }
    }
}
