//! Access dispatcher.
//!
//! Every CPU access is routed through the CPU bank map, every DMA access
//! through the Agnus bank map. Only the CPU ever waits for the bus: the DMA
//! engines own it whenever they need it, which is what stalls the CPU.

use crate::{
    bank_map::{bank, MemorySource, FAST_RAM_START},
    board::{Board, PokeSource},
    config::UnmappedMemory,
    memory::Memory,
    utils::{byte_of, hi_lo},
};

/// The address bus has 24 lines.
pub const ADDR_MASK: u32 = 0xFFFFFF;

impl<B: Board> Memory<B> {
    #[inline]
    fn wait_for_bus(&mut self) {
        self.stats.bus_waits.inc();
        self.board.execute_until_bus_is_free();
    }

    #[inline]
    fn wait_for_cia(&mut self) {
        self.stats.bus_waits.inc();
        self.board.execute_until_bus_is_free_for_cia();
    }

    #[inline]
    fn wait_for_slow_ram(&mut self) {
        if self.config.slow_ram_delay {
            self.wait_for_bus();
        }
    }

    fn unmapped_value(&self) -> u16 {
        match self.config.unmapped {
            UnmappedMemory::Floating => self.data_bus,
            UnmappedMemory::AllOnes => 0xFFFF,
            UnmappedMemory::AllZeroes => 0x0000,
        }
    }

    #[inline]
    fn check_alignment(&self, addr: u32) {
        if addr & 1 != 0 && self.config.diagnostics.mem {
            tracing::debug!("[MEM] Word access at odd address {:06X}", addr);
        }
    }

    //
    // CPU reads
    //

    pub fn peek8(&mut self, addr: u32) -> u8 {
        let addr = addr & ADDR_MASK;

        match self.cpu_map[bank(addr)] {
            MemorySource::Unmapped => {
                self.wait_for_bus();
                self.stats.unmapped_reads.inc();
                self.data_bus = self.unmapped_value();
                byte_of(self.data_bus, addr)
            }
            MemorySource::Chip => {
                self.wait_for_bus();
                self.stats.chip_reads.inc();
                let value = self.chip.read8(addr);
                self.data_bus = value as u16;
                value
            }
            MemorySource::Slow => {
                self.wait_for_slow_ram();
                self.stats.slow_reads.inc();
                let value = self.slow.read8(addr);
                self.data_bus = value as u16;
                value
            }
            MemorySource::Fast => {
                self.stats.fast_reads.inc();
                self.fast.read8(addr - FAST_RAM_START)
            }
            MemorySource::Cia => {
                self.wait_for_cia();
                let value = self.peek_cia8(addr);
                self.data_bus = value as u16;
                value
            }
            MemorySource::Rtc => {
                self.wait_for_bus();
                let value = self.peek_rtc8(addr);
                self.data_bus = value as u16;
                value
            }
            MemorySource::Custom => {
                self.wait_for_bus();
                self.peek_custom8(addr)
            }
            MemorySource::Autoconf => {
                self.wait_for_bus();
                let value = self.peek_autoconf8(addr);
                self.data_bus = value as u16;
                value
            }
            MemorySource::Rom => {
                self.stats.kick_reads.inc();
                self.rom.read8(addr)
            }
            MemorySource::Wom => {
                self.stats.kick_reads.inc();
                self.wom.read8(addr)
            }
            MemorySource::Ext => {
                self.stats.kick_reads.inc();
                self.ext.read8(addr)
            }
        }
    }

    pub fn peek16(&mut self, addr: u32) -> u16 {
        let addr = addr & ADDR_MASK;
        self.check_alignment(addr);

        match self.cpu_map[bank(addr)] {
            MemorySource::Unmapped => {
                self.wait_for_bus();
                self.stats.unmapped_reads.inc();
                self.data_bus = self.unmapped_value();
                self.data_bus
            }
            MemorySource::Chip => {
                self.wait_for_bus();
                self.stats.chip_reads.inc();
                self.data_bus = self.chip.read16(addr);
                self.data_bus
            }
            MemorySource::Slow => {
                self.wait_for_slow_ram();
                self.stats.slow_reads.inc();
                self.data_bus = self.slow.read16(addr);
                self.data_bus
            }
            MemorySource::Fast => {
                self.stats.fast_reads.inc();
                self.fast.read16(addr - FAST_RAM_START)
            }
            MemorySource::Cia => {
                self.wait_for_cia();
                self.data_bus = self.peek_cia16(addr);
                self.data_bus
            }
            MemorySource::Rtc => {
                self.wait_for_bus();
                self.data_bus = self.peek_rtc16(addr);
                self.data_bus
            }
            MemorySource::Custom => {
                self.wait_for_bus();
                self.peek_custom16(addr)
            }
            MemorySource::Autoconf => {
                self.wait_for_bus();
                self.data_bus = self.peek_autoconf16(addr);
                self.data_bus
            }
            MemorySource::Rom => {
                self.stats.kick_reads.inc();
                self.rom.read16(addr)
            }
            MemorySource::Wom => {
                self.stats.kick_reads.inc();
                self.wom.read16(addr)
            }
            MemorySource::Ext => {
                self.stats.kick_reads.inc();
                self.ext.read16(addr)
            }
        }
    }

    /// There is no 32-bit bus. Long words are two word accesses.
    pub fn peek32(&mut self, addr: u32) -> u32 {
        let hi = self.peek16(addr);
        let lo = self.peek16(addr.wrapping_add(2));
        (hi as u32) << 16 | lo as u32
    }

    //
    // Side-effect free reads
    //

    pub fn spypeek8(&self, addr: u32) -> u8 {
        let addr = addr & ADDR_MASK;

        match self.cpu_map[bank(addr)] {
            MemorySource::Unmapped => byte_of(self.unmapped_value(), addr),
            MemorySource::Chip => self.chip.read8(addr),
            MemorySource::Slow => self.slow.read8(addr),
            MemorySource::Fast => self.fast.read8(addr - FAST_RAM_START),
            MemorySource::Cia => self.spypeek_cia8(addr),
            MemorySource::Rtc => self.spypeek_rtc8(addr),
            MemorySource::Custom => self.spypeek_custom8(addr),
            MemorySource::Autoconf => self.spypeek_autoconf8(addr),
            MemorySource::Rom => self.rom.read8(addr),
            MemorySource::Wom => self.wom.read8(addr),
            MemorySource::Ext => self.ext.read8(addr),
        }
    }

    pub fn spypeek16(&self, addr: u32) -> u16 {
        let addr = addr & ADDR_MASK;

        match self.cpu_map[bank(addr)] {
            MemorySource::Unmapped => self.unmapped_value(),
            MemorySource::Chip => self.chip.read16(addr),
            MemorySource::Slow => self.slow.read16(addr),
            MemorySource::Fast => self.fast.read16(addr - FAST_RAM_START),
            MemorySource::Cia => self.spypeek_cia16(addr),
            MemorySource::Rtc => self.spypeek_rtc16(addr),
            MemorySource::Custom => self.spypeek_custom16(addr),
            MemorySource::Autoconf => self.spypeek_autoconf16(addr),
            MemorySource::Rom => self.rom.read16(addr),
            MemorySource::Wom => self.wom.read16(addr),
            MemorySource::Ext => self.ext.read16(addr),
        }
    }

    pub fn spypeek32(&self, addr: u32) -> u32 {
        let hi = self.spypeek16(addr);
        let lo = self.spypeek16(addr.wrapping_add(2));
        (hi as u32) << 16 | lo as u32
    }

    //
    // CPU writes
    //

    pub fn poke8(&mut self, addr: u32, value: u8) {
        let addr = addr & ADDR_MASK;

        match self.cpu_map[bank(addr)] {
            MemorySource::Unmapped => {
                self.wait_for_bus();
                self.stats.unmapped_writes.inc();
                self.data_bus = hi_lo(value, value);
            }
            MemorySource::Chip => {
                self.wait_for_bus();
                self.stats.chip_writes.inc();
                self.data_bus = value as u16;
                self.chip.write8(addr, value);
            }
            MemorySource::Slow => {
                self.wait_for_slow_ram();
                self.stats.slow_writes.inc();
                self.data_bus = value as u16;
                self.slow.write8(addr, value);
            }
            MemorySource::Fast => {
                self.stats.fast_writes.inc();
                self.fast.write8(addr - FAST_RAM_START, value);
            }
            MemorySource::Cia => {
                self.wait_for_cia();
                self.data_bus = value as u16;
                self.poke_cia8(addr, value);
            }
            MemorySource::Rtc => {
                self.wait_for_bus();
                self.data_bus = value as u16;
                self.poke_rtc8(addr, value);
            }
            MemorySource::Custom => {
                self.wait_for_bus();
                self.data_bus = hi_lo(value, value);
                self.poke_custom8(PokeSource::Cpu, addr, value);
            }
            MemorySource::Autoconf => {
                self.wait_for_bus();
                self.data_bus = value as u16;
                self.poke_autoconf8(addr, value);
            }
            MemorySource::Rom => {
                self.stats.kick_writes.inc();
                self.poke_rom8(addr, value);
            }
            MemorySource::Wom => {
                self.stats.kick_writes.inc();
                self.poke_wom8(addr, value);
            }
            MemorySource::Ext => {
                self.stats.kick_writes.inc();
                if self.config.diagnostics.mem {
                    tracing::trace!("[MEM] Ignoring write to extension ROM {:06X}", addr);
                }
            }
        }
    }

    pub fn poke16(&mut self, addr: u32, value: u16) {
        let addr = addr & ADDR_MASK;
        self.check_alignment(addr);

        match self.cpu_map[bank(addr)] {
            MemorySource::Unmapped => {
                self.wait_for_bus();
                self.stats.unmapped_writes.inc();
                self.data_bus = value;
            }
            MemorySource::Chip => {
                self.wait_for_bus();
                self.stats.chip_writes.inc();
                self.data_bus = value;
                self.chip.write16(addr, value);
            }
            MemorySource::Slow => {
                self.wait_for_slow_ram();
                self.stats.slow_writes.inc();
                self.data_bus = value;
                self.slow.write16(addr, value);
            }
            MemorySource::Fast => {
                self.stats.fast_writes.inc();
                self.fast.write16(addr - FAST_RAM_START, value);
            }
            MemorySource::Cia => {
                self.wait_for_cia();
                self.data_bus = value;
                self.poke_cia16(addr, value);
            }
            MemorySource::Rtc => {
                self.wait_for_bus();
                self.data_bus = value;
                self.poke_rtc16(addr, value);
            }
            MemorySource::Custom => {
                self.wait_for_bus();
                self.data_bus = value;
                self.poke_custom16(PokeSource::Cpu, addr, value);
            }
            MemorySource::Autoconf => {
                self.wait_for_bus();
                self.data_bus = value;
                self.poke_autoconf16(addr, value);
            }
            MemorySource::Rom => {
                self.stats.kick_writes.inc();
                self.poke_rom16(addr, value);
            }
            MemorySource::Wom => {
                self.stats.kick_writes.inc();
                self.poke_wom16(addr, value);
            }
            MemorySource::Ext => {
                self.stats.kick_writes.inc();
                if self.config.diagnostics.mem {
                    tracing::trace!("[MEM] Ignoring write to extension ROM {:06X}", addr);
                }
            }
        }
    }

    pub fn poke32(&mut self, addr: u32, value: u32) {
        self.poke16(addr, (value >> 16) as u16);
        self.poke16(addr.wrapping_add(2), value as u16);
    }

    //
    // DMA accesses
    //

    /// Reads a word on behalf of a DMA engine. Never waits, never latches.
    pub fn agnus_peek16(&mut self, addr: u32) -> u16 {
        debug_assert!(addr & 1 == 0, "DMA read from odd address {:06X}", addr);
        self.agnus_spypeek16(addr)
    }

    pub fn agnus_spypeek16(&self, addr: u32) -> u16 {
        let addr = addr & self.config.agnus.ptr_mask();

        match self.agnus_map[bank(addr)] {
            MemorySource::Chip => self.chip.read16(addr),
            MemorySource::Slow => self.slow.read16(addr),
            MemorySource::Unmapped => 0,
            source => {
                debug_assert!(false, "DMA cannot reach {}", source);
                0
            }
        }
    }

    pub fn agnus_poke16(&mut self, addr: u32, value: u16) {
        debug_assert!(addr & 1 == 0, "DMA write to odd address {:06X}", addr);
        let addr = addr & self.config.agnus.ptr_mask();

        match self.agnus_map[bank(addr)] {
            MemorySource::Chip => self.chip.write16(addr, value),
            MemorySource::Slow => self.slow.write16(addr, value),
            MemorySource::Unmapped => {}
            source => debug_assert!(false, "DMA cannot reach {}", source),
        }
    }
}
