//! Contracts of the components the memory subsystem talks to.
//!
//! The dispatcher owns a single [`Board`] that bundles all of them. The CPU,
//! the DMA scheduler, the custom chips, the CIAs and the expansion boards
//! live on the other side of these traits.

use serde::{Deserialize, Serialize};

/// DMA engine currently holding the chip bus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BusOwner {
    Refresh,
    Disk,
    Audio,
    Bitplane,
    Sprite,
    Copper,
    Blitter,
}

/// Who writes a custom register.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PokeSource {
    Cpu,
    Copper,
}

/// Which half of a 32-bit pointer register is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    High,
    Low,
}

impl Half {
    /// Pointer registers come in pairs, the high word at the lower offset.
    pub fn of(offset: u16) -> Half {
        if offset & 0x2 == 0 {
            Half::High
        } else {
            Half::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitterChannel {
    A,
    B,
    C,
    D,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CiaId {
    A,
    B,
}

/// DMA scheduler contract.
pub trait BusArbiter {
    /// Advances emulated time until no DMA engine holds the chip bus.
    fn execute_until_bus_is_free(&mut self);

    /// Advances emulated time to the next E-clock slot a CIA can answer in.
    fn execute_until_bus_is_free_for_cia(&mut self);

    fn bus_occupant(&self) -> Option<BusOwner>;

    /// Value the current DMA transfer drives onto the bus.
    fn bus_value(&self) -> u16;
}

/// Register owners behind the custom chip window (Agnus, Denise, Paula,
/// Blitter, Copper).
///
/// Channel and sprite numbers are zero based.
pub trait Chipset {
    // Readable registers
    fn peek_bltddat(&self) -> u16;
    fn peek_dmaconr(&self) -> u16;
    fn peek_vposr(&self) -> u16;
    fn peek_vhposr(&self) -> u16;
    fn peek_dskdatr(&self) -> u16;
    fn peek_joydat(&self, port: usize) -> u16;
    fn peek_clxdat(&self) -> u16;
    fn peek_adkconr(&self) -> u16;
    fn peek_potdat(&self, port: usize) -> u16;
    fn peek_potgor(&self) -> u16;
    fn peek_serdatr(&self) -> u16;
    fn peek_dskbytr(&self) -> u16;
    fn peek_intenar(&self) -> u16;
    fn peek_intreqr(&self) -> u16;
    fn peek_deniseid(&self) -> u16;

    /// Reading CLXDAT clears the collision bits.
    fn ack_clxdat(&mut self);

    // Disk
    fn poke_dskpt(&mut self, half: Half, value: u16);
    fn poke_dsklen(&mut self, value: u16);
    fn poke_dskdat(&mut self, value: u16);
    fn poke_dsksync(&mut self, value: u16);

    // Beam and control
    fn poke_vposw(&mut self, value: u16);
    fn poke_vhposw(&mut self, value: u16);
    fn poke_copcon(&mut self, value: u16);
    fn poke_serdat(&mut self, value: u16);
    fn poke_serper(&mut self, value: u16);
    fn poke_potgo(&mut self, value: u16);
    fn poke_joytest(&mut self, value: u16);

    // Blitter
    fn poke_bltcon0(&mut self, value: u16);
    fn poke_bltcon0l(&mut self, value: u16);
    fn poke_bltcon1(&mut self, value: u16);
    fn poke_bltafwm(&mut self, value: u16);
    fn poke_bltalwm(&mut self, value: u16);
    fn poke_bltpt(&mut self, channel: BlitterChannel, half: Half, value: u16);
    fn poke_bltmod(&mut self, channel: BlitterChannel, value: u16);
    fn poke_bltdat(&mut self, channel: BlitterChannel, value: u16);
    fn poke_bltsize(&mut self, value: u16, source: PokeSource);
    fn poke_bltsizv(&mut self, value: u16);
    fn poke_bltsizh(&mut self, value: u16);

    // Copper
    fn poke_coplc(&mut self, list: usize, half: Half, value: u16);
    fn poke_copjmp(&mut self, list: usize, source: PokeSource);
    fn poke_copins(&mut self, value: u16);

    // Display window, fetch and DMA control
    fn poke_diwstrt(&mut self, value: u16, source: PokeSource);
    fn poke_diwstop(&mut self, value: u16, source: PokeSource);
    fn poke_ddfstrt(&mut self, value: u16);
    fn poke_ddfstop(&mut self, value: u16);
    fn poke_dmacon(&mut self, value: u16);
    fn poke_clxcon(&mut self, value: u16);
    fn poke_intena(&mut self, value: u16);
    fn poke_intreq(&mut self, value: u16);
    fn poke_adkcon(&mut self, value: u16);

    // Audio
    fn poke_audlc(&mut self, channel: usize, half: Half, value: u16);
    fn poke_audlen(&mut self, channel: usize, value: u16);
    fn poke_audper(&mut self, channel: usize, value: u16);
    fn poke_audvol(&mut self, channel: usize, value: u16);
    fn poke_auddat(&mut self, channel: usize, value: u16);

    // Bitplanes
    fn poke_bplpt(&mut self, plane: usize, half: Half, value: u16);
    fn poke_bplcon0(&mut self, value: u16);
    fn poke_bplcon1(&mut self, value: u16);
    fn poke_bplcon2(&mut self, value: u16);
    fn poke_bplmod(&mut self, field: usize, value: u16);
    fn poke_bpldat(&mut self, plane: usize, value: u16);

    // Sprites
    fn poke_sprpt(&mut self, sprite: usize, half: Half, value: u16);
    fn poke_sprpos(&mut self, sprite: usize, value: u16);
    fn poke_sprctl(&mut self, sprite: usize, value: u16);
    fn poke_sprdata(&mut self, sprite: usize, value: u16);
    fn poke_sprdatb(&mut self, sprite: usize, value: u16);

    fn poke_color(&mut self, index: usize, value: u16, source: PokeSource);
}

/// The two 8520 CIAs.
pub trait CiaPort {
    fn peek_cia(&mut self, id: CiaId, reg: u8) -> u8;
    fn spypeek_cia(&self, id: CiaId, reg: u8) -> u8;
    fn poke_cia(&mut self, id: CiaId, reg: u8, value: u8);
}

pub trait CpuPort {
    /// Instruction register of the CPU (the last prefetched word).
    fn ird(&self) -> u16;
}

/// Zorro II auto-configuration space.
pub trait ExpansionPort {
    fn peek_autoconf(&mut self, addr: u32) -> u8;
    fn spypeek_autoconf(&self, addr: u32) -> u8;
    fn poke_autoconf(&mut self, addr: u32, value: u8);
}

pub trait Board: BusArbiter + Chipset + CiaPort + CpuPort + ExpansionPort {}

impl<T: BusArbiter + Chipset + CiaPort + CpuPort + ExpansionPort> Board for T {}
