//! Custom chip register window (0xDFF000 and its mirrors).
//!
//! Registers are dispatched through a table indexed by the word offset. A
//! register is readable if its entry has a read handler and writable if it has
//! a write handler. Reading a register without a read handler does not fail:
//! the chips answer with whatever floats on the bus and, as a side effect, the
//! value on the data bus is written back into the register.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    board::{BlitterChannel, Board, Chipset, Half, PokeSource},
    memory::Memory,
};

pub type ReadFn = fn(&dyn Chipset, u16) -> u16;
pub type AckFn = fn(&mut dyn Chipset);
pub type WriteFn = fn(&mut dyn Chipset, u16, u16, PokeSource);

/// Value read from an undriven bus.
pub const FLOATING_BUS: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RegisterClass {
    ReadOnly,
    WriteOnly,
    ReadWrite,
    Unused,
}

#[derive(Clone, Copy)]
pub struct CustomRegister {
    pub name: &'static str,
    pub read: Option<ReadFn>,
    /// Side effect of a real (non-spy) read
    pub ack: Option<AckFn>,
    pub write: Option<WriteFn>,
}

impl CustomRegister {
    pub fn class(&self) -> RegisterClass {
        match (self.read.is_some(), self.write.is_some()) {
            (true, true) => RegisterClass::ReadWrite,
            (true, false) => RegisterClass::ReadOnly,
            (false, true) => RegisterClass::WriteOnly,
            (false, false) => RegisterClass::Unused,
        }
    }
}

#[rustfmt::skip]
const REGISTER_NAMES: [&str; 256] = [
    "BLTDDAT",  "DMACONR",  "VPOSR",    "VHPOSR",   "DSKDATR",  "JOY0DAT",  "JOY1DAT",  "CLXDAT",
    "ADKCONR",  "POT0DAT",  "POT1DAT",  "POTGOR",   "SERDATR",  "DSKBYTR",  "INTENAR",  "INTREQR",
    "DSKPTH",   "DSKPTL",   "DSKLEN",   "DSKDAT",   "REFPTR",   "VPOSW",    "VHPOSW",   "COPCON",
    "SERDAT",   "SERPER",   "POTGO",    "JOYTEST",  "STREQU",   "STRVBL",   "STRHOR",   "STRLONG",
    "BLTCON0",  "BLTCON1",  "BLTAFWM",  "BLTALWM",  "BLTCPTH",  "BLTCPTL",  "BLTBPTH",  "BLTBPTL",
    "BLTAPTH",  "BLTAPTL",  "BLTDPTH",  "BLTDPTL",  "BLTSIZE",  "BLTCON0L", "BLTSIZV",  "BLTSIZH",
    "BLTCMOD",  "BLTBMOD",  "BLTAMOD",  "BLTDMOD",  "unused",   "unused",   "unused",   "unused",
    "BLTCDAT",  "BLTBDAT",  "BLTADAT",  "unused",   "SPRHDAT",  "BPLHDAT",  "DENISEID", "DSKSYNC",
    "COP1LCH",  "COP1LCL",  "COP2LCH",  "COP2LCL",  "COPJMP1",  "COPJMP2",  "COPINS",   "DIWSTRT",
    "DIWSTOP",  "DDFSTRT",  "DDFSTOP",  "DMACON",   "CLXCON",   "INTENA",   "INTREQ",   "ADKCON",
    "AUD0LCH",  "AUD0LCL",  "AUD0LEN",  "AUD0PER",  "AUD0VOL",  "AUD0DAT",  "unused",   "unused",
    "AUD1LCH",  "AUD1LCL",  "AUD1LEN",  "AUD1PER",  "AUD1VOL",  "AUD1DAT",  "unused",   "unused",
    "AUD2LCH",  "AUD2LCL",  "AUD2LEN",  "AUD2PER",  "AUD2VOL",  "AUD2DAT",  "unused",   "unused",
    "AUD3LCH",  "AUD3LCL",  "AUD3LEN",  "AUD3PER",  "AUD3VOL",  "AUD3DAT",  "unused",   "unused",
    "BPL1PTH",  "BPL1PTL",  "BPL2PTH",  "BPL2PTL",  "BPL3PTH",  "BPL3PTL",  "BPL4PTH",  "BPL4PTL",
    "BPL5PTH",  "BPL5PTL",  "BPL6PTH",  "BPL6PTL",  "BPL7PTH",  "BPL7PTL",  "BPL8PTH",  "BPL8PTL",
    "BPLCON0",  "BPLCON1",  "BPLCON2",  "BPLCON3",  "BPL1MOD",  "BPL2MOD",  "BPLCON4",  "CLXCON2",
    "BPL1DAT",  "BPL2DAT",  "BPL3DAT",  "BPL4DAT",  "BPL5DAT",  "BPL6DAT",  "BPL7DAT",  "BPL8DAT",
    "SPR0PTH",  "SPR0PTL",  "SPR1PTH",  "SPR1PTL",  "SPR2PTH",  "SPR2PTL",  "SPR3PTH",  "SPR3PTL",
    "SPR4PTH",  "SPR4PTL",  "SPR5PTH",  "SPR5PTL",  "SPR6PTH",  "SPR6PTL",  "SPR7PTH",  "SPR7PTL",
    "SPR0POS",  "SPR0CTL",  "SPR0DATA", "SPR0DATB", "SPR1POS",  "SPR1CTL",  "SPR1DATA", "SPR1DATB",
    "SPR2POS",  "SPR2CTL",  "SPR2DATA", "SPR2DATB", "SPR3POS",  "SPR3CTL",  "SPR3DATA", "SPR3DATB",
    "SPR4POS",  "SPR4CTL",  "SPR4DATA", "SPR4DATB", "SPR5POS",  "SPR5CTL",  "SPR5DATA", "SPR5DATB",
    "SPR6POS",  "SPR6CTL",  "SPR6DATA", "SPR6DATB", "SPR7POS",  "SPR7CTL",  "SPR7DATA", "SPR7DATB",
    "COLOR00",  "COLOR01",  "COLOR02",  "COLOR03",  "COLOR04",  "COLOR05",  "COLOR06",  "COLOR07",
    "COLOR08",  "COLOR09",  "COLOR10",  "COLOR11",  "COLOR12",  "COLOR13",  "COLOR14",  "COLOR15",
    "COLOR16",  "COLOR17",  "COLOR18",  "COLOR19",  "COLOR20",  "COLOR21",  "COLOR22",  "COLOR23",
    "COLOR24",  "COLOR25",  "COLOR26",  "COLOR27",  "COLOR28",  "COLOR29",  "COLOR30",  "COLOR31",
    "HTOTAL",   "HSSTOP",   "HBSTRT",   "HBSTOP",   "VTOTAL",   "VSSTOP",   "VBSTRT",   "VBSTOP",
    "SPRHSTRT", "SPRHSTOP", "BPLHSTRT", "BPLHSTOP", "HHPOSW",   "HHPOSR",   "BEAMCON0", "HSSTRT",
    "VSSTRT",   "HCENTER",  "DIWHIGH",  "BPLHMOD",  "SPRHPTH",  "SPRHPTL",  "BPLHPTH",  "BPLHPTL",
    "RESERVED", "RESERVED", "RESERVED", "RESERVED", "RESERVED", "RESERVED", "FMODE",    "NO-OP",
];

pub static REGISTERS: Lazy<Vec<CustomRegister>> = Lazy::new(build_table);

#[inline]
pub fn register(offset: u16) -> &'static CustomRegister {
    &REGISTERS[((offset >> 1) & 0xFF) as usize]
}

pub fn register_name(offset: u16) -> &'static str {
    register(offset).name
}

pub fn register_class(offset: u16) -> RegisterClass {
    register(offset).class()
}

fn on_read(table: &mut [CustomRegister], offset: u16, read: ReadFn) {
    table[(offset >> 1) as usize].read = Some(read);
}

fn on_write(table: &mut [CustomRegister], offset: u16, write: WriteFn) {
    table[(offset >> 1) as usize].write = Some(write);
}

fn ack_clxdat(chipset: &mut dyn Chipset) {
    chipset.ack_clxdat();
}

fn blitter_channel(offset: u16) -> BlitterChannel {
    match offset {
        0x48..=0x4A | 0x60 | 0x70 => BlitterChannel::C,
        0x4C..=0x4E | 0x62 | 0x72 => BlitterChannel::B,
        0x50..=0x52 | 0x64 | 0x74 => BlitterChannel::A,
        _ => BlitterChannel::D,
    }
}

fn build_table() -> Vec<CustomRegister> {
    let mut t: Vec<CustomRegister> = REGISTER_NAMES
        .iter()
        .map(|&name| CustomRegister {
            name,
            read: None,
            ack: None,
            write: None,
        })
        .collect();

    // Read-only registers
    on_read(&mut t, 0x000, |c, _| c.peek_bltddat());
    on_read(&mut t, 0x002, |c, _| c.peek_dmaconr());
    on_read(&mut t, 0x004, |c, _| c.peek_vposr());
    on_read(&mut t, 0x006, |c, _| c.peek_vhposr());
    on_read(&mut t, 0x008, |c, _| c.peek_dskdatr());
    on_read(&mut t, 0x00A, |c, _| c.peek_joydat(0));
    on_read(&mut t, 0x00C, |c, _| c.peek_joydat(1));
    on_read(&mut t, 0x00E, |c, _| c.peek_clxdat());
    t[0x00E >> 1].ack = Some(ack_clxdat);
    on_read(&mut t, 0x010, |c, _| c.peek_adkconr());
    on_read(&mut t, 0x012, |c, _| c.peek_potdat(0));
    on_read(&mut t, 0x014, |c, _| c.peek_potdat(1));
    on_read(&mut t, 0x016, |c, _| c.peek_potgor());
    on_read(&mut t, 0x018, |c, _| c.peek_serdatr());
    on_read(&mut t, 0x01A, |c, _| c.peek_dskbytr());
    on_read(&mut t, 0x01C, |c, _| c.peek_intenar());
    on_read(&mut t, 0x01E, |c, _| c.peek_intreqr());
    on_read(&mut t, 0x07C, |c, _| c.peek_deniseid());

    // Disk, serial, pots and beam
    on_write(&mut t, 0x020, |c, r, v, _| c.poke_dskpt(Half::of(r), v));
    on_write(&mut t, 0x022, |c, r, v, _| c.poke_dskpt(Half::of(r), v));
    on_write(&mut t, 0x024, |c, _, v, _| c.poke_dsklen(v));
    on_write(&mut t, 0x026, |c, _, v, _| c.poke_dskdat(v));
    on_write(&mut t, 0x028, |_, _, _, _| {});
    on_write(&mut t, 0x02A, |c, _, v, _| c.poke_vposw(v));
    on_write(&mut t, 0x02C, |c, _, v, _| c.poke_vhposw(v));
    on_write(&mut t, 0x02E, |c, _, v, _| c.poke_copcon(v));
    on_write(&mut t, 0x030, |c, _, v, _| c.poke_serdat(v));
    on_write(&mut t, 0x032, |c, _, v, _| c.poke_serper(v));
    on_write(&mut t, 0x034, |c, _, v, _| c.poke_potgo(v));
    on_write(&mut t, 0x036, |c, _, v, _| c.poke_joytest(v));

    // Strobes only matter to the chips themselves
    for offset in (0x038..=0x03E).step_by(2) {
        on_write(&mut t, offset, |_, _, _, _| {});
    }

    // Blitter
    on_write(&mut t, 0x040, |c, _, v, _| c.poke_bltcon0(v));
    on_write(&mut t, 0x042, |c, _, v, _| c.poke_bltcon1(v));
    on_write(&mut t, 0x044, |c, _, v, _| c.poke_bltafwm(v));
    on_write(&mut t, 0x046, |c, _, v, _| c.poke_bltalwm(v));
    for offset in (0x048..=0x056).step_by(2) {
        on_write(&mut t, offset, |c, r, v, _| {
            c.poke_bltpt(blitter_channel(r), Half::of(r), v)
        });
    }
    on_write(&mut t, 0x058, |c, _, v, s| c.poke_bltsize(v, s));
    on_write(&mut t, 0x05A, |c, _, v, _| c.poke_bltcon0l(v));
    on_write(&mut t, 0x05C, |c, _, v, _| c.poke_bltsizv(v));
    on_write(&mut t, 0x05E, |c, _, v, _| c.poke_bltsizh(v));
    for offset in (0x060..=0x066).step_by(2) {
        on_write(&mut t, offset, |c, r, v, _| c.poke_bltmod(blitter_channel(r), v));
    }
    for offset in (0x070..=0x074).step_by(2) {
        on_write(&mut t, offset, |c, r, v, _| c.poke_bltdat(blitter_channel(r), v));
    }
    on_write(&mut t, 0x07E, |c, _, v, _| c.poke_dsksync(v));

    // Copper
    for offset in (0x080..=0x086).step_by(2) {
        on_write(&mut t, offset, |c, r, v, _| {
            c.poke_coplc(((r - 0x080) >> 2) as usize, Half::of(r), v)
        });
    }
    on_write(&mut t, 0x088, |c, _, _, s| c.poke_copjmp(0, s));
    on_write(&mut t, 0x08A, |c, _, _, s| c.poke_copjmp(1, s));
    on_write(&mut t, 0x08C, |c, _, v, _| c.poke_copins(v));

    // Display window, fetch, DMA and interrupts
    on_write(&mut t, 0x08E, |c, _, v, s| c.poke_diwstrt(v, s));
    on_write(&mut t, 0x090, |c, _, v, s| c.poke_diwstop(v, s));
    on_write(&mut t, 0x092, |c, _, v, _| c.poke_ddfstrt(v));
    on_write(&mut t, 0x094, |c, _, v, _| c.poke_ddfstop(v));
    on_write(&mut t, 0x096, |c, _, v, _| c.poke_dmacon(v));
    on_write(&mut t, 0x098, |c, _, v, _| c.poke_clxcon(v));
    on_write(&mut t, 0x09A, |c, _, v, _| c.poke_intena(v));
    on_write(&mut t, 0x09C, |c, _, v, _| c.poke_intreq(v));
    on_write(&mut t, 0x09E, |c, _, v, _| c.poke_adkcon(v));

    // Audio
    for base in (0x0A0..=0x0D0).step_by(0x10) {
        on_write(&mut t, base, |c, r, v, _| {
            c.poke_audlc(((r - 0x0A0) >> 4) as usize, Half::High, v)
        });
        on_write(&mut t, base + 0x2, |c, r, v, _| {
            c.poke_audlc(((r - 0x0A0) >> 4) as usize, Half::Low, v)
        });
        on_write(&mut t, base + 0x4, |c, r, v, _| {
            c.poke_audlen(((r - 0x0A0) >> 4) as usize, v)
        });
        on_write(&mut t, base + 0x6, |c, r, v, _| {
            c.poke_audper(((r - 0x0A0) >> 4) as usize, v)
        });
        on_write(&mut t, base + 0x8, |c, r, v, _| {
            c.poke_audvol(((r - 0x0A0) >> 4) as usize, v)
        });
        on_write(&mut t, base + 0xA, |c, r, v, _| {
            c.poke_auddat(((r - 0x0A0) >> 4) as usize, v)
        });
    }

    // Bitplanes (six on OCS)
    for offset in (0x0E0..=0x0F6).step_by(2) {
        on_write(&mut t, offset, |c, r, v, _| {
            c.poke_bplpt(((r - 0x0E0) >> 2) as usize, Half::of(r), v)
        });
    }
    on_write(&mut t, 0x100, |c, _, v, _| c.poke_bplcon0(v));
    on_write(&mut t, 0x102, |c, _, v, _| c.poke_bplcon1(v));
    on_write(&mut t, 0x104, |c, _, v, _| c.poke_bplcon2(v));
    on_write(&mut t, 0x108, |c, _, v, _| c.poke_bplmod(0, v));
    on_write(&mut t, 0x10A, |c, _, v, _| c.poke_bplmod(1, v));
    for offset in (0x110..=0x11A).step_by(2) {
        on_write(&mut t, offset, |c, r, v, _| {
            c.poke_bpldat(((r - 0x110) >> 1) as usize, v)
        });
    }

    // Sprites
    for offset in (0x120..=0x13E).step_by(2) {
        on_write(&mut t, offset, |c, r, v, _| {
            c.poke_sprpt(((r - 0x120) >> 2) as usize, Half::of(r), v)
        });
    }
    for base in (0x140..=0x178).step_by(8) {
        on_write(&mut t, base, |c, r, v, _| {
            c.poke_sprpos(((r - 0x140) >> 3) as usize, v)
        });
        on_write(&mut t, base + 0x2, |c, r, v, _| {
            c.poke_sprctl(((r - 0x140) >> 3) as usize, v)
        });
        on_write(&mut t, base + 0x4, |c, r, v, _| {
            c.poke_sprdata(((r - 0x140) >> 3) as usize, v)
        });
        on_write(&mut t, base + 0x6, |c, r, v, _| {
            c.poke_sprdatb(((r - 0x140) >> 3) as usize, v)
        });
    }

    for offset in (0x180..=0x1BE).step_by(2) {
        on_write(&mut t, offset, |c, r, v, s| {
            c.poke_color(((r - 0x180) >> 1) as usize, v, s)
        });
    }

    on_write(&mut t, 0x1FE, |_, _, _, _| {});

    t
}

impl<B: Board> Memory<B> {
    /// Reads a custom register on behalf of the CPU.
    pub fn peek_custom16(&mut self, addr: u32) -> u16 {
        let offset = (addr & 0x1FE) as u16;
        let reg = register(offset);

        let result = match reg.read {
            Some(read) => {
                let value = read(&self.board, offset);
                if let Some(ack) = reg.ack {
                    ack(&mut self.board);
                }
                value
            }
            None => self.peek_custom_faulty16(offset),
        };

        if self.config.diagnostics.ocsreg {
            tracing::trace!("[CUSTOM] peek {} ({:03X}) = {:04X}", reg.name, offset, result);
        }

        self.data_bus = result;
        result
    }

    /// Reading a register that cannot be read writes the data bus into it.
    fn peek_custom_faulty16(&mut self, offset: u16) -> u16 {
        if self.config.diagnostics.invreg {
            tracing::debug!(
                "[CUSTOM] Reading a non-readable register {} ({:03X})",
                register_name(offset),
                offset
            );
        }

        let latched = self.data_bus;
        self.poke_custom16(PokeSource::Cpu, offset as u32, latched);

        match self.board.bus_occupant() {
            Some(_) => self.board.bus_value(),
            None => FLOATING_BUS,
        }
    }

    pub fn spypeek_custom16(&self, addr: u32) -> u16 {
        let offset = (addr & 0x1FE) as u16;

        match register(offset).read {
            Some(read) => read(&self.board, offset),
            None => match self.board.bus_occupant() {
                Some(_) => self.board.bus_value(),
                None => FLOATING_BUS,
            },
        }
    }

    pub fn peek_custom8(&mut self, addr: u32) -> u8 {
        let word = self.peek_custom16(addr);
        if addr & 1 == 0 {
            (word >> 8) as u8
        } else {
            word as u8
        }
    }

    pub fn spypeek_custom8(&self, addr: u32) -> u8 {
        let word = self.spypeek_custom16(addr);
        if addr & 1 == 0 {
            (word >> 8) as u8
        } else {
            word as u8
        }
    }

    /// Writes a custom register. The Copper calls this directly.
    pub fn poke_custom16(&mut self, source: PokeSource, addr: u32, value: u16) {
        let offset = (addr & 0x1FE) as u16;
        let reg = register(offset);

        if self.config.diagnostics.ocsreg {
            tracing::trace!(
                "[CUSTOM] poke {} ({:03X}) = {:04X} [{:?}]",
                reg.name,
                offset,
                value,
                source
            );
        }

        match reg.write {
            Some(write) => write(&mut self.board, offset, value, source),
            None if offset <= 0x01E => {
                if self.config.diagnostics.invreg {
                    tracing::debug!("[CUSTOM] {} ({:03X}) is READ-ONLY", reg.name, offset);
                }
            }
            None => {
                if self.config.diagnostics.invreg {
                    tracing::debug!("[CUSTOM] {} ({:03X}) is NON-OCS", reg.name, offset);
                }
            }
        }
    }

    /// Byte writes hit both halves of the register.
    pub fn poke_custom8(&mut self, source: PokeSource, addr: u32, value: u8) {
        let word = u16::from_be_bytes([value, value]);
        self.poke_custom16(source, addr & 0x1FE, word);
    }
}
