//! CIA window (0xA00000 - 0xBFFFFF).
//!
//! CIA A sits on the low byte of the data bus and is selected by A12 = 0.
//! CIA B sits on the high byte and is selected by A13 = 0. Register numbers
//! come from A8 - A11. Bytes not driven by a CIA carry the prefetched
//! instruction word.

use crate::{
    board::{Board, CiaId},
    memory::Memory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CiaSelect {
    reg: u8,
    a: bool,
    b: bool,
}

impl CiaSelect {
    fn decode(addr: u32) -> Self {
        CiaSelect {
            reg: ((addr >> 8) & 0xF) as u8,
            a: addr & 0x1000 == 0,
            b: addr & 0x2000 == 0,
        }
    }
}

impl<B: Board> Memory<B> {
    pub fn peek_cia8(&mut self, addr: u32) -> u8 {
        let sel = CiaSelect::decode(addr);
        let ird = self.board.ird();

        let value = if addr & 1 == 1 {
            if sel.a {
                self.board.peek_cia(CiaId::A, sel.reg)
            } else {
                ird as u8
            }
        } else if sel.b {
            self.board.peek_cia(CiaId::B, sel.reg)
        } else {
            (ird >> 8) as u8
        };

        if self.config.diagnostics.cia {
            tracing::trace!("[CIA] peek8 {:06X} (reg {:X}) = {:02X}", addr, sel.reg, value);
        }
        value
    }

    pub fn peek_cia16(&mut self, addr: u32) -> u16 {
        let sel = CiaSelect::decode(addr);
        let ird = self.board.ird();

        let value = match (sel.a, sel.b) {
            (false, false) => ird,
            (a, b) => {
                let hi = if b {
                    self.board.peek_cia(CiaId::B, sel.reg)
                } else {
                    (ird >> 8) as u8
                };
                let lo = if a {
                    self.board.peek_cia(CiaId::A, sel.reg)
                } else {
                    ird as u8
                };
                (hi as u16) << 8 | lo as u16
            }
        };

        if self.config.diagnostics.cia {
            tracing::trace!("[CIA] peek16 {:06X} (reg {:X}) = {:04X}", addr, sel.reg, value);
        }
        value
    }

    pub fn spypeek_cia8(&self, addr: u32) -> u8 {
        let sel = CiaSelect::decode(addr);
        let ird = self.board.ird();

        if addr & 1 == 1 {
            if sel.a {
                self.board.spypeek_cia(CiaId::A, sel.reg)
            } else {
                ird as u8
            }
        } else if sel.b {
            self.board.spypeek_cia(CiaId::B, sel.reg)
        } else {
            (ird >> 8) as u8
        }
    }

    pub fn spypeek_cia16(&self, addr: u32) -> u16 {
        let sel = CiaSelect::decode(addr);
        let ird = self.board.ird();

        let hi = if sel.b {
            self.board.spypeek_cia(CiaId::B, sel.reg)
        } else {
            (ird >> 8) as u8
        };
        let lo = if sel.a {
            self.board.spypeek_cia(CiaId::A, sel.reg)
        } else {
            ird as u8
        };
        (hi as u16) << 8 | lo as u16
    }

    /// A byte write reaches every selected CIA, whichever half it is on.
    pub fn poke_cia8(&mut self, addr: u32, value: u8) {
        let sel = CiaSelect::decode(addr);

        if self.config.diagnostics.cia {
            tracing::trace!("[CIA] poke8 {:06X} (reg {:X}) = {:02X}", addr, sel.reg, value);
        }

        if sel.a {
            self.board.poke_cia(CiaId::A, sel.reg, value);
        }
        if sel.b {
            self.board.poke_cia(CiaId::B, sel.reg, value);
        }
    }

    pub fn poke_cia16(&mut self, addr: u32, value: u16) {
        let sel = CiaSelect::decode(addr);

        if self.config.diagnostics.cia {
            tracing::trace!("[CIA] poke16 {:06X} (reg {:X}) = {:04X}", addr, sel.reg, value);
        }

        if sel.a {
            self.board.poke_cia(CiaId::A, sel.reg, value as u8);
        }
        if sel.b {
            self.board.poke_cia(CiaId::B, sel.reg, (value >> 8) as u8);
        }
    }
}
