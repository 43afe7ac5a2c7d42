//! Zorro II auto-configuration window (0xE80000 - 0xEFFFFF).
//!
//! Expansion boards answer byte-wide. Word accesses are split into two
//! consecutive byte accesses, high byte first.

use crate::{board::Board, memory::Memory};

impl<B: Board> Memory<B> {
    pub fn peek_autoconf8(&mut self, addr: u32) -> u8 {
        let value = self.board.peek_autoconf(addr);

        if self.config.diagnostics.autoconf {
            tracing::trace!("[AUTOCONF] peek8 {:06X} = {:02X}", addr, value);
        }
        value
    }

    pub fn peek_autoconf16(&mut self, addr: u32) -> u16 {
        let hi = self.peek_autoconf8(addr);
        let lo = self.peek_autoconf8(addr.wrapping_add(1));
        (hi as u16) << 8 | lo as u16
    }

    pub fn spypeek_autoconf8(&self, addr: u32) -> u8 {
        self.board.spypeek_autoconf(addr)
    }

    pub fn spypeek_autoconf16(&self, addr: u32) -> u16 {
        let hi = self.board.spypeek_autoconf(addr);
        let lo = self.board.spypeek_autoconf(addr.wrapping_add(1));
        (hi as u16) << 8 | lo as u16
    }

    pub fn poke_autoconf8(&mut self, addr: u32, value: u8) {
        if self.config.diagnostics.autoconf {
            tracing::trace!("[AUTOCONF] poke8 {:06X} = {:02X}", addr, value);
        }
        self.board.poke_autoconf(addr, value);
    }

    pub fn poke_autoconf16(&mut self, addr: u32, value: u16) {
        self.poke_autoconf8(addr, (value >> 8) as u8);
        self.poke_autoconf8(addr.wrapping_add(1), value as u8);
    }
}
