use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
    board::Board,
    config::{AgnusRevision, ExtStart, MemoryConfig, RamInitPattern, UnmappedMemory},
    diagnostics::Diagnostics,
    error::Result,
    memory::{Memory, MessageQueue},
    rtc::RtcModel,
};

#[derive(Default)]
pub struct MemoryBuilder {
    config: MemoryConfig,
    rom: Option<Vec<u8>>,
    ext: Option<Vec<u8>>,
    queue: Option<MessageQueue>,
}

impl MemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&mut self, config: MemoryConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn chip_ram(&mut self, size: usize) -> &mut Self {
        self.config.chip_size = size;
        self
    }

    pub fn slow_ram(&mut self, size: usize) -> &mut Self {
        self.config.slow_size = size;
        self
    }

    pub fn fast_ram(&mut self, size: usize) -> &mut Self {
        self.config.fast_size = size;
        self
    }

    pub fn rom(&mut self, image: &[u8]) -> &mut Self {
        self.rom = Some(image.to_vec());
        self
    }

    pub fn ext(&mut self, image: &[u8], start: ExtStart) -> &mut Self {
        self.ext = Some(image.to_vec());
        self.config.ext_start = start;
        self
    }

    pub fn rtc(&mut self, model: RtcModel) -> &mut Self {
        self.config.rtc = model;
        self
    }

    pub fn agnus(&mut self, revision: AgnusRevision) -> &mut Self {
        self.config.agnus = revision;
        self
    }

    pub fn ram_init(&mut self, pattern: RamInitPattern) -> &mut Self {
        self.config.ram_init = pattern;
        self
    }

    pub fn unmapped(&mut self, unmapped: UnmappedMemory) -> &mut Self {
        self.config.unmapped = unmapped;
        self
    }

    pub fn diagnostics(&mut self, diagnostics: Diagnostics) -> &mut Self {
        self.config.diagnostics = diagnostics;
        self
    }

    /// Shares an existing message queue instead of creating a new one.
    pub fn queue(&mut self, queue: MessageQueue) -> &mut Self {
        self.queue = Some(queue);
        self
    }

    /// Creates the memory, installs the firmware and powers it on.
    pub fn build<B: Board>(&self, board: B) -> Result<Memory<B>> {
        let queue = self
            .queue
            .clone()
            .unwrap_or_else(|| Rc::new(RefCell::new(VecDeque::new())));

        let mut memory = Memory::new(board, self.config.clone(), queue)?;

        if let Some(rom) = &self.rom {
            memory.load_rom(rom)?;
        }
        if let Some(ext) = &self.ext {
            memory.load_ext(ext)?;
        }

        memory.power_on();
        Ok(memory)
    }
}
