use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use derivative::Derivative;
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    bank_map::{bank, BankMap, LayoutParams, MemorySource},
    board::Board,
    config::{ExtStart, MemoryConfig, RamInitPattern, UnmappedMemory},
    error::Result,
    region::{Region, RegionKind},
    rtc::{Rtc, RtcModel, WallClock},
    stats::MemoryStats,
};

/// Events for the host. Nobody waits for them to be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// The bank map has been rebuilt
    MemLayout,
    /// The WOM has become read-only
    WomLocked,
}

pub type MessageQueue = Rc<RefCell<VecDeque<Message>>>;

/// Memory subsystem of the machine.
///
/// Owns all memory regions and the bank maps derived from them, and routes
/// every access to the resource behind the addressed bank. The components
/// living on the other side of the bus are reached through `board`.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Memory<B> {
    #[derivative(Debug = "ignore")]
    pub board: B,
    pub config: MemoryConfig,

    pub(crate) rom: Region,
    pub(crate) wom: Region,
    pub(crate) ext: Region,
    pub(crate) chip: Region,
    pub(crate) slow: Region,
    pub(crate) fast: Region,

    pub(crate) cpu_map: BankMap,
    pub(crate) agnus_map: BankMap,

    /// Set once the WOM has been written through the ROM mirror
    pub(crate) wom_lock: bool,
    /// Mirrors the OVL line of CIA A
    pub(crate) overlay: bool,

    /// Last value transferred over the CPU data bus
    pub(crate) data_bus: u16,

    pub(crate) rtc: Rtc,
    pub(crate) stats: MemoryStats,

    #[derivative(Debug = "ignore")]
    queue: MessageQueue,
}

impl<B: Board> Memory<B> {
    pub fn new(board: B, config: MemoryConfig, queue: MessageQueue) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "[MEM] Initializing memory: chip={:#X} slow={:#X} fast={:#X}",
            config.chip_size,
            config.slow_size,
            config.fast_size
        );

        let mut memory = Memory {
            board,
            rtc: Rtc::new(config.rtc),
            config: config.clone(),
            rom: Region::new(RegionKind::Rom),
            wom: Region::new(RegionKind::Wom),
            ext: Region::new(RegionKind::Ext),
            chip: Region::new(RegionKind::Chip),
            slow: Region::new(RegionKind::Slow),
            fast: Region::new(RegionKind::Fast),
            cpu_map: BankMap::default(),
            agnus_map: BankMap::default(),
            wom_lock: false,
            overlay: false,
            data_bus: 0,
            stats: MemoryStats::default(),
            queue,
        };

        memory.alloc(RegionKind::Chip, config.chip_size)?;
        memory.alloc(RegionKind::Slow, config.slow_size)?;
        memory.alloc(RegionKind::Fast, config.fast_size)?;
        memory.update_mem_src_tables();

        Ok(memory)
    }

    pub fn with_wall_clock(mut self, clock: Box<dyn WallClock>) -> Self {
        self.rtc.set_wall_clock(clock);
        self
    }

    pub fn queue(&self) -> MessageQueue {
        self.queue.clone()
    }

    pub fn region(&self, kind: RegionKind) -> &Region {
        match kind {
            RegionKind::Rom => &self.rom,
            RegionKind::Wom => &self.wom,
            RegionKind::Ext => &self.ext,
            RegionKind::Chip => &self.chip,
            RegionKind::Slow => &self.slow,
            RegionKind::Fast => &self.fast,
        }
    }

    pub(crate) fn region_mut(&mut self, kind: RegionKind) -> &mut Region {
        match kind {
            RegionKind::Rom => &mut self.rom,
            RegionKind::Wom => &mut self.wom,
            RegionKind::Ext => &mut self.ext,
            RegionKind::Chip => &mut self.chip,
            RegionKind::Slow => &mut self.slow,
            RegionKind::Fast => &mut self.fast,
        }
    }

    /// Resizes a region and rebuilds the bank maps.
    ///
    /// Requesting the current size does nothing. If the allocation fails, the
    /// region stays unallocated and the maps are rebuilt without it.
    pub fn alloc(&mut self, kind: RegionKind, size: usize) -> Result<()> {
        kind.validate_size(size)?;

        let result = self.region_mut(kind).allocate(size);
        if let Ok(false) = result {
            return Ok(());
        }

        if let Err(err) = &result {
            tracing::warn!("[MEM] {}", err);
        }

        let size = self.region(kind).size();
        match kind {
            RegionKind::Chip => self.config.chip_size = size,
            RegionKind::Slow => self.config.slow_size = size,
            RegionKind::Fast => self.config.fast_size = size,
            _ => {}
        }

        self.update_mem_src_tables();
        result.map(|_| ())
    }

    pub fn dealloc(&mut self, kind: RegionKind) -> Result<()> {
        self.alloc(kind, 0)
    }

    pub fn alloc_chip(&mut self, size: usize) -> Result<()> {
        self.alloc(RegionKind::Chip, size)
    }

    pub fn alloc_slow(&mut self, size: usize) -> Result<()> {
        self.alloc(RegionKind::Slow, size)
    }

    pub fn alloc_fast(&mut self, size: usize) -> Result<()> {
        self.alloc(RegionKind::Fast, size)
    }

    pub fn chip_ram_size(&self) -> usize {
        self.chip.size()
    }

    pub fn slow_ram_size(&self) -> usize {
        self.slow.size()
    }

    pub fn fast_ram_size(&self) -> usize {
        self.fast.size()
    }

    pub(crate) fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            chip_size: self.chip.size(),
            slow_size: self.slow.size(),
            fast_size: self.fast.size(),
            has_rom: self.rom.is_allocated(),
            has_wom: self.wom.is_allocated(),
            has_ext: self.ext.is_allocated(),
            wom_lock: self.wom_lock,
            overlay: self.overlay,
            rtc: self.rtc.model() != RtcModel::None,
            ext_start: self.config.ext_start,
            agnus: self.config.agnus,
            slow_ram_mirror: self.config.slow_ram_mirror,
        }
    }

    /// Rebuilds both bank maps from scratch and notifies the host.
    pub fn update_mem_src_tables(&mut self) {
        let params = self.layout_params();

        self.cpu_map = BankMap::cpu(&params);
        self.agnus_map = BankMap::agnus(&params);

        if self.config.diagnostics.mem {
            for segment in self.cpu_map.segments() {
                tracing::trace!("[MEM] {}", segment);
            }
        }

        self.queue.borrow_mut().push_back(Message::MemLayout);
    }

    pub fn overlay(&self) -> bool {
        self.overlay
    }

    /// Called whenever the OVL line of CIA A changes.
    pub fn set_overlay(&mut self, overlay: bool) {
        if self.overlay != overlay {
            tracing::debug!("[MEM] Overlay {}", if overlay { "on" } else { "off" });
            self.overlay = overlay;
            self.update_mem_src_tables();
        }
    }

    pub fn set_rtc_model(&mut self, model: RtcModel) {
        if self.rtc.model() != model {
            self.config.rtc = model;
            self.rtc.set_model(model);
            self.update_mem_src_tables();
        }
    }

    pub fn set_ext_start(&mut self, ext_start: ExtStart) {
        if self.config.ext_start != ext_start {
            self.config.ext_start = ext_start;
            self.update_mem_src_tables();
        }
    }

    pub fn set_unmapped(&mut self, unmapped: UnmappedMemory) {
        self.config.unmapped = unmapped;
    }

    pub fn set_ram_init_pattern(&mut self, pattern: RamInitPattern) {
        self.config.ram_init = pattern;
    }

    /// Brings the memory into its power-up state.
    ///
    /// The WOM is erased and unlocked, so a machine with a boot ROM starts by
    /// loading Kickstart again.
    pub fn power_on(&mut self) {
        tracing::info!("[MEM] Power on");

        if self.wom.is_allocated() {
            self.wom.fill(0);
            self.wom_lock = false;
        }

        self.fill_ram_with_init_pattern();
        self.rtc.reset();
        self.data_bus = 0;
        self.stats.clear();
        self.update_mem_src_tables();
    }

    pub fn reset(&mut self) {
        self.data_bus = 0;
        self.stats.clear();
        self.update_mem_src_tables();
    }

    pub fn fill_ram_with_init_pattern(&mut self) {
        match self.config.ram_init {
            RamInitPattern::AllZeroes => {
                self.chip.fill(0x00);
                self.slow.fill(0x00);
                self.fast.fill(0x00);
            }
            RamInitPattern::AllOnes => {
                self.chip.fill(0xFF);
                self.slow.fill(0xFF);
                self.fast.fill(0xFF);
            }
            RamInitPattern::Randomized => {
                let mut rng = StdRng::seed_from_u64(0);
                rng.fill_bytes(self.chip.contents_mut());
                rng.fill_bytes(self.slow.contents_mut());
                rng.fill_bytes(self.fast.contents_mut());
            }
        }
    }

    /// Resource the CPU reaches at `addr`.
    pub fn mem_src(&self, addr: u32) -> MemorySource {
        self.cpu_map[bank(addr)]
    }

    /// Resource the DMA engines reach at `addr`.
    pub fn agnus_mem_src(&self, addr: u32) -> MemorySource {
        self.agnus_map[bank(addr & self.config.agnus.ptr_mask())]
    }

    pub fn cpu_map(&self) -> &BankMap {
        &self.cpu_map
    }

    pub fn agnus_map(&self) -> &BankMap {
        &self.agnus_map
    }

    pub fn in_chip_ram(&self, addr: u32) -> bool {
        addr <= 0xFFFFFF && self.mem_src(addr) == MemorySource::Chip
    }

    pub fn in_slow_ram(&self, addr: u32) -> bool {
        addr <= 0xFFFFFF && self.mem_src(addr) == MemorySource::Slow
    }

    pub fn in_fast_ram(&self, addr: u32) -> bool {
        addr <= 0xFFFFFF && self.mem_src(addr) == MemorySource::Fast
    }

    pub fn in_ram(&self, addr: u32) -> bool {
        self.in_chip_ram(addr) || self.in_slow_ram(addr) || self.in_fast_ram(addr)
    }

    pub fn in_rom(&self, addr: u32) -> bool {
        addr <= 0xFFFFFF && self.mem_src(addr).is_firmware()
    }

    pub fn is_unmapped(&self, addr: u32) -> bool {
        addr > 0xFFFFFF || self.mem_src(addr) == MemorySource::Unmapped
    }

    pub fn data_bus(&self) -> u16 {
        self.data_bus
    }

    pub fn rtc(&self) -> &Rtc {
        &self.rtc
    }

    pub fn stats(&self) -> &MemoryStats {
        &self.stats
    }

    /// Folds the raw access counters into their running averages.
    pub fn update_stats(&mut self) {
        self.stats.update();
    }

    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }
}
