#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use amiga_membus::{
    BlitterChannel, BusArbiter, BusOwner, Chipset, CiaId, CiaPort, CpuPort, ExpansionPort, Half,
    Memory, MemoryConfig, Message, MessageQueue, PokeSource, WallClock,
};

/// 2024-03-15 13:45:30 UTC
pub const T0: i64 = 1_710_510_330;

/// Board that answers with canned values and records every call it gets.
#[derive(Debug, Default)]
pub struct TestBoard {
    pub log: Vec<String>,

    pub bus_waits: usize,
    pub cia_waits: usize,
    pub occupant: Option<BusOwner>,
    pub bus_value: u16,
    pub ird: u16,

    pub cia: [[u8; 16]; 2],
    pub autoconf: Vec<(u32, u8)>,

    pub dmaconr: u16,
    pub clxdat: u16,
    pub intreqr: u16,
}

impl TestBoard {
    pub fn new() -> Self {
        TestBoard {
            ird: 0x4E71,
            dmaconr: 0x0200,
            clxdat: 0x8001,
            intreqr: 0x0020,
            ..Default::default()
        }
    }

    pub fn calls(&self, prefix: &str) -> Vec<&str> {
        self.log
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .map(|entry| entry.as_str())
            .collect()
    }

    fn record(&mut self, entry: String) {
        self.log.push(entry);
    }
}

impl BusArbiter for TestBoard {
    fn execute_until_bus_is_free(&mut self) {
        self.bus_waits += 1;
    }

    fn execute_until_bus_is_free_for_cia(&mut self) {
        self.cia_waits += 1;
    }

    fn bus_occupant(&self) -> Option<BusOwner> {
        self.occupant
    }

    fn bus_value(&self) -> u16 {
        self.bus_value
    }
}

impl CpuPort for TestBoard {
    fn ird(&self) -> u16 {
        self.ird
    }
}

impl CiaPort for TestBoard {
    fn peek_cia(&mut self, id: CiaId, reg: u8) -> u8 {
        self.record(format!("peek_cia({:?}, {:X})", id, reg));
        self.spypeek_cia(id, reg)
    }

    fn spypeek_cia(&self, id: CiaId, reg: u8) -> u8 {
        self.cia[id as usize][reg as usize & 0xF]
    }

    fn poke_cia(&mut self, id: CiaId, reg: u8, value: u8) {
        self.record(format!("poke_cia({:?}, {:X}, {:02X})", id, reg, value));
        self.cia[id as usize][reg as usize & 0xF] = value;
    }
}

impl ExpansionPort for TestBoard {
    fn peek_autoconf(&mut self, addr: u32) -> u8 {
        self.record(format!("peek_autoconf({:06X})", addr));
        self.spypeek_autoconf(addr)
    }

    fn spypeek_autoconf(&self, addr: u32) -> u8 {
        (addr & 0xFF) as u8
    }

    fn poke_autoconf(&mut self, addr: u32, value: u8) {
        self.autoconf.push((addr, value));
    }
}

impl Chipset for TestBoard {
    fn peek_bltddat(&self) -> u16 {
        0
    }
    fn peek_dmaconr(&self) -> u16 {
        self.dmaconr
    }
    fn peek_vposr(&self) -> u16 {
        0x2000
    }
    fn peek_vhposr(&self) -> u16 {
        0x2C81
    }
    fn peek_dskdatr(&self) -> u16 {
        0
    }
    fn peek_joydat(&self, port: usize) -> u16 {
        0x0100 * port as u16
    }
    fn peek_clxdat(&self) -> u16 {
        self.clxdat
    }
    fn peek_adkconr(&self) -> u16 {
        0
    }
    fn peek_potdat(&self, _port: usize) -> u16 {
        0
    }
    fn peek_potgor(&self) -> u16 {
        0xFF00
    }
    fn peek_serdatr(&self) -> u16 {
        0x3000
    }
    fn peek_dskbytr(&self) -> u16 {
        0
    }
    fn peek_intenar(&self) -> u16 {
        0
    }
    fn peek_intreqr(&self) -> u16 {
        self.intreqr
    }
    fn peek_deniseid(&self) -> u16 {
        0xFFFF
    }
    fn ack_clxdat(&mut self) {
        self.clxdat = 0;
    }

    fn poke_dskpt(&mut self, half: Half, value: u16) {
        self.record(format!("poke_dskpt({:?}, {:04X})", half, value));
    }
    fn poke_dsklen(&mut self, value: u16) {
        self.record(format!("poke_dsklen({:04X})", value));
    }
    fn poke_dskdat(&mut self, value: u16) {
        self.record(format!("poke_dskdat({:04X})", value));
    }
    fn poke_dsksync(&mut self, value: u16) {
        self.record(format!("poke_dsksync({:04X})", value));
    }
    fn poke_vposw(&mut self, value: u16) {
        self.record(format!("poke_vposw({:04X})", value));
    }
    fn poke_vhposw(&mut self, value: u16) {
        self.record(format!("poke_vhposw({:04X})", value));
    }
    fn poke_copcon(&mut self, value: u16) {
        self.record(format!("poke_copcon({:04X})", value));
    }
    fn poke_serdat(&mut self, value: u16) {
        self.record(format!("poke_serdat({:04X})", value));
    }
    fn poke_serper(&mut self, value: u16) {
        self.record(format!("poke_serper({:04X})", value));
    }
    fn poke_potgo(&mut self, value: u16) {
        self.record(format!("poke_potgo({:04X})", value));
    }
    fn poke_joytest(&mut self, value: u16) {
        self.record(format!("poke_joytest({:04X})", value));
    }
    fn poke_bltcon0(&mut self, value: u16) {
        self.record(format!("poke_bltcon0({:04X})", value));
    }
    fn poke_bltcon0l(&mut self, value: u16) {
        self.record(format!("poke_bltcon0l({:04X})", value));
    }
    fn poke_bltcon1(&mut self, value: u16) {
        self.record(format!("poke_bltcon1({:04X})", value));
    }
    fn poke_bltafwm(&mut self, value: u16) {
        self.record(format!("poke_bltafwm({:04X})", value));
    }
    fn poke_bltalwm(&mut self, value: u16) {
        self.record(format!("poke_bltalwm({:04X})", value));
    }
    fn poke_bltpt(&mut self, channel: BlitterChannel, half: Half, value: u16) {
        self.record(format!("poke_bltpt({:?}, {:?}, {:04X})", channel, half, value));
    }
    fn poke_bltmod(&mut self, channel: BlitterChannel, value: u16) {
        self.record(format!("poke_bltmod({:?}, {:04X})", channel, value));
    }
    fn poke_bltdat(&mut self, channel: BlitterChannel, value: u16) {
        self.record(format!("poke_bltdat({:?}, {:04X})", channel, value));
    }
    fn poke_bltsize(&mut self, value: u16, source: PokeSource) {
        self.record(format!("poke_bltsize({:04X}, {:?})", value, source));
    }
    fn poke_bltsizv(&mut self, value: u16) {
        self.record(format!("poke_bltsizv({:04X})", value));
    }
    fn poke_bltsizh(&mut self, value: u16) {
        self.record(format!("poke_bltsizh({:04X})", value));
    }
    fn poke_coplc(&mut self, list: usize, half: Half, value: u16) {
        self.record(format!("poke_coplc({}, {:?}, {:04X})", list, half, value));
    }
    fn poke_copjmp(&mut self, list: usize, source: PokeSource) {
        self.record(format!("poke_copjmp({}, {:?})", list, source));
    }
    fn poke_copins(&mut self, value: u16) {
        self.record(format!("poke_copins({:04X})", value));
    }
    fn poke_diwstrt(&mut self, value: u16, source: PokeSource) {
        self.record(format!("poke_diwstrt({:04X}, {:?})", value, source));
    }
    fn poke_diwstop(&mut self, value: u16, source: PokeSource) {
        self.record(format!("poke_diwstop({:04X}, {:?})", value, source));
    }
    fn poke_ddfstrt(&mut self, value: u16) {
        self.record(format!("poke_ddfstrt({:04X})", value));
    }
    fn poke_ddfstop(&mut self, value: u16) {
        self.record(format!("poke_ddfstop({:04X})", value));
    }
    fn poke_dmacon(&mut self, value: u16) {
        self.record(format!("poke_dmacon({:04X})", value));
    }
    fn poke_clxcon(&mut self, value: u16) {
        self.record(format!("poke_clxcon({:04X})", value));
    }
    fn poke_intena(&mut self, value: u16) {
        self.record(format!("poke_intena({:04X})", value));
    }
    fn poke_intreq(&mut self, value: u16) {
        self.record(format!("poke_intreq({:04X})", value));
    }
    fn poke_adkcon(&mut self, value: u16) {
        self.record(format!("poke_adkcon({:04X})", value));
    }
    fn poke_audlc(&mut self, channel: usize, half: Half, value: u16) {
        self.record(format!("poke_audlc({}, {:?}, {:04X})", channel, half, value));
    }
    fn poke_audlen(&mut self, channel: usize, value: u16) {
        self.record(format!("poke_audlen({}, {:04X})", channel, value));
    }
    fn poke_audper(&mut self, channel: usize, value: u16) {
        self.record(format!("poke_audper({}, {:04X})", channel, value));
    }
    fn poke_audvol(&mut self, channel: usize, value: u16) {
        self.record(format!("poke_audvol({}, {:04X})", channel, value));
    }
    fn poke_auddat(&mut self, channel: usize, value: u16) {
        self.record(format!("poke_auddat({}, {:04X})", channel, value));
    }
    fn poke_bplpt(&mut self, plane: usize, half: Half, value: u16) {
        self.record(format!("poke_bplpt({}, {:?}, {:04X})", plane, half, value));
    }
    fn poke_bplcon0(&mut self, value: u16) {
        self.record(format!("poke_bplcon0({:04X})", value));
    }
    fn poke_bplcon1(&mut self, value: u16) {
        self.record(format!("poke_bplcon1({:04X})", value));
    }
    fn poke_bplcon2(&mut self, value: u16) {
        self.record(format!("poke_bplcon2({:04X})", value));
    }
    fn poke_bplmod(&mut self, field: usize, value: u16) {
        self.record(format!("poke_bplmod({}, {:04X})", field, value));
    }
    fn poke_bpldat(&mut self, plane: usize, value: u16) {
        self.record(format!("poke_bpldat({}, {:04X})", plane, value));
    }
    fn poke_sprpt(&mut self, sprite: usize, half: Half, value: u16) {
        self.record(format!("poke_sprpt({}, {:?}, {:04X})", sprite, half, value));
    }
    fn poke_sprpos(&mut self, sprite: usize, value: u16) {
        self.record(format!("poke_sprpos({}, {:04X})", sprite, value));
    }
    fn poke_sprctl(&mut self, sprite: usize, value: u16) {
        self.record(format!("poke_sprctl({}, {:04X})", sprite, value));
    }
    fn poke_sprdata(&mut self, sprite: usize, value: u16) {
        self.record(format!("poke_sprdata({}, {:04X})", sprite, value));
    }
    fn poke_sprdatb(&mut self, sprite: usize, value: u16) {
        self.record(format!("poke_sprdatb({}, {:04X})", sprite, value));
    }
    fn poke_color(&mut self, index: usize, value: u16, source: PokeSource) {
        self.record(format!("poke_color({}, {:04X}, {:?})", index, value, source));
    }
}

/// Wall clock the test controls.
#[derive(Debug, Clone)]
pub struct TestClock(pub Rc<Cell<i64>>);

impl TestClock {
    pub fn new(now: i64) -> Self {
        TestClock(Rc::new(Cell::new(now)))
    }

    pub fn advance(&self, seconds: i64) {
        self.0.set(self.0.get() + seconds);
    }
}

impl WallClock for TestClock {
    fn now(&self) -> i64 {
        self.0.get()
    }
}

pub fn new_queue() -> MessageQueue {
    Rc::new(RefCell::new(VecDeque::new()))
}

pub fn memory_with(config: MemoryConfig) -> Memory<TestBoard> {
    Memory::new(TestBoard::new(), config, new_queue())
        .unwrap()
        .with_wall_clock(Box::new(TestClock::new(T0)))
}

pub fn memory() -> Memory<TestBoard> {
    memory_with(MemoryConfig::default())
}

pub fn drain(queue: &MessageQueue) -> Vec<Message> {
    queue.borrow_mut().drain(..).collect()
}

/// Boot ROM image whose words count up from `0x1000`.
pub fn boot_rom() -> Vec<u8> {
    (0..0x8000u16).flat_map(|i| (0x1000u16.wrapping_add(i)).to_be_bytes()).collect()
}

/// 256K Kickstart image whose words count up from `0x4000`.
pub fn kick_rom() -> Vec<u8> {
    (0..0x20000u32)
        .flat_map(|i| ((0x4000 + i) as u16).to_be_bytes())
        .collect()
}
