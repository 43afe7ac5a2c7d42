//! Battery backed real-time clock (OKI MSM6242B or Ricoh RP5C01A).
//!
//! The chip exposes 16 nibble registers. The time is kept as an offset to
//! the host clock, so writing the time never touches the host.

use std::fmt;

use derivative::Derivative;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, OffsetDateTime};

use crate::{board::Board, memory::Memory};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RtcModel {
    None,
    #[default]
    Oki,
    Ricoh,
}

impl fmt::Display for RtcModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtcModel::None => write!(f, "None"),
            RtcModel::Oki => write!(f, "MSM6242B"),
            RtcModel::Ricoh => write!(f, "RP5C01A"),
        }
    }
}

/// Source of the host time, in seconds since the unix epoch.
pub trait WallClock {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }
}

const REG_D: usize = 0xD;
const REG_E: usize = 0xE;
const REG_F: usize = 0xF;

/// Valid bits of the Ricoh alarm bank
const RICOH_ALARM_MASK: [u8; 13] = [
    0b0000, 0b0000, 0b1111, 0b0111, 0b1111, 0b0011, 0b0111, 0b1111, 0b0011, 0b0000, 0b0001,
    0b0011, 0b0000,
];

/// Calendar fields as stored in the time registers. Fields may be out of
/// range after a write; composing carries the excess into the next field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimeFields {
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Rtc {
    model: RtcModel,
    reg: [[u8; 16]; 4],
    /// RTC time minus host time, in seconds
    time_diff: i64,
    /// RTC second the time registers currently describe
    last_sync: Option<i64>,
    #[derivative(Debug = "ignore")]
    clock: Box<dyn WallClock>,
}

impl Rtc {
    pub fn new(model: RtcModel) -> Self {
        let mut rtc = Rtc {
            model,
            reg: [[0; 16]; 4],
            time_diff: 0,
            last_sync: None,
            clock: Box::new(SystemClock),
        };
        rtc.reset();
        rtc
    }

    pub fn model(&self) -> RtcModel {
        self.model
    }

    pub fn set_model(&mut self, model: RtcModel) {
        tracing::info!("[RTC] Model: {}", model);
        self.model = model;
        self.reset();
    }

    pub fn set_wall_clock(&mut self, clock: Box<dyn WallClock>) {
        self.clock = clock;
        self.last_sync = None;
    }

    pub fn reset(&mut self) {
        self.reg = [[0; 16]; 4];
        self.time_diff = 0;
        self.last_sync = None;

        match self.model {
            RtcModel::Oki => {
                self.reg[0][REG_D] = 0b0001;
                self.reg[0][REG_E] = 0b0000;
                self.reg[0][REG_F] = 0b0100;
            }
            RtcModel::Ricoh => {
                self.reg[0][REG_D] = 0b1000;
                self.reg[0][REG_E] = 0b0000;
                self.reg[0][REG_F] = 0b0000;
            }
            RtcModel::None => {}
        }
    }

    /// Current RTC time in seconds since the unix epoch.
    pub fn time(&self) -> i64 {
        self.clock.now() + self.time_diff
    }

    pub fn set_time(&mut self, time: i64) {
        self.time_diff = time - self.clock.now();
        self.last_sync = None;
    }

    pub fn registers(&self) -> &[[u8; 16]; 4] {
        &self.reg
    }

    fn bank(&self) -> usize {
        match self.model {
            RtcModel::Ricoh => (self.reg[0][REG_D] & 0b11) as usize,
            _ => 0,
        }
    }

    fn twelve_hour_mode(&self) -> bool {
        match self.model {
            RtcModel::Oki => self.reg[0][REG_F] & 0b100 == 0,
            RtcModel::Ricoh => self.reg[1][0xA] & 0b1 == 0,
            RtcModel::None => false,
        }
    }

    fn pm_bit(&self) -> u8 {
        match self.model {
            RtcModel::Ricoh => 0b010,
            _ => 0b100,
        }
    }

    pub fn peek(&mut self, nr: usize) -> u8 {
        if self.model == RtcModel::None {
            return 0;
        }
        self.refresh();
        self.spypeek(nr)
    }

    pub fn spypeek(&self, nr: usize) -> u8 {
        let nr = nr & 0xF;
        match self.model {
            RtcModel::None => 0,
            _ if nr >= REG_D => self.reg[0][nr],
            _ => self.reg[self.bank()][nr],
        }
    }

    pub fn poke(&mut self, nr: usize, value: u8) {
        let nr = nr & 0xF;
        let value = value & 0xF;

        if self.model == RtcModel::None {
            return;
        }
        if nr >= REG_D {
            self.reg[0][nr] = value;
            return;
        }

        let bank = self.bank();
        if bank != 0 {
            self.reg[bank][nr] = value;
            if bank == 1 && self.model == RtcModel::Ricoh {
                self.reg[1][nr] &= RICOH_ALARM_MASK.get(nr).copied().unwrap_or(0);
            }
            return;
        }

        self.refresh();
        self.reg[0][nr] = value;

        match compose(self.fields()) {
            Some(time) => {
                self.time_diff = time - self.clock.now();
                self.last_sync = Some(time);
            }
            None => tracing::warn!("[RTC] Cannot compose a date from the time registers"),
        }
    }

    /// Derives the time registers from the RTC time unless they already
    /// describe the current second.
    fn refresh(&mut self) {
        let now = self.time();
        if self.last_sync != Some(now) {
            self.time_to_registers(now);
            self.last_sync = Some(now);
        }
    }

    fn time_to_registers(&mut self, time: i64) {
        let t = OffsetDateTime::from_unix_timestamp(time).unwrap_or(OffsetDateTime::UNIX_EPOCH);

        let second = t.second();
        let minute = t.minute();
        let mut hour = t.hour();
        let day = t.day();
        let month = u8::from(t.month());
        let year = (t.year().rem_euclid(100)) as u8;
        let weekday = t.weekday().number_days_from_sunday();

        let pm = hour > 12 && self.twelve_hour_mode();
        if pm {
            hour -= 12;
        }

        let r = &mut self.reg[0];
        r[0x0] = second % 10;
        r[0x1] = second / 10;
        r[0x2] = minute % 10;
        r[0x3] = minute / 10;
        r[0x4] = hour % 10;
        r[0x5] = hour / 10;

        match self.model {
            RtcModel::Ricoh => {
                r[0x6] = weekday;
                r[0x7] = day % 10;
                r[0x8] = day / 10;
                r[0x9] = month % 10;
                r[0xA] = month / 10;
                r[0xB] = year % 10;
                r[0xC] = year / 10;

                for (reg, mask) in self.reg[1].iter_mut().zip(RICOH_ALARM_MASK) {
                    *reg &= mask;
                }
            }
            _ => {
                r[0x6] = day % 10;
                r[0x7] = day / 10;
                r[0x8] = month % 10;
                r[0x9] = month / 10;
                r[0xA] = year % 10;
                r[0xB] = year / 10;
                r[0xC] = weekday;
            }
        }

        if pm {
            let pm_bit = self.pm_bit();
            self.reg[0][0x5] |= pm_bit;
        }
    }

    fn fields(&self) -> TimeFields {
        let r = &self.reg[0];
        let digits = |lo: usize, hi: usize| r[lo] as i64 + 10 * r[hi] as i64;

        let pm_bit = self.pm_bit();
        let pm = self.twelve_hour_mode() && r[0x5] & pm_bit != 0;
        let hour10 = if pm { r[0x5] & !pm_bit } else { r[0x5] };
        let hour = r[0x4] as i64 + 10 * hour10 as i64 + if pm { 12 } else { 0 };

        let (day, month, year) = match self.model {
            RtcModel::Ricoh => (digits(0x7, 0x8), digits(0x9, 0xA), digits(0xB, 0xC)),
            _ => (digits(0x6, 0x7), digits(0x8, 0x9), digits(0xA, 0xB)),
        };

        TimeFields {
            year: if (78..=99).contains(&year) { 1900 + year } else { 2000 + year },
            month,
            day,
            hour,
            minute: digits(0x2, 0x3),
            second: digits(0x0, 0x1),
        }
    }
}

/// Converts register fields into a unix time, carrying overflowing fields.
fn compose(f: TimeFields) -> Option<i64> {
    let months = f.year * 12 + f.month - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = Month::try_from((months.rem_euclid(12) + 1) as u8).ok()?;
    let date = Date::from_calendar_date(year, month, 1).ok()?;

    let time = date.midnight().assume_utc()
        + Duration::days(f.day - 1)
        + Duration::hours(f.hour)
        + Duration::minutes(f.minute)
        + Duration::seconds(f.second);

    Some(time.unix_timestamp())
}

/// Only odd addresses are wired. Every register occupies four bytes.
#[inline]
fn rtc_register(addr: u32) -> usize {
    ((addr >> 2) & 0xF) as usize
}

impl<B: Board> Memory<B> {
    pub fn peek_rtc8(&mut self, addr: u32) -> u8 {
        if addr & 1 == 0 {
            return 0;
        }
        let nr = rtc_register(addr);
        let value = self.rtc.peek(nr);

        if self.config.diagnostics.rtc {
            tracing::trace!("[RTC] peek({:X}) = {:X} @ {:06X}", nr, value, addr);
        }
        value
    }

    pub fn peek_rtc16(&mut self, addr: u32) -> u16 {
        let hi = self.peek_rtc8(addr);
        let lo = self.peek_rtc8(addr.wrapping_add(1));
        (hi as u16) << 8 | lo as u16
    }

    pub fn spypeek_rtc8(&self, addr: u32) -> u8 {
        if addr & 1 == 0 {
            return 0;
        }
        self.rtc.spypeek(rtc_register(addr))
    }

    pub fn spypeek_rtc16(&self, addr: u32) -> u16 {
        let hi = self.spypeek_rtc8(addr);
        let lo = self.spypeek_rtc8(addr.wrapping_add(1));
        (hi as u16) << 8 | lo as u16
    }

    pub fn poke_rtc8(&mut self, addr: u32, value: u8) {
        if addr & 1 == 0 {
            return;
        }
        let nr = rtc_register(addr);

        if self.config.diagnostics.rtc {
            tracing::trace!("[RTC] poke({:X}, {:X}) @ {:06X}", nr, value, addr);
        }
        self.rtc.poke(nr, value);
    }

    pub fn poke_rtc16(&mut self, addr: u32, value: u16) {
        self.poke_rtc8(addr, (value >> 8) as u8);
        self.poke_rtc8(addr.wrapping_add(1), value as u8);
    }
}
