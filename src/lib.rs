pub mod autoconf;
pub mod bank_map;
pub mod board;
pub mod builder;
pub mod bus;
pub mod cia;
pub mod config;
pub mod custom;
pub mod diagnostics;
pub mod error;
pub mod firmware;
pub mod inspect;
pub mod memory;
pub mod region;
pub mod rtc;
pub mod snapshot;
pub mod stats;
pub mod utils;

pub use bank_map::{BankMap, MemorySegment, MemorySource};
pub use board::{
    BlitterChannel, Board, BusArbiter, BusOwner, Chipset, CiaId, CiaPort, CpuPort,
    ExpansionPort, Half, PokeSource,
};
pub use builder::MemoryBuilder;
pub use config::{AgnusRevision, ExtStart, MemoryConfig, RamInitPattern, UnmappedMemory};
pub use diagnostics::Diagnostics;
pub use error::{MemoryError, Result};
pub use inspect::MemoryInfo;
pub use memory::{Memory, Message, MessageQueue};
pub use region::{Region, RegionKind, KB, MB};
pub use rtc::{Rtc, RtcModel, SystemClock, WallClock};
pub use snapshot::{MemorySnapshot, RegionImage};
pub use stats::{Counter, MemoryStats};
pub use utils::hexdump;
