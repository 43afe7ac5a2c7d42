mod common;

use amiga_membus::{
    Diagnostics, Memory, MemoryBuilder, MemoryConfig, MemoryError, MemoryInfo, MemorySource,
    Message, RamInitPattern, RegionKind, RtcModel, KB, MB,
};
use common::{boot_rom, drain, memory, memory_with, new_queue, TestBoard};
use tracing_subscriber::{fmt, EnvFilter};

#[cfg(test)]
#[ctor::ctor]
fn init() {
    let fmt_subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(fmt_subscriber)
        .expect("Unable to set global tracing subscriber");
}

#[test]
fn test_builder() {
    let queue = new_queue();
    let mem = MemoryBuilder::new()
        .chip_ram(MB)
        .slow_ram(0)
        .fast_ram(2 * MB)
        .rom(&boot_rom())
        .rtc(RtcModel::None)
        .diagnostics(Diagnostics::all())
        .queue(queue.clone())
        .build(TestBoard::new())
        .unwrap();

    assert_eq!(mem.chip_ram_size(), MB);
    assert_eq!(mem.slow_ram_size(), 0);
    assert_eq!(mem.fast_ram_size(), 2 * MB);
    assert!(mem.has_boot_rom());
    assert_eq!(mem.mem_src(0xDC0000), MemorySource::Custom);
    assert_eq!(mem.mem_src(0xC00000), MemorySource::Custom);
    assert!(drain(&queue).contains(&Message::MemLayout));
}

#[test]
fn test_builder_rejects_invalid_sizes() {
    let result = MemoryBuilder::new().chip_ram(768 * KB).build(TestBoard::new());

    assert_eq!(
        result.err(),
        Some(MemoryError::InvalidSize {
            region: RegionKind::Chip,
            size: 768 * KB,
        })
    );
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = MemoryConfig {
        fast_size: 16 * MB,
        ..Default::default()
    };
    let result = Memory::new(TestBoard::new(), config, new_queue());

    assert!(matches!(
        result,
        Err(MemoryError::InvalidSize {
            region: RegionKind::Fast,
            ..
        })
    ));
}

#[test]
fn test_alloc_validates_and_resizes() {
    let mut mem = memory();

    assert_eq!(
        mem.alloc_fast(32 * KB),
        Err(MemoryError::InvalidSize {
            region: RegionKind::Fast,
            size: 32 * KB,
        })
    );
    assert_eq!(mem.fast_ram_size(), 0);

    mem.alloc_fast(4 * MB).unwrap();
    assert!(mem.in_fast_ram(0x5FFFFE));
    assert!(!mem.in_fast_ram(0x600000));

    mem.dealloc(RegionKind::Fast).unwrap();
    assert!(mem.is_unmapped(0x200000));
    assert_eq!(mem.config.fast_size, 0);
}

#[test]
fn test_ram_init_patterns() {
    let mut mem = memory_with(MemoryConfig {
        ram_init: RamInitPattern::AllOnes,
        ..Default::default()
    });
    mem.power_on();
    assert_eq!(mem.spypeek32(0x000000), 0xFFFFFFFF);
    assert_eq!(mem.spypeek16(0xC7FFFE), 0xFFFF);

    mem.set_ram_init_pattern(RamInitPattern::AllZeroes);
    mem.power_on();
    assert_eq!(mem.spypeek32(0x000000), 0);
}

#[test]
fn test_randomized_init_is_deterministic() {
    let config = MemoryConfig {
        ram_init: RamInitPattern::Randomized,
        ..Default::default()
    };
    let mut a = memory_with(config.clone());
    let mut b = memory_with(config);
    a.power_on();
    b.power_on();

    let chip_a = a.region(RegionKind::Chip).contents();
    let chip_b = b.region(RegionKind::Chip).contents();
    assert_eq!(chip_a, chip_b);
    assert!(chip_a.iter().any(|&byte| byte != 0));
}

#[test]
fn test_reset_clears_bus_and_stats() {
    let mut mem = memory();
    mem.poke16(0x0, 0x1234);
    mem.peek16(0x0);

    mem.reset();

    assert_eq!(mem.data_bus(), 0);
    assert_eq!(mem.stats().chip_reads.raw, 0);
    assert_eq!(mem.spypeek16(0x0), 0x1234);
}

#[test]
fn test_address_queries() {
    let mut mem = memory();
    mem.load_rom(&boot_rom()).unwrap();

    assert!(mem.in_ram(0x000000));
    assert!(mem.in_ram(0xC00000));
    assert!(!mem.in_ram(0xBFE001));
    assert!(mem.in_rom(0xF80000));
    assert!(mem.in_rom(0xFC0000));
    assert!(!mem.in_chip_ram(0x01000000));
    assert_eq!(mem.agnus_mem_src(0x080000), MemorySource::Slow);
}

#[test]
fn test_info() {
    let mut mem = memory();
    mem.load_rom(&boot_rom()).unwrap();
    let info = mem.info();

    assert!(info.has_rom && info.has_wom && info.has_boot_rom);
    assert!(!info.has_ext && !info.has_kick_rom && !info.wom_lock);
    assert_eq!(info.rom_mask, 0xFFFF);
    assert_eq!(info.wom_mask, 0x3FFFF);
    assert_eq!(info.chip_mask, 0x7FFFF);
    assert_eq!(info.fast_mask, 0);
    assert_eq!(info.cpu_map[0xF8], MemorySource::Rom);
    assert_eq!(info.agnus_map[0x08], MemorySource::Slow);

    let json = serde_json::to_string(&info).unwrap();
    let decoded: MemoryInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, info);
}

#[test]
fn test_ascii_hex_and_hexdump() {
    let mut mem = memory();
    for (i, &byte) in b"Hello, Amiga!".iter().enumerate() {
        mem.poke8(0x100 + i as u32, byte);
    }

    assert_eq!(mem.ascii(0x100), "Hello, Amiga!...");
    assert_eq!(mem.hex(0x100, 4), "4865 6C6C");
    assert_eq!(mem.hex(0x100, 3), "4865 6C6C");

    let dump = mem.hexdump(0x100, 16);
    assert!(dump.starts_with("000100: 48 65 6c 6c 6f"));
    assert!(dump.trim_end().ends_with("Hello, Amiga!..."));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = MemoryConfig {
        fast_size: MB,
        rtc: RtcModel::Ricoh,
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let decoded: MemoryConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, config);
}
