mod common;

use std::ops::RangeInclusive;

use amiga_membus::{
    AgnusRevision, ExtStart, Memory, MemoryConfig, MemorySource, Message, RegionKind, RtcModel,
    KB, MB,
};
use common::{boot_rom, drain, kick_rom, memory, memory_with, TestBoard};
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

fn banks(memory: &Memory<TestBoard>, range: RangeInclusive<u32>) -> Vec<MemorySource> {
    range.map(|b| memory.mem_src(b << 16)).collect()
}

#[test]
fn test_default_layout() {
    let mem = memory();

    assert!(banks(&mem, 0x00..=0x1F).iter().all(|&s| s == MemorySource::Chip));
    assert!(banks(&mem, 0x20..=0x9F).iter().all(|&s| s == MemorySource::Unmapped));
    assert!(banks(&mem, 0xA0..=0xBF).iter().all(|&s| s == MemorySource::Cia));
    assert!(banks(&mem, 0xC0..=0xC7).iter().all(|&s| s == MemorySource::Slow));
    assert!(banks(&mem, 0xC8..=0xDB).iter().all(|&s| s == MemorySource::Custom));
    assert!(banks(&mem, 0xDC..=0xDE).iter().all(|&s| s == MemorySource::Rtc));
    assert_eq!(mem.mem_src(0xDFF000), MemorySource::Custom);
    assert!(banks(&mem, 0xE0..=0xE7).iter().all(|&s| s == MemorySource::Unmapped));
    assert!(banks(&mem, 0xE8..=0xEF).iter().all(|&s| s == MemorySource::Autoconf));
    assert!(banks(&mem, 0xF0..=0xFF).iter().all(|&s| s == MemorySource::Unmapped));
}

#[test]
fn test_every_bank_has_exactly_one_tag() {
    let mut mem = memory();
    mem.load_rom(&boot_rom()).unwrap();
    mem.set_overlay(true);

    let segments = mem.cpu_map().segments();
    assert_eq!(segments.first().map(|s| s.start), Some(0x000000));
    assert_eq!(segments.last().map(|s| s.end), Some(0xFFFFFF));
    for pair in segments.windows(2) {
        assert_eq!(pair[0].end + 1, pair[1].start);
        assert_ne!(pair[0].source, pair[1].source);
    }
}

#[test]
fn test_fast_ram_and_large_slow_ram() {
    let mem = memory_with(MemoryConfig {
        slow_size: MB,
        fast_size: 8 * MB,
        ..Default::default()
    });

    assert!(banks(&mem, 0x20..=0x9F).iter().all(|&s| s == MemorySource::Fast));
    assert!(banks(&mem, 0xC0..=0xCF).iter().all(|&s| s == MemorySource::Slow));
    assert_eq!(mem.mem_src(0xD00000), MemorySource::Custom);
}

#[test]
fn test_no_chip_ram_leaves_low_banks_unmapped() {
    let mem = memory_with(MemoryConfig {
        chip_size: 0,
        ..Default::default()
    });
    assert!(banks(&mem, 0x00..=0x1F).iter().all(|&s| s == MemorySource::Unmapped));
    assert!(mem.agnus_map().as_slice().iter().all(|&s| s == MemorySource::Unmapped));
}

#[test]
fn test_kickstart_fills_the_rom_window() {
    let mut mem = memory();
    mem.load_rom(&kick_rom()).unwrap();

    assert!(banks(&mem, 0xF8..=0xFF).iter().all(|&s| s == MemorySource::Rom));
    assert!(mem.in_rom(0xFC0000));
}

#[test]
fn test_boot_rom_windows_follow_the_wom_lock() {
    let mut mem = memory();
    mem.load_rom(&boot_rom()).unwrap();

    assert!(banks(&mem, 0xF8..=0xFB).iter().all(|&s| s == MemorySource::Rom));
    assert!(banks(&mem, 0xFC..=0xFF).iter().all(|&s| s == MemorySource::Wom));

    mem.poke16(0xF80000, 0x1234);

    assert!(mem.wom_is_locked());
    assert!(banks(&mem, 0xF8..=0xFF).iter().all(|&s| s == MemorySource::Wom));
}

#[test]
fn test_extension_rom_windows() {
    let mut mem = memory();
    mem.load_ext(&vec![0xAA; 512 * KB]).unwrap();
    assert!(banks(&mem, 0xE0..=0xE7).iter().all(|&s| s == MemorySource::Ext));

    mem.set_ext_start(ExtStart::F0);
    assert!(banks(&mem, 0xE0..=0xE7).iter().all(|&s| s == MemorySource::Unmapped));
    assert!(banks(&mem, 0xF0..=0xF7).iter().all(|&s| s == MemorySource::Ext));
    assert_eq!(mem.mem_src(0xE80000), MemorySource::Autoconf);
}

#[test]
fn test_overlay_mirrors_the_rom_into_low_banks() {
    let mut mem = memory();
    mem.load_rom(&kick_rom()).unwrap();

    mem.set_overlay(true);
    assert!(banks(&mem, 0x00..=0x07).iter().all(|&s| s == MemorySource::Rom));
    assert_eq!(mem.mem_src(0x080000), MemorySource::Chip);
    assert_eq!(mem.peek16(0x000000), 0x4000);

    mem.set_overlay(false);
    assert!(banks(&mem, 0x00..=0x07).iter().all(|&s| s == MemorySource::Chip));
}

#[test]
fn test_overlay_stops_at_unmapped_source() {
    let mut mem = memory();

    mem.set_overlay(true);
    assert!(banks(&mem, 0x00..=0x07).iter().all(|&s| s == MemorySource::Chip));
}

#[test]
fn test_overlay_is_idempotent() {
    let mut mem = memory();
    mem.load_rom(&boot_rom()).unwrap();

    mem.set_overlay(true);
    let first = *mem.cpu_map();
    drain(&mem.queue());

    mem.set_overlay(true);
    mem.update_mem_src_tables();

    assert_eq!(*mem.cpu_map(), first);
}

#[test]
fn test_rtc_model_none_unmaps_the_rtc_banks() {
    let mut mem = memory();
    mem.set_rtc_model(RtcModel::None);

    assert!(banks(&mem, 0xDC..=0xDE).iter().all(|&s| s == MemorySource::Custom));

    mem.set_rtc_model(RtcModel::Ricoh);
    assert!(banks(&mem, 0xDC..=0xDE).iter().all(|&s| s == MemorySource::Rtc));
}

#[test]
fn test_agnus_map_slow_ram_mirror() {
    let mem = memory();
    let agnus = mem.agnus_map();

    assert!((0x00..=0x07).all(|b| agnus[b] == MemorySource::Chip));
    assert!((0x08..=0x0F).all(|b| agnus[b] == MemorySource::Slow));
    assert!((0x10..=0xFF).all(|b| agnus[b] == MemorySource::Unmapped));
}

#[test]
fn test_agnus_map_without_mirror() {
    let ocs = memory_with(MemoryConfig {
        agnus: AgnusRevision::Ocs,
        ..Default::default()
    });
    assert_eq!(ocs.agnus_map()[0x08], MemorySource::Unmapped);

    let no_mirror = memory_with(MemoryConfig {
        slow_ram_mirror: false,
        ..Default::default()
    });
    assert_eq!(no_mirror.agnus_map()[0x08], MemorySource::Unmapped);

    let big_chip = memory_with(MemoryConfig {
        chip_size: MB,
        agnus: AgnusRevision::Ecs2Mb,
        ..Default::default()
    });
    assert_eq!(big_chip.agnus_map()[0x08], MemorySource::Chip);
    assert_eq!(big_chip.agnus_map()[0x10], MemorySource::Unmapped);
}

#[test]
fn test_every_rebuild_notifies_the_host() {
    let mut mem = memory();
    let queue = mem.queue();
    drain(&queue);

    mem.alloc(RegionKind::Fast, 2 * MB).unwrap();
    assert_eq!(drain(&queue), vec![Message::MemLayout]);

    // Same size, nothing to rebuild
    mem.alloc(RegionKind::Fast, 2 * MB).unwrap();
    assert!(drain(&queue).is_empty());

    mem.set_overlay(true);
    assert_eq!(drain(&queue), vec![Message::MemLayout]);
}

#[test]
fn test_segments_display() {
    let mem = memory();
    let segments = mem.cpu_map().segments();

    assert_eq!(segments[0].to_string(), "0x000000 - 0x1FFFFF - Chip RAM");
    assert_eq!(segments[2].to_string(), "0xA00000 - 0xBFFFFF - CIA");
}
