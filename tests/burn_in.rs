//! End-to-end tests through the public API on the mock platform

#![cfg(feature = "mock")]

use pico_flash_utility::core::confirm::{Confirmed, Unattended};
use pico_flash_utility::parameters::BurnInParams;
use pico_flash_utility::platform::mock::{
    factory_record_byte, MockExecution, MockFlash, MockInterrupts,
};
use pico_flash_utility::platform::traits::SECTOR_SIZE;
use pico_flash_utility::platform::FlashError;
use pico_flash_utility::storage::{FlashEngine, FlashLayout, ProtectedRegion};
use pico_flash_utility::subsystems::burn_in::{BurnInHarness, HarnessProgress, HarnessState};

type Engine = FlashEngine<MockFlash, MockInterrupts, MockExecution>;

fn pico_engine() -> (Engine, MockInterrupts) {
    let irq = MockInterrupts::new();
    let mut flash = MockFlash::with_factory_record(&FlashLayout::PICO);
    flash.attach_interrupts(&irq);
    let engine =
        FlashEngine::new(flash, irq.clone(), MockExecution::in_ram(), FlashLayout::PICO).unwrap();
    (engine, irq)
}

fn factory_record() -> Vec<u8> {
    (0..107).map(factory_record_byte).collect()
}

fn protected_bytes(engine: &Engine) -> Vec<u8> {
    let mut buf = [0u8; 256];
    let len = engine.read_protected(&mut buf).unwrap();
    buf[..len].to_vec()
}

#[test]
fn test_full_pico_burn_in_baseline() {
    let (mut engine, irq) = pico_engine();
    let progress = HarnessProgress::new();

    let report = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(5))
        .run(&mut Unattended, || false)
        .unwrap();

    assert_eq!(report.state, HarnessState::Finished);
    assert_eq!(report.cycles_completed, 5);
    assert_eq!(report.expected_baseline, 5350);
    assert_eq!(report.total_mismatches, 5350);
    assert!(report.is_clean());

    assert_eq!(protected_bytes(&engine), factory_record());
    assert_eq!(engine.flash().unmasked_operations(), 0);
    assert!(!irq.is_masked());
}

#[test]
fn test_protected_record_survives_erase_and_write() {
    let (mut engine, _) = pico_engine();
    let sector = FlashLayout::PICO.protected().sector();

    engine.write(sector, &[0x00; SECTOR_SIZE]).unwrap();
    assert_eq!(protected_bytes(&engine), factory_record());

    let report = engine.erase(sector + 0x40).unwrap();
    assert!(report.preserved_protected);
    assert_eq!(protected_bytes(&engine), factory_record());

    assert_eq!(engine.erase_all(&mut Unattended).unwrap(), Confirmed::Done(512));
    assert_eq!(protected_bytes(&engine), factory_record());

    let blank = engine.blank_check(0..FlashLayout::PICO.capacity()).unwrap().finish().unwrap();
    assert_eq!(blank.total_mismatches, 107);
}

#[test]
fn test_boundary_write_leaves_flash_unchanged() {
    let (mut engine, _) = pico_engine();
    let before = engine.flash().snapshot();

    assert_eq!(
        engine.write(0x7EFF0, &[0x12; 0x20]),
        Err(FlashError::CrossesSectorBoundary.into())
    );
    assert_eq!(engine.flash().snapshot(), before);
}

#[test]
fn test_stuck_bit_detected_by_burn_in() {
    let layout = FlashLayout::new(8 * SECTOR_SIZE as u32, ProtectedRegion::new(0x7000, 0, 107));
    let mut flash = MockFlash::with_factory_record(&layout);
    flash.inject_stuck_bits(0x2468, 0x01);
    let mut engine =
        FlashEngine::new(flash, MockInterrupts::new(), MockExecution::in_ram(), layout).unwrap();
    let progress = HarnessProgress::new();

    let report = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(2))
        .run(&mut Unattended, || false)
        .unwrap();

    assert_eq!(report.state, HarnessState::Finished);
    assert_eq!(report.expected_baseline, 107 * 2 * 5 * 2);
    assert_eq!(report.unexpected_mismatches(), 14);
    assert!(!report.is_clean());
}

#[test]
fn test_code_in_flash_blocks_burn_in() {
    let layout = FlashLayout::new(8 * SECTOR_SIZE as u32, ProtectedRegion::new(0x7000, 0, 107));
    let exec = MockExecution::from_flash(0x100..0x2000);
    let mut engine = FlashEngine::new(
        MockFlash::with_factory_record(&layout),
        MockInterrupts::new(),
        exec,
        layout,
    )
    .unwrap();
    let before = engine.flash().snapshot();
    let progress = HarnessProgress::new();

    let report = BurnInHarness::new(&mut engine, &progress, BurnInParams::new(1))
        .run(&mut Unattended, || false)
        .unwrap();

    assert_eq!(report.state, HarnessState::Aborted);
    assert_eq!(engine.flash().snapshot(), before);
}
