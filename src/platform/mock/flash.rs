//! Mock Flash implementation for testing
//!
//! Provides in-memory NOR flash simulation for unit tests.

use super::interrupts::MockInterrupts;
use crate::platform::{
    error::FlashError,
    traits::{FlashInterface, ERASED_BYTE, SECTOR_SIZE},
    Result,
};
use crate::storage::layout::FlashLayout;
use std::vec::Vec;

/// Byte stamped at `index` of the simulated factory record
///
/// Never equal to the erased value or to any burn-in pattern byte
/// (0x00, 0x55, 0xAA), so every record byte mismatches every check.
pub fn factory_record_byte(index: usize) -> u8 {
    b"0123456789abcdef"[index % 16]
}

/// Mock Flash implementation
///
/// Simulates flash storage in memory for testing. Supports:
/// - Sector erase / sector program with NOR semantics (program only clears bits)
/// - Erase and program count tracking per sector
/// - Corruption and stuck-bit injection for fault testing
/// - Erase failure and power-loss simulation
/// - Detection of erase/program calls made while interrupts were not masked
///
/// # Example
///
/// ```ignore
/// use pico_flash_utility::platform::mock::MockFlash;
/// use pico_flash_utility::platform::traits::{FlashInterface, SECTOR_SIZE};
///
/// let mut flash = MockFlash::new(64 * 1024);
///
/// flash.erase_sector(0x1000).unwrap();
/// flash.program_sector(0x1000, &[0x50; SECTOR_SIZE]).unwrap();
///
/// let mut buf = [0u8; 4];
/// flash.read(0x1000, &mut buf).unwrap();
/// assert_eq!(buf, [0x50; 4]);
/// assert_eq!(flash.erase_count(0x1000), 1);
/// ```
#[derive(Debug)]
pub struct MockFlash {
    /// Flash storage (initialized to 0xFF - erased state)
    storage: Vec<u8>,
    /// Erase count per sector
    erase_counts: Vec<u32>,
    /// Program count per sector
    program_counts: Vec<u32>,
    /// Bits that read as 0 regardless of erase (address, mask)
    stuck_bits: Vec<(u32, u8)>,
    /// Next erase reports failure without touching storage
    fail_next_erase: bool,
    /// Next program writes half the sector, then reports failure
    power_loss: bool,
    /// Interrupt controller whose state is checked on every mutation
    interrupts: Option<MockInterrupts>,
    /// Mutations observed while interrupts were enabled
    unmasked_operations: u32,
}

impl MockFlash {
    /// Create a blank mock flash of `capacity` bytes
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a non-zero multiple of [`SECTOR_SIZE`].
    pub fn new(capacity: u32) -> Self {
        assert!(
            capacity > 0 && capacity as usize % SECTOR_SIZE == 0,
            "mock flash capacity must be a multiple of the sector size"
        );
        let sector_count = capacity as usize / SECTOR_SIZE;

        Self {
            storage: std::vec![ERASED_BYTE; capacity as usize],
            erase_counts: std::vec![0; sector_count],
            program_counts: std::vec![0; sector_count],
            stuck_bits: Vec::new(),
            fail_next_erase: false,
            power_loss: false,
            interrupts: None,
            unmasked_operations: 0,
        }
    }

    /// Create a blank mock flash sized for `layout` with its factory record stamped
    pub fn with_factory_record(layout: &FlashLayout) -> Self {
        let mut flash = Self::new(layout.capacity());
        let range = layout.protected().absolute_range();
        for (i, address) in range.enumerate() {
            flash.storage[address as usize] = factory_record_byte(i);
        }
        flash
    }

    /// Record erase/program calls made while `interrupts` is not masked
    pub fn attach_interrupts(&mut self, interrupts: &MockInterrupts) {
        self.interrupts = Some(interrupts.clone());
    }

    /// Get Flash contents (for test verification)
    pub fn contents(&self, offset: u32, len: usize) -> Vec<u8> {
        self.storage[offset as usize..offset as usize + len].to_vec()
    }

    /// Copy of the whole flash (for before/after comparisons)
    pub fn snapshot(&self) -> Vec<u8> {
        self.storage.clone()
    }

    /// Overwrite bytes directly, bypassing NOR semantics
    pub fn poke(&mut self, offset: u32, data: &[u8]) {
        self.storage[offset as usize..offset as usize + data.len()].copy_from_slice(data);
    }

    /// Inject corruption at address (for testing error detection)
    pub fn inject_corruption(&mut self, offset: u32, len: usize) {
        for byte in &mut self.storage[offset as usize..offset as usize + len] {
            *byte = 0xAA; // Corrupt pattern
        }
    }

    /// Force the bits in `mask` of the byte at `offset` to read as 0 from now on
    pub fn inject_stuck_bits(&mut self, offset: u32, mask: u8) {
        self.stuck_bits.push((offset, mask));
        self.storage[offset as usize] &= !mask;
    }

    /// Make the next erase fail without changing storage
    pub fn fail_next_erase(&mut self) {
        self.fail_next_erase = true;
    }

    /// Simulate power loss during the next program operation
    ///
    /// The next program writes only the first half of the sector and reports
    /// `WriteFailed`.
    pub fn simulate_power_loss(&mut self) {
        self.power_loss = true;
    }

    /// Get erase count for the sector containing `offset`
    pub fn erase_count(&self, offset: u32) -> u32 {
        self.erase_counts[offset as usize / SECTOR_SIZE]
    }

    /// Get program count for the sector containing `offset`
    pub fn program_count(&self, offset: u32) -> u32 {
        self.program_counts[offset as usize / SECTOR_SIZE]
    }

    /// Get total erase count across all sectors
    pub fn total_erase_count(&self) -> u32 {
        self.erase_counts.iter().sum()
    }

    /// Get total program count across all sectors
    pub fn total_program_count(&self) -> u32 {
        self.program_counts.iter().sum()
    }

    /// Number of erase/program calls made while interrupts were enabled
    pub fn unmasked_operations(&self) -> u32 {
        self.unmasked_operations
    }

    /// Check a raw primitive's sector offset
    fn check_sector(&self, offset: u32) -> Result<usize> {
        if offset as usize % SECTOR_SIZE != 0 || offset >= self.capacity() {
            return Err(FlashError::InvalidAddress.into());
        }
        Ok(offset as usize)
    }

    fn note_mutation(&mut self) {
        if let Some(irq) = &self.interrupts {
            if !irq.is_masked() {
                self.unmasked_operations += 1;
            }
        }
    }

    fn apply_stuck_bits(&mut self, start: usize, end: usize) {
        for &(address, mask) in &self.stuck_bits {
            let address = address as usize;
            if (start..end).contains(&address) {
                self.storage[address] &= !mask;
            }
        }
    }
}

impl FlashInterface for MockFlash {
    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<()> {
        // Validate address range
        let start = offset as usize;
        let end = start
            .checked_add(buf.len())
            .ok_or(FlashError::InvalidAddress)?;
        if end > self.storage.len() {
            return Err(FlashError::InvalidAddress.into());
        }

        buf.copy_from_slice(&self.storage[start..end]);
        Ok(())
    }

    fn erase_sector(&mut self, offset: u32) -> Result<()> {
        let start = self.check_sector(offset)?;
        self.note_mutation();

        if self.fail_next_erase {
            self.fail_next_erase = false;
            return Err(FlashError::EraseFailed.into());
        }

        self.storage[start..start + SECTOR_SIZE].fill(ERASED_BYTE);
        self.apply_stuck_bits(start, start + SECTOR_SIZE);
        self.erase_counts[start / SECTOR_SIZE] += 1;
        Ok(())
    }

    fn program_sector(&mut self, offset: u32, data: &[u8; SECTOR_SIZE]) -> Result<()> {
        let start = self.check_sector(offset)?;
        self.note_mutation();
        self.program_counts[start / SECTOR_SIZE] += 1;

        let (write_len, result) = if self.power_loss {
            self.power_loss = false;
            (SECTOR_SIZE / 2, Err(FlashError::WriteFailed.into()))
        } else {
            (SECTOR_SIZE, Ok(()))
        };

        // Flash can only change bits from 1→0
        for (cell, &byte) in self.storage[start..start + write_len]
            .iter_mut()
            .zip(data.iter())
        {
            *cell &= byte;
        }
        self.apply_stuck_bits(start, start + write_len);

        result
    }

    fn capacity(&self) -> u32 {
        self.storage.len() as u32
    }
}
