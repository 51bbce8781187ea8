//! Protected-region rewrite engine
//!
//! All erases and writes go through [`FlashEngine`]. A sector holding the
//! protected record is never erased bare: it is rebuilt in RAM with the record
//! re-applied, then committed as one masked erase+program sequence.
//!
//! # Power Loss
//!
//! The commit is not atomic. Power lost between the erase and the program of the
//! protected sector loses the record.

use super::blank_check::BlankScan;
use super::guard::InterruptGuard;
use super::layout::{sector_base, AlignmentCorrection, FlashLayout};
use super::staging::{ProtectedSnapshot, SectorBuffer};
use crate::core::confirm::{Confirm, Confirmed};
use crate::platform::traits::{
    ExecutionLocation, FlashInterface, InterruptControl, ERASED_BYTE, SECTOR_SIZE,
};
use crate::platform::{FlashError, PlatformError, Result};
use core::ops::Range;

/// Content a sector is rebuilt with
#[derive(Debug, Clone, Copy)]
pub enum SectorImage<'d> {
    /// Every byte erased
    Erased,
    /// Current content with `data` written at `offset`
    Overlay { offset: usize, data: &'d [u8] },
}

/// Outcome of a single sector erase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EraseReport {
    /// Sector actually erased
    pub sector: u32,
    /// Set when the requested offset was rounded down
    pub correction: Option<AlignmentCorrection>,
    /// Set when the sector holds the protected record, which was kept
    pub preserved_protected: bool,
}

/// Flash erase/write engine that preserves the protected region
///
/// # Type Parameters
///
/// - `F`: raw flash primitives
/// - `I`: interrupt masking used around every erase/program
/// - `X`: where the running code lives, checked before every destructive call
pub struct FlashEngine<F, I, X> {
    flash: F,
    interrupts: I,
    location: X,
    layout: FlashLayout,
    staging: SectorBuffer,
}

impl<F, I, X> FlashEngine<F, I, X>
where
    F: FlashInterface,
    I: InterruptControl,
    X: ExecutionLocation,
{
    /// Create an engine over `flash` with the given geometry
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::InvalidConfig` if the device is smaller than
    /// `layout`.
    pub fn new(flash: F, interrupts: I, location: X, layout: FlashLayout) -> Result<Self> {
        if flash.capacity() < layout.capacity() {
            crate::log_error!(
                "Flash capacity {:#x} smaller than layout {:#x}",
                flash.capacity(),
                layout.capacity()
            );
            return Err(PlatformError::InvalidConfig);
        }

        Ok(Self {
            flash,
            interrupts,
            location,
            layout,
            staging: SectorBuffer::new(),
        })
    }

    /// Flash geometry in use
    pub fn layout(&self) -> &FlashLayout {
        &self.layout
    }

    /// Underlying flash device
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Give back the platform parts
    pub fn release(self) -> (F, I, X) {
        (self.flash, self.interrupts, self.location)
    }

    /// Read `buf.len()` bytes starting at `offset`
    pub fn read(&self, offset: u32, buf: &mut [u8]) -> Result<()> {
        let end = offset
            .checked_add(buf.len() as u32)
            .ok_or(FlashError::InvalidAddress)?;
        if end > self.layout.capacity() {
            return Err(FlashError::InvalidAddress.into());
        }
        self.flash.read(offset, buf)
    }

    /// Copy the protected record into `buf`, returning its length
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::InvalidConfig` if `buf` is shorter than the record.
    pub fn read_protected(&self, buf: &mut [u8]) -> Result<usize> {
        let region = self.layout.protected();
        let dest = buf
            .get_mut(..region.len())
            .ok_or(PlatformError::InvalidConfig)?;
        self.flash.read(region.start(), dest)?;
        Ok(region.len())
    }

    /// Erase the sector containing `offset`
    ///
    /// A misaligned offset is rounded down to its sector and the correction is
    /// returned in the report. The protected sector is rebuilt with its record
    /// intact.
    ///
    /// # Errors
    ///
    /// - `InvalidAddress` if `offset` is past the end of flash
    /// - `SelfDestructionRisk` if code is running from the target sector
    /// - `EraseFailed`/`WriteFailed` from the hardware, without retry
    pub fn erase(&mut self, offset: u32) -> Result<EraseReport> {
        if !self.layout.contains(offset) {
            return Err(FlashError::InvalidAddress.into());
        }

        let (sector, correction) = AlignmentCorrection::align(offset);
        if let Some(c) = correction {
            crate::log_warn!(
                "Erase offset {:#x} not sector-aligned, erasing sector {:#x}",
                c.requested,
                c.aligned
            );
        }

        self.ensure_not_executing_from(sector..sector + SECTOR_SIZE as u32)?;

        let preserved_protected = self.layout.protected().is_in_sector(sector);
        if preserved_protected {
            self.commit_sector(sector, SectorImage::Erased)?;
        } else {
            self.raw_erase(sector)?;
        }

        Ok(EraseReport {
            sector,
            correction,
            preserved_protected,
        })
    }

    /// Erase one sector after an explicit confirmation
    ///
    /// Declining is not an error and touches nothing.
    pub fn erase_sector(
        &mut self,
        offset: u32,
        confirm: &mut impl Confirm,
    ) -> Result<Confirmed<EraseReport>> {
        if !confirm.confirm("Erase one flash sector?") {
            crate::log_info!("Erase of {:#x} declined", offset);
            return Ok(Confirmed::Declined);
        }
        self.erase(offset).map(Confirmed::Done)
    }

    /// Erase the whole flash after an explicit confirmation
    ///
    /// Returns the number of sectors erased. The execution check covers the full
    /// range once, before the first sector is touched.
    pub fn erase_all(&mut self, confirm: &mut impl Confirm) -> Result<Confirmed<u32>> {
        if !confirm.confirm("Erase the entire flash?") {
            crate::log_info!("Full erase declined");
            return Ok(Confirmed::Declined);
        }

        self.ensure_not_executing_from(self.layout.full_range())?;

        let mut erased = 0;
        for sector in self.layout.sectors() {
            self.erase(sector)?;
            erased += 1;
        }
        crate::log_info!("Erased {} sectors", erased);
        Ok(Confirmed::Done(erased))
    }

    /// Write `data` at `offset`, keeping the rest of the sector
    ///
    /// Empty `data` touches no hardware, but is still refused while code runs
    /// from the target sector.
    ///
    /// # Errors
    ///
    /// - `InvalidAddress` if `offset` is past the end of flash
    /// - `CrossesSectorBoundary` if the data does not fit in `offset`'s sector
    /// - `SelfDestructionRisk` if code is running from the target sector
    /// - `EraseFailed`/`WriteFailed` from the hardware, without retry
    pub fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        if !self.layout.contains(offset) {
            return Err(FlashError::InvalidAddress.into());
        }

        let sector = sector_base(offset);
        let in_sector = (offset - sector) as usize;
        if in_sector + data.len() > SECTOR_SIZE {
            crate::log_warn!(
                "Write of {} bytes at {:#x} crosses a sector boundary",
                data.len(),
                offset
            );
            return Err(FlashError::CrossesSectorBoundary.into());
        }

        self.ensure_not_executing_from(sector..sector + SECTOR_SIZE as u32)?;
        if data.is_empty() {
            return Ok(());
        }

        self.commit_sector(
            sector,
            SectorImage::Overlay {
                offset: in_sector,
                data,
            },
        )
    }

    /// Scan `range` for non-erased bytes
    pub fn blank_check(&self, range: Range<u32>) -> Result<BlankScan<'_, F>> {
        if range.end > self.layout.capacity() {
            return Err(FlashError::InvalidAddress.into());
        }
        BlankScan::new(&self.flash, range)
    }

    /// Rebuild `sector` from `image` and commit it
    ///
    /// The protected record, if it lives here, is snapshotted from flash and
    /// laid back over the image at its own offset before the commit.
    fn commit_sector(&mut self, sector: u32, image: SectorImage<'_>) -> Result<()> {
        let region = self.layout.protected();
        let snapshot = if region.is_in_sector(sector) {
            Some(ProtectedSnapshot::capture(&self.flash, region)?)
        } else {
            None
        };

        match image {
            SectorImage::Erased => self.staging.fill(ERASED_BYTE),
            SectorImage::Overlay { offset, data } => {
                self.staging.load(&self.flash, sector)?;
                self.staging.overlay(offset, data);
            }
        }

        if let Some(snapshot) = &snapshot {
            snapshot.restore_into(&mut self.staging);
        }

        let _masked = InterruptGuard::new(&self.interrupts);
        self.flash.erase_sector(sector).inspect_err(|_| {
            crate::log_error!("Erase of sector {:#x} failed", sector);
        })?;
        self.flash
            .program_sector(sector, self.staging.as_bytes())
            .inspect_err(|_| {
                crate::log_error!("Program of sector {:#x} failed", sector);
            })
    }

    fn raw_erase(&mut self, sector: u32) -> Result<()> {
        let _masked = InterruptGuard::new(&self.interrupts);
        self.flash.erase_sector(sector).inspect_err(|_| {
            crate::log_error!("Erase of sector {:#x} failed", sector);
        })
    }

    /// Fail with `SelfDestructionRisk` if code is running from `target`
    ///
    /// Evaluated on every call.
    pub fn ensure_not_executing_from(&self, target: Range<u32>) -> Result<()> {
        if self.location.executes_from(target.clone()) {
            crate::log_error!(
                "Refusing to modify {:#x}..{:#x}: code is executing from it",
                target.start,
                target.end
            );
            return Err(FlashError::SelfDestructionRisk.into());
        }
        Ok(())
    }
}
