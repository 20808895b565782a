//! EEPROM-style persistent store over raw sector flash
//!
//! The node's upper layers address persistent records with 16-bit logical
//! offsets, as if an EEPROM were fitted. This target has none: records
//! live in a reserved window of on-chip flash, which only erases whole
//! sectors and programs previously-erased bytes. An arbitrary sub-range
//! write is therefore a read-modify-erase-program cycle over the covering
//! sectors; neighbors sharing a sector are read back and reproduced, not
//! skipped. Corrupting bytes outside the written range is the failure
//! mode everything in this module exists to prevent.

pub mod layout;

use core::sync::atomic::{AtomicBool, Ordering};

use kairos_hal::flash::RawFlash;

use layout::{covering_span, WINDOW_BASE, WINDOW_SIZE};

/// Errors from store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Address range falls outside the reserved window
    OutOfRange,
    /// Read-back from the mapped window failed
    Read,
    /// Operation has no meaning on this hardware
    Unsupported,
}

/// Persistent store handle
///
/// Owns the flash peripheral and borrows the process-wide erase flag.
/// The flag lives with the caller (a `static` in firmware) so code with
/// no access to the handle, e.g. a power-mode manager deciding whether a
/// sleep transition is safe, can still poll it.
pub struct FlashStore<'a, F: RawFlash> {
    flash: F,
    erasing: &'a AtomicBool,
    scratch: heapless::Vec<u8, WINDOW_SIZE>,
}

impl<'a, F: RawFlash> FlashStore<'a, F> {
    /// Create a store over `flash`, reporting erase activity on `erasing`
    pub fn new(flash: F, erasing: &'a AtomicBool) -> Self {
        Self {
            flash,
            erasing,
            scratch: heapless::Vec::new(),
        }
    }

    /// Get the raw flash peripheral for low-level access
    pub fn flash(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Write `data` at logical `addr`.
    ///
    /// The covering sectors are read back, patched with the new bytes,
    /// erased, and reprogrammed; bytes outside `[addr, addr + data.len())`
    /// keep their prior contents. Erase and program run inside a single
    /// critical section with the erase flag raised; the read-modify phase
    /// before them stays interruptible. A failed read-back aborts the
    /// write before anything is erased.
    pub fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), StoreError> {
        check_window(addr, data.len())?;
        if data.is_empty() {
            return Ok(());
        }

        let span = covering_span(addr, data.len());
        self.scratch.clear();
        self.scratch
            .resize(span.len, 0)
            .map_err(|_| StoreError::OutOfRange)?;
        read_mapped(&self.flash, span.start, &mut self.scratch)?;

        let offset = addr as usize - span.start;
        self.scratch[offset..offset + data.len()].copy_from_slice(data);

        let physical = (WINDOW_BASE + span.start) as u32;
        self.erasing.store(true, Ordering::Release);
        critical_section::with(|_| {
            self.flash.erase(physical, span.len as u32);
            self.flash.program(physical, &self.scratch);
        });
        self.erasing.store(false, Ordering::Release);

        Ok(())
    }

    /// Read `buf.len()` bytes at logical `addr` from the mapped window.
    ///
    /// Safe while no write is in flight. A read issued during another
    /// caller's erase+program window can observe erased or torn data,
    /// which is the window [`FlashStore::is_erasing`] lets callers avoid.
    pub fn read(&self, addr: u16, buf: &mut [u8]) -> Result<(), StoreError> {
        check_window(addr, buf.len())?;
        read_mapped(&self.flash, addr as usize, buf)
    }

    /// Whether an erase+program cycle is currently in flight
    pub fn is_erasing(&self) -> bool {
        self.erasing.load(Ordering::Acquire)
    }

    /// Select an external storage device by bus address.
    ///
    /// The window lives in on-chip flash; there is no device to address.
    pub fn set_device_address(&mut self, _addr: u8) -> Result<(), StoreError> {
        Err(StoreError::Unsupported)
    }

    /// Bus address of the external storage device, if any
    pub fn device_address(&self) -> Result<u8, StoreError> {
        Err(StoreError::Unsupported)
    }
}

/// Reject any range with a byte outside the reserved window
fn check_window(addr: u16, len: usize) -> Result<(), StoreError> {
    if addr as usize + len > WINDOW_SIZE {
        return Err(StoreError::OutOfRange);
    }
    Ok(())
}

// Shared by `read` and the read-modify phase of `write`, so a write's
// view of sibling data goes through the same path callers use.
fn read_mapped<F: RawFlash>(flash: &F, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
    let physical = (WINDOW_BASE + offset) as u32;
    critical_section::with(|_| flash.read(physical, buf)).map_err(|_| StoreError::Read)
}
