//! Raw flash access
//!
//! Boundary to the on-chip flash controller. The part only erases whole
//! sectors and programs whole pages onto previously-erased bytes; the
//! read-modify-write orchestration that hides this from callers lives in
//! the core, not here.

/// Raw sector/page flash access.
///
/// Offsets are physical byte offsets from the start of the flash part.
/// Implementations must guarantee:
///
/// - `erase` sets every bit of the erased range to 1 (bytes read 0xFF)
/// - `program` is only called on erased bytes, or with bits identical to
///   what is already stored; it never sets a 0 bit back to 1
/// - `read` reflects the memory-mapped contents of the part
///
/// Erase and program either succeed or leave the device in an unspecified
/// state; there is no status to report back at this boundary and no retry
/// below it. Callers mask interrupts around erase/program themselves
/// (via `critical_section::with`), since code executing from flash cannot
/// run while the controller is busy.
pub trait RawFlash {
    /// Error type for mapped reads.
    type Error;

    /// Erase `len` bytes starting at `offset`.
    ///
    /// Both `offset` and `len` are multiples of the sector size.
    fn erase(&mut self, offset: u32, len: u32);

    /// Program `data` starting at `offset`.
    ///
    /// `offset` is page-aligned and `data.len()` a multiple of the page
    /// size. The target range has been erased beforehand.
    fn program(&mut self, offset: u32, data: &[u8]);

    /// Copy `buf.len()` bytes from the memory-mapped window at `offset`.
    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error>;
}
