//! Two-word backup persistence
//!
//! The MAC stack checkpoints two 32-bit words (its timing reference
//! point) across resets. They live big-endian at a fixed logical offset
//! in the store's window.

use kairos_hal::flash::RawFlash;

use crate::store::layout::SECTOR_SIZE;
use crate::store::{FlashStore, StoreError};

/// Logical offset of the backup words (start of the window's 15th sector)
pub const BACKUP_OFFSET: u16 = (14 * SECTOR_SIZE) as u16;

/// Persist the two backup words
pub fn backup_write<F: RawFlash>(
    store: &mut FlashStore<'_, F>,
    word0: u32,
    word1: u32,
) -> Result<(), StoreError> {
    let mut bytes = [0u8; 8];
    bytes[..4].copy_from_slice(&word0.to_be_bytes());
    bytes[4..].copy_from_slice(&word1.to_be_bytes());
    store.write(BACKUP_OFFSET, &bytes)
}

/// Restore the two backup words.
///
/// Returns zeros when the window cannot be read. A location that was
/// never written reads back as whatever the flash holds; zero does not
/// distinguish "never written" from "written as zero".
pub fn backup_read<F: RawFlash>(store: &FlashStore<'_, F>) -> (u32, u32) {
    let mut bytes = [0u8; 8];
    if store.read(BACKUP_OFFSET, &mut bytes).is_err() {
        return (0, 0);
    }

    let word0 = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let word1 = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    (word0, word1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemFlash;
    use core::sync::atomic::AtomicBool;

    #[test]
    fn test_backup_round_trip() {
        let flag = AtomicBool::new(false);
        let mut store = FlashStore::new(MemFlash::new(), &flag);

        backup_write(&mut store, 0x1122_3344, 0xAABB_CCDD).unwrap();
        assert_eq!(backup_read(&store), (0x1122_3344, 0xAABB_CCDD));
    }

    #[test]
    fn test_words_are_stored_big_endian() {
        let flag = AtomicBool::new(false);
        let mut store = FlashStore::new(MemFlash::new(), &flag);

        backup_write(&mut store, 0x1122_3344, 0xAABB_CCDD).unwrap();

        let mut bytes = [0u8; 8];
        store.read(BACKUP_OFFSET, &mut bytes).unwrap();
        assert_eq!(bytes, [0x11, 0x22, 0x33, 0x44, 0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn test_failed_read_reports_zeros() {
        let flag = AtomicBool::new(false);
        let mut store = FlashStore::new(MemFlash::new(), &flag);
        store.flash().fail_reads = true;

        assert_eq!(backup_read(&store), (0, 0));
    }

    #[test]
    fn test_never_written_location_is_raw_flash() {
        let flag = AtomicBool::new(false);
        let store = FlashStore::new(MemFlash::new(), &flag);

        // erased flash reads all-ones; zeros are NOT a "never written"
        // marker
        assert_eq!(backup_read(&store), (0xFFFF_FFFF, 0xFFFF_FFFF));
    }
}
