//! In-memory hardware doubles for host tests
//!
//! The doubles enforce the contracts the real parts impose: erase works
//! on whole sectors and leaves 0xFF behind, program only lands on erased
//! or bit-identical bytes, a re-armed hardware alarm replaces the pending
//! one, and the RTC moves forward between readings (one second per read,
//! so busy-waits for a second boundary terminate).

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use kairos_hal::flash::RawFlash;
use kairos_hal::rtc::{DateTime, Rtc};
use kairos_hal::time::TickCounter;

use crate::store::layout::{FLASH_SIZE, PAGE_SIZE, SECTOR_SIZE, WINDOW_BASE, WINDOW_SIZE};

/// Read failure injected via `MemFlash::fail_reads`
#[derive(Debug)]
pub struct ReadFault;

/// In-memory flash window with hardware-contract assertions
pub struct MemFlash<'a> {
    mem: Vec<u8>,
    /// Erase flag to snapshot from inside erase/program/read calls
    flag: Option<&'a AtomicBool>,
    pub fail_reads: bool,
    /// (window offset, len, flag at call) per erase
    pub erases: Vec<(usize, usize, bool)>,
    /// (window offset, len, flag at call) per program
    pub programs: Vec<(usize, usize, bool)>,
    /// flag at call per read
    pub reads: RefCell<Vec<bool>>,
}

impl<'a> MemFlash<'a> {
    pub fn new() -> Self {
        Self::observing(None)
    }

    pub fn with_flag(flag: &'a AtomicBool) -> Self {
        Self::observing(Some(flag))
    }

    fn observing(flag: Option<&'a AtomicBool>) -> Self {
        Self {
            mem: vec![0xFF; WINDOW_SIZE],
            flag,
            fail_reads: false,
            erases: Vec::new(),
            programs: Vec::new(),
            reads: RefCell::new(Vec::new()),
        }
    }

    fn flag_now(&self) -> bool {
        self.flag.map(|f| f.load(Ordering::Acquire)).unwrap_or(false)
    }

    fn window_index(&self, offset: u32, len: usize) -> usize {
        let offset = offset as usize;
        assert!(
            offset >= WINDOW_BASE && offset + len <= FLASH_SIZE,
            "access outside the reserved window: {offset:#x}+{len}"
        );
        offset - WINDOW_BASE
    }

    pub fn checksum(&self) -> u64 {
        self.mem.iter().map(|&b| b as u64).sum()
    }
}

impl RawFlash for MemFlash<'_> {
    type Error = ReadFault;

    fn erase(&mut self, offset: u32, len: u32) {
        let len = len as usize;
        assert_eq!(offset as usize % SECTOR_SIZE, 0, "erase start not sector-aligned");
        assert_eq!(len % SECTOR_SIZE, 0, "erase length not whole sectors");
        let idx = self.window_index(offset, len);
        let flag = self.flag_now();
        self.erases.push((idx, len, flag));
        self.mem[idx..idx + len].fill(0xFF);
    }

    fn program(&mut self, offset: u32, data: &[u8]) {
        assert_eq!(offset as usize % PAGE_SIZE, 0, "program start not page-aligned");
        assert_eq!(data.len() % PAGE_SIZE, 0, "program length not whole pages");
        let idx = self.window_index(offset, data.len());
        let flag = self.flag_now();
        self.programs.push((idx, data.len(), flag));
        for (slot, &byte) in self.mem[idx..idx + data.len()].iter_mut().zip(data) {
            assert!(*slot == 0xFF || *slot == byte, "programming a non-erased byte");
            *slot = byte;
        }
    }

    fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), ReadFault> {
        self.reads.borrow_mut().push(self.flag_now());
        if self.fail_reads {
            return Err(ReadFault);
        }
        let idx = self.window_index(offset, buf.len());
        buf.copy_from_slice(&self.mem[idx..idx + buf.len()]);
        Ok(())
    }
}

/// Shared-handle simulated tick counter
#[derive(Clone)]
pub struct SimCounter(Rc<SimCounterState>);

struct SimCounterState {
    now: Cell<u32>,
    /// Absolute deadline of the scheduled hardware alarm
    alarm_at: Cell<Option<u32>>,
    /// Ticks added to the clock on every `now()` reading
    auto_step: Cell<u32>,
}

impl SimCounter {
    pub fn new(start: u32) -> Self {
        Self(Rc::new(SimCounterState {
            now: Cell::new(start),
            alarm_at: Cell::new(None),
            auto_step: Cell::new(0),
        }))
    }

    pub fn set_now(&self, ticks: u32) {
        self.0.now.set(ticks);
    }

    pub fn advance(&self, ticks: u32) {
        self.0.now.set(self.0.now.get().wrapping_add(ticks));
    }

    /// Peek at the clock without triggering auto-step
    pub fn now_raw(&self) -> u32 {
        self.0.now.get()
    }

    pub fn alarm_at(&self) -> Option<u32> {
        self.0.alarm_at.get()
    }

    /// Make the clock advance by `ticks` on every reading
    pub fn auto_step(&self, ticks: u32) {
        self.0.auto_step.set(ticks);
    }
}

impl TickCounter for SimCounter {
    fn now(&self) -> u32 {
        let now = self.0.now.get();
        self.0.now.set(now.wrapping_add(self.0.auto_step.get()));
        now
    }

    fn start_alarm(&mut self, delay: u32) {
        let deadline = self.0.now.get().wrapping_add(delay);
        self.0.alarm_at.set(Some(deadline));
    }
}

/// Shared-handle simulated RTC; advances one second per reading
#[derive(Clone)]
pub struct SimRtc(Rc<SimRtcState>);

struct SimRtcState {
    now: Cell<DateTime>,
    reads: Cell<usize>,
}

impl SimRtc {
    pub fn new() -> Self {
        Self(Rc::new(SimRtcState {
            now: Cell::new(DateTime::new(2000, 1, 1, 0, 0, 0)),
            reads: Cell::new(0),
        }))
    }

    pub fn set_now(&self, datetime: DateTime) {
        self.0.now.set(datetime);
    }

    /// Peek at the calendar without stepping it
    pub fn peek(&self) -> DateTime {
        self.0.now.get()
    }

    pub fn reads(&self) -> usize {
        self.0.reads.get()
    }
}

// Rollover past the hour is not needed by any test; keep the step simple.
fn step_second(mut datetime: DateTime) -> DateTime {
    datetime.second += 1;
    if datetime.second == 60 {
        datetime.second = 0;
        datetime.minute += 1;
        if datetime.minute == 60 {
            datetime.minute = 0;
            datetime.hour += 1;
        }
    }
    datetime
}

impl Rtc for SimRtc {
    fn now(&self) -> DateTime {
        let now = self.0.now.get();
        self.0.reads.set(self.0.reads.get() + 1);
        self.0.now.set(step_second(now));
        now
    }

    fn set(&mut self, datetime: DateTime) {
        self.0.now.set(datetime);
    }
}
