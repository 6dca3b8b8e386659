//! Echo edge state machine and the latch it hands results over in.
//!
//! The state machine runs as the capture driver's edge handler, i.e. in
//! interrupt context. It is the only writer of the [`EchoLatch`]; the
//! measurement loop only reads it.

use core::cell::Cell;
use core::future::{poll_fn, Future};
use core::task::Poll;

use critical_section::Mutex;
use futures::task::AtomicWaker;

use crate::capture::{CaptureUnit, EdgeHandler};
use crate::config::Edge;

/// The edge the state machine expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgePhase {
    AwaitingRisingEdge,
    AwaitingFallingEdge,
}

/// Snapshot of the latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Width of the last completed echo pulse in counter ticks.
    pub interval: u16,
    /// The counter wrapped while the pulse was high, `interval` is meaningless.
    pub overflowed: bool,
    /// Incremented (wrapping) on every completed pulse. A reader compares this
    /// against an earlier snapshot to tell a fresh sample from a stale one.
    pub sequence: u32,
    /// Number of the rising edge this pulse started with.
    pub started: u32,
}

/// Position in the edge stream, taken right before a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mark {
    sequence: u32,
    rises: u32,
}

impl Mark {
    /// Whether `sample` is a pulse that both ended and started after this mark.
    ///
    /// A pulse whose rising edge was seen before the mark belongs to an
    /// earlier trigger, even if its falling edge comes later.
    pub fn precedes(&self, sample: &Sample) -> bool {
        sample.sequence != self.sequence && sample.started != self.rises
    }
}

#[derive(Clone, Copy)]
struct State {
    sample: Sample,
    rises: u32,
}

/// The latched echo width shared between the edge interrupt and the
/// measurement loop.
///
/// Reads and writes go through a critical section, so a reader never sees an
/// interval from one pulse combined with the sequence number of another.
pub struct EchoLatch {
    state: Mutex<Cell<State>>,
    waker: AtomicWaker,
}

impl EchoLatch {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(State {
                sample: Sample {
                    interval: 0,
                    overflowed: false,
                    sequence: 0,
                    started: 0,
                },
                rises: 0,
            })),
            waker: AtomicWaker::new(),
        }
    }

    /// Count a rising edge. Only the edge state machine writes.
    pub(crate) fn rise(&self) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            state.rises = state.rises.wrapping_add(1);
            cell.set(state);
        });
    }

    /// Latch a completed pulse. Only the edge state machine writes.
    pub(crate) fn store(&self, interval: u16, overflowed: bool) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            state.sample = Sample {
                interval,
                overflowed,
                sequence: state.sample.sequence.wrapping_add(1),
                started: state.rises,
            };
            cell.set(state);
        });
        self.waker.wake();
    }

    pub fn load(&self) -> Sample {
        critical_section::with(|cs| self.state.borrow(cs).get().sample)
    }

    pub fn sequence(&self) -> u32 {
        self.load().sequence
    }

    /// Where the edge stream stands now.
    pub fn mark(&self) -> Mark {
        let state = critical_section::with(|cs| self.state.borrow(cs).get());
        Mark {
            sequence: state.sample.sequence,
            rises: state.rises,
        }
    }

    /// The latched sample, if it is a whole pulse seen after `mark`.
    pub fn fresh_since(&self, mark: Mark) -> Option<Sample> {
        let sample = self.load();
        mark.precedes(&sample).then_some(sample)
    }

    /// Resolve once a whole pulse after `mark` has been latched.
    pub fn wait_since(&self, mark: Mark) -> impl Future<Output = Sample> + '_ {
        poll_fn(move |cx| {
            self.waker.register(cx.waker());
            match self.fresh_since(mark) {
                Some(sample) => Poll::Ready(sample),
                None => Poll::Pending,
            }
        })
    }
}

impl Default for EchoLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the rising/falling edge pair of the echo pulse.
///
/// On the rising edge the counter is zeroed, so the value read on the falling
/// edge is the pulse width and never an absolute timestamp.
pub struct EchoStateMachine<'a> {
    phase: EdgePhase,
    latch: &'a EchoLatch,
}

impl<'a> EchoStateMachine<'a> {
    pub fn new(latch: &'a EchoLatch) -> Self {
        Self {
            phase: EdgePhase::AwaitingRisingEdge,
            latch,
        }
    }

    pub fn phase(&self) -> EdgePhase {
        self.phase
    }
}

impl EdgeHandler for EchoStateMachine<'_> {
    fn on_edge(&mut self, unit: &mut dyn CaptureUnit) {
        self.phase = match self.phase {
            EdgePhase::AwaitingRisingEdge => {
                unit.clear_counter();
                self.latch.rise();
                unit.set_edge_polarity(Edge::Falling);
                EdgePhase::AwaitingFallingEdge
            }
            EdgePhase::AwaitingFallingEdge => {
                let interval = unit.read_counter();
                self.latch.store(interval, unit.overflowed());
                unit.set_edge_polarity(Edge::Rising);
                EdgePhase::AwaitingRisingEdge
            }
        };
    }
}
