//! Timing capture driver.
//!
//! A free-running counter plus an edge detector with selectable polarity. The
//! hardware specific part lives behind [`CaptureUnit`]; [`CaptureDriver`] owns
//! the unit together with the one registered [`EdgeHandler`] and is what the
//! platform's interrupt handler calls into.

use crate::config::{CaptureConfig, Edge};

/// The capture hardware: a counter that can be cleared and read, and an edge
/// detector whose polarity can be switched between two edges.
pub trait CaptureUnit {
    /// Start the counter with the configured prescaler and arm the edge
    /// detector for `config.initial_edge`.
    fn configure(&mut self, config: &CaptureConfig);

    /// Select the edge that fires the next interrupt.
    fn set_edge_polarity(&mut self, edge: Edge);

    /// Reset the counter to zero.
    fn clear_counter(&mut self);

    /// Current counter value. Does not reset the counter.
    fn read_counter(&mut self) -> u16;

    /// Whether the counter wrapped since the last [`clear_counter`](Self::clear_counter).
    ///
    /// A wrapped counter reads as a short, plausible width, so this cannot be
    /// derived from the counter value. Units without a hardware overflow flag
    /// have to track wraps themselves, e.g. from the overflow interrupt.
    fn overflowed(&mut self) -> bool;
}

/// Callback run on every detected edge, in interrupt context.
///
/// It gets the capture unit so it can clear or read the counter and re-arm the
/// edge detector. Implementations must not block.
pub trait EdgeHandler {
    fn on_edge(&mut self, unit: &mut dyn CaptureUnit);
}

impl<F> EdgeHandler for F
where
    F: FnMut(&mut dyn CaptureUnit),
{
    fn on_edge(&mut self, unit: &mut dyn CaptureUnit) {
        self(unit)
    }
}

/// Owns a capture unit and the handler invoked on its edges.
pub struct CaptureDriver<U, H> {
    unit: U,
    handler: Option<H>,
}

impl<U, H> CaptureDriver<U, H>
where
    U: CaptureUnit,
    H: EdgeHandler,
{
    /// Wrap a capture unit. No handler is installed yet.
    pub fn new(unit: U) -> Self {
        Self {
            unit,
            handler: None,
        }
    }

    /// Arm the counter and the edge detector.
    pub fn configure(&mut self, config: &CaptureConfig) {
        self.unit.configure(config);
    }

    pub fn set_edge_polarity(&mut self, edge: Edge) {
        self.unit.set_edge_polarity(edge);
    }

    pub fn clear_counter(&mut self) {
        self.unit.clear_counter();
    }

    pub fn read_counter(&mut self) -> u16 {
        self.unit.read_counter()
    }

    /// Install the edge handler. Only one is supported; a previously registered
    /// handler is replaced and handed back.
    pub fn register_callback(&mut self, handler: H) -> Option<H> {
        self.handler.replace(handler)
    }

    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    pub fn unit(&self) -> &U {
        &self.unit
    }

    /// Direct access to the unit, e.g. for acknowledging interrupt flags.
    pub fn unit_mut(&mut self) -> &mut U {
        &mut self.unit
    }

    /// Dispatch one edge event to the registered handler.
    ///
    /// Call this from the capture interrupt. Edges without a handler are dropped.
    pub fn on_interrupt(&mut self) {
        if let Some(handler) = self.handler.as_mut() {
            handler.on_edge(&mut self.unit);
        }
    }

    /// Give back the capture unit, dropping the handler.
    pub fn free(self) -> U {
        self.unit
    }
}
