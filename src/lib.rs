//! # hcsr04-capture
//!
//! An interrupt-driven driver for the HC-SR04 ultrasonic distance sensor that
//! measures the echo pulse with a timer input capture unit instead of polling
//! the echo pin.
//!
//! A measurement cycle is split in two halves that share an [`EchoLatch`]:
//!
//! - the [`CaptureDriver`] is called from the capture interrupt and runs the
//!   [`EchoStateMachine`], which zeroes the counter on the rising edge of the
//!   echo and latches the counter on the falling edge;
//! - the [`Ultrasonic`] handle fires the trigger pulse from the main loop,
//!   waits (bounded) for a fresh latched width and converts it to centimeters.
//!
//! Failed measurements are reported as errors by [`Ultrasonic::measure`] or as
//! the sentinels [`Distance::NO_ECHO`] and [`Distance::OUT_OF_RANGE`] by
//! [`Ultrasonic::read_distance`]. A measurement never waits longer than the
//! configured echo timeout.
//!
//! ## Features
//!
//! - `blocking_trigger`: (Default) The async measurement still generates the
//!   trigger pulse with the blocking delay. An async delay of a few microseconds
//!   adds jitter in the same order as the pulse itself. Disable it if the core
//!   really has to do other work during the pulse.
//! - `defmt`: log through `defmt`. Leave it off for host builds.
//!
//! # Example
//!
//! ```rust, ignore
//! static LATCH: EchoLatch = EchoLatch::new();
//! static DRIVER: Mutex<RefCell<Option<CaptureDriver<Timer1, EchoStateMachine<'static>>>>> =
//!     Mutex::new(RefCell::new(None));
//!
//! let (driver, mut sensor) = hcsr04_capture::init(
//!     timer1,
//!     trigger_pin,
//!     delay,
//!     CaptureConfig::default(),
//!     SensorConfig::default(),
//!     &LATCH,
//! )?;
//! critical_section::with(|cs| DRIVER.borrow_ref_mut(cs).replace(driver));
//!
//! // in the capture interrupt
//! critical_section::with(|cs| {
//!     if let Some(driver) = DRIVER.borrow_ref_mut(cs).as_mut() {
//!         driver.on_interrupt();
//!     }
//! });
//!
//! // in the main loop
//! loop {
//!     let distance = sensor.read_distance();
//!     info!("Distance = {}", distance);
//! }
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

mod alert;
mod capture;
mod config;
mod distance;
mod echo;
mod error;
mod sensor;
mod trigger;

pub use alert::{AlertLevel, AlertThresholds};
pub use capture::{CaptureDriver, CaptureUnit, EdgeHandler};
pub use config::{
    CaptureConfig, ClockDivisor, ConfigError, Edge, SensorConfig, MIN_TRIGGER_PULSE_US,
    SENSOR_START_DELAY_US,
};
pub use distance::{compute_distance, round_trip_us, Distance, TickPeriod};
pub use echo::{EchoLatch, EchoStateMachine, EdgePhase, Mark, Sample};
pub use error::Error;
pub use sensor::{init, Ultrasonic};
pub use trigger::TriggerPulse;
