#![no_std]
#![no_main]

use core::cell::RefCell;
use core::num::NonZeroU32;

use critical_section::Mutex;
use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Delay, Instant, Timer};
use hcsr04_capture::{
    AlertLevel, AlertThresholds, CaptureConfig, CaptureDriver, CaptureUnit, ClockDivisor, Distance,
    EchoLatch, EchoStateMachine, Edge, SensorConfig,
};
use {defmt_rtt as _, panic_probe as _};

const BLINK_MS: u64 = 200;
const MEASURE_PERIOD_MS: u64 = 100;

// one capture tick per microsecond
const TIME_DRIVER_HZ: NonZeroU32 = match NonZeroU32::new(1_000_000) {
    Some(hz) => hz,
    None => panic!("clock frequency must not be zero"),
};

/// Capture unit on top of the embassy time driver: the counter is the number
/// of microseconds since the last clear.
struct InstantCapture {
    cleared_at: Instant,
    edge: Edge,
}

impl InstantCapture {
    fn elapsed_us(&self) -> u64 {
        self.cleared_at.elapsed().as_micros()
    }
}

impl CaptureUnit for InstantCapture {
    fn configure(&mut self, config: &CaptureConfig) {
        self.edge = config.initial_edge;
        self.cleared_at = Instant::now();
    }

    fn set_edge_polarity(&mut self, edge: Edge) {
        self.edge = edge;
    }

    fn clear_counter(&mut self) {
        self.cleared_at = Instant::now();
    }

    fn read_counter(&mut self) -> u16 {
        self.elapsed_us() as u16
    }

    fn overflowed(&mut self) -> bool {
        self.elapsed_us() > u16::MAX as u64
    }
}

type Driver = CaptureDriver<InstantCapture, EchoStateMachine<'static>>;

static LATCH: EchoLatch = EchoLatch::new();
static DRIVER: Mutex<RefCell<Option<Driver>>> = Mutex::new(RefCell::new(None));

/// Waits for the edge the state machine has armed and hands it to the driver.
#[embassy_executor::task]
async fn echo_edges(mut echo: Input<'static>) {
    loop {
        let armed = critical_section::with(|cs| DRIVER.borrow_ref(cs).as_ref().map(|d| d.unit().edge));
        match armed {
            Some(Edge::Rising) => echo.wait_for_rising_edge().await,
            Some(Edge::Falling) => echo.wait_for_falling_edge().await,
            None => {
                Timer::after_millis(1).await;
                continue;
            }
        }
        critical_section::with(|cs| {
            if let Some(driver) = DRIVER.borrow_ref_mut(cs).as_mut() {
                driver.on_interrupt();
            }
        });
    }
}

/// Text display next to the LED bar: the current distance, plus a STOP banner
/// while an obstacle is too close.
trait StatusDisplay {
    fn show_distance(&mut self, distance: Distance);
    fn show_stop(&mut self, stop: bool);
}

/// Writes the display lines to the RTT log. Takes the place of an LCD panel.
struct RttDisplay {
    stop: bool,
}

impl StatusDisplay for RttDisplay {
    fn show_distance(&mut self, distance: Distance) {
        if distance.is_valid() {
            info!("Distance = {} cm", distance.centimeters());
        } else if distance == Distance::NO_ECHO {
            warn!("Distance = no echo");
        } else {
            warn!("Distance = out of range");
        }
    }

    fn show_stop(&mut self, stop: bool) {
        if stop == self.stop {
            return;
        }
        self.stop = stop;
        if stop {
            warn!("STOP");
        } else {
            info!("STOP cleared");
        }
    }
}

fn show(leds: &mut [Output<'static>; 3], lit: usize) {
    for (i, led) in leds.iter_mut().enumerate() {
        led.set_level(if i < lit { Level::High } else { Level::Low });
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let trigger = Output::new(p.PIN_12, Level::Low);
    let echo = Input::new(p.PIN_13, Pull::Down);
    let mut leds = [
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
    ];
    let mut buzzer = Output::new(p.PIN_5, Level::Low);
    let mut display = RttDisplay { stop: false };

    let capture = CaptureConfig {
        clock_hz: TIME_DRIVER_HZ,
        divisor: ClockDivisor::Div1,
        initial_edge: Edge::Rising,
    };
    let unit = InstantCapture {
        cleared_at: Instant::now(),
        edge: Edge::Rising,
    };

    let (driver, mut sensor) = unwrap!(hcsr04_capture::init(
        unit,
        trigger,
        Delay,
        capture,
        SensorConfig::default(),
        &LATCH,
    ));
    critical_section::with(|cs| DRIVER.borrow_ref_mut(cs).replace(driver));
    unwrap!(spawner.spawn(echo_edges(echo)));

    let thresholds = AlertThresholds::default();
    info!("Running!");

    loop {
        let distance = sensor.read_distance_async().await;
        display.show_distance(distance);
        let mut level = AlertLevel::classify(distance, &thresholds);

        if level.blinks() {
            display.show_stop(true);
            buzzer.set_level(if level.buzzer() { Level::High } else { Level::Low });
            // keep blinking and measuring until the obstacle is gone
            while level.blinks() {
                show(&mut leds, level.leds_lit());
                Timer::after_millis(BLINK_MS).await;
                show(&mut leds, 0);
                Timer::after_millis(BLINK_MS).await;

                let distance = sensor.read_distance_async().await;
                display.show_distance(distance);
                level = AlertLevel::classify(distance, &thresholds);
            }
            buzzer.set_low();
            display.show_stop(false);
        }

        info!("{}", level);
        show(&mut leds, level.leds_lit());
        Timer::after_millis(MEASURE_PERIOD_MS).await;
    }
}
