use embassy_time::Instant;

/// Monotonic time source
///
/// The control loop and the ultrasonic timeout only ever compare instants
/// read from a clock, so tests can drive them with a stepped clock.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Wall clock backed by `embassy_time`'s std driver
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
