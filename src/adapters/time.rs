//! Monotonic time source for the control loop.
//!
//! Everything in the core is scheduled off a single `now_ms` sample
//! taken at the top of each tick, so the clock only needs to be
//! monotonic — wall time never enters the picture.

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    origin: std::time::Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            origin: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (hardware) or clock creation (host).
    #[cfg(target_os = "espidf")]
    pub fn now_ms(&self) -> u64 {
        // esp_timer is the 64-bit microsecond counter that survives
        // light sleep; it never goes backwards.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1000) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
