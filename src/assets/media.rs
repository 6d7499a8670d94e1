use crate::foundation::core::Fps;

/// Boundary to the host's asynchronous media elements.
///
/// Seeks complete out-of-band: the compositor requests a position, keeps
/// drawing the last-known-good frame while the seek is in flight, and
/// re-samples once the clock reports ready near the requested time.
pub trait MediaClock {
    /// Ask the media element to move to `time` seconds.
    fn request_seek(&mut self, time: f64);

    /// Position the element is currently presenting, in seconds.
    fn current_time(&self) -> f64;

    /// True once the element has decoded pixels for its current position.
    fn is_ready(&self) -> bool;
}

/// Whether a new seek should be issued for a desired source time.
///
/// Seeking on every scrub tick thrashes the decoder; a seek is only worth
/// it when the drift exceeds one frame interval.
pub fn needs_seek(desired: f64, current: f64, fps: Fps) -> bool {
    (desired - current).abs() > fps.frame_interval()
}
