/// Caller-side scheduling policy for interactive compositing.
///
/// Two concerns, both explicit and clock-injected so they are testable
/// without timers:
///
/// - **Coalescing**: live property edits during a drag request passes far
///   faster than they are worth rendering. Requests inside the quiescence
///   window collapse into one pending pass that fires once input settles.
/// - **Re-entrancy**: one pass runs to completion before another may
///   start. A request arriving mid-pass is simply dropped; the next tick
///   catches up with the latest requested time.
///
/// Export never goes through this type — it calls the compositor
/// directly, synchronously, frame by frame.
#[derive(Clone, Debug)]
pub struct RenderCoalescer {
    /// Quiescence window in milliseconds.
    window_ms: f64,
    pending: Option<PendingPass>,
    in_pass: bool,
}

#[derive(Clone, Copy, Debug)]
struct PendingPass {
    /// Requested query time (latest wins).
    time: f64,
    /// Clock instant the pass becomes due.
    due_ms: f64,
}

impl RenderCoalescer {
    /// Policy with the given quiescence window in milliseconds.
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms: window_ms.max(0.0),
            pending: None,
            in_pass: false,
        }
    }

    /// Record a request to composite at `time`. `now_ms` is the caller's
    /// monotonic clock. Requests while a pass runs are dropped.
    pub fn request(&mut self, time: f64, now_ms: f64) {
        if self.in_pass {
            return;
        }
        self.pending = Some(PendingPass {
            time,
            due_ms: now_ms + self.window_ms,
        });
    }

    /// Take the pending pass if its quiescence window has elapsed.
    /// Returns the query time to composite, and marks the pass running.
    pub fn poll(&mut self, now_ms: f64) -> Option<f64> {
        if self.in_pass {
            return None;
        }
        let pending = self.pending?;
        if now_ms < pending.due_ms {
            return None;
        }
        self.pending = None;
        self.in_pass = true;
        Some(pending.time)
    }

    /// Mark the running pass finished; the next poll may fire again.
    pub fn finish_pass(&mut self) {
        self.in_pass = false;
    }

    /// True while a compositing pass is marked running.
    pub fn is_in_pass(&self) -> bool {
        self.in_pass
    }
}
