/// Sliding time-window limiter over a list of admission timestamps.
/// Local to one session; nothing is persisted or shared.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_requests: usize,
    window_secs: u64,
    admitted: Vec<u64>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            admitted: Vec::new(),
        }
    }

    fn prune(&mut self, now_epoch_secs: u64) {
        let cutoff = now_epoch_secs.saturating_sub(self.window_secs);
        self.admitted.retain(|at| *at > cutoff);
    }

    /// Admit the action at `now_epoch_secs` if fewer than `max_requests`
    /// admissions remain inside the trailing window, recording it on
    /// success. Rejections are not recorded.
    pub fn check_and_record(&mut self, now_epoch_secs: u64) -> bool {
        self.prune(now_epoch_secs);
        if self.admitted.len() >= self.max_requests {
            return false;
        }
        self.admitted.push(now_epoch_secs);
        true
    }

    pub fn admitted_in_window(&mut self, now_epoch_secs: u64) -> usize {
        self.prune(now_epoch_secs);
        self.admitted.len()
    }
}
