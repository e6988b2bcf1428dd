use std::time::{Duration, Instant};

pub const IMPORT_SUCCESS_TTL: Duration = Duration::from_millis(1500);
pub const IMPORT_ERROR_TTL: Duration = Duration::from_millis(3000);
pub const EXPORT_COPIED_TTL: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    Success,
    Error,
}

/// A status value that reads as absent once its time is up.
#[derive(Debug, Clone)]
pub struct TransientFlag<T> {
    state: Option<(T, Instant)>,
}

impl<T> Default for TransientFlag<T> {
    fn default() -> Self {
        Self { state: None }
    }
}

impl<T: Copy> TransientFlag<T> {
    pub fn raise(&mut self, value: T, now: Instant, ttl: Duration) {
        self.state = Some((value, now + ttl));
    }

    pub fn clear(&mut self) {
        self.state = None;
    }

    pub fn get(&self, now: Instant) -> Option<T> {
        match self.state {
            Some((value, expires_at)) if now < expires_at => Some(value),
            _ => None,
        }
    }
}
