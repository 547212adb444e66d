//! Rate limiting controller for API calls.
//!
//! Manages requests-per-minute (RPM) limiting to respect API rate limits.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Length of one rate-limit window.
pub const RPM_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Manages requests per minute limiting.
///
/// When `max_rpm` is set, the controller counts requests in the current
/// window and makes callers wait for the next window once the limit is
/// reached. Waiting callers are served in lock order.
#[derive(Debug)]
pub struct RpmController {
    /// Maximum requests per window. If `None`, no limit is applied.
    pub max_rpm: Option<u32>,
    window_length: Duration,
    window: Mutex<Window>,
}

impl Default for RpmController {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RpmController {
    pub fn new(max_rpm: Option<u32>) -> Self {
        Self::with_window(max_rpm, RPM_WINDOW)
    }

    /// Create a controller with a custom window length.
    pub fn with_window(max_rpm: Option<u32>, window_length: Duration) -> Self {
        Self {
            max_rpm,
            window_length,
            window: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Count a new request, waiting for the next window if the limit is reached.
    pub async fn check_or_wait(&self) {
        let Some(max) = self.max_rpm else {
            return;
        };

        let mut window = self.window.lock().await;
        if window.started.elapsed() >= self.window_length {
            window.started = Instant::now();
            window.count = 0;
        }

        if window.count >= max {
            let remaining = self.window_length.saturating_sub(window.started.elapsed());
            log::info!("Max RPM reached, waiting for next minute to start.");
            tokio::time::sleep(remaining).await;
            window.started = Instant::now();
            window.count = 0;
        }

        window.count += 1;
    }

    /// Requests counted in the current window.
    pub async fn current_rpm(&self) -> u32 {
        self.window.lock().await.count
    }
}
