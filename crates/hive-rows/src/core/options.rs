use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: i64 = 10_000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct CursorOptions {
    /// Rows requested per FetchResults call.
    pub page_size: i64,
    /// Delay between status polls while waiting for completion.
    pub poll_interval: Duration,
    /// Upper bound on a whole wait; `None` waits until the server reports a terminal state.
    pub wait_timeout: Option<Duration>,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: None,
        }
    }
}

impl CursorOptions {
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Option<Duration>) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }
}
