pub mod recovery;
pub mod retry;

pub use recovery::{recover_json, Recovered};
pub use retry::{backoff_delay, is_retryable, retry, RetryPolicy};
