//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the outbound send with the resolved request timeout
//! - Keep timeout errors distinct from transport errors
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timeout maps to `ForwardError::Timeout` (504 if not yet committed)

use std::future::Future;
use std::time::Duration;

use crate::error::{ForwardError, ForwardResult};

/// Run `fut` with a deadline of `duration`.
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> ForwardResult<T>
where
    F: Future<Output = ForwardResult<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(ForwardError::Timeout(duration)),
    }
}
