use crate::error_handling::types::InspectionError;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Runs `query` on a helper thread and waits at most `timeout` for its result.
///
/// On expiry the helper thread is left to finish on its own; its late result
/// is dropped with the channel.
pub fn run_bounded<T, F>(timeout: Duration, query: F) -> Result<T, InspectionError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, InspectionError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("netusage-query".to_string())
        .spawn(move || {
            let _ = tx.send(query());
        })
        .map_err(|e| InspectionError::Other(format!("failed to spawn query thread: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(InspectionError::TimedOut(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(InspectionError::Other(
            "query thread exited without a result".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_query_result() {
        let result = run_bounded(Duration::from_secs(1), || Ok(42usize));
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn test_passes_query_error_through() {
        let result: Result<usize, _> =
            run_bounded(Duration::from_secs(1), || Err(InspectionError::AccessDenied(9)));
        assert_eq!(result, Err(InspectionError::AccessDenied(9)));
    }

    #[test]
    fn test_slow_query_times_out() {
        let timeout = Duration::from_millis(20);
        let result = run_bounded(timeout, || {
            thread::sleep(Duration::from_millis(500));
            Ok(1usize)
        });
        assert_eq!(result, Err(InspectionError::TimedOut(timeout)));
    }

    #[test]
    fn test_panicking_query_is_reported() {
        let result: Result<usize, _> =
            run_bounded(Duration::from_secs(1), || panic!("query blew up"));
        assert!(matches!(result, Err(InspectionError::Other(_))));
    }
}
