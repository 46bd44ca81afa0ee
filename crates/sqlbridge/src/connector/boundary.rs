//! Fault boundary around connector code.
//!
//! Connectors are foreign: their failure modes cannot be enumerated, and a
//! connector may panic instead of returning an error. Every call from this
//! crate into a connector goes through [`guard`], which is the only place
//! in the crate where panics are caught. A panic becomes
//! [`ConnectorError::Panic`] and never unwinds past the boundary.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::error::{ConnectorError, ConnectorResult};

/// Run `f` (a call into connector code), converting a panic into an error.
///
/// `operation` names the call for the log line.
pub fn guard<T, F>(operation: &str, f: F) -> ConnectorResult<T>
where
    F: FnOnce() -> ConnectorResult<T>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("Connector panicked during {}: {}", operation, message);
            Err(ConnectorError::Panic(format!(
                "connector panicked during {}: {}",
                operation, message
            )))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_passes_results_through() {
        assert_eq!(guard("noop", || Ok(7)), Ok(7));
        assert_eq!(
            guard::<(), _>("fail", || Err(ConnectorError::Query("bad".to_string()))),
            Err(ConnectorError::Query("bad".to_string()))
        );
    }

    #[test]
    fn test_guard_converts_str_panic() {
        let result: ConnectorResult<()> = guard("connect", || panic!("driver exploded"));
        let err = result.unwrap_err();
        assert_eq!(err.category(), "Panic");
        assert!(err.to_string().contains("during connect: driver exploded"));
    }

    #[test]
    fn test_guard_converts_formatted_panic() {
        let code = 42;
        let result: ConnectorResult<()> = guard("query", || panic!("native error {}", code));
        assert!(result.unwrap_err().to_string().contains("native error 42"));
    }
}
