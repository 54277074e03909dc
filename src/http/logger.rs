//! Diagnostic sink for the executor.
//!
//! The executor never writes to the console directly; it reports through a
//! [`Logger`] so callers (and tests) can decide where records go.

#[cfg_attr(test, mockall::automock)]
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards records to the `log` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn log(&self, message: &str) {
        log::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        log::error!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_facade_is_usable_as_trait_object() {
        let logger: Box<dyn Logger> = Box::new(LogFacade);
        logger.log("request");
        logger.warn("retrying");
        logger.error("failed");
    }

    #[test]
    fn test_mock_logger_records_calls() {
        let mut logger = MockLogger::new();
        logger
            .expect_warn()
            .withf(|m| m.contains("attempt"))
            .times(1)
            .return_const(());

        logger.warn("attempt 1/3 failed");
    }
}
