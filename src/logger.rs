use crate::constants::LOGGING_LEVEL;
use crate::events::{EngineEvent, EventMessageVerbosity};
use std::env;
use std::fmt::{Display, Formatter};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// LoggingLevelIssue: why the configured log level fell back to ERROR.
pub enum LoggingLevelIssue {
    /// NotSet: the `logging_level` environment variable is absent.
    NotSet,
    /// Unrecognized: the `logging_level` environment variable holds an unknown value.
    Unrecognized,
}

impl Display for LoggingLevelIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                LoggingLevelIssue::NotSet => format!(
                    "The {LOGGING_LEVEL} environment variable is not set. Setting the log level to ERROR."
                ),
                LoggingLevelIssue::Unrecognized => format!(
                    "The {LOGGING_LEVEL} environment variable is not set to INFO, WARNING, or ERROR. The log level is set to ERROR."
                ),
            }
        )
    }
}

impl LogLevel {
    /// Resolves the log level from a raw `logging_level` value.
    ///
    /// Recognized values are INFO, WARNING and ERROR (case-insensitive). Anything
    /// else falls back to ERROR with an issue to be reported once logging is up.
    pub fn from_logging_level(raw: Option<&str>) -> (LogLevel, Option<LoggingLevelIssue>) {
        match raw {
            None => (LogLevel::Error, Some(LoggingLevelIssue::NotSet)),
            Some(value) => match value.to_uppercase().as_str() {
                "INFO" => (LogLevel::Info, None),
                "WARNING" => (LogLevel::Warning, None),
                "ERROR" => (LogLevel::Error, None),
                _ => (LogLevel::Error, Some(LoggingLevelIssue::Unrecognized)),
            },
        }
    }

    /// Resolves the log level from the `logging_level` environment variable.
    pub fn from_logging_level_env() -> (LogLevel, Option<LoggingLevelIssue>) {
        let raw = env::var(LOGGING_LEVEL).ok();
        Self::from_logging_level(raw.as_deref())
    }

    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, event: EngineEvent);
    fn clone_dyn(&self) -> Box<dyn Logger>;
}

impl Clone for Box<dyn Logger> {
    fn clone(&self) -> Self {
        self.clone_dyn()
    }
}

#[derive(Clone)]
pub struct StdIoLogger {}

impl StdIoLogger {
    pub fn new() -> StdIoLogger {
        StdIoLogger {}
    }
}

impl Default for StdIoLogger {
    fn default() -> Self {
        StdIoLogger::new()
    }
}

impl Logger for StdIoLogger {
    fn log(&self, event: EngineEvent) {
        let event_details = event.get_details();
        let stage = event_details.stage();

        tracing::span!(
            tracing::Level::INFO,
            "std_io_logger",
            stack_id = event_details.stack_id(),
            request_id = event_details.request_id(),
            logical_resource_id = event_details.logical_resource_id(),
            region = match event_details.region() {
                Some(region) => region,
                None => "".to_string(),
            }
            .as_str(),
            stage = stage.to_string().as_str(),
            step = stage.sub_step_name().as_str(),
            transmitter = event_details.transmitter().to_string().as_str(),
        )
        .in_scope(|| {
            match &event {
                EngineEvent::Debug(..) => debug!("{}", event.message(EventMessageVerbosity::FullDetails)),
                EngineEvent::Info(..) => info!("{}", event.message(EventMessageVerbosity::FullDetails)),
                EngineEvent::Warning(..) => warn!("{}", event.message(EventMessageVerbosity::FullDetails)),
                EngineEvent::Error(..) => error!("{}", event.message(EventMessageVerbosity::FullDetails)),
            };
        });
    }

    fn clone_dyn(&self) -> Box<dyn Logger> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EngineEvent, EventDetails, EventMessage, LifecycleStep, Stage, Transmitter, WorkflowStep};
    use tracing_test::traced_test;

    #[test]
    fn test_log_level_from_logging_level() {
        // setup:
        struct TestCase<'a> {
            raw: Option<&'a str>,
            expected_level: LogLevel,
            expected_issue: Option<LoggingLevelIssue>,
            description: &'a str,
        }

        let test_cases = vec![
            TestCase {
                raw: Some("INFO"),
                expected_level: LogLevel::Info,
                expected_issue: None,
                description: "uppercase INFO",
            },
            TestCase {
                raw: Some("info"),
                expected_level: LogLevel::Info,
                expected_issue: None,
                description: "lowercase info",
            },
            TestCase {
                raw: Some("WARNING"),
                expected_level: LogLevel::Warning,
                expected_issue: None,
                description: "uppercase WARNING",
            },
            TestCase {
                raw: Some("Error"),
                expected_level: LogLevel::Error,
                expected_issue: None,
                description: "mixed case Error",
            },
            TestCase {
                raw: Some("VERBOSE"),
                expected_level: LogLevel::Error,
                expected_issue: Some(LoggingLevelIssue::Unrecognized),
                description: "unrecognized value falls back to ERROR",
            },
            TestCase {
                raw: None,
                expected_level: LogLevel::Error,
                expected_issue: Some(LoggingLevelIssue::NotSet),
                description: "absent value falls back to ERROR",
            },
        ];

        for tc in test_cases {
            // execute:
            let (level, issue) = LogLevel::from_logging_level(tc.raw);

            // validate:
            assert_eq!(tc.expected_level, level, "{}", tc.description);
            assert_eq!(tc.expected_issue, issue, "{}", tc.description);
        }
    }

    #[traced_test]
    #[test]
    fn test_log() {
        // setup:
        let stack_id = "arn:aws:cloudformation:eu-west-3:123456789012:stack/network/guid";
        let request_id = "11111111-2222-3333-4444-555555555555";
        let logical_resource_id = "TransitGatewayAttachment";
        let safe_message = "Safe message";
        let raw_message = "Raw message";

        let event_details = EventDetails::new(
            Some("eu-west-3".to_string()),
            stack_id.to_string(),
            request_id.to_string(),
            logical_resource_id.to_string(),
            Stage::Workflow(WorkflowStep::Discovery),
            Transmitter::Vpc("vpc-123".to_string()),
        );

        let logger = StdIoLogger::new();

        // execute:
        logger.log(EngineEvent::Info(
            event_details,
            EventMessage::new(safe_message.to_string(), Some(raw_message.to_string())),
        ));

        // validate:
        assert!(logs_contain("INFO"));
        assert!(logs_contain(format!("stack_id=\"{stack_id}\"").as_str()));
        assert!(logs_contain(format!("request_id=\"{request_id}\"").as_str()));
        assert!(logs_contain(format!("logical_resource_id=\"{logical_resource_id}\"").as_str()));
        assert!(logs_contain("region=\"eu-west-3\""));
        assert!(logs_contain("stage=\"workflow\""));
        assert!(logs_contain("step=\"discovery\""));
        assert!(logs_contain("transmitter=\"VPC 'vpc-123'\""));
        assert!(logs_contain(safe_message));
        assert!(logs_contain(raw_message));

        // warning events go through the same span with lifecycle fields
        let delete_details = EventDetails::new(
            None,
            stack_id.to_string(),
            request_id.to_string(),
            logical_resource_id.to_string(),
            Stage::Lifecycle(LifecycleStep::Delete),
            Transmitter::Handler,
        );
        logger.log(EngineEvent::Warning(
            delete_details,
            EventMessage::new_from_safe("Nothing to delete".to_string()),
        ));
        assert!(logs_contain("Nothing to delete"));
    }
}
