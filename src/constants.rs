/// Environment variable holding the handler's log level (INFO, WARNING or ERROR).
pub const LOGGING_LEVEL: &str = "logging_level";
