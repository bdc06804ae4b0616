use lambda_runtime::{handler_fn, Context, Error};
use tgw_attachment_engine::io_models::custom_resource::CustomResourceEvent;
use tgw_attachment_engine::logger::{LogLevel, LoggingLevelIssue, StdIoLogger};
use tgw_attachment_engine::transit_gateway;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let (log_level, level_issue) = LogLevel::from_logging_level_env();

    tracing_subscriber::fmt()
        .json()
        .with_max_level(log_level.tracing_level())
        .with_current_span(true)
        .try_init()?;

    match level_issue {
        Some(issue @ LoggingLevelIssue::Unrecognized) => error!("{issue}"),
        Some(issue) => warn!("{issue}"),
        None => {}
    }

    lambda_runtime::run(handler_fn(handler)).await?;
    Ok(())
}

async fn handler(event: CustomResourceEvent, context: Context) -> Result<(), Error> {
    let logger = StdIoLogger::new();
    transit_gateway::handle_request(&event, &context.env_config.log_stream, &logger).await;
    Ok(())
}
