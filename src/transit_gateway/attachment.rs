use crate::errors::EngineError;
use crate::events::{EngineEvent, EventDetails, EventMessage, Transmitter};
use crate::logger::Logger;
use crate::services::aws::models::AwsSdkConfigEc2;
use crate::transit_gateway::discovery::VpcMetadata;
use aws_sdk_ec2::types::TransitGatewayAttachmentState;
use aws_types::SdkConfig;
use std::time::{Duration, Instant};

/// How long to wait for requested attachments to become available before moving
/// on to route programming.
pub const ATTACHMENT_AVAILABLE_TIMEOUT: Duration = Duration::from_secs(300);
const ATTACHMENT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Requests a transit gateway attachment for every discovered VPC holding at
/// least one eligible subnet. VPCs without eligible subnets are skipped with a
/// log line; one VPC failing must not block the others. Returns the attachment
/// ids that were issued.
pub async fn create_transit_gateway_attachments(
    aws_config: &SdkConfig,
    logger: &dyn Logger,
    event_details: &EventDetails,
    vpc_metadata: &[VpcMetadata],
    transit_gateway_id: &str,
) -> Vec<String> {
    let mut attachment_ids: Vec<String> = Vec::new();

    for entry in vpc_metadata {
        let vpc_details =
            EventDetails::clone_changing_transmitter(event_details.clone(), Transmitter::Vpc(entry.vpc_id.clone()));

        if !entry.has_attachment_subnets() {
            logger.log(EngineEvent::Info(
                vpc_details,
                EventMessage::new_from_safe(format!("No subnets in VPC '{}', unable to attach VPC", entry.vpc_id)),
            ));
            continue;
        }

        match aws_config
            .create_transit_gateway_vpc_attachment(
                transit_gateway_id.to_string(),
                entry.vpc_id.clone(),
                entry.subnet_ids.clone(),
            )
            .await
        {
            Ok(output) => {
                let attachment_id = output
                    .transit_gateway_vpc_attachment()
                    .and_then(|attachment| attachment.transit_gateway_attachment_id())
                    .unwrap_or_default()
                    .to_string();

                logger.log(EngineEvent::Info(
                    vpc_details,
                    EventMessage::new_from_safe(format!(
                        "Requested attachment '{attachment_id}' of VPC '{}' to transit gateway '{transit_gateway_id}'",
                        entry.vpc_id
                    )),
                ));

                if !attachment_id.is_empty() {
                    attachment_ids.push(attachment_id);
                }
            }
            Err(e) => {
                logger.log(EngineEvent::Warning(
                    vpc_details,
                    EventMessage::new_from_engine_error(
                        EngineError::new_aws_sdk_cannot_create_transit_gateway_vpc_attachment(
                            event_details.clone(),
                            e,
                            &entry.vpc_id,
                        ),
                    ),
                ));
            }
        }
    }

    attachment_ids
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// AttachmentProgress: where an attachment stands on its way to being usable.
pub enum AttachmentProgress {
    Ready,
    Failed,
    Pending,
}

pub fn attachment_progress(state: &TransitGatewayAttachmentState) -> AttachmentProgress {
    match state {
        TransitGatewayAttachmentState::Available => AttachmentProgress::Ready,
        TransitGatewayAttachmentState::Failed
        | TransitGatewayAttachmentState::Failing
        | TransitGatewayAttachmentState::Rejected
        | TransitGatewayAttachmentState::Rejecting
        | TransitGatewayAttachmentState::Deleted
        | TransitGatewayAttachmentState::Deleting => AttachmentProgress::Failed,
        _ => AttachmentProgress::Pending,
    }
}

/// Polls the issued attachments until every one is available or in a terminal
/// state, bounded by ATTACHMENT_AVAILABLE_TIMEOUT. Route creation targeting a
/// gateway whose attachment is still pending is rejected by the provider. A
/// timeout is logged and route programming proceeds for whatever is ready.
pub async fn wait_for_attachments_available(
    aws_config: &SdkConfig,
    logger: &dyn Logger,
    event_details: &EventDetails,
    attachment_ids: &[String],
) {
    if attachment_ids.is_empty() {
        return;
    }

    let deadline = Instant::now() + ATTACHMENT_AVAILABLE_TIMEOUT;
    let mut pending: Vec<String> = attachment_ids.to_vec();

    loop {
        match aws_config.describe_transit_gateway_vpc_attachments(pending.clone()).await {
            Ok(output) => {
                let attachments = output.transit_gateway_vpc_attachments();
                let mut still_pending: Vec<String> = Vec::new();

                for attachment_id in &pending {
                    let attachment = attachments
                        .iter()
                        .find(|attachment| attachment.transit_gateway_attachment_id() == Some(attachment_id.as_str()));

                    match attachment.and_then(|attachment| attachment.state()) {
                        Some(state) => match attachment_progress(state) {
                            AttachmentProgress::Ready => {
                                logger.log(EngineEvent::Info(
                                    event_details.clone(),
                                    EventMessage::new_from_safe(format!("Attachment '{attachment_id}' is available")),
                                ));
                            }
                            AttachmentProgress::Failed => {
                                logger.log(EngineEvent::Warning(
                                    event_details.clone(),
                                    EventMessage::new_from_safe(format!(
                                        "Attachment '{attachment_id}' ended in state '{}'",
                                        state.as_str()
                                    )),
                                ));
                            }
                            AttachmentProgress::Pending => still_pending.push(attachment_id.clone()),
                        },
                        // not reported yet, keep waiting for it
                        None => still_pending.push(attachment_id.clone()),
                    }
                }

                pending = still_pending;
                if pending.is_empty() {
                    return;
                }
            }
            Err(e) => {
                logger.log(EngineEvent::Warning(
                    event_details.clone(),
                    EventMessage::new_from_engine_error(
                        EngineError::new_aws_sdk_cannot_describe_transit_gateway_vpc_attachments(
                            event_details.clone(),
                            e,
                        ),
                    ),
                ));
            }
        }

        if Instant::now() >= deadline {
            logger.log(EngineEvent::Warning(
                event_details.clone(),
                EventMessage::new_from_engine_error(EngineError::new_transit_gateway_attachments_not_ready(
                    event_details.clone(),
                    &pending,
                    ATTACHMENT_AVAILABLE_TIMEOUT.as_secs(),
                )),
            ));
            return;
        }

        tokio::time::sleep(ATTACHMENT_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::{attachment_progress, create_transit_gateway_attachments, AttachmentProgress};
    use crate::events::{EventDetails, LifecycleStep, Stage, Transmitter};
    use crate::logger::StdIoLogger;
    use crate::transit_gateway::discovery::VpcMetadata;
    use aws_sdk_ec2::types::TransitGatewayAttachmentState;
    use aws_types::SdkConfig;

    fn event_details() -> EventDetails {
        EventDetails::new(
            Some("eu-west-3".to_string()),
            "stack".to_string(),
            "request".to_string(),
            "resource".to_string(),
            Stage::Lifecycle(LifecycleStep::Create),
            Transmitter::TransitGateway("tgw-0123456789abcdef0".to_string()),
        )
    }

    #[test]
    fn test_attachment_progress() {
        // setup:
        let test_cases = vec![
            (TransitGatewayAttachmentState::Available, AttachmentProgress::Ready),
            (TransitGatewayAttachmentState::Failed, AttachmentProgress::Failed),
            (TransitGatewayAttachmentState::Failing, AttachmentProgress::Failed),
            (TransitGatewayAttachmentState::Rejected, AttachmentProgress::Failed),
            (TransitGatewayAttachmentState::Deleted, AttachmentProgress::Failed),
            (TransitGatewayAttachmentState::Pending, AttachmentProgress::Pending),
            (TransitGatewayAttachmentState::Initiating, AttachmentProgress::Pending),
            (TransitGatewayAttachmentState::Modifying, AttachmentProgress::Pending),
        ];

        for (state, expected) in test_cases {
            // execute & validate:
            assert_eq!(expected, attachment_progress(&state), "state {}", state.as_str());
        }
    }

    #[tokio::test]
    async fn test_vpc_without_subnets_produces_no_attachment_request() {
        // setup: an SdkConfig with no credentials; any provider call issued here would error out,
        // an ineligible VPC must not trigger one.
        let aws_config = SdkConfig::builder().build();
        let logger = StdIoLogger::new();
        let metadata = vec![VpcMetadata {
            vpc_id: "vpc-1".to_string(),
            subnet_ids: vec![],
            route_table_ids: vec!["rtb-1".to_string()],
        }];

        // execute:
        let attachment_ids = create_transit_gateway_attachments(
            &aws_config,
            &logger,
            &event_details(),
            &metadata,
            "tgw-0123456789abcdef0",
        )
        .await;

        // validate:
        assert!(attachment_ids.is_empty());
    }
}
