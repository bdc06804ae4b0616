pub mod attachment;
pub mod discovery;
pub mod roles;
pub mod routes;

use crate::cloudformation::{self, CustomResourceResponse, ResponseStatus};
use crate::errors::EngineError;
use crate::events::{EngineEvent, EventDetails, EventMessage, LifecycleStep, Stage, Transmitter, WorkflowStep};
use crate::io_models::custom_resource::{CustomResourceEvent, RequestType};
use crate::logger::Logger;
use aws_types::region::Region;

pub fn lifecycle_step(request_type: &RequestType) -> LifecycleStep {
    match request_type {
        RequestType::Create => LifecycleStep::Create,
        RequestType::Update => LifecycleStep::Update,
        RequestType::Delete => LifecycleStep::Delete,
        RequestType::Unknown => LifecycleStep::Unsupported,
    }
}

/// Entry point of the handler: performs the lifecycle action and always
/// terminates by sending exactly one callback to the stack, so the stack
/// operation is never left hanging.
pub async fn handle_request(event: &CustomResourceEvent, log_stream_name: &str, logger: &dyn Logger) {
    let event_details = EventDetails::new(
        Some(event.resource_properties.region.clone()),
        event.stack_id.clone(),
        event.request_id.clone(),
        event.logical_resource_id.clone(),
        Stage::Lifecycle(lifecycle_step(&event.request_type)),
        Transmitter::Handler,
    );

    logger.log(EngineEvent::Info(
        event_details.clone(),
        EventMessage::new_from_safe(format!(
            "Received {} request for stack '{}'",
            event.request_type, event.stack_id
        )),
    ));

    let status = match event.request_type {
        RequestType::Create | RequestType::Update => {
            match run_create_or_update(event, logger, &event_details).await {
                Ok(()) => ResponseStatus::Success,
                Err(e) => {
                    logger.log(EngineEvent::Error(*e, None));
                    ResponseStatus::Failed
                }
            }
        }
        RequestType::Delete => {
            // attachments and routes created earlier are left in place on purpose
            logger.log(EngineEvent::Info(
                event_details.clone(),
                EventMessage::new_from_safe("Delete request acknowledged, no resource is removed".to_string()),
            ));
            ResponseStatus::Success
        }
        RequestType::Unknown => {
            logger.log(EngineEvent::Error(
                EngineError::new_unsupported_request_type(
                    event_details.clone(),
                    &event.request_type.to_string(),
                ),
                None,
            ));
            ResponseStatus::Failed
        }
    };

    let callback_details = EventDetails::clone_changing_stage(event_details, Stage::Workflow(WorkflowStep::Callback));
    let response = CustomResourceResponse::new(status, event, log_stream_name);
    cloudformation::send_response(logger, &callback_details, &event.response_url, response).await;
}

/// Runs the attachment workflow: ensure the service-linked role, discover
/// tagged VPCs, request attachments, wait for them, then program routes.
/// Discovery errors are fatal; per-VPC and per-table failures are logged and
/// the remaining resources carry on.
async fn run_create_or_update(
    event: &CustomResourceEvent,
    logger: &dyn Logger,
    event_details: &EventDetails,
) -> Result<(), Box<EngineError>> {
    let properties = &event.resource_properties;

    logger.log(EngineEvent::Info(
        event_details.clone(),
        EventMessage::new_from_safe(format!(
            "Attaching VPCs tagged {:?} to transit gateway '{}' on account '{}' in region '{}'",
            properties.vpc_tags(),
            properties.transit_gateway_id,
            properties.account,
            properties.region
        )),
    ));

    let aws_config = aws_config::from_env()
        .region(Region::new(properties.region.clone()))
        .load()
        .await;

    let role_details = EventDetails::clone_changing_stage(
        event_details.clone(),
        Stage::Workflow(WorkflowStep::EnsureServiceLinkedRole),
    );
    roles::Role::for_transit_gateway()
        .create_service_linked_role(&aws_config, logger, &role_details)
        .await?;

    let discovery_details =
        EventDetails::clone_changing_stage(event_details.clone(), Stage::Workflow(WorkflowStep::Discovery));
    let vpc_metadata =
        discovery::discover_vpc_metadata(&aws_config, logger, &discovery_details, &properties.vpc_tags()).await?;

    let attachment_details = EventDetails::clone_changing_transmitter(
        EventDetails::clone_changing_stage(event_details.clone(), Stage::Workflow(WorkflowStep::Attachment)),
        Transmitter::TransitGateway(properties.transit_gateway_id.clone()),
    );
    let attachment_ids = attachment::create_transit_gateway_attachments(
        &aws_config,
        logger,
        &attachment_details,
        &vpc_metadata,
        &properties.transit_gateway_id,
    )
    .await;

    let wait_details = EventDetails::clone_changing_transmitter(
        EventDetails::clone_changing_stage(event_details.clone(), Stage::Workflow(WorkflowStep::AttachmentWait)),
        Transmitter::TransitGateway(properties.transit_gateway_id.clone()),
    );
    attachment::wait_for_attachments_available(&aws_config, logger, &wait_details, &attachment_ids).await;

    let route_details =
        EventDetails::clone_changing_stage(event_details.clone(), Stage::Workflow(WorkflowStep::RouteUpdate));
    routes::create_vpc_routes_to_transit_gateway(
        &aws_config,
        logger,
        &route_details,
        &vpc_metadata,
        &properties.transit_gateway_id,
        &properties.cidr_blocks(),
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{handle_request, lifecycle_step};
    use crate::cloudformation::tests::{capture_one_request, sample_event};
    use crate::events::LifecycleStep;
    use crate::io_models::custom_resource::RequestType;
    use crate::logger::StdIoLogger;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[test]
    fn test_lifecycle_step_mapping() {
        // execute & validate:
        assert_eq!(LifecycleStep::Create, lifecycle_step(&RequestType::Create));
        assert_eq!(LifecycleStep::Update, lifecycle_step(&RequestType::Update));
        assert_eq!(LifecycleStep::Delete, lifecycle_step(&RequestType::Delete));
        assert_eq!(LifecycleStep::Unsupported, lifecycle_step(&RequestType::Unknown));
    }

    #[tokio::test]
    async fn test_delete_request_sends_success_without_provider_calls() {
        // setup:
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("cannot bind");
        let address = listener.local_addr().expect("no local address");
        let capture = tokio::spawn(capture_one_request(listener));

        let response_url = format!("http://{address}/signed");
        let event = sample_event("Delete", &response_url);
        let logger = StdIoLogger::new();

        // execute: the delete path goes straight to the callback, no SDK
        // configuration is even loaded
        handle_request(&event, "log-stream", &logger).await;

        // validate:
        let raw_request = tokio::time::timeout(Duration::from_secs(5), capture)
            .await
            .expect("callback not received")
            .expect("capture task failed");
        assert!(raw_request.starts_with("PUT /signed"));
        assert!(raw_request.contains("\"Status\":\"SUCCESS\""));
    }

    #[tokio::test]
    async fn test_unknown_request_type_sends_failed_without_provider_calls() {
        // setup:
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("cannot bind");
        let address = listener.local_addr().expect("no local address");
        let capture = tokio::spawn(capture_one_request(listener));

        let response_url = format!("http://{address}/signed");
        let event = sample_event("Upsert", &response_url);
        let logger = StdIoLogger::new();

        // execute:
        handle_request(&event, "log-stream", &logger).await;

        // validate:
        let raw_request = tokio::time::timeout(Duration::from_secs(5), capture)
            .await
            .expect("callback not received")
            .expect("capture task failed");
        assert!(raw_request.contains("\"Status\":\"FAILED\""));
    }
}
