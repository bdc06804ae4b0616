use crate::errors::EngineError;
use crate::events::{EngineEvent, EventDetails, EventMessage};
use crate::io_models::custom_resource::CustomResourceEvent;
use crate::logger::Logger;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
/// ResponseStatus: outcome reported back to the stack.
pub enum ResponseStatus {
    Success,
    Failed,
}

impl Display for ResponseStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                ResponseStatus::Success => "SUCCESS",
                ResponseStatus::Failed => "FAILED",
            }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
/// CustomResourceResponse: fixed-shape status document the stack expects on its
/// pre-signed URL.
pub struct CustomResourceResponse {
    #[serde(rename = "Status")]
    pub status: ResponseStatus,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "PhysicalResourceId")]
    pub physical_resource_id: String,
    #[serde(rename = "StackId")]
    pub stack_id: String,
    #[serde(rename = "RequestId")]
    pub request_id: String,
    #[serde(rename = "LogicalResourceId")]
    pub logical_resource_id: String,
    #[serde(rename = "NoEcho")]
    pub no_echo: bool,
    #[serde(rename = "Data")]
    pub data: serde_json::Value,
}

impl CustomResourceResponse {
    pub fn new(status: ResponseStatus, event: &CustomResourceEvent, log_stream_name: &str) -> Self {
        CustomResourceResponse {
            status,
            reason: format!("See the details in CloudWatch Log Stream: {log_stream_name}"),
            physical_resource_id: log_stream_name.to_string(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Sends the response document to the stack's pre-signed URL. The endpoint
/// mandates an empty `content-type` and an explicit `content-length`. Delivery
/// failures are logged only: there is nowhere else to report them, the stack
/// operation will time out on its own.
pub async fn send_response(
    logger: &dyn Logger,
    event_details: &EventDetails,
    response_url: &str,
    response: CustomResourceResponse,
) {
    let body = match serde_json::to_string(&response) {
        Ok(body) => body,
        Err(e) => {
            logger.log(EngineEvent::Warning(
                event_details.clone(),
                EventMessage::new("Cannot serialize the stack response".to_string(), Some(e.to_string())),
            ));
            return;
        }
    };

    let request = reqwest::Client::new()
        .put(response_url)
        .header(reqwest::header::CONTENT_TYPE, "")
        .header(reqwest::header::CONTENT_LENGTH, body.len().to_string())
        .body(body);

    match request.send().await {
        Ok(delivery) => {
            logger.log(EngineEvent::Info(
                event_details.clone(),
                EventMessage::new_from_safe(format!(
                    "Stack response '{}' delivered, endpoint answered with status {}",
                    response.status,
                    delivery.status()
                )),
            ));
        }
        Err(e) => {
            logger.log(EngineEvent::Warning(
                event_details.clone(),
                EventMessage::new_from_engine_error(EngineError::new_cannot_send_callback(event_details.clone(), e)),
            ));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{send_response, CustomResourceResponse, ResponseStatus};
    use crate::events::{EventDetails, Stage, Transmitter, WorkflowStep};
    use crate::io_models::custom_resource::CustomResourceEvent;
    use crate::logger::StdIoLogger;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    pub(crate) fn sample_event(request_type: &str, response_url: &str) -> CustomResourceEvent {
        serde_json::from_value(serde_json::json!({
            "RequestType": request_type,
            "ResponseURL": response_url,
            "StackId": "arn:aws:cloudformation:eu-west-3:123456789012:stack/network/guid",
            "RequestId": "11111111-2222-3333-4444-555555555555",
            "LogicalResourceId": "TransitGatewayAttachment",
            "ResourceProperties": {
                "Account": "123456789012",
                "Region": "eu-west-3",
                "Vpc_Tags": "shared-services",
                "CIDR": "10.0.0.0/16,192.168.1.0/24",
                "Transit_Gateway_Id": "tgw-0123456789abcdef0"
            }
        }))
        .expect("cannot parse event")
    }

    /// Accepts one connection and returns the raw request bytes up to the end of
    /// the body, answering 200.
    pub(crate) async fn capture_one_request(listener: TcpListener) -> String {
        let (mut socket, _) = listener.accept().await.expect("no connection received");
        let mut captured: Vec<u8> = Vec::new();
        let mut buffer = [0u8; 4096];

        loop {
            let read = socket.read(&mut buffer).await.expect("cannot read request");
            if read == 0 {
                break;
            }
            captured.extend_from_slice(&buffer[..read]);

            let raw = String::from_utf8_lossy(&captured);
            if let Some(headers_end) = raw.find("\r\n\r\n") {
                let content_length = raw
                    .lines()
                    .find(|line| line.to_lowercase().starts_with("content-length:"))
                    .and_then(|line| line.split(':').nth(1))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if captured.len() >= headers_end + 4 + content_length {
                    break;
                }
            }
        }

        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
            .await
            .expect("cannot answer request");

        String::from_utf8_lossy(&captured).to_string()
    }

    #[test]
    fn test_response_document_shape() {
        // setup:
        let event = sample_event("Create", "https://cloudformation-custom-resource-response.s3.amazonaws.com/signed");

        // execute:
        let response = CustomResourceResponse::new(ResponseStatus::Success, &event, "2026/08/06/[$LATEST]abcdef");
        let document = serde_json::to_value(&response).expect("cannot serialize response");

        // validate: member names are mandated by the callback protocol
        let members = document.as_object().expect("not an object");
        let mut keys: Vec<&String> = members.keys().collect();
        keys.sort();
        assert_eq!(
            vec!["Data", "LogicalResourceId", "NoEcho", "PhysicalResourceId", "Reason", "RequestId", "StackId", "Status"],
            keys
        );
        assert_eq!("SUCCESS", document["Status"]);
        assert_eq!("FAILED", serde_json::to_value(ResponseStatus::Failed).expect("cannot serialize status"));
        assert_eq!(false, document["NoEcho"]);
        assert_eq!(serde_json::json!({}), document["Data"]);
        assert_eq!("2026/08/06/[$LATEST]abcdef", document["PhysicalResourceId"]);
        assert!(document["Reason"].as_str().expect("no reason").contains("CloudWatch Log Stream"));
    }

    #[tokio::test]
    async fn test_send_response_uses_put_with_empty_content_type() {
        // setup:
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("cannot bind");
        let address = listener.local_addr().expect("no local address");
        let capture = tokio::spawn(capture_one_request(listener));

        let response_url = format!("http://{address}/signed");
        let event = sample_event("Create", &response_url);
        let response = CustomResourceResponse::new(ResponseStatus::Success, &event, "log-stream");
        let event_details = EventDetails::new(
            Some("eu-west-3".to_string()),
            event.stack_id.clone(),
            event.request_id.clone(),
            event.logical_resource_id.clone(),
            Stage::Workflow(WorkflowStep::Callback),
            Transmitter::Handler,
        );
        let logger = StdIoLogger::new();

        // execute:
        send_response(&logger, &event_details, &response_url, response).await;

        // validate:
        let raw_request = tokio::time::timeout(Duration::from_secs(5), capture)
            .await
            .expect("callback not received")
            .expect("capture task failed");
        assert!(raw_request.starts_with("PUT /signed HTTP/1.1\r\n"));
        assert!(raw_request.contains("content-type: \r\n") || raw_request.contains("content-type:\r\n"));
        assert!(raw_request.contains("\"Status\":\"SUCCESS\""));
        assert!(raw_request.contains("\"NoEcho\":false"));
    }

    #[tokio::test]
    async fn test_send_response_delivery_failure_is_swallowed() {
        // setup: nothing listens on this port
        let event = sample_event("Create", "http://127.0.0.1:9/signed");
        let response = CustomResourceResponse::new(ResponseStatus::Failed, &event, "log-stream");
        let event_details = EventDetails::new(
            None,
            event.stack_id.clone(),
            event.request_id.clone(),
            event.logical_resource_id.clone(),
            Stage::Workflow(WorkflowStep::Callback),
            Transmitter::Handler,
        );
        let logger = StdIoLogger::new();

        // execute & validate: no panic, no error surfaced
        send_response(&logger, &event_details, "http://127.0.0.1:9/signed", response).await;
    }
}
