use crate::errors::{EngineError, ErrorMessageVerbosity};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone)]
/// EngineEvent: represents an event happening in the handler.
pub enum EngineEvent {
    /// Debug: represents a debug message event.
    Debug(EventDetails, EventMessage),
    /// Info: represents an info message event.
    Info(EventDetails, EventMessage),
    /// Warning: represents a warning message event.
    Warning(EventDetails, EventMessage),
    /// Error: represents an error event.
    Error(EngineError, Option<EventMessage>),
}

impl EngineEvent {
    /// Returns event details.
    pub fn get_details(&self) -> &EventDetails {
        match self {
            EngineEvent::Debug(details, _message) => details,
            EngineEvent::Info(details, _message) => details,
            EngineEvent::Warning(details, _message) => details,
            EngineEvent::Error(engine_error, _message) => engine_error.event_details(),
        }
    }

    /// Returns event message.
    pub fn message(&self, message_verbosity: EventMessageVerbosity) -> String {
        match self {
            EngineEvent::Debug(_details, message) => message.message(message_verbosity),
            EngineEvent::Info(_details, message) => message.message(message_verbosity),
            EngineEvent::Warning(_details, message) => message.message(message_verbosity),
            EngineEvent::Error(engine_error, _message) => engine_error.message(message_verbosity.into()),
        }
    }
}

/// EventMessageVerbosity: represents event message's verbosity from minimal to full verbosity.
pub enum EventMessageVerbosity {
    SafeOnly,
    FullDetails,
}

impl From<EventMessageVerbosity> for ErrorMessageVerbosity {
    fn from(verbosity: EventMessageVerbosity) -> Self {
        match verbosity {
            EventMessageVerbosity::SafeOnly => ErrorMessageVerbosity::SafeOnly,
            EventMessageVerbosity::FullDetails => ErrorMessageVerbosity::FullDetails,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// EventMessage: represents an event message.
pub struct EventMessage {
    // Message which is known to be safe: doesn't expose any credentials nor touchy info.
    safe_message: String,
    // String containing full details, eg. the raw provider error.
    full_details: Option<String>,
}

impl EventMessage {
    /// Creates a new EventMessage.
    ///
    /// Arguments
    ///
    /// * `safe_message`: Event safe message string (from which all unsafe text has been removed).
    /// * `full_details`: Event raw message string (which may include provider error payloads).
    pub fn new(safe_message: String, full_details: Option<String>) -> Self {
        EventMessage {
            safe_message,
            full_details,
        }
    }

    /// Creates a new EventMessage from safe message.
    pub fn new_from_safe(safe_message: String) -> Self {
        EventMessage::new(safe_message, None)
    }

    /// Creates a new EventMessage from an engine error.
    pub fn new_from_engine_error(engine_error: EngineError) -> Self {
        EventMessage::new(
            engine_error.message(ErrorMessageVerbosity::SafeOnly),
            Some(engine_error.message(ErrorMessageVerbosity::FullDetails)),
        )
    }

    /// Returns message for event message based on verbosity.
    pub fn message(&self, message_verbosity: EventMessageVerbosity) -> String {
        match message_verbosity {
            EventMessageVerbosity::SafeOnly => self.safe_message.to_string(),
            EventMessageVerbosity::FullDetails => match &self.full_details {
                None => self.safe_message.to_string(),
                Some(full_details) => format!("{} / Full details: {}", self.safe_message, full_details),
            },
        }
    }
}

impl Display for EventMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // By default, expose only the safe message.
        f.write_str(self.message(EventMessageVerbosity::SafeOnly).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Stage: represents a handler event stage, can be Lifecycle or Workflow.
pub enum Stage {
    /// Lifecycle: stack lifecycle dispatch (custom resource request handling).
    Lifecycle(LifecycleStep),
    /// Workflow: attachment workflow steps running against the provider.
    Workflow(WorkflowStep),
}

impl Stage {
    /// Returns stage's sub step name.
    pub fn sub_step_name(&self) -> String {
        match &self {
            Stage::Lifecycle(step) => step.to_string(),
            Stage::Workflow(step) => step.to_string(),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                Stage::Lifecycle(_) => "lifecycle",
                Stage::Workflow(_) => "workflow",
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// LifecycleStep: represents a stack lifecycle step.
pub enum LifecycleStep {
    /// Create: stack asked for the resource to be created.
    Create,
    /// Update: stack asked for the resource to be updated.
    Update,
    /// Delete: stack asked for the resource to be deleted.
    Delete,
    /// Unsupported: stack sent a request type this handler doesn't know.
    Unsupported,
}

impl Display for LifecycleStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                LifecycleStep::Create => "create",
                LifecycleStep::Update => "update",
                LifecycleStep::Delete => "delete",
                LifecycleStep::Unsupported => "unsupported",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// WorkflowStep: represents an attachment workflow step.
pub enum WorkflowStep {
    /// EnsureServiceLinkedRole: making sure the transit gateway service-linked role exists.
    EnsureServiceLinkedRole,
    /// Discovery: looking up tagged VPCs, subnets and route tables.
    Discovery,
    /// Attachment: requesting transit gateway VPC attachments.
    Attachment,
    /// AttachmentWait: polling attachments until they become available.
    AttachmentWait,
    /// RouteUpdate: programming routes towards the transit gateway.
    RouteUpdate,
    /// Callback: reporting the result back to the stack.
    Callback,
}

impl Display for WorkflowStep {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                WorkflowStep::EnsureServiceLinkedRole => "ensure-service-linked-role",
                WorkflowStep::Discovery => "discovery",
                WorkflowStep::Attachment => "attachment",
                WorkflowStep::AttachmentWait => "attachment-wait",
                WorkflowStep::RouteUpdate => "route-update",
                WorkflowStep::Callback => "callback",
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Transmitter: represents the source triggering the event.
pub enum Transmitter {
    /// Handler: the custom resource handler itself.
    Handler,
    /// TransitGateway: a transit gateway and its identifier.
    TransitGateway(String),
    /// Vpc: a VPC and its identifier.
    Vpc(String),
    /// RouteTable: a route table and its identifier.
    RouteTable(String),
}

impl Display for Transmitter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self {
            Transmitter::Handler => write!(f, "Handler"),
            Transmitter::TransitGateway(id) => write!(f, "Transit gateway '{id}'"),
            Transmitter::Vpc(id) => write!(f, "VPC '{id}'"),
            Transmitter::RouteTable(id) => write!(f, "Route table '{id}'"),
        }
    }
}

/// Region: represents event's cloud provider region.
type Region = String;

#[derive(Debug, Clone, PartialEq, Eq)]
/// EventDetails: represents an event details, carrying stack identifiers, transmitter, stage etc.
pub struct EventDetails {
    /// region: event's region (cloud provider specific region).
    region: Option<Region>,
    /// stack_id: identifier of the stack driving this invocation.
    stack_id: String,
    /// request_id: identifier of the custom resource request.
    request_id: String,
    /// logical_resource_id: logical identifier of the custom resource within the stack.
    logical_resource_id: String,
    /// stage: stage in which this event has been triggered.
    stage: Stage,
    /// transmitter: source triggering the event.
    transmitter: Transmitter,
}

impl EventDetails {
    pub fn new(
        region: Option<Region>,
        stack_id: String,
        request_id: String,
        logical_resource_id: String,
        stage: Stage,
        transmitter: Transmitter,
    ) -> Self {
        EventDetails {
            region,
            stack_id,
            request_id,
            logical_resource_id,
            stage,
            transmitter,
        }
    }

    pub fn clone_changing_stage(event_details: EventDetails, stage: Stage) -> Self {
        let mut event_details = event_details;
        event_details.stage = stage;
        event_details
    }

    pub fn clone_changing_transmitter(event_details: EventDetails, transmitter: Transmitter) -> Self {
        let mut event_details = event_details;
        event_details.transmitter = transmitter;
        event_details
    }

    /// Returns event's region (cloud provider region).
    pub fn region(&self) -> Option<Region> {
        self.region.clone()
    }

    /// Returns event's stack identifier.
    pub fn stack_id(&self) -> &str {
        &self.stack_id
    }

    /// Returns event's request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns event's logical resource identifier.
    pub fn logical_resource_id(&self) -> &str {
        &self.logical_resource_id
    }

    /// Returns event's stage in which the event has been triggered.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Returns event's source transmitter.
    pub fn transmitter(&self) -> Transmitter {
        self.transmitter.clone()
    }
}
