use crate::events::EventDetails;
use aws_sdk_ec2::error::SdkError;
use aws_sdk_ec2::operation::create_route::CreateRouteError;
use aws_sdk_ec2::operation::create_transit_gateway_vpc_attachment::CreateTransitGatewayVpcAttachmentError;
use aws_sdk_ec2::operation::describe_route_tables::DescribeRouteTablesError;
use aws_sdk_ec2::operation::describe_subnets::DescribeSubnetsError;
use aws_sdk_ec2::operation::describe_transit_gateway_vpc_attachments::DescribeTransitGatewayVpcAttachmentsError;
use aws_sdk_ec2::operation::describe_vpcs::DescribeVpcsError;
use aws_sdk_iam::operation::create_service_linked_role::CreateServiceLinkedRoleError;
use aws_sdk_iam::operation::list_roles::ListRolesError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// ErrorMessageVerbosity: represents error message's verbosity from minimal to full verbosity.
pub enum ErrorMessageVerbosity {
    SafeOnly,
    FullDetails,
}

/// CommandError: low level error, mostly wrapping a raw provider error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct CommandError {
    /// full_details: full error message, can contain the raw provider error payload.
    full_details: Option<String>,
    /// message_safe: error message omitting any protected data.
    message_safe: String,
}

impl CommandError {
    /// Returns CommandError message_raw. May contain the raw provider error payload.
    pub fn message_raw(&self) -> Option<String> {
        self.full_details.clone()
    }

    /// Returns CommandError message_safe.
    pub fn message_safe(&self) -> String {
        self.message_safe.to_string()
    }

    /// Returns error message based on verbosity.
    pub fn message(&self, message_verbosity: ErrorMessageVerbosity) -> String {
        match message_verbosity {
            ErrorMessageVerbosity::SafeOnly => self.message_safe.to_string(),
            ErrorMessageVerbosity::FullDetails => match &self.full_details {
                None => self.message(ErrorMessageVerbosity::SafeOnly),
                Some(full_details) => format!("{} / Full details: {}", self.message_safe, full_details),
            },
        }
    }

    /// Creates a new CommandError from safe message. To be used when message is safe.
    pub fn new_from_safe_message(message: String) -> Self {
        CommandError::new(message, None)
    }

    /// Creates a new CommandError having both a safe and a raw message.
    pub fn new(message_safe: String, message_raw: Option<String>) -> Self {
        CommandError {
            full_details: message_raw,
            message_safe,
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // By default, expose safe message only.
        f.write_str(self.message(ErrorMessageVerbosity::SafeOnly).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Tag: unique identifier for an engine error.
pub enum Tag {
    /// UnsupportedRequestType: the stack sent a lifecycle request type this handler doesn't know.
    UnsupportedRequestType,
    /// AwsSdkCannotDescribeVpcs: AWS SDK cannot describe VPCs.
    AwsSdkCannotDescribeVpcs,
    /// AwsSdkCannotDescribeSubnets: AWS SDK cannot describe subnets.
    AwsSdkCannotDescribeSubnets,
    /// AwsSdkCannotDescribeRouteTables: AWS SDK cannot describe route tables.
    AwsSdkCannotDescribeRouteTables,
    /// AwsSdkCannotCreateRoute: AWS SDK cannot create a route.
    AwsSdkCannotCreateRoute,
    /// RouteAlreadyExists: a route for the destination already exists in the route table.
    RouteAlreadyExists,
    /// AwsSdkCannotCreateTransitGatewayVpcAttachment: AWS SDK cannot create the transit gateway VPC attachment.
    AwsSdkCannotCreateTransitGatewayVpcAttachment,
    /// AwsSdkCannotDescribeTransitGatewayVpcAttachments: AWS SDK cannot describe transit gateway VPC attachments.
    AwsSdkCannotDescribeTransitGatewayVpcAttachments,
    /// TransitGatewayAttachmentsNotReady: attachments didn't reach the available state in time.
    TransitGatewayAttachmentsNotReady,
    /// AwsSdkCannotListRoles: AWS SDK cannot list IAM roles.
    AwsSdkCannotListRoles,
    /// AwsSdkCannotCreateServiceLinkedRole: AWS SDK cannot create the service-linked role.
    AwsSdkCannotCreateServiceLinkedRole,
    /// CannotSendCallback: the stack callback couldn't be delivered.
    CannotSendCallback,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// EngineError: represents an engine error, carrying its tag, context and underlying cause.
pub struct EngineError {
    /// tag: error unique identifier.
    tag: Tag,
    /// event_details: error event details.
    event_details: EventDetails,
    /// user_log_message: message targeted toward the operator, describing the error.
    user_log_message: String,
    /// underlying_error: raw error causing this one.
    underlying_error: Option<CommandError>,
}

impl EngineError {
    /// Returns error's unique identifier.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Returns error's event details.
    pub fn event_details(&self) -> &EventDetails {
        &self.event_details
    }

    /// Returns error's underlying cause.
    pub fn underlying_error(&self) -> Option<CommandError> {
        self.underlying_error.clone()
    }

    /// Returns error message based on verbosity.
    pub fn message(&self, message_verbosity: ErrorMessageVerbosity) -> String {
        match &self.underlying_error {
            Some(underlying_error) => match message_verbosity {
                ErrorMessageVerbosity::SafeOnly => self.user_log_message.to_string(),
                ErrorMessageVerbosity::FullDetails => {
                    format!("{} / {}", self.user_log_message, underlying_error.message(message_verbosity))
                }
            },
            None => self.user_log_message.to_string(),
        }
    }

    fn new(
        tag: Tag,
        event_details: EventDetails,
        user_log_message: String,
        underlying_error: Option<CommandError>,
    ) -> Self {
        EngineError {
            tag,
            event_details,
            user_log_message,
            underlying_error,
        }
    }

    /// Creates a new error for an unsupported lifecycle request type.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `request_type`: Raw request type received from the stack.
    pub fn new_unsupported_request_type(event_details: EventDetails, request_type: &str) -> EngineError {
        let message = format!("Request type `{request_type}` is not supported by this handler.");
        EngineError::new(Tag::UnsupportedRequestType, event_details, message, None)
    }

    /// Creates a new error when AWS SDK cannot describe VPCs.
    pub fn new_aws_sdk_cannot_describe_vpcs(
        event_details: EventDetails,
        raw_error: SdkError<DescribeVpcsError>,
    ) -> EngineError {
        let message = "Error while trying to describe VPCs.".to_string();
        EngineError::new(
            Tag::AwsSdkCannotDescribeVpcs,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }

    /// Creates a new error when AWS SDK cannot describe a VPC's subnets.
    pub fn new_aws_sdk_cannot_describe_subnets(
        event_details: EventDetails,
        raw_error: SdkError<DescribeSubnetsError>,
        vpc_id: &str,
    ) -> EngineError {
        let message = format!("Error while trying to describe subnets of VPC `{vpc_id}`.");
        EngineError::new(
            Tag::AwsSdkCannotDescribeSubnets,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }

    /// Creates a new error when AWS SDK cannot describe a VPC's route tables.
    pub fn new_aws_sdk_cannot_describe_route_tables(
        event_details: EventDetails,
        raw_error: SdkError<DescribeRouteTablesError>,
        vpc_id: &str,
    ) -> EngineError {
        let message = format!("Error while trying to describe route tables of VPC `{vpc_id}`.");
        EngineError::new(
            Tag::AwsSdkCannotDescribeRouteTables,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }

    /// Creates a new error when AWS SDK cannot create a route.
    pub fn new_aws_sdk_cannot_create_route(
        event_details: EventDetails,
        raw_error: SdkError<CreateRouteError>,
        route_table_id: &str,
        destination: &str,
    ) -> EngineError {
        let message = format!("Error while trying to create route to `{destination}` in route table `{route_table_id}`.");
        EngineError::new(
            Tag::AwsSdkCannotCreateRoute,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }

    /// Creates a new error for a route which already exists in the route table.
    pub fn new_route_already_exists(
        event_details: EventDetails,
        route_table_id: &str,
        destination: &str,
    ) -> EngineError {
        let message = format!("A route to `{destination}` already exists in route table `{route_table_id}`.");
        EngineError::new(Tag::RouteAlreadyExists, event_details, message, None)
    }

    /// Creates a new error when AWS SDK cannot create the transit gateway VPC attachment.
    pub fn new_aws_sdk_cannot_create_transit_gateway_vpc_attachment(
        event_details: EventDetails,
        raw_error: SdkError<CreateTransitGatewayVpcAttachmentError>,
        vpc_id: &str,
    ) -> EngineError {
        let message = format!("Error while trying to create transit gateway attachment for VPC `{vpc_id}`.");
        EngineError::new(
            Tag::AwsSdkCannotCreateTransitGatewayVpcAttachment,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }

    /// Creates a new error when AWS SDK cannot describe transit gateway VPC attachments.
    pub fn new_aws_sdk_cannot_describe_transit_gateway_vpc_attachments(
        event_details: EventDetails,
        raw_error: SdkError<DescribeTransitGatewayVpcAttachmentsError>,
    ) -> EngineError {
        let message = "Error while trying to describe transit gateway attachments.".to_string();
        EngineError::new(
            Tag::AwsSdkCannotDescribeTransitGatewayVpcAttachments,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }

    /// Creates a new error when transit gateway attachments didn't become available in time.
    ///
    /// Arguments:
    ///
    /// * `event_details`: Error linked event details.
    /// * `pending_attachment_ids`: Attachments still not available.
    /// * `timeout_secs`: How long the handler waited.
    pub fn new_transit_gateway_attachments_not_ready(
        event_details: EventDetails,
        pending_attachment_ids: &[String],
        timeout_secs: u64,
    ) -> EngineError {
        let message = format!(
            "Transit gateway attachments [{}] didn't reach the available state within {timeout_secs} seconds.",
            pending_attachment_ids.join(", ")
        );
        EngineError::new(Tag::TransitGatewayAttachmentsNotReady, event_details, message, None)
    }

    /// Creates a new error when AWS SDK cannot list IAM roles.
    pub fn new_aws_sdk_cannot_list_roles(
        event_details: EventDetails,
        raw_error: SdkError<ListRolesError>,
    ) -> EngineError {
        let message = "Error while trying to list IAM roles.".to_string();
        EngineError::new(
            Tag::AwsSdkCannotListRoles,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }

    /// Creates a new error when AWS SDK cannot create the service-linked role.
    pub fn new_aws_sdk_cannot_create_service_linked_role(
        event_details: EventDetails,
        raw_error: SdkError<CreateServiceLinkedRoleError>,
        service_name: &str,
    ) -> EngineError {
        let message = format!("Error while trying to create service-linked role for `{service_name}`.");
        EngineError::new(
            Tag::AwsSdkCannotCreateServiceLinkedRole,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }

    /// Creates a new error when the stack callback couldn't be delivered.
    pub fn new_cannot_send_callback(event_details: EventDetails, raw_error: reqwest::Error) -> EngineError {
        let message = "Error while trying to send the response back to the stack.".to_string();
        EngineError::new(
            Tag::CannotSendCallback,
            event_details,
            message.clone(),
            Some(CommandError::new(message, Some(raw_error.to_string()))),
        )
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // By default, expose safe message only.
        f.write_str(self.message(ErrorMessageVerbosity::SafeOnly).as_str())
    }
}
