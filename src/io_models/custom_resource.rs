use serde::Deserialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// RequestType: lifecycle action requested by the stack.
pub enum RequestType {
    Create,
    Update,
    Delete,
    /// Unknown: any request type this handler doesn't know; kept so it can be
    /// answered with a FAILED callback instead of failing deserialization.
    #[serde(other)]
    Unknown,
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                RequestType::Create => "Create",
                RequestType::Update => "Update",
                RequestType::Delete => "Delete",
                RequestType::Unknown => "Unknown",
            }
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
/// CustomResourceEvent: input envelope sent by the stack for each lifecycle event.
pub struct CustomResourceEvent {
    #[serde(rename = "RequestType")]
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    #[serde(rename = "StackId")]
    pub stack_id: String,
    #[serde(rename = "RequestId")]
    pub request_id: String,
    #[serde(rename = "LogicalResourceId")]
    pub logical_resource_id: String,
    #[serde(rename = "PhysicalResourceId", default)]
    pub physical_resource_id: Option<String>,
    #[serde(rename = "ResourceProperties")]
    pub resource_properties: ResourceProperties,
}

#[derive(Debug, Clone, Deserialize)]
/// ResourceProperties: parameters declared on the custom resource in the stack template.
pub struct ResourceProperties {
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Vpc_Tags")]
    vpc_tags: String,
    #[serde(rename = "CIDR")]
    cidr: String,
    #[serde(rename = "Transit_Gateway_Id")]
    pub transit_gateway_id: String,
}

impl ResourceProperties {
    /// Returns the VPC tag values to look up, parsed from the comma-separated
    /// `Vpc_Tags` parameter. Spaces are stripped before splitting.
    pub fn vpc_tags(&self) -> Vec<String> {
        self.vpc_tags.replace(' ', "").split(',').map(str::to_string).collect()
    }

    /// Returns the CIDR blocks to route through the gateway, parsed from the
    /// comma-separated `CIDR` parameter (e.g. `x.x.x.x/32,x.x.x.x/21`).
    pub fn cidr_blocks(&self) -> Vec<String> {
        self.cidr.split(',').map(str::to_string).collect()
    }
}
