use crate::errors::EngineError;
use crate::events::{EngineEvent, EventDetails, EventMessage, Transmitter};
use crate::logger::Logger;
use crate::services::aws::models::AwsSdkConfigEc2;
use aws_sdk_ec2::types::{Subnet, Vpc};
use aws_types::SdkConfig;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
/// VpcMetadata: a discovered VPC with the subnets and route tables selected for attachment.
/// Built fresh on every invocation, never persisted.
pub struct VpcMetadata {
    pub vpc_id: String,
    /// At most one subnet per availability zone, in provider order.
    pub subnet_ids: Vec<String>,
    pub route_table_ids: Vec<String>,
}

impl VpcMetadata {
    pub fn has_attachment_subnets(&self) -> bool {
        !self.subnet_ids.is_empty()
    }
}

/// Looks up VPCs carrying one of the requested tag values, then collects their
/// attachment-tagged subnets and non-main route tables. One VPC lookup is issued
/// per tag value; a VPC matching several tag values is only reported once.
pub async fn discover_vpc_metadata(
    aws_config: &SdkConfig,
    logger: &dyn Logger,
    event_details: &EventDetails,
    vpc_tags: &[String],
) -> Result<Vec<VpcMetadata>, Box<EngineError>> {
    let mut discovered: Vec<VpcMetadata> = Vec::new();
    let mut seen_vpcs: HashSet<String> = HashSet::new();

    for tag in vpc_tags {
        let vpcs = aws_config
            .describe_vpcs()
            .await
            .map_err(|e| Box::new(EngineError::new_aws_sdk_cannot_describe_vpcs(event_details.clone(), e)))?;

        for vpc_id in vpc_ids_matching_tag_value(vpcs.vpcs(), tag) {
            if !seen_vpcs.insert(vpc_id.clone()) {
                continue;
            }

            logger.log(EngineEvent::Info(
                EventDetails::clone_changing_transmitter(event_details.clone(), Transmitter::Vpc(vpc_id.clone())),
                EventMessage::new_from_safe(format!("VPC '{vpc_id}' matches tag value '{tag}'")),
            ));

            let subnets = aws_config.describe_attachment_subnets(vpc_id.clone()).await.map_err(|e| {
                Box::new(EngineError::new_aws_sdk_cannot_describe_subnets(event_details.clone(), e, &vpc_id))
            })?;
            let subnet_ids = select_one_subnet_per_zone(subnets.subnets());

            let route_tables = aws_config.describe_attachment_route_tables(vpc_id.clone()).await.map_err(|e| {
                Box::new(EngineError::new_aws_sdk_cannot_describe_route_tables(event_details.clone(), e, &vpc_id))
            })?;
            let route_table_ids = route_tables
                .route_tables()
                .iter()
                .filter_map(|route_table| route_table.route_table_id().map(str::to_string))
                .collect();

            discovered.push(VpcMetadata {
                vpc_id,
                subnet_ids,
                route_table_ids,
            });
        }
    }

    Ok(discovered)
}

/// Returns ids of VPCs carrying at least one tag whose value equals `tag_value`,
/// without duplicates, in provider order.
pub fn vpc_ids_matching_tag_value(vpcs: &[Vpc], tag_value: &str) -> Vec<String> {
    let mut matching: Vec<String> = Vec::new();
    for vpc in vpcs {
        let Some(vpc_id) = vpc.vpc_id() else { continue };
        if vpc.tags().iter().any(|tag| tag.value() == Some(tag_value)) && !matching.iter().any(|id| id == vpc_id) {
            matching.push(vpc_id.to_string());
        }
    }
    matching
}

/// Keeps the first subnet seen in each availability zone.
pub fn select_one_subnet_per_zone(subnets: &[Subnet]) -> Vec<String> {
    let mut seen_zones: HashSet<String> = HashSet::new();
    let mut selected: Vec<String> = Vec::new();
    for subnet in subnets {
        if let (Some(zone), Some(subnet_id)) = (subnet.availability_zone(), subnet.subnet_id()) {
            if seen_zones.insert(zone.to_string()) {
                selected.push(subnet_id.to_string());
            }
        }
    }
    selected
}
