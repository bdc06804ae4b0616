use crate::errors::EngineError;
use crate::events::{EngineEvent, EventDetails, EventMessage, Transmitter};
use crate::logger::Logger;
use crate::services::aws::models::AwsSdkConfigEc2;
use crate::transit_gateway::discovery::VpcMetadata;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_types::SdkConfig;
use std::collections::HashSet;

/// Error code returned by EC2 when a route for the destination already exists.
const ROUTE_ALREADY_EXISTS_CODE: &str = "RouteAlreadyExists";

/// Returns the `(route table, destination)` pairs to create, one per CIDR block
/// per route table, in parameter order.
pub fn plan_routes(route_table_ids: &[String], cidr_blocks: &[String]) -> Vec<(String, String)> {
    let mut plan: Vec<(String, String)> = Vec::new();
    for route_table_id in route_table_ids {
        for block in cidr_blocks {
            plan.push((route_table_id.clone(), block.clone()));
        }
    }
    plan
}

/// Programs one route per CIDR block into every route table of the attached
/// VPCs, targeting the transit gateway. Routes are only ever added: a
/// destination conflict is logged and aborts the remaining routes of that
/// table, other tables and VPCs carry on.
pub async fn create_vpc_routes_to_transit_gateway(
    aws_config: &SdkConfig,
    logger: &dyn Logger,
    event_details: &EventDetails,
    vpc_metadata: &[VpcMetadata],
    transit_gateway_id: &str,
    cidr_blocks: &[String],
) {
    for entry in vpc_metadata {
        if !entry.has_attachment_subnets() {
            continue;
        }

        let mut aborted_tables: HashSet<String> = HashSet::new();

        for (route_table_id, block) in plan_routes(&entry.route_table_ids, cidr_blocks) {
            if aborted_tables.contains(&route_table_id) {
                continue;
            }

            let table_details = EventDetails::clone_changing_transmitter(
                event_details.clone(),
                Transmitter::RouteTable(route_table_id.clone()),
            );

            match aws_config
                .create_route(route_table_id.clone(), block.clone(), transit_gateway_id.to_string())
                .await
            {
                Ok(_) => {
                    logger.log(EngineEvent::Info(
                        table_details,
                        EventMessage::new_from_safe(format!(
                            "Created route to '{block}' for '{route_table_id}' with a destination of '{transit_gateway_id}'"
                        )),
                    ));
                }
                Err(e) if e.code() == Some(ROUTE_ALREADY_EXISTS_CODE) => {
                    logger.log(EngineEvent::Warning(
                        table_details,
                        EventMessage::new_from_engine_error(EngineError::new_route_already_exists(
                            event_details.clone(),
                            &route_table_id,
                            &block,
                        )),
                    ));
                    aborted_tables.insert(route_table_id);
                }
                Err(e) => {
                    logger.log(EngineEvent::Warning(
                        table_details,
                        EventMessage::new_from_engine_error(EngineError::new_aws_sdk_cannot_create_route(
                            event_details.clone(),
                            e,
                            &route_table_id,
                            &block,
                        )),
                    ));
                    aborted_tables.insert(route_table_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::plan_routes;

    #[test]
    fn test_plan_routes_one_route_per_cidr_per_table() {
        // setup:
        let route_table_ids = vec!["rtb-1".to_string(), "rtb-2".to_string()];
        let cidr_blocks = vec!["10.0.0.0/16".to_string(), "192.168.1.0/24".to_string()];

        // execute:
        let plan = plan_routes(&route_table_ids, &cidr_blocks);

        // validate: exactly 2 creations per table, one per block, in order
        assert_eq!(
            vec![
                ("rtb-1".to_string(), "10.0.0.0/16".to_string()),
                ("rtb-1".to_string(), "192.168.1.0/24".to_string()),
                ("rtb-2".to_string(), "10.0.0.0/16".to_string()),
                ("rtb-2".to_string(), "192.168.1.0/24".to_string()),
            ],
            plan
        );
        for route_table_id in &route_table_ids {
            assert_eq!(2, plan.iter().filter(|(table, _)| table == route_table_id).count());
        }
    }

    #[test]
    fn test_plan_routes_without_tables_or_blocks() {
        // execute & validate:
        assert!(plan_routes(&[], &["10.0.0.0/16".to_string()]).is_empty());
        assert!(plan_routes(&["rtb-1".to_string()], &[]).is_empty());
    }
}
