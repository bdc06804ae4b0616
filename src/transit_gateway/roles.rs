use crate::errors::EngineError;
use crate::events::{EngineEvent, EventDetails, EventMessage};
use crate::logger::Logger;
use crate::services::aws::models::AwsSdkConfigIam;
use aws_sdk_iam::error::ProvideErrorMetadata;
use aws_types::SdkConfig;

pub const TRANSIT_GATEWAY_ROLE_NAME: &str = "AWSServiceRoleForVPCTransitGateway";
pub const TRANSIT_GATEWAY_SERVICE_NAME: &str = "transitgateway.amazonaws.com";

/// Error code returned by IAM when the service-linked role already exists.
const ROLE_ALREADY_EXISTS_CODE: &str = "InvalidInput";

pub struct Role {
    pub role_name: String,
    pub service_name: String,
}

impl Role {
    pub fn new(role_name: String, service_name: String) -> Self {
        Role {
            role_name,
            service_name,
        }
    }

    pub fn for_transit_gateway() -> Self {
        Role::new(TRANSIT_GATEWAY_ROLE_NAME.to_string(), TRANSIT_GATEWAY_SERVICE_NAME.to_string())
    }

    /// Checks whether the role exists on the account, following pagination markers.
    pub async fn is_exist(
        &self,
        aws_config: &SdkConfig,
        event_details: &EventDetails,
    ) -> Result<bool, Box<EngineError>> {
        let mut marker: Option<String> = None;

        loop {
            let roles = aws_config
                .list_roles(marker)
                .await
                .map_err(|e| Box::new(EngineError::new_aws_sdk_cannot_list_roles(event_details.clone(), e)))?;

            if roles.roles().iter().any(|role| role.role_name() == self.role_name) {
                return Ok(true);
            }

            if roles.is_truncated() {
                marker = roles.marker().map(str::to_string);
            } else {
                return Ok(false);
            }
        }
    }

    /// Creates the service-linked role if it doesn't exist yet. A creation racing
    /// with another invocation is treated as a success.
    pub async fn create_service_linked_role(
        &self,
        aws_config: &SdkConfig,
        logger: &dyn Logger,
        event_details: &EventDetails,
    ) -> Result<(), Box<EngineError>> {
        if self.is_exist(aws_config, event_details).await? {
            // Role already exists, nothing to do
            logger.log(EngineEvent::Info(
                event_details.clone(),
                EventMessage::new_from_safe(format!("Role '{}' already exists, nothing to do", self.role_name)),
            ));
            return Ok(());
        }

        match aws_config.create_service_linked_role(&self.service_name).await {
            Ok(_) => {
                logger.log(EngineEvent::Info(
                    event_details.clone(),
                    EventMessage::new_from_safe(format!(
                        "Created service-linked role '{}' for '{}'",
                        self.role_name, self.service_name
                    )),
                ));
                Ok(())
            }
            Err(e) if e.code() == Some(ROLE_ALREADY_EXISTS_CODE) => {
                logger.log(EngineEvent::Warning(
                    event_details.clone(),
                    EventMessage::new(
                        format!("Role '{}' was created by a concurrent invocation", self.role_name),
                        Some(e.to_string()),
                    ),
                ));
                Ok(())
            }
            Err(e) => Err(Box::new(EngineError::new_aws_sdk_cannot_create_service_linked_role(
                event_details.clone(),
                e,
                &self.service_name,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, TRANSIT_GATEWAY_ROLE_NAME, TRANSIT_GATEWAY_SERVICE_NAME};

    #[test]
    fn test_transit_gateway_role() {
        // execute:
        let role = Role::for_transit_gateway();

        // validate:
        assert_eq!(TRANSIT_GATEWAY_ROLE_NAME, role.role_name);
        assert_eq!(TRANSIT_GATEWAY_SERVICE_NAME, role.service_name);
        assert_eq!("AWSServiceRoleForVPCTransitGateway", role.role_name);
        assert_eq!("transitgateway.amazonaws.com", role.service_name);
    }
}
