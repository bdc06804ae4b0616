use async_trait::async_trait;
use aws_sdk_ec2::error::SdkError;
use aws_sdk_ec2::operation::create_route::{CreateRouteError, CreateRouteOutput};
use aws_sdk_ec2::operation::create_transit_gateway_vpc_attachment::{
    CreateTransitGatewayVpcAttachmentError, CreateTransitGatewayVpcAttachmentOutput,
};
use aws_sdk_ec2::operation::describe_route_tables::{DescribeRouteTablesError, DescribeRouteTablesOutput};
use aws_sdk_ec2::operation::describe_subnets::{DescribeSubnetsError, DescribeSubnetsOutput};
use aws_sdk_ec2::operation::describe_transit_gateway_vpc_attachments::{
    DescribeTransitGatewayVpcAttachmentsError, DescribeTransitGatewayVpcAttachmentsOutput,
};
use aws_sdk_ec2::operation::describe_vpcs::{DescribeVpcsError, DescribeVpcsOutput};
use aws_sdk_ec2::types::Filter;
use aws_sdk_iam::operation::create_service_linked_role::{CreateServiceLinkedRoleError, CreateServiceLinkedRoleOutput};
use aws_sdk_iam::operation::list_roles::{ListRolesError, ListRolesOutput};
use aws_types::SdkConfig;

/// Tag put on subnets and route tables to mark them as attachment targets.
pub const ATTACHMENT_TAG_KEY: &str = "tgw-attach";
pub const ATTACHMENT_TAG_VALUE: &str = "True";

#[async_trait]
pub trait AwsSdkConfigEc2 {
    async fn describe_vpcs(&self) -> Result<DescribeVpcsOutput, SdkError<DescribeVpcsError>>;
    async fn describe_attachment_subnets(
        &self,
        vpc_id: String,
    ) -> Result<DescribeSubnetsOutput, SdkError<DescribeSubnetsError>>;
    async fn describe_attachment_route_tables(
        &self,
        vpc_id: String,
    ) -> Result<DescribeRouteTablesOutput, SdkError<DescribeRouteTablesError>>;
    async fn create_route(
        &self,
        route_table_id: String,
        destination_cidr_block: String,
        transit_gateway_id: String,
    ) -> Result<CreateRouteOutput, SdkError<CreateRouteError>>;
    async fn create_transit_gateway_vpc_attachment(
        &self,
        transit_gateway_id: String,
        vpc_id: String,
        subnet_ids: Vec<String>,
    ) -> Result<CreateTransitGatewayVpcAttachmentOutput, SdkError<CreateTransitGatewayVpcAttachmentError>>;
    async fn describe_transit_gateway_vpc_attachments(
        &self,
        transit_gateway_attachment_ids: Vec<String>,
    ) -> Result<DescribeTransitGatewayVpcAttachmentsOutput, SdkError<DescribeTransitGatewayVpcAttachmentsError>>;
}

#[async_trait]
impl AwsSdkConfigEc2 for SdkConfig {
    async fn describe_vpcs(&self) -> Result<DescribeVpcsOutput, SdkError<DescribeVpcsError>> {
        let client = aws_sdk_ec2::Client::new(self);
        client.describe_vpcs().send().await
    }

    async fn describe_attachment_subnets(
        &self,
        vpc_id: String,
    ) -> Result<DescribeSubnetsOutput, SdkError<DescribeSubnetsError>> {
        let client = aws_sdk_ec2::Client::new(self);
        client
            .describe_subnets()
            .filters(Filter::builder().name("vpc-id".to_string()).values(vpc_id).build())
            .filters(
                Filter::builder()
                    .name(format!("tag:{ATTACHMENT_TAG_KEY}"))
                    .values(ATTACHMENT_TAG_VALUE.to_string())
                    .build(),
            )
            .send()
            .await
    }

    async fn describe_attachment_route_tables(
        &self,
        vpc_id: String,
    ) -> Result<DescribeRouteTablesOutput, SdkError<DescribeRouteTablesError>> {
        let client = aws_sdk_ec2::Client::new(self);
        client
            .describe_route_tables()
            .filters(Filter::builder().name("vpc-id".to_string()).values(vpc_id).build())
            .filters(
                Filter::builder()
                    .name("association.main".to_string())
                    .values("false".to_string())
                    .build(),
            )
            .filters(
                Filter::builder()
                    .name(format!("tag:{ATTACHMENT_TAG_KEY}"))
                    .values(ATTACHMENT_TAG_VALUE.to_string())
                    .build(),
            )
            .send()
            .await
    }

    async fn create_route(
        &self,
        route_table_id: String,
        destination_cidr_block: String,
        transit_gateway_id: String,
    ) -> Result<CreateRouteOutput, SdkError<CreateRouteError>> {
        let client = aws_sdk_ec2::Client::new(self);
        client
            .create_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination_cidr_block)
            .transit_gateway_id(transit_gateway_id)
            .send()
            .await
    }

    async fn create_transit_gateway_vpc_attachment(
        &self,
        transit_gateway_id: String,
        vpc_id: String,
        subnet_ids: Vec<String>,
    ) -> Result<CreateTransitGatewayVpcAttachmentOutput, SdkError<CreateTransitGatewayVpcAttachmentError>> {
        let client = aws_sdk_ec2::Client::new(self);
        client
            .create_transit_gateway_vpc_attachment()
            .transit_gateway_id(transit_gateway_id)
            .vpc_id(vpc_id)
            .set_subnet_ids(Some(subnet_ids))
            .send()
            .await
    }

    async fn describe_transit_gateway_vpc_attachments(
        &self,
        transit_gateway_attachment_ids: Vec<String>,
    ) -> Result<DescribeTransitGatewayVpcAttachmentsOutput, SdkError<DescribeTransitGatewayVpcAttachmentsError>> {
        let client = aws_sdk_ec2::Client::new(self);
        client
            .describe_transit_gateway_vpc_attachments()
            .set_transit_gateway_attachment_ids(Some(transit_gateway_attachment_ids))
            .send()
            .await
    }
}

#[async_trait]
pub trait AwsSdkConfigIam {
    async fn list_roles(&self, marker: Option<String>) -> Result<ListRolesOutput, SdkError<ListRolesError>>;

    async fn create_service_linked_role(
        &self,
        service_name: &str,
    ) -> Result<CreateServiceLinkedRoleOutput, SdkError<CreateServiceLinkedRoleError>>;
}

#[async_trait]
impl AwsSdkConfigIam for SdkConfig {
    async fn list_roles(&self, marker: Option<String>) -> Result<ListRolesOutput, SdkError<ListRolesError>> {
        let client = aws_sdk_iam::Client::new(self);
        client.list_roles().set_marker(marker).send().await
    }

    async fn create_service_linked_role(
        &self,
        service_name: &str,
    ) -> Result<CreateServiceLinkedRoleOutput, SdkError<CreateServiceLinkedRoleError>> {
        let client = aws_sdk_iam::Client::new(self);
        client
            .create_service_linked_role()
            .aws_service_name(service_name)
            .send()
            .await
    }
}
