use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::SdkError,
    operation::{
        batch_write_item::{BatchWriteItemError, BatchWriteItemOutput},
        create_table::{CreateTableError, CreateTableOutput},
        describe_table::{DescribeTableError, DescribeTableOutput},
        scan::{ScanError, ScanOutput},
    },
    types::{AttributeValue, PutRequest, WriteRequest},
};
use fractic_core::collection;
use mockall::automock;

use crate::config::AwsTarget;

use super::schema::TableSchema;

// Underlying backend, which performs the actual AWS operations. Kept generic so
// that it can be swapped with a mock backend for testing.
//
// Should be kept as minimal and close as possible to the real
// aws_sdk_dynamodb::Client, to minimize untestable code.
#[automock]
#[async_trait]
pub trait DynamoBackend: Send + Sync {
    async fn describe_table(
        &self,
        table_name: String,
    ) -> Result<DescribeTableOutput, SdkError<DescribeTableError>>;

    async fn create_table(
        &self,
        table_name: String,
        schema: TableSchema,
    ) -> Result<CreateTableOutput, SdkError<CreateTableError>>;

    /// Single scan request. Items beyond the first page are not fetched.
    async fn scan(&self, table_name: String) -> Result<ScanOutput, SdkError<ScanError>>;

    async fn batch_put_item(
        &self,
        table_name: String,
        items: Vec<HashMap<String, AttributeValue>>,
    ) -> Result<BatchWriteItemOutput, SdkError<BatchWriteItemError>>;
}

// Real implementation,
// making actual calls to AWS.
// --------------------------------------------------

pub async fn connect(target: &AwsTarget) -> aws_sdk_dynamodb::Client {
    let shared_config = target.load_sdk_config().await;
    aws_sdk_dynamodb::Client::new(&shared_config)
}

#[async_trait]
impl DynamoBackend for aws_sdk_dynamodb::Client {
    async fn describe_table(
        &self,
        table_name: String,
    ) -> Result<DescribeTableOutput, SdkError<DescribeTableError>> {
        self.describe_table()
            .set_table_name(Some(table_name))
            .send()
            .await
    }

    async fn create_table(
        &self,
        table_name: String,
        schema: TableSchema,
    ) -> Result<CreateTableOutput, SdkError<CreateTableError>> {
        self.create_table()
            .set_table_name(Some(table_name))
            .set_key_schema(Some(schema.key_schema))
            .set_attribute_definitions(Some(schema.attribute_definitions))
            .set_billing_mode(Some(schema.billing_mode))
            .set_provisioned_throughput(schema.provisioned_throughput)
            .set_global_secondary_indexes(schema.global_secondary_indexes)
            .set_local_secondary_indexes(schema.local_secondary_indexes)
            .set_stream_specification(schema.stream_specification)
            .send()
            .await
    }

    async fn scan(&self, table_name: String) -> Result<ScanOutput, SdkError<ScanError>> {
        self.scan().set_table_name(Some(table_name)).send().await
    }

    async fn batch_put_item(
        &self,
        table_name: String,
        items: Vec<HashMap<String, AttributeValue>>,
    ) -> Result<BatchWriteItemOutput, SdkError<BatchWriteItemError>> {
        self.batch_write_item()
            .set_request_items(Some(collection!(
                table_name => items
                    .into_iter()
                    .map(|item|
                        WriteRequest::builder()
                            .put_request(PutRequest::builder()
                            .set_item(Some(item))
                            .build()
                            .expect("Invalid PutRequest"))
                            .build()
                    )
                    .collect()
            )))
            .send()
            .await
    }
}
