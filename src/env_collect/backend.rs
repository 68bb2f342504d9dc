use async_trait::async_trait;
use aws_sdk_cloudformation::{
    error::SdkError,
    operation::list_stack_resources::{ListStackResourcesError, ListStackResourcesOutput},
    types::StackResourceSummary,
};
use aws_sdk_lambda::operation::get_function_configuration::{
    GetFunctionConfigurationError, GetFunctionConfigurationOutput,
};
use mockall::automock;

use crate::config::AwsTarget;

/// Resource entry of a stack, as listed by CloudFormation.
#[derive(Debug, Clone, PartialEq)]
pub struct StackResource {
    pub logical_id: String,
    pub resource_type: String,
    /// Not set for resources that failed to create or are being deleted.
    pub physical_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackResourcePage {
    pub resources: Vec<StackResource>,
    pub next_token: Option<String>,
}

// Underlying backend, which performs the actual AWS operations. Kept generic so
// that it can be swapped with a mock backend for testing.
//
// Should be kept as minimal and close as possible to the real CloudFormation
// and Lambda clients, to minimize untestable code.
#[automock]
#[async_trait]
pub trait StackBackend: Send + Sync {
    /// One page of the stack's resources, starting at `next_token`.
    async fn list_stack_resources(
        &self,
        stack_name: String,
        next_token: Option<String>,
    ) -> Result<StackResourcePage, SdkError<ListStackResourcesError>>;

    async fn get_function_configuration(
        &self,
        function_name: String,
    ) -> Result<GetFunctionConfigurationOutput, SdkError<GetFunctionConfigurationError>>;
}

// Real implementation,
// making actual calls to AWS.
// --------------------------------------------------

pub struct AwsStackBackend {
    cloudformation: aws_sdk_cloudformation::Client,
    lambda: aws_sdk_lambda::Client,
}

impl AwsStackBackend {
    pub async fn new(target: &AwsTarget) -> Self {
        let shared_config = target.load_sdk_config().await;
        Self {
            cloudformation: aws_sdk_cloudformation::Client::new(&shared_config),
            lambda: aws_sdk_lambda::Client::new(&shared_config),
        }
    }
}

#[async_trait]
impl StackBackend for AwsStackBackend {
    async fn list_stack_resources(
        &self,
        stack_name: String,
        next_token: Option<String>,
    ) -> Result<StackResourcePage, SdkError<ListStackResourcesError>> {
        self.cloudformation
            .list_stack_resources()
            .set_stack_name(Some(stack_name))
            .set_next_token(next_token)
            .send()
            .await
            .map(page_from_output)
    }

    async fn get_function_configuration(
        &self,
        function_name: String,
    ) -> Result<GetFunctionConfigurationOutput, SdkError<GetFunctionConfigurationError>> {
        self.lambda
            .get_function_configuration()
            .set_function_name(Some(function_name))
            .send()
            .await
    }
}

fn page_from_output(output: ListStackResourcesOutput) -> StackResourcePage {
    StackResourcePage {
        resources: output
            .stack_resource_summaries()
            .iter()
            .map(resource_from_summary)
            .collect(),
        next_token: output.next_token().map(str::to_string),
    }
}

fn resource_from_summary(summary: &StackResourceSummary) -> StackResource {
    StackResource {
        logical_id: summary
            .logical_resource_id()
            .unwrap_or_default()
            .to_string(),
        resource_type: summary.resource_type().unwrap_or_default().to_string(),
        physical_id: summary.physical_resource_id().map(str::to_string),
    }
}
