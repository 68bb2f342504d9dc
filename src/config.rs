use std::path::PathBuf;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use clap::Parser;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_ITEM_LIMIT: usize = 500;

/// Copy a DynamoDB table's schema and a sample of its items into a local
/// DynamoDB instance.
#[derive(Parser, Debug, Clone)]
#[command(name = "dynamo-replicate")]
#[command(about = "Copy a DynamoDB table's schema and items into a local DynamoDB instance")]
pub struct ReplicateArgs {
    /// Name of the table to replicate (same name is used locally).
    #[arg(short = 't', long)]
    pub table_name: String,

    /// Region of the source table.
    #[arg(short = 'r', long, env = "DYNAMO_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Endpoint override for the source table.
    #[arg(long)]
    pub remote_endpoint: Option<String>,

    /// Endpoint of the local DynamoDB instance.
    #[arg(short = 'e', long, default_value = DEFAULT_LOCAL_ENDPOINT)]
    pub local_endpoint: String,

    /// Maximum number of items to copy (0 copies everything scanned).
    #[arg(short = 'l', long, default_value_t = DEFAULT_ITEM_LIMIT)]
    pub limit: usize,
}

impl ReplicateArgs {
    pub fn remote_target(&self) -> AwsTarget {
        AwsTarget {
            region: Some(self.region.clone()),
            endpoint: self.remote_endpoint.clone(),
        }
    }

    pub fn local_target(&self) -> AwsTarget {
        AwsTarget {
            region: Some(self.region.clone()),
            endpoint: Some(self.local_endpoint.clone()),
        }
    }
}

/// Collect the environment variables of every Lambda function in a
/// CloudFormation stack, including nested stacks.
#[derive(Parser, Debug, Clone)]
#[command(name = "lambda-env-collect")]
#[command(about = "Collect Lambda environment variables across a CloudFormation stack")]
pub struct CollectEnvArgs {
    /// Name (or ID) of the root stack.
    pub stack_name: String,

    /// Optional JSON file to write the merged variables to (overwritten).
    pub output_file_path: Option<PathBuf>,
}

/// Where an AWS client should point. A missing region falls back to the
/// default provider chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwsTarget {
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

impl AwsTarget {
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::v2025_01_17());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        loader.load().await
    }
}
