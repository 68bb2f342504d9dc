//! Copies a DynamoDB table's schema and a bounded sample of its items from a
//! source account into a local DynamoDB-compatible instance.

use std::{collections::HashMap, sync::Arc};

use aws_sdk_dynamodb::{
    operation::describe_table::DescribeTableError,
    types::{AttributeValue, TableDescription},
};
use backend::DynamoBackend;
use chunk_helpers::{chunked, write_chunk_size};
use fractic_server_error::ServerError;
use schema::TableSchema;
use tracing::{debug, info, warn};

use crate::{
    config::ReplicateArgs,
    errors::{DynamoCalloutError, DynamoSourceTableMissing},
};

pub mod backend;
pub mod chunk_helpers;
pub mod schema;

pub type DynamoMap = HashMap<String, AttributeValue>;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    pub batches: usize,
    /// Items sent in batch-write requests. Drives the limit check.
    pub items_written: usize,
    /// Items the service returned as unprocessed (not stored, not retried).
    pub items_unprocessed: usize,
}

impl ImportSummary {
    /// Items actually stored by the destination.
    pub fn items_accepted(&self) -> usize {
        self.items_written.saturating_sub(self.items_unprocessed)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplicationReport {
    pub created_local_table: bool,
    pub items_scanned: usize,
    pub import: ImportSummary,
}

/// Fetches the description of `table`, or `None` if the service reports that
/// it does not exist. Any other failure is returned as an error.
pub async fn table_description(
    backend: &dyn DynamoBackend,
    table: &str,
) -> Result<Option<TableDescription>, ServerError> {
    match backend.describe_table(table.to_string()).await {
        Ok(response) => Ok(response.table),
        Err(e) => match e.into_service_error() {
            DescribeTableError::ResourceNotFoundException(_) => Ok(None),
            other => Err(DynamoCalloutError::with_debug(&other)),
        },
    }
}

#[derive(Clone)]
pub struct DynamoReplicator {
    pub source: Arc<dyn DynamoBackend>,
    pub destination: Arc<dyn DynamoBackend>,
}

impl DynamoReplicator {
    pub async fn new(args: &ReplicateArgs) -> Self {
        let source = backend::connect(&args.remote_target()).await;
        let destination = backend::connect(&args.local_target()).await;
        Self {
            source: Arc::new(source),
            destination: Arc::new(destination),
        }
    }

    /// Runs the full pipeline: check the source table, create the destination
    /// table if needed, scan the source and import up to `limit` items (0 =
    /// no limit).
    pub async fn replicate(
        &self,
        table: &str,
        limit: usize,
    ) -> Result<ReplicationReport, ServerError> {
        let mut report = ReplicationReport::default();

        let source_description = table_description(self.source.as_ref(), table)
            .await?
            .ok_or_else(|| DynamoSourceTableMissing::new(table))?;
        info!(table, "found source table");

        match table_description(self.destination.as_ref(), table).await? {
            Some(_) => info!(table, "local table already exists"),
            None => {
                info!(table, "local table does not exist, creating it");
                let schema = TableSchema::from_description(&source_description)?;
                self.destination
                    .create_table(table.to_string(), schema)
                    .await
                    .map_err(|e| DynamoCalloutError::with_debug(&e))?;
                report.created_local_table = true;
            }
        }

        let items = self
            .source
            .scan(table.to_string())
            .await
            .map_err(|e| DynamoCalloutError::with_debug(&e))?
            .items
            .unwrap_or_default();
        report.items_scanned = items.len();
        if items.is_empty() {
            info!(table, "source table is empty, nothing to import");
            return Ok(report);
        }
        info!(table, items = items.len(), "scanned source table");

        report.import = self.import_items(table, &items, limit).await?;
        info!(
            table,
            batches = report.import.batches,
            items = report.import.items_written,
            accepted = report.import.items_accepted(),
            "import complete"
        );
        Ok(report)
    }

    /// Writes `items` to the destination in batch-write sized chunks, in scan
    /// order, until at least `limit` items have been written (0 = all).
    ///
    /// Chunks are always written in full, so the number of items written can
    /// exceed `limit` by up to one chunk minus one item.
    pub async fn import_items(
        &self,
        table: &str,
        items: &[DynamoMap],
        limit: usize,
    ) -> Result<ImportSummary, ServerError> {
        let mut summary = ImportSummary::default();
        for chunk in chunked(items, write_chunk_size(limit))? {
            let response = self
                .destination
                .batch_put_item(table.to_string(), chunk.to_vec())
                .await
                .map_err(|e| DynamoCalloutError::with_debug(&e))?;
            summary.batches += 1;
            summary.items_written += chunk.len();
            debug!(
                batch = summary.batches,
                written = summary.items_written,
                "wrote batch"
            );

            // Not retried.
            let unprocessed: usize = response
                .unprocessed_items
                .unwrap_or_default()
                .values()
                .map(Vec::len)
                .sum();
            summary.items_unprocessed += unprocessed;
            if unprocessed > 0 {
                warn!(
                    batch = summary.batches,
                    unprocessed, "batch write left items unprocessed"
                );
            }

            if limit > 0 && summary.items_written >= limit {
                break;
            }
        }
        Ok(summary)
    }
}

pub async fn run(args: ReplicateArgs) -> Result<ReplicationReport, ServerError> {
    info!(
        table = %args.table_name,
        region = %args.region,
        local_endpoint = %args.local_endpoint,
        limit = args.limit,
        "replicating table"
    );
    DynamoReplicator::new(&args)
        .await
        .replicate(&args.table_name, args.limit)
        .await
}
