//! Conversion of a described table into the inputs needed to create an
//! identical table elsewhere.

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, GlobalSecondaryIndexDescription,
    KeySchemaElement, LocalSecondaryIndex, LocalSecondaryIndexDescription, ProvisionedThroughput,
    ProvisionedThroughputDescription, StreamSpecification, TableDescription,
};
use fractic_server_error::ServerError;

use crate::errors::DynamoSchemaError;

/// Schema of a table as read from the source account. Read once and passed
/// unmodified to table creation on the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub billing_mode: BillingMode,
    /// Only set for provisioned tables; on-demand tables reject it.
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    pub global_secondary_indexes: Option<Vec<GlobalSecondaryIndex>>,
    pub local_secondary_indexes: Option<Vec<LocalSecondaryIndex>>,
    pub stream_specification: Option<StreamSpecification>,
}

impl TableSchema {
    pub fn from_description(desc: &TableDescription) -> Result<Self, ServerError> {
        if desc.key_schema().is_empty() {
            return Err(DynamoSchemaError::new("table description has no key schema"));
        }
        if desc.attribute_definitions().is_empty() {
            return Err(DynamoSchemaError::new(
                "table description has no attribute definitions",
            ));
        }

        // Tables that were never switched to on-demand may omit the summary.
        let billing_mode = desc
            .billing_mode_summary()
            .and_then(|summary| summary.billing_mode())
            .cloned()
            .unwrap_or(BillingMode::Provisioned);
        let on_demand = billing_mode == BillingMode::PayPerRequest;

        let provisioned_throughput = if on_demand {
            None
        } else {
            Some(build_throughput(desc.provisioned_throughput())?)
        };
        let global_secondary_indexes = desc
            .global_secondary_indexes()
            .iter()
            .map(|gsi| build_gsi(gsi, on_demand))
            .collect::<Result<Vec<_>, ServerError>>()?;
        let local_secondary_indexes = desc
            .local_secondary_indexes()
            .iter()
            .map(build_lsi)
            .collect::<Result<Vec<_>, ServerError>>()?;
        let stream_specification = desc
            .stream_specification()
            .filter(|spec| spec.stream_enabled())
            .cloned();

        Ok(Self {
            key_schema: desc.key_schema().to_vec(),
            attribute_definitions: desc.attribute_definitions().to_vec(),
            billing_mode,
            provisioned_throughput,
            global_secondary_indexes: non_empty(global_secondary_indexes),
            local_secondary_indexes: non_empty(local_secondary_indexes),
            stream_specification,
        })
    }
}

fn non_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

// Capacity must be at least 1 on create, even though a description can report
// 0 (e.g. for tables previously switched between billing modes).
fn build_throughput(
    desc: Option<&ProvisionedThroughputDescription>,
) -> Result<ProvisionedThroughput, ServerError> {
    let read = desc
        .and_then(|d| d.read_capacity_units())
        .unwrap_or(0)
        .max(1);
    let write = desc
        .and_then(|d| d.write_capacity_units())
        .unwrap_or(0)
        .max(1);
    ProvisionedThroughput::builder()
        .read_capacity_units(read)
        .write_capacity_units(write)
        .build()
        .map_err(|e| DynamoSchemaError::with_debug("invalid provisioned throughput", &e))
}

fn build_gsi(
    gsi: &GlobalSecondaryIndexDescription,
    on_demand: bool,
) -> Result<GlobalSecondaryIndex, ServerError> {
    let name = gsi
        .index_name()
        .ok_or_else(|| DynamoSchemaError::new("global secondary index has no name"))?;
    let provisioned_throughput = if on_demand {
        None
    } else {
        Some(build_throughput(gsi.provisioned_throughput())?)
    };
    GlobalSecondaryIndex::builder()
        .index_name(name)
        .set_key_schema(Some(gsi.key_schema().to_vec()))
        .set_projection(gsi.projection().cloned())
        .set_provisioned_throughput(provisioned_throughput)
        .build()
        .map_err(|e| DynamoSchemaError::with_debug("invalid global secondary index", &e))
}

fn build_lsi(lsi: &LocalSecondaryIndexDescription) -> Result<LocalSecondaryIndex, ServerError> {
    let name = lsi
        .index_name()
        .ok_or_else(|| DynamoSchemaError::new("local secondary index has no name"))?;
    LocalSecondaryIndex::builder()
        .index_name(name)
        .set_key_schema(Some(lsi.key_schema().to_vec()))
        .set_projection(lsi.projection().cloned())
        .build()
        .map_err(|e| DynamoSchemaError::with_debug("invalid local secondary index", &e))
}

#[cfg(test)]
pub(crate) mod tests {
    use aws_sdk_dynamodb::types::{
        BillingModeSummary, KeyType, Projection, ProjectionType, ScalarAttributeType,
        StreamViewType,
    };

    use super::*;

    pub(crate) fn key(name: &str, key_type: KeyType) -> KeySchemaElement {
        KeySchemaElement::builder()
            .attribute_name(name)
            .key_type(key_type)
            .build()
            .unwrap()
    }

    pub(crate) fn attr(name: &str) -> AttributeDefinition {
        AttributeDefinition::builder()
            .attribute_name(name)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .unwrap()
    }

    pub(crate) fn on_demand_description() -> TableDescription {
        TableDescription::builder()
            .table_name("my_table")
            .key_schema(key("pk", KeyType::Hash))
            .key_schema(key("sk", KeyType::Range))
            .attribute_definitions(attr("pk"))
            .attribute_definitions(attr("sk"))
            .attribute_definitions(attr("gsi_pk"))
            .billing_mode_summary(
                BillingModeSummary::builder()
                    .billing_mode(BillingMode::PayPerRequest)
                    .build(),
            )
            .provisioned_throughput(
                ProvisionedThroughputDescription::builder()
                    .read_capacity_units(0)
                    .write_capacity_units(0)
                    .build(),
            )
            .global_secondary_indexes(
                GlobalSecondaryIndexDescription::builder()
                    .index_name("by_gsi_pk")
                    .key_schema(key("gsi_pk", KeyType::Hash))
                    .projection(
                        Projection::builder()
                            .projection_type(ProjectionType::All)
                            .build(),
                    )
                    .provisioned_throughput(
                        ProvisionedThroughputDescription::builder()
                            .read_capacity_units(0)
                            .write_capacity_units(0)
                            .build(),
                    )
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_on_demand_schema_drops_throughput() {
        let schema = TableSchema::from_description(&on_demand_description()).unwrap();

        assert_eq!(schema.billing_mode, BillingMode::PayPerRequest);
        assert_eq!(
            schema.key_schema,
            vec![key("pk", KeyType::Hash), key("sk", KeyType::Range)]
        );
        assert_eq!(schema.attribute_definitions.len(), 3);
        assert_eq!(schema.provisioned_throughput, None);
        assert_eq!(schema.local_secondary_indexes, None);
        assert_eq!(schema.stream_specification, None);

        let gsis = schema.global_secondary_indexes.unwrap();
        assert_eq!(gsis.len(), 1);
        assert_eq!(gsis[0].index_name(), "by_gsi_pk");
        assert_eq!(gsis[0].provisioned_throughput(), None);
    }

    #[test]
    fn test_provisioned_schema_keeps_throughput() {
        let desc = TableDescription::builder()
            .key_schema(key("pk", KeyType::Hash))
            .attribute_definitions(attr("pk"))
            .attribute_definitions(attr("sk"))
            .provisioned_throughput(
                ProvisionedThroughputDescription::builder()
                    .read_capacity_units(10)
                    .write_capacity_units(0)
                    .build(),
            )
            .local_secondary_indexes(
                LocalSecondaryIndexDescription::builder()
                    .index_name("by_sk")
                    .key_schema(key("pk", KeyType::Hash))
                    .key_schema(key("sk", KeyType::Range))
                    .projection(
                        Projection::builder()
                            .projection_type(ProjectionType::KeysOnly)
                            .build(),
                    )
                    .build(),
            )
            .stream_specification(
                StreamSpecification::builder()
                    .stream_enabled(true)
                    .stream_view_type(StreamViewType::NewImage)
                    .build()
                    .unwrap(),
            )
            .build();

        let schema = TableSchema::from_description(&desc).unwrap();

        assert_eq!(schema.billing_mode, BillingMode::Provisioned);
        let throughput = schema.provisioned_throughput.unwrap();
        assert_eq!(throughput.read_capacity_units(), 10);
        // Zero capacity is clamped, since create rejects it.
        assert_eq!(throughput.write_capacity_units(), 1);
        assert_eq!(schema.local_secondary_indexes.unwrap()[0].index_name(), "by_sk");
        assert!(schema.stream_specification.unwrap().stream_enabled());
    }

    #[test]
    fn test_disabled_stream_is_not_copied() {
        let desc = TableDescription::builder()
            .key_schema(key("pk", KeyType::Hash))
            .attribute_definitions(attr("pk"))
            .stream_specification(
                StreamSpecification::builder()
                    .stream_enabled(false)
                    .build()
                    .unwrap(),
            )
            .build();

        let schema = TableSchema::from_description(&desc).unwrap();
        assert_eq!(schema.stream_specification, None);
    }

    #[test]
    fn test_missing_key_schema_is_rejected() {
        let desc = TableDescription::builder()
            .attribute_definitions(attr("pk"))
            .build();
        assert!(TableSchema::from_description(&desc).is_err());
    }
}
