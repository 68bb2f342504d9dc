use fractic_server_error::{define_client_error, define_internal_error, define_user_error};

// DynamoDB replication.
define_user_error!(
    DynamoSourceTableMissing,
    "Table '{table}' does not exist in the source account. Create it there \
     before replicating.",
    { table: &str }
);
define_internal_error!(DynamoCalloutError, "Generic DynamoDB error.");
define_internal_error!(
    DynamoSchemaError,
    "Could not derive table schema: {details}.",
    { details: &str }
);
define_client_error!(
    InvalidChunkSize,
    "Invalid chunk size: {details}.",
    { details: &str }
);

// Lambda environment collection.
define_internal_error!(CloudFormationCalloutError, "Generic CloudFormation error.");
define_internal_error!(LambdaCalloutError, "Generic Lambda error.");
define_client_error!(
    InvalidNestedStackId,
    "Invalid nested stack physical ID: {details}.",
    { details: &str }
);
define_internal_error!(
    EnvOutputError,
    "Could not write environment parameters: {details}.",
    { details: &str }
);
