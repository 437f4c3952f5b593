//! Convenience wrapper around the AWS DynamoDB SDK: table lifecycle and single-item
//! CRUD as plain method calls, with native values instead of tagged attribute maps.

pub mod dynamodb;

pub use dynamodb::{
    AttributeMap, BlockingDynamoCrud, CrudConfig, DynamoBackend, DynamoCrud, Error, ErrorKind,
    Item, KeyAttribute, KeyKind, KeySchema, MemoryBackend, Number, PutCondition, Result,
    SdkBackend, TableInfo, TableSpec, Throughput, Value, WaitPolicy,
};
