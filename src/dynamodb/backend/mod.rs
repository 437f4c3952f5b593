//! The SDK-facing half of the façade.
//!
//! [`DynamoBackend`] mirrors the handful of `aws_sdk_dynamodb::Client` operations the façade
//! uses, taking already-encoded attribute maps and returning the SDK's own output types.
//! It is kept as close to the real client as possible so that everything above it can run
//! against [`MemoryBackend`] in tests.

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    operation::{
        create_table::CreateTableOutput, delete_item::DeleteItemOutput,
        delete_table::DeleteTableOutput, describe_table::DescribeTableOutput,
        get_item::GetItemOutput, list_tables::ListTablesOutput, put_item::PutItemOutput,
        scan::ScanOutput,
    },
    types::{AttributeDefinition, KeySchemaElement, ProvisionedThroughput},
};
use std::collections::HashMap;

use crate::dynamodb::{AttributeMap, Result};

mod memory;
mod sdk;

pub use memory::MemoryBackend;
pub use sdk::SdkBackend;

/// Condition attached to a PutItem request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutCondition {
    /// Write only if no item with the same key exists.
    KeyAbsent { key_attributes: Vec<String> },
}

impl PutCondition {
    /// Renders the condition as a DynamoDB condition expression with its name placeholders.
    pub fn expression(&self) -> (String, HashMap<String, String>) {
        match self {
            PutCondition::KeyAbsent { key_attributes } => {
                let mut names = HashMap::new();
                let clauses: Vec<String> = key_attributes
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let placeholder = format!("#key{i}");
                        let clause = format!("attribute_not_exists({placeholder})");
                        names.insert(placeholder, name.clone());
                        clause
                    })
                    .collect();
                (clauses.join(" AND "), names)
            }
        }
    }
}

#[async_trait]
pub trait DynamoBackend: Send + Sync {
    async fn create_table(
        &self,
        table_name: String,
        key_schema: Vec<KeySchemaElement>,
        attribute_definitions: Vec<AttributeDefinition>,
        throughput: ProvisionedThroughput,
    ) -> Result<CreateTableOutput>;

    async fn describe_table(&self, table_name: String) -> Result<DescribeTableOutput>;

    /// One page of table names, starting after `exclusive_start_table_name`.
    async fn list_tables(
        &self,
        exclusive_start_table_name: Option<String>,
    ) -> Result<ListTablesOutput>;

    async fn delete_table(&self, table_name: String) -> Result<DeleteTableOutput>;

    async fn get_item(&self, table_name: String, key: AttributeMap) -> Result<GetItemOutput>;

    async fn put_item(
        &self,
        table_name: String,
        item: AttributeMap,
        condition: Option<PutCondition>,
    ) -> Result<PutItemOutput>;

    /// Deletes and returns the old attributes, if any (`ReturnValues=ALL_OLD`).
    async fn delete_item(&self, table_name: String, key: AttributeMap)
        -> Result<DeleteItemOutput>;

    /// One page of a full-table scan, starting after `exclusive_start_key`.
    async fn scan(
        &self,
        table_name: String,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<ScanOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_absent_covers_every_key_attribute() {
        let condition = PutCondition::KeyAbsent {
            key_attributes: vec!["id".to_string(), "book_name".to_string()],
        };
        let (expression, names) = condition.expression();

        assert_eq!(
            expression,
            "attribute_not_exists(#key0) AND attribute_not_exists(#key1)"
        );
        assert_eq!(names["#key0"], "id");
        assert_eq!(names["#key1"], "book_name");
    }
}
