use aws_sdk_dynamodb::types::{ProvisionedThroughput, TableDescription, TableStatus};

use crate::dynamodb::{Error, KeyAttribute, KeySchema, Result};

/// Provisioned read/write capacity units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub read: i64,
    pub write: i64,
}

impl Default for Throughput {
    fn default() -> Self {
        Self { read: 5, write: 5 }
    }
}

impl Throughput {
    pub(crate) fn to_sdk(self) -> Result<ProvisionedThroughput> {
        if self.read < 1 || self.write < 1 {
            return Err(Error::Validation(format!(
                "capacity units must be positive, got read={} write={}",
                self.read, self.write
            )));
        }
        ProvisionedThroughput::builder()
            .read_capacity_units(self.read)
            .write_capacity_units(self.write)
            .build()
            .map_err(|e| Error::Validation(format!("invalid provisioned throughput: {e}")))
    }
}

/// DynamoDB table configuration used to create a table.
///
/// # Table Structure
///
/// - **Table Name**: A unique identifier for the table within your AWS account and region.
/// - **Primary Key**: Consists of a partition key and an optional sort key.
///   - **Partition Key**: Determines the partition where the item is stored.
///   - **Sort Key**: Optional. Used to sort items with the same partition key.
/// - **Capacity**: Tables are created in provisioned mode, 5 read and 5 write units unless
///   overridden.
///
/// # Example
///
/// ```
/// use dynamo_crud::{KeyAttribute, TableSpec};
///
/// let table = TableSpec::new("user_messages", KeyAttribute::string("user_id"))
///     .with_sort_key(KeyAttribute::number("timestamp"))
///     .with_capacity(10, 2);
/// assert_eq!(table.name(), "user_messages");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    name: String,
    key_schema: KeySchema,
    throughput: Throughput,
}

impl TableSpec {
    pub fn new(name: impl Into<String>, partition_key: KeyAttribute) -> Self {
        Self {
            name: name.into(),
            key_schema: KeySchema::new(partition_key, None),
            throughput: Throughput::default(),
        }
    }

    pub fn with_sort_key(mut self, sort_key: KeyAttribute) -> Self {
        self.key_schema = KeySchema::new(self.key_schema.partition_key().clone(), Some(sort_key));
        self
    }

    pub fn with_capacity(mut self, read: i64, write: i64) -> Self {
        self.throughput = Throughput { read, write };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_schema(&self) -> &KeySchema {
        &self.key_schema
    }

    pub fn throughput(&self) -> Throughput {
        self.throughput
    }
}

/// Table metadata as reported by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub status: Option<TableStatus>,
    pub key_schema: KeySchema,
    /// Approximate; DynamoDB refreshes it roughly every six hours.
    pub item_count: Option<i64>,
    pub throughput: Option<Throughput>,
    pub arn: Option<String>,
}

impl TableInfo {
    pub fn is_active(&self) -> bool {
        self.status == Some(TableStatus::Active)
    }
}

impl TryFrom<&TableDescription> for TableInfo {
    type Error = Error;

    fn try_from(description: &TableDescription) -> Result<Self> {
        let name = description
            .table_name()
            .ok_or_else(|| Error::MalformedResponse("table description has no name".to_string()))?
            .to_string();

        let throughput = description
            .provisioned_throughput()
            .and_then(|pt| match (pt.read_capacity_units(), pt.write_capacity_units()) {
                (Some(read), Some(write)) => Some(Throughput { read, write }),
                _ => None,
            });

        Ok(Self {
            name,
            status: description.table_status().cloned(),
            key_schema: KeySchema::from_description(description)?,
            item_count: description.item_count(),
            throughput,
            arn: description.table_arn().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_defaults_to_five_units() {
        let spec = TableSpec::new("t", KeyAttribute::string("pk"));
        assert_eq!(spec.throughput(), Throughput { read: 5, write: 5 });
        assert!(spec.key_schema().sort_key().is_none());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = Throughput { read: 0, write: 5 }.to_sdk().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
