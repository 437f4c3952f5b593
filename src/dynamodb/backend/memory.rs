use async_trait::async_trait;
use aws_sdk_dynamodb::{
    operation::{
        create_table::CreateTableOutput, delete_item::DeleteItemOutput,
        delete_table::DeleteTableOutput, describe_table::DescribeTableOutput,
        get_item::GetItemOutput, list_tables::ListTablesOutput, put_item::PutItemOutput,
        scan::ScanOutput,
    },
    types::{
        AttributeDefinition, AttributeValue, KeySchemaElement, ProvisionedThroughput,
        ProvisionedThroughputDescription, ScalarAttributeType, TableDescription, TableStatus,
    },
};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DynamoBackend, PutCondition};
use crate::dynamodb::{AttributeMap, Error, Result};

const SCAN_PAGE_SIZE: usize = 1000;
const LIST_PAGE_SIZE: usize = 100;

/// In-process stand-in for DynamoDB.
///
/// Tables live in a mutex-guarded map; items are ordered by their typed key parts so
/// scans page deterministically. Paging, key validation, conditional writes and error codes
/// follow the service closely enough to exercise the façade without a network.
#[derive(Debug)]
pub struct MemoryBackend {
    tables: Mutex<BTreeMap<String, MemoryTable>>,
    scan_page_size: usize,
    list_page_size: usize,
}

#[derive(Debug)]
struct MemoryTable {
    name: String,
    key_schema: Vec<KeySchemaElement>,
    attribute_definitions: Vec<AttributeDefinition>,
    throughput: ProvisionedThroughput,
    items: BTreeMap<StoredKey, AttributeMap>,
}

/// One key attribute as the service compares it. Numbers hold their canonical form so
/// `1`, `1.0` and `01` name the same item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum KeyPart {
    String(String),
    Number(String),
    Binary(Vec<u8>),
}

type StoredKey = Vec<KeyPart>;

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_page_sizes(SCAN_PAGE_SIZE, LIST_PAGE_SIZE)
    }

    /// Items per Scan page and names per ListTables page.
    pub fn with_page_sizes(scan_page_size: usize, list_page_size: usize) -> Self {
        Self {
            tables: Mutex::new(BTreeMap::new()),
            scan_page_size: scan_page_size.max(1),
            list_page_size: list_page_size.max(1),
        }
    }

    fn tables(&self) -> MutexGuard<'_, BTreeMap<String, MemoryTable>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryTable {
    fn describe(&self, status: TableStatus) -> TableDescription {
        TableDescription::builder()
            .table_name(&self.name)
            .table_arn(format!(
                "arn:aws:dynamodb:local:000000000000:table/{}",
                self.name
            ))
            .table_status(status)
            .set_key_schema(Some(self.key_schema.clone()))
            .set_attribute_definitions(Some(self.attribute_definitions.clone()))
            .provisioned_throughput(
                ProvisionedThroughputDescription::builder()
                    .read_capacity_units(self.throughput.read_capacity_units())
                    .write_capacity_units(self.throughput.write_capacity_units())
                    .build(),
            )
            .item_count(self.items.len() as i64)
            .build()
    }

    fn key_names(&self) -> impl Iterator<Item = &str> {
        self.key_schema.iter().map(KeySchemaElement::attribute_name)
    }

    /// Extracts the key of `attributes` as an ordered map key.
    ///
    /// With `exact`, `attributes` must hold nothing but the key (get, delete, scan cursors).
    fn encode_key(&self, attributes: &AttributeMap, exact: bool) -> Result<StoredKey> {
        if exact && attributes.len() != self.key_schema.len() {
            return Err(Error::Validation(
                "The provided key element does not match the schema".to_string(),
            ));
        }

        let mut encoded = Vec::with_capacity(self.key_schema.len());
        for name in self.key_names() {
            let value = attributes.get(name).ok_or_else(|| {
                Error::Validation(format!(
                    "One or more parameter values were invalid: Missing the key {name} in the item"
                ))
            })?;

            let expected = self
                .attribute_definitions
                .iter()
                .find(|definition| definition.attribute_name() == name)
                .map(AttributeDefinition::attribute_type);

            let part = match (expected, value) {
                (Some(ScalarAttributeType::S), AttributeValue::S(s)) => {
                    KeyPart::String(s.clone())
                }
                (Some(ScalarAttributeType::N), AttributeValue::N(n)) => {
                    KeyPart::Number(canonical_number(n).ok_or_else(|| {
                        Error::Validation(format!(
                            "The parameter cannot be converted to a numeric value: {n}"
                        ))
                    })?)
                }
                (Some(ScalarAttributeType::B), AttributeValue::B(b)) => {
                    KeyPart::Binary(b.as_ref().to_vec())
                }
                _ => {
                    return Err(Error::Validation(format!(
                        "One or more parameter values were invalid: Type mismatch for key {name}"
                    )))
                }
            };
            encoded.push(part);
        }

        Ok(encoded)
    }

    fn key_of(&self, item: &AttributeMap) -> AttributeMap {
        self.key_names()
            .filter_map(|name| item.get(name).map(|v| (name.to_string(), v.clone())))
            .collect()
    }
}

fn validate_table_name(name: &str) -> Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if (3..=255).contains(&name.len()) && valid_chars {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "1 validation error detected: Value '{name}' at 'tableName' failed to satisfy constraint"
        )))
    }
}

fn not_found(table: &str) -> Error {
    Error::TableNotFound {
        table: table.to_string(),
    }
}

#[async_trait]
impl DynamoBackend for MemoryBackend {
    async fn create_table(
        &self,
        table_name: String,
        key_schema: Vec<KeySchemaElement>,
        attribute_definitions: Vec<AttributeDefinition>,
        throughput: ProvisionedThroughput,
    ) -> Result<CreateTableOutput> {
        validate_table_name(&table_name)?;

        let mut tables = self.tables();
        if tables.contains_key(&table_name) {
            return Err(Error::TableInUse { table: table_name });
        }

        let table = MemoryTable {
            name: table_name.clone(),
            key_schema,
            attribute_definitions,
            throughput,
            items: BTreeMap::new(),
        };
        let description = table.describe(TableStatus::Creating);
        tables.insert(table_name, table);

        Ok(CreateTableOutput::builder()
            .table_description(description)
            .build())
    }

    async fn describe_table(&self, table_name: String) -> Result<DescribeTableOutput> {
        let tables = self.tables();
        let table = tables.get(&table_name).ok_or_else(|| not_found(&table_name))?;

        Ok(DescribeTableOutput::builder()
            .table(table.describe(TableStatus::Active))
            .build())
    }

    async fn list_tables(
        &self,
        exclusive_start_table_name: Option<String>,
    ) -> Result<ListTablesOutput> {
        let tables = self.tables();
        let start = match &exclusive_start_table_name {
            Some(name) => Bound::Excluded(name.clone()),
            None => Bound::Unbounded,
        };

        let mut remaining = tables.range((start, Bound::Unbounded)).map(|(name, _)| name);
        let page: Vec<String> = remaining
            .by_ref()
            .take(self.list_page_size)
            .cloned()
            .collect();
        let last_evaluated = match remaining.next() {
            Some(_) => page.last().cloned(),
            None => None,
        };

        Ok(ListTablesOutput::builder()
            .set_table_names(Some(page))
            .set_last_evaluated_table_name(last_evaluated)
            .build())
    }

    async fn delete_table(&self, table_name: String) -> Result<DeleteTableOutput> {
        let table = self
            .tables()
            .remove(&table_name)
            .ok_or_else(|| not_found(&table_name))?;

        Ok(DeleteTableOutput::builder()
            .table_description(table.describe(TableStatus::Deleting))
            .build())
    }

    async fn get_item(&self, table_name: String, key: AttributeMap) -> Result<GetItemOutput> {
        let tables = self.tables();
        let table = tables.get(&table_name).ok_or_else(|| not_found(&table_name))?;
        let encoded = table.encode_key(&key, true)?;

        Ok(GetItemOutput::builder()
            .set_item(table.items.get(&encoded).cloned())
            .build())
    }

    async fn put_item(
        &self,
        table_name: String,
        item: AttributeMap,
        condition: Option<PutCondition>,
    ) -> Result<PutItemOutput> {
        let mut tables = self.tables();
        let table = tables
            .get_mut(&table_name)
            .ok_or_else(|| not_found(&table_name))?;
        let encoded = table.encode_key(&item, false)?;

        if let Some(PutCondition::KeyAbsent { .. }) = condition {
            if table.items.contains_key(&encoded) {
                return Err(Error::ItemExists { table: table_name });
            }
        }

        table.items.insert(encoded, item);
        Ok(PutItemOutput::builder().build())
    }

    async fn delete_item(
        &self,
        table_name: String,
        key: AttributeMap,
    ) -> Result<DeleteItemOutput> {
        let mut tables = self.tables();
        let table = tables
            .get_mut(&table_name)
            .ok_or_else(|| not_found(&table_name))?;
        let encoded = table.encode_key(&key, true)?;

        Ok(DeleteItemOutput::builder()
            .set_attributes(table.items.remove(&encoded))
            .build())
    }

    async fn scan(
        &self,
        table_name: String,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<ScanOutput> {
        let tables = self.tables();
        let table = tables.get(&table_name).ok_or_else(|| not_found(&table_name))?;

        let start = match &exclusive_start_key {
            Some(key) => Bound::Excluded(table.encode_key(key, true)?),
            None => Bound::Unbounded,
        };

        let mut remaining = table.items.range((start, Bound::Unbounded)).map(|(_, v)| v);
        let page: Vec<AttributeMap> = remaining
            .by_ref()
            .take(self.scan_page_size)
            .cloned()
            .collect();
        let last_evaluated_key = match remaining.next() {
            Some(_) => page.last().map(|item| table.key_of(item)),
            None => None,
        };
        let count = page.len() as i32;

        Ok(ScanOutput::builder()
            .set_items(Some(page))
            .count(count)
            .scanned_count(count)
            .set_last_evaluated_key(last_evaluated_key)
            .build())
    }
}

/// Reduces decimal text to `[-]<significant digits>e<scale>`, where the value is
/// `0.<digits> * 10^scale`. Zero of any sign or spelling becomes `0`.
fn canonical_number(text: &str) -> Option<String> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (mantissa, exponent) = match unsigned.find(|c| c == 'e' || c == 'E') {
        Some(at) => (&unsigned[..at], unsigned[at + 1..].parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{whole}{fraction}");
    let trimmed = digits.trim_start_matches('0');
    let significant = trimmed.trim_end_matches('0');
    if significant.is_empty() {
        return Some("0".to_string());
    }

    let leading_zeros = (digits.len() - trimmed.len()) as i64;
    let scale = whole.len() as i64 + exponent - leading_zeros;
    let sign = if negative { "-" } else { "" };
    Some(format!("{sign}{significant}e{scale}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_numbers_share_a_canonical_form() {
        for spelling in ["1", "1.0", "01", "1.000", "0.1e1", "10E-1", "+1"] {
            assert_eq!(canonical_number(spelling).as_deref(), Some("1e1"), "{spelling}");
        }
        assert_eq!(canonical_number("-0.00").as_deref(), Some("0"));
        assert_eq!(canonical_number("0e9").as_deref(), Some("0"));
        assert_eq!(canonical_number("0.05").as_deref(), Some("5e-1"));
        assert_eq!(canonical_number("-250").as_deref(), Some("-25e3"));
        assert_ne!(canonical_number("1"), canonical_number("-1"));
        assert_ne!(canonical_number("10"), canonical_number("1"));
    }

    #[test]
    fn malformed_numbers_have_no_canonical_form() {
        for text in ["", ".", "-", "1e", "abc", "1.2.3", "1e1.5"] {
            assert_eq!(canonical_number(text), None, "{text}");
        }
    }

    #[test]
    fn string_parts_cannot_collide_across_attributes() {
        let left = vec![
            KeyPart::String("a\u{1f}S:b".to_string()),
            KeyPart::String("c".to_string()),
        ];
        let right = vec![
            KeyPart::String("a".to_string()),
            KeyPart::String("b\u{1f}S:c".to_string()),
        ];
        assert_ne!(left, right);
    }
}
