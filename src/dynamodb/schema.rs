use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ScalarAttributeType, TableDescription,
};

use crate::dynamodb::{Error, Item, Result, Value};

/// Represents the type of a key attribute in a DynamoDB table.
///
/// Only scalar types can be used for keys: string (`S`), number (`N`) and binary (`B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    String,
    Number,
    Binary,
}

impl KeyKind {
    /// Whether `value` has the kind a key attribute of this type requires.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (KeyKind::String, Value::String(_))
                | (KeyKind::Number, Value::Number(_))
                | (KeyKind::Binary, Value::Binary(_))
        )
    }
}

impl From<KeyKind> for ScalarAttributeType {
    fn from(kind: KeyKind) -> Self {
        match kind {
            KeyKind::String => ScalarAttributeType::S,
            KeyKind::Number => ScalarAttributeType::N,
            KeyKind::Binary => ScalarAttributeType::B,
        }
    }
}

impl TryFrom<&ScalarAttributeType> for KeyKind {
    type Error = Error;

    fn try_from(value: &ScalarAttributeType) -> Result<Self> {
        match value {
            ScalarAttributeType::S => Ok(KeyKind::String),
            ScalarAttributeType::N => Ok(KeyKind::Number),
            ScalarAttributeType::B => Ok(KeyKind::Binary),
            other => Err(Error::MalformedResponse(format!(
                "unknown attribute type {}",
                other.as_str()
            ))),
        }
    }
}

/// A named key attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    name: String,
    kind: KeyKind,
}

impl KeyAttribute {
    pub fn new(name: impl Into<String>, kind: KeyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, KeyKind::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, KeyKind::Number)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, KeyKind::Binary)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }
}

/// The primary key of a DynamoDB table.
///
/// Every table must have a primary key, which can be:
/// - **Simple Primary Key**: Consists of just a partition key (`HASH`).
/// - **Composite Primary Key**: A partition key plus a sort key (`RANGE`).
///
/// Beyond the key, tables are schemaless: items may carry any other attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    partition: KeyAttribute,
    sort: Option<KeyAttribute>,
}

impl KeySchema {
    pub fn new(partition: KeyAttribute, sort: Option<KeyAttribute>) -> Self {
        Self { partition, sort }
    }

    pub fn partition_key(&self) -> &KeyAttribute {
        &self.partition
    }

    pub fn sort_key(&self) -> Option<&KeyAttribute> {
        self.sort.as_ref()
    }

    /// Key attributes in schema order: partition key first.
    pub fn attributes(&self) -> impl Iterator<Item = &KeyAttribute> {
        std::iter::once(&self.partition).chain(self.sort.as_ref())
    }

    /// Checks that `item` carries every key attribute.
    pub fn check_item(&self, item: &Item) -> Result<()> {
        for key in self.attributes() {
            if item.get(key.name()).is_none() {
                return Err(Error::Validation(format!(
                    "item is missing key attribute '{}'",
                    key.name()
                )));
            }
        }
        Ok(())
    }

    /// Builds the `KeySchema` and `AttributeDefinitions` parameters of a CreateTable request.
    pub(crate) fn to_sdk(&self) -> Result<(Vec<KeySchemaElement>, Vec<AttributeDefinition>)> {
        let mut key_schema = Vec::new();
        let mut attribute_definitions = Vec::new();

        for (key, key_type) in std::iter::once((&self.partition, KeyType::Hash))
            .chain(self.sort.as_ref().map(|sort| (sort, KeyType::Range)))
        {
            key_schema.push(
                KeySchemaElement::builder()
                    .attribute_name(key.name())
                    .key_type(key_type)
                    .build()
                    .map_err(|e| Error::Validation(format!("invalid key schema: {e}")))?,
            );
            attribute_definitions.push(
                AttributeDefinition::builder()
                    .attribute_name(key.name())
                    .attribute_type(key.kind().into())
                    .build()
                    .map_err(|e| {
                        Error::Validation(format!("invalid attribute definition: {e}"))
                    })?,
            );
        }

        Ok((key_schema, attribute_definitions))
    }

    /// Reads the key schema back out of a table description.
    pub(crate) fn from_description(description: &TableDescription) -> Result<Self> {
        let attribute = |key_type: KeyType| -> Result<Option<KeyAttribute>> {
            let Some(element) = description
                .key_schema()
                .iter()
                .find(|element| element.key_type() == &key_type)
            else {
                return Ok(None);
            };

            let name = element.attribute_name();
            let definition = description
                .attribute_definitions()
                .iter()
                .find(|definition| definition.attribute_name() == name)
                .ok_or_else(|| {
                    Error::MalformedResponse(format!("no attribute definition for key '{name}'"))
                })?;

            Ok(Some(KeyAttribute::new(
                name,
                KeyKind::try_from(definition.attribute_type())?,
            )))
        };

        let partition = attribute(KeyType::Hash)?.ok_or_else(|| {
            Error::MalformedResponse("table description has no partition key".to_string())
        })?;

        Ok(Self {
            partition,
            sort: attribute(KeyType::Range)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_schema_survives_sdk_round_trip() {
        let schema = KeySchema::new(
            KeyAttribute::string("category"),
            Some(KeyAttribute::number("year")),
        );
        let (key_schema, attribute_definitions) = schema.to_sdk().unwrap();

        assert_eq!(key_schema[0].key_type(), &KeyType::Hash);
        assert_eq!(key_schema[1].key_type(), &KeyType::Range);

        let description = TableDescription::builder()
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .build();

        assert_eq!(KeySchema::from_description(&description).unwrap(), schema);
    }

    #[test]
    fn description_without_partition_key_is_malformed() {
        let description = TableDescription::builder().build();
        assert!(matches!(
            KeySchema::from_description(&description),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn check_item_reports_missing_sort_key() {
        let schema = KeySchema::new(
            KeyAttribute::number("id"),
            Some(KeyAttribute::string("book_name")),
        );
        let item = Item::new().set("id", 25);

        let err = schema.check_item(&item).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: item is missing key attribute 'book_name'"
        );
        assert!(schema
            .check_item(&item.set("book_name", "anotherBook"))
            .is_ok());
    }

    #[test]
    fn key_kinds_accept_matching_values() {
        assert!(KeyKind::String.accepts(&Value::from("a")));
        assert!(KeyKind::Number.accepts(&Value::from(1)));
        assert!(KeyKind::Binary.accepts(&Value::from(vec![1u8])));
        assert!(!KeyKind::String.accepts(&Value::from(1)));
    }
}
