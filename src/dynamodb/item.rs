use aws_sdk_dynamodb::types::AttributeValue;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

use crate::dynamodb::{Number, Result, Value};

/// Raw attribute map as exchanged with the SDK.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// Represents a DynamoDB item with native attribute values.
///
/// In DynamoDB, an item is a collection of attributes, each with a name and a value.
/// Items are similar to rows or records in other database systems.
///
/// # Primary Key
///
/// - Every item in a table is uniquely identified by its primary key.
/// - The primary key can be simple (partition key only) or composite (partition key and sort key).
/// - A key passed to get or delete is an `Item` holding exactly the key attributes.
///
/// # Item Size Limit
///
/// - The maximum item size in DynamoDB is 400 KB, including both attribute names and values.
///
/// # Example
///
/// ```
/// use dynamo_crud::Item;
///
/// let item = Item::new()
///     .set_string("user_id", "12345")
///     .set_string("username", "johndoe")
///     .set("age", 30);
/// assert_eq!(item.get_string("username"), Some("johndoe"));
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    attributes: HashMap<String, Value>,
}

impl Item {
    /// Creates a new empty `Item`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute of any supported kind.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets a string attribute.
    pub fn set_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, Value::String(value.into()))
    }

    /// Sets a number attribute.
    ///
    /// Numbers are stored as exact decimals; use [`Number::try_from`] for floats.
    pub fn set_number(self, key: impl Into<String>, value: impl Into<Number>) -> Self {
        self.set(key, Value::Number(value.into()))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Gets the value of an attribute as a string.
    ///
    /// Returns `None` if the attribute doesn't exist or is not a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Gets the value of an attribute as a number.
    pub fn get_number(&self, key: &str) -> Option<&Number> {
        self.get(key).and_then(Value::as_number)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }

    /// Encodes the item into the SDK's tagged representation.
    pub fn to_attributes(&self) -> AttributeMap {
        self.attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().into()))
            .collect()
    }

    /// Decodes an item from the SDK's tagged representation.
    pub fn from_attributes(attributes: AttributeMap) -> Result<Self> {
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| Ok((k, Value::try_from(v)?)))
            .collect::<Result<_>>()?;
        Ok(Self { attributes })
    }

    /// Builds an item from any serializable record.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self> {
        let attributes: AttributeMap = serde_dynamo::to_item(record)?;
        Self::from_attributes(attributes)
    }

    /// Deserializes the item into a record type.
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T> {
        let attributes: AttributeMap = self
            .attributes
            .into_iter()
            .map(|(k, v)| (k, v.into()))
            .collect();
        Ok(serde_dynamo::from_item(attributes)?)
    }
}

impl From<HashMap<String, Value>> for Item {
    fn from(attributes: HashMap<String, Value>) -> Self {
        Self { attributes }
    }
}

impl From<Item> for HashMap<String, Value> {
    fn from(item: Item) -> Self {
        item.attributes
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Item {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Item {
    type Item = (String, Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}
