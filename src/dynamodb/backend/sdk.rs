use async_trait::async_trait;
use aws_sdk_dynamodb::{
    operation::{
        create_table::CreateTableOutput, delete_item::DeleteItemOutput,
        delete_table::DeleteTableOutput, describe_table::DescribeTableOutput,
        get_item::GetItemOutput, list_tables::ListTablesOutput, put_item::PutItemOutput,
        scan::ScanOutput,
    },
    types::{
        AttributeDefinition, BillingMode, KeySchemaElement, ProvisionedThroughput, ReturnValue,
    },
    Client,
};

use super::{DynamoBackend, PutCondition};
use crate::dynamodb::{error::map_sdk_error, AttributeMap, Result};

/// Backend that talks to DynamoDB through `aws_sdk_dynamodb::Client`.
///
/// The client is a cheap handle over a shared, connection-pooled HTTP stack and is safe to
/// use from many tasks at once; cloning the backend clones that handle.
#[derive(Debug, Clone)]
pub struct SdkBackend {
    client: Client,
}

impl SdkBackend {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DynamoBackend for SdkBackend {
    async fn create_table(
        &self,
        table_name: String,
        key_schema: Vec<KeySchemaElement>,
        attribute_definitions: Vec<AttributeDefinition>,
        throughput: ProvisionedThroughput,
    ) -> Result<CreateTableOutput> {
        self.client
            .create_table()
            .table_name(&table_name)
            .billing_mode(BillingMode::Provisioned)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema))
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &table_name))
    }

    async fn describe_table(&self, table_name: String) -> Result<DescribeTableOutput> {
        self.client
            .describe_table()
            .table_name(&table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &table_name))
    }

    async fn list_tables(
        &self,
        exclusive_start_table_name: Option<String>,
    ) -> Result<ListTablesOutput> {
        self.client
            .list_tables()
            .set_exclusive_start_table_name(exclusive_start_table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, ""))
    }

    async fn delete_table(&self, table_name: String) -> Result<DeleteTableOutput> {
        self.client
            .delete_table()
            .table_name(&table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &table_name))
    }

    async fn get_item(&self, table_name: String, key: AttributeMap) -> Result<GetItemOutput> {
        self.client
            .get_item()
            .table_name(&table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &table_name))
    }

    async fn put_item(
        &self,
        table_name: String,
        item: AttributeMap,
        condition: Option<PutCondition>,
    ) -> Result<PutItemOutput> {
        let mut put = self
            .client
            .put_item()
            .table_name(&table_name)
            .set_item(Some(item));

        if let Some(condition) = condition {
            let (expression, names) = condition.expression();
            put = put
                .condition_expression(expression)
                .set_expression_attribute_names(Some(names));
        }

        put.send()
            .await
            .map_err(|e| map_sdk_error(e, &table_name))
    }

    async fn delete_item(
        &self,
        table_name: String,
        key: AttributeMap,
    ) -> Result<DeleteItemOutput> {
        self.client
            .delete_item()
            .table_name(&table_name)
            .set_key(Some(key))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &table_name))
    }

    async fn scan(
        &self,
        table_name: String,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<ScanOutput> {
        self.client
            .scan()
            .table_name(&table_name)
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &table_name))
    }
}
