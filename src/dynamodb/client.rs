use aws_sdk_dynamodb::types::TableDescription;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::dynamodb::{
    backend::{DynamoBackend, PutCondition, SdkBackend},
    CrudConfig, Error, Item, Result, TableInfo, TableSpec, WaitPolicy,
};

/// DynamoDB CRUD façade.
///
/// Wraps a [`DynamoBackend`] (normally the AWS SDK client) behind eight operations:
/// table create/describe/list/delete and item get/get-all/put/delete. Values go in and
/// come out as native [`Item`]s; the tagged wire encoding never leaks to callers.
///
/// # DynamoDB Concepts
///
/// ## Tables
/// In DynamoDB, a table is a collection of items (rows), and each item consists of attributes (columns).
/// Tables are schema-less apart from the primary key.
///
/// ## Primary Key
/// Each table must have a primary key, which can be:
/// - Partition Key: A single attribute that DynamoDB uses to distribute data across partitions
/// - Composite Key: A combination of Partition Key and Sort Key
///
/// # Concurrency
///
/// `DynamoCrud` is cheap to clone and can be shared across tasks. It holds no session state
/// beyond its configuration; the SDK client underneath pools connections and is safe for
/// concurrent use.
///
/// # Error Handling
///
/// Every method returns [`Result`]; use [`Error::kind`] to tell not-found, conflict,
/// validation, configuration and transport failures apart. Nothing is retried here: retry
/// policy belongs to the SDK configuration or to the caller.
///
/// # Example
///
/// ```no_run
/// use dynamo_crud::{DynamoCrud, Item, KeyAttribute, TableSpec};
///
/// # async fn run() -> dynamo_crud::Result<()> {
/// let crud = DynamoCrud::new(Some("eu-west-1")).await;
///
/// let table = TableSpec::new("books", KeyAttribute::number("id"))
///     .with_sort_key(KeyAttribute::string("book_name"));
/// crud.create_table(&table).await?;
///
/// let item = Item::new()
///     .set("id", 25)
///     .set("book_name", "anotherBook")
///     .set("genre", "Short Story");
/// crud.put_item("books", item, true).await?;
///
/// let key = Item::new().set("id", 25).set("book_name", "anotherBook");
/// let found = crud.get_item("books", &key).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DynamoCrud {
    backend: Arc<dyn DynamoBackend>,
    region: Option<String>,
    create_wait: Option<WaitPolicy>,
    delete_wait: Option<WaitPolicy>,
}

impl std::fmt::Debug for DynamoCrud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoCrud")
            .field("region", &self.region)
            .field("create_wait", &self.create_wait)
            .field("delete_wait", &self.delete_wait)
            .finish_non_exhaustive()
    }
}

impl DynamoCrud {
    /// Builds a client for `region`, or the region of the default provider chain.
    pub async fn new(region: Option<&str>) -> Self {
        let mut config = CrudConfig::from_env();
        if let Some(region) = region {
            config = config.with_region(region);
        }
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &CrudConfig) -> Self {
        let sdk_config = config.load_sdk_config().await;
        let mut crud = Self::from_sdk_config(&sdk_config);
        crud.create_wait = config.create_wait;
        crud.delete_wait = config.delete_wait;
        info!(region = ?crud.region, "DynamoDB client initialized");
        crud
    }

    /// Builds a client from an already resolved SDK configuration.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        let mut crud = Self::with_backend(SdkBackend::new(sdk_config));
        crud.region = sdk_config.region().map(|r| r.to_string());
        crud
    }

    /// Builds a client over any backend, with the default wait policies.
    pub fn with_backend(backend: impl DynamoBackend + 'static) -> Self {
        let defaults = CrudConfig::default();
        Self {
            backend: Arc::new(backend),
            region: None,
            create_wait: defaults.create_wait,
            delete_wait: defaults.delete_wait,
        }
    }

    pub fn with_waits(mut self, create: Option<WaitPolicy>, delete: Option<WaitPolicy>) -> Self {
        self.create_wait = create;
        self.delete_wait = delete;
        self
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Verifies credentials and connectivity by listing tables once.
    pub async fn check_auth(&self) -> Result<()> {
        self.backend.list_tables(None).await.map_err(|e| {
            warn!("Authentication failed: {e}");
            match e {
                Error::Config(_) | Error::Runtime(_) => e,
                other => Error::Config(format!("authentication check failed: {other}")),
            }
        })?;
        info!("Authentication successful");
        Ok(())
    }

    // --- Table Operations ---

    /// Creates a provisioned table and, unless waiting is disabled, waits for it to become
    /// `ACTIVE`.
    ///
    /// Fails with [`Error::TableInUse`] if a table with the same name already exists.
    #[instrument(skip(self, table), fields(table = table.name()))]
    pub async fn create_table(&self, table: &TableSpec) -> Result<TableInfo> {
        if table.name().is_empty() {
            return Err(Error::Validation("table name must not be empty".to_string()));
        }
        let (key_schema, attribute_definitions) = table.key_schema().to_sdk()?;
        let throughput = table.throughput().to_sdk()?;

        let output = self
            .backend
            .create_table(
                table.name().to_string(),
                key_schema,
                attribute_definitions,
                throughput,
            )
            .await?;
        info!("Table '{}' creation requested", table.name());

        match self.create_wait {
            Some(policy) => {
                let info = self.wait_for_active(table.name(), policy).await?;
                info!("Table '{}' is active", table.name());
                Ok(info)
            }
            None => table_info(output.table_description.as_ref(), table.name()),
        }
    }

    /// Lists every table name in the region, following pagination to the end.
    #[instrument(skip(self))]
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut last_evaluated_table_name = None;

        loop {
            let response = self.backend.list_tables(last_evaluated_table_name).await?;

            if let Some(page) = response.table_names {
                debug!(page_len = page.len(), "fetched table names page");
                names.extend(page);
            }

            last_evaluated_table_name = response.last_evaluated_table_name;

            if last_evaluated_table_name.is_none() {
                break;
            }
        }

        info!("Collected {} table names", names.len());
        Ok(names)
    }

    /// Retrieves table metadata.
    #[instrument(skip(self))]
    pub async fn describe_table(&self, table_name: &str) -> Result<TableInfo> {
        let output = self
            .backend
            .describe_table(table_name.to_string())
            .await
            .inspect_err(|e| {
                if e.is_not_found() {
                    warn!("Table '{table_name}' not found");
                }
            })?;
        let info = table_info(output.table.as_ref(), table_name)?;

        for key in info.key_schema.attributes() {
            info!("Key attribute: {} ({:?})", key.name(), key.kind());
        }
        Ok(info)
    }

    /// Checks if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        match self.backend.describe_table(table_name.to_string()).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Deletes a table and, unless waiting is disabled, waits until it is gone.
    ///
    /// Returns the table's metadata as reported by the delete request.
    #[instrument(skip(self))]
    pub async fn delete_table(&self, table_name: &str) -> Result<TableInfo> {
        let output = self.backend.delete_table(table_name.to_string()).await?;
        let info = table_info(output.table_description.as_ref(), table_name)?;
        info!("Table '{table_name}' is being deleted");

        if let Some(policy) = self.delete_wait {
            self.wait_for_deleted(table_name, policy).await?;
            info!("Table '{table_name}' has been deleted");
        }
        Ok(info)
    }

    // --- Item Operations ---

    /// Gets an item by its full primary key. `Ok(None)` means no such item.
    #[instrument(skip(self, key))]
    pub async fn get_item(&self, table_name: &str, key: &Item) -> Result<Option<Item>> {
        let response = self
            .backend
            .get_item(table_name.to_string(), key.to_attributes())
            .await?;

        match response.item {
            Some(attributes) => {
                info!("Item retrieved from '{table_name}'");
                Item::from_attributes(attributes).map(Some)
            }
            None => {
                warn!("No item with the given key in '{table_name}'");
                Ok(None)
            }
        }
    }

    /// Reads every item in the table, scanning page by page until the last page.
    ///
    /// A failure on any page fails the whole call; no partial result is returned.
    #[instrument(skip(self))]
    pub async fn get_all_items(&self, table_name: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let response = self
                .backend
                .scan(table_name.to_string(), last_evaluated_key)
                .await?;

            if let Some(page) = response.items {
                debug!(page_len = page.len(), "fetched scan page");
                for attributes in page {
                    items.push(Item::from_attributes(attributes)?);
                }
            }

            last_evaluated_key = response.last_evaluated_key;

            if last_evaluated_key.is_none() {
                break;
            }
        }

        info!("Retrieved {} items from '{table_name}'", items.len());
        Ok(items)
    }

    /// Puts an item and echoes it back.
    ///
    /// With `prevent_overwrite`, the write is conditional on no item with the same key
    /// existing and fails with [`Error::ItemExists`] otherwise. Without it, an existing item
    /// is replaced unconditionally.
    #[instrument(skip(self, item))]
    pub async fn put_item(
        &self,
        table_name: &str,
        item: Item,
        prevent_overwrite: bool,
    ) -> Result<Item> {
        let condition = if prevent_overwrite {
            let key_schema = self.describe_table(table_name).await?.key_schema;
            key_schema.check_item(&item)?;
            Some(PutCondition::KeyAbsent {
                key_attributes: key_schema
                    .attributes()
                    .map(|k| k.name().to_string())
                    .collect(),
            })
        } else {
            None
        };

        self.backend
            .put_item(table_name.to_string(), item.to_attributes(), condition)
            .await
            .inspect_err(|e| {
                if e.is_conflict() {
                    warn!("Item with the same key already exists in '{table_name}'");
                }
            })?;

        info!("Item put into '{table_name}'");
        Ok(item)
    }

    /// Deletes an item and returns it as it was. Deleting an absent key is a no-op and
    /// returns `Ok(None)`.
    ///
    /// The old image is informational: if it holds attribute types [`Value`](crate::Value) cannot
    /// represent, the delete still counts as done and `Ok(None)` is returned.
    #[instrument(skip(self, key))]
    pub async fn delete_item(&self, table_name: &str, key: &Item) -> Result<Option<Item>> {
        let response = self
            .backend
            .delete_item(table_name.to_string(), key.to_attributes())
            .await?;

        match response.attributes {
            Some(attributes) => {
                info!("Item deleted from '{table_name}'");
                match Item::from_attributes(attributes) {
                    Ok(old) => Ok(Some(old)),
                    Err(e) => {
                        warn!("Deleted item in '{table_name}' could not be decoded: {e}");
                        Ok(None)
                    }
                }
            }
            None => {
                warn!("No item with the given key to delete in '{table_name}'");
                Ok(None)
            }
        }
    }

    // --- Waiting ---

    async fn wait_for_active(&self, table_name: &str, policy: WaitPolicy) -> Result<TableInfo> {
        let attempts = policy.attempts();
        for attempt in 1..=attempts {
            match self.backend.describe_table(table_name.to_string()).await {
                Ok(output) => {
                    let info = table_info(output.table.as_ref(), table_name)?;
                    if info.is_active() {
                        return Ok(info);
                    }
                    debug!(attempt, status = ?info.status, "table not active yet");
                }
                Err(e) if e.is_not_found() => debug!(attempt, "table not visible yet"),
                Err(e) => return Err(e),
            }
            if attempt < attempts {
                sleep(policy.delay).await;
            }
        }

        Err(Error::WaitTimeout {
            table: table_name.to_string(),
            state: "ACTIVE",
        })
    }

    async fn wait_for_deleted(&self, table_name: &str, policy: WaitPolicy) -> Result<()> {
        let attempts = policy.attempts();
        for attempt in 1..=attempts {
            match self.backend.describe_table(table_name.to_string()).await {
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(e),
                Ok(_) => debug!(attempt, "table still present"),
            }
            if attempt < attempts {
                sleep(policy.delay).await;
            }
        }

        Err(Error::WaitTimeout {
            table: table_name.to_string(),
            state: "deleted",
        })
    }
}

fn table_info(description: Option<&TableDescription>, table_name: &str) -> Result<TableInfo> {
    description
        .ok_or_else(|| {
            Error::MalformedResponse(format!("no table description returned for '{table_name}'"))
        })
        .and_then(TableInfo::try_from)
}
