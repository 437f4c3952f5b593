use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use crate::dynamodb::{CrudConfig, DynamoCrud, Item, Result, TableInfo, TableSpec};

/// Blocking wrapper around [`DynamoCrud`].
///
/// Each call blocks the current thread until the round trip completes. The wrapper owns a
/// multi-threaded Tokio runtime, so it may be shared across threads, but it must not be
/// called from inside another async runtime.
#[derive(Debug, Clone)]
pub struct BlockingDynamoCrud {
    inner: DynamoCrud,
    runtime: Arc<Runtime>,
}

impl BlockingDynamoCrud {
    pub fn new(region: Option<&str>) -> Result<Self> {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(DynamoCrud::new(region));
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    pub fn from_config(config: &CrudConfig) -> Result<Self> {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(DynamoCrud::from_config(config));
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// Wraps an existing async client.
    pub fn from_async(inner: DynamoCrud) -> Result<Self> {
        Ok(Self {
            inner,
            runtime: Arc::new(build_runtime()?),
        })
    }

    pub fn as_async(&self) -> &DynamoCrud {
        &self.inner
    }

    pub fn check_auth(&self) -> Result<()> {
        self.runtime.block_on(self.inner.check_auth())
    }

    pub fn create_table(&self, table: &TableSpec) -> Result<TableInfo> {
        self.runtime.block_on(self.inner.create_table(table))
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.runtime.block_on(self.inner.list_tables())
    }

    pub fn describe_table(&self, table_name: &str) -> Result<TableInfo> {
        self.runtime.block_on(self.inner.describe_table(table_name))
    }

    pub fn get_item(&self, table_name: &str, key: &Item) -> Result<Option<Item>> {
        self.runtime.block_on(self.inner.get_item(table_name, key))
    }

    pub fn get_all_items(&self, table_name: &str) -> Result<Vec<Item>> {
        self.runtime.block_on(self.inner.get_all_items(table_name))
    }

    pub fn put_item(&self, table_name: &str, item: Item, prevent_overwrite: bool) -> Result<Item> {
        self.runtime
            .block_on(self.inner.put_item(table_name, item, prevent_overwrite))
    }

    pub fn delete_item(&self, table_name: &str, key: &Item) -> Result<Option<Item>> {
        self.runtime.block_on(self.inner.delete_item(table_name, key))
    }

    pub fn delete_table(&self, table_name: &str) -> Result<TableInfo> {
        self.runtime.block_on(self.inner.delete_table(table_name))
    }
}

fn build_runtime() -> Result<Runtime> {
    Ok(Builder::new_multi_thread().enable_all().build()?)
}
