mod logging;

use anyhow::Result;
use dynamo_crud::{CrudConfig, DynamoCrud, Item, KeyAttribute, TableSpec};
use tracing::info;

const TABLE_NAME: &str = "dynamo-crud-demo";
const PARTITION_KEY: &str = "category";
const SORT_KEY: &str = "product_name";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;

    let config = CrudConfig::from_env();
    let ddb = DynamoCrud::from_config(&config).await;

    ddb.check_auth().await?;

    if ddb.table_exists(TABLE_NAME).await? {
        info!("Table '{TABLE_NAME}' already exists");
    } else {
        let table = TableSpec::new(TABLE_NAME, KeyAttribute::string(PARTITION_KEY))
            .with_sort_key(KeyAttribute::string(SORT_KEY));
        let created = ddb.create_table(&table).await?;
        info!("Table status: {:?}", created.status);
    }

    let item = Item::new()
        .set_string(PARTITION_KEY, "Electronics")
        .set_string(SORT_KEY, "Smartphone")
        .set("in_stock", true);
    ddb.put_item(TABLE_NAME, item, false).await?;

    let key = Item::new()
        .set_string(PARTITION_KEY, "Electronics")
        .set_string(SORT_KEY, "Smartphone");
    match ddb.get_item(TABLE_NAME, &key).await? {
        Some(found) => info!("Item found: {:?}", found),
        None => info!("Item not found"),
    }

    let all = ddb.get_all_items(TABLE_NAME).await?;
    info!("Table holds {} items", all.len());

    ddb.delete_item(TABLE_NAME, &key).await?;

    Ok(())
}
