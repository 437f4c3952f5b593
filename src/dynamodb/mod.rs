//! # DynamoDB Module
//!
//! A thin CRUD façade over Amazon DynamoDB.
//!
//! ## Components
//!
//! - `DynamoCrud`: the async façade with the table and item operations.
//! - `BlockingDynamoCrud`: the same operations as blocking calls.
//! - `Item` / `Value` / `Number`: native item values and their tagged wire encoding.
//! - `TableSpec` / `TableInfo` / `KeySchema`: table definitions going in and metadata coming out.
//! - `DynamoBackend`: the SDK seam, with `SdkBackend` for AWS and `MemoryBackend` for tests.
//!
//! ## Usage
//!
//! Credentials and region come from the SDK's default chain. The usual variables are:
//!
//! - `AWS_ACCESS_KEY_ID`: Your AWS access key ID.
//! - `AWS_SECRET_ACCESS_KEY`: Your AWS secret access key.
//! - `AWS_REGION`: The AWS region where your DynamoDB tables are located.
//!
//! Optionally, you can also set:
//! - `AWS_SESSION_TOKEN`: If you're using temporary credentials.
//! - `AWS_PROFILE`: A named profile from the shared credentials file.
//! - `AWS_ENDPOINT_URL`: For using a custom endpoint (e.g., DynamoDB Local).
//!
//! A `.env` file in the working directory is loaded first when present.

mod backend;
mod blocking;
mod client;
mod config;
mod error;
mod item;
mod schema;
mod table;
mod value;

pub use backend::{DynamoBackend, MemoryBackend, PutCondition, SdkBackend};
pub use blocking::BlockingDynamoCrud;
pub use client::DynamoCrud;
pub use config::{CrudConfig, WaitPolicy};
pub use error::{Error, ErrorKind, Result};
pub use item::{AttributeMap, Item};
pub use schema::{KeyAttribute, KeyKind, KeySchema};
pub use table::{TableInfo, TableSpec, Throughput};
pub use value::{Number, Value};
