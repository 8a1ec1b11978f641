//! HubSpot CRM objects as integration items
//!
//! Lists contacts, companies and deals with a bearer token and maps each
//! record onto the aggregation system's generic `IntegrationItem` shape.
//! `normalize` is pure; `CrmClient` owns the network side.

pub mod error;
pub mod fetch;
pub mod item;
pub mod normalize;

pub use error::{Error, Result};
pub use fetch::{CrmClient, DEFAULT_API_BASE, DEFAULT_PAGE_SIZE, access_token_from_json};
pub use item::{CrmObject, IntegrationItem, ItemType};
pub use normalize::{normalize, parse_timestamp};
