//! Item and wire types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CRM object types this integration lists, in fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Contact,
    Company,
    Deal,
}

impl ItemType {
    pub const ALL: [ItemType; 3] = [ItemType::Contact, ItemType::Company, ItemType::Deal];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Contact => "contact",
            ItemType::Company => "company",
            ItemType::Deal => "deal",
        }
    }

    /// Path segment under `/crm/v3/objects/`.
    pub fn object_path(&self) -> &'static str {
        match self {
            ItemType::Contact => "contacts",
            ItemType::Company => "companies",
            ItemType::Deal => "deals",
        }
    }
}

/// Normalized representation of one third-party record.
///
/// Built per request and handed back to the caller; never persisted here.
/// Only the optional field matching the item's type is ever populated
/// (contact: phone/email, company: phone/domain, deal: amount).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationItem {
    /// `{hubspot_id}_{type}`
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(rename = "name")]
    pub display_name: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_modified_time: Option<DateTime<Utc>>,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

/// One record from a `/crm/v3/objects/{type}` list response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrmObject {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl CrmObject {
    /// Record id as text. HubSpot sends strings; numbers are tolerated.
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Non-blank property value as text.
    pub fn property(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Envelope of a list call. Paging cursors are ignored: one page is read.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub results: Vec<CrmObject>,
    #[serde(default)]
    pub paging: Option<serde_json::Value>,
}
