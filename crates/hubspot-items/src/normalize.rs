//! Provider record → `IntegrationItem`

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::item::{CrmObject, IntegrationItem, ItemType};

/// Map one CRM record onto the generic item shape.
pub fn normalize(object: &CrmObject, item_type: ItemType) -> IntegrationItem {
    let id = object.id_string();

    let mut item = IntegrationItem {
        id: format!("{id}_{}", item_type.as_str()),
        item_type,
        display_name: display_name(object, item_type, &id),
        creation_time: object.created_at.as_deref().and_then(parse_timestamp),
        last_modified_time: object.updated_at.as_deref().and_then(parse_timestamp),
        url: None,
        phone: None,
        email: None,
        domain: None,
        amount: None,
    };

    match item_type {
        ItemType::Contact => {
            item.phone = object.property("phone");
            item.email = object.property("email");
        }
        ItemType::Company => {
            item.phone = object.property("phone");
            item.domain = object.property("domain");
        }
        ItemType::Deal => {
            item.amount = object.property("amount");
        }
    }

    item
}

fn display_name(object: &CrmObject, item_type: ItemType, id: &str) -> String {
    match item_type {
        ItemType::Contact => {
            let first = object.property("firstname").unwrap_or_default();
            let last = object.property("lastname").unwrap_or_default();
            let name = format!("{first} {last}").trim().to_owned();
            match (name.is_empty(), object.property("email")) {
                (false, Some(email)) => format!("{name} ({email})"),
                (false, None) => name,
                (true, Some(email)) => email,
                (true, None) => format!("Contact {id}"),
            }
        }
        ItemType::Company => {
            let name = object
                .property("name")
                .unwrap_or_else(|| format!("Company {id}"));
            match object.property("domain") {
                Some(domain) => format!("{name} ({domain})"),
                None => name,
            }
        }
        ItemType::Deal => {
            let name = object
                .property("dealname")
                .unwrap_or_else(|| format!("Deal {id}"));
            match object.property("amount") {
                Some(amount) => format!("{name} (${amount})"),
                None => name,
            }
        }
    }
}

/// Parse HubSpot's `createdAt`/`updatedAt` values.
///
/// Accepts RFC 3339 and bare `YYYY-MM-DDTHH:MM:SS[.fff][Z]`, read as UTC.
/// Anything else yields `None` rather than failing the item.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|ts| ts.and_utc())
}
