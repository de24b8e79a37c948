use serde::{Deserialize, Deserializer, Serialize};

/// A stored customer row.
///
/// `id` and the timestamps are assigned by the database. `deleted_at` is only
/// ever set on soft-deleted rows, which reads never return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub email: String,
    pub title: String,
    pub content: String,
    pub mailing_id: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

/// Candidate customer as submitted by `POST /api/clients`.
///
/// Server-assigned fields in the payload (`id`, timestamps) are ignored. A
/// missing field and an explicit `null` both read as the zero value, leaving
/// requiredness to validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mailing_id: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
impl NewCustomer {
    /// True when `customer` carries the same client-supplied fields.
    pub fn matches(&self, customer: &Customer) -> bool {
        self.email == customer.email
            && self.title == customer.title
            && self.content == customer.content
            && self.mailing_id == customer.mailing_id
    }
}

// Body of POST /api/clients/send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailClientsRequest {
    pub mailing_id: i64,
}
