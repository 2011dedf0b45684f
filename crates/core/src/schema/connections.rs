//! Connections listing schema.
//!
//! The body is a bare array: `[ { "id"?, "tenantId", "tenantType"?, "tenantName"? } ]`.

use serde::{Deserialize, Serialize};

use super::document::{Node, RawDocument};
use super::error::SchemaResult;

/// A tenant the bearer credential is authorised for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Connection identifier.
    pub id: Option<String>,
    /// Tenant identifier used in the `Xero-tenant-id` header.
    pub tenant_id: String,
    /// Tenant kind, usually `ORGANISATION`.
    pub tenant_type: Option<String>,
    /// Display name of the organisation.
    pub tenant_name: Option<String>,
}

/// Validates a connections listing response.
pub fn validate_connections(document: &RawDocument) -> SchemaResult<Vec<Connection>> {
    document
        .root()
        .array()?
        .iter()
        .map(decode_connection)
        .collect()
}

fn decode_connection(node: &Node<'_>) -> SchemaResult<Connection> {
    Ok(Connection {
        id: node.optional_str("id")?,
        tenant_id: node.required_str("tenantId")?,
        tenant_type: node.optional_str("tenantType")?,
        tenant_name: node.optional_str("tenantName")?,
    })
}
