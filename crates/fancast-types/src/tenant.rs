use serde::{Deserialize, Serialize};

/// A creator's isolated content-and-billing namespace. The id equals the
/// owning creator's subject id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The retrieval service's per-tenant isolation key. Target systems only
/// accept `[a-z0-9_-]`, so every tenant id is normalized through the same
/// transform wherever it scopes a retrieval or connection call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn from_tenant(tenant: &TenantId) -> Self {
        let normalized = tenant
            .0
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'a'..='z' | '0'..='9' | '_' | '-' => c,
                _ => '_',
            })
            .collect();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_key_normalizes_disallowed_characters() {
        let tenant = TenantId("User ID@Example.COM".into());
        let key = PartitionKey::from_tenant(&tenant);
        assert_eq!(key.as_str(), "user_id_example_com");
    }

    #[test]
    fn partition_key_is_idempotent() {
        let tenant = TenantId("Mixed Case-42!".into());
        let once = PartitionKey::from_tenant(&tenant);
        let twice = PartitionKey::from_tenant(&TenantId(once.as_str().to_string()));
        assert_eq!(once, twice);
    }

    #[test]
    fn partition_key_output_alphabet_is_closed() {
        let tenant = TenantId("äöü €$ ABC xyz_09-".into());
        let key = PartitionKey::from_tenant(&tenant);
        assert!(key
            .as_str()
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-')));
    }
}
