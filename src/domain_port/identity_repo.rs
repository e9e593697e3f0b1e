use crate::domain_model::Identity;

/// Columns that uniquely identify a user row.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UniqueColumn {
    Id,
    Email,
}

impl UniqueColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueColumn::Id => "id",
            UniqueColumn::Email => "email",
        }
    }
}

#[async_trait::async_trait]
pub trait IdentityRepo: Send + Sync {
    async fn lookup_identity(
        &self,
        column: UniqueColumn,
        value: &str,
    ) -> Result<Option<Identity>, IdentityError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity backend error: {0}")]
    Backend(String),
}
