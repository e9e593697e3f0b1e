use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::sync::Arc;

/// Identity lookup over an in-process table, keyed by user id. Email
/// lookups scan the table.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityRepo {
    users: Arc<DashMap<UserId, MemoryUser>>,
}

#[derive(Debug, Clone)]
struct MemoryUser {
    identity: Identity,
    email: Option<String>,
}

impl MemoryIdentityRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identity: Identity, email: Option<String>) {
        self.users
            .insert(identity.id.clone(), MemoryUser { identity, email });
    }

    pub fn remove(&self, user_id: &UserId) -> Option<Identity> {
        self.users.remove(user_id).map(|(_, user)| user.identity)
    }
}

#[async_trait::async_trait]
impl IdentityRepo for MemoryIdentityRepo {
    async fn lookup_identity(
        &self,
        column: UniqueColumn,
        value: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        let found = match column {
            UniqueColumn::Id => self
                .users
                .get(&UserId::from(value))
                .map(|user| user.identity.clone()),
            UniqueColumn::Email => self
                .users
                .iter()
                .find(|user| user.email.as_deref() == Some(value))
                .map(|user| user.identity.clone()),
        };
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_id_and_email() {
        let repo = MemoryIdentityRepo::new();
        let identity = Identity {
            id: UserId::from("U1"),
            role: vec!["user".to_string()],
        };
        repo.insert(identity.clone(), Some("u1@example.com".to_string()));

        let by_id = repo.lookup_identity(UniqueColumn::Id, "U1").await.unwrap();
        assert_eq!(by_id, Some(identity.clone()));

        let by_email = repo
            .lookup_identity(UniqueColumn::Email, "u1@example.com")
            .await
            .unwrap();
        assert_eq!(by_email, Some(identity));

        assert!(repo.lookup_identity(UniqueColumn::Id, "U2").await.unwrap().is_none());

        repo.remove(&UserId::from("U1"));
        assert!(repo.lookup_identity(UniqueColumn::Id, "U1").await.unwrap().is_none());
    }
}
