use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::{MySqlPool, Row};

/// Reads identities from the `users` table. `role` is a JSON array of
/// strings; NULL reads as no roles. Soft-deleted rows are not returned.
pub struct MySqlIdentityRepo {
    pool: MySqlPool,
}

impl MySqlIdentityRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlIdentityRepo { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, IdentityError> {
        let pool = MySqlPool::connect(url)
            .await
            .map_err(|e| IdentityError::Backend(format!("connect: {e}")))?;
        Ok(Self::new(pool))
    }
}

fn parse_roles(raw: Option<String>) -> Result<Vec<String>, IdentityError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
            .map_err(|e| IdentityError::Backend(format!("role column: {e}"))),
        _ => Ok(Vec::new()),
    }
}

#[async_trait::async_trait]
impl IdentityRepo for MySqlIdentityRepo {
    async fn lookup_identity(
        &self,
        column: UniqueColumn,
        value: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        // Column names come from a closed enum, never from input.
        let sql = format!(
            "SELECT id, CAST(role AS CHAR) AS role FROM users WHERE {} = ? AND deleted_at IS NULL",
            column.as_str()
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| IdentityError::Backend(format!("query identity: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let id: String = row
            .try_get("id")
            .map_err(|e| IdentityError::Backend(e.to_string()))?;
        let role: Option<String> = row
            .try_get("role")
            .map_err(|e| IdentityError::Backend(e.to_string()))?;

        Ok(Some(Identity {
            id: UserId(id),
            role: parse_roles(role)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!(
            parse_roles(Some(r#"["user","admin"]"#.to_string())).unwrap(),
            vec!["user", "admin"]
        );
        assert!(parse_roles(None).unwrap().is_empty());
        assert!(parse_roles(Some(" ".to_string())).unwrap().is_empty());
        assert!(parse_roles(Some("not json".to_string())).is_err());
    }
}
