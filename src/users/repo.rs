use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// One persisted user row. `password` holds the argon2 hash; that is also
/// what responses echo back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub username: String,
    pub password: String,
}

/// Insert payload. `password` must already be hashed.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub username: String,
    pub password: String,
}

/// Fields to overwrite on update; `None` fields are left untouched.
/// `password`, when set, must already be hashed.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.username.is_none()
            && self.password.is_none()
    }
}

impl User {
    /// Insert one row; the id comes from the table default.
    pub async fn create(db: &PgPool, new: &NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, address, username, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, address, username, password
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.address)
        .bind(&new.username)
        .bind(&new.password)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// All rows, in whatever order the store yields them.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, address, username, password
            FROM users
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, address, username, password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Overwrite the supplied fields on one row. Callers must pass at least
    /// one change. Returns `None` when no row matches the id.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        changes: &UserChanges,
    ) -> anyhow::Result<Option<User>> {
        let mut query = update_query(id, changes);
        let user = query.build_query_as::<User>().fetch_optional(db).await?;
        Ok(user)
    }

    /// Delete one row, handing back its prior contents.
    pub async fn delete_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, name, email, address, username, password
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}

/// The SET clause walks the fields in a fixed order and binds only the ones
/// actually supplied; the id bind always comes last.
fn update_query<'a>(id: Uuid, changes: &'a UserChanges) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name.as_str());
        }
        if let Some(email) = &changes.email {
            set.push("email = ").push_bind_unseparated(email.as_str());
        }
        if let Some(address) = &changes.address {
            set.push("address = ").push_bind_unseparated(address.as_str());
        }
        if let Some(username) = &changes.username {
            set.push("username = ").push_bind_unseparated(username.as_str());
        }
        if let Some(password) = &changes.password {
            set.push("password = ").push_bind_unseparated(password.as_str());
        }
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING id, name, email, address, username, password");
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_query_binds_only_supplied_fields() {
        let changes = UserChanges {
            email: Some("new@example.com".into()),
            ..Default::default()
        };
        let qb = update_query(Uuid::new_v4(), &changes);
        assert_eq!(
            qb.sql(),
            "UPDATE users SET email = $1 WHERE id = $2 \
             RETURNING id, name, email, address, username, password"
        );
    }

    #[test]
    fn update_query_keeps_the_field_order_fixed() {
        let changes = UserChanges {
            name: Some("Ann".into()),
            email: Some("a@x.com".into()),
            address: Some("1 Main St".into()),
            username: Some("ann1".into()),
            password: Some("$argon2id$fake".into()),
        };
        let qb = update_query(Uuid::new_v4(), &changes);
        assert_eq!(
            qb.sql(),
            "UPDATE users SET name = $1, email = $2, address = $3, \
             username = $4, password = $5 WHERE id = $6 \
             RETURNING id, name, email, address, username, password"
        );
    }

    #[test]
    fn update_query_skips_address_when_not_supplied() {
        let changes = UserChanges {
            name: Some("Ann".into()),
            username: Some("ann1".into()),
            ..Default::default()
        };
        let qb = update_query(Uuid::new_v4(), &changes);
        assert_eq!(
            qb.sql(),
            "UPDATE users SET name = $1, username = $2 WHERE id = $3 \
             RETURNING id, name, email, address, username, password"
        );
    }

    #[test]
    fn empty_changes_are_detectable() {
        assert!(UserChanges::default().is_empty());
        let with_password = UserChanges {
            password: Some("$argon2id$fake".into()),
            ..Default::default()
        };
        assert!(!with_password.is_empty());
    }
}
