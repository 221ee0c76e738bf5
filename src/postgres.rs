//! PostgreSQL-backed user directory.
//!
//! Email uniqueness is enforced by the table's unique constraint, so
//! concurrent signups for one email cannot both land.
use super::*;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::Row;

/// Table holding user records.
pub const USERS: &str = "users";

const COLUMNS: &str = "id, email, password";

/// Connects to PostgreSQL at `url`.
/// Returns an `Arc<Client>` suitable for sharing across workers.
pub async fn db(url: &str) -> Result<Arc<Client>, tokio_postgres::Error> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// Creates the users table if absent. The unique email constraint doubles as its index.
pub async fn migrate(client: &Client) -> Result<(), tokio_postgres::Error> {
    client
        .batch_execute(const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            USERS,
            " (
                id          UUID PRIMARY KEY,
                email       VARCHAR(255) UNIQUE NOT NULL,
                password    TEXT NOT NULL
            )"
        ))
        .await
}

fn hydrate(row: &Row) -> User {
    User::new(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        row.get::<_, String>(1),
        row.get::<_, String>(2),
    )
}

impl UserDirectory for Arc<Client> {
    async fn find(&self, email: &str) -> Result<Vec<User>, StoreError> {
        self.query(
            const_format::concatcp!("SELECT ", COLUMNS, " FROM ", USERS, " WHERE email = $1"),
            &[&email],
        )
        .await
        .map(|rows| rows.iter().map(hydrate).collect())
        .map_err(StoreError::from)
    }

    async fn create(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let user = User::new(ID::default(), email.to_string(), password.to_string());
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                USERS,
                " (",
                COLUMNS,
                ") VALUES ($1, $2, $3)"
            ),
            &[&user.id().inner(), &user.email(), &user.password()],
        )
        .await?;
        Ok(user)
    }

    async fn lookup(&self, id: ID<User>) -> Result<Option<User>, StoreError> {
        self.query_opt(
            const_format::concatcp!("SELECT ", COLUMNS, " FROM ", USERS, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
        .map(|opt| opt.as_ref().map(hydrate))
        .map_err(StoreError::from)
    }

    async fn update(&self, id: ID<User>, patch: &UserPatch) -> Result<Option<User>, StoreError> {
        self.query_opt(
            const_format::concatcp!(
                "UPDATE ",
                USERS,
                " SET email = COALESCE($2, email) WHERE id = $1 RETURNING ",
                COLUMNS
            ),
            &[&id.inner(), &patch.email],
        )
        .await
        .map(|opt| opt.as_ref().map(hydrate))
        .map_err(StoreError::from)
    }

    async fn remove(&self, id: ID<User>) -> Result<Option<User>, StoreError> {
        self.query_opt(
            const_format::concatcp!("DELETE FROM ", USERS, " WHERE id = $1 RETURNING ", COLUMNS),
            &[&id.inner()],
        )
        .await
        .map(|opt| opt.as_ref().map(hydrate))
        .map_err(StoreError::from)
    }
}
