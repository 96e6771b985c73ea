use std::path::Path;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use libsql::{Builder, Connection, Database as LibsqlDatabase};

use crate::config::Config;
use crate::model::{Language, Snippet, SnippetFields, Style, User};

const SYSTEM_MIGRATIONS: &[(&str, &str)] = &[(
    "system/000_migrations_table.sql",
    include_str!("migrations/system/000_migrations_table.sql"),
)];

const MIGRATIONS: &[(&str, &str)] = &[("001_schema.sql", include_str!("migrations/001_schema.sql"))];

pub struct Database {
    _db: LibsqlDatabase,
    conn: Connection,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(cfg.app.get_db());
        Self::open(&path.to_string_lossy()).await
    }

    /// Open a local database at `path` and bring the schema up to date.
    /// Tests pass `:memory:`.
    pub async fn open(path: &str) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        for (filename, sql) in MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database { _db: db, conn })
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn row_to_snippet(&self, row: &libsql::Row) -> Result<Snippet> {
        let linenos: i64 = row.get(3)?;
        let language_str: String = row.get(4)?;
        let language = Language::from_str(&language_str)
            .ok_or_else(|| anyhow::anyhow!("unknown language in store: {language_str}"))?;
        let style_str: String = row.get(5)?;
        let style = Style::from_str(&style_str)
            .ok_or_else(|| anyhow::anyhow!("unknown style in store: {style_str}"))?;

        Ok(Snippet {
            id: row.get(0)?,
            title: row.get(1)?,
            code: row.get(2)?,
            linenos: linenos != 0,
            language,
            style,
            owner_id: row.get(6)?,
            owner_username: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    pub async fn list_snippets(&self) -> Result<Vec<Snippet>> {
        let query = r#"
            SELECT snippets.id, snippets.title, snippets.code, snippets.linenos,
                   snippets.language, snippets.style, snippets.owner_id, users.username,
                   snippets.created_at, snippets.updated_at
            FROM snippets
            JOIN users ON users.id = snippets.owner_id
            ORDER BY snippets.id
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut snippets = Vec::new();

        while let Some(row) = rows.next().await? {
            snippets.push(self.row_to_snippet(&row)?);
        }

        Ok(snippets)
    }

    pub async fn get_snippet(&self, id: i64) -> Result<Option<Snippet>> {
        let query = r#"
            SELECT snippets.id, snippets.title, snippets.code, snippets.linenos,
                   snippets.language, snippets.style, snippets.owner_id, users.username,
                   snippets.created_at, snippets.updated_at
            FROM snippets
            JOIN users ON users.id = snippets.owner_id
            WHERE snippets.id = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_snippet(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Insert a snippet owned by `owner_id`. The owner is bound here, once;
    /// no update path touches that column again.
    pub async fn create_snippet(&self, fields: &SnippetFields, owner_id: i64) -> Result<Snippet> {
        let now = Self::now();
        let query = r#"
            INSERT INTO snippets (title, code, linenos, language, style, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
        "#;

        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![
                    fields.title.as_str(),
                    fields.code.as_str(),
                    fields.linenos as i64,
                    fields.language.as_str(),
                    fields.style.as_str(),
                    owner_id,
                    now.as_str(),
                    now.as_str()
                ],
            )
            .await?;

        let id: i64 = if let Some(row) = rows.next().await? {
            row.get(0)?
        } else {
            anyhow::bail!("failed to create snippet")
        };

        match self.get_snippet(id).await? {
            Some(snippet) => Ok(snippet),
            None => anyhow::bail!("failed to reload snippet {id} after insert"),
        }
    }

    pub async fn update_snippet(&self, id: i64, fields: &SnippetFields) -> Result<Option<Snippet>> {
        let query = r#"
            UPDATE snippets
            SET title = ?, code = ?, linenos = ?, language = ?, style = ?, updated_at = ?
            WHERE id = ?
        "#;

        let affected = self
            .conn
            .execute(
                query,
                libsql::params![
                    fields.title.as_str(),
                    fields.code.as_str(),
                    fields.linenos as i64,
                    fields.language.as_str(),
                    fields.style.as_str(),
                    Self::now(),
                    id
                ],
            )
            .await?;

        if affected == 0 {
            return Ok(None);
        }

        self.get_snippet(id).await
    }

    pub async fn delete_snippet(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM snippets WHERE id = ?", libsql::params![id])
            .await?;
        Ok(affected > 0)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let mut rows = self
            .conn
            .query("SELECT id, username FROM users ORDER BY id", ())
            .await?;
        let mut users = Vec::new();

        while let Some(row) = rows.next().await? {
            users.push(User {
                id: row.get(0)?,
                username: row.get(1)?,
            });
        }

        Ok(users)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let mut rows = self
            .conn
            .query("SELECT id, username FROM users WHERE id = ?", libsql::params![id])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(User {
                id: row.get(0)?,
                username: row.get(1)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Reverse ownership lookup: the ids of every snippet owned by `user_id`.
    pub async fn snippet_ids_owned_by(&self, user_id: i64) -> Result<Vec<i64>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM snippets WHERE owner_id = ? ORDER BY id",
                libsql::params![user_id],
            )
            .await?;
        let mut ids = Vec::new();

        while let Some(row) = rows.next().await? {
            ids.push(row.get(0)?);
        }

        Ok(ids)
    }

    pub async fn find_user_by_token_digest(&self, digest: &str) -> Result<Option<User>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, username FROM users WHERE token_digest = ?",
                libsql::params![digest],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(User {
                id: row.get(0)?,
                username: row.get(1)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Insert or refresh a seeded account. Re-seeding an existing username
    /// only rotates its token digest.
    pub async fn ensure_user(&self, username: &str, token_digest: &str) -> Result<User> {
        let query = r#"
            INSERT INTO users (username, token_digest)
            VALUES (?, ?)
            ON CONFLICT(username) DO UPDATE SET token_digest = excluded.token_digest
        "#;
        self.conn
            .execute(query, libsql::params![username, token_digest])
            .await?;

        let mut rows = self
            .conn
            .query(
                "SELECT id, username FROM users WHERE username = ?",
                libsql::params![username],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
            })
        } else {
            anyhow::bail!("failed to ensure user: {}", username)
        }
    }
}
