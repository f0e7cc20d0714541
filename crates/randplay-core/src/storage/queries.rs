use super::models::ExtensionItem;
use super::sqlite::Database;
use crate::grants::AccessGrant;
use rusqlite::{params, Result};
use tracing::debug;

impl Database {
    // ── Access grants ────────────────────────────────────────────

    pub fn insert_grant(&self, grant: &AccessGrant) -> Result<()> {
        self.connection().execute(
            "INSERT INTO access_grant (path, token, created_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(path) DO UPDATE SET token = ?2, created_at = ?3",
            params![grant.path, grant.token, grant.created_at],
        )?;
        debug!("Stored grant for '{}'", grant.path);
        Ok(())
    }

    pub fn list_grants(&self) -> Result<Vec<AccessGrant>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT path, token, created_at FROM access_grant ORDER BY created_at, path")?;
        let grants = stmt
            .query_map([], |row| {
                Ok(AccessGrant {
                    path: row.get(0)?,
                    token: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(grants)
    }

    pub fn delete_grant(&self, path: &str) -> Result<()> {
        self.connection()
            .execute("DELETE FROM access_grant WHERE path = ?1", params![path])?;
        debug!("Deleted grant for '{}'", path);
        Ok(())
    }

    // ── Extension preferences ────────────────────────────────────

    pub fn insert_extension(&self, name: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO extension_pref (name, added_at) VALUES (?1, ?2) \
             ON CONFLICT(name) DO NOTHING",
            params![name, now],
        )?;
        Ok(())
    }

    pub fn list_extensions(&self) -> Result<Vec<ExtensionItem>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT name, added_at FROM extension_pref ORDER BY name")?;
        let items = stmt
            .query_map([], |row| {
                Ok(ExtensionItem {
                    name: row.get(0)?,
                    added_at: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(items)
    }

    pub fn delete_extension(&self, name: &str) -> Result<()> {
        self.connection()
            .execute("DELETE FROM extension_pref WHERE name = ?1", params![name])?;
        Ok(())
    }
}
