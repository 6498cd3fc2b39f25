use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
";

pub const MODEL_STATE_KEY: &str = "model_state";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("loto90.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn save_json<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .with_context(|| format!("Échec de la sérialisation de '{}'", key))?;
    conn.execute(
        "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, json, Utc::now().to_rfc3339()],
    ).with_context(|| format!("Échec de l'écriture de '{}'", key))?;
    Ok(())
}

/// `Ok(None)` si la clé est absente ; une valeur illisible est une erreur.
pub fn load_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()
        .with_context(|| format!("Échec de la lecture de '{}'", key))?;

    match raw {
        Some(json) => {
            let value = serde_json::from_str(&json)
                .with_context(|| format!("Valeur corrompue pour '{}'", key))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn delete_key(conn: &Connection, key: &str) -> Result<bool> {
    let changed = conn
        .execute("DELETE FROM kv WHERE key = ?1", [key])
        .with_context(|| format!("Échec de la suppression de '{}'", key))?;
    Ok(changed > 0)
}
