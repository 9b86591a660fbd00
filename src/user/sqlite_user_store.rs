use crate::sqlite_column;
use crate::sqlite_persistence::{
    read_schema_version, Column, ForeignKey, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};
use crate::user::auth::{
    AuthToken, AuthTokenValue, CredentialsHasher, UserAuthCredentials,
    UsernamePasswordCredentials,
};
use crate::user::{UserAuthCredentialsStore, UserAuthTokenStore, UserStore};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, SystemTime},
};
use tracing::{debug, info, warn};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_user_handle", "handle")],
};
const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
            })
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[("idx_auth_token_value", "value")],
};
const USER_PASSWORD_CREDENTIALS_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
            })
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_tried", &SqlType::Integer),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[],
};

const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        AUTH_TOKEN_TABLE_V_0,
        USER_PASSWORD_CREDENTIALS_V_0,
    ],
}];

const NOW_SECONDS: &str = "cast(strftime('%s','now') as int)";

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref();
        let latest = VERSIONED_SCHEMAS
            .last()
            .context("No user db schema defined")?;

        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open user db {:?}", db_path))?
        } else {
            info!("Creating user db at {:?}", db_path);
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create user db {:?}", db_path))?;
            latest.create(&conn)?;
            conn
        };
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let version = read_schema_version(&conn)?;
        match VERSIONED_SCHEMAS.get(version) {
            Some(schema) => schema.validate(&conn)?,
            None => bail!("User db version {} is too new", version),
        }
        debug!("Opened user db {:?} at schema version {}", db_path, version);

        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves the connection itself usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(value.max(0) as u64)
}

fn auth_token_from_row(row: &Row) -> rusqlite::Result<AuthToken> {
    Ok(AuthToken {
        user_id: row.get(0)?,
        value: AuthTokenValue(row.get(1)?),
        created: system_time_from_column_result(row.get(2)?),
        last_used: row
            .get::<usize, Option<i64>>(3)?
            .map(system_time_from_column_result),
    })
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user_handle: &str) -> Result<usize> {
        let conn = self.conn();
        conn.execute(
            &format!("INSERT INTO {} (handle) VALUES (?1)", USER_TABLE_V_0.name),
            params![user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user_handle(&self, user_id: usize) -> Option<String> {
        self.conn()
            .query_row(
                &format!("SELECT handle FROM {} WHERE id = ?1", USER_TABLE_V_0.name),
                params![user_id],
                |row| row.get(0),
            )
            .ok()
    }

    fn get_all_user_handles(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT handle FROM {} ORDER BY id",
            USER_TABLE_V_0.name
        ))?;
        let handles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(handles)
    }

    fn get_user_id(&self, user_handle: &str) -> Option<usize> {
        self.conn()
            .query_row(
                &format!("SELECT id FROM {} WHERE handle = ?1", USER_TABLE_V_0.name),
                params![user_handle],
                |row| row.get::<_, i64>(0),
            )
            .ok()
            .map(|id| id as usize)
    }
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, value: &AuthTokenValue) -> Option<AuthToken> {
        let conn = self.conn();
        match conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                auth_token_from_row,
            )
            .optional()
        {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read auth token: {}", e);
                None
            }
        }
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Option<AuthToken> {
        let token = self.get_user_auth_token(token)?;
        match self.conn().execute(
            "DELETE FROM auth_token WHERE value = ?1",
            params![token.value.0],
        ) {
            Ok(_) => Some(token),
            Err(e) => {
                warn!("Failed to delete auth token: {}", e);
                None
            }
        }
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        self.conn().execute(
            &format!(
                "UPDATE auth_token SET last_used = {} WHERE value = ?1",
                NOW_SECONDS
            ),
            params![token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO auth_token (value, user_id) VALUES (?1, ?2)",
                params![token.value.0, token.user_id],
            )
            .with_context(|| format!("Failed to store auth token for user {}", token.user_id))?;
        Ok(())
    }

    fn get_all_user_auth_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, value, created, last_used FROM auth_token \
             WHERE user_id = (SELECT id FROM user WHERE handle = ?1)",
        )?;
        let tokens = stmt
            .query_map(params![user_handle], auth_token_from_row)?
            .collect::<Result<Vec<AuthToken>, _>>()?;
        Ok(tokens)
    }
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_user_auth_credentials(&self, user_handle: &str) -> Option<UserAuthCredentials> {
        let user_id = self.get_user_id(user_handle)?;
        let conn = self.conn();

        let password_credentials = conn
            .query_row(
                "SELECT user_id, salt, hash, hasher, created, last_tried, last_used \
                 FROM user_password_credentials WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let hasher_name: String = row.get(3)?;
                    let hasher = CredentialsHasher::from_str(&hasher_name).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            3,
                            rusqlite::types::Type::Text,
                            e.into(),
                        )
                    })?;
                    Ok(UsernamePasswordCredentials {
                        user_id: row.get(0)?,
                        salt: row.get(1)?,
                        hash: row.get(2)?,
                        hasher,
                        created: system_time_from_column_result(row.get(4)?),
                        last_tried: row
                            .get::<usize, Option<i64>>(5)?
                            .map(system_time_from_column_result),
                        last_used: row
                            .get::<usize, Option<i64>>(6)?
                            .map(system_time_from_column_result),
                    })
                },
            )
            .optional();

        let username_password = match password_credentials {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("Failed to read password credentials of {}: {}", user_handle, e);
                None
            }
        };

        Some(UserAuthCredentials {
            user_id,
            username_password,
        })
    }

    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()> {
        let conn = self.conn();
        let user_id = credentials.user_id;
        match credentials.username_password.as_ref() {
            Some(password_credentials) => {
                let updated = conn.execute(
                    "UPDATE user_password_credentials SET salt = ?1, hash = ?2, hasher = ?3 WHERE user_id = ?4",
                    params![
                        password_credentials.salt,
                        password_credentials.hash,
                        password_credentials.hasher.to_string(),
                        user_id
                    ],
                )?;
                if updated == 0 {
                    conn.execute(
                        "INSERT INTO user_password_credentials (salt, hash, hasher, user_id) VALUES (?1, ?2, ?3, ?4)",
                        params![
                            password_credentials.salt,
                            password_credentials.hash,
                            password_credentials.hasher.to_string(),
                            user_id
                        ],
                    )
                    .with_context(|| format!("Failed to store credentials of user {}", user_id))?;
                }
            }
            None => {
                conn.execute(
                    "DELETE FROM user_password_credentials WHERE user_id = ?1",
                    params![user_id],
                )?;
            }
        };
        Ok(())
    }

    fn touch_password_credentials(&self, user_id: usize, succeeded: bool) -> Result<()> {
        let column = if succeeded { "last_used" } else { "last_tried" };
        self.conn().execute(
            &format!(
                "UPDATE user_password_credentials SET {} = {} WHERE user_id = ?1",
                column, NOW_SECONDS
            ),
            params![user_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tmp_store() -> (SqliteUserStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let temp_file_path = temp_dir.path().join("test.db");
        let store = SqliteUserStore::new(&temp_file_path).unwrap();
        (store, temp_dir)
    }

    fn token_for(user_id: usize) -> AuthToken {
        AuthToken {
            user_id,
            created: SystemTime::now(),
            last_used: None,
            value: AuthTokenValue::generate(),
        }
    }

    #[test]
    fn test_create_user() {
        let (store, _temp_dir) = create_tmp_store();

        let user_id = store.create_user("test_user").unwrap();
        assert_eq!(user_id, 1);
        let second_id = store.create_user("other_user").unwrap();
        assert_eq!(second_id, 2);

        assert!(store.create_user("test_user").is_err());
        assert_eq!(store.get_user_id("other_user"), Some(2));
        assert_eq!(store.get_user_handle(1).as_deref(), Some("test_user"));
        assert_eq!(
            store.get_all_user_handles().unwrap(),
            vec!["test_user".to_string(), "other_user".to_string()]
        );
        assert!(store.get_user_id("nobody").is_none());
    }

    #[test]
    fn reopens_existing_db() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("user.db");
        {
            let store = SqliteUserStore::new(&path).unwrap();
            store.create_user("persisted").unwrap();
        }
        let store = SqliteUserStore::new(&path).unwrap();
        assert_eq!(store.get_user_id("persisted"), Some(1));
    }

    #[test]
    fn rejects_foreign_db() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("other.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("CREATE TABLE something (id INTEGER)", []).unwrap();
        }
        assert!(SqliteUserStore::new(&path).is_err());
    }

    #[test]
    fn handles_auth_tokens() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("test_user").unwrap();

        let token = token_for(user_id);
        store.add_user_auth_token(token.clone()).unwrap();

        let loaded = store.get_user_auth_token(&token.value).unwrap();
        assert_eq!(loaded.user_id, user_id);
        assert!(loaded.last_used.is_none());

        store
            .update_user_auth_token_last_used_timestamp(&token.value)
            .unwrap();
        assert!(store
            .get_user_auth_token(&token.value)
            .unwrap()
            .last_used
            .is_some());

        assert_eq!(store.get_all_user_auth_tokens("test_user").unwrap().len(), 1);

        let deleted = store.delete_user_auth_token(&token.value).unwrap();
        assert_eq!(deleted.value, token.value);
        assert!(store.get_user_auth_token(&token.value).is_none());
        assert!(store.delete_user_auth_token(&token.value).is_none());
    }

    #[test]
    fn token_requires_existing_user() {
        let (store, _temp_dir) = create_tmp_store();
        assert!(store.add_user_auth_token(token_for(42)).is_err());
    }

    #[test]
    fn handles_password_credentials() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("test_user").unwrap();

        let credentials = store.get_user_auth_credentials("test_user").unwrap();
        assert!(credentials.username_password.is_none());

        let password = UsernamePasswordCredentials::new_hashed(user_id, "first").unwrap();
        store
            .update_user_auth_credentials(UserAuthCredentials {
                user_id,
                username_password: Some(password),
            })
            .unwrap();

        let stored = store
            .get_user_auth_credentials("test_user")
            .unwrap()
            .username_password
            .unwrap();
        assert!(stored.verify("first").unwrap());

        let password = UsernamePasswordCredentials::new_hashed(user_id, "second").unwrap();
        store
            .update_user_auth_credentials(UserAuthCredentials {
                user_id,
                username_password: Some(password),
            })
            .unwrap();
        let stored = store
            .get_user_auth_credentials("test_user")
            .unwrap()
            .username_password
            .unwrap();
        assert!(!stored.verify("first").unwrap());
        assert!(stored.verify("second").unwrap());

        store.touch_password_credentials(user_id, true).unwrap();
        let stored = store
            .get_user_auth_credentials("test_user")
            .unwrap()
            .username_password
            .unwrap();
        assert!(stored.last_used.is_some());
        assert!(stored.last_tried.is_none());

        store
            .update_user_auth_credentials(UserAuthCredentials {
                user_id,
                username_password: None,
            })
            .unwrap();
        assert!(store
            .get_user_auth_credentials("test_user")
            .unwrap()
            .username_password
            .is_none());
    }
}
