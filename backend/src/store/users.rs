use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use ticketdesk_common::Role;

use super::{format_ts, parse_ts, Store, StoreError};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str =
    "user_id, name, email, password, role, active_flag, registered_on, last_login, jwt_token";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    let registered_on: String = row.get(6)?;
    let last_login: Option<String> = row.get(7)?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role,
        is_active: row.get::<_, i32>(5)? == 1,
        registered_on: parse_ts(6, &registered_on)?,
        last_login: last_login.map(|raw| parse_ts(7, &raw)).transpose()?,
        session_token: row.get(8)?,
    })
}

impl Store {
    /// Insert a new active user. A duplicate email is reported as a conflict.
    pub fn insert_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            "INSERT INTO users (name, email, password, role, active_flag, registered_on)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![
                new_user.name,
                new_user.email,
                new_user.password_hash,
                new_user.role.as_str(),
                format_ts(&new_user.registered_on),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(StoreError::Conflict("Email already exists".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(User {
            id: conn.last_insert_rowid(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            is_active: true,
            registered_on: new_user.registered_on,
            last_login: None,
            session_token: None,
        })
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
                params![user_id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Persist the session token and last-login time after a successful login.
    pub fn record_login(
        &self,
        user_id: i64,
        token: &str,
        at: &DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE users SET jwt_token = ?1, last_login = ?2 WHERE user_id = ?3",
            params![token, format_ts(at), user_id],
        )?;
        Ok(())
    }

    /// Activate or deactivate a user. Returns false if the user does not exist.
    pub fn set_user_active(&self, user_id: i64, active: bool) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users SET active_flag = ?1 WHERE user_id = ?2",
            params![active as i32, user_id],
        )?;
        tracing::info!("User {} active flag set to {}", user_id, active);
        Ok(changed > 0)
    }
}
