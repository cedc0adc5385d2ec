//! User use cases.

use crate::error::{is_unique_violation, AppError};
use crate::infra::{get_connection, initialize_schema, DbPool};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;

const SEED_USERNAME: &str = "bob";
const SEED_EMAIL: &str = "bob@mail.com";
const SEED_PASSWORD: &str = "bobpass";

const SELECT_USER: &str = "SELECT id, username, email, password FROM users";

#[derive(Debug, Deserialize)]
pub struct UserCreateReq {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Display for UserDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} username='{}' email='{}' password='{}'",
            self.id, self.username, self.email, self.password
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct UserEmailChangeReq {
    pub username: String,
    pub new_email: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserPageReq {
    pub limit: u32,
    pub offset: u32,
}

impl Default for UserPageReq {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum UserCreateOutcome {
    Created(UserDto),
    /// Username or email already belongs to another row; nothing was written.
    Taken,
}

#[derive(Debug, PartialEq, Eq)]
pub enum EmailChangeOutcome {
    Updated(UserDto),
    NotFound,
    /// New email already belongs to another row; nothing was written.
    Taken,
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserDto> {
    Ok(UserDto {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
    })
}

/// Wipe the database, recreate the schema and seed the default user.
pub fn db_initialize(pool: &DbPool) -> Result<UserDto, AppError> {
    let mut conn = get_connection(pool);
    initialize_schema(&mut conn)?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
        params![SEED_USERNAME, SEED_EMAIL, SEED_PASSWORD],
    )?;
    let seed = UserDto {
        id: tx.last_insert_rowid(),
        username: SEED_USERNAME.to_string(),
        email: SEED_EMAIL.to_string(),
        password: SEED_PASSWORD.to_string(),
    };
    tx.commit()?;
    log::info!("database initialized with seed user {}", seed.username);
    Ok(seed)
}

pub fn user_get(pool: &DbPool, username: &str) -> Result<Option<UserDto>, AppError> {
    log::debug!("user_get {username}");
    let conn = get_connection(pool);
    let user = conn
        .query_row(
            &format!("{SELECT_USER} WHERE username = ?1 ORDER BY id LIMIT 1"),
            [username],
            map_user,
        )
        .optional()?;
    Ok(user)
}

pub fn user_list(pool: &DbPool) -> Result<Vec<UserDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!("{SELECT_USER} ORDER BY id"))?;
    let rows = stmt.query_map([], map_user)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    log::debug!("user_list returned {} rows", out.len());
    Ok(out)
}

/// Escape LIKE wildcards so `query` only matches literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match on username or email.
pub fn user_search(pool: &DbPool, query: &str) -> Result<Vec<UserDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!(
        "{SELECT_USER} WHERE username LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\' ORDER BY id"
    ))?;
    let rows = stmt.query_map([like_pattern(query)], map_user)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    log::debug!("user_search {query:?} matched {} rows", out.len());
    Ok(out)
}

/// Skip `offset` rows, then return up to `limit`, ascending by id.
pub fn user_list_page(pool: &DbPool, req: UserPageReq) -> Result<Vec<UserDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&format!("{SELECT_USER} ORDER BY id LIMIT ?1 OFFSET ?2"))?;
    let rows = stmt.query_map(
        params![i64::from(req.limit), i64::from(req.offset)],
        map_user,
    )?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn user_create(pool: &DbPool, req: UserCreateReq) -> Result<UserCreateOutcome, AppError> {
    let mut conn = get_connection(pool);
    let tx = conn.transaction()?;
    let inserted = tx.execute(
        "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
        params![&req.username, &req.email, &req.password],
    );
    match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            tx.rollback()?;
            log::warn!("user_create rejected, username or email taken: {e}");
            return Ok(UserCreateOutcome::Taken);
        }
        Err(e) => return Err(e.into()),
    }
    let id = tx.last_insert_rowid();
    tx.commit()?;

    log::debug!("user_create {} -> id {id}", req.username);
    Ok(UserCreateOutcome::Created(UserDto {
        id,
        username: req.username,
        email: req.email,
        password: req.password,
    }))
}

pub fn user_change_email(
    pool: &DbPool,
    req: UserEmailChangeReq,
) -> Result<EmailChangeOutcome, AppError> {
    let mut conn = get_connection(pool);
    let tx = conn.transaction()?;
    let Some(mut user) = tx
        .query_row(
            &format!("{SELECT_USER} WHERE username = ?1 ORDER BY id LIMIT 1"),
            [&req.username],
            map_user,
        )
        .optional()?
    else {
        return Ok(EmailChangeOutcome::NotFound);
    };

    let updated = tx.execute(
        "UPDATE users SET email = ?1 WHERE id = ?2",
        params![&req.new_email, user.id],
    );
    match updated {
        Ok(_) => {}
        // A duplicate email is reported like a duplicate on create instead of
        // failing the command.
        Err(e) if is_unique_violation(&e) => {
            tx.rollback()?;
            log::warn!("user_change_email rejected for {}: {e}", req.username);
            return Ok(EmailChangeOutcome::Taken);
        }
        Err(e) => return Err(e.into()),
    }
    tx.commit()?;

    user.email = req.new_email;
    log::debug!("user_change_email {} -> {}", user.username, user.email);
    Ok(EmailChangeOutcome::Updated(user))
}

/// Delete by exact username, returning the removed row.
pub fn user_delete(pool: &DbPool, username: &str) -> Result<Option<UserDto>, AppError> {
    let mut conn = get_connection(pool);
    let tx = conn.transaction()?;
    let Some(user) = tx
        .query_row(
            &format!("{SELECT_USER} WHERE username = ?1 ORDER BY id LIMIT 1"),
            [username],
            map_user,
        )
        .optional()?
    else {
        return Ok(None);
    };
    tx.execute("DELETE FROM users WHERE id = ?1", [user.id])?;
    tx.commit()?;
    log::debug!("user_delete {username} (id {})", user.id);
    Ok(Some(user))
}
