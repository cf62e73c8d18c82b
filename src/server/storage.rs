//! Parameterized queries for users, newsletter subscriptions and contact messages.
//!
//! Every statement binds its inputs with `$n` placeholders; nothing here builds
//! SQL from request data.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// A full `users` row, as stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl User {
    fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password: row.get("password"),
        }
    }
}

/// The user fields shown on the dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct ContactMessage {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

pub(crate) fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => {
            db_err.code().is_some_and(|code| code == "23505")
        }
        _ => false,
    }
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let query = "SELECT id, name, email, password FROM users WHERE email = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    Ok(row.as_ref().map(User::from_row))
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserDetails>> {
    let query = "SELECT id, name, email FROM users WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by id")?;

    Ok(row.map(|row| UserDetails {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }))
}

/// Insert a user and return the stored row.
///
/// A duplicate email surfaces as a unique violation; see [`is_unique_violation`].
pub async fn insert_user(pool: &PgPool, name: &str, email: &str, password_hash: &str) -> Result<User> {
    let query = r"
        INSERT INTO users (name, email, password)
        VALUES ($1, $2, $3)
        RETURNING id, name, email, password
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert user")?;

    Ok(User::from_row(&row))
}

/// Replace the password hash for `email`, returning the number of rows touched.
pub async fn update_password(pool: &PgPool, email: &str, password_hash: &str) -> Result<u64> {
    let query = "UPDATE users SET password = $1 WHERE email = $2";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(password_hash)
        .bind(email)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password")?;

    Ok(result.rows_affected())
}

pub async fn insert_subscription(pool: &PgPool, email: &str) -> Result<()> {
    let query = "INSERT INTO newsletter (email) VALUES ($1)";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert newsletter subscription")?;

    Ok(())
}

pub async fn insert_contact_message(pool: &PgPool, message: &ContactMessage) -> Result<()> {
    let query = r"
        INSERT INTO faq (name, phone, email, subject, message)
        VALUES ($1, $2, $3, $4, $5)
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(&message.name)
        .bind(&message.phone)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert contact message")?;

    Ok(())
}
