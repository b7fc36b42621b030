//! Registration Store
//!
//! Teachers and students are created lazily the first time an operation
//! references their email. Every get-or-create is a single upsert statement,
//! so concurrent requests for the same email converge on one row.

use crate::{
    config::DatabaseConfig,
    error::{RegistryError, Result},
    types::{Student, Teacher},
    validation::{extract_mentions, validate_email, validate_emails},
};
use sqlx::{
    QueryBuilder, Sqlite, SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{collections::HashSet, str::FromStr};
use tracing::{debug, info};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS teacher (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS student (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        suspended BOOLEAN NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS registration (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        teacher_id INTEGER NOT NULL REFERENCES teacher(id) ON DELETE CASCADE,
        student_id INTEGER NOT NULL REFERENCES student(id) ON DELETE CASCADE,
        UNIQUE (teacher_id, student_id)
    )",
];

/// Registration store backed by a SQLite pool
///
/// The pool is the only shared state; each operation acquires a connection
/// (or a transaction) for its own duration.
#[derive(Clone)]
pub struct Registry {
    pool: SqlitePool,
}

impl Registry {
    /// Connect to the configured database and bootstrap the schema
    ///
    /// An in-memory database lives only as long as its connection, so for
    /// such URLs the pool is pinned to one connection that never expires.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        info!("Connected to database {}", config.url);

        Ok(Self::from_pool(pool).await?)
    }

    /// Wrap an existing pool, creating the tables if they are missing
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    /// Look up a teacher by email
    pub async fn find_teacher(&self, email: &str) -> Result<Option<Teacher>> {
        validate_email(email)?;
        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT id, email FROM teacher WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(teacher)
    }

    /// Look up a student by email
    pub async fn find_student(&self, email: &str) -> Result<Option<Student>> {
        validate_email(email)?;
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, email, suspended FROM student WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    /// Register each student under the teacher
    ///
    /// Runs in one transaction: either every teacher, student and edge row is
    /// written, or none is. Re-registering an existing pair is a no-op.
    pub async fn register(&self, teacher_email: &str, student_emails: &[String]) -> Result<()> {
        validate_email(teacher_email)?;
        validate_emails(student_emails)?;

        let mut tx = self.pool.begin().await?;

        let teacher = upsert_teacher(&mut tx, teacher_email).await?;
        for email in student_emails {
            let student = upsert_student(&mut tx, email).await?;
            sqlx::query(
                "INSERT INTO registration (teacher_id, student_id) VALUES (?, ?)
                 ON CONFLICT (teacher_id, student_id) DO NOTHING",
            )
            .bind(teacher.id)
            .bind(student.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            "Registered {} student(s) under {}",
            student_emails.len(),
            teacher_email
        );
        Ok(())
    }

    /// Students registered to every one of the given teachers
    ///
    /// Duplicate teacher emails collapse. Fails with `NotFound` on the first
    /// teacher that does not exist, before the intersection is computed.
    pub async fn common_students(&self, teacher_emails: &[String]) -> Result<Vec<String>> {
        validate_emails(teacher_emails)?;

        let mut seen = HashSet::new();
        let teachers: Vec<&str> = teacher_emails
            .iter()
            .map(String::as_str)
            .filter(|email| seen.insert(*email))
            .collect();

        let mut query = QueryBuilder::<Sqlite>::new("SELECT email FROM teacher WHERE email IN ");
        push_email_list(&mut query, &teachers);
        let known: HashSet<String> = query
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();

        if let Some(missing) = teachers.iter().find(|email| !known.contains(**email)) {
            return Err(RegistryError::NotFound(format!("teacher {} not found", missing)));
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT s.email FROM student s
             JOIN registration r ON r.student_id = s.id
             JOIN teacher t ON t.id = r.teacher_id
             WHERE t.email IN ",
        );
        push_email_list(&mut query, &teachers);
        query.push(" GROUP BY s.id, s.email HAVING COUNT(DISTINCT t.id) = ");
        query.push_bind(teachers.len() as i64);
        query.push(" ORDER BY s.id");

        let students = query
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?;
        debug!("{} common student(s) across {} teacher(s)", students.len(), teachers.len());
        Ok(students)
    }

    /// Mark a student as suspended; suspending twice is not an error
    pub async fn suspend(&self, student_email: &str) -> Result<()> {
        validate_email(student_email)?;

        let result = sqlx::query("UPDATE student SET suspended = 1 WHERE email = ?")
            .bind(student_email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::NotFound(format!(
                "student {} not found",
                student_email
            )));
        }

        info!("Suspended student {}", student_email);
        Ok(())
    }

    /// Recipients of a notification from `teacher_email`
    ///
    /// Registered non-suspended students, followed by any `@mentioned`
    /// student that is not suspended. Mentioned students that do not exist
    /// yet are created (unsuspended) and therefore always included. Each
    /// creation commits on its own; there is no rollback across mentions.
    pub async fn retrieve_for_notifications(
        &self,
        teacher_email: &str,
        notification: &str,
    ) -> Result<Vec<String>> {
        let teacher = self.find_teacher(teacher_email).await?.ok_or_else(|| {
            RegistryError::NotFound(format!("teacher {} not found", teacher_email))
        })?;

        let registered = sqlx::query_scalar::<_, String>(
            "SELECT s.email FROM student s
             JOIN registration r ON r.student_id = s.id
             WHERE r.teacher_id = ? AND s.suspended = 0
             ORDER BY r.id",
        )
        .bind(teacher.id)
        .fetch_all(&self.pool)
        .await?;

        let mut mentioned = Vec::new();
        for email in extract_mentions(notification) {
            let mut conn = self.pool.acquire().await?;
            let student = upsert_student(&mut conn, &email).await?;
            if !student.suspended {
                mentioned.push(student.email);
            }
        }

        let mut seen = HashSet::new();
        let recipients: Vec<String> = registered
            .into_iter()
            .chain(mentioned)
            .filter(|email| seen.insert(email.clone()))
            .collect();

        debug!(
            "{} recipient(s) for notification from {}",
            recipients.len(),
            teacher_email
        );
        Ok(recipients)
    }
}

/// Appends `(?, ?, ...)` binding each email
fn push_email_list<'args>(query: &mut QueryBuilder<'args, Sqlite>, emails: &[&'args str]) {
    query.push("(");
    let mut separated = query.separated(", ");
    for email in emails {
        separated.push_bind(*email);
    }
    separated.push_unseparated(")");
}

async fn upsert_teacher(conn: &mut SqliteConnection, email: &str) -> Result<Teacher> {
    let teacher = sqlx::query_as::<_, Teacher>(
        "INSERT INTO teacher (email) VALUES (?)
         ON CONFLICT (email) DO UPDATE SET email = excluded.email
         RETURNING id, email",
    )
    .bind(email)
    .fetch_one(conn)
    .await?;
    Ok(teacher)
}

async fn upsert_student(conn: &mut SqliteConnection, email: &str) -> Result<Student> {
    let student = sqlx::query_as::<_, Student>(
        "INSERT INTO student (email) VALUES (?)
         ON CONFLICT (email) DO UPDATE SET email = excluded.email
         RETURNING id, email, suspended",
    )
    .bind(email)
    .fetch_one(conn)
    .await?;
    Ok(student)
}
