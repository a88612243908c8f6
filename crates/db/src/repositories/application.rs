use crate::models::DbApplication;
use chrono::{DateTime, Utc};
use eyre::Result;
use slotbook_core::models::{Application, ApplicationStatus};
use sqlx::PgConnection;
use uuid::Uuid;

pub async fn get_application_by_id(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<DbApplication>> {
    tracing::debug!("Getting application by id: {}", id);

    let application = sqlx::query_as::<_, DbApplication>(
        r#"
        SELECT id, status, created_at, updated_at
        FROM applications
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(application)
}

pub async fn create_application(
    conn: &mut PgConnection,
    application: &Application,
) -> Result<DbApplication> {
    let created = sqlx::query_as::<_, DbApplication>(
        r#"
        INSERT INTO applications (id, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, status, created_at, updated_at
        "#,
    )
    .bind(application.id)
    .bind(application.status.as_str())
    .bind(application.created_at)
    .bind(application.updated_at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(created)
}

pub async fn update_application_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: ApplicationStatus,
    at: DateTime<Utc>,
) -> Result<Option<DbApplication>> {
    tracing::debug!("Updating application status: id={}, status={}", id, status);

    let updated = sqlx::query_as::<_, DbApplication>(
        r#"
        UPDATE applications
        SET status = $2, updated_at = $3
        WHERE id = $1
        RETURNING id, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(at)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(updated)
}
