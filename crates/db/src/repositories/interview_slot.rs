use crate::models::DbInterviewSlot;
use chrono::{DateTime, Utc};
use eyre::Result;
use slotbook_core::models::InterviewSlot;
use sqlx::PgConnection;
use uuid::Uuid;

/// Key of the transaction-scoped advisory lock that serialises booking writes.
pub const SCHEDULE_LOCK_KEY: i64 = 0x534c_4f54_424f_4f4b;

pub async fn lock_schedule(conn: &mut PgConnection) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEDULE_LOCK_KEY)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn find_slot_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<DbInterviewSlot>> {
    let slot = sqlx::query_as::<_, DbInterviewSlot>(
        r#"
        SELECT id, application_id, start_time, end_time, duration_minutes, status,
               created_at, updated_at, deleted_at
        FROM interview_slots
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(slot)
}

pub async fn find_booked_overlapping(
    conn: &mut PgConnection,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Result<Vec<DbInterviewSlot>> {
    let slots = sqlx::query_as::<_, DbInterviewSlot>(
        r#"
        SELECT id, application_id, start_time, end_time, duration_minutes, status,
               created_at, updated_at, deleted_at
        FROM interview_slots
        WHERE status = 'BOOKED'
          AND deleted_at IS NULL
          AND start_time < $2
          AND end_time > $1
          AND ($3::uuid IS NULL OR id <> $3)
        ORDER BY start_time ASC
        "#,
    )
    .bind(start_time)
    .bind(end_time)
    .bind(exclude)
    .fetch_all(&mut *conn)
    .await?;

    Ok(slots)
}

pub async fn find_exact_slots(
    conn: &mut PgConnection,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<Vec<DbInterviewSlot>> {
    let slots = sqlx::query_as::<_, DbInterviewSlot>(
        r#"
        SELECT id, application_id, start_time, end_time, duration_minutes, status,
               created_at, updated_at, deleted_at
        FROM interview_slots
        WHERE start_time = $1
          AND end_time = $2
          AND deleted_at IS NULL
        ORDER BY created_at ASC
        "#,
    )
    .bind(start_time)
    .bind(end_time)
    .fetch_all(&mut *conn)
    .await?;

    Ok(slots)
}

pub async fn find_booked_for_application(
    conn: &mut PgConnection,
    application_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<Option<DbInterviewSlot>> {
    let slot = sqlx::query_as::<_, DbInterviewSlot>(
        r#"
        SELECT id, application_id, start_time, end_time, duration_minutes, status,
               created_at, updated_at, deleted_at
        FROM interview_slots
        WHERE application_id = $1
          AND status = 'BOOKED'
          AND deleted_at IS NULL
          AND ($2::uuid IS NULL OR id <> $2)
        LIMIT 1
        "#,
    )
    .bind(application_id)
    .bind(exclude)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(slot)
}

pub async fn get_slots_in_range(
    conn: &mut PgConnection,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<Vec<DbInterviewSlot>> {
    let slots = sqlx::query_as::<_, DbInterviewSlot>(
        r#"
        SELECT id, application_id, start_time, end_time, duration_minutes, status,
               created_at, updated_at, deleted_at
        FROM interview_slots
        WHERE deleted_at IS NULL
          AND start_time < $2
          AND end_time > $1
        ORDER BY start_time ASC
        "#,
    )
    .bind(start_time)
    .bind(end_time)
    .fetch_all(&mut *conn)
    .await?;

    Ok(slots)
}

pub async fn get_slots_by_application_id(
    conn: &mut PgConnection,
    application_id: Uuid,
) -> Result<Vec<DbInterviewSlot>> {
    let slots = sqlx::query_as::<_, DbInterviewSlot>(
        r#"
        SELECT id, application_id, start_time, end_time, duration_minutes, status,
               created_at, updated_at, deleted_at
        FROM interview_slots
        WHERE application_id = $1
          AND deleted_at IS NULL
        ORDER BY start_time ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(slots)
}

pub async fn create_slot(conn: &mut PgConnection, slot: &InterviewSlot) -> Result<DbInterviewSlot> {
    let created = sqlx::query_as::<_, DbInterviewSlot>(
        r#"
        INSERT INTO interview_slots
            (id, application_id, start_time, end_time, duration_minutes, status,
             created_at, updated_at, deleted_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, application_id, start_time, end_time, duration_minutes, status,
                  created_at, updated_at, deleted_at
        "#,
    )
    .bind(slot.id)
    .bind(slot.application_id)
    .bind(slot.start_time)
    .bind(slot.end_time)
    .bind(slot.duration_minutes)
    .bind(slot.status.as_str())
    .bind(slot.created_at)
    .bind(slot.updated_at)
    .bind(slot.deleted_at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(created)
}

pub async fn update_slot(
    conn: &mut PgConnection,
    slot: &InterviewSlot,
) -> Result<Option<DbInterviewSlot>> {
    let updated = sqlx::query_as::<_, DbInterviewSlot>(
        r#"
        UPDATE interview_slots
        SET status = $2, application_id = $3, updated_at = $4, deleted_at = $5
        WHERE id = $1
        RETURNING id, application_id, start_time, end_time, duration_minutes, status,
                  created_at, updated_at, deleted_at
        "#,
    )
    .bind(slot.id)
    .bind(slot.status.as_str())
    .bind(slot.application_id)
    .bind(slot.updated_at)
    .bind(slot.deleted_at)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(updated)
}

pub async fn soft_delete_requested_slots(
    conn: &mut PgConnection,
    application_id: Uuid,
    keep: Uuid,
    at: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE interview_slots
        SET deleted_at = $3, updated_at = $3
        WHERE application_id = $1
          AND id <> $2
          AND status = 'REQUESTED'
          AND deleted_at IS NULL
        "#,
    )
    .bind(application_id)
    .bind(keep)
    .bind(at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
