use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Idempotent schema statements, applied in order.
///
/// `no_overlapping_bookings` and `idx_interview_slots_one_booking_per_application`
/// back the scheduler's own checks: a racing writer that slips past them hits
/// a constraint violation instead of double-booking.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id UUID PRIMARY KEY,
        status VARCHAR(32) NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interview_slots (
        id UUID PRIMARY KEY,
        application_id UUID NULL REFERENCES applications(id),
        start_time TIMESTAMP WITH TIME ZONE NOT NULL,
        end_time TIMESTAMP WITH TIME ZONE NOT NULL,
        duration_minutes INTEGER NOT NULL,
        status VARCHAR(16) NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMP WITH TIME ZONE NULL,
        CONSTRAINT valid_time_range CHECK (end_time > start_time),
        CONSTRAINT valid_duration CHECK (
            duration_minutes > 0
            AND duration_minutes % 15 = 0
            AND end_time - start_time = make_interval(mins => duration_minutes)
        ),
        CONSTRAINT valid_status CHECK (status IN ('AVAILABLE', 'REQUESTED', 'BOOKED')),
        CONSTRAINT no_overlapping_bookings EXCLUDE USING gist (
            tstzrange(start_time, end_time, '[)') WITH &&
        ) WHERE (status = 'BOOKED' AND deleted_at IS NULL)
    );
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_interview_slots_one_booking_per_application
        ON interview_slots(application_id)
        WHERE status = 'BOOKED' AND deleted_at IS NULL;
    "#,
    "CREATE INDEX IF NOT EXISTS idx_interview_slots_application_id ON interview_slots(application_id);",
    "CREATE INDEX IF NOT EXISTS idx_interview_slots_start_time ON interview_slots(start_time);",
    "CREATE INDEX IF NOT EXISTS idx_interview_slots_end_time ON interview_slots(end_time);",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
