use crate::errors::{SchedulingError, SchedulingResult};

/// Slots start and end on quarter-hour boundaries.
pub const SLOT_GRANULARITY_MINUTES: i32 = 15;

pub const DEFAULT_SLOT_DURATION_MINUTES: i32 = 30;

pub fn validate_duration(duration_minutes: i32) -> SchedulingResult<()> {
    if duration_minutes < SLOT_GRANULARITY_MINUTES
        || duration_minutes % SLOT_GRANULARITY_MINUTES != 0
    {
        return Err(SchedulingError::Validation(format!(
            "Duration must be a positive multiple of {} minutes, got {}",
            SLOT_GRANULARITY_MINUTES, duration_minutes
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(15)]
    #[case(30)]
    #[case(45)]
    #[case(60)]
    #[case(240)]
    fn accepts_multiples_of_fifteen(#[case] minutes: i32) {
        assert!(validate_duration(minutes).is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(-15)]
    #[case(-30)]
    #[case(10)]
    #[case(20)]
    #[case(50)]
    fn rejects_everything_else(#[case] minutes: i32) {
        assert!(matches!(
            validate_duration(minutes),
            Err(SchedulingError::Validation(_))
        ));
    }
}
