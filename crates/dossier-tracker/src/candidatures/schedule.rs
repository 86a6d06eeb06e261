use chrono::{DateTime, Duration, Utc};

/// How long before a deadline reminders go out.
pub const REMINDER_OFFSETS_DAYS: [i64; 2] = [7, 1];

/// Reminder send times for a deadline, seen from `now`.
///
/// Past deadlines get nothing. Offsets that already elapsed are dropped; when
/// all of them did, a single reminder is due immediately unless the deadline
/// was `already_reminded`.
pub fn reminder_times(
    due_at: DateTime<Utc>,
    now: DateTime<Utc>,
    already_reminded: bool,
) -> Vec<DateTime<Utc>> {
    if due_at <= now {
        return Vec::new();
    }

    let times: Vec<DateTime<Utc>> = REMINDER_OFFSETS_DAYS
        .iter()
        .map(|days| due_at - Duration::days(*days))
        .filter(|send_at| *send_at > now)
        .collect();

    if times.is_empty() && !already_reminded {
        vec![now]
    } else {
        times
    }
}
