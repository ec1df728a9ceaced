//! Mapping of persisted user rows to the domain entity

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::domain::{DomainError, Record, SqlValue, User, UserId};

const MAP_OPERATION: &str = "Failed to map user row";

/// Convert a `users` row (id, name, email, created_at, updated_at) into a `User`
///
/// Field contents are trusted. An error here means the row does not have
/// the persisted shape at all, which is a store integrity problem.
pub fn map_row_to_user(row: &Record) -> Result<User, DomainError> {
    Ok(User::restore(
        UserId::new(text_column(row, "id")?),
        text_column(row, "name")?,
        text_column(row, "email")?,
        timestamp_column(row, "created_at")?,
        timestamp_column(row, "updated_at")?,
    ))
}

/// Convert a stored timestamp representation into UTC
///
/// Accepts native timestamps (zone-less ones are read as UTC), RFC 3339 or
/// `YYYY-MM-DD HH:MM:SS[.f]` text, and epoch milliseconds.
pub fn to_timestamp(value: &SqlValue) -> Option<DateTime<Utc>> {
    match value {
        SqlValue::Timestamp(naive) => Some(naive.and_utc()),
        SqlValue::TimestampTz(ts) => Some(*ts),
        SqlValue::Text(text) => DateTime::parse_from_rfc3339(text)
            .map(|ts| ts.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        SqlValue::Int(millis) => DateTime::from_timestamp_millis(*millis),
        SqlValue::Null | SqlValue::Bool(_) => None,
    }
}

fn text_column(row: &Record, column: &str) -> Result<String, DomainError> {
    row.get(column)
        .and_then(SqlValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            DomainError::repository(MAP_OPERATION, format!("column '{}' missing or not text", column))
        })
}

fn timestamp_column(row: &Record, column: &str) -> Result<DateTime<Utc>, DomainError> {
    row.get(column).and_then(to_timestamp).ok_or_else(|| {
        DomainError::repository(
            MAP_OPERATION,
            format!("column '{}' missing or not a timestamp", column),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iso_row() -> Record {
        Record::new()
            .with("id", "test-uuid")
            .with("name", "Test User")
            .with("email", "test@example.com")
            .with("created_at", "2023-01-01T00:00:00.000Z")
            .with("updated_at", "2023-01-01T00:00:00.000Z")
    }

    #[test]
    fn test_maps_iso_text_row() {
        let user = map_row_to_user(&iso_row()).unwrap();
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(user.id().as_str(), "test-uuid");
        assert_eq!(user.name(), "Test User");
        assert_eq!(user.email(), "test@example.com");
        assert_eq!(user.created_at(), expected);
        assert_eq!(user.updated_at(), expected);
    }

    #[test]
    fn test_maps_native_timestamps() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let updated = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();

        let row = iso_row()
            .with("created_at", created.naive_utc())
            .with("updated_at", updated);

        let user = map_row_to_user(&row).unwrap();

        assert_eq!(user.created_at(), created);
        assert_eq!(user.updated_at(), updated);
    }

    #[test]
    fn test_to_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(
            to_timestamp(&SqlValue::from("2024-01-01 00:00:00")),
            Some(expected)
        );
        assert_eq!(
            to_timestamp(&SqlValue::from("2024-01-01T02:00:00+02:00")),
            Some(expected)
        );
        assert_eq!(
            to_timestamp(&SqlValue::Int(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(to_timestamp(&SqlValue::Null), None);
        assert_eq!(to_timestamp(&SqlValue::from("yesterday")), None);
    }

    #[test]
    fn test_malformed_row_is_repository_error() {
        let row = Record::new().with("id", "only-an-id");

        let err = map_row_to_user(&row).unwrap_err();

        assert!(matches!(err, DomainError::Repository { .. }));
        assert!(err.to_string().contains("'name'"));
    }
}
