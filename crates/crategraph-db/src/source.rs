//! Streaming row reader.

use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crategraph_core::{EntityDescriptor, EntityKind, NaturalKey, SourceRow};

use crate::client::{DbError, DbResult, PgSource};

/// A source of rows for one entity kind.
///
/// The stream is lazy and finite, and is consumed once: traversing again
/// means calling `rows` again, which re-runs the query.
pub trait RowSource: Send {
    fn rows(&mut self, kind: EntityKind) -> BoxStream<'_, DbResult<SourceRow>>;
}

impl RowSource for PgSource {
    fn rows(&mut self, kind: EntityKind) -> BoxStream<'_, DbResult<SourceRow>> {
        let descriptor = kind.descriptor();
        sqlx::query(descriptor.read_sql)
            .fetch(&mut self.conn)
            .map(move |row| decode_row(descriptor, &row?))
            .boxed()
    }
}

/// Decode key columns and the timestamp named by the descriptor.
fn decode_row(descriptor: &EntityDescriptor, row: &PgRow) -> DbResult<SourceRow> {
    let mut fields = Vec::with_capacity(descriptor.key_fields.len());
    for &field in descriptor.key_fields {
        let value: String = row.try_get(field).map_err(|source| DbError::Decode {
            column: field.to_string(),
            source,
        })?;
        fields.push((field, value));
    }

    let column = descriptor.property;
    timestamped_row(
        NaturalKey::new(fields),
        column,
        row.try_get::<DateTime<Utc>, _>(column),
        || row.try_get::<NaiveDateTime, _>(column),
    )
}

/// Attach the row's timestamp: `timestamptz` as-is, else plain `timestamp` read as UTC.
///
/// When neither decodes, both errors are reported.
fn timestamped_row<F>(
    key: NaturalKey,
    column: &str,
    aware: Result<DateTime<Utc>, sqlx::Error>,
    naive: F,
) -> DbResult<SourceRow>
where
    F: FnOnce() -> Result<NaiveDateTime, sqlx::Error>,
{
    match aware {
        Ok(created_at) => Ok(SourceRow::new(key, created_at)),
        Err(aware) => match naive() {
            Ok(created_at) => Ok(SourceRow::from_naive(key, created_at)),
            Err(naive) => Err(DbError::Timestamp {
                column: column.to_string(),
                aware,
                naive,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn naive_ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 2, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 15, 123_456)
            .unwrap()
    }

    fn mismatch(expected: &str) -> sqlx::Error {
        sqlx::Error::Decode(format!("column is not {expected}").into())
    }

    #[test]
    fn test_timestamptz_used_as_is() {
        let instant = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let row = timestamped_row(NaturalKey::crate_name("serde"), "created_at", Ok(instant), || {
            panic!("naive fallback must not run for timestamptz")
        })
        .unwrap();

        assert_eq!(row.created_at, instant);
        assert_eq!(row.created_at_param(), "2020-01-01T00:00:00.000000Z");
    }

    #[test]
    fn test_naive_timestamp_read_as_utc() {
        let row = timestamped_row(
            NaturalKey::version("serde", "1.0.0"),
            "created_at",
            Err(mismatch("timestamptz")),
            || Ok(naive_ts()),
        )
        .unwrap();

        assert_eq!(row.created_at, Utc.from_utc_datetime(&naive_ts()));
        assert_eq!(row.created_at_param(), "2020-02-01T12:30:15.123456Z");
        assert_eq!(row.key, NaturalKey::version("serde", "1.0.0"));
    }

    #[test]
    fn test_undecodable_timestamp_reports_both_errors() {
        let err = timestamped_row(
            NaturalKey::crate_name("serde"),
            "created_at",
            Err(sqlx::Error::Decode("unexpected null".into())),
            || Err(mismatch("timestamp")),
        )
        .unwrap_err();

        assert!(matches!(err, DbError::Timestamp { ref column, .. } if column == "created_at"));
        let message = err.to_string();
        assert!(message.contains("unexpected null"), "{message}");
        assert!(message.contains("column is not timestamp"), "{message}");
    }
}
