use std::path::Path;

use rentroll_store::models::{RentRollRow, UnitRecord, UnitStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::parsers::RentRollJsonlParser;

use super::{ControlError, RentRollControlPlane};

/// Summary of a JSONL bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonlIngestReport {
    pub record_count: usize,
    pub occupied_count: usize,
    pub vacant_count: usize,
}

impl RentRollControlPlane {
    /// Parses a JSONL export and upserts every record keyed by `unit`.
    ///
    /// The batch is all-or-nothing: a malformed line or an invalid record leaves
    /// the table untouched.
    ///
    /// # Errors
    /// Returns `ControlError::Parse` for malformed lines and `ControlError::Store`
    /// for integrity violations or store failures.
    pub fn ingest_jsonl(&self, input: &str) -> Result<JsonlIngestReport, ControlError> {
        let rows = RentRollJsonlParser::parse(input)?;
        self.ingest_rows(rows)
    }

    /// Reads a JSONL export from disk and ingests it.
    ///
    /// # Errors
    /// Returns `ControlError::Io` if the file cannot be read, otherwise the
    /// same errors as [`Self::ingest_jsonl`].
    pub async fn ingest_jsonl_file(&self, path: &Path) -> Result<JsonlIngestReport, ControlError> {
        let input = tokio::fs::read_to_string(path).await?;
        let report = self.ingest_jsonl(&input)?;
        info!(path = %path.display(), records = report.record_count, "loaded rent roll export");
        Ok(report)
    }

    fn ingest_rows(&self, rows: Vec<RentRollRow>) -> Result<JsonlIngestReport, ControlError> {
        let records = rows
            .into_iter()
            .map(UnitRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let record_count = self.store.upsert_units(&records)?;
        let occupied_count = records
            .iter()
            .filter(|record| record.status == UnitStatus::Occupied)
            .count();
        let vacant_count = records
            .iter()
            .filter(|record| record.status.is_vacant())
            .count();

        info!(records = record_count, occupied = occupied_count, vacant = vacant_count, "upserted units");
        Ok(JsonlIngestReport {
            record_count,
            occupied_count,
            vacant_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ErrorKind;
    use crate::store::SqliteRentRollStore;

    fn plane() -> RentRollControlPlane {
        RentRollControlPlane::new(SqliteRentRollStore::open_in_memory().expect("store"))
    }

    fn unit_count(plane: &RentRollControlPlane) -> serde_json::Value {
        plane
            .store()
            .execute("SELECT COUNT(*) AS count FROM rent_roll", &[])
            .expect("count")[0]["count"]
            .clone()
    }

    #[test]
    fn reports_status_counts() {
        let plane = plane();
        let report = plane
            .ingest_jsonl(concat!(
                r#"{"Unit":101,"Name":"Ada","TYPE":"1x1.1","AUTOBILL":1200,"STATUS":"O"}"#,
                "\n",
                r#"{"Unit":102,"TYPE":"2x2.1","AUTOBILL":1300,"STATUS":"VR"}"#,
                "\n",
                r#"{"Unit":103,"TYPE":"1x1.2","STATUS":"NU"}"#,
            ))
            .expect("load");
        assert_eq!(
            report,
            JsonlIngestReport {
                record_count: 3,
                occupied_count: 1,
                vacant_count: 1,
            }
        );
    }

    #[test]
    fn invalid_record_rejects_whole_batch() {
        let plane = plane();
        let err = plane
            .ingest_jsonl(concat!(
                r#"{"Unit":101,"TYPE":"1x1.1","STATUS":"O"}"#,
                "\n",
                r#"{"Unit":102,"TYPE":"1x1.1","DEPOSIT":-5,"STATUS":"VR"}"#,
            ))
            .expect_err("negative deposit");
        assert_eq!(err.kind(), ErrorKind::IntegrityError);
        assert_eq!(unit_count(&plane), serde_json::Value::from(0));
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let plane = plane();
        let err = plane
            .ingest_jsonl("{\"Unit\":101,\"TYPE\":\"1x1.1\",\"STATUS\":\"O\"}\n\nnot json\n")
            .expect_err("bad line");
        match err {
            ControlError::Parse(parse) => assert_eq!(parse.line(), 3),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(unit_count(&plane), serde_json::Value::from(0));
    }

    #[tokio::test]
    async fn missing_export_is_an_io_error() {
        let plane = plane();
        let err = plane
            .ingest_jsonl_file(Path::new("/nonexistent/rent_roll.jsonl"))
            .await
            .expect_err("file does not exist");
        assert!(matches!(err, ControlError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::IoError);
        assert_eq!(unit_count(&plane), serde_json::Value::from(0));
    }
}
