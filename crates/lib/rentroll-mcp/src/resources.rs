use rentroll_core::control::{ErrorKind, RentRollControlPlane};
use rentroll_store::schema::SCHEMA_RESOURCE_URI;
use rmcp::ErrorData;
use rmcp::model::{AnnotateAble, ErrorCode, RawResource, ReadResourceResult, Resource, ResourceContents};

use crate::helpers;

pub(crate) fn schema_resource() -> Resource {
    let mut raw = RawResource::new(SCHEMA_RESOURCE_URI, "Rent Roll Schema");
    raw.description = Some(
        "Database schema, occupancy counts, status codes, and sample rows for the rent roll"
            .to_string(),
    );
    raw.mime_type = Some("text/markdown".to_string());
    raw.no_annotation()
}

pub(crate) fn read(control: &RentRollControlPlane, uri: &str) -> Result<ReadResourceResult, ErrorData> {
    if uri != SCHEMA_RESOURCE_URI {
        let detail = format!("Unknown resource: {uri}");
        let body = helpers::error_body(ErrorKind::InvalidArgument, &detail);
        return Err(helpers::mcp_err(ErrorCode::RESOURCE_NOT_FOUND, detail, Some(body)));
    }

    let text = control
        .schema_overview()
        .map_err(|err| helpers::map_dispatch_err(&err))?;
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(text, uri)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentroll_core::store::SqliteRentRollStore;

    fn control() -> RentRollControlPlane {
        RentRollControlPlane::new(SqliteRentRollStore::open_in_memory().expect("store"))
    }

    #[test]
    fn resource_uses_schema_uri() {
        assert_eq!(schema_resource().uri, SCHEMA_RESOURCE_URI);
    }

    #[test]
    fn reads_overview_text() {
        let result = read(&control(), SCHEMA_RESOURCE_URI).expect("read");
        assert_eq!(result.contents.len(), 1);
    }

    #[test]
    fn unknown_uri_is_not_found() {
        let err = read(&control(), "schema://other").expect_err("unknown uri");
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    }

    #[test]
    fn closed_store_is_reported() {
        let control = control();
        control.store().close().expect("close");
        let err = read(&control, SCHEMA_RESOURCE_URI).expect_err("closed store");
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.data.expect("error data")["kind"], "query_error");
    }
}
