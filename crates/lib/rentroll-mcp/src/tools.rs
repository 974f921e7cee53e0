//! Catalog operations exposed as MCP tools.

use std::sync::Arc;

use rentroll_core::control::{DispatchError, OperationKind, RentRollControlPlane};
use rentroll_core::render::ToolOutput;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};

use crate::helpers;

/// One tool per catalog entry, with schemas built from its argument specs.
pub(crate) fn catalog_tools() -> Vec<Tool> {
    OperationKind::ALL
        .into_iter()
        .map(|kind| Tool::new(kind.name(), kind.description(), Arc::new(kind.input_schema())))
        .collect()
}

pub(crate) fn call(
    control: &RentRollControlPlane,
    name: &str,
    arguments: Option<&JsonObject>,
) -> Result<CallToolResult, ErrorData> {
    to_call_result(control.call(name, arguments))
}

/// Query failures complete the call as an error result; rejections are protocol errors.
fn to_call_result(outcome: Result<ToolOutput, DispatchError>) -> Result<CallToolResult, ErrorData> {
    match outcome {
        Ok(output) => Ok(CallToolResult::success(vec![
            Content::text(output.digest),
            Content::json(output.payload)?,
        ])),
        Err(err @ DispatchError::Query(_)) => {
            let detail = err.detail();
            let body = helpers::error_body(err.kind(), &detail);
            Ok(CallToolResult::error(vec![
                Content::text(detail),
                Content::json(body)?,
            ]))
        }
        Err(err) => Err(helpers::map_dispatch_err(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentroll_core::store::SqliteRentRollStore;
    use rmcp::model::ErrorCode;
    use serde_json::{Value, json};

    fn control() -> RentRollControlPlane {
        let store = SqliteRentRollStore::open_in_memory().expect("store");
        RentRollControlPlane::new(store)
    }

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn lists_every_catalog_entry() {
        let tools = catalog_tools();
        let names: Vec<&str> = tools.iter().map(|tool| &*tool.name).collect();
        assert_eq!(
            names,
            vec![
                "get_vacant_units",
                "get_occupancy_stats",
                "search_units_by_type",
                "search_by_tenant_name",
                "get_lease_expirations",
                "get_revenue_analysis",
                "custom_sql_query",
            ]
        );
        let lease = &tools[4];
        assert_eq!(lease.input_schema["required"], json!(["year"]));
    }

    #[test]
    fn success_carries_digest_and_payload() {
        let result = call(&control(), "get_occupancy_stats", None).expect("call");
        assert_ne!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 2);
    }

    #[test]
    fn unknown_tool_is_method_not_found() {
        let err = call(&control(), "delete_unit", None).expect_err("unknown tool");
        assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
        assert!(err.message.contains("delete_unit"));
        let data = err.data.expect("error data");
        assert_eq!(data["kind"], "unknown_operation");
    }

    #[test]
    fn missing_argument_is_invalid_params() {
        let err = call(&control(), "get_lease_expirations", Some(&args(json!({}))))
            .expect_err("year is required");
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        let data = err.data.expect("error data");
        assert_eq!(data["kind"], "invalid_argument");
    }

    #[test]
    fn query_failure_completes_as_error_result() {
        let result = call(
            &control(),
            "custom_sql_query",
            Some(&args(json!({ "sql": "SELECT missing FROM rent_roll" }))),
        )
        .expect("query errors are tool results");
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 2);
    }
}
