//! MCP server implementation for rentroll-mcp.
//!
//! This crate maps the control plane's operation catalog onto MCP tools and
//! exposes the schema overview as a read-only resource.

mod helpers;
mod resources;
mod tools;
pub mod server;

use rentroll_core::control::RentRollControlPlane;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use rmcp::model::{
    CallToolRequestParams,
    CallToolResult,
    ListResourcesResult,
    ListToolsResult,
    PaginatedRequestParams,
    ReadResourceRequestParams,
    ReadResourceResult,
    ServerCapabilities,
    ServerInfo,
};
use rmcp::service::RequestContext;
use tracing::debug;

const SERVER_INSTRUCTIONS: &str = r"rentroll-mcp answers questions about a rent roll: one row per rental unit with tenant, type, size, rent, lease dates, and occupancy status.

Tools:
- `get_vacant_units`, `get_occupancy_stats`, `get_revenue_analysis` take no arguments.
- `search_units_by_type` accepts phrases like `1-bedroom` or codes like `1x1.1`.
- `search_by_tenant_name` matches any part of the tenant name.
- `get_lease_expirations` lists occupied units whose lease end date contains the year.
- `custom_sql_query` runs SQL verbatim against the `rent_roll` table. Trusted callers only.

Status codes: `O` occupied, `VU` vacant unit, `NU` notice/unknown, `VR` vacant ready.
Read `schema://rent_roll` for columns, counts, and sample rows before writing SQL.";

/// MCP server wrapper around the rent roll control plane.
#[derive(Clone)]
pub struct RentRollMcp {
    control: RentRollControlPlane,
}

impl RentRollMcp {
    #[must_use]
    pub const fn new(control: RentRollControlPlane) -> Self {
        Self { control }
    }

    #[must_use]
    pub const fn control(&self) -> &RentRollControlPlane {
        &self.control
    }
}

impl ServerHandler for RentRollMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(tools::catalog_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(tool = %request.name, "tool call received");
        tools::call(&self.control, &request.name, request.arguments.as_ref())
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(vec![
            resources::schema_resource(),
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        resources::read(&self.control, &request.uri)
    }
}
