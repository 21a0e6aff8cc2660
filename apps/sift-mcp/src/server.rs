use std::{net::SocketAddr, sync::Arc};

use axum::{
	Router,
	body::Body,
	extract::State,
	http::{HeaderMap, Request},
	middleware::{self, Next},
	response::IntoResponse,
};
use color_eyre::Result;
use rmcp::{
	ErrorData, ServerHandler,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::McpAuthState;
use sift_config::Config;
use sift_service::{SearchRequest, SmartSearch};

const HEADER_AUTHORIZATION: &str = "Authorization";

#[derive(Clone)]
struct SiftMcp {
	service: Arc<SmartSearch>,
	tool_router: ToolRouter<Self>,
}
impl SiftMcp {
	fn new(service: Arc<SmartSearch>) -> Self {
		Self { service, tool_router: Self::tool_router() }
	}
}

#[rmcp::tool_router]
impl SiftMcp {
	#[rmcp::tool(
		name = "smart_search",
		description = "Search the note store with automatic method selection: the query is classified as semantic, keyword, attribute, exact-phrase, or temporal, routed to the right backend, and thin results fall back to the next best method.",
		input_schema = smart_search_schema()
	)]
	async fn smart_search(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let request: SearchRequest = serde_json::from_value(Value::Object(params))
			.map_err(|err| ErrorData::invalid_params(format!("Invalid arguments: {err}."), None))?;
		let reply = self.service.search(request).await;
		let payload = serde_json::to_value(&reply).map_err(|err| {
			ErrorData::internal_error(format!("Failed to serialize reply: {err}."), None)
		})?;

		if reply.is_success() {
			Ok(CallToolResult::structured(payload))
		} else {
			Ok(CallToolResult::structured_error(payload))
		}
	}
}

#[rmcp::tool_handler]
impl ServerHandler for SiftMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(
				"Sift MCP server exposing multi-method smart search over an agent note store."
					.to_string(),
			),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

pub async fn serve_mcp(config: Config, auth_state: McpAuthState) -> Result<()> {
	let bind_addr: SocketAddr = config.service.mcp_bind.parse()?;
	let service = Arc::new(SmartSearch::new(config));
	let session_manager: Arc<LocalSessionManager> = Default::default();
	let http_service = StreamableHttpService::new(
		move || Ok(SiftMcp::new(service.clone())),
		session_manager,
		StreamableHttpServerConfig::default(),
	);
	let router = Router::new()
		.fallback_service(http_service)
		.layer(middleware::from_fn_with_state(auth_state, mcp_auth_middleware));
	let listener = TcpListener::bind(bind_addr).await?;

	tracing::info!(%bind_addr, "MCP server listening.");

	axum::serve(listener, router).await?;

	Ok(())
}

fn is_authorized(headers: &HeaderMap, auth_state: &McpAuthState) -> bool {
	match auth_state {
		McpAuthState::Off => true,
		McpAuthState::StaticKeys { bearer_token } =>
			read_bearer_token(headers).is_some_and(|token| token == bearer_token),
	}
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(HEADER_AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn smart_search_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["query"],
		"properties": {
			"query": {
				"type": "string",
				"description": "Natural language, keyword, #label/~relation, quoted-phrase, or temporal query."
			},
			"parentNoteId": {
				"type": ["string", "null"],
				"description": "Restrict the search to a subtree of the note store."
			},
			"maxResults": {
				"type": ["integer", "null"],
				"minimum": 1,
				"maximum": 50
			},
			"forceMethod": {
				"type": ["string", "null"],
				"enum": ["auto", "semantic", "keyword", "attribute", "multi_method", null]
			},
			"includeArchived": { "type": ["boolean", "null"] },
			"enableFallback": { "type": ["boolean", "null"] },
			"summarize": { "type": ["boolean", "null"] }
		}
	}))
}

async fn mcp_auth_middleware(
	State(auth_state): State<McpAuthState>,
	req: Request<Body>,
	next: Next,
) -> axum::response::Response {
	if !is_authorized(req.headers(), &auth_state) {
		return (
			axum::http::StatusCode::UNAUTHORIZED,
			"Authentication required for security.auth_mode=static_keys with a Bearer token.",
		)
			.into_response();
	}

	next.run(req).await
}
