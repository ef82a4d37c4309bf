//! # MCP Handler Module
//!
//! Implements the Model Context Protocol surface of the token launcher and
//! dispatches tool calls to the `CREATE_TOKEN` action.
//!
//! ## Supported Tools
//!
//! - `create_token` - Extract token parameters from a chat message and launch
//!   the token and its market through the TokenMill factory
//! - `preview_token` - Show the parameters that would be used, without
//!   touching the chain
//! - `encode_swap_route` - Encode the native-to-token swap route for an address

use ethers::utils::to_checksum;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    action::{ActionReply, ACTION_DESCRIPTION, ACTION_NAME, ACTION_SIMILES},
    blockchain::route::encode_route,
    mcp::protocol::{error_codes, tool_result, Request, Response},
    token::{extract, format_token_details},
    utils, AppState,
};

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        // Direct method calls are rewritten into tools/call
        "create_token" | "preview_token" | "encode_swap_route" => {
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": req.method,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let req_id = &req.id;

    let res: Result<Response, Response> = match tool_name {
        "create_token" => create_token(&state, args, req_id).await,
        "preview_token" => preview_token(&state, args, req_id),
        "encode_swap_route" => encode_swap_route(args, req_id),
        other => Err(Response::error(
            req_id.clone(),
            error_codes::METHOD_NOT_FOUND,
            format!("Unknown tool: {}", other),
        )),
    };
    res.unwrap_or_else(|err_resp| err_resp)
}

async fn create_token(state: &AppState, args: &Value, req_id: &Value) -> Result<Response, Response> {
    let text = utils::get_required_arg::<String>(args, "text", req_id)?;

    let mut replies: Vec<ActionReply> = Vec::new();
    let launched = state
        .action
        .handle(&text, |reply| {
            debug!("{} reply: {}", ACTION_NAME, reply.text);
            replies.push(reply);
        })
        .await;

    let texts: Vec<String> = replies.into_iter().map(|r| r.text).collect();
    Ok(Response::success(
        req_id.clone(),
        tool_result(&texts, json!({ "success": launched }), !launched),
    ))
}

fn preview_token(state: &AppState, args: &Value, req_id: &Value) -> Result<Response, Response> {
    let text = utils::get_required_arg::<String>(args, "text", req_id)?;

    let result = match extract(&text) {
        Some(params) => tool_result(
            &[format_token_details(&params)],
            json!({
                "valid": true,
                "configured": state.action.is_configured(),
                "parameters": params
            }),
            false,
        ),
        None => tool_result(
            &["No token name found in the request.".to_string()],
            json!({ "valid": false, "configured": state.action.is_configured() }),
            true,
        ),
    };
    Ok(Response::success(req_id.clone(), result))
}

fn encode_swap_route(args: &Value, req_id: &Value) -> Result<Response, Response> {
    let token = utils::get_address_arg(args, "token_address", req_id)?;
    let route = format!("0x{}", hex::encode(encode_route(token)));
    Ok(Response::success(
        req_id.clone(),
        tool_result(
            &[format!("Swap route to {}: {}", to_checksum(&token, None), route)],
            json!({ "route": route }),
            false,
        ),
    ))
}

/// Handles the 'initialize' request.
fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "tokenmill_mcp",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions = format!(
        "{} ({}). Also answers to: {}.",
        ACTION_DESCRIPTION,
        ACTION_NAME,
        ACTION_SIMILES.join(", ")
    );

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let text_schema = json!({
        "type": "object",
        "properties": {
            "text": {"type": "string", "description": "The user's chat message, e.g. \"create a token called 'Rocket' with symbol RKT\"."}
        },
        "required": ["text"]
    });
    let tools = json!([
        {
            "name": "create_token",
            "description": ACTION_DESCRIPTION,
            "inputSchema": text_schema
        },
        {
            "name": "preview_token",
            "description": "Show the token parameters that would be extracted from a chat message, without deploying.",
            "inputSchema": text_schema
        },
        {
            "name": "encode_swap_route",
            "description": "Encode the swap route from the native asset to a token.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "token_address": {"type": "string", "description": "The 0x... token address."}
                },
                "required": ["token_address"]
            }
        }
    ]);
    Response::success(req.id.clone(), json!({ "tools": tools }))
}
