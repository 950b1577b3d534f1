/// Shared test support: a minimal in-process HTTP/1.1 JSON-RPC server.
///
/// Each test spawns a stub with a responder closure mapping
/// (method, params, headers) to either a `result` or an `error`
/// payload; the stub wraps it into a JSON-RPC response echoing the
/// request id.
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub type Responder =
    Arc<dyn Fn(&str, &Value, &HashMap<String, String>) -> Result<Value, Value> + Send + Sync>;

/// Spawn the stub and return its base url.
pub async fn spawn_stub(responder: Responder) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let responder = Arc::clone(&responder);
            tokio::spawn(async move {
                serve_connection(socket, responder).await;
            });
        }
    });

    format!("http://{}", addr)
}

/// Stub that fails every request at the JSON-RPC level with the given
/// error message (e.g. to simulate a rejected `initialize`).
pub async fn spawn_failing_stub(message: &str) -> String {
    let message = message.to_string();
    spawn_stub(Arc::new(move |_method, _params, _headers| {
        Err(json!({ "code": -32000, "message": message }))
    }))
    .await
}

async fn serve_connection(mut socket: TcpStream, responder: Responder) {
    let mut buf: Vec<u8> = Vec::new();

    loop {
        // Read until the header block is complete.
        let header_end = loop {
            if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
                break pos;
            }
            let mut chunk = [0u8; 4096];
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        };

        let header_text = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut headers = HashMap::new();
        for line in header_text.lines().skip(1) {
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        let content_length: usize = headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let body_start = header_end + 4;

        while buf.len() < body_start + content_length {
            let mut chunk = [0u8; 4096];
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }

        let body: Value =
            serde_json::from_slice(&buf[body_start..body_start + content_length])
                .unwrap_or(Value::Null);
        buf.drain(..body_start + content_length);

        let method = body
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let params = body.get("params").cloned().unwrap_or_else(|| json!({}));
        let id = body.get("id").cloned().unwrap_or(Value::Null);

        let payload = match responder(&method, &params, &headers) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
        };
        let body_text = payload.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body_text.len(),
            body_text
        );

        if socket.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// `initialize` result used by stubs that accept the handshake.
pub fn init_result() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": { "tools": {}, "resources": {}, "prompts": {} },
        "sessionId": "sess-1",
        "serverInfo": { "name": "stub", "version": "0.0.1" }
    })
}

/// Responder for a server announcing the given tools and nothing else.
pub fn tools_only_responder(tools: Value) -> Responder {
    Arc::new(move |method, _params, _headers| match method {
        "initialize" => Ok(init_result()),
        "tools/list" => Ok(json!({ "tools": tools.clone() })),
        "resources/list" => Ok(json!({ "resources": [] })),
        "prompts/list" => Ok(json!({ "prompts": [] })),
        other => Err(json!({ "code": -32601, "message": format!("Unknown method {}", other) })),
    })
}
