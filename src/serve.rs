//! Read-only HTTP viewer for the roadmap
//!
//! `sapling serve` → loads the stored tree once and serves it until stopped.
//!
//! Routes:
//! - `GET /` HTML outline of the filtered tree
//! - `GET /api/roadmap?category=&scale=&from=&to=` filtered tree as JSON
//! - `GET /api/roadmap/export` full tree as a downloadable export file

use crate::filter::{self, DateWindow, TimeScale};
use crate::node::{parse_date, RoadmapNode};
use crate::persist;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Everything a request needs; built once at startup
#[derive(Debug, Clone)]
pub struct ServerState {
    pub nodes: Vec<RoadmapNode>,
    pub today: NaiveDate,
    pub default_scale: TimeScale,
    pub default_category: String,
    pub export_prefix: String,
}

/// Query string accepted by `/` and `/api/roadmap`
#[derive(Debug, Default, Deserialize)]
struct RoadmapQuery {
    category: Option<String>,
    /// A time scale name, or `all` for no date filter
    scale: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

/// Response before it is handed to tiny_http
#[derive(Debug, PartialEq)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
    download_name: Option<String>,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_string(value).unwrap_or_else(|e| {
            format!(r#"{{"ok":false,"data":null,"error":"serialization failed: {}"}}"#, e)
        });
        Self {
            status,
            content_type: "application/json",
            body,
            download_name: None,
        }
    }

    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
            download_name: None,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain",
            body: "Not found".to_string(),
            download_name: None,
        }
    }
}

/// Start the roadmap viewer server
pub fn start_roadmap_server(port: u16, state: ServerState) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| std::io::Error::other(e.to_string()))?;

    let url = format!("http://localhost:{}", port);

    eprintln!("\n\x1b[1;32m🌱 Sapling\x1b[0m");
    eprintln!("   Roadmap viewer: {}", url);
    eprintln!("   Press Ctrl+C to stop\n");
    tracing::info!(%addr, nodes = crate::tree::count(&state.nodes), "roadmap server listening");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &state) {
            tracing::warn!(error = %e, "failed to answer request");
        }
    }

    Ok(())
}

fn handle_request(request: Request, state: &ServerState) -> std::io::Result<()> {
    let reply = route(request.method(), request.url(), state);
    tracing::debug!(method = %request.method(), url = request.url(), status = reply.status, "request");

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    if let Some(name) = reply.download_name {
        let value = format!("attachment; filename=\"{}\"", name);
        if let Ok(header) = Header::from_bytes(&b"Content-Disposition"[..], value.as_bytes()) {
            response = response.with_header(header);
        }
    }
    request.respond(response)
}

fn route(method: &Method, url: &str, state: &ServerState) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match (method, path) {
        (&Method::Get, "/") => match visible_tree(query, state) {
            Ok((nodes, window, category)) => Reply::html(render_page(&nodes, window, &category)),
            Err(e) => Reply {
                status: 400,
                ..Reply::html(format!("<p>{}</p>", escape_html(&e)))
            },
        },

        (&Method::Get, "/api/roadmap") => match visible_tree(query, state) {
            Ok((nodes, _, _)) => Reply::json(200, &ApiResponse::success(nodes)),
            Err(e) => Reply::json(400, &ApiResponse::failure(e)),
        },

        (&Method::Get, "/api/roadmap/export") => match persist::export_json(&state.nodes) {
            Ok(body) => Reply {
                status: 200,
                content_type: "application/json",
                body,
                download_name: Some(persist::export_file_name(&state.export_prefix, state.today)),
            },
            Err(e) => Reply::json(500, &ApiResponse::failure(e.to_string())),
        },

        _ => Reply::not_found(),
    }
}

/// Parse the query and filter the full tree with it
fn visible_tree(
    query: &str,
    state: &ServerState,
) -> Result<(Vec<RoadmapNode>, Option<DateWindow>, String), String> {
    let q: RoadmapQuery =
        serde_urlencoded::from_str(query).map_err(|e| format!("invalid query: {}", e))?;

    let category = q
        .category
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| state.default_category.clone());

    let window = match (q.from.as_deref(), q.to.as_deref()) {
        (Some(from), Some(to)) => {
            let start = parse_date(from).ok_or_else(|| format!("invalid date '{}'", from))?;
            let end = parse_date(to).ok_or_else(|| format!("invalid date '{}'", to))?;
            Some(DateWindow::new(start, end))
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err("from and to must be given together".to_string())
        }
        (None, None) => match q.scale.as_deref() {
            Some("all") => None,
            Some(s) => Some(s.parse::<TimeScale>()?.window(state.today)),
            None => Some(state.default_scale.window(state.today)),
        },
    };

    Ok((filter::apply(&state.nodes, &category, window), window, category))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_nodes(nodes: &[RoadmapNode], out: &mut String) {
    out.push_str("<ul>");
    for node in nodes {
        out.push_str(&format!(
            r#"<li><span class="status {status}">{label}</span> <strong>{title}</strong> <span class="dates">{start} → {end}</span> <span class="category">{category}</span>"#,
            status = node.status.as_str(),
            label = node.status.label(),
            title = escape_html(&node.title),
            start = escape_html(&node.start_date),
            end = escape_html(&node.end_date),
            category = escape_html(&node.category),
        ));
        if !node.description.is_empty() {
            out.push_str(&format!("<p>{}</p>", escape_html(&node.description)));
        }
        if !node.details.is_empty() {
            out.push_str(r#"<ul class="details">"#);
            for d in &node.details {
                out.push_str(&format!("<li>{}</li>", escape_html(d)));
            }
            out.push_str("</ul>");
        }
        if node.has_children() {
            render_nodes(&node.children, out);
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

fn render_page(nodes: &[RoadmapNode], window: Option<DateWindow>, category: &str) -> String {
    let range = window
        .map(|w| w.to_string())
        .unwrap_or_else(|| "all dates".to_string());
    let mut body = String::new();
    if nodes.is_empty() {
        body.push_str("<p>No items found for this time range.</p>");
    } else {
        render_nodes(nodes, &mut body);
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Roadmap</title>
<style>
body {{ font-family: -apple-system, Helvetica, Arial, sans-serif; margin: 2rem; color: #1d1d1f; }}
li {{ margin: .4rem 0; }}
.dates, .category {{ color: #86868b; font-size: .9em; }}
.status {{ border-radius: 999px; padding: 0 .5em; font-size: .8em; }}
.planned {{ background: #fef3c7; }}
.in-progress {{ background: #ffedd5; }}
.completed {{ background: #dcfce7; }}
.at-risk {{ background: #fee2e2; }}
</style>
</head>
<body>
<h1>Roadmap</h1>
<p class="dates">{range} · {category}</p>
{body}
</body>
</html>
"#,
        range = escape_html(&range),
        category = escape_html(category),
        body = body,
    )
}
