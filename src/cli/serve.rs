//! HTTP server for a document tree.
//!
//! Every request path goes through [`resolve`] and, for pages, through the
//! [`TemplateRenderer`]:
//!
//! | Outcome                 | Response                                   |
//! |-------------------------|--------------------------------------------|
//! | `Render`                | `200` with the rendered page               |
//! | `Redirect`              | `302` to the canonical path, query kept    |
//! | `NotFound`              | `404`                                      |
//! | resolution/render error | `500`; the error itself is only logged      |
//!
//! Templates see a `request_path` entry holding the decoded path of the
//! request. Requests are handled one at a time on the calling thread.

use std::io::Cursor;
use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde_json::Value;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, info, warn};

use super::Site;
use crate::constants::{MAX_PORT_RETRIES, REQUEST_PATH_KEY};
use crate::core::{DocumentRoot, RenderContext};
use crate::resolver::{Outcome, resolve};
use crate::templating::TemplateRenderer;

#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Interface to bind (overrides `serve.interface`)
    #[arg(long)]
    interface: Option<String>,

    /// Port to bind (overrides `serve.port`); the next free port is used if taken
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeCommand {
    pub fn execute(self, site: &Site) -> Result<()> {
        let interface = self.interface.as_deref().unwrap_or(&site.config.serve.interface);
        let interface: IpAddr = interface
            .parse()
            .with_context(|| format!("Invalid interface address: {interface}"))?;
        let port = self.port.unwrap_or(site.config.serve.port);

        let (server, addr) = try_bind_port(interface, port, MAX_PORT_RETRIES)?;
        info!("Serving {} root(s) on http://{}", site.root.dirs().len(), addr);
        eprintln!("Serving on http://{addr}");

        let renderer = TemplateRenderer::new(site.root.clone());
        for request in server.incoming_requests() {
            if let Err(e) = handle_request(request, &site.root, &renderer) {
                warn!("Request error: {e:#}");
            }
        }

        Ok(())
    }
}

/// Bind to `base_port`, moving to the next port while the current one is taken.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    info!("Port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => {
                debug!("Could not bind {}: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string())
    ))
}

// Error details name files on disk, so they stay in the log.
const INTERNAL_ERROR: &str = "500 Internal Server Error";

/// A response independent of the HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reply {
    status: u16,
    content_type: &'static str,
    location: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            location: None,
            body: body.into().into_bytes(),
        }
    }
}

fn handle_request(request: Request, root: &DocumentRoot, renderer: &TemplateRenderer) -> Result<()> {
    let reply = if matches!(request.method(), Method::Get | Method::Head) {
        respond(request.url(), root, renderer)
    } else {
        Reply::text(405, "405 Method Not Allowed")
    };
    debug!("{} {} -> {}", request.method(), request.url(), reply.status);

    let mut headers = vec![header("Content-Type", reply.content_type)?];
    if let Some(location) = &reply.location {
        headers.push(header("Location", location)?);
    }

    let length = reply.body.len();
    let response =
        Response::new(StatusCode(reply.status), headers, Cursor::new(reply.body), Some(length), None);
    request.respond(response).context("Failed to send response")?;
    Ok(())
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("Invalid header {name}: {value}"))
}

/// Map a request URL (path plus optional query) to a reply.
fn respond(url: &str, root: &DocumentRoot, renderer: &TemplateRenderer) -> Reply {
    let (raw_path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };

    let Ok(path) = urlencoding::decode(raw_path) else {
        return Reply::text(404, "404 Not Found");
    };

    let mut caller_context = RenderContext::new();
    caller_context.insert(REQUEST_PATH_KEY.to_string(), Value::String(path.to_string()));

    match resolve(&path, caller_context, root) {
        Ok(Outcome::Render {
            template,
            context,
        }) => match renderer.render(&template, &context) {
            Ok(body) => Reply {
                status: 200,
                content_type: "text/html; charset=utf-8",
                location: None,
                body,
            },
            Err(e) => {
                warn!("Failed to render '{}': {}", path, e);
                Reply::text(500, INTERNAL_ERROR)
            }
        },
        Ok(Outcome::Redirect(target)) => {
            let mut location = encode_path(&target.to_url_path());
            if let Some(query) = query {
                location.push('?');
                location.push_str(query);
            }
            Reply {
                location: Some(location),
                ..Reply::text(302, "302 Found")
            }
        }
        Ok(Outcome::NotFound) => Reply::text(404, "404 Not Found"),
        Err(e) => {
            warn!("Failed to resolve '{}': {}", path, e);
            Reply::text(500, INTERNAL_ERROR)
        }
    }
}

// Header values must be ASCII, so each segment is percent-encoded.
fn encode_path(path: &str) -> String {
    path.split('/').map(|segment| urlencoding::encode(segment).into_owned()).collect::<Vec<_>>().join("/")
}
