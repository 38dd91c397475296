use anyhow::{Context, Result};
use log::{error, info, warn};
use std::io::Read;

use super::form::parse_form;
use super::page::{self, Outcome};
use crate::config::Config;
use crate::model::Classifier;
use crate::model::loader;
use crate::predict;

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Response produced by [`route`], independent of the transport.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }
}

/// Load the model, bind, and serve until the process is stopped.
///
/// The model is loaded before the socket is bound so a bad artifact never
/// produces a listening server.
pub fn run_server(config: &Config) -> Result<()> {
    let cache = loader::global(&config.model.path, config.model.sha256.as_deref());
    info!("loading model from {}...", cache.path().display());
    let model = cache
        .get_or_load()
        .context("model artifact could not be loaded, refusing to serve")?;
    info!("model loaded");

    let server = tiny_http::Server::http(config.server.bind.as_str())
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", config.server.bind, e))?;
    match server.server_addr().to_ip() {
        Some(addr) => info!("listening on http://{}", addr),
        None => info!("listening on {}", config.server.bind),
    }

    let workers = config.server.worker_count();
    info!("serving with {} worker threads", workers);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let server = &server;
            let model = model.as_ref();
            scope.spawn(move || {
                for request in server.incoming_requests() {
                    handle_request(request, model);
                }
            });
        }
    });

    Ok(())
}

fn handle_request(mut request: tiny_http::Request, model: &dyn Classifier) {
    let mut body = String::new();
    if *request.method() == tiny_http::Method::Post {
        let read = request
            .as_reader()
            .take(MAX_BODY_BYTES)
            .read_to_string(&mut body);
        if let Err(e) = read {
            warn!("failed to read request body: {}", e);
            respond(request, Reply::text(400, "bad request"));
            return;
        }
    }

    let reply = route(request.method(), request.url(), &body, model);
    respond(request, reply);
}

fn respond(request: tiny_http::Request, reply: Reply) {
    let mut response =
        tiny_http::Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) =
        tiny_http::Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
    {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        error!("failed to send response: {}", e);
    }
}

/// Dispatch one request. Failures are confined to the returned reply.
pub fn route(method: &tiny_http::Method, url: &str, body: &str, model: &dyn Classifier) -> Reply {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (tiny_http::Method::Get, "/") | (tiny_http::Method::Get, "/predict") => {
            Reply::html(200, page::render(None, &Outcome::Empty))
        }
        (tiny_http::Method::Get, "/health") => Reply::text(200, "ok"),
        (tiny_http::Method::Post, "/predict") => handle_predict(body, model),
        _ => Reply::text(404, "not found"),
    }
}

fn handle_predict(body: &str, model: &dyn Classifier) -> Reply {
    let query = match parse_form(body) {
        Ok(query) => query,
        Err(e) => {
            warn!("rejected form submission: {}", e);
            let message = e.to_string();
            return Reply::html(400, page::render(None, &Outcome::Failed(&message)));
        }
    };

    match predict::predict(model, &query) {
        Ok(prediction) => Reply::html(
            200,
            page::render(Some(&query), &Outcome::Predicted(&prediction)),
        ),
        Err(e) => {
            warn!("inference failed: {}", e);
            let message = e.to_string();
            Reply::html(422, page::render(Some(&query), &Outcome::Failed(&message)))
        }
    }
}
