//! Emits a few responses as raw HTTP/1.1 onto stdout.
//!
//! run with: `cargo run -p micro-reply --example emit_stdout`

use http::Request;
use micro_reply::{Cookie, Responder, Response};
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::WireWriter;
use serde::Serialize;
use serde_json::Map;
use std::io::Cursor;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Serialize)]
struct User {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let request = IncomingRequest::from(Request::get("/users/7").body(()).expect("valid request"));

    let mut json = Response::ok().json(User { id: 7, name: "Ann".to_owned() });
    json.set_cookie(Cookie::new("session", "abc"));

    let mut steps = 0;
    let streamed = Response::ok().stream(move |buf| {
        steps += 1;
        buf.extend_from_slice(format!("data: tick {steps}\n\n").as_bytes());
        steps < 3
    });

    let mut html = Response::ok().html_str("<h1>{{ title }}</h1>", Map::new());
    html.assign("title", "Tom & Jerry");

    let responses: Vec<Box<dyn Responder>> = vec![
        Box::new(json),
        Box::new(Response::new(302).expect("valid status").redirect("../login")),
        Box::new(Response::ok().reader(Cursor::new(b"plain text body".to_vec()))),
        Box::new(streamed),
        Box::new(html),
        Box::new(Response::new(201).expect("valid status").xml(User { id: 8, name: "Bob".to_owned() })),
    ];

    for mut response in responses {
        let mut writer = WireWriter::new(tokio::io::stdout());
        if let Err(e) = response.emit(&mut writer, &request).await {
            error!(cause = %e, "emit response failed");
            continue;
        }
        if let Err(e) = writer.finish().await {
            error!(cause = %e, "finish response failed");
        }
        info!("response emitted");
        println!();
    }
}
