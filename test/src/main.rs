use std::error::Error;

use gateway_http::{
    GatewayEnv, HeaderBuffer, HeaderSink, RequestContext, ResponseHeaderUtils, StatusCode,
};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt::init();

    run().unwrap_or_else(|e| {
        println!("an error occured; error = {e:?}");
    });
}

fn run() -> Result<(), Box<dyn Error>> {
    let env: GatewayEnv = [
        ("HTTP_ACCEPT", "application/json"),
        ("HTTP_USER_AGENT", "demo/1.0"),
        ("CONTENT_TYPE", "multipart/form-data; boundary=xyz"),
        ("AUTH_USER", "demo"),
        ("AUTH_PASSWORD", "secret"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    let files = json!({
        "attachments": {
            "name": {"report": "report.pdf", "cover": "cover.png"},
            "type": {"report": "application/pdf", "cover": "image/png"},
            "tmp_name": {"report": "/tmp/up1.tmp", "cover": "/tmp/up2.tmp"},
            "error": {"report": 0, "cover": 0},
            "size": {"report": 48211, "cover": 9120},
        },
    });

    let context = RequestContext::new(env, files);

    println!("request headers:");
    for (name, value) in context.request_headers().all() {
        println!("  {name}: {value}");
    }

    let report = context.get_uploaded_file(&["attachments", "report"])?;
    println!(
        "report: {} ({}, {} bytes) at {}",
        report.name(),
        report.mime_type_or_guess().unwrap_or_default(),
        report.size(),
        report.tmp_path().display(),
    );

    let mut response = HeaderBuffer::new();
    response.put("Content-Type", "application/json")?;
    response.add_csv("Vary", &["Accept", "Accept-Encoding"])?;
    let status = StatusCode::Ok;
    println!("response ({status}):");
    for line in response.lines() {
        println!("  {line}");
    }

    Ok(())
}
