//! Runs a mock-backed agent with tracing output enabled.
//!
//! ```sh
//! RUST_LOG=colloquy=debug cargo run --example run_with_tracing
//! ```

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use colloquy::client::MockClient;
use colloquy::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("colloquy=debug")),
        )
        .init();

    let lookup = FunctionTool::new(
        "lookup_metric",
        "Look up a dashboard metric by name.",
        json!({
            "type": "object",
            "properties": { "field": { "type": "string" } },
            "required": ["field"]
        }),
        |args| async move {
            let field = args["field"].as_str().unwrap_or("unknown").to_string();
            Ok(json!({"field": field, "value": 1_234_567}))
        },
    )
    .show_in_thread(true)
    .shared();

    let agent = Agent::new("analyst")
        .instructions("You answer questions about dashboard data.")
        .settings(ModelSettings::new().model("gemini-2.0-flash"))
        .tool(lookup)
        .shared();

    // Scripted backend: one tool round trip, then a final answer.
    let client = Arc::new(
        MockClient::new()
            .reply_call("lookup_metric", json!({"field": "revenue"}))
            .reply_text("Q3 revenue came in at 1,234,567."),
    );

    let runner = Runner::new(client);
    let result = runner
        .run(agent, "How did Q3 revenue trend?", &[], RunConfig::default())
        .await?;

    println!("final output: {}", result.text());
    for item in result.thread_items() {
        println!("thread item: {item:?}");
    }
    Ok(())
}
