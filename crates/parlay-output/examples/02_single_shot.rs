use std::sync::Arc;

use anyhow::Result;
use parlay_output::{RunDriver, TracingNotifier};
use parlay_types::{CompletionPayload, OutputContent, ToolCall};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut driver = RunDriver::new(Arc::new(TracingNotifier));

    // Simulated request/response transport: one terminal payload
    let payload = CompletionPayload::success(
        Some(OutputContent::text("The capital of France is Paris.")),
        vec![ToolCall::new("call_1", "lookup", "{\"q\":\"capital of France\"}")],
    )
    .with_span("span_xyz");

    let snapshot = driver.run_single_shot("run-1", Ok(payload)).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    // A failed payload preserves nothing but reports the error
    let snapshot = driver
        .run_single_shot("run-2", Ok(CompletionPayload::failure("model overloaded")))
        .await?;
    println!("error: {:?}", snapshot.error);

    Ok(())
}
