use std::sync::Arc;

use anyhow::Result;
use parlay_output::{EventStream, RunDriver, TracingNotifier};
use parlay_types::{CompletionEvent, ToolCallChunk};

/// Simulated subscription transport: a run that streams text, then a tool
/// call in fragments, then succeeds.
fn simulated_events() -> EventStream {
    Box::pin(async_stream::stream! {
        yield Ok(CompletionEvent::TextChunk { content: "Checking the weather".to_string() });
        yield Ok(CompletionEvent::TextChunk { content: " for you...".to_string() });
        yield Ok(CompletionEvent::ToolCallChunk(ToolCallChunk::new("call_1", "get_weather", "{\"city\":")));
        yield Ok(CompletionEvent::ToolCallChunk(ToolCallChunk::continuation("call_1", "\"Paris\"}")));
        yield Ok(CompletionEvent::RunResult { span_id: Some("span_abc".to_string()) });
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut driver = RunDriver::new(Arc::new(TracingNotifier));

    // Watch updates the way a presentation layer would
    let mut updates = driver.store().subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow().clone();
            println!(
                "update: loading={} text={:?} tool_calls={}",
                snapshot.is_loading,
                snapshot.content.as_ref().and_then(|c| c.as_text()),
                snapshot.tool_calls.len(),
            );
            if snapshot.is_terminal() {
                break;
            }
        }
    });

    let snapshot = driver.run_streaming("run-1", simulated_events()).await?;
    watcher.await?;

    println!("final text: {:?}", snapshot.content.as_ref().and_then(|c| c.as_text()));
    for tool_call in &snapshot.tool_calls {
        println!(
            "tool call {} -> {}({})",
            tool_call.id,
            tool_call.name.as_deref().unwrap_or("?"),
            tool_call.arguments,
        );
    }
    println!("span: {:?}", snapshot.span_id);

    Ok(())
}
