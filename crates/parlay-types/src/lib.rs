pub mod content;
pub mod events;
pub mod message;
pub mod tool;

pub use content::OutputContent;
pub use events::{CompletionEvent, CompletionPayload, FunctionChunk, ToolCallChunk};
pub use message::{generate_message_id, ChatMessage, Role};
pub use tool::{FunctionCall, ToolCall};
