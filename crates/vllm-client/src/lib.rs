mod client;
mod error;
mod stream;
mod types;

pub use client::Client;
pub use error::Error;
pub use stream::CompletionStream;
pub use types::{
    CompletionChoice, CompletionChunk, CompletionOutcome, CompletionRequest, CompletionResponse,
    LogProbs, Model, Usage,
};
