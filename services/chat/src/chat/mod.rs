pub mod state;
pub mod turn;

// Re-export the pieces the binary and tests reach for most often.
pub use state::Conversation;
pub use turn::{
    stream_answer, submit_question, StreamEnd, TurnOutcome, GENERATION_FAILURE_MESSAGE,
};
