//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - chat entries, exchanged between the presentation layer and a session
//! - openai messages/tools, sent from the agent to the LLM
//! - agent events, streamed from the agent to the presentation layer
//!
//! We always immediately convert those data models into the internal structs
//! using to/from helpers, so the internal models are not an exact match to any
//! single wire format.
pub mod content;
pub mod event;
pub mod message;
pub mod role;
pub mod tool;
