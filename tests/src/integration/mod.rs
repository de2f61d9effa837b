//! Cross-component flows.

mod fleet;
mod http;
mod vote_flow;
