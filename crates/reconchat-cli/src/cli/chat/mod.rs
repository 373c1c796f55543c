//! Interactive chat for reconchat.
//!
//! Messages, report downloads and history clears run in the background so
//! the prompt stays usable while the backend works. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
