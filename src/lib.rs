//! intentgate: intent-attributed orchestration for coding agents.
//!
//! The engine sits between an agent and its tools. Before a tool runs,
//! the pre hooks check that mutations are attributed to a selected,
//! in-progress intent, stay inside that intent's owned file scope, and
//! honor its constraints. After a tool runs, the post hooks classify the
//! mutation, hash the touched line range, and append an immutable trace
//! record correlating the change with its intent and VCS revision.
//!
//! Embedding hosts construct a [`engine::HookEngine`] per session and
//! route every tool call through `execute_pre_hooks` and
//! `execute_post_hooks`. The `intentgate` binary exposes the workspace
//! artifacts (intent spec, trace ledger, spatial map) on the command
//! line.

pub mod cli;
pub mod engine;
pub mod error;
pub mod hash;
pub mod intent;
pub mod io;
pub mod policy;
pub mod scope;
pub mod trace;
pub mod vcs;

pub use error::{OrchestratorError, Result};
