//! FusionSpace website generator.
//!
//! Turns a free-text business description into a single-file HTML website
//! by chaining three LLM calls (business analysis, design specs, code) and
//! falling back to one direct prompt when any step fails.
//!
//! Entry points: [`ai::pipeline::WebsiteGenerator`] for the pipeline,
//! [`chains::execute_chain`] for the prompt-chain catalog,
//! [`templates`] for the starter sites and [`server::build_router`] for the
//! HTTP API.

pub mod ai;
pub mod chains;
pub mod config;
pub mod credits;
pub mod error;
pub mod llm;
pub mod logger;
pub mod server;
pub mod templates;
