//! Scripts for deploying and configuring the Taggr contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod chain;
pub mod cli;
pub mod client;
mod commands;
pub mod config;
pub mod constants;
pub mod deploy;
pub mod errors;
pub mod executor;
pub mod gas;
pub mod manifest;
pub mod merkle;
pub mod plans;
mod solidity;
pub mod utils;
pub mod verification;
