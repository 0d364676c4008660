//! Run configuration.
//!
//! A [`Policy`] is built once per run, normally from environment variables
//! via [`Policy::from_env`], and decides which optional steps run. There is
//! no configuration file.

pub mod config;

pub use config::Policy;
