//! `uitree` command line surface

pub mod app;
pub mod commands;
pub mod context;
pub mod criteria;
pub mod dispatch;
pub mod env;
pub mod fingerprint;
pub mod output;
pub mod relocate;
pub mod runtime;
pub mod snapshot;
pub mod tree;

pub use app::run;
pub use output::OutputFormat;
