//! ISMN Adaptor - canonical unit names for USDA-ARS `.stm` files
//!
//! Files of the USDA-ARS network in an ISMN "header and values" database
//! spell the 2.5 V sensor supply inconsistently, both in the file name and in
//! the header line. The adaptor renames each file and rewrites its header into
//! the `2500 mV` form, then removes the original.
//!
//! # Flow
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────────┐
//! │  locate_network  │     │ candidate_files  │     │     adapt_file       │
//! │ <db>/<pattern>   │────▶│  <stn>/**/*.stm  │────▶│ rename + new header  │
//! │ Found | NotFound │     │                  │     │ then remove original │
//! └──────────────────┘     └──────────────────┘     └──────────────────────┘
//! ```
//!
//! Files are processed one at a time. A file whose name or header lacks the
//! old token is skipped and left untouched, which makes a second run a no-op.

pub mod adaptor;
pub mod config;
pub mod error;
pub mod scanner;
pub mod tokens;

// Re-exports for convenience
pub use adaptor::{
    AdaptOutcome, AdaptReport, Adaptor, MissingNetwork, NetworkDir, NetworkLocation, SkipReason,
};
pub use config::AdaptorConfig;
pub use error::{AdaptorError, Result};
