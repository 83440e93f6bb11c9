//! # Aura Configuration
//!
//! Configuration parsing and logging setup for the Aura engine.
//!
//! ## Usage
//!
//! ```rust
//! use aura_config::Config;
//!
//! let config = Config::from_str(r#"
//!     [aura]
//!     period = 5
//!     epoch_length = 500
//!     authorities = [
//!         "0x70ad1a5fba52e27173d23ad87ad97c9bbe249abf",
//!         "0xafe443af9d1504de4c2d486356c421c160fdd7b1",
//!     ]
//!
//!     [logging]
//!     level = "debug"
//!     format = "compact"
//! "#).unwrap();
//!
//! assert_eq!(config.aura.period, 5);
//! assert_eq!(config.aura.authorities.len(), 2);
//! ```
//!
//! ## Configuration Sections
//!
//! - `[aura]` - Step period, epoch length, authority list, genesis difficulty,
//!   signature cache size
//! - `[[aura.transitions]]` - Authority lists activated at later epoch boundaries
//! - `[logging]` - Level, format and extra filter directives

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

mod config;
mod error;
mod logging;

pub use config::*;
pub use error::*;
pub use logging::init_tracing;
