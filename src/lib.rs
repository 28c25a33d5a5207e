//! Idempotent XML store for SportIdent punches.
//!
//! A competition file holds `competition → SIstation → SIcard → Punch`.
//! Adding the same punch twice leaves the file unchanged; a new time at the
//! same station and card adds a sibling `Punch`.
//!
//! Layers, innermost first:
//! - [`domain`]: tree model, record paths, the merge-insert engine, layout
//! - [`application`]: the [`PunchStore`](application::services::PunchStore) service
//! - [`infrastructure`]: filesystem and XML persistence, service wiring
//! - [`cli`]: the `sixml` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
