//! `cinder-io` — file I/O for the compiler: header-mapped CSV readers for the
//! four collaborator inputs and a deterministic CSV writer for the compiled
//! inventory.
//!
//! Schema problems (missing columns, malformed numbers) abort the run;
//! estimation gaps (blank cells, unknown units of measure) become absent
//! values.

pub mod error;
pub mod export;
pub mod load;

pub use error::IoError;
pub use export::write_inventory;
pub use load::{load_ghgrp, load_nei, load_registry, load_secondary_factors};
