//! Bioflow Input Composer
//!
//! Turns a WDL input template plus caller-supplied sample values into filled
//! `inputs.json` entries.
//!
//! ## Pipeline
//!
//! 1. **Normalize**: reconcile the claimed sample count with the params shape
//! 2. **Classify**: split template fields into required, defaulted and optional
//! 3. **Fill**: apply the class rules to every sample, collecting soft errors
//! 4. **Compose**: aggregate filled samples and per-sample error text
//!
//! Missing and undeclared fields never abort a batch; they are reported per
//! sample next to the partial output so the caller can fix and retry.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod composer;
pub mod error;
pub mod filler;
pub mod normalizer;

pub use classifier::{classify, parse_default, parse_spec};
pub use composer::{compose, compose_from_path, load_template, write_filled, Composition};
pub use error::{ComposeError, Result};
pub use filler::fill;
pub use normalizer::{normalize, normalize_value};
