//! rowgroup: hierarchical group-by and flatten for flat JSON records.
//!
//! # Module structure
//!
//! ```text
//! rowgroup
//! ├── model      — Record and GroupKey
//! ├── error      — GroupError, ConfigError
//! ├── input      — JSON record loading and the demonstration sample
//! ├── config     — rowgroup.toml loader
//! └── analysis
//!     └── groupings — GroupNode tree, Grouper, flatten
//! ```
//!
//! ```
//! use rowgroup::analysis::groupings::group;
//! use rowgroup::input::{sample_rows, SAMPLE_FIELDS};
//!
//! let ordered = group(SAMPLE_FIELDS).apply(sample_rows()).unwrap();
//! assert_eq!(ordered.len(), 6);
//! ```

// Public modules
pub mod analysis;
pub mod config;
pub mod error;
pub mod input;
pub mod model;

pub use analysis::groupings::{group, group_by, GroupNode, Grouper, KeyOrder};
pub use error::{ConfigError, GroupError};
pub use model::{GroupKey, Record};
