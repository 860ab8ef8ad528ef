//! Output writers for batch and search outcomes.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── scrape_081502.json
//!     └── search_091240.json
//! ```

pub mod json;
