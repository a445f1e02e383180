//! Logic Module - Assessment pipeline
//!
//! - `features/` - Layout, schema, record encoding
//! - `model/` - Risk model seam, loaders, thresholds
//! - `audit` - Append-only record log
//! - `flow` - Screens and the build → predict → classify pipeline

pub mod audit;
pub mod features;
pub mod flow;
pub mod model;
