//! Package versions and version ranges.
//!
//! Versions carry up to four numeric parts, dot-separated prerelease labels
//! and build metadata. Ranges are intervals over versions with optional
//! floating behavior, and support the set operations the dependency
//! gatherer relies on: subset tests, union and needed-range subtraction.

pub mod algebra;
pub mod float;
pub mod range;
pub mod version;

pub use float::{FloatBehavior, FloatRange};
pub use range::VersionRange;
pub use version::{Version, VersionComparison};
