//! Shared data types: horizon buckets, source categories, problems,
//! raw upstream records and submissions.

mod horizon;
mod problem;
mod records;
mod source;
mod submission;

pub use horizon::*;
pub use problem::*;
pub use records::*;
pub use source::*;
pub use submission::*;
