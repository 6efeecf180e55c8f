//! Library surface for the `file-sum` demo binary and its integration tests.

pub mod question;
pub mod rule;

pub use question::{FileContentSumAnswer, FileContentSumQuestion};
pub use rule::JoinFilesRule;
