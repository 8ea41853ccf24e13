//! Repository snapshot commits: enumerate a local tree, push it as one commit.

pub mod committer;
pub mod enumerate;

pub use committer::{CommitRequest, SnapshotCommitter};
pub use enumerate::IgnoreSet;
