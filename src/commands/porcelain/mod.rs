//! Porcelain commands (user-facing workflows)
//!
//! - `init`: create an empty repository, optionally bare
//! - `add` / `rm`: stage and unstage paths
//! - `commit`: record the index as a commit, concluding a pending merge
//! - `branch`: list, create and delete branches
//! - `checkout`: switch branches or detach HEAD
//! - `diff`: name-status or unified patch between snapshots
//! - `status`: summary of local changes
//! - `merge`: fast-forward or three-way merge, and `--abort`
//! - `fetch` / `push` / `pull`: exchange with a repository on the local filesystem

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod fetch;
pub mod init;
pub mod merge;
pub mod pull;
pub mod push;
pub mod rm;
pub mod status;
