//! CLI subcommand implementations.

pub mod import;
pub mod init;
pub mod merge;
pub mod status;
pub mod timeline;
pub mod util;
