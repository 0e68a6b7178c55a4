//! Init command for creating the database.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

/// Runs the init command. The database has already been opened (and so
/// created) by the caller.
pub fn run<W: Write>(writer: &mut W, database_path: &Path) -> Result<()> {
    writeln!(writer, "Database: {}", database_path.display())?;
    Ok(())
}
