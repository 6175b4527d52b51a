pub mod table;

use anyhow::Result;
use serde::Serialize;

/// Pretty-print any serializable value as JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
