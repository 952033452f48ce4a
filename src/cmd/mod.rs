pub mod agent;
pub mod config;

use std::io;

use serde::Serialize;

use crate::error::AppResult;

/// Prints an outcome as pretty JSON or as the human summary.
pub fn emit<T, F>(json: bool, value: &T, human: F) -> AppResult<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if json {
        let rendered = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
        println!("{rendered}");
    } else {
        println!("{}", human(value));
    }
    Ok(())
}
