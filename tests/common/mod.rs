#![cfg(feature = "rusqlite")]

mod rusqlite;
pub use rusqlite::*;

pub mod helpers;
