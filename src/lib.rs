//! tv-transformer
//!
//! Matches loosely named TV episode files against series metadata from
//! TheTVDB or TVMaze and plans their relocation into
//! `{series}/{series} - SxxEyy - {title}.{ext}`, asking the operator whenever
//! a match is not exact.

pub mod cli;
pub mod config;
pub mod error;
pub mod services;
