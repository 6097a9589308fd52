#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate simple_error;

pub mod archive;
pub mod config;
pub mod cover;
pub mod database;
pub mod device;
pub mod download;
pub mod error;
pub mod jobs;
pub mod merge;
pub mod model;
pub mod multidownload;
pub mod progress;
pub mod scoring;
pub mod util;

#[cfg(test)]
mod fixtures;

pub use simple_error::{SimpleError, SimpleResult};
