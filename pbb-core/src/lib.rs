//! Control core for the Push Back competition robot on no-std targets.
//!
//! For a runnable host simulation, see the `pbb-app/mock-brain` binary.
#![no_std]

extern crate alloc;

pub mod utils;
