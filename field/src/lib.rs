//! A framework for prime fields.

#![no_std]

extern crate alloc;

mod field;
mod fp64;
mod helpers;

pub use field::*;
pub use fp64::*;
pub use helpers::*;
