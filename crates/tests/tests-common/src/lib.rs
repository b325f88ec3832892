//! Common functions used across test cases.

pub mod deployment;
pub mod dto;
pub mod entities;
pub mod fixtures;
