//! Core scanning primitives
//!
//! Building blocks shared by both node strategies:
//! - Tags: marker table and span classification
//! - Buffer: chunk accumulation and memchr-backed span shaving

pub mod buffer;
pub mod tags;
