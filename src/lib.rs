//! xml_node_streamer - Incremental XML node extraction
//!
//! Pulls XML bytes in chunks and hands out complete element substrings one
//! at a time, without building a document tree.
//!
//! Strategies:
//! A: Depth capture (every element at a fixed nesting depth)
//! B: Named element (every element with a given name, at any depth)
//!
//! Both run over any [`ChunkProvider`] through [`XmlStreamer`], and
//! [`RewindableStreamer`] adds replay of already produced nodes.

pub mod config;
pub mod core;
pub mod error;
pub mod provider;
pub mod strategy;
pub mod streamer;

mod resource;
mod term;

pub use config::{ParserOptions, Strategy};
pub use error::{Error, Result};
pub use provider::{ChunkProvider, FileProvider, MemoryProvider, ReaderProvider, SeekableProvider};
pub use strategy::{DepthCaptureParser, NamedElementParser, NodeParser, Parser};
pub use streamer::{RewindMode, RewindableStreamer, XmlStreamer};

use resource::{NativeSource, StreamerRef, StreamerResource};
use rustler::{Atom, Binary, Encoder, Env, NifResult, ResourceArc, Term};
use term::{lock_error, nif_error};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Streamer Construction
// ============================================================================

fn open_streamer(source: NativeSource, options: &ParserOptions) -> NifResult<StreamerRef> {
    let streamer = XmlStreamer::with_options(source, options).map_err(nif_error)?;
    Ok(ResourceArc::new(StreamerResource::new(streamer.into())))
}

/// Open a streamer over a file
#[rustler::nif(schedule = "DirtyIo")]
fn streamer_open(path: String, opts: Term) -> NifResult<StreamerRef> {
    let options = term::decode_options(opts)?;
    // Reject a bad configuration before touching the file
    Parser::new(&options).map_err(nif_error)?;
    let provider = FileProvider::open(&path, options.chunk_size).map_err(nif_error)?;
    open_streamer(NativeSource::File(provider), &options)
}

/// Open a streamer over an in-memory binary
#[rustler::nif]
fn streamer_from_binary(input: Binary, opts: Term) -> NifResult<StreamerRef> {
    let options = term::decode_options(opts)?;
    let provider = MemoryProvider::with_chunk_size(input.as_slice(), options.chunk_size);
    open_streamer(NativeSource::Memory(provider), &options)
}

// ============================================================================
// Node Access
// ============================================================================

/// Next node as a binary, or `nil` at end of input
#[rustler::nif(schedule = "DirtyIo")]
fn streamer_get_node<'a>(env: Env<'a>, streamer: StreamerRef) -> NifResult<Term<'a>> {
    let node = streamer
        .with_streamer(|s| s.get_node())
        .map_err(lock_error)?
        .map_err(nif_error)?;
    Ok(term::node_to_term(env, node))
}

/// Take up to `max` nodes. A shorter list means the input is exhausted.
#[rustler::nif(schedule = "DirtyIo")]
fn streamer_take_nodes<'a>(env: Env<'a>, streamer: StreamerRef, max: usize) -> NifResult<Term<'a>> {
    let nodes = streamer
        .with_streamer(|s| {
            let mut nodes = Vec::with_capacity(max.min(1024));
            while nodes.len() < max {
                match s.get_node()? {
                    Some(node) => nodes.push(node),
                    None => break,
                }
            }
            Ok::<_, Error>(nodes)
        })
        .map_err(lock_error)?
        .map_err(nif_error)?;
    Ok(term::nodes_to_term(env, nodes))
}

/// `{:ok, binary}` with the container markup, or `{:error, :container_not_enabled}`
#[rustler::nif]
fn streamer_extracted_container<'a>(env: Env<'a>, streamer: StreamerRef) -> NifResult<Term<'a>> {
    streamer
        .with_streamer(|s| {
            s.inner()
                .extracted_container()
                .map(|container| (rustler::types::atom::ok(), term::bytes_to_binary(env, container)).encode(env))
        })
        .map_err(lock_error)?
        .map_err(nif_error)
}

// ============================================================================
// Rewind Control
// ============================================================================

#[rustler::nif]
fn streamer_set_rewind_point(streamer: StreamerRef) -> NifResult<Atom> {
    streamer.with_streamer(|s| s.set_rewind_point()).map_err(lock_error)?;
    Ok(rustler::types::atom::ok())
}

#[rustler::nif]
fn streamer_remove_rewind_point(streamer: StreamerRef) -> NifResult<Atom> {
    streamer.with_streamer(|s| s.remove_rewind_point()).map_err(lock_error)?;
    Ok(rustler::types::atom::ok())
}

#[rustler::nif]
fn streamer_rewind(streamer: StreamerRef) -> NifResult<Atom> {
    streamer.with_streamer(|s| s.rewind()).map_err(lock_error)?;
    Ok(rustler::types::atom::ok())
}

/// Reset the parser and drop the rewind point, rewinding the source when asked to
#[rustler::nif(schedule = "DirtyIo")]
fn streamer_reset(streamer: StreamerRef, rewind_source: bool) -> NifResult<Atom> {
    streamer
        .with_streamer(|s| s.reset(rewind_source))
        .map_err(lock_error)?
        .map_err(nif_error)?;
    Ok(rustler::types::atom::ok())
}

/// Get streamer status as `{mode, buffered_bytes, seekable}`
#[rustler::nif]
fn streamer_status(streamer: StreamerRef) -> NifResult<(Atom, usize, bool)> {
    streamer
        .with_streamer(|s| {
            (
                term::mode_atom(s.mode()),
                s.buffered_bytes(),
                s.inner().provider().is_seekable(),
            )
        })
        .map_err(lock_error)
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.XmlNodeStreamer.Native");
