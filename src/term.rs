//! Elixir Term Conversion Utilities
//!
//! Decodes option keyword lists and encodes nodes and errors.

use rustler::{Atom, Encoder, Env, NewBinary, NifResult, Term};

use crate::config::{ParserOptions, Strategy};
use crate::error::Error;
use crate::streamer::RewindMode;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    // option keys
    strategy,
    capture_depth,
    element_name,
    allow_literal_gt,
    extract_container,
    check_short_closing,
    chunk_size,
    // strategies
    depth_capture,
    named_element,
    // rewind modes
    idle,
    buffering,
    replaying,
    // error reasons
    missing_element_name,
    not_seekable,
    container_not_enabled,
    unclassified_tag,
    io_error,
    unknown_option,
    unknown_strategy,
}

/// Decode a keyword list such as `[element_name: "item", check_short_closing: true]`.
///
/// An `element_name` without an explicit `strategy` selects the named-element
/// strategy. Unknown keys come back as `{:error, {:unknown_option, key}}`.
pub fn decode_options(opts: Term<'_>) -> NifResult<ParserOptions> {
    let pairs: Vec<(Atom, Term<'_>)> = opts.decode()?;
    let mut options = ParserOptions::default();
    let mut explicit_strategy = false;

    for (key, value) in pairs {
        if key == strategy() {
            let name: Atom = value.decode()?;
            options.strategy = if name == depth_capture() {
                Strategy::DepthCapture
            } else if name == named_element() {
                Strategy::NamedElement
            } else {
                return Err(rustler::Error::Term(Box::new((unknown_strategy(), name))));
            };
            explicit_strategy = true;
        } else if key == capture_depth() {
            options.capture_depth = value.decode()?;
        } else if key == element_name() {
            options.element_name = Some(value.decode()?);
        } else if key == allow_literal_gt() {
            options.allow_literal_gt = value.decode()?;
        } else if key == extract_container() {
            options.extract_container = value.decode()?;
        } else if key == check_short_closing() {
            options.check_short_closing = value.decode()?;
        } else if key == chunk_size() {
            let size: usize = value.decode()?;
            options.chunk_size = size.max(1);
        } else {
            return Err(rustler::Error::Term(Box::new((unknown_option(), key))));
        }
    }

    if !explicit_strategy && options.element_name.is_some() {
        options.strategy = Strategy::NamedElement;
    }
    Ok(options)
}

/// Reason atom for an error
pub fn reason_atom(err: &Error) -> Atom {
    match err {
        Error::MissingElementName => missing_element_name(),
        Error::NotSeekable => not_seekable(),
        Error::ContainerNotEnabled => container_not_enabled(),
        Error::UnclassifiedTag(_) => unclassified_tag(),
        Error::Io { .. } => io_error(),
    }
}

/// Turn a crate error into `{:error, reason}`
pub fn nif_error(err: Error) -> rustler::Error {
    log::debug!(target: "xml_node_streamer::nif", "returning {}: {}", err.reason(), err);
    rustler::Error::Term(Box::new(reason_atom(&err)))
}

/// Raise for a poisoned resource lock
pub fn lock_error(reason: &'static str) -> rustler::Error {
    rustler::Error::RaiseAtom(reason)
}

pub fn mode_atom(mode: RewindMode) -> Atom {
    match mode {
        RewindMode::Idle => idle(),
        RewindMode::Buffering => buffering(),
        RewindMode::Replaying => replaying(),
    }
}

/// Create a binary from bytes
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// A node binary, or `nil` at end of input
pub fn node_to_term<'a>(env: Env<'a>, node: Option<Vec<u8>>) -> Term<'a> {
    match node {
        Some(bytes) => bytes_to_binary(env, &bytes),
        None => rustler::types::atom::nil().encode(env),
    }
}

/// Convert nodes to an Elixir list of binaries
pub fn nodes_to_term<'a>(env: Env<'a>, nodes: Vec<Vec<u8>>) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for node in nodes.into_iter().rev() {
        list = list.list_prepend(bytes_to_binary(env, &node));
    }
    list
}
