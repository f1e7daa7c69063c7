//! WebAssembly bindings for the page bootstrap.
//!
//! This module is the page-facing side of the loader: it imports the
//! emulator's wasm-bindgen glue and exports `init` and `run` to JavaScript.

pub mod api;

pub use api::{init, is_ready, loader_phase, run, run_ready};
