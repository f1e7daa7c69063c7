//! # gbemu Browser Bootstrap
//!
//! Loads the WebAssembly build of the gbemu Game Boy emulator into a web page
//! and hands control to it.
//!
//! The emulator itself is opaque here. This crate only:
//!
//! 1. asynchronously instantiates the compiled module,
//! 2. records the resulting module handle exactly once per successful
//!    instantiation, and
//! 3. exposes the module's own `run` entry point.
//!
//! ## Quick Start
//!
//! ```rust
//! use futures::executor::block_on;
//! use gbemu_site::{LoaderError, LoaderPhase, ModuleLoader};
//!
//! let loader = ModuleLoader::new(
//!     || async { Ok::<_, String>(42u32) },
//!     |rom: Vec<u8>| rom.first().copied(),
//! );
//!
//! // The gated accessor refuses until the handle is recorded
//! assert_eq!(
//!     loader.run_ready(vec![0xC3u8]),
//!     Err(LoaderError::NotReady { phase: LoaderPhase::Uninitialized })
//! );
//!
//! block_on(loader.init()).unwrap();
//! assert_eq!(loader.state().handle().as_deref(), Some(&42));
//! assert_eq!(loader.run_ready(vec![0xC3u8]), Ok(Some(0xC3)));
//! ```
//!
//! ## Modules
//!
//! - `instantiate` - the asynchronous instantiation capability
//! - `entry` - the module's execution entry point
//! - `state` - owner of the live module handle
//! - `loader` - lifecycle state machine tying the three together
//! - `wasm` - browser exports (`init`, `run`), behind the `wasm` feature

pub mod entry;
pub mod error;
pub mod instantiate;
pub mod loader;
pub mod state;

// Browser bindings (only compiled with the "wasm" feature)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use entry::EntryPoint;
pub use error::LoaderError;
pub use instantiate::Instantiate;
pub use loader::{LoaderOptions, LoaderPhase, ModuleLoader, ReinitPolicy};
pub use state::ModuleState;
