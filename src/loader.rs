//! Module lifecycle: instantiate once, record the handle, hand off to `run`.
//!
//! # State machine
//!
//! ```text
//! Uninitialized --init--> Initializing --resolved--> Ready
//!                              |
//!                              +------rejected-----> Failed
//! ```
//!
//! `init` suspends exactly once, on the instantiation future. The handle is
//! written to [`ModuleState`] only after that future resolves successfully;
//! a rejected instantiation never reaches the setter.
//!
//! Two ways to reach the module's `run` are offered:
//!
//! - [`ModuleLoader::run`] forwards straight to the entry point without
//!   looking at the loader. Calling it before `init` resolves gets whatever
//!   the module itself does in that situation.
//! - [`ModuleLoader::entry`] / [`ModuleLoader::run_ready`] refuse with
//!   [`LoaderError::NotReady`] until the loader is `Ready`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::entry::EntryPoint;
use crate::error::LoaderError;
use crate::instantiate::Instantiate;
use crate::state::ModuleState;

/// Lifecycle phase of a [`ModuleLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderPhase {
    /// `init` has not been called, or a pending call was abandoned.
    Uninitialized,
    /// An `init` call is suspended on instantiation.
    Initializing,
    /// A handle has been recorded.
    Ready,
    /// The last instantiation rejected and no handle is held.
    Failed,
}

impl fmt::Display for LoaderPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LoaderPhase::Uninitialized => "uninitialized",
            LoaderPhase::Initializing => "initializing",
            LoaderPhase::Ready => "ready",
            LoaderPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What `init` does once the loader is already `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReinitPolicy {
    /// Instantiate again and replace the handle (last write wins).
    #[default]
    Replace,
    /// Refuse with [`LoaderError::AlreadyInitialized`].
    Reject,
}

/// Loader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoaderOptions {
    /// Behavior of `init` after a successful initialization.
    pub reinit: ReinitPolicy,
}

impl LoaderOptions {
    /// Set the re-initialization policy.
    pub fn reinit(mut self, policy: ReinitPolicy) -> Self {
        self.reinit = policy;
        self
    }
}

/// Owns the lifecycle of the compiled emulator module.
///
/// `I` instantiates the module, `E` is the module's `run` export. The
/// handle lives in a shared [`ModuleState`], which can be injected with
/// [`ModuleLoader::with_state`] so that other components read the same slot.
///
/// All methods take `&self`: the loader is meant to sit behind an `Rc` on a
/// single-threaded event loop, where `run` may be called while an `init`
/// is still suspended.
///
/// # Examples
///
/// ```rust
/// use futures::executor::block_on;
/// use gbemu_site::{LoaderPhase, ModuleLoader};
///
/// let loader = ModuleLoader::new(
///     || async { Ok::<_, String>("exports") },
///     |rom: Vec<u8>| rom.len(),
/// );
///
/// assert_eq!(loader.phase(), LoaderPhase::Uninitialized);
/// block_on(loader.init()).unwrap();
///
/// assert!(loader.is_ready());
/// assert_eq!(loader.run_ready(vec![0u8; 32]), Ok(32));
/// ```
pub struct ModuleLoader<I: Instantiate, E> {
    instantiator: I,
    entry: E,
    state: Rc<ModuleState<I::Handle>>,
    phase: Cell<LoaderPhase>,
    options: LoaderOptions,
}

impl<I: Instantiate, E> ModuleLoader<I, E> {
    /// Create a loader with its own empty [`ModuleState`].
    pub fn new(instantiator: I, entry: E) -> Self {
        Self::with_state(instantiator, entry, Rc::new(ModuleState::new()))
    }

    /// Create a loader that records its handle into `state`.
    ///
    /// If `state` already holds a handle the loader starts out `Ready`.
    pub fn with_state(instantiator: I, entry: E, state: Rc<ModuleState<I::Handle>>) -> Self {
        let phase = if state.is_initialized() {
            LoaderPhase::Ready
        } else {
            LoaderPhase::Uninitialized
        };

        ModuleLoader {
            instantiator,
            entry,
            state,
            phase: Cell::new(phase),
            options: LoaderOptions::default(),
        }
    }

    /// Replace the loader options.
    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LoaderPhase {
        self.phase.get()
    }

    /// Whether a handle has been recorded and `run_ready` will be forwarded.
    pub fn is_ready(&self) -> bool {
        self.phase.get() == LoaderPhase::Ready
    }

    /// The shared state holding the module handle.
    pub fn state(&self) -> &Rc<ModuleState<I::Handle>> {
        &self.state
    }

    /// Instantiate the module and record its handle.
    ///
    /// Resolves with no value; the handle is only reachable through
    /// [`state`](ModuleLoader::state).
    ///
    /// # Errors
    ///
    /// - [`LoaderError::Instantiation`] with the host's rejection value. The
    ///   state is left untouched.
    /// - [`LoaderError::InitInProgress`] if another call is still suspended.
    /// - [`LoaderError::AlreadyInitialized`] if the loader is `Ready` and the
    ///   options say [`ReinitPolicy::Reject`].
    ///
    /// Dropping the returned future while it is suspended puts the loader
    /// back in the phase it had before the call.
    pub async fn init(&self) -> Result<(), LoaderError<I::Error>> {
        match self.phase.get() {
            LoaderPhase::Initializing => {
                warn!("init called while module instantiation is pending");
                return Err(LoaderError::InitInProgress);
            }
            LoaderPhase::Ready if self.options.reinit == ReinitPolicy::Reject => {
                warn!("init called on a ready module; re-initialization is disabled");
                return Err(LoaderError::AlreadyInitialized);
            }
            _ => {}
        }

        let guard = PhaseGuard::enter(&self.phase);
        debug!("instantiating module");

        match self.instantiator.instantiate().await {
            Ok(handle) => {
                self.state.set_handle(handle);
                guard.finish(LoaderPhase::Ready);
                info!(
                    assignments = self.state.assignments(),
                    "module instantiated and handle recorded"
                );
                Ok(())
            }
            Err(err) => {
                // A handle from an earlier successful call is still live.
                let phase = if self.state.is_initialized() {
                    LoaderPhase::Ready
                } else {
                    LoaderPhase::Failed
                };
                guard.finish(phase);
                warn!(%phase, "module instantiation failed");
                Err(LoaderError::Instantiation(err))
            }
        }
    }

    /// Forward `args` to the module's entry point, regardless of phase.
    ///
    /// Nothing is added, checked or translated: the result is exactly what
    /// the entry point returns.
    pub fn run<A>(&self, args: A) -> E::Output
    where
        E: EntryPoint<A>,
    {
        self.entry.run(args)
    }

    /// The module's entry point, once the loader is `Ready`.
    ///
    /// # Errors
    ///
    /// [`LoaderError::NotReady`] in any other phase.
    pub fn entry(&self) -> Result<&E, LoaderError<I::Error>> {
        match self.phase.get() {
            LoaderPhase::Ready => Ok(&self.entry),
            phase => Err(LoaderError::NotReady { phase }),
        }
    }

    /// Forward `args` to the module's entry point if the loader is `Ready`.
    ///
    /// # Errors
    ///
    /// [`LoaderError::NotReady`] before a handle is recorded. Errors of the
    /// module itself are inside the `Ok` value.
    pub fn run_ready<A>(&self, args: A) -> Result<E::Output, LoaderError<I::Error>>
    where
        E: EntryPoint<A>,
    {
        Ok(self.entry()?.run(args))
    }
}

impl<I, E> fmt::Debug for ModuleLoader<I, E>
where
    I: Instantiate,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("phase", &self.phase.get())
            .field("initialized", &self.state.is_initialized())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Marks the loader `Initializing` for the duration of one `init` call and
/// restores the previous phase if the call is dropped before finishing.
struct PhaseGuard<'a> {
    phase: &'a Cell<LoaderPhase>,
    previous: LoaderPhase,
    finished: bool,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a Cell<LoaderPhase>) -> Self {
        let previous = phase.replace(LoaderPhase::Initializing);
        PhaseGuard {
            phase,
            previous,
            finished: false,
        }
    }

    fn finish(mut self, outcome: LoaderPhase) {
        self.phase.set(outcome);
        self.finished = true;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(previous = %self.previous, "init abandoned before instantiation settled");
            self.phase.set(self.previous);
        }
    }
}
