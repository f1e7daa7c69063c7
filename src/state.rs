//! Owner of the live module handle.
//!
//! `ModuleState` replaces a bare page-global variable: it is created by
//! whoever hosts the loader and passed (behind an `Rc`) to anything that
//! needs the handle. Each page normally holds exactly one.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Slot holding at most one instantiated module handle.
///
/// Starts empty (`Uninitialized`). [`set_handle`](ModuleState::set_handle)
/// is the only writer.
///
/// # Examples
///
/// ```rust
/// use gbemu_site::ModuleState;
///
/// let state = ModuleState::new();
/// assert!(!state.is_initialized());
///
/// state.set_handle("exports");
/// assert_eq!(state.handle().as_deref(), Some(&"exports"));
/// ```
#[derive(Debug)]
pub struct ModuleState<H> {
    handle: RefCell<Option<Rc<H>>>,
    assignments: Cell<u64>,
}

impl<H> ModuleState<H> {
    /// Create an empty state.
    pub fn new() -> Self {
        ModuleState {
            handle: RefCell::new(None),
            assignments: Cell::new(0),
        }
    }

    /// Replace the current handle with `handle`.
    ///
    /// No validation of the prior state is done. The state releases its
    /// reference to the previous handle here, so it only ever holds one.
    /// Readers that cloned the previous handle keep it alive on their own.
    pub fn set_handle(&self, handle: H) {
        let previous = self.handle.replace(Some(Rc::new(handle)));
        drop(previous);
        self.assignments.set(self.assignments.get() + 1);
    }

    /// The current handle, if one has been recorded.
    ///
    /// No borrow of the state outlives this call, so holding the returned
    /// handle never blocks the setter.
    pub fn handle(&self) -> Option<Rc<H>> {
        self.handle.borrow().clone()
    }

    /// Whether a handle has been recorded.
    pub fn is_initialized(&self) -> bool {
        self.handle.borrow().is_some()
    }

    /// Number of times the setter has run.
    pub fn assignments(&self) -> u64 {
        self.assignments.get()
    }
}

impl<H> Default for ModuleState<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state: ModuleState<u32> = ModuleState::new();
        assert!(!state.is_initialized());
        assert!(state.handle().is_none());
        assert_eq!(state.assignments(), 0);
    }

    #[test]
    fn test_set_handle_replaces_and_releases_previous() {
        let first = Rc::new(1);
        let second = Rc::new(2);
        let state = ModuleState::new();

        state.set_handle(Rc::clone(&first));
        assert_eq!(Rc::strong_count(&first), 2);

        state.set_handle(Rc::clone(&second));
        assert_eq!(Rc::strong_count(&first), 1, "old handle must be released");
        assert_eq!(**state.handle().unwrap(), 2);
        assert_eq!(state.assignments(), 2);
    }

    #[test]
    fn test_set_handle_while_reader_holds_previous() {
        let state = ModuleState::new();
        state.set_handle("H1");

        let reader = state.handle().unwrap();
        state.set_handle("H2");

        assert_eq!(*reader, "H1");
        assert_eq!(state.handle().as_deref(), Some(&"H2"));
    }
}
