//! Property-based tests for loader invariants.
//!
//! These tests use proptest to check that `run` is a faithful pass-through
//! and that repeated initialization keeps exactly one handle, the latest.

use futures::executor::block_on;
use gbemu_site::{LoaderPhase, ModuleLoader};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Handle that counts how many of its instances are alive.
#[derive(Debug)]
struct TrackedHandle {
    id: u32,
    live: Rc<RefCell<u32>>,
}

impl TrackedHandle {
    fn new(id: u32, live: &Rc<RefCell<u32>>) -> Self {
        *live.borrow_mut() += 1;
        TrackedHandle {
            id,
            live: Rc::clone(live),
        }
    }
}

impl Drop for TrackedHandle {
    fn drop(&mut self) {
        *self.live.borrow_mut() -= 1;
    }
}

proptest! {
    #[test]
    fn prop_run_returns_module_output(rom in prop::collection::vec(any::<u8>(), 0..512), seed in any::<u32>()) {
        let module = move |rom: Vec<u8>| -> Result<u32, String> {
            if rom.len() % 7 == 3 {
                return Err(format!("trap at {}", rom.len()));
            }
            Ok(rom.iter().fold(seed, |acc, &b| acc.rotate_left(5) ^ b as u32))
        };
        let loader = ModuleLoader::new(|| async { Ok::<_, ()>(()) }, module);

        // Before init, through the raw pass-through
        prop_assert_eq!(loader.run(rom.clone()), module(rom.clone()));

        // After init, through the readiness gate
        block_on(loader.init()).unwrap();
        prop_assert_eq!(loader.run_ready(rom.clone()), Ok(module(rom)));
    }

    #[test]
    fn prop_last_successful_init_wins(outcomes in prop::collection::vec(any::<Option<u32>>(), 1..24)) {
        let live = Rc::new(RefCell::new(0u32));
        let script: RefCell<VecDeque<Option<u32>>> = RefCell::new(outcomes.iter().copied().collect());
        let instantiator = || {
            let next = script.borrow_mut().pop_front().flatten();
            let handle = next.map(|id| TrackedHandle::new(id, &live));
            async move { handle.ok_or("rejected") }
        };
        let loader = ModuleLoader::new(instantiator, |_: ()| ());

        for _ in 0..outcomes.len() {
            let _ = block_on(loader.init());
            prop_assert!(*live.borrow() <= 1, "more than one handle alive");
        }

        let expected = outcomes.iter().rev().find_map(|o| *o);
        let recorded = loader.state().handle().map(|h| h.id);
        prop_assert_eq!(recorded, expected);

        let successes = outcomes.iter().filter(|o| o.is_some()).count() as u64;
        prop_assert_eq!(loader.state().assignments(), successes);

        let phase = if expected.is_some() { LoaderPhase::Ready } else { LoaderPhase::Failed };
        prop_assert_eq!(loader.phase(), phase);
    }
}
