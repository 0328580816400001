//! Thread-local stack of in-flight execution contexts.
//!
//! Each worker thread owns its own stack. A context is pushed when an
//! invocation starts and popped when the returned [`ContextGuard`] is
//! dropped, so the depth after an invocation always equals the depth before.

use super::ExecutionContext;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::error;

const TAG: &str = "ContextContainer";

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Rc<ExecutionContext>>> = const { RefCell::new(Vec::new()) };
}

/// Access to the current thread's context stack.
pub struct ContextContainer;

impl ContextContainer {
    /// Pushes a context. It stays on the stack until the guard is dropped.
    #[must_use = "the context is popped as soon as the guard is dropped"]
    pub fn push(context: Rc<ExecutionContext>) -> ContextGuard {
        let depth = CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let depth = stack.len();
            stack.push(context);
            depth
        });
        ContextGuard { depth }
    }

    /// Gets the innermost context.
    pub fn current() -> Option<Rc<ExecutionContext>> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Gets the number of contexts on the stack.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }
}

/// Pops its context on drop.
#[derive(Debug)]
pub struct ContextGuard {
    depth: usize,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown.
        let _ = CONTEXT_STACK.try_with(|stack| {
            match stack.try_borrow_mut() {
                Ok(mut stack) => stack.truncate(self.depth),
                Err(_) => error!(
                    target: TAG,
                    "context stack is borrowed, cannot pop to depth {}",
                    self.depth
                ),
            }
        });
    }
}
