//! Stack safety for deep recursion.
//!
//! Resolution, checking, reduction and evaluation all recurse over the tree
//! (and evaluation also recurses through calls), so each recursive entry
//! point runs inside [`ensure_sufficient_stack`].

/// If less than this much stack remains, grow it.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first allocating a new stack segment if the current one is
/// close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
