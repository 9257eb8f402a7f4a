//! Host context a backend window may call into.
//!
//! A real client provides coordinate scaling, main-loop scheduling and
//! pointer state. The self-test runs without a client, so it hands the
//! backend a [`FakeHost`]: scaling is the identity, idle callbacks run
//! inline, and queries return fixed defaults.
//!
//! Timer scheduling is not part of [`HostContext`]. Only the interactive
//! self-test owns a [`RepaintTimer`].

use std::time::Duration;

/// The narrow surface a backend window needs from its client.
pub trait HostContext: Send + Sync {
    /// Convert a point from client to server coordinates.
    fn to_server(&self, x: i32, y: i32) -> (i32, i32);

    /// Convert a point from server to client coordinates.
    fn to_client(&self, x: i32, y: i32) -> (i32, i32);

    /// Run `task` from the client's main loop.
    fn idle_add<'a>(&self, task: Box<dyn FnOnce() + 'a>);

    fn mouse_position(&self) -> (i32, i32);

    fn current_modifiers(&self) -> Vec<String>;
}

/// Client stand-in used by the self-test.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeHost;

impl HostContext for FakeHost {
    fn to_server(&self, x: i32, y: i32) -> (i32, i32) {
        (x, y)
    }

    fn to_client(&self, x: i32, y: i32) -> (i32, i32) {
        (x, y)
    }

    fn idle_add<'a>(&self, task: Box<dyn FnOnce() + 'a>) {
        task();
    }

    fn mouse_position(&self) -> (i32, i32) {
        (0, 0)
    }

    fn current_modifiers(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Poll interval of the interactive loop when repaints are disabled.
pub const IDLE_POLL: Duration = Duration::from_millis(50);

/// Drives repeated repaints in the interactive self-test.
#[derive(Debug, Clone, Copy)]
pub struct RepaintTimer {
    delay: Duration,
}

impl RepaintTimer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A zero delay means paint once and then only wait for exit.
    pub fn repeats(&self) -> bool {
        !self.delay.is_zero()
    }

    /// Block until the next tick; returns whether a repaint is due.
    pub fn wait(&self) -> bool {
        if self.repeats() {
            std::thread::sleep(self.delay);
            true
        } else {
            std::thread::sleep(IDLE_POLL);
            false
        }
    }
}
