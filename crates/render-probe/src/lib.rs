//! displaykit Render Probe
//!
//! Answers "can we use GPU acceleration, and with what confidence":
//!
//! ```text
//!  option string ──► registry ──► probe::select ──► self_test::run
//!                    (candidates)  (first non-empty   (one draw/present
//!                                   capability set)    cycle, window always
//!                                                      destroyed)
//! ```
//!
//! Running out of candidates is a normal outcome (empty capabilities, no
//! backend). Only presentation failures are reported to the caller, through
//! [`SelfTestResult`].

pub mod backend;
pub mod capabilities;
pub mod glcheck;
pub mod host;
pub mod probe;
pub mod registry;

pub use backend::{
    BackendHandle, BackendKind, BackendLoadError, BackendLoader, ClientWindow, RenderBackend,
    StaticBackendTable, WindowSpec,
};
pub use capabilities::Capabilities;
pub use glcheck::{check_acceleration, AccelerationReport, GlCheckOptions};
pub use host::{FakeHost, HostContext};
pub use probe::select;
pub use registry::{backends_from_option, BackendCandidate};
pub use self_test::{run, InteractiveOptions, SelfTestMode, SelfTestResult};
