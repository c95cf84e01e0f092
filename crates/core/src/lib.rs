// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod dispute;
mod error;
mod state;
mod transitions;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, open_record};
pub use command::{Command, CommandKind};
pub use dispute::build_dispute;
pub use error::CoreError;
pub use state::{DEFAULT_MAX_CLOCK_SKEW, TransitionContext, TransitionPolicy, TransitionResult};
pub use transitions::{TRANSITIONS, Transition, transition_for};
