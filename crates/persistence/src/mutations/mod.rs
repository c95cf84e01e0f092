// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules for persistence layer.
//!
//! ## Module Organization
//!
//! - `records` — Record creation
//! - `transitions` — Atomic record update plus action append

pub mod records;
pub mod transitions;

pub use transitions::PersistedTransition;
