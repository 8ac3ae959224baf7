// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Dispatcher trace lines.
//!
//! Lines are emitted through [`log`] at `info` level with target
//! [`TRACE_TARGET`]. Their text is stable:
//!
//! ```text
//! function: create_session (enter)
//! message:  extBuf enabled -- NumThread (2)
//! function: create_session (return)
//! ```

use std::fmt;

use crate::schema::PassThroughKey;
use crate::variant::Variant;

pub const TRACE_TARGET: &str = "vpldispatch::trace";

/// Logs entry on creation and return on drop.
pub(crate) struct FunctionTrace {
    name: &'static str,
}

impl FunctionTrace {
    pub(crate) fn enter(name: &'static str) -> FunctionTrace {
        log::info!(target: TRACE_TARGET, "function: {} (enter)", name);
        FunctionTrace { name }
    }
}

impl Drop for FunctionTrace {
    fn drop(&mut self) {
        log::info!(target: TRACE_TARGET, "function: {} (return)", self.name);
    }
}

pub(crate) fn message(args: fmt::Arguments<'_>) {
    log::info!(target: TRACE_TARGET, "message:  {}", args);
}

pub(crate) fn ext_buf(key: PassThroughKey, value: &Variant) {
    message(format_args!("extBuf enabled -- {} ({})", key.name(), value));
}
