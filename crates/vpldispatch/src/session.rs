// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;

use log::warn;

use crate::config::PassThrough;
use crate::runtime::RuntimeSession;
use crate::schema::PassThroughKey;
use crate::variant::{NativeHandle, Variant};
use crate::Error;

/// A session created on one runtime implementation.
///
/// The runtime session is closed when the `Session` is dropped; use
/// [`close`](Self::close) to observe the runtime's status.
pub struct Session {
    inner: Option<Box<dyn RuntimeSession>>,
    library: String,
    impl_index: u32,
    impl_name: String,
    settings: PassThrough,
}

impl Session {
    pub(crate) fn new(
        inner: Box<dyn RuntimeSession>,
        library: String,
        impl_index: u32,
        impl_name: String,
        settings: PassThrough,
    ) -> Session {
        Session {
            inner: Some(inner),
            library,
            impl_index,
            impl_name,
            settings,
        }
    }

    /// Runtime library the session was created on.
    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn impl_index(&self) -> u32 {
        self.impl_index
    }

    pub fn impl_name(&self) -> &str {
        &self.impl_name
    }

    /// Pass-through settings the session was created with.
    pub fn settings(&self) -> &PassThrough {
        &self.settings
    }

    pub fn setting(&self, key: PassThroughKey) -> Option<&Variant> {
        self.settings.get(key)
    }

    pub fn num_thread(&self) -> Option<u32> {
        self.settings.num_thread()
    }

    pub fn device_copy(&self) -> Option<u16> {
        self.settings.device_copy()
    }

    pub fn adapter_index(&self) -> Option<u32> {
        self.settings.adapter_index()
    }

    /// Extension buffers passed to the runtime, one per config that set
    /// `ExtBuffer`, in config order.
    pub fn ext_buffers(&self) -> &[NativeHandle] {
        self.settings.ext_buffers()
    }

    /// Native handle of `handle_type`.
    ///
    /// A handle forwarded with `mfxHandleType`/`mfxHDL` is returned as given;
    /// otherwise the runtime session is asked.
    pub fn handle(&self, handle_type: u32) -> Option<NativeHandle> {
        if self.settings.handle_type() == Some(handle_type) {
            if let Some(handle) = self.settings.handle() {
                return Some(handle);
            }
        }
        self.inner.as_ref()?.handle(handle_type)
    }

    /// Close the runtime session.
    pub fn close(mut self) -> Result<(), Error> {
        match self.inner.take() {
            Some(mut inner) => inner.close(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("library", &self.library)
            .field("impl_index", &self.impl_index)
            .field("impl_name", &self.impl_name)
            .field("settings", &self.settings)
            .field("open", &self.inner.is_some())
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            if let Err(err) = inner.close() {
                warn!("closing session on {} failed: {}", self.library, err);
            }
        }
    }
}
