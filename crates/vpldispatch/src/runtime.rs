// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Runtime implementations as seen by the dispatcher.
//!
//! A [`Runtime`] is one installed library. It reports one capability
//! descriptor per implementation it exposes and creates sessions on request.
//! [`LibraryRuntime`] adapts a shared library exporting the `vplrt_*` entry
//! points; tests and embedders can provide their own implementations.

use std::{
    ffi::{c_void, CStr},
    path::{Path, PathBuf},
    ptr,
    sync::Arc,
};

use log::{debug, warn};
use vpldispatch_sys as ffi;

use crate::config::PassThrough;
use crate::variant::NativeHandle;
use crate::Error;

/// Capability descriptor formats a runtime can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapsFormat {
    ImplDescription,
    ImplementedFunctions,
    ExtendedDeviceId,
    SurfaceTypes,
}

impl CapsFormat {
    pub const ALL: [CapsFormat; 4] = [
        CapsFormat::ImplDescription,
        CapsFormat::ImplementedFunctions,
        CapsFormat::ExtendedDeviceId,
        CapsFormat::SurfaceTypes,
    ];

    pub fn raw(self) -> u32 {
        match self {
            CapsFormat::ImplDescription => ffi::VPLRT_FORMAT_IMPL_DESCRIPTION,
            CapsFormat::ImplementedFunctions => ffi::VPLRT_FORMAT_IMPLEMENTED_FUNCTIONS,
            CapsFormat::ExtendedDeviceId => ffi::VPLRT_FORMAT_EXTENDED_DEVICE_ID,
            CapsFormat::SurfaceTypes => ffi::VPLRT_FORMAT_SURFACE_TYPES,
        }
    }

    pub fn from_raw(raw: u32) -> Option<CapsFormat> {
        CapsFormat::ALL.into_iter().find(|f| f.raw() == raw)
    }
}

/// An installed runtime library.
pub trait Runtime: Send + Sync {
    /// Library identity used in logs and on created sessions.
    fn name(&self) -> &str;

    /// One descriptor blob per implementation, in implementation order.
    ///
    /// An empty list means the format is not reported at all; an empty blob
    /// means the implementation at that index does not report it.
    fn query(&self, format: CapsFormat) -> Result<Vec<Vec<u8>>, Error>;

    /// Create a session on implementation `impl_index`.
    fn initialize(
        &self,
        impl_index: u32,
        settings: &PassThrough,
    ) -> Result<Box<dyn RuntimeSession>, Error>;
}

/// A session created by a [`Runtime`].
pub trait RuntimeSession: Send {
    /// Native handle of the given type owned by the runtime session.
    fn handle(&self, _handle_type: u32) -> Option<NativeHandle> {
        None
    }

    fn close(&mut self) -> Result<(), Error>;
}

/// A runtime loaded from a shared library.
pub struct LibraryRuntime {
    name: String,
    path: PathBuf,
    lib: Arc<ffi::RuntimeLibrary>,
}

impl LibraryRuntime {
    /// Load the runtime library at `path`.
    ///
    /// Fails with [`Error::LibraryNotLoaded`] if the file cannot be loaded or
    /// lacks any of [`ffi::REQUIRED_SYMBOLS`].
    pub fn open(path: &Path) -> Result<LibraryRuntime, Error> {
        let lib = unsafe { ffi::RuntimeLibrary::new(path) }?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if lib.vplrt_get_handle.is_none() {
            debug!("{}: vplrt_get_handle not exported", name);
        }

        Ok(LibraryRuntime {
            name,
            path: path.to_path_buf(),
            lib: Arc::new(lib),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Runtime for LibraryRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, format: CapsFormat) -> Result<Vec<Vec<u8>>, Error> {
        let mut num_impls = 0u32;
        let descs = unsafe { self.lib.vplrt_query_impls(format.raw(), &mut num_impls) };
        if descs.is_null() {
            return Ok(Vec::new());
        }

        let mut blobs = Vec::with_capacity(num_impls as usize);
        for idx in 0..num_impls as usize {
            let desc = unsafe { *descs.add(idx) };
            if desc.is_null() {
                blobs.push(Vec::new());
            } else {
                blobs.push(unsafe { CStr::from_ptr(desc) }.to_bytes().to_vec());
            }
        }
        unsafe { self.lib.vplrt_release_impls(descs, num_impls) };

        Ok(blobs)
    }

    fn initialize(
        &self,
        impl_index: u32,
        settings: &PassThrough,
    ) -> Result<Box<dyn RuntimeSession>, Error> {
        let mut params = ffi::vplrt_init_params::default();
        if let Some(num_thread) = settings.num_thread() {
            params.flags |= ffi::VPLRT_PARAM_NUM_THREAD;
            params.num_thread = num_thread;
        }
        if let Some(device_copy) = settings.device_copy() {
            params.flags |= ffi::VPLRT_PARAM_DEVICE_COPY;
            params.device_copy = device_copy;
        }
        if let (Some(handle_type), Some(handle)) = (settings.handle_type(), settings.handle()) {
            params.flags |= ffi::VPLRT_PARAM_HANDLE;
            params.handle_type = handle_type;
            params.handle = handle.as_ptr();
        }
        if let Some(adapter_index) = settings.adapter_index() {
            params.flags |= ffi::VPLRT_PARAM_ADAPTER_INDEX;
            params.adapter_index = adapter_index;
        }
        // Must outlive the vplrt_initialize call below.
        let mut ext_buffers: Vec<*mut c_void> = settings
            .ext_buffers()
            .iter()
            .map(|buffer| buffer.as_ptr())
            .collect();
        if !ext_buffers.is_empty() {
            params.flags |= ffi::VPLRT_PARAM_EXT_BUFFERS;
            params.ext_buffers = ext_buffers.as_mut_ptr();
            params.num_ext_buffers =
                u32::try_from(ext_buffers.len()).map_err(|_| Error::Unsupported)?;
        }

        let mut session: *mut c_void = ptr::null_mut();
        let status = unsafe { self.lib.vplrt_initialize(impl_index, &params, &mut session) };
        if status != 0 {
            return Err(Error::Runtime(status));
        }
        if session.is_null() {
            return Err(Error::NullPointer);
        }

        Ok(Box::new(LibrarySession {
            lib: self.lib.clone(),
            session,
        }))
    }
}

struct LibrarySession {
    lib: Arc<ffi::RuntimeLibrary>,
    session: *mut c_void,
}

// SAFETY: the runtime session pointer is owned exclusively by this value and
// the runtime ABI allows a session to be used from any single thread.
unsafe impl Send for LibrarySession {}

impl RuntimeSession for LibrarySession {
    fn handle(&self, handle_type: u32) -> Option<NativeHandle> {
        let mut handle: *mut c_void = ptr::null_mut();
        let status = unsafe {
            self.lib
                .vplrt_get_handle(self.session, handle_type, &mut handle)
        }?;
        if status == 0 && !handle.is_null() {
            Some(NativeHandle::from_ptr(handle))
        } else {
            None
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        if self.session.is_null() {
            return Ok(());
        }
        let status = unsafe { self.lib.vplrt_close(self.session) };
        self.session = ptr::null_mut();
        if status != 0 {
            warn!("vplrt_close returned {}", status);
            return Err(Error::Runtime(status));
        }
        Ok(())
    }
}

impl Drop for LibrarySession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
