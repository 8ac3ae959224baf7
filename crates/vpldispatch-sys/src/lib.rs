// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Runtime plugin ABI for vpldispatch.
//!
//! A runtime library is any shared object exporting the `vplrt_*` entry
//! points declared here. The dispatcher resolves them at runtime through
//! [`libloading`], so no runtime needs to be present at build time.
//!
//! Capability descriptors cross the boundary as NUL-terminated JSON
//! documents, one per implementation exposed by the library, which keeps the
//! ABI independent of descriptor struct layouts and versions.

#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

// Re-export libloading for error handling
pub use libloading;

use std::ffi::{c_char, c_void, OsStr};

/// Implementation description (`mfxImplDescription`) capability format.
pub const VPLRT_FORMAT_IMPL_DESCRIPTION: u32 = 1;
/// Implemented functions (`mfxImplementedFunctions`) capability format.
pub const VPLRT_FORMAT_IMPLEMENTED_FUNCTIONS: u32 = 2;
/// Extended device identification (`mfxExtendedDeviceId`) capability format.
pub const VPLRT_FORMAT_EXTENDED_DEVICE_ID: u32 = 3;
/// Supported surface types (`mfxSurfaceTypesSupported`) capability format.
pub const VPLRT_FORMAT_SURFACE_TYPES: u32 = 4;

pub const VPLRT_PARAM_NUM_THREAD: u32 = 1 << 0;
pub const VPLRT_PARAM_DEVICE_COPY: u32 = 1 << 1;
pub const VPLRT_PARAM_HANDLE: u32 = 1 << 2;
pub const VPLRT_PARAM_ADAPTER_INDEX: u32 = 1 << 3;
pub const VPLRT_PARAM_EXT_BUFFERS: u32 = 1 << 4;

/// Session initialization parameters forwarded to `vplrt_initialize`.
///
/// Only the members whose `VPLRT_PARAM_*` bit is set in `flags` are valid.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct vplrt_init_params {
    pub flags: u32,
    pub num_thread: u32,
    pub device_copy: u16,
    pub handle_type: u32,
    pub handle: *mut c_void,
    pub adapter_index: u32,
    /// Array of `num_ext_buffers` extension buffer pointers, owned by the
    /// caller for the duration of `vplrt_initialize`.
    pub ext_buffers: *mut *mut c_void,
    pub num_ext_buffers: u32,
}

impl Default for vplrt_init_params {
    fn default() -> Self {
        vplrt_init_params {
            flags: 0,
            num_thread: 0,
            device_copy: 0,
            handle_type: 0,
            handle: std::ptr::null_mut(),
            adapter_index: 0,
            ext_buffers: std::ptr::null_mut(),
            num_ext_buffers: 0,
        }
    }
}

pub type vplrt_query_impls_fn =
    unsafe extern "C" fn(format: u32, num_impls: *mut u32) -> *mut *mut c_char;
pub type vplrt_release_impls_fn = unsafe extern "C" fn(descs: *mut *mut c_char, num_impls: u32);
pub type vplrt_initialize_fn = unsafe extern "C" fn(
    impl_idx: u32,
    params: *const vplrt_init_params,
    session: *mut *mut c_void,
) -> i32;
pub type vplrt_close_fn = unsafe extern "C" fn(session: *mut c_void) -> i32;
pub type vplrt_get_handle_fn =
    unsafe extern "C" fn(session: *mut c_void, handle_type: u32, handle: *mut *mut c_void) -> i32;

/// Symbols a library must export to be considered a runtime.
pub const REQUIRED_SYMBOLS: [&str; 4] = [
    "vplrt_query_impls",
    "vplrt_release_impls",
    "vplrt_initialize",
    "vplrt_close",
];

/// A loaded runtime library and its resolved entry points.
///
/// The function pointers stay valid for as long as the `RuntimeLibrary`
/// lives since it owns the underlying [`libloading::Library`].
pub struct RuntimeLibrary {
    __library: libloading::Library,
    pub vplrt_query_impls: vplrt_query_impls_fn,
    pub vplrt_release_impls: vplrt_release_impls_fn,
    pub vplrt_initialize: vplrt_initialize_fn,
    pub vplrt_close: vplrt_close_fn,
    pub vplrt_get_handle: Option<vplrt_get_handle_fn>,
}

impl RuntimeLibrary {
    /// Load the shared library at `path` and resolve the runtime entry points.
    ///
    /// Fails if the library cannot be opened or any of [`REQUIRED_SYMBOLS`]
    /// is missing. `vplrt_get_handle` is optional.
    pub unsafe fn new<P>(path: P) -> Result<Self, libloading::Error>
    where
        P: AsRef<OsStr>,
    {
        let library = unsafe { libloading::Library::new(path) }?;
        unsafe { Self::from_library(library) }
    }

    pub unsafe fn from_library<L>(library: L) -> Result<Self, libloading::Error>
    where
        L: Into<libloading::Library>,
    {
        let __library = library.into();
        let vplrt_query_impls =
            unsafe { *__library.get::<vplrt_query_impls_fn>(b"vplrt_query_impls\0")? };
        let vplrt_release_impls =
            unsafe { *__library.get::<vplrt_release_impls_fn>(b"vplrt_release_impls\0")? };
        let vplrt_initialize =
            unsafe { *__library.get::<vplrt_initialize_fn>(b"vplrt_initialize\0")? };
        let vplrt_close = unsafe { *__library.get::<vplrt_close_fn>(b"vplrt_close\0")? };
        let vplrt_get_handle = unsafe { __library.get::<vplrt_get_handle_fn>(b"vplrt_get_handle\0") }
            .ok()
            .map(|sym| *sym);

        Ok(RuntimeLibrary {
            __library,
            vplrt_query_impls,
            vplrt_release_impls,
            vplrt_initialize,
            vplrt_close,
            vplrt_get_handle,
        })
    }

    pub unsafe fn vplrt_query_impls(&self, format: u32, num_impls: *mut u32) -> *mut *mut c_char {
        unsafe { (self.vplrt_query_impls)(format, num_impls) }
    }

    pub unsafe fn vplrt_release_impls(&self, descs: *mut *mut c_char, num_impls: u32) {
        unsafe { (self.vplrt_release_impls)(descs, num_impls) }
    }

    pub unsafe fn vplrt_initialize(
        &self,
        impl_idx: u32,
        params: *const vplrt_init_params,
        session: *mut *mut c_void,
    ) -> i32 {
        unsafe { (self.vplrt_initialize)(impl_idx, params, session) }
    }

    pub unsafe fn vplrt_close(&self, session: *mut c_void) -> i32 {
        unsafe { (self.vplrt_close)(session) }
    }

    /// Returns `None` when the runtime does not export `vplrt_get_handle`.
    pub unsafe fn vplrt_get_handle(
        &self,
        session: *mut c_void,
        handle_type: u32,
        handle: *mut *mut c_void,
    ) -> Option<i32> {
        self.vplrt_get_handle
            .map(|get_handle| unsafe { get_handle(session, handle_type, handle) })
    }
}

/// File name prefix shared by every runtime library.
pub const RUNTIME_PREFIX: &str = "libvplrt";

/// Returns true if `file_name` looks like a runtime library for this platform.
pub fn is_runtime_file_name(file_name: &str) -> bool {
    if !file_name.starts_with(RUNTIME_PREFIX) {
        return false;
    }

    if cfg!(windows) {
        file_name.ends_with(".dll")
    } else if cfg!(target_os = "macos") {
        file_name.ends_with(".dylib")
    } else {
        file_name.ends_with(".so") || file_name.contains(".so.")
    }
}
