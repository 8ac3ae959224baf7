// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! C entry points.
//!
//! Loaders, configs, descriptors and sessions cross the boundary as opaque
//! pointers. Configs and descriptor strings are owned by the loader that
//! created them and are freed by [`vplUnload`]; sessions are owned by the
//! caller until [`vplClose`].
//!
//! Every function returns [`Status::NullPtr`] for a required pointer that is
//! null.

#![allow(non_snake_case)]

use std::{
    collections::HashMap,
    ffi::{c_char, c_void, CStr, CString},
    ptr, slice,
};

use log::warn;

use crate::config::Config;
use crate::descriptor::{Range32U, StructVersion};
use crate::handle::DescriptorHandle;
use crate::loader::Loader;
use crate::runtime::CapsFormat;
use crate::schema::{resolve, MatchKind, Resolved};
use crate::session::Session;
use crate::variant::{NativeHandle, Value, Variant, VariantType};
use crate::{Error, Status};

/// Loader handle returned by [`vplLoad`].
pub struct VplLoader {
    loader: Loader,
    configs: Vec<*mut VplConfig>,
    descriptors: HashMap<usize, (CString, DescriptorHandle)>,
}

impl VplLoader {
    /// Hand a loader configured in Rust to C callers. Free it with
    /// [`vplUnload`].
    pub fn into_raw(loader: Loader) -> *mut VplLoader {
        Box::into_raw(Box::new(VplLoader {
            loader,
            configs: Vec::new(),
            descriptors: HashMap::new(),
        }))
    }
}

/// Config handle returned by [`vplCreateConfig`].
pub struct VplConfig {
    loader: *mut VplLoader,
    config: Config,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union VplVariantData {
    pub U8: u8,
    pub I8: i8,
    pub U16: u16,
    pub I16: i16,
    pub U32: u32,
    pub I32: i32,
    pub U64: u64,
    pub I64: i64,
    pub F32: f32,
    pub F64: f64,
    pub Ptr: *mut c_void,
}

/// Typed value passed to [`vplSetConfigFilterProperty`].
///
/// `version` is `major << 8 | minor`; `ty` is a [`VariantType`] value. For
/// pointer-typed properties `data.Ptr` points at a NUL-terminated string
/// (names, licenses, keywords, function names), a [`Range32U`] (frame
/// dimensions), an 8-byte LUID, or is itself the native handle.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VplVariant {
    pub version: u16,
    pub ty: u32,
    pub data: VplVariantData,
}

fn status(result: Result<(), Error>) -> Status {
    match result {
        Ok(()) => Status::None,
        Err(err) => err.status(),
    }
}

/// # Safety
///
/// For pointer types, `value.data.Ptr` must be null or point at the payload
/// `kind` implies.
unsafe fn to_variant(value: &VplVariant, kind: Option<MatchKind>) -> Result<Variant, Error> {
    let ty = VariantType::from_raw(value.ty).ok_or(Error::Unsupported)?;
    // SAFETY: the caller tagged `data` with `ty`.
    let inner = unsafe {
        match ty {
            VariantType::Unset => Value::Unset,
            VariantType::U8 => Value::U8(value.data.U8),
            VariantType::I8 => Value::I8(value.data.I8),
            VariantType::U16 => Value::U16(value.data.U16),
            VariantType::I16 => Value::I16(value.data.I16),
            VariantType::U32 => Value::U32(value.data.U32),
            VariantType::I32 => Value::I32(value.data.I32),
            VariantType::U64 => Value::U64(value.data.U64),
            VariantType::I64 => Value::I64(value.data.I64),
            VariantType::F32 => Value::F32(value.data.F32),
            VariantType::F64 => Value::F64(value.data.F64),
            VariantType::Ptr => return pointer_variant(value.data.Ptr, kind),
        }
    };

    let mut variant = Variant::new(inner);
    variant.version = StructVersion::new((value.version >> 8) as u8, value.version as u8);
    Ok(variant)
}

/// # Safety
///
/// See [`to_variant`].
unsafe fn pointer_variant(data: *mut c_void, kind: Option<MatchKind>) -> Result<Variant, Error> {
    match kind {
        Some(MatchKind::Str | MatchKind::Tokens | MatchKind::Contains) => {
            if data.is_null() {
                return Err(Error::NullArgument);
            }
            let s = unsafe { CStr::from_ptr(data as *const c_char) }.to_str()?;
            Ok(Variant::string(s))
        }
        Some(MatchKind::Range) => {
            if data.is_null() {
                return Err(Error::NullArgument);
            }
            let range = unsafe { ptr::read_unaligned(data as *const Range32U) };
            Ok(Variant::range(range.min, range.max, range.step))
        }
        Some(MatchKind::Bytes) => {
            if data.is_null() {
                return Err(Error::NullArgument);
            }
            let luid = unsafe { slice::from_raw_parts(data as *const u8, 8) };
            Ok(Variant::bytes(luid))
        }
        _ => Ok(Variant::handle(NativeHandle::from_ptr(data))),
    }
}

/// Create a loader that discovers runtimes through the search path
/// environment.
#[no_mangle]
pub extern "C" fn vplLoad() -> *mut VplLoader {
    VplLoader::into_raw(Loader::new())
}

/// Destroy a loader with its configs and unreleased descriptors.
///
/// # Safety
///
/// `loader` must be null or a pointer returned by [`vplLoad`] that has not
/// been unloaded.
#[no_mangle]
pub unsafe extern "C" fn vplUnload(loader: *mut VplLoader) -> Status {
    if loader.is_null() {
        return Status::NullPtr;
    }
    let mut owned = unsafe { Box::from_raw(loader) };
    for config in owned.configs.drain(..) {
        drop(unsafe { Box::from_raw(config) });
    }
    let descriptors: Vec<DescriptorHandle> =
        owned.descriptors.drain().map(|(_, (_, h))| h).collect();
    for handle in descriptors {
        if let Err(err) = owned.loader.release_descriptor(handle) {
            warn!("releasing descriptor on unload: {}", err);
        }
    }
    Status::None
}

/// Create a config owned by `loader`. Returns null if `loader` is null.
///
/// # Safety
///
/// `loader` must be null or a live pointer returned by [`vplLoad`].
#[no_mangle]
pub unsafe extern "C" fn vplCreateConfig(loader: *mut VplLoader) -> *mut VplConfig {
    let Some(owner) = (unsafe { loader.as_mut() }) else {
        return ptr::null_mut();
    };
    let config = Box::into_raw(Box::new(VplConfig {
        loader,
        config: owner.loader.create_config(),
    }));
    owner.configs.push(config);
    config
}

/// Add a filter constraint or pass-through setting.
///
/// # Safety
///
/// `config` must be null or a config of a live loader, `name` must be null
/// or a NUL-terminated string, and a pointer-typed `value` must carry the
/// payload described on [`VplVariant`].
#[no_mangle]
pub unsafe extern "C" fn vplSetConfigFilterProperty(
    config: *mut VplConfig,
    name: *const c_char,
    value: VplVariant,
) -> Status {
    if config.is_null() || name.is_null() {
        return Status::NullPtr;
    }
    let (loader, config) = {
        let config = unsafe { &*config };
        (config.loader, config.config)
    };
    let Some(owner) = (unsafe { loader.as_mut() }) else {
        return Status::InvalidHandle;
    };
    let Ok(name) = unsafe { CStr::from_ptr(name) }.to_str() else {
        return Status::NotFound;
    };

    let kind = match resolve(name) {
        Resolved::Property(property) => Some(property.kind),
        Resolved::PassThrough(_) => None,
        Resolved::Unknown | Resolved::Partial => return Status::NotFound,
    };
    status(
        unsafe { to_variant(&value, kind) }
            .and_then(|variant| owner.loader.set_filter_property(config, name, variant)),
    )
}

/// Describe the `index`-th accepted implementation as a JSON document in
/// capability `format`.
///
/// The string stays valid until released with
/// [`vplDispReleaseImplDescription`] or the loader is unloaded.
///
/// # Safety
///
/// `loader` must be null or live; `desc` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn vplEnumImplementations(
    loader: *mut VplLoader,
    index: u32,
    format: u32,
    desc: *mut *const c_char,
) -> Status {
    if desc.is_null() {
        return Status::NullPtr;
    }
    let Some(owner) = (unsafe { loader.as_mut() }) else {
        return Status::NullPtr;
    };
    let Some(format) = CapsFormat::from_raw(format) else {
        return Status::Unsupported;
    };

    let result = owner
        .loader
        .enum_implementations(index as usize, format)
        .and_then(|handle| {
            let json = serde_json::to_string(handle.descriptor())
                .map_err(Error::from)
                .and_then(|s| CString::new(s).map_err(Error::from));
            match json {
                Ok(json) => Ok((json, handle)),
                Err(err) => {
                    if let Err(release) = owner.loader.release_descriptor(handle) {
                        warn!("releasing unserializable descriptor: {}", release);
                    }
                    Err(err)
                }
            }
        });

    match result {
        Ok((json, handle)) => {
            let out = json.as_ptr();
            owner.descriptors.insert(out as usize, (json, handle));
            unsafe { *desc = out };
            Status::None
        }
        Err(err) => err.status(),
    }
}

/// Release a descriptor returned by [`vplEnumImplementations`].
///
/// Returns [`Status::InvalidHandle`] if `loader` did not issue `desc` or it
/// was already released.
///
/// # Safety
///
/// `loader` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn vplDispReleaseImplDescription(
    loader: *mut VplLoader,
    desc: *const c_char,
) -> Status {
    if desc.is_null() {
        return Status::NullPtr;
    }
    let Some(owner) = (unsafe { loader.as_mut() }) else {
        return Status::NullPtr;
    };
    match owner.descriptors.remove(&(desc as usize)) {
        Some((_, handle)) => status(owner.loader.release_descriptor(handle)),
        None => Status::InvalidHandle,
    }
}

/// Create a session on the `index`-th accepted implementation.
///
/// # Safety
///
/// `loader` must be null or live; `session` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn vplCreateSession(
    loader: *mut VplLoader,
    index: u32,
    session: *mut *mut Session,
) -> Status {
    if session.is_null() {
        return Status::NullPtr;
    }
    let Some(owner) = (unsafe { loader.as_mut() }) else {
        return Status::NullPtr;
    };
    match owner.loader.create_session(index as usize) {
        Ok(created) => {
            unsafe { *session = Box::into_raw(Box::new(created)) };
            Status::None
        }
        Err(err) => err.status(),
    }
}

/// Close and free a session.
///
/// # Safety
///
/// `session` must be null or a pointer from [`vplCreateSession`] that has
/// not been closed.
#[no_mangle]
pub unsafe extern "C" fn vplClose(session: *mut Session) -> Status {
    if session.is_null() {
        return Status::NullPtr;
    }
    let session = unsafe { Box::from_raw(session) };
    status(session.close())
}

/// Native handle of `handle_type` held by a session.
///
/// # Safety
///
/// `session` must be null or live; `handle` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn vplGetHandle(
    session: *const Session,
    handle_type: u32,
    handle: *mut *mut c_void,
) -> Status {
    if handle.is_null() {
        return Status::NullPtr;
    }
    let Some(session) = (unsafe { session.as_ref() }) else {
        return Status::NullPtr;
    };
    match session.handle(handle_type) {
        Some(found) => {
            unsafe { *handle = found.as_ptr() };
            Status::None
        }
        None => Status::NotFound,
    }
}
