// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
//
// C entry point tests
//
// Exercises the exported functions the way a C caller would: raw pointers,
// NUL-terminated names and tagged variants.
//
// RUN:
//   cargo test --test capi

mod common;

use std::{
    ffi::{c_char, c_void, CStr, CString},
    ptr,
    sync::Arc,
};

use common::*;
use vpldispatch::capi::*;
use vpldispatch::constants::{codec, handle_type, impl_type};
use vpldispatch::descriptor::Range32U;
use vpldispatch::{CapsFormat, Session, Status, VariantType};

fn u32_variant(value: u32) -> VplVariant {
    VplVariant {
        version: 0x0100,
        ty: VariantType::U32 as u32,
        data: VplVariantData { U32: value },
    }
}

fn ptr_variant(data: *mut c_void) -> VplVariant {
    VplVariant {
        version: 0x0100,
        ty: VariantType::Ptr as u32,
        data: VplVariantData { Ptr: data },
    }
}

fn stub_handle() -> *mut VplLoader {
    VplLoader::into_raw(mixed_loader())
}

fn set(config: *mut VplConfig, name: &str, value: VplVariant) -> Status {
    let name = CString::new(name).unwrap();
    unsafe { vplSetConfigFilterProperty(config, name.as_ptr(), value) }
}

// =============================================================================
// Null Arguments
// =============================================================================

#[test]
fn test_null_arguments() {
    let loader = stub_handle();
    let config = unsafe { vplCreateConfig(loader) };
    let mut desc: *const c_char = ptr::null();
    let mut session: *mut Session = ptr::null_mut();
    let mut handle: *mut c_void = ptr::null_mut();
    let name = CString::new("NumThread").unwrap();

    unsafe {
        assert!(vplCreateConfig(ptr::null_mut()).is_null());
        assert_eq!(
            vplSetConfigFilterProperty(ptr::null_mut(), name.as_ptr(), u32_variant(1)),
            Status::NullPtr
        );
        assert_eq!(
            vplSetConfigFilterProperty(config, ptr::null(), u32_variant(1)),
            Status::NullPtr
        );
        assert_eq!(
            vplEnumImplementations(ptr::null_mut(), 0, CapsFormat::ImplDescription.raw(), &mut desc),
            Status::NullPtr
        );
        assert_eq!(
            vplEnumImplementations(loader, 0, CapsFormat::ImplDescription.raw(), ptr::null_mut()),
            Status::NullPtr
        );
        assert_eq!(
            vplDispReleaseImplDescription(loader, ptr::null()),
            Status::NullPtr
        );
        assert_eq!(vplCreateSession(ptr::null_mut(), 0, &mut session), Status::NullPtr);
        assert_eq!(vplCreateSession(loader, 0, ptr::null_mut()), Status::NullPtr);
        assert_eq!(vplClose(ptr::null_mut()), Status::NullPtr);
        assert_eq!(vplGetHandle(ptr::null(), 0, &mut handle), Status::NullPtr);
        assert_eq!(vplUnload(ptr::null_mut()), Status::NullPtr);

        assert_eq!(vplUnload(loader), Status::None);
    }
}

// =============================================================================
// Filter Properties
// =============================================================================

#[test]
fn test_set_property_statuses() {
    let loader = stub_handle();
    let config = unsafe { vplCreateConfig(loader) };

    assert_eq!(set(config, IMPL, u32_variant(impl_type::HARDWARE)), Status::None);
    assert_eq!(
        set(config, "mfxImplDescription.InvalidProp", u32_variant(1)),
        Status::NotFound
    );
    assert_eq!(set(config, "", u32_variant(1)), Status::NotFound);
    assert_eq!(set(config, "mfxImplDescription", u32_variant(1)), Status::NotFound);

    let wrong_type = VplVariant {
        version: 0x0100,
        ty: VariantType::U16 as u32,
        data: VplVariantData { U16: 1 },
    };
    assert_eq!(set(config, IMPL, wrong_type), Status::Unsupported);
    assert_eq!(set(config, LICENSE, ptr_variant(ptr::null_mut())), Status::NullPtr);

    unsafe { vplUnload(loader) };
}

#[test]
fn test_name_is_resolved_before_value() {
    let loader = stub_handle();
    let config = unsafe { vplCreateConfig(loader) };
    let bad_tag = VplVariant {
        version: 0x0100,
        ty: 0xFF,
        data: VplVariantData { U32: 1 },
    };

    assert_eq!(
        set(config, "mfxImplDescription.InvalidProp", bad_tag),
        Status::NotFound
    );
    assert_eq!(set(config, "mfxImplDescription", bad_tag), Status::NotFound);
    assert_eq!(set(config, IMPL, bad_tag), Status::Unsupported);
    assert_eq!(set(config, "NumThread", bad_tag), Status::Unsupported);

    unsafe { vplUnload(loader) };
}

#[test]
fn test_pass_through_type_check() {
    let loader = stub_handle();
    let config = unsafe { vplCreateConfig(loader) };
    let narrow = VplVariant {
        version: 0x0100,
        ty: VariantType::U16 as u32,
        data: VplVariantData { U16: 4 },
    };

    assert_eq!(set(config, "NumThread", narrow), Status::Unsupported);
    assert_eq!(
        set(config, "NumThread", ptr_variant(0x10 as *mut c_void)),
        Status::Unsupported
    );
    assert_eq!(set(config, "DeviceCopy", narrow), Status::None);
    assert_eq!(
        set(config, "ExtBuffer", ptr_variant(0x10 as *mut c_void)),
        Status::None
    );

    unsafe { vplUnload(loader) };
}

#[test]
fn test_string_and_range_payloads() {
    let loader = stub_handle();
    let config = unsafe { vplCreateConfig(loader) };

    let keywords = CString::new("VPL,Stub").unwrap();
    assert_eq!(
        set(config, KEYWORDS, ptr_variant(keywords.as_ptr() as *mut c_void)),
        Status::None
    );
    let mut width = Range32U {
        min: 128,
        max: 1920,
        step: 16,
    };
    assert_eq!(
        set(
            config,
            DEC_WIDTH,
            ptr_variant(&mut width as *mut Range32U as *mut c_void)
        ),
        Status::None
    );

    let mut desc: *const c_char = ptr::null();
    unsafe {
        assert_eq!(
            vplEnumImplementations(loader, 0, CapsFormat::ImplDescription.raw(), &mut desc),
            Status::None
        );
        let json: serde_json::Value =
            serde_json::from_str(CStr::from_ptr(desc).to_str().unwrap()).unwrap();
        assert_eq!(json["ImplName"], STUB_NAME);
        assert_eq!(vplDispReleaseImplDescription(loader, desc), Status::None);

        // Only the software stub declares the Stub keyword
        assert_eq!(
            vplEnumImplementations(loader, 1, CapsFormat::ImplDescription.raw(), &mut desc),
            Status::NotFound
        );
        vplUnload(loader);
    }
}

// =============================================================================
// Enumeration and Release
// =============================================================================

#[test]
fn test_enumerate_formats() {
    let loader = stub_handle();
    let mut desc: *const c_char = ptr::null();

    unsafe {
        assert_eq!(
            vplEnumImplementations(loader, 0, CapsFormat::ImplementedFunctions.raw(), &mut desc),
            Status::None
        );
        let json: serde_json::Value =
            serde_json::from_str(CStr::from_ptr(desc).to_str().unwrap()).unwrap();
        assert!(json["FunctionsName"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f == "MFXQueryVersion"));
        assert_eq!(vplDispReleaseImplDescription(loader, desc), Status::None);

        // The hardware stub does not report surface types
        assert_eq!(
            vplEnumImplementations(loader, 1, CapsFormat::SurfaceTypes.raw(), &mut desc),
            Status::NotFound
        );
        assert_eq!(
            vplEnumImplementations(loader, 0, 99, &mut desc),
            Status::Unsupported
        );
        vplUnload(loader);
    }
}

#[test]
fn test_release_discipline() {
    let first = stub_handle();
    let second = stub_handle();
    let mut desc: *const c_char = ptr::null();
    let foreign = CString::new("foreign").unwrap();

    unsafe {
        assert_eq!(
            vplEnumImplementations(first, 0, CapsFormat::ImplDescription.raw(), &mut desc),
            Status::None
        );
        // Not issued by the second loader
        assert_eq!(vplDispReleaseImplDescription(second, desc), Status::InvalidHandle);
        // Not a descriptor at all
        assert_eq!(
            vplDispReleaseImplDescription(first, foreign.as_ptr()),
            Status::InvalidHandle
        );
        assert_eq!(vplDispReleaseImplDescription(first, desc), Status::None);
        // Already released
        assert_eq!(vplDispReleaseImplDescription(first, desc), Status::InvalidHandle);

        // Unreleased descriptors are reclaimed on unload
        assert_eq!(
            vplEnumImplementations(first, 1, CapsFormat::ImplDescription.raw(), &mut desc),
            Status::None
        );
        assert_eq!(vplUnload(first), Status::None);
        assert_eq!(vplUnload(second), Status::None);
    }
}

// =============================================================================
// Sessions
// =============================================================================

#[test]
fn test_session_lifecycle() {
    let runtime = Arc::new(StubRuntime::hardware());
    let loader = VplLoader::into_raw(loader_with(vec![runtime.clone()]));
    let config = unsafe { vplCreateConfig(loader) };

    assert_eq!(set(config, DEC_CODEC, u32_variant(codec::AVC)), Status::None);
    assert_eq!(set(config, "NumThread", u32_variant(3)), Status::None);
    assert_eq!(
        set(config, "mfxHandleType", u32_variant(handle_type::VA_DISPLAY)),
        Status::None
    );
    assert_eq!(
        set(config, "mfxHDL", ptr_variant(0xd1 as *mut c_void)),
        Status::None
    );

    let mut session: *mut Session = ptr::null_mut();
    let mut handle: *mut c_void = ptr::null_mut();
    unsafe {
        assert_eq!(vplCreateSession(loader, 1, &mut session), Status::NotFound);
        assert_eq!(vplCreateSession(loader, 0, &mut session), Status::None);
        assert!(!session.is_null());
        assert_eq!((*session).num_thread(), Some(3));

        assert_eq!(
            vplGetHandle(session, handle_type::VA_DISPLAY, &mut handle),
            Status::None
        );
        assert_eq!(handle as usize, 0xd1);
        assert_eq!(
            vplGetHandle(session, handle_type::D3D11_DEVICE, &mut handle),
            Status::NotFound
        );

        assert_eq!(vplClose(session), Status::None);
        vplUnload(loader);
    }
    assert_eq!(runtime.init_count(), 1);
    assert_eq!(runtime.last_init().unwrap().settings.num_thread(), Some(3));
}
