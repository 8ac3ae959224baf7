// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Well-known property values.
//!
//! These match the numbering used by runtimes in their capability
//! descriptors so they can be passed straight to
//! [`Loader::set_filter_property`](crate::Loader::set_filter_property).

use crate::fourcc::FourCC;

/// Implementation types (`mfxImplDescription.Impl`).
pub mod impl_type {
    pub const SOFTWARE: u32 = 0x0001;
    pub const HARDWARE: u32 = 0x0002;
}

/// Acceleration modes (`mfxImplDescription.AccelerationMode`).
pub mod accel_mode {
    pub const NA: u32 = 0x0000;
    pub const VIA_D3D9: u32 = 0x0200;
    pub const VIA_D3D11: u32 = 0x0300;
    pub const VIA_VAAPI: u32 = 0x0400;
    pub const VIA_VAAPI_DRM_RENDER_NODE: u32 = 0x0401;
    pub const VIA_VAAPI_DRM_MODESET: u32 = 0x0402;
    pub const VIA_VAAPI_GLX: u32 = 0x0403;
    pub const VIA_VAAPI_X11: u32 = 0x0404;
    pub const VIA_VAAPI_WAYLAND: u32 = 0x0405;
    pub const VIA_HDDLUNITE: u32 = 0x0500;
}

/// Media adapter types (`mfxDeviceDescription.device.MediaAdapterType`).
pub mod media_adapter {
    pub const UNKNOWN: u16 = 0xffff;
    pub const INTEGRATED: u16 = 0;
    pub const DISCRETE: u16 = 1;
}

/// Surface pool allocation policies (`mfxImplDescription.mfxSurfacePoolMode`).
pub mod pool_policy {
    pub const OPTIMAL: u32 = 0;
    pub const UNLIMITED: u32 = 1;
    pub const LIMITED: u32 = 2;
}

/// Native handle types (`mfxHandleType` pass-through).
pub mod handle_type {
    pub const D3D9_DEVICE_MANAGER: u32 = 1;
    pub const D3D11_DEVICE: u32 = 3;
    pub const VA_DISPLAY: u32 = 4;
    pub const VA_CONFIG_ID: u32 = 6;
    pub const VA_CONTEXT_ID: u32 = 7;
}

/// Memory resource types (`MemHandleType`).
pub mod resource {
    pub const SYSTEM_SURFACE: u32 = 1;
    pub const VA_SURFACE: u32 = 2;
    pub const VA_BUFFER: u32 = 3;
    pub const DX9_SURFACE: u32 = 4;
    pub const DX11_TEXTURE: u32 = 5;
    pub const DX12_RESOURCE: u32 = 6;
    pub const DMA_RESOURCE: u32 = 7;
}

/// Surface sharing descriptors (`mfxSurfaceTypesSupported`).
pub mod surface {
    pub const TYPE_UNKNOWN: u32 = 0;
    pub const TYPE_D3D11_TEX2D: u32 = 2;
    pub const TYPE_VAAPI: u32 = 3;
    pub const TYPE_OPENCL_IMG2D: u32 = 4;

    pub const COMPONENT_UNKNOWN: u32 = 0;
    pub const COMPONENT_ENCODE: u32 = 1;
    pub const COMPONENT_DECODE: u32 = 2;
    pub const COMPONENT_VPP_INPUT: u32 = 3;
    pub const COMPONENT_VPP_OUTPUT: u32 = 4;

    pub const FLAG_DEFAULT: u32 = 0x00;
    pub const FLAG_IMPORT_SHARED: u32 = 0x01;
    pub const FLAG_IMPORT_COPY: u32 = 0x02;
    pub const FLAG_EXPORT_SHARED: u32 = 0x10;
    pub const FLAG_EXPORT_COPY: u32 = 0x20;
}

/// Codec identifiers (`CodecID`).
pub mod codec {
    use super::FourCC;

    pub const AVC: u32 = FourCC::new(b"AVC ").to_u32();
    pub const HEVC: u32 = FourCC::new(b"HEVC").to_u32();
    pub const MPEG2: u32 = FourCC::new(b"MPG2").to_u32();
    pub const VC1: u32 = FourCC::new(b"VC1 ").to_u32();
    pub const CAPTURE: u32 = FourCC::new(b"CAPT").to_u32();
    pub const VP9: u32 = FourCC::new(b"VP9 ").to_u32();
    pub const AV1: u32 = FourCC::new(b"AV1 ").to_u32();
    pub const JPEG: u32 = FourCC::new(b"JPEG").to_u32();
    pub const VP8: u32 = FourCC::new(b"VP8 ").to_u32();
}

/// Codec profiles (`Profile`).
pub mod profile {
    pub const AVC_BASELINE: u32 = 66;
    pub const AVC_MAIN: u32 = 77;
    pub const AVC_HIGH: u32 = 100;
    pub const HEVC_MAIN: u32 = 1;
    pub const HEVC_MAIN10: u32 = 2;
    pub const AV1_MAIN: u32 = 1;
    pub const AV1_HIGH: u32 = 2;
    pub const MPEG2_MAIN: u32 = 0x40;
    pub const MPEG2_HIGH: u32 = 0x10;
}

/// Color formats (`ColorFormats`, `InFormat`, `OutFormats`).
pub mod color {
    use super::FourCC;

    pub const NV12: u32 = FourCC::new(b"NV12").to_u32();
    pub const I420: u32 = FourCC::new(b"IYUV").to_u32();
    pub const I010: u32 = FourCC::new(b"I010").to_u32();
    pub const P010: u32 = FourCC::new(b"P010").to_u32();
    pub const RGB4: u32 = FourCC::new(b"RGB4").to_u32();
    pub const BGR4: u32 = FourCC::new(b"BGR4").to_u32();
}

/// Video processing filters (`FilterFourCC`).
pub mod filter {
    use super::FourCC;

    pub const COLOR_CONVERSION: u32 = FourCC::new(b"VCSC").to_u32();
    pub const DEINTERLACING: u32 = FourCC::new(b"VPDI").to_u32();
    pub const SCALING: u32 = FourCC::new(b"VSCL").to_u32();
}
