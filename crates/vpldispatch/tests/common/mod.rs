// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
//
// Stub runtimes shared by the integration tests.
//
// The software stub exposes one implementation with a fixed capability set:
// AV1/MPEG2/HEVC decode, AV1/AVC/HEVC encode, color conversion and
// deinterlacing, and D3D11/VAAPI/OpenCL surface sharing. The hardware stub
// exposes one VAAPI implementation with a discrete device.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use vpldispatch::constants::{
    accel_mode, codec, color, filter, impl_type, media_adapter, pool_policy, profile, resource,
    surface,
};
use vpldispatch::descriptor::{
    AccelerationModes, ApiVersion, CodecProfile, DecoderCodec, DecoderDescription,
    DeviceDescription, EncoderCodec, EncoderDescription, ExtendedDeviceId, ImplDescription,
    ImplementedFunctions, MemoryDescription, PoolPolicies, Range32U, StructVersion,
    SurfaceComponent, SurfaceType, SurfaceTypesSupported, VppDescription, VppFilter, VppFormat,
    VppMemoryDescription,
};
use vpldispatch::{
    CapsFormat, Error, Loader, NativeHandle, PassThrough, Runtime, RuntimeSession,
    StaticDiscovery,
};

pub const IMPL: &str = "mfxImplDescription.Impl";
pub const ACCEL_MODE: &str = "mfxImplDescription.AccelerationMode";
pub const API_VERSION: &str = "mfxImplDescription.ApiVersion.Version";
pub const API_MAJOR: &str = "mfxImplDescription.ApiVersion.Major";
pub const API_MINOR: &str = "mfxImplDescription.ApiVersion.Minor";
pub const IMPL_NAME: &str = "mfxImplDescription.ImplName";
pub const LICENSE: &str = "mfxImplDescription.License";
pub const KEYWORDS: &str = "mfxImplDescription.Keywords";
pub const VENDOR_ID: &str = "mfxImplDescription.VendorID";
pub const POOL_MODE: &str = "mfxImplDescription.mfxSurfacePoolMode";
pub const ACCEL_MODES: &str = "mfxImplDescription.mfxAccelerationModeDescription.Mode";
pub const DEVICE_ID: &str = "mfxImplDescription.mfxDeviceDescription.device.DeviceID";
pub const MEDIA_ADAPTER: &str = "mfxImplDescription.mfxDeviceDescription.device.MediaAdapterType";

pub const DEC_CODEC: &str = "mfxImplDescription.mfxDecoderDescription.decoder.CodecID";
pub const DEC_PROFILE: &str = "mfxImplDescription.mfxDecoderDescription.decoder.decprofile.Profile";
pub const DEC_MEM_TYPE: &str =
    "mfxImplDescription.mfxDecoderDescription.decoder.decprofile.decmemdesc.MemHandleType";
pub const DEC_WIDTH: &str =
    "mfxImplDescription.mfxDecoderDescription.decoder.decprofile.decmemdesc.Width";
pub const DEC_HEIGHT: &str =
    "mfxImplDescription.mfxDecoderDescription.decoder.decprofile.decmemdesc.Height";
pub const DEC_COLOR: &str =
    "mfxImplDescription.mfxDecoderDescription.decoder.decprofile.decmemdesc.ColorFormats";

pub const ENC_CODEC: &str = "mfxImplDescription.mfxEncoderDescription.encoder.CodecID";
pub const ENC_PROFILE: &str = "mfxImplDescription.mfxEncoderDescription.encoder.encprofile.Profile";
pub const ENC_COLOR: &str =
    "mfxImplDescription.mfxEncoderDescription.encoder.encprofile.encmemdesc.ColorFormat";

pub const VPP_FILTER: &str = "mfxImplDescription.mfxVPPDescription.filter.FilterFourCC";
pub const VPP_IN: &str = "mfxImplDescription.mfxVPPDescription.filter.memdesc.format.InFormat";
pub const VPP_OUT: &str = "mfxImplDescription.mfxVPPDescription.filter.memdesc.format.OutFormats";

pub const FUNCTION_NAME: &str = "mfxImplementedFunctions.FunctionsName";

pub const EXT_VENDOR_ID: &str = "mfxExtendedDeviceId.VendorID";
pub const EXT_DEVICE_ID: &str = "mfxExtendedDeviceId.DeviceID";
pub const EXT_LUID: &str = "mfxExtendedDeviceId.DeviceLUID";
pub const EXT_DEVICE_NAME: &str = "mfxExtendedDeviceId.DeviceName";
pub const EXT_RENDER_NODE: &str = "mfxExtendedDeviceId.DRMRenderNodeNum";

pub const SURFACE_TYPE: &str = "mfxSurfaceTypesSupported.surftype.SurfaceType";
pub const SURFACE_COMPONENT: &str = "mfxSurfaceTypesSupported.surftype.surfcomp.SurfaceComponent";
pub const SURFACE_FLAGS: &str = "mfxSurfaceTypesSupported.surftype.surfcomp.SurfaceFlags";

pub const STUB_NAME: &str = "Stub Implementation";
pub const HW_STUB_NAME: &str = "Hardware Stub";
pub const STUB_LUID: [u8; 8] = [0x4f, 0x59, 0x2e, 0xa1, 0x33, 0x78, 0xdb, 0x29];
pub const STUB_SESSION_HANDLE: NativeHandle = NativeHandle(0x5157);

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn range() -> Range32U {
    Range32U {
        min: 64,
        max: 4096,
        step: 8,
    }
}

fn mem(color_formats: &[u32]) -> MemoryDescription {
    MemoryDescription {
        mem_handle_type: resource::SYSTEM_SURFACE,
        width: range(),
        height: range(),
        color_formats: color_formats.to_vec(),
    }
}

fn codec_profile(profile: u32, color_formats: &[u32]) -> CodecProfile {
    CodecProfile {
        profile,
        mem_desc: vec![mem(color_formats)],
    }
}

fn decoder(codec_id: u32, profiles: Vec<CodecProfile>) -> DecoderCodec {
    DecoderCodec {
        codec_id,
        max_codec_level: 0,
        profiles,
    }
}

fn encoder(codec_id: u32, profiles: Vec<CodecProfile>) -> EncoderCodec {
    EncoderCodec {
        codec_id,
        max_codec_level: 0,
        bi_directional_prediction: 0,
        profiles,
    }
}

fn vpp_filter(fourcc: u32, formats: Vec<(u32, Vec<u32>)>) -> VppFilter {
    VppFilter {
        filter_fourcc: fourcc,
        max_delay_in_frames: 0,
        mem_desc: vec![VppMemoryDescription {
            mem_handle_type: resource::SYSTEM_SURFACE,
            width: range(),
            height: range(),
            formats: formats
                .into_iter()
                .map(|(in_format, out_formats)| VppFormat {
                    in_format,
                    out_formats,
                })
                .collect(),
        }],
    }
}

/// Software stub description.
pub fn stub_description() -> ImplDescription {
    ImplDescription {
        version: StructVersion::new(1, 2),
        impl_type: impl_type::SOFTWARE,
        acceleration_mode: accel_mode::NA,
        api_version: ApiVersion::new(2, 9),
        impl_name: STUB_NAME.into(),
        license: "MIT".into(),
        keywords: "VPL,Stub,x64".into(),
        vendor_id: 0x8086,
        vendor_impl_id: 0,
        device: DeviceDescription {
            version: StructVersion::new(1, 1),
            device_id: "0000".into(),
            media_adapter_type: media_adapter::UNKNOWN,
            sub_devices: Vec::new(),
        },
        decoders: DecoderDescription {
            version: StructVersion::new(1, 0),
            codecs: vec![
                decoder(
                    codec::AV1,
                    vec![codec_profile(profile::AV1_HIGH, &[color::I420, color::I010])],
                ),
                decoder(
                    codec::MPEG2,
                    vec![
                        codec_profile(profile::MPEG2_MAIN, &[color::I420]),
                        codec_profile(profile::MPEG2_HIGH, &[color::I010]),
                    ],
                ),
                decoder(
                    codec::HEVC,
                    vec![
                        codec_profile(profile::HEVC_MAIN, &[color::I420]),
                        codec_profile(profile::HEVC_MAIN10, &[color::I010]),
                    ],
                ),
            ],
        },
        encoders: EncoderDescription {
            version: StructVersion::new(1, 0),
            codecs: vec![
                encoder(
                    codec::AV1,
                    vec![codec_profile(profile::AV1_HIGH, &[color::I420, color::I010])],
                ),
                encoder(
                    codec::AVC,
                    vec![
                        codec_profile(profile::AVC_BASELINE, &[color::I420]),
                        codec_profile(profile::AVC_MAIN, &[color::I010]),
                    ],
                ),
                encoder(
                    codec::HEVC,
                    vec![
                        codec_profile(profile::HEVC_MAIN, &[color::I420]),
                        codec_profile(profile::HEVC_MAIN10, &[color::I010]),
                    ],
                ),
            ],
        },
        vpp: VppDescription {
            version: StructVersion::new(1, 0),
            filters: vec![
                vpp_filter(
                    filter::COLOR_CONVERSION,
                    vec![
                        (color::I420, vec![color::I420, color::RGB4]),
                        (color::I010, vec![color::I010, color::RGB4]),
                    ],
                ),
                vpp_filter(
                    filter::DEINTERLACING,
                    vec![
                        (color::I420, vec![color::I420]),
                        (color::I010, vec![color::I010]),
                    ],
                ),
            ],
        },
        acceleration_modes: AccelerationModes {
            version: StructVersion::new(1, 0),
            modes: vec![accel_mode::NA as u16],
        },
        pool_policies: PoolPolicies {
            version: StructVersion::new(1, 0),
            policies: vec![
                pool_policy::OPTIMAL,
                pool_policy::UNLIMITED,
                pool_policy::LIMITED,
            ],
        },
    }
}

pub fn stub_functions() -> ImplementedFunctions {
    ImplementedFunctions {
        function_names: [
            "MFXInit",
            "MFXClose",
            "MFXQueryIMPL",
            "MFXQueryVersion",
            "MFXVideoDECODE_Init",
            "MFXVideoDECODE_DecodeFrameAsync",
            "MFXVideoENCODE_Init",
            "MFXVideoENCODE_EncodeFrameAsync",
            "MFXVideoVPP_Init",
            "MFXQueryImplsDescription",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
}

pub fn stub_extended_device_id() -> ExtendedDeviceId {
    ExtendedDeviceId {
        version: StructVersion::new(1, 0),
        vendor_id: 0x8086,
        device_id: 0x1595,
        pci_domain: 1,
        pci_bus: 3,
        pci_device: 7,
        pci_function: 9,
        device_luid: STUB_LUID,
        luid_device_node_mask: 0xaeae,
        luid_valid: 1,
        drm_render_node_num: 130,
        drm_primary_node_num: 2,
        revision_id: 0x1034,
        device_name: "Stub Device".into(),
    }
}

fn component(component: u32, flags: u32) -> SurfaceComponent {
    SurfaceComponent {
        surface_component: component,
        surface_flags: flags,
    }
}

pub fn stub_surface_types() -> SurfaceTypesSupported {
    SurfaceTypesSupported {
        version: StructVersion::new(1, 0),
        surface_types: vec![
            SurfaceType {
                surface_type: surface::TYPE_D3D11_TEX2D,
                components: vec![
                    component(
                        surface::COMPONENT_ENCODE,
                        surface::FLAG_IMPORT_SHARED | surface::FLAG_IMPORT_COPY,
                    ),
                    component(surface::COMPONENT_VPP_INPUT, surface::FLAG_IMPORT_COPY),
                    component(
                        surface::COMPONENT_VPP_OUTPUT,
                        surface::FLAG_EXPORT_SHARED | surface::FLAG_EXPORT_COPY,
                    ),
                    component(surface::COMPONENT_DECODE, surface::FLAG_EXPORT_COPY),
                ],
            },
            SurfaceType {
                surface_type: surface::TYPE_VAAPI,
                components: vec![
                    component(surface::COMPONENT_ENCODE, surface::FLAG_IMPORT_COPY),
                    component(surface::COMPONENT_VPP_INPUT, surface::FLAG_IMPORT_COPY),
                    component(
                        surface::COMPONENT_DECODE,
                        surface::FLAG_EXPORT_SHARED | surface::FLAG_EXPORT_COPY,
                    ),
                ],
            },
            SurfaceType {
                surface_type: surface::TYPE_OPENCL_IMG2D,
                components: vec![
                    component(surface::COMPONENT_ENCODE, surface::FLAG_IMPORT_SHARED),
                    component(surface::COMPONENT_DECODE, surface::FLAG_EXPORT_SHARED),
                ],
            },
        ],
    }
}

/// Hardware stub description: VAAPI, discrete device `56a0`, AVC/HEVC decode.
pub fn hw_stub_description() -> ImplDescription {
    let mut desc = stub_description();
    desc.impl_type = impl_type::HARDWARE;
    desc.acceleration_mode = accel_mode::VIA_VAAPI;
    desc.api_version = ApiVersion::new(2, 10);
    desc.impl_name = HW_STUB_NAME.into();
    desc.license = "Apache-2.0".into();
    desc.keywords = "VPL,Hardware,VAAPI".into();
    desc.device.device_id = "56a0/0".into();
    desc.device.media_adapter_type = media_adapter::DISCRETE;
    desc.decoders.codecs = vec![
        decoder(
            codec::AVC,
            vec![codec_profile(profile::AVC_HIGH, &[color::NV12])],
        ),
        decoder(
            codec::HEVC,
            vec![
                codec_profile(profile::HEVC_MAIN, &[color::NV12]),
                codec_profile(profile::HEVC_MAIN10, &[color::P010]),
            ],
        ),
    ];
    desc.acceleration_modes.modes = vec![accel_mode::VIA_VAAPI as u16];
    desc
}

/// One implementation as a stub runtime reports it.
#[derive(Debug, Clone)]
pub struct StubImpl {
    pub description: ImplDescription,
    pub functions: Option<ImplementedFunctions>,
    pub extended_device_id: Option<ExtendedDeviceId>,
    pub surface_types: Option<SurfaceTypesSupported>,
}

impl StubImpl {
    pub fn software() -> StubImpl {
        StubImpl {
            description: stub_description(),
            functions: Some(stub_functions()),
            extended_device_id: Some(stub_extended_device_id()),
            surface_types: Some(stub_surface_types()),
        }
    }

    pub fn hardware() -> StubImpl {
        StubImpl {
            description: hw_stub_description(),
            functions: Some(stub_functions()),
            extended_device_id: None,
            surface_types: None,
        }
    }
}

/// Session creation recorded by a [`StubRuntime`].
#[derive(Debug, Clone)]
pub struct Init {
    pub impl_index: u32,
    pub settings: PassThrough,
}

/// In-process runtime reporting fixed implementations.
pub struct StubRuntime {
    name: String,
    impls: Vec<StubImpl>,
    fail_query: bool,
    pub inits: Arc<Mutex<Vec<Init>>>,
    pub closed: Arc<AtomicUsize>,
}

impl StubRuntime {
    pub fn new(name: &str, impls: Vec<StubImpl>) -> StubRuntime {
        StubRuntime {
            name: name.into(),
            impls,
            fail_query: false,
            inits: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn software() -> StubRuntime {
        StubRuntime::new("libvplrt-stub.so", vec![StubImpl::software()])
    }

    pub fn hardware() -> StubRuntime {
        StubRuntime::new("libvplrt-hwstub.so", vec![StubImpl::hardware()])
    }

    /// A runtime whose capability query always fails.
    pub fn broken(name: &str) -> StubRuntime {
        let mut runtime = StubRuntime::new(name, vec![StubImpl::software()]);
        runtime.fail_query = true;
        runtime
    }

    pub fn init_count(&self) -> usize {
        self.inits.lock().unwrap().len()
    }

    pub fn last_init(&self) -> Option<Init> {
        self.inits.lock().unwrap().last().cloned()
    }

    fn blobs<T: serde::Serialize>(
        &self,
        select: impl Fn(&StubImpl) -> Option<&T>,
    ) -> Vec<Vec<u8>> {
        if self.impls.iter().all(|i| select(i).is_none()) {
            return Vec::new();
        }
        self.impls
            .iter()
            .map(|i| match select(i) {
                Some(value) => serde_json::to_vec(value).unwrap(),
                None => Vec::new(),
            })
            .collect()
    }
}

impl Runtime for StubRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, format: CapsFormat) -> Result<Vec<Vec<u8>>, Error> {
        if self.fail_query {
            return Err(Error::Runtime(-1));
        }
        Ok(match format {
            CapsFormat::ImplDescription => self.blobs(|i| Some(&i.description)),
            CapsFormat::ImplementedFunctions => self.blobs(|i| i.functions.as_ref()),
            CapsFormat::ExtendedDeviceId => self.blobs(|i| i.extended_device_id.as_ref()),
            CapsFormat::SurfaceTypes => self.blobs(|i| i.surface_types.as_ref()),
        })
    }

    fn initialize(
        &self,
        impl_index: u32,
        settings: &PassThrough,
    ) -> Result<Box<dyn RuntimeSession>, Error> {
        if impl_index as usize >= self.impls.len() {
            return Err(Error::Runtime(-9));
        }
        self.inits.lock().unwrap().push(Init {
            impl_index,
            settings: settings.clone(),
        });
        Ok(Box::new(StubSession {
            closed: self.closed.clone(),
        }))
    }
}

struct StubSession {
    closed: Arc<AtomicUsize>,
}

impl RuntimeSession for StubSession {
    fn handle(&self, handle_type: u32) -> Option<NativeHandle> {
        (handle_type == vpldispatch::constants::handle_type::VA_DISPLAY)
            .then_some(STUB_SESSION_HANDLE)
    }

    fn close(&mut self) -> Result<(), Error> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Loader over the given runtimes, in discovery order.
pub fn loader_with(runtimes: Vec<Arc<dyn Runtime>>) -> Loader {
    init_logger();
    Loader::with_discovery(StaticDiscovery::new(runtimes))
}

/// Loader over the software stub only.
pub fn stub_loader() -> Loader {
    loader_with(vec![Arc::new(StubRuntime::software())])
}

/// Loader over the software stub followed by the hardware stub.
pub fn mixed_loader() -> Loader {
    loader_with(vec![
        Arc::new(StubRuntime::software()),
        Arc::new(StubRuntime::hardware()),
    ])
}
