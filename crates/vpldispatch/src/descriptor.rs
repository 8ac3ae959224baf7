// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Capability descriptors reported by runtime implementations.
//!
//! Runtimes report each descriptor as a JSON document whose member names
//! follow the property schema, for example:
//!
//! ```json
//! {
//!   "Version": { "Major": 1, "Minor": 2 },
//!   "Impl": 1,
//!   "AccelerationMode": 0,
//!   "ApiVersion": { "Major": 2, "Minor": 9 },
//!   "ImplName": "Stub Implementation",
//!   "License": "MIT",
//!   "Keywords": "VPL,Stub,x64",
//!   "VendorID": 32902,
//!   "VendorImplID": 65535,
//!   "mfxDeviceDescription": { "Version": { "Major": 1, "Minor": 1 }, "DeviceID": "0000" }
//! }
//! ```
//!
//! Sections a runtime does not report default to empty.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::schema::{Child, Field, Node};

/// Version of a descriptor structure, compared as (major, minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StructVersion {
    pub major: u8,
    pub minor: u8,
}

impl StructVersion {
    pub const fn new(major: u8, minor: u8) -> StructVersion {
        StructVersion { major, minor }
    }
}

impl PartialOrd for StructVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StructVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor).cmp(&(other.major, other.minor))
    }
}

/// API version implemented by a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

impl ApiVersion {
    pub const fn new(major: u16, minor: u16) -> ApiVersion {
        ApiVersion { major, minor }
    }

    /// Unpack the `Major << 16 | Minor` form.
    pub const fn from_packed(version: u32) -> ApiVersion {
        ApiVersion {
            major: (version >> 16) as u16,
            minor: (version & 0xffff) as u16,
        }
    }

    pub const fn packed(self) -> u32 {
        (self.major as u32) << 16 | self.minor as u32
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor).cmp(&(other.major, other.minor))
    }
}

/// Inclusive range with step, used for frame dimensions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Range32U {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl Range32U {
    /// True if `requested` lies entirely within this range with a step no
    /// finer than this range's step.
    pub fn covers(&self, requested: &Range32U) -> bool {
        requested.min >= self.min && requested.max <= self.max && requested.step >= self.step
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImplDescription {
    pub version: StructVersion,
    #[serde(rename = "Impl")]
    pub impl_type: u32,
    pub acceleration_mode: u32,
    pub api_version: ApiVersion,
    pub impl_name: String,
    pub license: String,
    pub keywords: String,
    #[serde(rename = "VendorID")]
    pub vendor_id: u32,
    #[serde(rename = "VendorImplID")]
    pub vendor_impl_id: u32,
    #[serde(rename = "mfxDeviceDescription")]
    pub device: DeviceDescription,
    #[serde(rename = "mfxDecoderDescription")]
    pub decoders: DecoderDescription,
    #[serde(rename = "mfxEncoderDescription")]
    pub encoders: EncoderDescription,
    #[serde(rename = "mfxVPPDescription")]
    pub vpp: VppDescription,
    #[serde(rename = "mfxAccelerationModeDescription")]
    pub acceleration_modes: AccelerationModes,
    #[serde(rename = "mfxSurfacePoolMode")]
    pub pool_policies: PoolPolicies,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeviceDescription {
    pub version: StructVersion,
    /// Hexadecimal device identifier, optionally followed by `/<subdevice>`.
    #[serde(rename = "DeviceID")]
    pub device_id: String,
    pub media_adapter_type: u16,
    pub sub_devices: Vec<SubDevice>,
}

impl DeviceDescription {
    /// Numeric device identifier parsed from the hexadecimal prefix of
    /// [`device_id`](Self::device_id).
    pub fn numeric_id(&self) -> Option<u16> {
        parse_device_id(&self.device_id)
    }
}

/// Parse a `"<hex>[/<subdevice>]"` device identifier.
pub fn parse_device_id(device_id: &str) -> Option<u16> {
    let hex = device_id.split('/').next()?.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    u16::from_str_radix(hex, 16).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SubDevice {
    pub index: u32,
    #[serde(rename = "SubDeviceID")]
    pub sub_device_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DecoderDescription {
    pub version: StructVersion,
    pub codecs: Vec<DecoderCodec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DecoderCodec {
    #[serde(rename = "CodecID")]
    pub codec_id: u32,
    #[serde(rename = "MaxcodecLevel")]
    pub max_codec_level: u16,
    pub profiles: Vec<CodecProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EncoderDescription {
    pub version: StructVersion,
    pub codecs: Vec<EncoderCodec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EncoderCodec {
    #[serde(rename = "CodecID")]
    pub codec_id: u32,
    #[serde(rename = "MaxcodecLevel")]
    pub max_codec_level: u16,
    pub bi_directional_prediction: u16,
    pub profiles: Vec<CodecProfile>,
}

/// One profile of a decoder or encoder and the memory it works with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CodecProfile {
    pub profile: u32,
    pub mem_desc: Vec<MemoryDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MemoryDescription {
    pub mem_handle_type: u32,
    pub width: Range32U,
    pub height: Range32U,
    pub color_formats: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VppDescription {
    pub version: StructVersion,
    pub filters: Vec<VppFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VppFilter {
    #[serde(rename = "FilterFourCC")]
    pub filter_fourcc: u32,
    pub max_delay_in_frames: u16,
    pub mem_desc: Vec<VppMemoryDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VppMemoryDescription {
    pub mem_handle_type: u32,
    pub width: Range32U,
    pub height: Range32U,
    pub formats: Vec<VppFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VppFormat {
    pub in_format: u32,
    pub out_formats: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AccelerationModes {
    pub version: StructVersion,
    pub modes: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PoolPolicies {
    pub version: StructVersion,
    pub policies: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImplementedFunctions {
    #[serde(rename = "FunctionsName")]
    pub function_names: Vec<String>,
}

impl ImplementedFunctions {
    pub fn contains(&self, name: &str) -> bool {
        self.function_names.iter().any(|f| f == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExtendedDeviceId {
    pub version: StructVersion,
    #[serde(rename = "VendorID")]
    pub vendor_id: u16,
    #[serde(rename = "DeviceID")]
    pub device_id: u16,
    #[serde(rename = "PCIDomain")]
    pub pci_domain: u32,
    #[serde(rename = "PCIBus")]
    pub pci_bus: u32,
    #[serde(rename = "PCIDevice")]
    pub pci_device: u32,
    #[serde(rename = "PCIFunction")]
    pub pci_function: u32,
    #[serde(rename = "DeviceLUID")]
    pub device_luid: [u8; 8],
    #[serde(rename = "LUIDDeviceNodeMask")]
    pub luid_device_node_mask: u32,
    #[serde(rename = "LUIDValid")]
    pub luid_valid: u32,
    #[serde(rename = "DRMRenderNodeNum")]
    pub drm_render_node_num: u32,
    #[serde(rename = "DRMPrimaryNodeNum")]
    pub drm_primary_node_num: u32,
    #[serde(rename = "RevisionID")]
    pub revision_id: u16,
    pub device_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SurfaceTypesSupported {
    pub version: StructVersion,
    pub surface_types: Vec<SurfaceType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SurfaceType {
    pub surface_type: u32,
    pub components: Vec<SurfaceComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SurfaceComponent {
    pub surface_component: u32,
    pub surface_flags: u32,
}

/// Every descriptor one implementation reported, one per capability format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub description: ImplDescription,
    pub functions: Option<ImplementedFunctions>,
    pub extended_device_id: Option<ExtendedDeviceId>,
    pub surface_types: Option<SurfaceTypesSupported>,
}

// Schema view of the descriptor tree. Names must match the property table in
// `schema.rs`.

fn array<T: Node>(items: &[T]) -> Option<Child<'_>> {
    Some(Child::Array(items.iter().map(|i| i as &dyn Node).collect()))
}

impl Node for Capabilities {
    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "mfxImplDescription" => Some(Child::Struct(&self.description)),
            "mfxImplementedFunctions" => {
                self.functions.as_ref().map(|f| Child::Struct(f as &dyn Node))
            }
            "mfxExtendedDeviceId" => self
                .extended_device_id
                .as_ref()
                .map(|d| Child::Struct(d as &dyn Node)),
            "mfxSurfaceTypesSupported" => self
                .surface_types
                .as_ref()
                .map(|s| Child::Struct(s as &dyn Node)),
            _ => None,
        }
    }
}

impl Node for ImplDescription {
    fn version(&self) -> Option<StructVersion> {
        Some(self.version)
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "Impl" => Field::Uint(self.impl_type.into()),
            "AccelerationMode" => Field::Uint(self.acceleration_mode.into()),
            "ImplName" => Field::Str(&self.impl_name),
            "License" => Field::Str(&self.license),
            "Keywords" => Field::Str(&self.keywords),
            "VendorID" => Field::Uint(self.vendor_id.into()),
            "VendorImplID" => Field::Uint(self.vendor_impl_id.into()),
            "mfxSurfacePoolMode" => {
                Field::Uints(self.pool_policies.policies.iter().map(|&p| p.into()).collect())
            }
            _ => return None,
        })
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        Some(match name {
            "ApiVersion" => Child::Struct(&self.api_version),
            "mfxDeviceDescription" => Child::Struct(&self.device),
            "mfxDecoderDescription" => Child::Struct(&self.decoders),
            "mfxEncoderDescription" => Child::Struct(&self.encoders),
            "mfxVPPDescription" => Child::Struct(&self.vpp),
            "mfxAccelerationModeDescription" => Child::Struct(&self.acceleration_modes),
            _ => return None,
        })
    }
}

impl Node for ApiVersion {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "Version" => Field::Version(*self),
            "Major" => Field::Uint(self.major.into()),
            "Minor" => Field::Uint(self.minor.into()),
            _ => return None,
        })
    }
}

impl Node for DeviceDescription {
    fn version(&self) -> Option<StructVersion> {
        Some(self.version)
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "DeviceID" => Field::Str(&self.device_id),
            "MediaAdapterType" => Field::Uint(self.media_adapter_type.into()),
            _ => return None,
        })
    }

    // The device fields are addressed as `mfxDeviceDescription.device.<leaf>`.
    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "device" => Some(Child::Struct(self)),
            _ => None,
        }
    }
}

impl Node for DecoderDescription {
    fn version(&self) -> Option<StructVersion> {
        Some(self.version)
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "decoder" => array(&self.codecs),
            _ => None,
        }
    }
}

impl Node for DecoderCodec {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "CodecID" => Field::Uint(self.codec_id.into()),
            "MaxcodecLevel" => Field::Uint(self.max_codec_level.into()),
            _ => return None,
        })
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "decprofile" => array(&self.profiles),
            _ => None,
        }
    }
}

impl Node for EncoderDescription {
    fn version(&self) -> Option<StructVersion> {
        Some(self.version)
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "encoder" => array(&self.codecs),
            _ => None,
        }
    }
}

impl Node for EncoderCodec {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "CodecID" => Field::Uint(self.codec_id.into()),
            "MaxcodecLevel" => Field::Uint(self.max_codec_level.into()),
            "BiDirectionalPrediction" => Field::Uint(self.bi_directional_prediction.into()),
            _ => return None,
        })
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "encprofile" => array(&self.profiles),
            _ => None,
        }
    }
}

impl Node for CodecProfile {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        match name {
            "Profile" => Some(Field::Uint(self.profile.into())),
            _ => None,
        }
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "decmemdesc" | "encmemdesc" => array(&self.mem_desc),
            _ => None,
        }
    }
}

impl Node for MemoryDescription {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "MemHandleType" => Field::Uint(self.mem_handle_type.into()),
            "Width" => Field::Range(self.width),
            "Height" => Field::Range(self.height),
            "ColorFormats" => {
                Field::Uints(self.color_formats.iter().map(|&c| c.into()).collect())
            }
            _ => return None,
        })
    }
}

impl Node for VppDescription {
    fn version(&self) -> Option<StructVersion> {
        Some(self.version)
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "filter" => array(&self.filters),
            _ => None,
        }
    }
}

impl Node for VppFilter {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "FilterFourCC" => Field::Uint(self.filter_fourcc.into()),
            "MaxDelayInFrames" => Field::Uint(self.max_delay_in_frames.into()),
            _ => return None,
        })
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "memdesc" => array(&self.mem_desc),
            _ => None,
        }
    }
}

impl Node for VppMemoryDescription {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "MemHandleType" => Field::Uint(self.mem_handle_type.into()),
            "Width" => Field::Range(self.width),
            "Height" => Field::Range(self.height),
            _ => return None,
        })
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "format" => array(&self.formats),
            _ => None,
        }
    }
}

impl Node for VppFormat {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "InFormat" => Field::Uint(self.in_format.into()),
            "OutFormats" => Field::Uints(self.out_formats.iter().map(|&f| f.into()).collect()),
            _ => return None,
        })
    }
}

impl Node for AccelerationModes {
    fn version(&self) -> Option<StructVersion> {
        Some(self.version)
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        match name {
            "Mode" => Some(Field::Uints(self.modes.iter().map(|&m| m.into()).collect())),
            _ => None,
        }
    }
}

impl Node for ImplementedFunctions {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        match name {
            "FunctionsName" => Some(Field::Strings(&self.function_names)),
            _ => None,
        }
    }
}

impl Node for ExtendedDeviceId {
    fn version(&self) -> Option<StructVersion> {
        Some(self.version)
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "VendorID" => Field::Uint(self.vendor_id.into()),
            "DeviceID" => Field::Uint(self.device_id.into()),
            "PCIDomain" => Field::Uint(self.pci_domain.into()),
            "PCIBus" => Field::Uint(self.pci_bus.into()),
            "PCIDevice" => Field::Uint(self.pci_device.into()),
            "PCIFunction" => Field::Uint(self.pci_function.into()),
            "DeviceLUID" => Field::Bytes(&self.device_luid),
            "LUIDDeviceNodeMask" => Field::Uint(self.luid_device_node_mask.into()),
            "LUIDValid" => Field::Uint(self.luid_valid.into()),
            "DRMRenderNodeNum" => Field::Uint(self.drm_render_node_num.into()),
            "DRMPrimaryNodeNum" => Field::Uint(self.drm_primary_node_num.into()),
            "RevisionID" => Field::Uint(self.revision_id.into()),
            "DeviceName" => Field::Str(&self.device_name),
            _ => return None,
        })
    }
}

impl Node for SurfaceTypesSupported {
    fn version(&self) -> Option<StructVersion> {
        Some(self.version)
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "surftype" => array(&self.surface_types),
            _ => None,
        }
    }
}

impl Node for SurfaceType {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        match name {
            "SurfaceType" => Some(Field::Uint(self.surface_type.into())),
            _ => None,
        }
    }

    fn child(&self, name: &str) -> Option<Child<'_>> {
        match name {
            "surfcomp" => array(&self.components),
            _ => None,
        }
    }
}

impl Node for SurfaceComponent {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        Some(match name {
            "SurfaceComponent" => Field::Uint(self.surface_component.into()),
            "SurfaceFlags" => Field::Uint(self.surface_flags.into()),
            _ => return None,
        })
    }
}
