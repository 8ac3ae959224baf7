// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Property schema and dotted-path resolution.
//!
//! Every filterable property is declared once in [`PROPERTIES`] with its
//! dotted path, declared variant type, match semantics and optional version
//! gate. Segments ending in `[]` are repeated elements; callers write paths
//! without the markers, e.g.
//! `mfxImplDescription.mfxDecoderDescription.decoder.CodecID`.

use crate::descriptor::{ApiVersion, Range32U, StructVersion};
use crate::variant::VariantType;

/// How a constraint value is compared with the descriptor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Integer equality.
    Exact,
    /// String equality.
    Str,
    /// Every comma-separated token of the request appears in the field.
    Tokens,
    /// The requested string is one of the field's strings.
    Contains,
    /// The requested range fits within the field's range.
    Range,
    /// The requested integer is one of the field's integers.
    AnyOf,
    /// Byte-for-byte equality.
    Bytes,
    /// Packed `Major << 16 | Minor` floor comparison.
    ApiPacked,
    /// Major half of a split API version request.
    ApiMajor,
    /// Minor half of a split API version request.
    ApiMinor,
    /// Integer equality against the hexadecimal device identifier string.
    DeviceId,
}

/// Minimum version of an enclosing structure for a property to be defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    /// Dotted path of the versioned structure. Never beneath an array.
    pub scope: &'static str,
    pub min: StructVersion,
}

/// A filterable property.
#[derive(Debug)]
pub struct Property {
    pub path: &'static str,
    pub alias: Option<&'static str>,
    pub ty: VariantType,
    pub kind: MatchKind,
    pub gate: Option<VersionGate>,
}

/// One segment of a property path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub name: &'static str,
    pub is_array: bool,
}

impl Property {
    pub fn segments(&self) -> impl Iterator<Item = Segment> {
        self.path.split('.').map(|s| match s.strip_suffix("[]") {
            Some(name) => Segment {
                name,
                is_array: true,
            },
            None => Segment {
                name: s,
                is_array: false,
            },
        })
    }

    /// Number of repeated elements between the root and the leaf.
    pub fn array_depth(&self) -> usize {
        self.segments().filter(|s| s.is_array).count()
    }

    /// Leaf name as callers write it.
    pub fn name(&self) -> &'static str {
        self.path.rsplit('.').next().unwrap_or(self.path)
    }
}

/// Settings that are forwarded to the created session instead of matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassThroughKey {
    NumThread,
    DeviceCopy,
    HandleType,
    Handle,
    AdapterIndex,
    /// Extension buffer handed to session initialization. Kept per config
    /// rather than loader-wide.
    ExtBuffer,
}

impl PassThroughKey {
    pub const ALL: [PassThroughKey; 6] = [
        PassThroughKey::NumThread,
        PassThroughKey::DeviceCopy,
        PassThroughKey::HandleType,
        PassThroughKey::Handle,
        PassThroughKey::AdapterIndex,
        PassThroughKey::ExtBuffer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PassThroughKey::NumThread => "NumThread",
            PassThroughKey::DeviceCopy => "DeviceCopy",
            PassThroughKey::HandleType => "mfxHandleType",
            PassThroughKey::Handle => "mfxHDL",
            PassThroughKey::AdapterIndex => "DXGIAdapterIndex",
            PassThroughKey::ExtBuffer => "ExtBuffer",
        }
    }

    /// Type a value for this setting must carry.
    pub fn ty(self) -> VariantType {
        match self {
            PassThroughKey::NumThread => VariantType::U32,
            PassThroughKey::DeviceCopy => VariantType::U16,
            PassThroughKey::HandleType => VariantType::U32,
            PassThroughKey::Handle => VariantType::Ptr,
            PassThroughKey::AdapterIndex => VariantType::U32,
            PassThroughKey::ExtBuffer => VariantType::Ptr,
        }
    }

    /// Adapter selection only exists for DXGI, so the name is unknown elsewhere.
    pub fn is_available(self) -> bool {
        match self {
            PassThroughKey::AdapterIndex => cfg!(windows),
            _ => true,
        }
    }
}

/// Result of resolving a dotted property path.
#[derive(Debug, Clone, Copy)]
pub enum Resolved {
    Property(&'static Property),
    PassThrough(PassThroughKey),
    /// Names a structure or array rather than a property.
    Partial,
    Unknown,
}

macro_rules! property {
    ($path:literal, $ty:ident, $kind:ident) => {
        Property {
            path: $path,
            alias: None,
            ty: VariantType::$ty,
            kind: MatchKind::$kind,
            gate: None,
        }
    };
    ($path:literal, $ty:ident, $kind:ident, alias = $alias:literal) => {
        Property {
            path: $path,
            alias: Some($alias),
            ty: VariantType::$ty,
            kind: MatchKind::$kind,
            gate: None,
        }
    };
    ($path:literal, $ty:ident, $kind:ident, gate = ($scope:literal, $major:literal, $minor:literal)) => {
        Property {
            path: $path,
            alias: None,
            ty: VariantType::$ty,
            kind: MatchKind::$kind,
            gate: Some(VersionGate {
                scope: $scope,
                min: StructVersion::new($major, $minor),
            }),
        }
    };
}

pub static PROPERTIES: &[Property] = &[
    property!("mfxImplDescription.Impl", U32, Exact),
    property!("mfxImplDescription.AccelerationMode", U32, Exact),
    property!("mfxImplDescription.ApiVersion.Version", U32, ApiPacked),
    property!("mfxImplDescription.ApiVersion.Major", U16, ApiMajor),
    property!("mfxImplDescription.ApiVersion.Minor", U16, ApiMinor),
    property!("mfxImplDescription.ImplName", Ptr, Str),
    property!("mfxImplDescription.License", Ptr, Tokens),
    property!("mfxImplDescription.Keywords", Ptr, Tokens),
    property!("mfxImplDescription.VendorID", U32, Exact),
    property!("mfxImplDescription.VendorImplID", U32, Exact),
    property!(
        "mfxImplDescription.mfxSurfacePoolMode",
        U32,
        AnyOf,
        gate = ("mfxImplDescription", 1, 2)
    ),
    property!("mfxImplDescription.mfxAccelerationModeDescription.Mode", U16, AnyOf),
    property!("mfxImplDescription.mfxDeviceDescription.device.DeviceID", U16, DeviceId),
    property!(
        "mfxImplDescription.mfxDeviceDescription.device.MediaAdapterType",
        U16,
        Exact,
        gate = ("mfxImplDescription.mfxDeviceDescription", 1, 1)
    ),
    // Decoders
    property!("mfxImplDescription.mfxDecoderDescription.decoder[].CodecID", U32, Exact),
    property!("mfxImplDescription.mfxDecoderDescription.decoder[].MaxcodecLevel", U16, Exact),
    property!(
        "mfxImplDescription.mfxDecoderDescription.decoder[].decprofile[].Profile",
        U32,
        Exact
    ),
    property!(
        "mfxImplDescription.mfxDecoderDescription.decoder[].decprofile[].decmemdesc[].MemHandleType",
        U32,
        Exact
    ),
    property!(
        "mfxImplDescription.mfxDecoderDescription.decoder[].decprofile[].decmemdesc[].Width",
        Ptr,
        Range
    ),
    property!(
        "mfxImplDescription.mfxDecoderDescription.decoder[].decprofile[].decmemdesc[].Height",
        Ptr,
        Range
    ),
    property!(
        "mfxImplDescription.mfxDecoderDescription.decoder[].decprofile[].decmemdesc[].ColorFormats",
        U32,
        AnyOf,
        alias = "ColorFormat"
    ),
    // Encoders
    property!("mfxImplDescription.mfxEncoderDescription.encoder[].CodecID", U32, Exact),
    property!("mfxImplDescription.mfxEncoderDescription.encoder[].MaxcodecLevel", U16, Exact),
    property!(
        "mfxImplDescription.mfxEncoderDescription.encoder[].BiDirectionalPrediction",
        U16,
        Exact
    ),
    property!(
        "mfxImplDescription.mfxEncoderDescription.encoder[].encprofile[].Profile",
        U32,
        Exact
    ),
    property!(
        "mfxImplDescription.mfxEncoderDescription.encoder[].encprofile[].encmemdesc[].MemHandleType",
        U32,
        Exact
    ),
    property!(
        "mfxImplDescription.mfxEncoderDescription.encoder[].encprofile[].encmemdesc[].Width",
        Ptr,
        Range
    ),
    property!(
        "mfxImplDescription.mfxEncoderDescription.encoder[].encprofile[].encmemdesc[].Height",
        Ptr,
        Range
    ),
    property!(
        "mfxImplDescription.mfxEncoderDescription.encoder[].encprofile[].encmemdesc[].ColorFormats",
        U32,
        AnyOf,
        alias = "ColorFormat"
    ),
    // Video processing
    property!("mfxImplDescription.mfxVPPDescription.filter[].FilterFourCC", U32, Exact),
    property!("mfxImplDescription.mfxVPPDescription.filter[].MaxDelayInFrames", U16, Exact),
    property!(
        "mfxImplDescription.mfxVPPDescription.filter[].memdesc[].MemHandleType",
        U32,
        Exact
    ),
    property!("mfxImplDescription.mfxVPPDescription.filter[].memdesc[].Width", Ptr, Range),
    property!("mfxImplDescription.mfxVPPDescription.filter[].memdesc[].Height", Ptr, Range),
    property!(
        "mfxImplDescription.mfxVPPDescription.filter[].memdesc[].format[].InFormat",
        U32,
        Exact
    ),
    property!(
        "mfxImplDescription.mfxVPPDescription.filter[].memdesc[].format[].OutFormats",
        U32,
        AnyOf,
        alias = "OutFormat"
    ),
    // Implemented functions
    property!("mfxImplementedFunctions.FunctionsName", Ptr, Contains),
    // Extended device identification
    property!("mfxExtendedDeviceId.VendorID", U16, Exact),
    property!("mfxExtendedDeviceId.DeviceID", U16, Exact),
    property!("mfxExtendedDeviceId.PCIDomain", U32, Exact),
    property!("mfxExtendedDeviceId.PCIBus", U32, Exact),
    property!("mfxExtendedDeviceId.PCIDevice", U32, Exact),
    property!("mfxExtendedDeviceId.PCIFunction", U32, Exact),
    property!("mfxExtendedDeviceId.DeviceLUID", Ptr, Bytes),
    property!("mfxExtendedDeviceId.LUIDDeviceNodeMask", U32, Exact),
    property!("mfxExtendedDeviceId.LUIDValid", U32, Exact),
    property!("mfxExtendedDeviceId.DRMRenderNodeNum", U32, Exact),
    property!("mfxExtendedDeviceId.DRMPrimaryNodeNum", U32, Exact),
    property!("mfxExtendedDeviceId.RevisionID", U16, Exact),
    property!("mfxExtendedDeviceId.DeviceName", Ptr, Str),
    // Surface sharing
    property!("mfxSurfaceTypesSupported.surftype[].SurfaceType", U32, Exact),
    property!(
        "mfxSurfaceTypesSupported.surftype[].surfcomp[].SurfaceComponent",
        U32,
        Exact
    ),
    property!("mfxSurfaceTypesSupported.surftype[].surfcomp[].SurfaceFlags", U32, Exact),
];

/// Resolve a caller-supplied dotted path.
pub fn resolve(name: &str) -> Resolved {
    if let Some(key) = PassThroughKey::ALL
        .into_iter()
        .find(|k| k.is_available() && k.name() == name)
    {
        return Resolved::PassThrough(key);
    }

    let wanted: Vec<&str> = name.split('.').collect();
    let mut partial = false;

    for prop in PROPERTIES {
        let segments: Vec<Segment> = prop.segments().collect();
        if wanted.len() > segments.len() {
            continue;
        }

        let last = segments.len() - 1;
        let matches = wanted.iter().zip(&segments).enumerate().all(|(i, (w, s))| {
            *w == s.name || (i == last && prop.alias == Some(*w))
        });
        if !matches {
            continue;
        }

        if wanted.len() == segments.len() {
            return Resolved::Property(prop);
        }
        partial = true;
    }

    if partial {
        Resolved::Partial
    } else {
        Resolved::Unknown
    }
}

/// Value of a descriptor field as seen by the matcher.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Field<'a> {
    Uint(u64),
    Str(&'a str),
    Strings(&'a [String]),
    Bytes(&'a [u8]),
    Range(Range32U),
    Uints(Vec<u64>),
    Version(ApiVersion),
}

pub(crate) enum Child<'a> {
    Struct(&'a dyn Node),
    Array(Vec<&'a dyn Node>),
}

/// Schema view of one structure in a descriptor tree.
pub(crate) trait Node {
    /// Version of this structure, if it is versioned.
    fn version(&self) -> Option<StructVersion> {
        None
    }

    fn field(&self, _name: &str) -> Option<Field<'_>> {
        None
    }

    fn child(&self, _name: &str) -> Option<Child<'_>> {
        None
    }
}
