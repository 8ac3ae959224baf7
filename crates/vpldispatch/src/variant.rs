// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Typed values for filter properties and pass-through settings.

use std::{ffi::c_void, fmt};

use crate::descriptor::{Range32U, StructVersion};

/// Version stamped on every [`Variant`] created by this crate.
pub const VARIANT_VERSION: StructVersion = StructVersion::new(1, 0);

/// Type tag of a [`Variant`].
///
/// The discriminants are the values exchanged across the C ABI.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantType {
    Unset = 0,
    U8 = 1,
    I8 = 2,
    U16 = 3,
    I16 = 4,
    U32 = 5,
    I32 = 6,
    U64 = 7,
    I64 = 8,
    F32 = 9,
    F64 = 10,
    Ptr = 11,
}

impl VariantType {
    pub fn from_raw(raw: u32) -> Option<VariantType> {
        Some(match raw {
            0 => VariantType::Unset,
            1 => VariantType::U8,
            2 => VariantType::I8,
            3 => VariantType::U16,
            4 => VariantType::I16,
            5 => VariantType::U32,
            6 => VariantType::I32,
            7 => VariantType::U64,
            8 => VariantType::I64,
            9 => VariantType::F32,
            10 => VariantType::F64,
            11 => VariantType::Ptr,
            _ => return None,
        })
    }
}

/// Opaque native handle (device manager, display, adapter) carried as an
/// address. The dispatcher never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeHandle(pub usize);

impl NativeHandle {
    pub fn from_ptr(ptr: *mut c_void) -> NativeHandle {
        NativeHandle(ptr as usize)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// What a pointer-typed variant points at.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Handle(NativeHandle),
    Str(String),
    Bytes(Vec<u8>),
    Range(Range32U),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unset,
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Ptr(Payload),
}

impl Value {
    pub fn type_tag(&self) -> VariantType {
        match self {
            Value::Unset => VariantType::Unset,
            Value::U8(_) => VariantType::U8,
            Value::I8(_) => VariantType::I8,
            Value::U16(_) => VariantType::U16,
            Value::I16(_) => VariantType::I16,
            Value::U32(_) => VariantType::U32,
            Value::I32(_) => VariantType::I32,
            Value::U64(_) => VariantType::U64,
            Value::I64(_) => VariantType::I64,
            Value::F32(_) => VariantType::F32,
            Value::F64(_) => VariantType::F64,
            Value::Ptr(_) => VariantType::Ptr,
        }
    }

    /// Integer payload widened to `u64`. Negative and non-integer values
    /// return `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => Some(v),
            Value::I8(v) => u64::try_from(v).ok(),
            Value::I16(v) => u64::try_from(v).ok(),
            Value::I32(v) => u64::try_from(v).ok(),
            Value::I64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Ptr(Payload::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Ptr(Payload::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<Range32U> {
        match self {
            Value::Ptr(Payload::Range(r)) => Some(*r),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<NativeHandle> {
        match self {
            Value::Ptr(Payload::Handle(h)) => Some(*h),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Unset => write!(f, "unset"),
            Value::U8(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Ptr(Payload::Handle(h)) => write!(f, "{:#x}", h.0),
            Value::Ptr(Payload::Str(s)) => write!(f, "{}", s),
            Value::Ptr(Payload::Bytes(b)) => {
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Ptr(Payload::Range(r)) => write!(f, "{}..{} step {}", r.min, r.max, r.step),
        }
    }
}

/// A typed, versioned value.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub version: StructVersion,
    pub value: Value,
}

impl Variant {
    pub fn new(value: Value) -> Variant {
        Variant {
            version: VARIANT_VERSION,
            value,
        }
    }

    pub fn type_tag(&self) -> VariantType {
        self.value.type_tag()
    }

    pub fn string(s: impl Into<String>) -> Variant {
        Variant::new(Value::Ptr(Payload::Str(s.into())))
    }

    pub fn bytes(b: impl Into<Vec<u8>>) -> Variant {
        Variant::new(Value::Ptr(Payload::Bytes(b.into())))
    }

    pub fn range(min: u32, max: u32, step: u32) -> Variant {
        Variant::new(Value::Ptr(Payload::Range(Range32U { min, max, step })))
    }

    pub fn handle(handle: NativeHandle) -> Variant {
        Variant::new(Value::Ptr(Payload::Handle(handle)))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.value.fmt(f)
    }
}

macro_rules! variant_from {
    ($($ty:ty => $arm:ident),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(v: $ty) -> Self {
                    Variant::new(Value::$arm(v))
                }
            }
        )*
    };
}

variant_from!(
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Variant::string(s)
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Variant::string(s)
    }
}

impl From<Range32U> for Variant {
    fn from(r: Range32U) -> Self {
        Variant::new(Value::Ptr(Payload::Range(r)))
    }
}

impl From<NativeHandle> for Variant {
    fn from(h: NativeHandle) -> Self {
        Variant::handle(h)
    }
}
