// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::{error, ffi::NulError, fmt, str};
use vpldispatch_sys as ffi;

/// Error type for dispatcher operations
#[derive(Debug)]
pub enum Error {
    /// A required handle, name or output location was absent
    NullArgument,

    /// Unknown or partial property path, index out of range, or no
    /// implementation satisfies the constraints
    NotFound,

    /// Variant type does not match the type declared for the property
    Unsupported,

    /// Handle was not issued by this loader or was already released
    InvalidHandle,

    /// A runtime library could not be loaded or lacks a required entry point
    LibraryNotLoaded(ffi::libloading::Error),

    /// A runtime reported a capability descriptor that could not be parsed
    InvalidDescriptor(serde_json::Error),

    /// UTF-8 conversion error when converting C strings to Rust strings
    Utf8(str::Utf8Error),

    /// CString creation error (null byte found in string)
    CString(NulError),

    /// A runtime entry point returned a failure status
    Runtime(i32),

    /// Null pointer returned from a runtime where a valid pointer was expected
    NullPointer,
}

/// Status codes returned across the C ABI.
///
/// Values follow the numbering used by the media runtime API so runtimes and
/// applications can share a single status space.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    None = 0,
    Unknown = -1,
    NullPtr = -2,
    Unsupported = -3,
    InvalidHandle = -6,
    NotFound = -9,
}

impl Error {
    /// Collapse this error into its C ABI status code.
    pub fn status(&self) -> Status {
        match self {
            Error::NullArgument => Status::NullPtr,
            Error::NotFound => Status::NotFound,
            Error::Unsupported => Status::Unsupported,
            Error::InvalidHandle => Status::InvalidHandle,
            Error::LibraryNotLoaded(_) => Status::NotFound,
            Error::InvalidDescriptor(_)
            | Error::Utf8(_)
            | Error::CString(_)
            | Error::Runtime(_)
            | Error::NullPointer => Status::Unknown,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NullArgument => write!(f, "Required argument is null"),
            Error::NotFound => write!(f, "Not found"),
            Error::Unsupported => write!(f, "Variant type does not match property type"),
            Error::InvalidHandle => write!(f, "Handle was not issued by this loader"),
            Error::LibraryNotLoaded(err) => {
                write!(f, "Runtime library could not be loaded: {}", err)
            }
            Error::InvalidDescriptor(err) => write!(f, "Invalid capability descriptor: {}", err),
            Error::Utf8(err) => write!(f, "UTF-8 conversion error: {}", err),
            Error::CString(err) => write!(f, "CString creation error: {}", err),
            Error::Runtime(status) => write!(f, "Runtime returned status {}", status),
            Error::NullPointer => write!(f, "Null pointer returned from runtime"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::LibraryNotLoaded(err) => Some(err),
            Error::InvalidDescriptor(err) => Some(err),
            Error::Utf8(err) => Some(err),
            Error::CString(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ffi::libloading::Error> for Error {
    fn from(err: ffi::libloading::Error) -> Self {
        Error::LibraryNotLoaded(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidDescriptor(err)
    }
}

impl From<str::Utf8Error> for Error {
    fn from(err: str::Utf8Error) -> Self {
        Error::Utf8(err)
    }
}

impl From<NulError> for Error {
    fn from(err: NulError) -> Self {
        Error::CString(err)
    }
}
