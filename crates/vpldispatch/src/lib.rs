// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! vpldispatch
//!
//! Capability-based dispatcher for media runtime implementations. A
//! [`Loader`] discovers installed runtimes, matches each implementation they
//! expose against caller constraints, and creates sessions on the ones that
//! qualify.
//!
//! # Quick Start
//!
//! ```no_run
//! use vpldispatch::{constants::codec, CapsFormat, Loader};
//!
//! let mut loader = Loader::new();
//!
//! // A hardware implementation that decodes HEVC
//! let config = loader.create_config();
//! loader.set_filter_property(config, "mfxImplDescription.Impl", 2u32)?;
//! loader.set_filter_property(
//!     config,
//!     "mfxImplDescription.mfxDecoderDescription.decoder.CodecID",
//!     codec::HEVC,
//! )?;
//!
//! // Forwarded into the session rather than matched
//! loader.set_filter_property(config, "NumThread", 4u32)?;
//!
//! for index in 0..loader.implementation_count()? {
//!     let desc = loader.enum_implementations(index, CapsFormat::ImplDescription)?;
//!     if let Some(desc) = desc.impl_description() {
//!         println!("{}: {}", index, desc.impl_name);
//!     }
//!     loader.release_descriptor(desc)?;
//! }
//!
//! let session = loader.create_session(0)?;
//! println!("session on {}", session.impl_name());
//! # Ok::<(), vpldispatch::Error>(())
//! ```
//!
//! # Matching
//!
//! Constraints set through one [`Config`] must hold together: properties
//! that live under the same repeated element (a decoder, one of its
//! profiles, a memory description) must all hold at one element. Separate
//! configs are matched independently and must all be satisfied.
//!
//! # Logging
//!
//! Diagnostics go through the [`log`] facade. Dispatcher trace lines use the
//! [`TRACE_TARGET`] target at `info` level.

mod error;
mod handle;
mod loader;
mod matcher;
mod session;
mod trace;

pub use error::{Error, Status};
pub use handle::{Descriptor, DescriptorHandle};
pub use loader::{Candidate, Loader};
pub use session::Session;
pub use trace::TRACE_TARGET;

/// The config module provides constraint groups and pass-through settings.
pub mod config;

/// The variant module provides typed filter values.
pub mod variant;

/// The schema module provides the filterable property table.
pub mod schema;

/// The descriptor module provides the capability descriptors runtimes report.
pub mod descriptor;

/// The runtime module provides the runtime and runtime session traits.
pub mod runtime;

/// The discovery module provides runtime library discovery.
pub mod discovery;

/// The capi module provides the C entry points.
pub mod capi;

/// The constants module provides well-known property values.
pub mod constants;

/// The fourcc module provides portable handling of fourcc codes.
pub mod fourcc;

pub use config::{Config, PassThrough};
pub use discovery::{Discovery, SearchPathDiscovery, SearchPaths, SearchPriority, StaticDiscovery};
pub use runtime::{CapsFormat, LibraryRuntime, Runtime, RuntimeSession};
pub use schema::PassThroughKey;
pub use variant::{NativeHandle, Payload, Value, Variant, VariantType};
