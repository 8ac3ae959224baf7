// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! The loader: constraint groups, candidate filtering and session creation.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use log::{debug, warn};

use crate::config::{Config, ConstraintGroup, PassThrough};
use crate::descriptor::{
    Capabilities, ExtendedDeviceId, ImplDescription, ImplementedFunctions, SurfaceTypesSupported,
};
use crate::discovery::{Discovery, SearchPathDiscovery};
use crate::handle::{Descriptor, DescriptorHandle, IssuedDescriptors};
use crate::matcher;
use crate::runtime::{CapsFormat, Runtime};
use crate::schema::{resolve, PassThroughKey, Resolved};
use crate::session::Session;
use crate::trace::{self, FunctionTrace};
use crate::variant::{Variant, VariantType};
use crate::Error;

static NEXT_LOADER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a loader, carried by the handles it issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LoaderId(u64);

impl LoaderId {
    pub(crate) fn next() -> LoaderId {
        LoaderId(NEXT_LOADER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One implementation exposed by a runtime.
#[derive(Clone)]
pub struct Candidate {
    runtime: Arc<dyn Runtime>,
    impl_index: u32,
    caps: Arc<Capabilities>,
}

impl Candidate {
    /// Name of the runtime library providing this implementation.
    pub fn library(&self) -> &str {
        self.runtime.name()
    }

    /// Index of this implementation within its runtime.
    pub fn impl_index(&self) -> u32 {
        self.impl_index
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn description(&self) -> &ImplDescription {
        &self.caps.description
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("library", &self.library())
            .field("impl_index", &self.impl_index)
            .field("impl_name", &self.caps.description.impl_name)
            .finish()
    }
}

/// Selects runtime implementations by capability and creates sessions on
/// them.
///
/// Runtimes are discovered on the first call that needs them and cached for
/// the loader's lifetime. The list of accepted implementations is cached too
/// and rebuilt after any constraint changes, so indices passed to
/// [`enum_implementations`](Self::enum_implementations) and
/// [`create_session`](Self::create_session) are stable while the constraints
/// are unchanged.
///
/// # Example
///
/// ```no_run
/// use vpldispatch::{constants::codec, CapsFormat, Loader};
///
/// let mut loader = Loader::new();
/// let config = loader.create_config();
/// loader.set_filter_property(
///     config,
///     "mfxImplDescription.mfxDecoderDescription.decoder.CodecID",
///     codec::HEVC,
/// )?;
///
/// let desc = loader.enum_implementations(0, CapsFormat::ImplDescription)?;
/// if let Some(desc) = desc.impl_description() {
///     println!("using {}", desc.impl_name);
/// }
/// loader.release_descriptor(desc)?;
///
/// let session = loader.create_session(0)?;
/// session.close()?;
/// # Ok::<(), vpldispatch::Error>(())
/// ```
pub struct Loader {
    id: LoaderId,
    discovery: Box<dyn Discovery>,
    groups: Vec<ConstraintGroup>,
    pass_through: PassThrough,
    candidates: Option<Vec<Candidate>>,
    accepted: Option<Vec<usize>>,
    issued: IssuedDescriptors,
}

impl Loader {
    /// Loader that discovers runtimes through the search path environment.
    pub fn new() -> Loader {
        Loader::with_discovery(SearchPathDiscovery::from_env())
    }

    pub fn with_discovery(discovery: impl Discovery + 'static) -> Loader {
        let id = LoaderId::next();
        debug!("loader {:?} created", id);
        Loader {
            id,
            discovery: Box::new(discovery),
            groups: Vec::new(),
            pass_through: PassThrough::default(),
            candidates: None,
            accepted: None,
            issued: IssuedDescriptors::new(id),
        }
    }

    /// Create an empty constraint group.
    pub fn create_config(&mut self) -> Config {
        let _trace = FunctionTrace::enter("create_config");
        self.groups.push(ConstraintGroup::default());
        Config {
            loader: self.id,
            index: self.groups.len() - 1,
        }
    }

    /// Add a constraint to `config`, or store a pass-through setting.
    ///
    /// `name` is a dotted property path such as
    /// `mfxImplDescription.mfxDecoderDescription.decoder.CodecID`, or one of
    /// the pass-through names `NumThread`, `DeviceCopy`, `mfxHandleType`,
    /// `mfxHDL`, `ExtBuffer` and, on Windows, `DXGIAdapterIndex`.
    /// `ExtBuffer` keeps one buffer per config; every other pass-through
    /// setting is shared by the whole loader.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] if `config` belongs to another loader.
    /// - [`Error::NotFound`] if `name` is not a property or names a structure.
    /// - [`Error::Unsupported`] if the value's type is not the property's or
    ///   setting's type. Pointer settings must carry a [`NativeHandle`].
    ///
    /// [`NativeHandle`]: crate::NativeHandle
    ///
    /// Nothing is recorded when an error is returned.
    pub fn set_filter_property(
        &mut self,
        config: Config,
        name: &str,
        value: impl Into<Variant>,
    ) -> Result<(), Error> {
        let _trace = FunctionTrace::enter("set_filter_property");
        if config.loader != self.id || config.index >= self.groups.len() {
            return Err(Error::InvalidHandle);
        }

        let value = value.into();
        match resolve(name) {
            Resolved::Unknown | Resolved::Partial => {
                debug!("unknown property {:?}", name);
                Err(Error::NotFound)
            }
            Resolved::PassThrough(key) => {
                let handle = value.value.as_handle();
                if value.type_tag() != key.ty()
                    || (key.ty() == VariantType::Ptr && handle.is_none())
                {
                    debug!("{}: expected {:?}, got {:?}", name, key.ty(), value.value);
                    return Err(Error::Unsupported);
                }

                trace::ext_buf(key, &value);
                match (key, handle) {
                    (PassThroughKey::ExtBuffer, Some(buffer)) => {
                        self.groups[config.index].set_ext_buffer(buffer)
                    }
                    _ => {
                        self.pass_through.insert(key, value);
                    }
                }
                Ok(())
            }
            Resolved::Property(property) => {
                if value.type_tag() != property.ty {
                    debug!(
                        "{}: expected {:?}, got {:?}",
                        name,
                        property.ty,
                        value.type_tag()
                    );
                    return Err(Error::Unsupported);
                }
                self.groups[config.index].push(property, value);
                self.accepted = None;
                Ok(())
            }
        }
    }

    /// Loader-wide settings forwarded into every session this loader
    /// creates. Extension buffers are kept per config and are not included.
    pub fn pass_through(&self) -> &PassThrough {
        &self.pass_through
    }

    /// Settings for a new session: the loader-wide settings plus the
    /// extension buffer of each config, in config order.
    fn session_settings(&self) -> PassThrough {
        let buffers = self
            .groups
            .iter()
            .filter_map(ConstraintGroup::ext_buffer)
            .collect();
        self.pass_through.with_ext_buffers(buffers)
    }

    /// Every implementation discovered, accepted or not.
    pub fn candidates(&mut self) -> Result<&[Candidate], Error> {
        let _trace = FunctionTrace::enter("candidates");
        self.load_candidates()?;
        Ok(self.candidates.as_deref().unwrap_or(&[]))
    }

    /// Number of implementations satisfying every constraint group.
    pub fn implementation_count(&mut self) -> Result<usize, Error> {
        let _trace = FunctionTrace::enter("implementation_count");
        self.filter()
    }

    /// Snapshot the `format` descriptor of the `index`-th accepted
    /// implementation.
    ///
    /// Fails with [`Error::NotFound`] if `index` is out of range or the
    /// implementation does not report `format`.
    pub fn enum_implementations(
        &mut self,
        index: usize,
        format: CapsFormat,
    ) -> Result<DescriptorHandle, Error> {
        let _trace = FunctionTrace::enter("enum_implementations");
        let candidate = self.accepted_at(index)?;
        let descriptor = Descriptor::from_caps(&candidate.caps, format).ok_or_else(|| {
            debug!(
                "{} does not report {:?}",
                candidate.caps.description.impl_name, format
            );
            Error::NotFound
        })?;
        Ok(self.issued.issue(descriptor))
    }

    /// Return a descriptor issued by [`enum_implementations`](Self::enum_implementations).
    ///
    /// Fails with [`Error::InvalidHandle`] if another loader issued it.
    pub fn release_descriptor(&mut self, handle: DescriptorHandle) -> Result<(), Error> {
        let _trace = FunctionTrace::enter("release_descriptor");
        self.issued.reclaim(handle)
    }

    /// Descriptors issued and not yet released.
    pub fn outstanding_descriptors(&self) -> usize {
        self.issued.len()
    }

    /// Create a session on the `index`-th accepted implementation, with the
    /// pass-through settings forwarded to the runtime.
    pub fn create_session(&mut self, index: usize) -> Result<Session, Error> {
        let _trace = FunctionTrace::enter("create_session");
        let candidate = self.accepted_at(index)?;
        let settings = self.session_settings();
        for (key, value) in settings.iter() {
            trace::ext_buf(key, value);
        }
        for buffer in settings.ext_buffers() {
            trace::ext_buf(PassThroughKey::ExtBuffer, &Variant::handle(*buffer));
        }

        let inner = candidate
            .runtime
            .initialize(candidate.impl_index, &settings)?;
        trace::message(format_args!(
            "session created on {} ({}:{})",
            candidate.caps.description.impl_name,
            candidate.library(),
            candidate.impl_index
        ));

        Ok(Session::new(
            inner,
            candidate.library().to_owned(),
            candidate.impl_index,
            candidate.caps.description.impl_name.clone(),
            settings,
        ))
    }

    fn load_candidates(&mut self) -> Result<(), Error> {
        if self.candidates.is_some() {
            return Ok(());
        }

        let mut candidates = Vec::new();
        for runtime in self.discovery.discover()? {
            match query_runtime(&runtime) {
                Ok(found) => candidates.extend(found),
                Err(err) => warn!("skipping runtime {}: {}", runtime.name(), err),
            }
        }
        debug!("{} implementations discovered", candidates.len());
        self.candidates = Some(candidates);
        Ok(())
    }

    /// Build the accepted list if needed and return its length.
    fn filter(&mut self) -> Result<usize, Error> {
        self.load_candidates()?;
        if self.accepted.is_none() {
            let candidates = self.candidates.as_deref().unwrap_or(&[]);
            let mut accepted = Vec::new();
            for (idx, candidate) in candidates.iter().enumerate() {
                let name = &candidate.caps.description.impl_name;
                if matcher::accepts(&self.groups, &candidate.caps) {
                    trace::message(format_args!("implementation {} ({}) accepted", idx, name));
                    accepted.push(idx);
                } else {
                    trace::message(format_args!("implementation {} ({}) rejected", idx, name));
                }
            }
            self.accepted = Some(accepted);
        }
        Ok(self.accepted.as_ref().map_or(0, Vec::len))
    }

    fn accepted_at(&mut self, index: usize) -> Result<Candidate, Error> {
        self.filter()?;
        self.accepted
            .as_ref()
            .and_then(|accepted| accepted.get(index))
            .and_then(|&pos| self.candidates.as_ref()?.get(pos))
            .cloned()
            .ok_or(Error::NotFound)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Loader::new()
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        let outstanding = self.issued.len();
        if outstanding > 0 {
            warn!(
                "loader {:?} dropped with {} unreleased descriptors",
                self.id, outstanding
            );
        } else {
            debug!("loader {:?} dropped", self.id);
        }
    }
}

/// Query every capability format from `runtime`, one candidate per
/// implementation with a valid description.
fn query_runtime(runtime: &Arc<dyn Runtime>) -> Result<Vec<Candidate>, Error> {
    let descriptions = runtime.query(CapsFormat::ImplDescription)?;
    let functions = runtime.query(CapsFormat::ImplementedFunctions)?;
    let device_ids = runtime.query(CapsFormat::ExtendedDeviceId)?;
    let surfaces = runtime.query(CapsFormat::SurfaceTypes)?;

    let mut candidates = Vec::with_capacity(descriptions.len());
    for (idx, blob) in descriptions.iter().enumerate() {
        let description: ImplDescription = match serde_json::from_slice(blob) {
            Ok(description) => description,
            Err(err) => {
                warn!(
                    "{}: implementation {} has an invalid description: {}",
                    runtime.name(),
                    idx,
                    err
                );
                continue;
            }
        };
        let Ok(impl_index) = u32::try_from(idx) else {
            break;
        };

        let caps = Capabilities {
            description,
            functions: optional::<ImplementedFunctions>(runtime.name(), &functions, idx),
            extended_device_id: optional::<ExtendedDeviceId>(runtime.name(), &device_ids, idx),
            surface_types: optional::<SurfaceTypesSupported>(runtime.name(), &surfaces, idx),
        };
        candidates.push(Candidate {
            runtime: runtime.clone(),
            impl_index,
            caps: Arc::new(caps),
        });
    }
    Ok(candidates)
}

fn optional<T: serde::de::DeserializeOwned>(
    runtime: &str,
    blobs: &[Vec<u8>],
    idx: usize,
) -> Option<T> {
    let blob = blobs.get(idx).filter(|b| !b.is_empty())?;
    match serde_json::from_slice(blob) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "{}: implementation {} reported an invalid {}: {}",
                runtime,
                idx,
                std::any::type_name::<T>(),
                err
            );
            None
        }
    }
}
