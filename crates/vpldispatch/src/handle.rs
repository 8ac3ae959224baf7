// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Descriptor handles returned by enumeration.

use std::collections::HashSet;

use serde::Serialize;

use crate::descriptor::{
    Capabilities, ExtendedDeviceId, ImplDescription, ImplementedFunctions, SurfaceTypesSupported,
};
use crate::loader::LoaderId;
use crate::runtime::CapsFormat;
use crate::Error;

/// Snapshot of one capability descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Descriptor {
    ImplDescription(ImplDescription),
    ImplementedFunctions(ImplementedFunctions),
    ExtendedDeviceId(ExtendedDeviceId),
    SurfaceTypes(SurfaceTypesSupported),
}

impl Descriptor {
    /// Snapshot the `format` descriptor of `caps`, if it was reported.
    pub(crate) fn from_caps(caps: &Capabilities, format: CapsFormat) -> Option<Descriptor> {
        Some(match format {
            CapsFormat::ImplDescription => Descriptor::ImplDescription(caps.description.clone()),
            CapsFormat::ImplementedFunctions => {
                Descriptor::ImplementedFunctions(caps.functions.clone()?)
            }
            CapsFormat::ExtendedDeviceId => {
                Descriptor::ExtendedDeviceId(caps.extended_device_id.clone()?)
            }
            CapsFormat::SurfaceTypes => Descriptor::SurfaceTypes(caps.surface_types.clone()?),
        })
    }

    pub fn format(&self) -> CapsFormat {
        match self {
            Descriptor::ImplDescription(_) => CapsFormat::ImplDescription,
            Descriptor::ImplementedFunctions(_) => CapsFormat::ImplementedFunctions,
            Descriptor::ExtendedDeviceId(_) => CapsFormat::ExtendedDeviceId,
            Descriptor::SurfaceTypes(_) => CapsFormat::SurfaceTypes,
        }
    }
}

/// A descriptor issued by [`Loader::enum_implementations`].
///
/// Hand it back with [`Loader::release_descriptor`] on the loader that
/// issued it. Handles are not `Clone`, so each can be released once.
///
/// [`Loader::enum_implementations`]: crate::Loader::enum_implementations
/// [`Loader::release_descriptor`]: crate::Loader::release_descriptor
#[derive(Debug)]
pub struct DescriptorHandle {
    loader: LoaderId,
    serial: u64,
    descriptor: Descriptor,
}

impl DescriptorHandle {
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn format(&self) -> CapsFormat {
        self.descriptor.format()
    }

    pub fn impl_description(&self) -> Option<&ImplDescription> {
        match &self.descriptor {
            Descriptor::ImplDescription(d) => Some(d),
            _ => None,
        }
    }

    pub fn implemented_functions(&self) -> Option<&ImplementedFunctions> {
        match &self.descriptor {
            Descriptor::ImplementedFunctions(f) => Some(f),
            _ => None,
        }
    }

    pub fn extended_device_id(&self) -> Option<&ExtendedDeviceId> {
        match &self.descriptor {
            Descriptor::ExtendedDeviceId(d) => Some(d),
            _ => None,
        }
    }

    pub fn surface_types(&self) -> Option<&SurfaceTypesSupported> {
        match &self.descriptor {
            Descriptor::SurfaceTypes(s) => Some(s),
            _ => None,
        }
    }
}

/// Handles a loader has issued and not yet reclaimed.
#[derive(Debug)]
pub(crate) struct IssuedDescriptors {
    loader: LoaderId,
    next_serial: u64,
    outstanding: HashSet<u64>,
}

impl IssuedDescriptors {
    pub fn new(loader: LoaderId) -> IssuedDescriptors {
        IssuedDescriptors {
            loader,
            next_serial: 1,
            outstanding: HashSet::new(),
        }
    }

    pub fn issue(&mut self, descriptor: Descriptor) -> DescriptorHandle {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.outstanding.insert(serial);
        DescriptorHandle {
            loader: self.loader,
            serial,
            descriptor,
        }
    }

    pub fn reclaim(&mut self, handle: DescriptorHandle) -> Result<(), Error> {
        if handle.loader != self.loader || !self.outstanding.remove(&handle.serial) {
            return Err(Error::InvalidHandle);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.outstanding.len()
    }
}
