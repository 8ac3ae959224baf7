// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Constraint groups and the pass-through settings map.

use std::collections::BTreeMap;

use crate::loader::LoaderId;
use crate::schema::{PassThroughKey, Property};
use crate::variant::{NativeHandle, Variant};

/// Handle to a constraint group created by [`Loader::create_config`].
///
/// Constraints set through the same `Config` describe one coherent
/// implementation, e.g. one codec and one of its profiles. Constraints set
/// through different `Config`s must each be satisfied on their own.
///
/// [`Loader::create_config`]: crate::Loader::create_config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    pub(crate) loader: LoaderId,
    pub(crate) index: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Constraint {
    pub property: &'static Property,
    pub value: Variant,
}

/// Append-only log of the constraints set on one [`Config`], plus the
/// extension buffer slot of that config.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConstraintGroup {
    entries: Vec<Constraint>,
    ext_buffer: Option<NativeHandle>,
}

impl ConstraintGroup {
    /// Replaces any buffer set earlier on the same config.
    pub fn set_ext_buffer(&mut self, buffer: NativeHandle) {
        self.ext_buffer = Some(buffer);
    }

    pub fn ext_buffer(&self) -> Option<NativeHandle> {
        self.ext_buffer
    }

    pub fn push(&mut self, property: &'static Property, value: Variant) {
        self.entries.push(Constraint { property, value });
    }

    pub fn entries(&self) -> &[Constraint] {
        &self.entries
    }

    /// Constraints in effect: the latest value of each property, in the order
    /// the property was first set.
    pub fn effective(&self) -> Vec<&Constraint> {
        let mut out: Vec<&Constraint> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            match out
                .iter()
                .position(|c| std::ptr::eq(c.property, entry.property))
            {
                Some(pos) => out[pos] = entry,
                None => out.push(entry),
            }
        }
        out
    }
}

/// Settings forwarded verbatim into every session a loader creates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassThrough {
    values: BTreeMap<PassThroughKey, Variant>,
    ext_buffers: Vec<NativeHandle>,
}

impl PassThrough {
    pub(crate) fn insert(&mut self, key: PassThroughKey, value: Variant) -> Option<Variant> {
        self.values.insert(key, value)
    }

    /// The value exactly as it was set.
    pub fn get(&self, key: PassThroughKey) -> Option<&Variant> {
        self.values.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PassThroughKey, &Variant)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.ext_buffers.is_empty()
    }

    /// Same settings with `buffers` as the extension buffers.
    pub(crate) fn with_ext_buffers(&self, buffers: Vec<NativeHandle>) -> PassThrough {
        PassThrough {
            values: self.values.clone(),
            ext_buffers: buffers,
        }
    }

    /// Extension buffers, one per config that set one, in config order.
    pub fn ext_buffers(&self) -> &[NativeHandle] {
        &self.ext_buffers
    }

    fn uint(&self, key: PassThroughKey) -> Option<u64> {
        self.get(key).and_then(|v| v.value.as_u64())
    }

    pub fn num_thread(&self) -> Option<u32> {
        self.uint(PassThroughKey::NumThread)
            .and_then(|v| u32::try_from(v).ok())
    }

    pub fn device_copy(&self) -> Option<u16> {
        self.uint(PassThroughKey::DeviceCopy)
            .and_then(|v| u16::try_from(v).ok())
    }

    pub fn handle_type(&self) -> Option<u32> {
        self.uint(PassThroughKey::HandleType)
            .and_then(|v| u32::try_from(v).ok())
    }

    pub fn handle(&self) -> Option<NativeHandle> {
        self.get(PassThroughKey::Handle)
            .and_then(|v| v.value.as_handle())
    }

    pub fn adapter_index(&self) -> Option<u32> {
        self.uint(PassThroughKey::AdapterIndex)
            .and_then(|v| u32::try_from(v).ok())
    }
}
