// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Constraint matching against capability descriptors.
//!
//! Each constraint group is arranged into a tree of scopes, one per repeated
//! element its properties pass through. Properties that share an array
//! prefix bind to the same element of that array; properties whose array
//! chains diverge are matched independently below the last shared array. A
//! scope is satisfied when its own properties hold at the element and every
//! child scope is satisfied by at least one element of its array.

use crate::config::{Constraint, ConstraintGroup};
use crate::descriptor::{parse_device_id, ApiVersion, Capabilities};
use crate::schema::{Child, Field, MatchKind, Node, VersionGate};

/// True if `caps` satisfies every group.
pub(crate) fn accepts(groups: &[ConstraintGroup], caps: &Capabilities) -> bool {
    if let Some(requested) = split_api_version(groups) {
        if caps.description.api_version < requested {
            log::debug!(
                "{}: API {}.{} below requested {}.{}",
                caps.description.impl_name,
                caps.description.api_version.major,
                caps.description.api_version.minor,
                requested.major,
                requested.minor
            );
            return false;
        }
    }

    groups.iter().enumerate().all(|(idx, group)| {
        let ok = group_satisfied(group, caps);
        if !ok {
            log::debug!(
                "{}: constraint group {} not satisfied",
                caps.description.impl_name,
                idx
            );
        }
        ok
    })
}

/// The split `ApiVersion.Major` / `ApiVersion.Minor` request, combined across
/// all groups. Only applies once both halves have been set.
fn split_api_version(groups: &[ConstraintGroup]) -> Option<ApiVersion> {
    let mut major = None;
    let mut minor = None;
    for constraint in groups.iter().flat_map(|g| g.entries()) {
        match constraint.property.kind {
            MatchKind::ApiMajor => major = constraint.value.value.as_u64(),
            MatchKind::ApiMinor => minor = constraint.value.value.as_u64(),
            _ => {}
        }
    }

    Some(ApiVersion::new(
        u16::try_from(major?).ok()?,
        u16::try_from(minor?).ok()?,
    ))
}

pub(crate) fn group_satisfied(group: &ConstraintGroup, caps: &Capabilities) -> bool {
    let effective: Vec<&Constraint> = group
        .effective()
        .into_iter()
        .filter(|c| !matches!(c.property.kind, MatchKind::ApiMajor | MatchKind::ApiMinor))
        .collect();

    let gated_out = effective
        .iter()
        .filter_map(|c| c.property.gate)
        .any(|gate| !gate_open(caps, &gate));
    if gated_out {
        return false;
    }

    Scope::build(&effective).satisfied_by(caps)
}

fn gate_open(caps: &Capabilities, gate: &VersionGate) -> bool {
    let path: Vec<&str> = gate.scope.split('.').collect();
    descend(caps, &path)
        .and_then(|node| node.version())
        .is_some_and(|version| version >= gate.min)
}

fn descend<'a>(mut node: &'a dyn Node, path: &[&str]) -> Option<&'a dyn Node> {
    for name in path {
        match node.child(name)? {
            Child::Struct(next) => node = next,
            Child::Array(_) => return None,
        }
    }
    Some(node)
}

fn elements<'a>(node: &'a dyn Node, route: &[&'static str]) -> Vec<&'a dyn Node> {
    let Some((array, parents)) = route.split_last() else {
        return Vec::new();
    };
    match descend(node, parents).and_then(|n| n.child(array)) {
        Some(Child::Array(items)) => items,
        _ => Vec::new(),
    }
}

struct Term<'g> {
    /// Structure names from the scope element to the leaf, leaf last.
    route: Vec<&'static str>,
    constraint: &'g Constraint,
}

impl Term<'_> {
    fn holds(&self, node: &dyn Node) -> bool {
        let Some((leaf, parents)) = self.route.split_last() else {
            return false;
        };
        descend(node, parents)
            .and_then(|n| n.field(leaf))
            .is_some_and(|field| compare(self.constraint, &field))
    }
}

#[derive(Default)]
struct Scope<'g> {
    /// Structure names from the parent element to this array, array last.
    route: Vec<&'static str>,
    terms: Vec<Term<'g>>,
    children: Vec<Scope<'g>>,
}

impl<'g> Scope<'g> {
    fn build(constraints: &[&'g Constraint]) -> Scope<'g> {
        let mut root = Scope::default();

        for &constraint in constraints {
            let mut scope = &mut root;
            let mut route = Vec::new();

            for segment in constraint.property.segments() {
                route.push(segment.name);
                if !segment.is_array {
                    continue;
                }

                let array_route = std::mem::take(&mut route);
                let pos = match scope.children.iter().position(|s| s.route == array_route) {
                    Some(pos) => pos,
                    None => {
                        scope.children.push(Scope {
                            route: array_route,
                            ..Default::default()
                        });
                        scope.children.len() - 1
                    }
                };
                scope = &mut scope.children[pos];
            }

            scope.terms.push(Term { route, constraint });
        }

        root
    }

    fn satisfied_by(&self, node: &dyn Node) -> bool {
        self.terms.iter().all(|term| term.holds(node))
            && self.children.iter().all(|child| {
                elements(node, &child.route)
                    .into_iter()
                    .any(|element| child.satisfied_by(element))
            })
    }
}

fn compare(constraint: &Constraint, field: &Field) -> bool {
    let value = &constraint.value.value;
    match (constraint.property.kind, field) {
        (MatchKind::Exact, Field::Uint(have)) => value.as_u64() == Some(*have),
        (MatchKind::Str, Field::Str(have)) => value.as_str() == Some(*have),
        (MatchKind::Tokens, Field::Str(have)) => {
            value.as_str().is_some_and(|want| tokens_declared(want, have))
        }
        (MatchKind::Contains, Field::Strings(have)) => {
            value.as_str().is_some_and(|want| have.iter().any(|s| s == want))
        }
        (MatchKind::Range, Field::Range(have)) => {
            value.as_range().is_some_and(|want| have.covers(&want))
        }
        (MatchKind::AnyOf, Field::Uints(have)) => {
            value.as_u64().is_some_and(|want| have.contains(&want))
        }
        (MatchKind::Bytes, Field::Bytes(have)) => value.as_bytes() == Some(*have),
        (MatchKind::ApiPacked, Field::Version(have)) => value
            .as_u64()
            .and_then(|packed| u32::try_from(packed).ok())
            .is_some_and(|packed| *have >= ApiVersion::from_packed(packed)),
        (MatchKind::DeviceId, Field::Str(have)) => {
            value
                .as_u64()
                .and_then(|want| u16::try_from(want).ok())
                .is_some_and(|want| parse_device_id(have) == Some(want))
        }
        _ => false,
    }
}

/// Every comma-separated token of `want` appears in `have`.
fn tokens_declared(want: &str, have: &str) -> bool {
    let declared: Vec<&str> = have.split(',').map(str::trim).collect();
    want.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .all(|token| declared.contains(&token))
}
