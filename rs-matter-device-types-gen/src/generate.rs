/*
 * Copyright (c) 2024 Project CHIP Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! A module for generating the rust definitions of all device types.
//!
//! Every device type becomes a unit struct implementing the `DeviceType` trait,
//! which carries the device type ID, its name and the clusters it implements.
//! The lookup table from device type ID to device type is built here as well,
//! from the complete list of device types.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::LitInt;

use crate::model::GenerationRecord;
use crate::Error;

/// Names of the items generated next to the device types
const RESERVED_NAMES: &[&str] = &["Cluster", "DeviceType", "DeviceTypeInfo"];

/// Some context data for the device types generation
pub struct DeviceTypesGenerateContext {
    source: String,
}

impl DeviceTypesGenerateContext {
    /// `source` is the name of the schema file, mentioned in the generated header
    pub fn new(source: impl AsRef<str>) -> Self {
        Self {
            source: source.as_ref().to_string(),
        }
    }
}

impl Default for DeviceTypesGenerateContext {
    fn default() -> Self {
        Self::new(crate::DEVICE_TYPES_XML_PATH)
    }
}

/// Parses `identifier` as a rust identifier.
///
/// `what` describes where the identifier comes from, for error reporting.
fn parse_ident(identifier: &str, what: impl FnOnce() -> String) -> Result<Ident, Error> {
    match syn::parse_str::<Ident>(identifier) {
        Ok(ident) if !RESERVED_NAMES.contains(&identifier) => Ok(ident),
        _ => Err(Error::InvalidIdentifier {
            identifier: identifier.to_string(),
            what: what(),
        }),
    }
}

/// Return a token stream with the unit struct of a device type
/// and its `DeviceType` implementation.
pub fn device_type_definition(record: &GenerationRecord) -> Result<TokenStream, Error> {
    let name = parse_ident(&record.identifier, || {
        format!("device type `{}`", record.doc_summary)
    })?;

    let clusters = record
        .cluster_identifiers
        .iter()
        .map(|cluster| {
            parse_ident(cluster, || {
                format!("cluster of device type `{}`", record.doc_summary)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let doc = format!(" {}.", record.doc_summary);
    let type_name = &record.doc_summary;
    let device_type = LitInt::new(&format!("{:#06x}", record.device_id), Span::call_site());

    Ok(quote!(
        #[doc = #doc]
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct #name;

        impl DeviceType for #name {
            const DEVICE_TYPE: u32 = #device_type;
            const NAME: &'static str = #type_name;
            const CLUSTERS: &'static [Cluster] = &[#(Cluster::#clusters),*];
        }
    ))
}

/// Maps device type IDs to their records.
///
/// Device type IDs are unique in the schema; should one repeat nevertheless,
/// the later record wins.
pub fn device_types_by_id(records: &[GenerationRecord]) -> BTreeMap<u32, &GenerationRecord> {
    let mut by_id = BTreeMap::new();

    for record in records {
        if let Some(previous) = by_id.insert(record.device_id, record) {
            warn!(
                "Device type ID {:#06x} of `{}` is also used by `{}`",
                record.device_id, record.doc_summary, previous.doc_summary
            );
        }
    }

    by_id
}

/// Return a token stream with the `Cluster` enum, listing every cluster
/// used by at least one of the device types.
fn cluster_enum(records: &[GenerationRecord]) -> Result<TokenStream, Error> {
    let clusters = records
        .iter()
        .flat_map(|record| record.cluster_identifiers.iter())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|cluster| parse_ident(cluster, || "cluster".to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote!(
        /// The clusters implemented by the device types.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Cluster {
            #(#clusters),*
        }
    ))
}

/// Return a token stream with the static table of all device types,
/// ordered by device type ID, and its lookup function.
fn device_type_table(records: &[GenerationRecord]) -> Result<TokenStream, Error> {
    let types = device_types_by_id(records)
        .into_values()
        .map(|record| {
            parse_ident(&record.identifier, || {
                format!("device type `{}`", record.doc_summary)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote!(
        /// All the device types, ordered by device type ID.
        pub static ALL_TYPES: &[DeviceTypeInfo] = &[#(<#types as DeviceType>::INFO),*];

        /// Looks up a device type by its device type ID.
        pub fn device_type(device_type: u32) -> Option<&'static DeviceTypeInfo> {
            ALL_TYPES
                .binary_search_by_key(&device_type, |info| info.device_type)
                .ok()
                .map(|index| &ALL_TYPES[index])
        }
    ))
}

/// Return a token stream with the whole generated file: the common definitions,
/// one definition per device type (in the order of `records`) and the device
/// type table.
pub fn device_types_generate(
    records: &[GenerationRecord],
    context: &DeviceTypesGenerateContext,
) -> Result<TokenStream, Error> {
    let header = vec![
        " Definitions for all known Matter device types.".to_string(),
        String::new(),
        format!(" This file is auto generated from `{}`.", context.source),
        " Do not edit!".to_string(),
    ];

    let device_types = records
        .iter()
        .map(device_type_definition)
        .collect::<Result<Vec<_>, _>>()?;
    let cluster_enum = cluster_enum(records)?;
    let device_type_table = device_type_table(records)?;

    Ok(quote!(
        #(#![doc = #header])*

        #cluster_enum

        /// The static description of a device type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct DeviceTypeInfo {
            /// The device type ID
            pub device_type: u32,
            /// The human readable name of the device type
            pub name: &'static str,
            /// The clusters the device type implements
            pub clusters: &'static [Cluster],
        }

        /// A Matter device type.
        pub trait DeviceType {
            const DEVICE_TYPE: u32;
            const NAME: &'static str;
            const CLUSTERS: &'static [Cluster];

            const INFO: DeviceTypeInfo = DeviceTypeInfo {
                device_type: Self::DEVICE_TYPE,
                name: Self::NAME,
                clusters: Self::CLUSTERS,
            };
        }

        #(#device_types)*

        #device_type_table
    ))
}

/// Formats the generated device types as rust source.
pub fn format_device_types(tokens: TokenStream) -> Result<String, Error> {
    let file = syn::parse2::<syn::File>(tokens)?;

    Ok(prettyplease::unparse(&file))
}
