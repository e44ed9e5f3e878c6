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

//! A module for resolving the raw device type entries into the data
//! the device type definitions are generated from.

use std::collections::BTreeSet;

use log::{debug, trace};

use crate::ident::normalize;
use crate::schema::{RawClusterRef, RawDeviceEntry};

/// A device type, fully resolved and ready for code generation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationRecord {
    /// The name of the generated type
    pub identifier: String,
    /// The device type id, as found in the schema
    pub device_id: u32,
    /// The original (human readable) name of the device type
    pub doc_summary: String,
    /// The names of the clusters the device type implements
    pub cluster_identifiers: BTreeSet<String>,
}

/// Whether a cluster reference is part of the clusters of its device type.
///
/// That is the case for clusters the device has in its server role, as well
/// as for clusters whose server role is not locked, i.e. which devices may
/// optionally implement.
pub fn is_included(cluster: &RawClusterRef) -> bool {
    cluster.is_server || !cluster.is_server_locked
}

/// Resolves the raw device type entries into generation records,
/// one per entry and in the same order.
pub fn build<'a, I>(entries: I) -> Vec<GenerationRecord>
where
    I: IntoIterator<Item = &'a RawDeviceEntry>,
{
    entries.into_iter().map(record).collect()
}

fn record(entry: &RawDeviceEntry) -> GenerationRecord {
    debug!("{} ({:#06x})", entry.type_name, entry.device_id);

    // Clusters listed twice collapse into one
    let cluster_identifiers = entry
        .clusters
        .iter()
        .filter(|cluster| {
            let included = is_included(cluster);
            trace!(
                "  {} (server: {}, server locked: {}) included: {included}",
                cluster.cluster_name,
                cluster.is_server,
                cluster.is_server_locked
            );
            included
        })
        .map(|cluster| normalize(&cluster.cluster_name))
        .collect();

    GenerationRecord {
        identifier: normalize(&entry.type_name),
        device_id: entry.device_id,
        doc_summary: entry.type_name.clone(),
        cluster_identifiers,
    }
}
