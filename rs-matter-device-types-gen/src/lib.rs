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

//! Generation of the rust definitions of all Matter device types out of the
//! `matter-devices.xml` data model file of the connectedhomeip repository.
//!
//! The pipeline is:
//! - [`schema::parse_device_types`] reads the `<deviceType>` entries of the XML;
//! - [`model::build`] resolves each entry into a [`model::GenerationRecord`]
//!   (type name, device type ID, clusters);
//! - [`generate::device_types_generate`] and [`generate::format_device_types`]
//!   turn the records into formatted rust source.
//!
//! [`generate_device_types`] runs all of it.

use miette::Diagnostic;
use thiserror::Error;

pub mod generate;
pub mod ident;
pub mod model;
pub mod schema;

pub use generate::{device_types_generate, format_device_types, DeviceTypesGenerateContext};
pub use ident::normalize;
pub use model::{build, GenerationRecord};
pub use schema::{parse_device_types, RawClusterRef, RawDeviceEntry};

/// The location of the device types file within the connectedhomeip repository
pub const DEVICE_TYPES_XML_PATH: &str =
    "src/app/zap-templates/zcl/data-model/chip/matter-devices.xml";

/// Where the latest device types file can be downloaded from
pub const DEVICE_TYPES_XML_URL: &str = "https://raw.githubusercontent.com/project-chip/connectedhomeip/master/src/app/zap-templates/zcl/data-model/chip/matter-devices.xml";

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("Failed to parse XML: {0}")]
    #[diagnostic(code("matter::device_types::xml"))]
    Xml(#[from] roxmltree::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] schema::SchemaError),

    #[error("`{identifier}` ({what}) is not a valid rust type name")]
    #[diagnostic(
        code("matter::device_types::identifier"),
        help("Names may only contain letters, digits, spaces and the `-`, `/` and `.` separators")
    )]
    InvalidIdentifier { identifier: String, what: String },

    #[error("Generated code does not parse: {0}")]
    #[diagnostic(code("matter::device_types::syntax"))]
    Syntax(#[from] syn::Error),
}

/// Generates the formatted rust source with all device types
/// defined in the provided `matter-devices.xml` content.
///
/// Nothing is generated if any of the device types is malformed.
pub fn generate_device_types(
    xml: &str,
    context: &DeviceTypesGenerateContext,
) -> Result<String, Error> {
    let entries = parse_device_types(xml)?;
    let records = build(&entries);

    format_device_types(device_types_generate(&records, context)?)
}
