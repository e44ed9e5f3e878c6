/*
 *
 *    Copyright (c) 2020-2022 Project CHIP Authors
 *
 *    Licensed under the Apache License, Version 2.0 (the "License");
 *    you may not use this file except in compliance with the License.
 *    You may obtain a copy of the License at
 *
 *        http://www.apache.org/licenses/LICENSE-2.0
 *
 *    Unless required by applicable law or agreed to in writing, software
 *    distributed under the License is distributed on an "AS IS" BASIS,
 *    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *    See the License for the specific language governing permissions and
 *    limitations under the License.
 */

//! A module for (re)generating the Matter device type definitions

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use log::{debug, info};

use rs_matter_device_types_gen::{generate_device_types, DeviceTypesGenerateContext};

/// Where the device type definitions are generated, relative to the workspace
pub const DEFAULT_OUTPUT: &str = "generated/device_types.rs";

/// Generation of the device type definitions file
pub struct DeviceTypes {
    workspace_dir: PathBuf,
}

impl DeviceTypes {
    /// Create a new `DeviceTypes` instance
    ///
    /// # Arguments
    /// - `workspace_dir`: The directory relative to which the output is written
    pub fn new(workspace_dir: PathBuf) -> Self {
        Self { workspace_dir }
    }

    /// Download `matter-devices.xml` from `url`
    pub fn download(&self, url: &str) -> anyhow::Result<String> {
        info!("Downloading {url}...");

        ureq::get(url)
            .call()
            .with_context(|| format!("Failed to download {url}"))?
            .into_string()
            .with_context(|| format!("Failed to read the response of {url}"))
    }

    /// Read a local `matter-devices.xml` file
    pub fn read(&self, input: &Path) -> anyhow::Result<String> {
        info!("Reading {}...", input.display());

        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
    }

    /// Generate the device type definitions and write them to `output`
    ///
    /// The output file is only touched once the complete file is generated.
    pub fn generate(&self, xml: &str, output: &Path) -> anyhow::Result<()> {
        let generated = self.render(xml)?;
        let output = self.workspace_dir.join(output);

        if let Some(dir) = output.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        fs::write(&output, generated)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        info!("Device types written to {}", output.display());

        Ok(())
    }

    /// Check that `output` contains exactly what would be generated
    pub fn check(&self, xml: &str, output: &Path) -> anyhow::Result<()> {
        let generated = self.render(xml)?;
        let output = self.workspace_dir.join(output);

        let existing = fs::read_to_string(&output).ok();
        if existing.as_deref() != Some(generated.as_str()) {
            anyhow::bail!(
                "{} is not up to date, run `cargo xtask gen-device-types`",
                output.display()
            );
        }

        info!("{} is up to date", output.display());

        Ok(())
    }

    fn render(&self, xml: &str) -> anyhow::Result<String> {
        debug!("Generating device types from {} bytes of XML", xml.len());

        generate_device_types(xml, &DeviceTypesGenerateContext::default())
            .map_err(|e| anyhow::anyhow!("{:?}", miette::Report::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"
        <configurator>
          <deviceType>
            <typeName>On/Off Light</typeName>
            <deviceId>0x0100</deviceId>
            <clusters>
              <include cluster="On/Off" server="true" serverLocked="true"/>
              <include cluster="Identify" server="false" serverLocked="false"/>
              <include cluster="Scenes" server="false" serverLocked="true"/>
            </clusters>
          </deviceType>
        </configurator>"#;

    #[test]
    fn generate_then_check() {
        let dir = tempfile::tempdir().expect("temp dir");
        let device_types = DeviceTypes::new(dir.path().to_path_buf());
        let output = Path::new(DEFAULT_OUTPUT);

        assert!(device_types.check(XML, output).is_err());

        device_types.generate(XML, output).expect("generated");
        let generated = fs::read_to_string(dir.path().join(output)).expect("written");
        assert!(generated.contains("pub struct OnOffLight;"));

        device_types.check(XML, output).expect("up to date");

        fs::write(dir.path().join(output), "// stale").expect("overwritten");
        assert!(device_types.check(XML, output).is_err());
    }

    #[test]
    fn malformed_schema_writes_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let device_types = DeviceTypes::new(dir.path().to_path_buf());
        let output = Path::new(DEFAULT_OUTPUT);

        let xml = XML.replace("<deviceId>0x0100</deviceId>", "");

        assert!(device_types.generate(&xml, output).is_err());
        assert!(!dir.path().join(output).exists());
    }

    #[test]
    fn read_local_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("matter-devices.xml");
        fs::write(&input, XML).expect("written");

        let device_types = DeviceTypes::new(dir.path().to_path_buf());

        assert_eq!(device_types.read(&input).expect("read"), XML);
        assert!(device_types.read(&dir.path().join("missing.xml")).is_err());
    }
}
