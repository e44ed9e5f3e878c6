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

//! Conversion of human-readable schema names into type names.

/// A word that keeps its own capitalization.
pub const WIFI: &str = "WiFi";

/// Converts a human readable schema name (like `On/Off Light`) into a name
/// suitable for a rust type.
///
/// Every space separated word is title-cased (except `WiFi`), then `-` and `/`
/// are removed and turned into word boundaries, while `.` is simply removed.
///
/// Examples:
///
/// ```
/// use rs_matter_device_types_gen::ident::normalize;
///
/// assert_eq!(normalize("On/Off Light"), "OnOffLight");
/// assert_eq!(normalize("Door-Lock"), "DoorLock");
/// assert_eq!(normalize("WiFi Network Diagnostics"), "WiFiNetworkDiagnostics");
/// assert_eq!(normalize("Wi.Fi"), "Wifi");
/// ```
pub fn normalize(name: &str) -> String {
    let words = name.split(' ').map(title_case).collect::<String>();

    let mut result = String::with_capacity(words.len());
    let mut next_upper = false;

    for c in words.chars() {
        match c {
            '-' | '/' => next_upper = true,
            '.' => (),
            c if next_upper => {
                result.extend(c.to_uppercase());
                next_upper = false;
            }
            c => result.push(c),
        }
    }

    result
}

/// Upper-cases the first character of `word` and lower-cases the rest,
/// unless the word is [`WIFI`].
fn title_case(word: &str) -> String {
    if word == WIFI {
        return word.to_string();
    }

    let mut c = word.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().chain(c.as_str().to_lowercase().chars()).collect(),
    }
}
