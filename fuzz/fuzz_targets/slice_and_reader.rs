#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use serde::Deserialize;
use serde_zpl::Section;

#[derive(Debug, Deserialize)]
struct Socket {
    #[serde(default)]
    bind: Vec<String>,
    #[serde(default)]
    connect: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Device {
    #[serde(rename = "type")]
    kind: Option<String>,
    frontend: Option<Socket>,
    backend: Option<Socket>,
}

#[derive(Debug, Deserialize)]
struct Doc {
    context: Option<BTreeMap<String, String>>,
    #[serde(rename = "*")]
    devices: BTreeMap<String, Device>,
}

// Raw input through every decode entry point, and whatever decodes into a
// Section back through the encoder.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }

    let _ = serde_zpl::from_slice::<Doc>(data);
    let _ = serde_zpl::from_reader::<_, Doc>(data);

    if let Ok(section) = serde_zpl::from_slice::<Section>(data) {
        if let Ok(text) = serde_zpl::to_string(&section) {
            let _ = text.parse::<Section>();
        }
    }
});
