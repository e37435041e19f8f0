#![no_main]

use libfuzzer_sys::fuzz_target;
use serde::Deserialize;
use serde_zpl::{DuplicateValuePolicy, Options};

#[derive(Debug, Deserialize)]
struct Inner {
    x: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DuplicateDoc {
    a: Option<i64>,
    key: Option<String>,
    inner: Option<Inner>,
}

// Repeated keys and reopened sections under every duplicate policy.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data);

    let top = format!("a = 1\na = 2\nkey = {s}\nkey = {s}\n");
    let nested = format!("inner\n    x = 1\ninner\n    x = {s}\n");

    for policy in [
        DuplicateValuePolicy::LastWins,
        DuplicateValuePolicy::FirstWins,
        DuplicateValuePolicy::Error,
    ] {
        let options = Options {
            duplicate_values: policy,
            ..Options::default()
        };
        for doc in [&top, &nested] {
            let _ = serde_zpl::from_str_with_options::<DuplicateDoc>(doc, options.clone());
        }
    }
});
