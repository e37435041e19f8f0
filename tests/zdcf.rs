use std::collections::BTreeMap;

use indoc::indoc;
use serde::Deserialize;

const ZDCF: &str = indoc! {r##"
    # Notice that indentation is always 4 spaces, there are no tabs.
    #
    context
        iothreads = 1
        verbose = 1      #   Ask for a trace
    main
        type = zmq_queue
        frontend
            option
                hwm = 1000
                swap = 25000000
                subscribe = "#2"
            bind = tcp://eth0:5555
        backend
            bind = tcp://eth0:5556
"##};

#[derive(Debug, Deserialize, PartialEq)]
struct Context {
    iothreads: u32,
    verbose: bool,
}

#[derive(Debug, Deserialize, PartialEq)]
struct SocketOption {
    hwm: u64,
    swap: u64,
    #[serde(default)]
    subscribe: Vec<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Socket {
    option: Option<SocketOption>,
    #[serde(default)]
    bind: Vec<String>,
    #[serde(default)]
    connect: Vec<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Device {
    #[serde(rename = "type")]
    kind: String,
    frontend: Socket,
    backend: Socket,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Zdcf {
    context: Option<Box<Context>>,
    #[serde(rename = "*")]
    devices: BTreeMap<String, Device>,
}

#[test]
fn typed_document_with_squash_field() {
    let zdcf: Zdcf = serde_zpl::from_str(ZDCF).expect("ZDCF document should decode");

    assert_eq!(
        zdcf.context.as_deref(),
        Some(&Context {
            iothreads: 1,
            verbose: true
        })
    );
    assert_eq!(zdcf.devices.len(), 1);

    let main = &zdcf.devices["main"];
    assert_eq!(main.kind, "zmq_queue");
    assert_eq!(
        main.frontend.option,
        Some(SocketOption {
            hwm: 1000,
            swap: 25000000,
            subscribe: vec!["#2".to_string()],
        })
    );
    assert_eq!(main.frontend.bind, ["tcp://eth0:5555"]);
    assert!(main.frontend.connect.is_empty());
    assert_eq!(main.backend.option, None);
    assert_eq!(main.backend.bind, ["tcp://eth0:5556"]);
}

#[test]
fn squash_field_receives_properties_too() {
    #[derive(Debug, Deserialize)]
    struct Loose {
        name: String,
        #[serde(rename = "*")]
        rest: BTreeMap<String, serde_json::Value>,
    }

    let loose: Loose = serde_zpl::from_str("name = x\nextra = 1\ngroup\n    k = v\n").unwrap();
    assert_eq!(loose.name, "x");
    assert_eq!(loose.rest["extra"], serde_json::json!(["1"]));
    assert_eq!(loose.rest["group"], serde_json::json!({"k": ["v"]}));
}

#[test]
fn squash_field_is_present_even_when_nothing_is_left_over() {
    let zdcf: Zdcf = serde_zpl::from_str("context\n    iothreads = 2\n    verbose = 0\n").unwrap();
    assert!(zdcf.devices.is_empty());
    assert!(!zdcf.context.unwrap().verbose);
}

#[test]
fn dynamic_json_value() {
    let value: serde_json::Value = serde_zpl::from_str(ZDCF).unwrap();
    assert_eq!(value["context"]["iothreads"], serde_json::json!(["1"]));
    assert_eq!(
        value["main"]["frontend"]["option"]["subscribe"],
        serde_json::json!(["#2"])
    );
    assert_eq!(value["main"]["type"], serde_json::json!(["zmq_queue"]));
}

#[test]
fn string_keyed_maps() {
    let flat: BTreeMap<String, String> = serde_zpl::from_str("a = 1\nb = two\na = 3\n").unwrap();
    assert_eq!(flat["a"], "3");
    assert_eq!(flat["b"], "two");

    let multi: BTreeMap<String, Vec<String>> = serde_zpl::from_str("a = 1\nb = two\na = 3\n").unwrap();
    assert_eq!(multi["a"], ["1", "3"]);

    let nested: BTreeMap<String, BTreeMap<String, u16>> =
        serde_zpl::from_str("frontend\n    port = 5555\nbackend\n    port = 5556\n").unwrap();
    assert_eq!(nested["backend"]["port"], 5556);
}

#[test]
fn repeated_sections_merge() {
    let zdcf: Zdcf = serde_zpl::from_str(indoc! {"
        main
            type = zmq_queue
            frontend
                bind = a
            backend
                bind = b
        main
            frontend
                bind = c
    "})
    .unwrap();
    assert_eq!(zdcf.devices["main"].frontend.bind, ["a", "c"]);
}
