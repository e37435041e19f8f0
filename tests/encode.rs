use std::collections::BTreeMap;

use indoc::indoc;
use serde::Serialize;
use serde_zpl::ser::Error;

#[derive(Serialize)]
struct Context {
    iothreads: u32,
    verbose: bool,
}

#[derive(Serialize)]
struct Socket {
    bind: Vec<String>,
    connect: Option<String>,
}

#[derive(Serialize)]
struct Device {
    #[serde(rename = "type")]
    kind: &'static str,
    frontend: Socket,
}

#[derive(Serialize)]
struct Zdcf {
    context: Context,
    #[serde(rename = "*")]
    devices: BTreeMap<String, Device>,
}

#[test]
fn encodes_nested_document_with_squash() {
    let mut devices = BTreeMap::new();
    devices.insert(
        "main".to_string(),
        Device {
            kind: "zmq_queue",
            frontend: Socket {
                bind: vec!["tcp://eth0:5555".into(), "inproc://device".into()],
                connect: None,
            },
        },
    );
    let zdcf = Zdcf {
        context: Context {
            iothreads: 1,
            verbose: true,
        },
        devices,
    };

    assert_eq!(
        serde_zpl::to_string(&zdcf).unwrap(),
        indoc! {"
            context
                iothreads = 1
                verbose = 1
            main
                type = zmq_queue
                frontend
                    bind = tcp://eth0:5555
                    bind = inproc://device
        "}
    );
}

#[test]
fn scalars_render_canonically() {
    #[derive(Serialize)]
    struct Scalars {
        off: bool,
        neg: i64,
        ratio: f64,
        nan: f32,
        inf: f64,
        initial: char,
        empty: String,
        unit: (),
        missing: Option<u8>,
        present: Option<u8>,
    }

    let text = serde_zpl::to_string(&Scalars {
        off: false,
        neg: -42,
        ratio: 0.25,
        nan: f32::NAN,
        inf: f64::NEG_INFINITY,
        initial: 'x',
        empty: String::new(),
        unit: (),
        missing: None,
        present: Some(7),
    })
    .unwrap();
    assert_eq!(
        text,
        "off = 0\nneg = -42\nratio = 0.25\nnan = NaN\ninf = -Inf\ninitial = x\nempty = \"\"\npresent = 7\n"
    );
}

#[test]
fn sequences_of_structs_become_repeated_sections() {
    #[derive(Serialize)]
    struct Endpoint {
        port: u16,
    }
    #[derive(Serialize)]
    struct Root {
        endpoint: Vec<Endpoint>,
    }

    let text = serde_zpl::to_string(&Root {
        endpoint: vec![Endpoint { port: 1 }, Endpoint { port: 2 }],
    })
    .unwrap();
    assert_eq!(text, "endpoint\n    port = 1\nendpoint\n    port = 2\n");
}

#[test]
fn enums() {
    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Transport {
        Inproc,
        Tcp { port: u16 },
        Ipc(&'static str),
    }
    #[derive(Serialize)]
    struct Root {
        a: Transport,
        b: Transport,
        c: Transport,
    }

    let text = serde_zpl::to_string(&Root {
        a: Transport::Inproc,
        b: Transport::Tcp { port: 9 },
        c: Transport::Ipc("/tmp/s"),
    })
    .unwrap();
    assert_eq!(text, "a = inproc\nb\n    tcp\n        port = 9\nc\n    ipc = /tmp/s\n");
}

#[test]
fn root_must_be_struct_or_map() {
    assert!(matches!(serde_zpl::to_string(&5), Err(Error::InvalidRoot { .. })));
    assert!(matches!(serde_zpl::to_string(&vec![1, 2]), Err(Error::InvalidRoot { .. })));
    assert!(matches!(serde_zpl::to_string("text"), Err(Error::InvalidRoot { .. })));
    assert_eq!(serde_zpl::to_string(&None::<BTreeMap<String, u8>>).unwrap(), "");
}

#[test]
fn rejects_bad_keys_and_values() {
    let mut map = BTreeMap::new();
    map.insert("has space", 1);
    assert!(matches!(serde_zpl::to_string(&map), Err(Error::InvalidKey { .. })));

    let mut map = BTreeMap::new();
    map.insert("note", "two\nlines");
    let err = serde_zpl::to_string(&map).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == "note"), "{err:?}");

    let mut map = BTreeMap::new();
    map.insert(42u32, 1);
    assert_eq!(serde_zpl::to_string(&map).unwrap(), "42 = 1\n");
}

#[test]
fn io_writer() {
    let mut map = BTreeMap::new();
    map.insert("a", vec!["1", "2"]);
    let mut buf = Vec::new();
    serde_zpl::to_io_writer(&mut buf, &map).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "a = 1\na = 2\n");
}

#[test]
fn io_writer_errors_are_io() {
    struct Full;
    impl std::io::Write for Full {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut map = BTreeMap::new();
    map.insert("a", 1);
    assert!(matches!(serde_zpl::to_io_writer(&mut Full, &map), Err(Error::IO { .. })));
}

#[test]
fn map_entry_named_star_writes_at_parent_level() {
    let mut inner = BTreeMap::new();
    inner.insert("c0", "test");
    let mut map = BTreeMap::new();
    map.insert("*", inner);
    assert_eq!(serde_zpl::to_string(&map).unwrap(), "c0 = test\n");

    let mut device = BTreeMap::new();
    device.insert("type", "zmq_queue");
    let mut devices = BTreeMap::new();
    devices.insert("main", device);
    let mut nested = BTreeMap::new();
    nested.insert("*", devices);
    let mut root = BTreeMap::new();
    root.insert("zdcf", nested);
    assert_eq!(
        serde_zpl::to_string(&root).unwrap(),
        "zdcf\n    main\n        type = zmq_queue\n"
    );
}

#[test]
fn map_entry_named_star_needs_a_record() {
    let mut map = BTreeMap::new();
    map.insert("*", "c0");
    let err = serde_zpl::to_string(&map).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == "*"), "{err:?}");
}
