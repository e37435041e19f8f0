use std::collections::BTreeSet;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Flag {
    flag: bool,
}

#[test]
fn truthy_boolean_literals() {
    for case in ["1", "t", "T", "TRUE", "true", "True"] {
        let flag: Flag = serde_zpl::from_str(&format!("flag = {case}\n")).expect("expected boolean to parse");
        assert!(flag.flag, "literal `{case}` should parse as true");
    }
}

#[test]
fn falsey_boolean_literals() {
    for case in ["0", "f", "F", "FALSE", "false", "False"] {
        let flag: Flag = serde_zpl::from_str(&format!("flag = {case}\n")).expect("expected boolean to parse");
        assert!(!flag.flag, "literal `{case}` should parse as false");
    }
}

#[test]
fn invalid_boolean_literals_error() {
    for case in ["yes", "on", "2", "tRuE", "\" bool\""] {
        let err = serde_zpl::from_str::<Flag>(&format!("flag = {case}\n")).expect_err("expected parse error");
        assert!(matches!(err, serde_zpl::Error::Type { .. }), "{case}: {err:?}");
        assert!(err.to_string().contains("invalid bool"), "{err}");
        assert_eq!(err.location().map(|l| l.line()), Some(1));
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Numbers {
    small: i8,
    port: u16,
    big: u128,
    ratio: f64,
    half: f32,
    initial: char,
}

#[test]
fn numeric_and_char_slots() {
    let n: Numbers = serde_zpl::from_str(
        "small = -128\nport = 5555\nbig = 340282366920938463463374607431768211455\nratio = 2.5e-3\nhalf = 0.5\ninitial = z\n",
    )
    .unwrap();
    assert_eq!(
        n,
        Numbers {
            small: -128,
            port: 5555,
            big: u128::MAX,
            ratio: 0.0025,
            half: 0.5,
            initial: 'z',
        }
    );
}

#[test]
fn special_floats() {
    #[derive(Deserialize)]
    struct F {
        a: f64,
        b: f64,
        c: f32,
    }
    let f: F = serde_zpl::from_str("a = NaN\nb = +Inf\nc = -Inf\n").unwrap();
    assert!(f.a.is_nan());
    assert_eq!(f.b, f64::INFINITY);
    assert_eq!(f.c, f32::NEG_INFINITY);
}

#[test]
fn sequences_and_sets_collect_every_value() {
    #[derive(Deserialize)]
    struct Endpoints {
        bind: Vec<String>,
        port: BTreeSet<u16>,
        pair: (u8, u8),
    }
    let e: Endpoints = serde_zpl::from_str(
        "bind = tcp://eth0:5555\nport = 2\nbind = inproc://x\nport = 1\npair = 3\npair = 4\n",
    )
    .unwrap();
    assert_eq!(e.bind, ["tcp://eth0:5555", "inproc://x"]);
    assert_eq!(e.port.into_iter().collect::<Vec<_>>(), [1, 2]);
    assert_eq!(e.pair, (3, 4));
}

#[test]
fn single_value_fills_a_sequence() {
    #[derive(Deserialize)]
    struct One {
        bind: Vec<String>,
    }
    let one: One = serde_zpl::from_str("bind = a\n").unwrap();
    assert_eq!(one.bind, ["a"]);
}

#[test]
fn quoted_values() {
    #[derive(Deserialize)]
    struct Q {
        a: String,
        b: String,
        c: String,
    }
    let q: Q = serde_zpl::from_str("a = \"#2\"\nb = ' padded '  # note\nc = \"\"\n").unwrap();
    assert_eq!(q.a, "#2");
    assert_eq!(q.b, " padded ");
    assert_eq!(q.c, "");
}

#[test]
fn enums() {
    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Kind {
        Queue,
        Forwarder,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Transport {
        Tcp { port: u16 },
        Ipc(String),
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Device {
        #[serde(rename = "type")]
        kind: Kind,
        transport: Transport,
    }

    let tcp: Device = serde_zpl::from_str("type = queue\ntransport\n    tcp\n        port = 5555\n").unwrap();
    assert_eq!(
        tcp,
        Device {
            kind: Kind::Queue,
            transport: Transport::Tcp { port: 5555 }
        }
    );

    let ipc: Device = serde_zpl::from_str("type = forwarder\ntransport\n    ipc = /tmp/sock\n").unwrap();
    assert_eq!(ipc.kind, Kind::Forwarder);
    assert_eq!(ipc.transport, Transport::Ipc("/tmp/sock".into()));

    let err = serde_zpl::from_str::<Device>("type = streamer\ntransport\n    ipc = x\n").unwrap_err();
    assert_eq!(err.location().map(|l| l.line()), Some(1));
}

#[test]
fn unit_variant_section_must_be_empty() {
    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Transport {
        Inproc,
        Tcp { port: u16 },
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Socket {
        transport: Transport,
    }

    let socket: Socket = serde_zpl::from_str("transport\n    inproc\n").unwrap();
    assert_eq!(socket.transport, Transport::Inproc);

    for doc in ["transport\n    inproc = device\n", "transport\n    inproc\n        port = 1\n"] {
        let err = serde_zpl::from_str::<Socket>(doc).unwrap_err();
        assert!(matches!(err, serde_zpl::Error::Type { .. }), "{doc}: {err:?}");
        assert_eq!(err.location().map(|l| l.line()), Some(2), "{doc}");
    }
}

#[test]
fn newtypes_and_renames() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Port(u16);

    #[derive(Debug, Deserialize, PartialEq)]
    struct Wrapper {
        #[serde(rename = "io/threads")]
        io_threads: Port,
        #[serde(skip)]
        ignored: Option<u8>,
    }

    let w: Wrapper = serde_zpl::from_str("io/threads = 4\n").unwrap();
    assert_eq!(
        w,
        Wrapper {
            io_threads: Port(4),
            ignored: None
        }
    );
}
