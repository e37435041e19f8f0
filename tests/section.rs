use indoc::indoc;
use serde_zpl::{Error, Node, Section};

const DOC: &str = indoc! {"
    context
        iothreads = 1
        verbose = 1
    main
        type = zmq_queue
        frontend
            bind = tcp://eth0:5555
            bind = inproc://device
"};

#[test]
fn repeated_keys_accumulate_in_order() {
    let section: Section = "a = 1\na = 2\n".parse().unwrap();
    assert_eq!(section.values("a").unwrap(), ["1", "2"]);
}

#[test]
fn navigation_and_getters() {
    let root: Section = DOC.parse().unwrap();
    let keys: Vec<&str> = root.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["context", "main"]);

    let context = root.section("context").unwrap();
    assert_eq!(context.get::<u32>("iothreads").unwrap(), 1);
    assert!(context.get_bool("verbose").unwrap());
    assert_eq!(context.location().line(), 1);

    let frontend = root.section("main").unwrap().section("frontend").unwrap();
    assert!(matches!(
        frontend.get_str("bind"),
        Err(Error::MultipleValues { count: 2, location, .. }) if location.line() == 8
    ));
    assert!(matches!(frontend.get_str("connect"), Err(Error::NotFound { .. })));
    assert_eq!(frontend.values("bind").unwrap().len(), 2);

    match root.section("main").unwrap().node("type") {
        Some(Node::Property(p)) => {
            assert_eq!(p.first(), Some("zmq_queue"));
            assert_eq!(p.location().line(), 5);
        }
        other => panic!("expected a property, got {other:?}"),
    }
}

#[test]
fn extend_merges_documents() {
    let mut root: Section = DOC.parse().unwrap();
    root.extend_from_str("main\n    backend\n        bind = tcp://eth0:5556\n").unwrap();
    root.extend_from_reader("context\n    iothreads = 4\n".as_bytes()).unwrap();

    let main = root.section("main").unwrap();
    assert_eq!(main.get_str("type").unwrap(), "zmq_queue");
    assert_eq!(main.section("backend").unwrap().get_str("bind").unwrap(), "tcp://eth0:5556");
    assert_eq!(root.section("context").unwrap().values("iothreads").unwrap(), ["1", "4"]);
}

#[test]
fn display_round_trips() {
    let root: Section = DOC.parse().unwrap();
    let text = root.to_string();
    assert_eq!(text, DOC);
    assert_eq!(text.parse::<Section>().unwrap(), root);
}

#[test]
fn built_by_hand_and_projected() {
    #[derive(serde::Deserialize)]
    struct Frontend<'a> {
        #[serde(borrow)]
        bind: Vec<&'a str>,
    }

    let mut root = Section::new();
    let frontend = root.section_mut("frontend").unwrap();
    frontend.push_value("bind", "a").unwrap();
    frontend.push_value("bind", "b").unwrap();

    let decoded: std::collections::HashMap<String, Frontend> = serde_zpl::from_section(&root).unwrap();
    assert_eq!(decoded["frontend"].bind, ["a", "b"]);
}

#[test]
fn json_interop() {
    let root: Section = DOC.parse().unwrap();
    let json = serde_json::to_value(&root).unwrap();
    assert_eq!(json["main"]["frontend"]["bind"], serde_json::json!(["tcp://eth0:5555", "inproc://device"]));

    let back: Section = serde_json::from_value(json).unwrap();
    assert_eq!(back, root);
}

#[test]
fn rejects_entries_it_cannot_write() {
    let mut root = Section::new();
    assert!(matches!(root.push_value("has space", "1"), Err(Error::InvalidEntry { .. })));
    assert!(matches!(root.push_value("*", "1"), Err(Error::InvalidEntry { .. })));
    assert!(matches!(root.push_value("a", "x\ny"), Err(Error::InvalidEntry { .. })));
    assert!(matches!(root.push_value("a", "x\ry"), Err(Error::InvalidEntry { .. })));
    assert!(matches!(root.section_mut("/lead"), Err(Error::InvalidEntry { .. })));
    assert!(matches!(root.section_mut(""), Err(Error::InvalidEntry { .. })));
    assert!(root.is_empty());

    root.push_value("a", "").unwrap();
    root.section_mut("io/threads").unwrap().push_value("n", "4").unwrap();
    assert_eq!(root.to_string(), "a = \"\"\nio/threads\n    n = 4\n");
}

#[test]
fn deserialize_rejects_entries_it_cannot_write() {
    for json in [
        r#"{"has space": "1"}"#,
        r#"{"a": "x\ny"}"#,
        r#"{"s": {"b": ["1", "two\nlines"]}}"#,
        r#"{"s": {"*": {"c0": "test"}}}"#,
    ] {
        assert!(serde_json::from_str::<Section>(json).is_err(), "{json}");
    }
}
