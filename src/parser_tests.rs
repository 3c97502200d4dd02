use crate::{Error, ErrorKind, Pos, Table};

fn parse_ok(input: &str) -> Table {
    crate::parse(input).unwrap_or_else(|e| panic!("parse failed for {input:?}: {e}"))
}

fn parse_err(input: &str) -> Error {
    crate::parse(input).unwrap_err()
}

#[test]
fn basic_scalar_values() {
    // empty document
    let v = parse_ok("");
    assert!(v.is_empty());

    // string
    let v = parse_ok("a = \"hello\"");
    assert_eq!(v["a"].as_str(), Some("hello"));

    // integer
    let v = parse_ok("a = 42");
    assert_eq!(v["a"].as_i64(), Some(42));

    // negative integer
    let v = parse_ok("a = -100");
    assert_eq!(v["a"].as_i64(), Some(-100));

    // float
    let v = parse_ok("a = 3.14");
    let f = v["a"].as_f64().unwrap();
    assert!((f - 3.14).abs() < f64::EPSILON);

    // booleans
    let v = parse_ok("a = true");
    assert_eq!(v["a"].as_bool(), Some(true));
    let v = parse_ok("a = false");
    assert_eq!(v["a"].as_bool(), Some(false));

    // multiple keys keep their order
    let v = parse_ok("b = 1\na = 2\nc = 3");
    assert_eq!(v.keys().map(String::as_str).collect::<Vec<_>>(), ["b", "a", "c"]);

    // whitespace around `=` is free-form
    let v = parse_ok("a=1\nb    =\t2");
    assert_eq!(v["a"].as_i64(), Some(1));
    assert_eq!(v["b"].as_i64(), Some(2));

    // a final newline is optional
    let v = parse_ok("a = 1\n");
    assert_eq!(v.len(), 1);
}

#[test]
fn string_escapes() {
    let cases = [
        (r#"a = "tab\there""#, "tab\there"),
        (r#"a = "newline\nhere""#, "newline\nhere"),
        (r#"a = "quote\"here""#, "quote\"here"),
        (r#"a = "backslash\\here""#, "backslash\\here"),
        (r#"a = "cr\rhere""#, "cr\rhere"),
        (r#"a = "bs\bhere""#, "bs\u{8}here"),
        (r#"a = "ff\fhere""#, "ff\u{c}here"),
        (r#"a = "caf\u00e9""#, "caf\u{e9}"),
        (r#"a = "emoji\U0001F600""#, "emoji\u{1F600}"),
        (r#"a = "\u0041\u0042""#, "AB"),
    ];
    for (input, expected) in cases {
        let v = parse_ok(input);
        assert_eq!(v["a"].as_str(), Some(expected), "input: {input}");
    }

    // unknown escapes, truncated escapes and surrogate halves are rejected
    let e = parse_err(r#"a = "bad\q""#);
    assert!(matches!(e.kind, ErrorKind::InvalidEscapeCodes(code) if code == "\\q"));
    let e = parse_err(r#"a = "short\u00""#);
    assert!(matches!(e.kind, ErrorKind::InvalidEscapeCodes(code) if code == "\\u"));
    let e = parse_err(r#"a = "half\uD800""#);
    assert_eq!(e.to_string(), "Invalid escape codes \\uD800 in TOML at row 1, col 10");
}

#[test]
fn string_types() {
    // literal strings keep backslashes
    let v = parse_ok(r"a = 'C:\Users\nobody'");
    assert_eq!(v["a"].as_str(), Some(r"C:\Users\nobody"));

    // empty strings
    let v = parse_ok("a = \"\"\nb = ''");
    assert_eq!(v["a"].as_str(), Some(""));
    assert_eq!(v["b"].as_str(), Some(""));

    // multi-line basic, the newline after the opener is trimmed
    let v = parse_ok("a = \"\"\"\nhello\nworld\"\"\"");
    assert_eq!(v["a"].as_str(), Some("hello\nworld"));

    // multi-line literal
    let v = parse_ok("a = '''\nline one\nline two'''");
    assert_eq!(v["a"].as_str(), Some("line one\nline two"));

    // quotes hugging the delimiters fold into the content
    let v = parse_ok("a = ''''that's it''''");
    assert_eq!(v["a"].as_str(), Some("'that's it'"));
    let v = parse_ok(r#"a = """""hello""""#);
    assert_eq!(v["a"].as_str(), Some("\"\"hello"));

    // escapes still resolve in multi-line basic strings
    let v = parse_ok("a = \"\"\"tab\\tend\"\"\"");
    assert_eq!(v["a"].as_str(), Some("tab\tend"));

    // a trailing backslash swallows the newline and following whitespace
    let v = parse_ok("a = \"\"\"foo \\\n     bar\"\"\"");
    assert_eq!(v["a"].as_str(), Some("foo bar"));
    let v = parse_ok("a = \"\"\"start\\\n\n\n  end\"\"\"");
    assert_eq!(v["a"].as_str(), Some("startend"));

    // whitespace between the backslash and the line end joins all the same
    let v = parse_ok("a = \"\"\"foo \\  \n  bar\"\"\"");
    assert_eq!(v["a"].as_str(), Some("foo bar"));
    let v = parse_ok("a = \"\"\"foo \\\t\n  bar\"\"\"");
    assert_eq!(v["a"].as_str(), Some("foo bar"));
    let v = parse_ok("a = \"\"\"foo \\ \r\n  bar\"\"\"");
    assert_eq!(v["a"].as_str(), Some("foo bar"));

    // a backslash-space with content after it is still a bad escape
    let e = parse_err("a = \"\"\"foo \\ bar\"\"\"");
    assert_eq!(
        e.to_string(),
        r"Invalid escape codes \  in TOML at row 1, col 12"
    );

    // the document continues on the line a multi-line value ended on
    let v = parse_ok("a = '''\nx''' # tail\nb = 2");
    assert_eq!(v["a"].as_str(), Some("x"));
    assert_eq!(v["b"].as_i64(), Some(2));

    // unterminated strings point at the value
    let e = parse_err("a = 'oops");
    assert!(matches!(e.kind, ErrorKind::Syntax));
    assert_eq!(e.pos, Some(Pos { line: 1, col: 5 }));
    let e = parse_err("a = \"oops");
    assert!(matches!(e.kind, ErrorKind::Syntax));
    let e = parse_err("a = '''oops");
    assert!(matches!(e.kind, ErrorKind::Syntax));
}

#[test]
fn number_formats() {
    let cases = [
        ("a = 0", 0),
        ("a = +99", 99),
        ("a = -17", -17),
        ("a = 1_000_000", 1_000_000),
        ("a = 0xDEADBEEF", 0xDEADBEEF),
        ("a = 0xdead_beef", 0xdead_beef),
        ("a = 0o755", 0o755),
        ("a = 0b1101_0101", 0b1101_0101),
        ("a = 9223372036854775807", i64::MAX),
        ("a = -9223372036854775808", i64::MIN),
    ];
    for (input, expected) in cases {
        let v = parse_ok(input);
        assert_eq!(v["a"].as_i64(), Some(expected), "input: {input}");
    }

    // one past i64 flips to a big integer, in any radix
    let v = parse_ok("a = 9223372036854775808");
    assert!(v["a"].as_i64().is_none());
    assert_eq!(v["a"].as_bigint().unwrap().to_string(), "9223372036854775808");
    let v = parse_ok("a = 0xFFFF_FFFF_FFFF_FFFF");
    assert_eq!(v["a"].as_bigint().unwrap().to_string(), "18446744073709551615");
    let v = parse_ok("a = -170141183460469231731687303715884105728");
    assert_eq!(
        v["a"].as_bigint().unwrap().to_string(),
        "-170141183460469231731687303715884105728"
    );

    let floats = [
        ("a = 1.0", 1.0),
        ("a = 3.1415", 3.1415),
        ("a = -0.01", -0.01),
        ("a = 5e+22", 5e22),
        ("a = 1e06", 1e6),
        ("a = -2E-2", -2e-2),
        ("a = 6.626e-34", 6.626e-34),
        ("a = 224_617.445_991_228", 224_617.445_991_228),
        ("a = inf", f64::INFINITY),
        ("a = +inf", f64::INFINITY),
        ("a = -inf", f64::NEG_INFINITY),
    ];
    for (input, expected) in floats {
        let v = parse_ok(input);
        assert_eq!(v["a"].as_f64(), Some(expected), "input: {input}");
    }
    let v = parse_ok("a = nan");
    assert!(v["a"].as_f64().unwrap().is_nan());
    let v = parse_ok("a = -nan");
    assert!(v["a"].as_f64().unwrap().is_nan());

    // malformed numbers fail the whole value, not just a suffix
    for input in [
        "a = 00",
        "a = 01.5",
        "a = 1__2",
        "a = _1",
        "a = 1_",
        "a = 1.",
        "a = .5",
        "a = 1.2.3",
        "a = -0x10",
        "a = 0x",
        "a = 0xG",
    ] {
        let e = parse_err(input);
        assert!(matches!(e.kind, ErrorKind::Syntax), "input: {input}");
    }
}

#[test]
fn datetimes() {
    use crate::DatetimeKind;

    let cases = [
        ("a = 1979-05-27T07:32:00Z", DatetimeKind::OffsetDatetime),
        ("a = 1979-05-27T00:32:00-07:00", DatetimeKind::OffsetDatetime),
        ("a = 1979-05-27T00:32:00.999999+05:30", DatetimeKind::OffsetDatetime),
        ("a = 1979-05-27t07:32:00z", DatetimeKind::OffsetDatetime),
        ("a = 1979-05-27 07:32:00", DatetimeKind::LocalDatetime),
        ("a = 1979-05-27T07:32:00", DatetimeKind::LocalDatetime),
        ("a = 1979-05-27", DatetimeKind::LocalDate),
        ("a = 07:32:00", DatetimeKind::LocalTime),
        ("a = 00:32:00.123456", DatetimeKind::LocalTime),
    ];
    for (input, kind) in cases {
        let v = parse_ok(input);
        assert_eq!(v["a"].as_datetime().unwrap().kind(), kind, "input: {input}");
    }

    // offsets are kept, not normalized to UTC
    let v = parse_ok("a = 1979-05-27T00:32:00-07:00");
    let dt = v["a"].as_datetime().unwrap();
    assert_eq!(dt.to_string(), "1979-05-27T00:32:00-07:00");
    assert_eq!(dt.offset_minutes(), Some(-420));

    // lowercase separators render back in canonical form
    let v = parse_ok("a = 1979-05-27t07:32:00z");
    assert_eq!(v["a"].as_datetime().unwrap().to_string(), "1979-05-27T07:32:00Z");

    // fractions carry at most nanosecond precision
    let v = parse_ok("a = 00:00:00.123456789999");
    assert_eq!(v["a"].as_datetime().unwrap().to_string(), "00:00:00.123456789");

    // leap second
    let v = parse_ok("a = 1990-12-31T23:59:60Z");
    assert_eq!(v["a"].as_datetime().unwrap().to_string(), "1990-12-31T23:59:60Z");

    // impossible dates and times report the full lexeme
    let e = parse_err("a = 2024-02-30");
    assert_eq!(e.to_string(), "Invalid datetime 2024-02-30 in TOML at row 1, col 5");
    let e = parse_err("a = 2024-13-01");
    assert!(matches!(e.kind, ErrorKind::InvalidValue(..)));
    let e = parse_err("a = 24:00:00");
    assert!(matches!(e.kind, ErrorKind::InvalidValue(..)));
    let e = parse_err("a = 1977-06-01T24:00:00");
    assert_eq!(
        e.to_string(),
        "Invalid datetime 1977-06-01T24:00:00 in TOML at row 1, col 5"
    );
    let e = parse_err("a = 07:61:00");
    assert!(matches!(e.kind, ErrorKind::InvalidValue(..)));
}

#[test]
fn arrays() {
    let v = parse_ok("a = [1, 2, 3]");
    let arr = v["a"].as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[2].as_i64(), Some(3));

    // mixed element types
    let v = parse_ok(r#"a = [1, "two", 3.0, true, 1979-05-27]"#);
    let arr = v["a"].as_array().unwrap();
    assert_eq!(arr[1].as_str(), Some("two"));
    assert_eq!(arr[3].as_bool(), Some(true));

    // nested
    let v = parse_ok("a = [[1, 2], [3], []]");
    let arr = v["a"].as_array().unwrap();
    assert_eq!(arr[0].as_array().unwrap().len(), 2);
    assert_eq!(arr[2].as_array().unwrap().len(), 0);

    // multi-line, trailing comma, comments between elements
    let v = parse_ok("a = [ # start\n  1, # one\n  2,\n]");
    assert_eq!(v["a"].as_array().unwrap().len(), 2);

    // whitespace-only lines inside an array are skipped
    let v = parse_ok("a = [1,\n\t\n  2]");
    assert_eq!(v["a"].as_array().unwrap().len(), 2);

    let v = parse_ok("a = []");
    assert_eq!(v["a"].as_array().unwrap().len(), 0);

    // the document continues on the closing line
    let v = parse_ok("a = [\n  1,\n] # done\nb = 2");
    assert_eq!(v["b"].as_i64(), Some(2));

    // EOF inside an array
    let e = parse_err("a = [1,");
    assert!(matches!(e.kind, ErrorKind::Syntax));
    assert_eq!(e.pos, Some(Pos { line: 1, col: 8 }));

    // missing separator
    let e = parse_err("a = [1 2]");
    assert!(matches!(e.kind, ErrorKind::Syntax));
    assert_eq!(e.pos, Some(Pos { line: 1, col: 8 }));
}

#[test]
fn inline_tables() {
    let v = parse_ok("point = { x = 1, y = 2 }");
    assert_eq!(v["point"]["x"].as_i64(), Some(1));
    assert_eq!(v["point"]["y"].as_i64(), Some(2));

    let v = parse_ok("empty = {}");
    assert!(v["empty"].as_table().unwrap().is_empty());

    // nested structures
    let v = parse_ok(r#"a = { b = { c = [1, 2] }, d = "x" }"#);
    assert_eq!(v["a"]["b"]["c"][1].as_i64(), Some(2));
    assert_eq!(v["a"]["d"].as_str(), Some("x"));

    // dotted keys inside the braces
    let v = parse_ok("a = { b.c = 1 }");
    assert_eq!(v["a"]["b"]["c"].as_i64(), Some(1));

    // a comma before the first pair is tolerated
    let v = parse_ok("a = { , x = 1 }");
    assert_eq!(v["a"]["x"].as_i64(), Some(1));

    // a trailing one is not
    let e = parse_err("a = { x = 1, }");
    assert!(matches!(e.kind, ErrorKind::Syntax));
    let e = parse_err("a = { , }");
    assert!(matches!(e.kind, ErrorKind::Syntax));

    // no newlines inside inline tables
    let e = parse_err("a = { x = 1,\n  y = 2 }");
    assert!(matches!(e.kind, ErrorKind::Syntax));
    assert_eq!(e.pos, Some(Pos { line: 1, col: 13 }));

    // duplicates are caught inside the braces
    let e = parse_err("a = { x = 1, x = 2 }");
    assert_eq!(e.to_string(), "The key x is duplicated in global at row 1, col 14");
}

#[test]
fn table_headers_and_structure() {
    let v = parse_ok("[server]\nhost = 'a'\nport = 80");
    assert_eq!(v["server"]["host"].as_str(), Some("a"));
    assert_eq!(v["server"]["port"].as_i64(), Some(80));

    // dotted headers create intermediate tables
    let v = parse_ok("[a.b.c]\nx = 1");
    assert_eq!(v["a"]["b"]["c"]["x"].as_i64(), Some(1));

    // a parent can be defined after its child
    let v = parse_ok("[a.b]\nx = 1\n[a]\ny = 2");
    assert_eq!(v["a"]["b"]["x"].as_i64(), Some(1));
    assert_eq!(v["a"]["y"].as_i64(), Some(2));

    // sibling headers share the implicit parent
    let v = parse_ok("[a.b]\nx = 1\n[a.c]\ny = 2");
    assert_eq!(v["a"]["b"]["x"].as_i64(), Some(1));
    assert_eq!(v["a"]["c"]["y"].as_i64(), Some(2));

    // dotted keys below a header land in that table
    let v = parse_ok("[a]\nb.c = 1\nb.d = 2");
    assert_eq!(v["a"]["b"]["c"].as_i64(), Some(1));
    assert_eq!(v["a"]["b"]["d"].as_i64(), Some(2));

    // whitespace inside and around headers
    let v = parse_ok("  [ a . b ]  \nx = 1");
    assert_eq!(v["a"]["b"]["x"].as_i64(), Some(1));

    // keys before any header are global
    let v = parse_ok("top = 1\n[t]\nunder = 2");
    assert_eq!(v["top"].as_i64(), Some(1));
    assert_eq!(v["t"]["under"].as_i64(), Some(2));
}

#[test]
fn array_of_tables() {
    let v = parse_ok("[[fruits]]\nname = 'apple'\n[[fruits]]\nname = 'banana'");
    let fruits = v["fruits"].as_array().unwrap();
    assert_eq!(fruits.len(), 2);
    assert_eq!(fruits[0]["name"].as_str(), Some("apple"));
    assert_eq!(fruits[1]["name"].as_str(), Some("banana"));

    // sub-tables and nested arrays attach to the latest element
    let v = parse_ok(concat!(
        "[[fruits]]\n",
        "name = 'apple'\n",
        "[fruits.physical]\n",
        "color = 'red'\n",
        "[[fruits.varieties]]\n",
        "name = 'red delicious'\n",
        "[[fruits.varieties]]\n",
        "name = 'granny smith'\n",
        "[[fruits]]\n",
        "name = 'banana'\n",
        "[[fruits.varieties]]\n",
        "name = 'plantain'",
    ));
    let fruits = v["fruits"].as_array().unwrap();
    assert_eq!(fruits.len(), 2);
    assert_eq!(fruits[0]["physical"]["color"].as_str(), Some("red"));
    assert_eq!(fruits[0]["varieties"].as_array().unwrap().len(), 2);
    assert_eq!(fruits[1]["varieties"][0]["name"].as_str(), Some("plantain"));

    // an element with no statements stays empty
    let v = parse_ok("[[a]]\n[[a]]\nx = 1");
    let arr = v["a"].as_array().unwrap();
    assert!(arr[0].as_table().unwrap().is_empty());
    assert_eq!(arr[1]["x"].as_i64(), Some(1));
}

#[test]
fn blank_line_ends_document() {
    // everything after a fully empty line is ignored
    let v = parse_ok("a = 1\n\nb = 2");
    assert_eq!(v.len(), 1);
    assert!(v.get("b").is_none());

    // even text that would not parse
    let v = parse_ok("a = 1\n\n???");
    assert_eq!(v["a"].as_i64(), Some(1));

    // a line of spaces or tabs is not an end marker
    let v = parse_ok("a = 1\n \t \nb = 2");
    assert_eq!(v.len(), 2);

    // neither is a lone carriage return
    let v = parse_ok("a = 1\r\n\r\nb = 2");
    assert_eq!(v.len(), 2);

    // a document starting with an empty line is empty
    let v = parse_ok("\na = 1");
    assert!(v.is_empty());
}

#[test]
fn comments_and_attachment() {
    // comments are skipped by default
    let v = parse_ok("# top\na = 1 # tail\n# bottom");
    assert_eq!(v.len(), 1);
    assert_eq!(v["a"].as_i64(), Some(1));

    let options = crate::ParseOptions {
        attach_comments: true,
        ..Default::default()
    };

    // buffered comment lines attach to the next header, text kept verbatim
    let v = crate::parse_with("# one\n#  two\n[t]\nx = 1", &options).unwrap();
    assert_eq!(v["t"].as_table().unwrap().comment(), Some(" one\n  two"));

    // each header gets its own run
    let v = crate::parse_with("# a\n[t]\n# b\n[[u]]\n[[u]]", &options).unwrap();
    assert_eq!(v["t"].as_table().unwrap().comment(), Some(" a"));
    assert_eq!(v["u"][0].as_table().unwrap().comment(), Some(" b"));
    assert!(v["u"][1].as_table().unwrap().comment().is_none());

    // a key-value statement eats the buffer
    let v = crate::parse_with("# gone\nx = 1\n[t]", &options).unwrap();
    assert!(v["t"].as_table().unwrap().comment().is_none());

    // so does a whitespace-only line
    let v = crate::parse_with("# gone\n   \n[t]", &options).unwrap();
    assert!(v["t"].as_table().unwrap().comment().is_none());

    // trailing comments on the header line do not attach
    let v = crate::parse_with("[t] # tail", &options).unwrap();
    assert!(v["t"].as_table().unwrap().comment().is_none());

    // control characters in comments are rejected
    let e = parse_err("# bad \u{1} here");
    assert!(matches!(e.kind, ErrorKind::InvalidCharacter('\u{1}')));
    assert_eq!(e.pos, Some(Pos { line: 1, col: 7 }));
    let e = parse_err("a = 1 # del \u{7f}");
    assert!(matches!(e.kind, ErrorKind::InvalidCharacter('\u{7f}')));
}

#[test]
fn quoted_keys() {
    let v = parse_ok(r#""my key" = 1"#);
    assert_eq!(v["my key"].as_i64(), Some(1));

    let v = parse_ok("'other.key' = 1");
    assert_eq!(v["other.key"].as_i64(), Some(1));

    // escapes resolve inside basic-quoted keys
    let v = parse_ok(r#""tab\tkey" = 1"#);
    assert_eq!(v["tab\tkey"].as_i64(), Some(1));

    // the empty key
    let v = parse_ok("'' = 1");
    assert_eq!(v[""].as_i64(), Some(1));

    // mixed dotted paths
    let v = parse_ok(r#"site."google.com".ok = true"#);
    assert_eq!(v["site"]["google.com"]["ok"].as_bool(), Some(true));

    // quoted header segments
    let v = parse_ok("[dog.\"tater.man\"]\ntype = 'pug'");
    assert_eq!(v["dog"]["tater.man"]["type"].as_str(), Some("pug"));

    // a bad escape in a key reports the backslash position
    let e = parse_err(r#""a\z" = 1"#);
    assert_eq!(e.to_string(), "Invalid escape codes \\z in TOML at row 1, col 3");
}

#[test]
fn structure_errors() {
    // duplicate keys, in every scope flavor
    let e = parse_err("a = 1\na = 2");
    assert_eq!(e.to_string(), "The key a is duplicated in global at row 2, col 1");
    let e = parse_err("[t]\na = 1\na = 2");
    assert_eq!(e.to_string(), "The key a is duplicated in Table [t] at row 3, col 1");
    let e = parse_err("[[t]]\na = 1\na = 2");
    assert_eq!(
        e.to_string(),
        "The key a is duplicated in \"Array of Tables\" [[t]] at row 3, col 1"
    );

    // redefining tables
    let e = parse_err("[a]\n[a]");
    assert_eq!(e.to_string(), "The name of Table [a] is duplicated at row 2, col 1");
    let e = parse_err("[fruit]\napple.color = 'red'\n[fruit.apple]");
    assert_eq!(
        e.to_string(),
        "The name of Table [fruit.apple] is duplicated at row 3, col 1"
    );

    // headers colliding with values and arrays
    let e = parse_err("a = 1\n[a]");
    assert_eq!(
        e.to_string(),
        "The key a is already declared as non-table type when define Table [a] at row 2, col 1"
    );
    let e = parse_err("[[a]]\n[a]");
    assert_eq!(
        e.to_string(),
        "The name of Table [a] is already declared as \"Array of Tables\" at row 2, col 1"
    );
    let e = parse_err("a = 1\n[[a]]");
    assert_eq!(
        e.to_string(),
        "The name of \"Array of Tables\" [[a]] is already declared as other type at row 2, col 1"
    );
    let e = parse_err("a = [1]\n[[a]]");
    assert_eq!(
        e.to_string(),
        "The name of \"Array of Tables\" [[a]] is already declared as key at row 2, col 1"
    );
    let e = parse_err("a = [1]\n[a.b]");
    assert_eq!(
        e.to_string(),
        "Cannot extend Table [a.b] within static arrays a at row 2, col 1"
    );

    // dotted keys reopening a defined table
    let e = parse_err("[a.b]\nx = 1\n[a]\nb.y = 2");
    assert_eq!(
        e.to_string(),
        "The key b.y in Table [a] to add to [a.b] after explicitly defining it above is not allowed at row 4, col 1"
    );

    // dotted keys crossing a plain value
    let e = parse_err("x = 1\nx.y = 2");
    assert_eq!(
        e.to_string(),
        "When define key x.y in global, that failed to access x as table at row 2, col 1"
    );
}

#[test]
fn syntax_errors() {
    let cases = [
        ("= 1", 1, 1),
        ("a", 1, 1),
        ("a = ", 1, 5),
        ("a = @", 1, 5),
        ("a = 1 junk", 1, 7),
        ("[a] junk", 1, 5),
        ("[a", 1, 1),
        ("[]", 1, 1),
        ("[[a]", 1, 1),
        ("a = truey", 1, 5),
    ];
    for (input, line, col) in cases {
        let e = parse_err(input);
        assert!(matches!(e.kind, ErrorKind::Syntax), "input: {input}");
        assert_eq!(e.pos, Some(Pos { line, col }), "input: {input}");
        assert_eq!(
            e.to_string(),
            format!("Unexpected token in TOML at row {line}, col {col}"),
            "input: {input}"
        );
    }
}

#[test]
fn recursion_limit() {
    let deep = format!("a = {}1{}", "[".repeat(200), "]".repeat(200));
    let e = parse_err(&deep);
    assert!(matches!(e.kind, ErrorKind::RecursionLimit));
    assert_eq!(
        e.to_string(),
        "Maximum nesting depth exceeded in TOML at row 1, col 133"
    );

    // well below the limit is fine
    let ok = format!("a = {}1{}", "[".repeat(100), "]".repeat(100));
    parse_ok(&ok);

    let deep = format!("a = {}", "{ x = ".repeat(200));
    let e = parse_err(&deep);
    assert!(matches!(e.kind, ErrorKind::RecursionLimit));
}

#[test]
fn replacement_character() {
    let e = parse_err("a = 'bad \u{fffd} char'");
    assert!(matches!(e.kind, ErrorKind::InvalidCharacter('\u{fffd}')));
    let e = parse_err("a = 'ctrl \u{1} char'");
    assert!(matches!(e.kind, ErrorKind::InvalidCharacter('\u{1}')));

    let options = crate::ParseOptions {
        check_replacement_character: false,
        ..Default::default()
    };
    let v = crate::parse_with("a = 'ok \u{fffd} char'", &options).unwrap();
    assert_eq!(v["a"].as_str(), Some("ok \u{fffd} char"));
}

#[test]
fn crlf_documents() {
    let v = parse_ok("a = 1\r\n[t]\r\nb = 2\r\n");
    assert_eq!(v["a"].as_i64(), Some(1));
    assert_eq!(v["t"]["b"].as_i64(), Some(2));

    // CRLF inside multi-line strings is kept
    let v = parse_ok("a = \"\"\"\r\nx\r\ny\"\"\"");
    assert_eq!(v["a"].as_str(), Some("x\r\ny"));

    // comments with CR endings
    let v = parse_ok("a = 1 # note\r\nb = 2");
    assert_eq!(v.len(), 2);
}

#[test]
fn custom_converters() {
    use crate::{ConvertError, Converters, IntegerConverter, Value};

    struct StringInts;

    impl IntegerConverter for StringInts {
        fn parse(&self, digits: &str, negative: bool, _radix: u32) -> Result<Value, ConvertError> {
            let sign = if negative { "-" } else { "" };
            Ok(Value::String(format!("{sign}{digits}")))
        }

        fn matches(&self, value: &Value) -> bool {
            matches!(value, Value::String(..))
        }

        fn format(&self, value: &Value) -> Result<String, ConvertError> {
            match value {
                Value::String(s) => Ok(s.clone()),
                _ => Err(ConvertError::new("not a stringified integer")),
            }
        }
    }

    let options = crate::ParseOptions {
        converters: Converters {
            integer: Box::new(StringInts),
            ..Default::default()
        },
        ..Default::default()
    };
    // underscores are stripped before the converter sees the digits
    let v = crate::parse_with("a = -1_234", &options).unwrap();
    assert_eq!(v["a"].as_str(), Some("-1234"));

    struct NoZeros;

    impl IntegerConverter for NoZeros {
        fn parse(&self, digits: &str, _negative: bool, _radix: u32) -> Result<Value, ConvertError> {
            if digits == "0" {
                return Err(ConvertError::new("zero is reserved"));
            }
            Ok(Value::Integer(digits.parse().unwrap()))
        }

        fn matches(&self, value: &Value) -> bool {
            matches!(value, Value::Integer(..))
        }

        fn format(&self, value: &Value) -> Result<String, ConvertError> {
            match value {
                Value::Integer(i) => Ok(i.to_string()),
                _ => Err(ConvertError::new("not an integer")),
            }
        }
    }

    let options = crate::ParseOptions {
        converters: Converters {
            integer: Box::new(NoZeros),
            ..Default::default()
        },
        ..Default::default()
    };
    // rejections surface with the statement's position
    let e = crate::parse_with("a = 0", &options).unwrap_err();
    assert_eq!(e.to_string(), "zero is reserved at row 1, col 5");
}
