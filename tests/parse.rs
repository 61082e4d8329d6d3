use flagbind::{ArgOptions, ArgParser, ErrorKind, Result, Stage, Value, ValueRef};

const NO_ARGS: [&str; 0] = [];

fn split(cmdline: &str) -> Vec<&str> {
    cmdline.split_whitespace().collect()
}

/// Declare one flag `name` on `slot` and parse `cmdline`, returning the
/// outcome as owned leftovers.
fn parse_one<'a, S>(slot: S, name: &str, opts: ArgOptions, cmdline: &str) -> Result<Vec<String>>
where
    S: Into<flagbind::Slot<'a>>,
{
    let mut p = ArgParser::new("somename");
    p.flag(slot, name, opts);
    p.parse(split(cmdline)).map(<[String]>::to_vec)
}

#[test]
fn bool_flag() {
    for (cmdline, opts, expect) in [
        ("", ArgOptions::new(), false),
        ("-b", ArgOptions::new(), true),
        ("", ArgOptions::new().default_val(true), true),
        ("-b=false", ArgOptions::new().default_val(true), false),
        ("-b", ArgOptions::new().required(), true),
        ("", ArgOptions::new().required(), false),
    ] {
        let mut val = false;
        parse_one(&mut val, "b", opts, cmdline).unwrap();
        assert_eq!(val, expect, "{cmdline:?}");
    }
}

#[test]
fn int_flag() {
    for (cmdline, opts, expect) in [
        ("", ArgOptions::new(), Ok(0)),
        ("-i 999", ArgOptions::new(), Ok(999)),
        ("-i=-3", ArgOptions::new(), Ok(-3)),
        ("-i 0x10", ArgOptions::new(), Ok(16)),
        ("-i notanumber", ArgOptions::new(), Err(ErrorKind::InvalidValue)),
        ("-i", ArgOptions::new(), Err(ErrorKind::MissingValue)),
        ("", ArgOptions::new().default_val(777), Ok(777)),
        ("", ArgOptions::new().default_val("notanumber"), Err(ErrorKind::TypeMismatch)),
        ("", ArgOptions::new().default_val(1.5), Err(ErrorKind::TypeMismatch)),
        ("", ArgOptions::new().required(), Err(ErrorKind::Validation)),
        ("-i 0", ArgOptions::new().required(), Err(ErrorKind::Validation)),
        ("-i 5", ArgOptions::new().required(), Ok(5)),
    ] {
        let mut val = -1i64;
        let got = parse_one(&mut val, "i", opts, cmdline);
        match expect {
            Ok(v) => {
                got.unwrap();
                assert_eq!(val, v, "{cmdline:?}");
            }
            Err(kind) => assert_eq!(got.unwrap_err().kind(), kind, "{cmdline:?}"),
        }
    }
}

#[test]
fn float_flag() {
    for (cmdline, opts, expect) in [
        ("", ArgOptions::new(), Ok(0.0)),
        ("-f 3.7", ArgOptions::new(), Ok(3.7)),
        ("-f notafloat", ArgOptions::new(), Err(ErrorKind::InvalidValue)),
        ("", ArgOptions::new().default_val(6.1), Ok(6.1)),
        ("", ArgOptions::new().default_val("notafloat"), Err(ErrorKind::TypeMismatch)),
        ("", ArgOptions::new().default_val(6), Err(ErrorKind::TypeMismatch)),
        ("", ArgOptions::new().required(), Err(ErrorKind::Validation)),
        ("-f 0.0", ArgOptions::new().required(), Err(ErrorKind::Validation)),
    ] {
        let mut val = -1.0;
        let got = parse_one(&mut val, "f", opts, cmdline);
        match expect {
            Ok(v) => {
                got.unwrap();
                assert_eq!(val, v, "{cmdline:?}");
            }
            Err(kind) => assert_eq!(got.unwrap_err().kind(), kind, "{cmdline:?}"),
        }
    }
}

#[test]
fn string_flag() {
    for (cmdline, opts, expect) in [
        ("", ArgOptions::new(), Ok("")),
        ("-s foo", ArgOptions::new(), Ok("foo")),
        ("--s foo", ArgOptions::new(), Ok("foo")),
        ("-s=", ArgOptions::new(), Ok("")),
        ("", ArgOptions::new().default_val("bar"), Ok("bar")),
        ("-s foo", ArgOptions::new().default_val("bar"), Ok("foo")),
        ("", ArgOptions::new().default_val(false), Err(ErrorKind::TypeMismatch)),
        ("", ArgOptions::new().required(), Err(ErrorKind::Validation)),
        ("-s=", ArgOptions::new().required(), Err(ErrorKind::Validation)),
    ] {
        let mut val = String::from("unset");
        let got = parse_one(&mut val, "s", opts, cmdline);
        match expect {
            Ok(v) => {
                got.unwrap();
                assert_eq!(val, v, "{cmdline:?}");
            }
            Err(kind) => assert_eq!(got.unwrap_err().kind(), kind, "{cmdline:?}"),
        }
    }
}

#[test]
fn required_message() {
    let mut val = 0i64;
    let err = parse_one(&mut val, "i", ArgOptions::new().required(), "").unwrap_err();
    assert_eq!(err.stage(), Stage::Validation);
    assert_eq!(err.to_string(), "val is required: -i");

    let err = parse_one(&mut val, "i", ArgOptions::new().required(), "-i 0").unwrap_err();
    assert_eq!(err.to_string(), "val is required: -i");
}

#[test]
fn registration_error_wins_regardless_of_input() {
    for cmdline in ["", "-i 5", "-unknown", "-i notanumber"] {
        let mut val = 0i64;
        let err = parse_one(&mut val, "i", ArgOptions::new().default_val("notanumber"), cmdline)
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Registration, "{cmdline:?}");
        assert_eq!(err.to_string(), "Type mismatch between slot and default value: i");
    }
}

#[test]
fn only_first_registration_error() {
    let (mut a, mut b) = (0i64, String::new());
    let mut p = ArgParser::new("me");
    p.flag(&mut a, "a", ArgOptions::new().default_val("x"))
        .flag(&mut b, "b", ArgOptions::new().default_val(1));
    assert_eq!(p.parse(NO_ARGS).unwrap_err().name(), Some("a"));
}

#[test]
fn required_positionals() {
    let mut p = ArgParser::new("me");
    p.positional("file", "Input", true);

    let err = p.parse(NO_ARGS).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientPositional);
    assert_eq!(err.stage(), Stage::Positional);
    assert_eq!(err.to_string(), "Insufficient number of non-flag arguments");

    assert_eq!(p.parse(["a.txt"]).unwrap(), ["a.txt"]);
    assert_eq!(p.args(), ["a.txt"]);
    assert_eq!(p.parse(["a.txt", "b.txt"]).unwrap(), ["a.txt", "b.txt"]);
}

#[test]
fn positional_count_is_minimum_only() {
    let mut v = false;
    let mut p = ArgParser::new("me");
    p.flag(&mut v, "v", ArgOptions::new())
        .positional("src", "", true)
        .positional("dst", "", true)
        .positional("extra", "", false);

    assert!(p.parse(["-v", "one"]).is_err());
    assert_eq!(p.parse(["-v", "one", "two"]).unwrap(), ["one", "two"]);
    // Flags after the first positional are leftovers too.
    assert_eq!(p.parse(["one", "-v"]).unwrap(), ["one", "-v"]);
    assert_eq!(p.value("v"), Some(Value::Bool(false)));
}

#[test]
fn validation_runs_before_positional_check() {
    let mut n = 0i64;
    let mut p = ArgParser::new("me");
    p.flag(&mut n, "n", ArgOptions::new().required()).positional("file", "", true);
    assert_eq!(p.parse(NO_ARGS).unwrap_err().kind(), ErrorKind::Validation);
}

#[test]
fn tokenize_error_skips_validation() {
    let (mut n, mut s) = (0i64, String::new());
    let mut p = ArgParser::new("me");
    p.flag(&mut n, "n", ArgOptions::new().required())
        .flag(&mut s, "s", ArgOptions::new());
    let err = p.parse(["-s", "x", "-x"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownFlag);
    assert_eq!(err.stage(), Stage::Tokenize);
    assert_eq!(err.to_string(), "flag provided but not defined: -x");
    assert!(p.args().is_empty());
}

#[test]
fn custom_validators_compose() {
    let even = |v: ValueRef<'_>| match v {
        ValueRef::Int(n) if n % 2 != 0 => Err(format!("{n} is odd")),
        _ => Ok(()),
    };
    let small = |v: ValueRef<'_>| match v {
        ValueRef::Int(n) if n > 10 => Err("too large".to_owned()),
        _ => Ok(()),
    };

    for (cmdline, expect) in [
        ("-n 4", Ok(4)),
        ("-n 3", Err("3 is odd: -n")),
        ("-n 13", Err("13 is odd: -n")),
        ("-n 12", Err("too large: -n")),
        ("", Err("val is required: -n")),
    ] {
        let mut n = 0i64;
        let opts = ArgOptions::new().required().validator(even).validator(small);
        let got = parse_one(&mut n, "n", opts, cmdline);
        match expect {
            Ok(v) => {
                got.unwrap();
                assert_eq!(n, v);
            }
            Err(msg) => assert_eq!(got.unwrap_err().to_string(), msg, "{cmdline:?}"),
        }
    }
}

#[test]
fn reparse_does_not_leak() {
    let (mut b, mut i, mut s) = (false, 0i64, String::new());
    let mut p = ArgParser::new("me");
    p.flag(&mut b, "b", ArgOptions::new())
        .flag(&mut i, "i", ArgOptions::new().default_val(1))
        .flag(&mut s, "s", ArgOptions::new());

    assert_eq!(p.parse(["-b", "-i", "9", "-s", "first", "rest"]).unwrap(), ["rest"]);
    assert_eq!(p.value("i"), Some(Value::Int(9)));

    // A failed attempt in between leaves nothing behind either.
    p.parse(["-s", "partial", "-i", "bad"]).unwrap_err();

    assert!(p.parse(["-s", "second"]).unwrap().is_empty());
    drop(p);
    assert!(!b);
    assert_eq!(i, 1);
    assert_eq!(s, "second");
}

#[test]
fn help_flag() {
    let mut help = false;
    let mut p = ArgParser::new("me");
    p.help_flag(&mut help);
    assert_eq!(p.flags()[0].options().usage(), "Help");
    p.parse(["-h"]).unwrap();
    drop(p);
    assert!(help);
}

#[test]
fn owned_args() {
    let mut s = String::new();
    let mut p = ArgParser::new("me");
    p.flag(&mut s, "s", ArgOptions::new());
    let args = vec![String::from("-s"), String::from("owned")];
    p.parse(args).unwrap();
    assert_eq!(p.value("s"), Some(Value::String("owned".into())));
}

#[cfg(unix)]
#[test]
fn non_utf8_arguments() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let bad = || OsString::from_vec(vec![0xff, 0xfe]);
    let mut s = String::new();
    let mut p = ArgParser::new("me");
    p.flag(&mut s, "s", ArgOptions::new());

    for args in [
        vec!["-s".into(), bad()],
        vec![OsString::from_vec(b"-s=\xff".to_vec())],
        vec!["x".into(), bad()],
    ] {
        p.parse(["leftover"]).unwrap();
        let err = p.parse(args.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUtf8, "{args:?}");
        assert_eq!(err.stage(), Stage::Tokenize);
        assert!(p.args().is_empty(), "{args:?}");
    }
}
