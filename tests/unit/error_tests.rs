//! Unit tests for the error enumeration.

use pipe_courier::CourierError;

/// Each variant formats with its category prefix.
#[test]
fn display_includes_category_prefix() {
    let cases = [
        (CourierError::Decode("bad record".into()), "decode: bad record"),
        (CourierError::Connect("no listener".into()), "connect: no listener"),
        (CourierError::Transport("pipe broke".into()), "transport: pipe broke"),
        (CourierError::Handler("callback failed".into()), "handler: callback failed"),
        (CourierError::Closed("sender closed".into()), "closed: sender closed"),
        (
            CourierError::AlreadyStarted("receiver 'x'".into()),
            "already started: receiver 'x'",
        ),
        (CourierError::Config("bad toml".into()), "config: bad toml"),
        (CourierError::Io("denied".into()), "io: denied"),
    ];

    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

/// TOML parse failures convert into the config variant.
#[test]
fn from_toml_error_is_config() {
    let toml_err = toml::from_str::<toml::Value>("not = = toml").unwrap_err();
    let err: CourierError = toml_err.into();
    assert!(matches!(err, CourierError::Config(_)));
}

/// I/O failures convert into the io variant.
#[test]
fn from_io_error_is_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: CourierError = io_err.into();
    assert!(matches!(err, CourierError::Io(_)));
}

/// The type plugs into `std::error::Error` consumers.
#[test]
fn implements_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(CourierError::Decode("x".into()));
    assert!(err.to_string().starts_with("decode:"));
}
