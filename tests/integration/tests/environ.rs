//! Environment access through the host.

mod common;

use common::{HostKind, fake, shim};
use pretty_assertions::assert_eq;
use rstest::rstest;
use vimshim::Vim;

#[rstest]
#[case::plain("plain")]
#[case::quotes(r#"say "hi""#)]
#[case::backslashes(r"C:\Users\me\")]
#[case::escaped_quote(r#"a\"b"#)]
#[case::newline("line1\nline2")]
#[case::unicode("caf\u{e9} \u{2603}")]
fn set_then_get(
    #[case] value: &str,
    #[values(HostKind::Legacy, HostKind::Structured, HostKind::ForcedLegacy)] kind: HostKind,
) {
    let fake = fake(kind);
    let vim = shim(kind, &fake);
    let environ = vim.environ();

    environ.set("POWERLINE_TEST", value).unwrap();
    assert_eq!(environ.get("POWERLINE_TEST").unwrap(), value, "{kind:?}");
}

#[rstest]
fn nul_is_dropped(
    #[values(HostKind::Legacy, HostKind::StructuredOld, HostKind::Structured)] kind: HostKind,
) {
    let fake = fake(kind);
    let vim = shim(kind, &fake);

    vim.environ().set("WITH_NUL", "a\0b").unwrap();
    assert_eq!(vim.environ().get("WITH_NUL").unwrap(), "ab");
}

#[test]
fn unset_reads_empty_and_falls_back() {
    let fake = fake(HostKind::Legacy);
    let vim = shim(HostKind::Legacy, &fake);
    let environ = vim.environ();

    assert_eq!(environ.get("NEVER_SET").unwrap(), "");
    assert_eq!(environ.get_or("NEVER_SET", "fallback").unwrap(), "fallback");

    environ.set("EMPTY", "").unwrap();
    assert_eq!(environ.get_or("EMPTY", "fallback").unwrap(), "fallback");

    environ.set("SET", "value").unwrap();
    assert_eq!(environ.get_or("SET", "fallback").unwrap(), "value");
}

#[test]
fn writes_use_let_command() {
    let fake = fake(HostKind::Legacy);
    let vim = shim(HostKind::Legacy, &fake);
    fake.clear_log();

    vim.environ().set("X", r#"\""#).unwrap();
    assert_eq!(fake.log(), vec![r#"command: let $X="\\\"""#.to_string()]);
}

#[test]
fn no_host() {
    let vim = Vim::new(None);
    let environ = vim.environ();

    environ.set("HOME", "/nowhere").unwrap();
    assert_eq!(environ.get("HOME").unwrap(), "");
    assert_eq!(environ.get_or("HOME", "/").unwrap(), "/");
}
