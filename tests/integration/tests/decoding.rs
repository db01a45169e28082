//! Displaying host bytes that are not valid UTF-8.

mod common;

use common::{HostKind, fake, shim};
use pretty_assertions::assert_eq;
use rstest::rstest;
use vimshim::{BufferHandle, STRTRANS_ERROR, Vim};
use vimshim_codec::{CodecError, NoTransliteration, decode, is_registered};

#[rstest]
#[case::valid(b"statusline".as_slice(), "statusline")]
#[case::lone_continuation(b"pre\x80post".as_slice(), "pre<80>post")]
#[case::truncated_sequence(b"caf\xc3".as_slice(), "caf<c3>")]
#[case::invalid_start(b"\xffab\xfe".as_slice(), "<ff>ab<fe>")]
#[case::mixed(b"\xe2\x98\x83 \xe9t\xe9".as_slice(), "\u{2603} <e9>t<e9>")]
fn decode_display(
    #[case] bytes: &[u8],
    #[case] expected: &str,
    #[values(
        HostKind::Legacy,
        HostKind::StructuredOld,
        HostKind::Structured,
        HostKind::ForcedLegacy
    )]
    kind: HostKind,
) {
    let fake = fake(kind);
    let vim = shim(kind, &fake);

    assert_eq!(vim.decode_display(bytes).unwrap(), expected, "{kind:?}");
}

#[test]
fn valid_input_never_asks_the_host() {
    let fake = fake(HostKind::Structured);
    let vim = shim(HostKind::Structured, &fake);
    fake.clear_log();

    assert_eq!(vim.decode_display("d\u{e9}j\u{e0} vu".as_bytes()).unwrap(), "d\u{e9}j\u{e0} vu");
    assert!(fake.log().is_empty(), "unexpected host traffic: {:?}", fake.log());
}

#[test]
fn host_renders_each_invalid_range() {
    let fake = fake(HostKind::Structured);
    let vim = shim(HostKind::Structured, &fake);
    fake.clear_log();

    vim.decode_display(b"a\x80b\x81c").unwrap();
    let calls: Vec<_> = fake
        .log()
        .into_iter()
        .filter(|entry| entry == "call: strtrans")
        .collect();
    assert_eq!(calls.len(), 2);
}

#[test]
fn buffer_name_from_structured_host() {
    let fake = fake(HostKind::Structured);
    fake.add_buffer(7, b"/tmp/\xc0\xafetc");
    let vim = shim(HostKind::Structured, &fake);

    let name = vim.buffer_name(BufferHandle(7)).unwrap().unwrap();
    assert_eq!(vim.decode_display(&name).unwrap(), "/tmp/<c0><af>etc");
}

#[test]
fn strtrans_without_host() {
    let vim = Vim::new(None);
    assert_eq!(vim.strtrans(b"\x00\xff").unwrap(), "<00><ff>");
    assert_eq!(vim.decode_display(b"ok\xffok").unwrap(), "ok<ff>ok");
}

#[test]
fn handler_is_registered_by_construction() {
    let _vim = Vim::new(None);
    assert!(is_registered(STRTRANS_ERROR));

    let err = decode(b"\x80", STRTRANS_ERROR, &NoTransliteration).unwrap_err();
    assert!(matches!(err, CodecError::Handler { .. }), "{err:?}");
}
