//! Capability detection and configuration.

mod common;

use std::rc::Rc;

use common::{HostKind, evals, fake, shim};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use vimshim::test_utils::FakeVim;
use vimshim::{Generation, Host, ShimConfig, Vim};

#[rstest]
#[case::legacy(HostKind::Legacy, Generation::Legacy, None, false, false)]
#[case::structured_old(HostKind::StructuredOld, Generation::Structured, Some(703), false, false)]
#[case::structured(HostKind::Structured, Generation::Structured, Some(801), true, true)]
#[case::forced_legacy(HostKind::ForcedLegacy, Generation::Legacy, Some(801), false, false)]
fn detected_capabilities(
    #[case] kind: HostKind,
    #[case] generation: Generation,
    #[case] version: Option<i64>,
    #[case] scoped_vars: bool,
    #[case] buffer_options: bool,
) {
    let fake = fake(kind);
    let vim = shim(kind, &fake);
    let caps = vim.capabilities();

    assert_eq!(caps.generation, generation);
    assert_eq!(caps.version, version);
    assert_eq!(caps.scoped_vars, scoped_vars);
    assert_eq!(caps.buffer_options, buffer_options);
    assert!(caps.has_host());
}

#[test]
fn lowered_version_threshold_enables_variable_tables() {
    let fake = Rc::new(FakeVim::structured_old());
    fake.set_global("theme", vimshim::HostValue::Bytes(b"solarized".to_vec()));
    let config = ShimConfig::from_json(r#"{ "structured_vars_min_version": 702 }"#).unwrap();
    let host: Rc<dyn Host> = fake.clone();
    let vim = Vim::with_config(Some(host), &config);

    assert!(vim.capabilities().scoped_vars);
    fake.clear_log();
    assert_eq!(vim.get_global("theme").unwrap(), json!("solarized"));
    assert!(evals(&fake).is_empty(), "{:?}", fake.log());
}

#[test]
fn unknown_config_keys_are_rejected() {
    let err = ShimConfig::from_json(r#"{ "legacy": true }"#).unwrap_err();
    assert!(err.to_string().contains("legacy"), "{err}");
}

