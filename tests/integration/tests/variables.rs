//! Variable and option lookups across every host generation.

mod common;

use common::{HostKind, current_segment, evals, fake, shim};
use rstest::rstest;
use serde_json::json;
use vimshim::{BufferHandle, Host, HostValue};

mod globals {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn unset_then_set(
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

        let err = vim.get_global("foo").unwrap_err();
        assert!(err.is_not_found(), "{kind:?}: expected NotFound, got {err:?}");

        fake.command("let g:foo = \"bar\"").unwrap();
        assert_eq!(vim.get_global("foo").unwrap(), json!("bar"), "{kind:?}");
    }

    #[rstest]
    fn empty_is_not_absent(
        #[values(
            HostKind::Legacy,
            HostKind::StructuredOld,
            HostKind::Structured,
            HostKind::ForcedLegacy
        )]
        kind: HostKind,
    ) {
        let fake = fake(kind);
        fake.command("let g:empty = \"\"").unwrap();
        let vim = shim(kind, &fake);

        assert_eq!(vim.get_global("empty").unwrap(), json!(""), "{kind:?}");
    }

    #[test]
    fn structured_marshals_containers() {
        let fake = fake(HostKind::Structured);
        fake.set_global(
            "powerline_config",
            HostValue::Dictionary(vec![
                ("theme".to_string(), HostValue::Bytes(b"default".to_vec())),
                (
                    "segments".to_string(),
                    HostValue::List(vec![
                        HostValue::Bytes(b"mode".to_vec()),
                        HostValue::Function(vimshim::FuncRef::new("mode")),
                    ]),
                ),
                ("width".to_string(), HostValue::from(80)),
            ]),
        );
        let vim = shim(HostKind::Structured, &fake);

        let value = vim.get_global("powerline_config").unwrap();
        assert_eq!(
            value,
            json!({"theme": "default", "segments": ["mode", null], "width": 80})
        );
        assert!(evals(&fake).is_empty(), "structured lookups must not evaluate");
    }

    #[test]
    fn legacy_checks_existence_first() {
        let fake = fake(HostKind::Legacy);
        let vim = shim(HostKind::Legacy, &fake);
        fake.clear_log();

        assert!(vim.get_global("missing").is_err());
        assert_eq!(evals(&fake), vec!["eval: exists(\"g:missing\")".to_string()]);
    }
}

mod buffer_vars {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn current_buffer(
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

        assert!(!vim.buffer_has(None, "x").unwrap(), "{kind:?}");
        fake.command("let b:x = 1").unwrap();
        assert!(vim.buffer_has(None, "x").unwrap(), "{kind:?}");
        assert!(vim.buffer_has(Some(BufferHandle(1)), "x").unwrap(), "{kind:?}");
    }

    #[rstest]
    fn other_buffer(
        #[values(
            HostKind::Legacy,
            HostKind::StructuredOld,
            HostKind::Structured,
            HostKind::ForcedLegacy
        )]
        kind: HostKind,
    ) {
        let fake = fake(kind);
        fake.add_buffer(2, b"other.txt");
        fake.set_buffer_var(2, "y", HostValue::from("v"));
        let vim = shim(kind, &fake);

        assert!(vim.buffer_has(Some(BufferHandle(2)), "y").unwrap(), "{kind:?}");
        assert!(!vim.buffer_has(Some(BufferHandle(2)), "z").unwrap(), "{kind:?}");
        assert!(!vim.buffer_has(None, "y").unwrap(), "{kind:?}");
    }

    #[test]
    fn legacy_addresses_other_buffer_through_getbufvar() {
        let fake = fake(HostKind::Legacy);
        fake.add_buffer(2, b"");
        let vim = shim(HostKind::Legacy, &fake);
        fake.clear_log();

        vim.buffer_has(Some(BufferHandle(2)), "y").unwrap();
        vim.buffer_has(None, "y").unwrap();
        assert_eq!(
            evals(&fake),
            vec![
                "eval: has_key(getbufvar(2, \"\"), \"y\")".to_string(),
                "eval: exists(\"b:y\")".to_string(),
            ]
        );
    }

    #[rstest]
    fn read_value(
        #[values(
            HostKind::Legacy,
            HostKind::StructuredOld,
            HostKind::Structured,
            HostKind::ForcedLegacy
        )]
        kind: HostKind,
    ) {
        let fake = fake(kind);
        fake.command("let b:empty = \"\"").unwrap();
        fake.command("let b:name = \"value\"").unwrap();
        let vim = shim(kind, &fake);

        assert_eq!(vim.get_buffer_var(BufferHandle(1), "empty").unwrap(), json!(""));
        assert_eq!(vim.get_buffer_var(BufferHandle(1), "name").unwrap(), json!("value"));
        assert!(
            vim.get_buffer_var(BufferHandle(1), "missing")
                .unwrap_err()
                .is_not_found()
        );
    }

    #[rstest]
    #[case::legacy(HostKind::Legacy, json!("5"))]
    #[case::structured_old(HostKind::StructuredOld, json!(5))]
    #[case::structured(HostKind::Structured, json!(5))]
    fn getbufvar(#[case] kind: HostKind, #[case] expected: serde_json::Value) {
        let fake = fake(kind);
        fake.set_buffer_var(1, "n", HostValue::from(5));
        let vim = shim(kind, &fake);

        assert_eq!(vim.getbufvar(1, "n").unwrap(), expected);
    }
}

mod window_vars {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn empty_absent_and_set(
        #[values(
            HostKind::Legacy,
            HostKind::StructuredOld,
            HostKind::Structured,
            HostKind::ForcedLegacy
        )]
        kind: HostKind,
    ) {
        let fake = fake(kind);
        fake.set_window_var(1000, "baz", HostValue::Bytes(Vec::new()));
        fake.set_window_var(1000, "name", HostValue::Bytes(b"value".to_vec()));
        let vim = shim(kind, &fake);
        let info = current_segment();

        assert_eq!(vim.get_window_var(&info, "baz").unwrap(), json!(""), "{kind:?}");
        assert_eq!(vim.get_window_var(&info, "name").unwrap(), json!("value"), "{kind:?}");
        let err = vim.get_window_var(&info, "qux").unwrap_err();
        assert!(err.is_not_found(), "{kind:?}: expected NotFound, got {err:?}");
    }

    #[test]
    fn second_window() {
        let fake = fake(HostKind::Legacy);
        fake.add_window(1001, 2);
        fake.set_window_var(1001, "only_here", HostValue::from("yes"));
        let vim = shim(HostKind::Legacy, &fake);

        let other = vimshim::test_utils::FakeVim::segment_info(1, 1001, 2);
        assert_eq!(vim.get_window_var(&other, "only_here").unwrap(), json!("yes"));
        assert!(vim.get_window_var(&current_segment(), "only_here").is_err());
    }

    #[test]
    fn legacy_disambiguates_only_empty_results() {
        let fake = fake(HostKind::Legacy);
        fake.set_window_var(1000, "baz", HostValue::Bytes(Vec::new()));
        fake.set_window_var(1000, "name", HostValue::from("value"));
        let vim = shim(HostKind::Legacy, &fake);
        let info = current_segment();

        fake.clear_log();
        vim.get_window_var(&info, "name").unwrap();
        assert_eq!(evals(&fake), vec!["eval: getwinvar(1, \"name\")".to_string()]);

        fake.clear_log();
        vim.get_window_var(&info, "baz").unwrap();
        assert_eq!(
            evals(&fake),
            vec![
                "eval: getwinvar(1, \"baz\")".to_string(),
                "eval: has_key(getwinvar(1, \"\"), \"baz\")".to_string(),
            ]
        );
    }

    #[test]
    fn legacy_zero_text_is_a_value() {
        let fake = fake(HostKind::Legacy);
        fake.set_window_var(1000, "z", HostValue::from("0"));
        let vim = shim(HostKind::Legacy, &fake);
        fake.clear_log();

        assert_eq!(vim.get_window_var(&current_segment(), "z").unwrap(), json!("0"));
        assert_eq!(evals(&fake), vec!["eval: getwinvar(1, \"z\")".to_string()]);
    }

    #[test]
    fn structured_reads_table_directly() {
        let fake = fake(HostKind::Structured);
        fake.set_window_var(1000, "baz", HostValue::Bytes(Vec::new()));
        let vim = shim(HostKind::Structured, &fake);
        fake.clear_log();

        assert_eq!(vim.get_window_var(&current_segment(), "baz").unwrap(), json!(""));
        assert!(fake.log().is_empty(), "unexpected host traffic: {:?}", fake.log());
    }
}

mod buffer_options {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn known_unknown_and_set(
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
        let info = current_segment();

        assert_eq!(vim.get_buffer_option(&info, "filetype").unwrap(), json!(""), "{kind:?}");
        let err = vim.get_buffer_option(&info, "nosuchoption").unwrap_err();
        assert!(err.is_not_found(), "{kind:?}: expected NotFound, got {err:?}");

        fake.set_buffer_option(1, "filetype", HostValue::Bytes(b"rust".to_vec()));
        assert_eq!(vim.get_buffer_option(&info, "filetype").unwrap(), json!("rust"), "{kind:?}");
    }

    #[test]
    fn legacy_uses_option_variable_name() {
        let fake = fake(HostKind::Legacy);
        let vim = shim(HostKind::Legacy, &fake);
        fake.clear_log();

        vim.get_buffer_option(&current_segment(), "fileformat").unwrap();
        assert_eq!(evals(&fake), vec!["eval: getbufvar(1, \"&fileformat\")".to_string()]);
    }
}
