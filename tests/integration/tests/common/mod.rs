#![allow(dead_code)]

use std::rc::Rc;

use vimshim::test_utils::FakeVim;
use vimshim::{Host, SegmentInfo, ShimConfig, Vim};

/// The host configurations every accessor must behave the same across.
#[derive(Debug, Clone, Copy)]
pub enum HostKind {
    /// String evaluation only.
    Legacy,
    /// Typed evaluation, but a version too old for variable tables.
    StructuredOld,
    /// Everything structured.
    Structured,
    /// A structured host driven through the legacy path.
    ForcedLegacy,
}

pub fn fake(kind: HostKind) -> Rc<FakeVim> {
    Rc::new(match kind {
        HostKind::Legacy => FakeVim::legacy(),
        HostKind::StructuredOld => FakeVim::structured_old(),
        HostKind::Structured | HostKind::ForcedLegacy => FakeVim::structured(),
    })
}

pub fn shim(kind: HostKind, fake: &Rc<FakeVim>) -> Vim {
    let config = ShimConfig {
        force_legacy: matches!(kind, HostKind::ForcedLegacy),
        ..ShimConfig::default()
    };
    let host: Rc<dyn Host> = fake.clone();
    Vim::with_config(Some(host), &config)
}

/// Buffer 1 in window 1 (ID 1000), the fake's initial layout.
pub fn current_segment() -> SegmentInfo {
    FakeVim::segment_info(1, 1000, 1)
}

/// Log entries that went through string evaluation.
pub fn evals(fake: &FakeVim) -> Vec<String> {
    fake.log()
        .into_iter()
        .filter(|entry| entry.starts_with("eval: "))
        .collect()
}
