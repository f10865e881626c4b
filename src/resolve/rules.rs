//! Ordered title pattern rules.
//!
//! Earlier rules win. A rule fires when any `patterns` entry matches, every
//! `require` entry matches and no `forbid` entry matches. Siblings that share
//! a numeric stem are ordered most-specific first (SXM before PCIe, 80GB
//! before 40GB, Ti Super before Ti before the bare model) and the broader
//! sibling also forbids the narrower qualifier, so reordering the table
//! cannot move traffic between them. Bare numbers are always bounded by
//! `\b` so that "40" never matches inside "4090".
//!
//! When a listing is mis-resolved, tighten the rule that fired rather than
//! reorder the table, and add the title to `data/replay.json`.

/// Unambiguous NVIDIA datacenter context, required by short model names
/// (A2, L4, T4...) that collide with unrelated products.
const DATACENTER_CONTEXT: &str = r"\b(?:nvidia|tesla|tensor[\s_-]*core|gpu|datacenter|data[\s_-]*center)\b";
/// Context for entry-level workstation names (A400, T400...).
const WORKSTATION_CONTEXT: &str = r"\b(?:nvidia|quadro|rtx)\b";

const SXM: &str = r"\bsxm\d?\b";
const MEM_80GB: &str = r"\b80[\s_-]*gb?\b";
const ADA: &str = r"\bada\b";

#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub identifier: &'static str,
    pub patterns: &'static [&'static str],
    pub require: &'static [&'static str],
    pub forbid: &'static [&'static str],
}

const fn rule(identifier: &'static str, patterns: &'static [&'static str]) -> RuleSpec {
    RuleSpec {
        identifier,
        patterns,
        require: &[],
        forbid: &[],
    }
}

const fn rule_with(
    identifier: &'static str,
    patterns: &'static [&'static str],
    require: &'static [&'static str],
    forbid: &'static [&'static str],
) -> RuleSpec {
    RuleSpec {
        identifier,
        patterns,
        require,
        forbid,
    }
}

pub const RULES: &[RuleSpec] = &[
    // Hopper
    rule_with("H100_NVL", &[r"\bh100\b"], &[r"\b(?:nvl|94[\s_-]*gb?)\b"], &[]),
    rule_with("H100_SXM5", &[r"\bh100\b"], &[SXM], &[]),
    rule_with("H100_PCIE", &[r"\bh100\b"], &[], &[SXM, r"\bnvl\b"]),
    rule_with("H200_NVL", &[r"\bh200\b"], &[r"\bnvl\b"], &[]),
    rule_with("H200_SXM", &[r"\bh200\b"], &[], &[r"\bnvl\b"]),
    // Ampere datacenter
    rule_with("A100_80GB_SXM4", &[r"\ba100\b"], &[SXM, MEM_80GB], &[]),
    rule_with("A100_40GB_SXM4", &[r"\ba100\b"], &[SXM], &[]),
    rule_with("A100_80GB_PCIE", &[r"\ba100\b"], &[MEM_80GB], &[SXM]),
    rule_with("A100_40GB_PCIE", &[r"\ba100\b"], &[], &[SXM, MEM_80GB]),
    // Ada / Ampere inference
    rule("L40S", &[r"\bl40s\b"]),
    rule("L40", &[r"\bl40\b"]),
    rule_with("L4", &[r"\bl4\b"], &[DATACENTER_CONTEXT], &[]),
    rule_with("A40", &[r"\ba40\b"], &[DATACENTER_CONTEXT], &[]),
    rule_with("A30", &[r"\ba30\b"], &[DATACENTER_CONTEXT], &[]),
    rule_with("A16", &[r"\ba16\b"], &[DATACENTER_CONTEXT], &[]),
    rule_with("A10", &[r"\ba10g?\b"], &[DATACENTER_CONTEXT], &[]),
    rule_with("A2", &[r"\ba2\b"], &[DATACENTER_CONTEXT], &[]),
    rule_with("T4", &[r"\bt4\b"], &[DATACENTER_CONTEXT], &[]),
    // Volta / Pascal
    rule_with("V100_32GB", &[r"\bv100s?\b"], &[r"\b32[\s_-]*gb?\b"], &[]),
    rule_with("V100_16GB", &[r"\bv100s?\b"], &[], &[r"\b32[\s_-]*gb?\b"]),
    rule("P100", &[r"\bp100\b"]),
    rule_with("P40", &[r"\bp40\b"], &[DATACENTER_CONTEXT], &[]),
    // Workstation, Blackwell and Ada
    rule("RTX_PRO_6000_BLACKWELL", &[r"\brtx[\s_-]*pro[\s_-]*6000\b"]),
    rule_with("RTX_6000_ADA", &[r"\brtx[\s_-]*6000\b", r"\b6000[\s_-]*ada\b"], &[ADA], &[]),
    rule_with("RTX_5000_ADA", &[r"\brtx[\s_-]*5000\b", r"\b5000[\s_-]*ada\b"], &[ADA], &[]),
    rule_with("RTX_4500_ADA", &[r"\brtx[\s_-]*4500\b", r"\b4500[\s_-]*ada\b"], &[ADA], &[]),
    rule_with(
        "RTX_4000_SFF_ADA",
        &[r"\brtx[\s_-]*4000\b", r"\b4000[\s_-]*sff\b"],
        &[ADA, r"\bsff\b"],
        &[],
    ),
    rule_with(
        "RTX_4000_ADA",
        &[r"\brtx[\s_-]*4000\b", r"\b4000[\s_-]*ada\b"],
        &[ADA],
        &[r"\bsff\b"],
    ),
    rule_with("RTX_2000_ADA", &[r"\brtx[\s_-]*2000\b", r"\b2000[\s_-]*ada\b"], &[ADA], &[]),
    // Turing
    rule("QUADRO_RTX_8000", &[r"\bquadro[\s_-]*rtx[\s_-]*8000\b", r"\brtx[\s_-]*8000\b"]),
    rule_with("QUADRO_RTX_6000", &[r"\bquadro[\s_-]*rtx[\s_-]*6000\b"], &[], &[ADA]),
    // Workstation Ampere
    rule("RTX_A6000", &[r"\ba6000\b"]),
    rule("RTX_A5000", &[r"\ba5000\b"]),
    rule("RTX_A4500", &[r"\ba4500\b"]),
    rule("RTX_A4000", &[r"\ba4000\b"]),
    rule("RTX_A2000", &[r"\ba2000\b"]),
    rule_with("A1000", &[r"\ba1000\b"], &[WORKSTATION_CONTEXT], &[]),
    rule_with("A400", &[r"\ba400\b"], &[WORKSTATION_CONTEXT], &[]),
    rule_with("T1000", &[r"\bt1000\b"], &[WORKSTATION_CONTEXT], &[]),
    rule_with("T400", &[r"\bt400\b"], &[WORKSTATION_CONTEXT], &[]),
    // GeForce
    rule("RTX_5090", &[r"\brtx[\s_-]*5090\b"]),
    rule("RTX_5080", &[r"\brtx[\s_-]*5080\b"]),
    rule("RTX_4090", &[r"\brtx[\s_-]*4090\b"]),
    rule("RTX_4080_SUPER", &[r"\brtx[\s_-]*4080[\s_-]*super\b"]),
    rule_with("RTX_4080", &[r"\brtx[\s_-]*4080\b"], &[], &[r"4080[\s_-]*super\b"]),
    rule("RTX_4070_TI_SUPER", &[r"\brtx[\s_-]*4070[\s_-]*ti[\s_-]*super\b"]),
    rule_with("RTX_4070_TI", &[r"\brtx[\s_-]*4070[\s_-]*ti\b"], &[], &[r"\bti[\s_-]*super\b"]),
    rule("RTX_4070_SUPER", &[r"\brtx[\s_-]*4070[\s_-]*super\b"]),
    rule_with("RTX_4070", &[r"\brtx[\s_-]*4070\b"], &[], &[r"4070[\s_-]*(?:ti|super)\b"]),
    rule("RTX_4060_TI", &[r"\brtx[\s_-]*4060[\s_-]*ti\b"]),
    rule_with("RTX_4060", &[r"\brtx[\s_-]*4060\b"], &[], &[r"4060[\s_-]*ti\b"]),
    rule("RTX_3090_TI", &[r"\brtx[\s_-]*3090[\s_-]*ti\b"]),
    rule_with("RTX_3090", &[r"\brtx[\s_-]*3090\b"], &[], &[r"3090[\s_-]*ti\b"]),
    rule("RTX_3080_TI", &[r"\brtx[\s_-]*3080[\s_-]*ti\b"]),
    rule_with("RTX_3080", &[r"\brtx[\s_-]*3080\b"], &[], &[r"3080[\s_-]*ti\b"]),
    rule_with("RTX_3070", &[r"\brtx[\s_-]*3070\b"], &[], &[r"3070[\s_-]*ti\b"]),
    rule_with("RTX_3060", &[r"\brtx[\s_-]*3060\b"], &[], &[r"3060[\s_-]*ti\b"]),
];
