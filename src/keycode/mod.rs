//! Keycode → label decoding.
//!
//! Several code ranges overlap across firmware generations, so the order in
//! which ranges are tried matters. That order lives in [`PRECEDENCE`]: the
//! first [`Rule`] whose range matches renders the label. [`decode`] is total;
//! anything unmatched renders as uppercase hex.

mod builtin;
mod tables;

pub use tables::{DecoderTables, KeycodeEntry, KeycodeTable, KeycodeTableError};

/// Mod-tap windows selected by the high byte
const MOD_TAP_WINDOWS: &[(u8, &str)] = &[
    (0x61, "LCtrl"),
    (0x62, "LSft"),
    (0x64, "LAlt"),
    (0x66, "LSA"),
    (0x68, "LGui"),
    (0x71, "RCtrl"),
    (0x72, "RSft"),
    (0x74, "RAlt"),
    (0x78, "RGui"),
];

/// Modifier bits of the packed mod-tap encoding, highest priority first
const MOD_BITS: &[(u16, &str)] = &[
    (0x02, "LSft"),
    (0x20, "RSft"),
    (0x01, "LCtrl"),
    (0x10, "RCtrl"),
    (0x04, "LAlt"),
    (0x40, "RAlt"),
    (0x08, "LGui"),
    (0x80, "RGui"),
];

/// A decoding rule: a code range plus how to render codes in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `0x5200..=0x521F` → `TO(n)`
    ToLayer,
    /// Exact lighting codes with fixed labels
    LightingOverride,
    /// `0x7700..=0x771F` → `M{n}`
    Macro,
    /// `0x61xx`..`0x78xx` windows → modifier over base label
    ModTap,
    /// Keycode table entry
    Direct,
    /// `0x2000..=0x3FFF`, modifier bits in `(code >> 8) & 0x1F`
    PackedModTap,
    /// `0x57xx` → `TD(n)`
    TapDance,
    /// `0x5240..=0x525F` → `TG(n)`
    ToggleLayer,
    /// `0x5260..=0x527F` → `TT(n)`
    TapToggle,
    /// `0x5280..=0x529F` → `OSL(n)`
    OneShotLayer,
    /// `0x4000..=0x4FFF` → `LT(layer)` over base label
    LayerTap,
    /// `0x5D00..=0x5D29` → enumerated RGB label
    Rgb,
    /// `0x5F12..=0x5F21` → `M{n}`
    LegacyMacro,
    /// `0x5F10`, `0x5F11`
    LegacyFunction,
    /// `0x5F80..=0x5FBF` → `USER{n}`
    User,
    /// `0x5C00`
    Reset,
    /// `0x550x` → `OSM`
    OneShotMod,
    /// Anything else → `0x{HEX}`
    Hex,
}

/// Rules in the order they are tried
pub const PRECEDENCE: [Rule; 18] = [
    Rule::ToLayer,
    Rule::LightingOverride,
    Rule::Macro,
    Rule::ModTap,
    Rule::Direct,
    Rule::PackedModTap,
    Rule::TapDance,
    Rule::ToggleLayer,
    Rule::TapToggle,
    Rule::OneShotLayer,
    Rule::LayerTap,
    Rule::Rgb,
    Rule::LegacyMacro,
    Rule::LegacyFunction,
    Rule::User,
    Rule::Reset,
    Rule::OneShotMod,
    Rule::Hex,
];

fn mod_tap_name(code: u16) -> Option<&'static str> {
    let high = (code >> 8) as u8;
    MOD_TAP_WINDOWS
        .iter()
        .find(|&&(window, _)| window == high)
        .map(|&(_, name)| name)
}

fn packed_mod_name(mods: u16) -> &'static str {
    MOD_BITS
        .iter()
        .find(|&&(bit, _)| mods & bit != 0)
        .map(|&(_, name)| name)
        .unwrap_or("Mod")
}

impl Rule {
    /// Whether `code` falls in this rule's range
    pub fn matches(self, code: u16, tables: &DecoderTables) -> bool {
        match self {
            Rule::ToLayer => (0x5200..=0x521F).contains(&code),
            Rule::LightingOverride => tables.lighting.contains_key(&code),
            Rule::Macro => (0x7700..=0x771F).contains(&code),
            Rule::ModTap => mod_tap_name(code).is_some(),
            Rule::Direct => tables.keycodes.contains(code),
            Rule::PackedModTap => (0x2000..=0x3FFF).contains(&code),
            Rule::TapDance => code & 0xFF00 == 0x5700,
            Rule::ToggleLayer => (0x5240..=0x525F).contains(&code),
            Rule::TapToggle => (0x5260..=0x527F).contains(&code),
            Rule::OneShotLayer => (0x5280..=0x529F).contains(&code),
            Rule::LayerTap => (0x4000..=0x4FFF).contains(&code),
            Rule::Rgb => (0x5D00..=0x5D29).contains(&code),
            Rule::LegacyMacro => (0x5F12..=0x5F21).contains(&code),
            Rule::LegacyFunction => code == 0x5F10 || code == 0x5F11,
            Rule::User => (0x5F80..=0x5FBF).contains(&code),
            Rule::Reset => code == 0x5C00,
            Rule::OneShotMod => code & 0xFFF0 == 0x5500,
            Rule::Hex => true,
        }
    }

    /// Render `code`; only meaningful when [`Rule::matches`] holds
    pub fn render(self, code: u16, tables: &DecoderTables) -> String {
        let base = || tables.rich_label(code & 0xFF).unwrap_or_default();
        match self {
            Rule::ToLayer => format!("TO({})", code & 0x1F),
            Rule::LightingOverride => tables.lighting.get(&code).cloned().unwrap_or_default(),
            Rule::Macro => format!("M{}", code - 0x7700),
            Rule::ModTap => format!("{}\n{}", mod_tap_name(code).unwrap_or("Mod"), base()),
            Rule::Direct => tables.rich_label(code).unwrap_or_default(),
            Rule::PackedModTap => {
                format!("{}\n{}", packed_mod_name((code >> 8) & 0x1F), base())
            }
            Rule::TapDance => format!("TD({})", code & 0xFF),
            Rule::ToggleLayer => format!("TG({})", code & 0x1F),
            Rule::TapToggle => format!("TT({})", code & 0x1F),
            Rule::OneShotLayer => format!("OSL({})", code & 0x1F),
            Rule::LayerTap => {
                format!("LT({})\n{}", (code >> 8) & 0xF, base().replacen('\n', "", 1))
            }
            Rule::Rgb => tables
                .rgb
                .get(usize::from(code - 0x5D00))
                .cloned()
                .unwrap_or_else(|| "RGB".to_string()),
            Rule::LegacyMacro => format!("M{}", code - 0x5F12),
            Rule::LegacyFunction => {
                if code == 0x5F10 {
                    "FN_MO13".to_string()
                } else {
                    "FN_MO23".to_string()
                }
            }
            Rule::User => format!("USER{}", code - 0x5F80),
            Rule::Reset => "Reset".to_string(),
            Rule::OneShotMod => "OSM".to_string(),
            Rule::Hex => format!("0x{:X}", code),
        }
    }
}

/// First rule in [`PRECEDENCE`] matching `code`
pub fn classify(code: u16, tables: &DecoderTables) -> Rule {
    PRECEDENCE
        .iter()
        .copied()
        .find(|rule| rule.matches(code, tables))
        .unwrap_or(Rule::Hex)
}

/// Decode a raw 16-bit keycode into its display label
///
/// Labels may span two lines (`"LCtrl\nA"`, `"!\n1"`).
pub fn decode(code: u16, tables: &DecoderTables) -> String {
    classify(code, tables).render(code, tables)
}

/// Whether a label is the bare hex fallback
pub fn is_hex_label(label: &str) -> bool {
    label
        .strip_prefix("0x")
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Parse a code given as `0x`-prefixed hex or decimal
pub fn parse_code(s: &str) -> Option<u16> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(code: u16) -> String {
        decode(code, &DecoderTables::builtin())
    }

    #[test]
    fn test_direct_labels() {
        assert_eq!(d(0x0004), "A");
        assert_eq!(d(0x001E), "!\n1");
        assert_eq!(d(0x0028), "Enter");
        assert_eq!(d(0x0000), "");
    }

    #[test]
    fn test_to_layer_range() {
        for code in 0x5200..=0x521F {
            assert_eq!(d(code), format!("TO({})", code & 0x1F));
        }
    }

    #[test]
    fn test_lighting_overrides_beat_mod_tap() {
        assert_eq!(d(0x7820), "RGB Toggle");
        assert_eq!(d(0x7828), "Bright -");
        assert_eq!(d(0x7802), "Sat -");
        // not overridden: plain RGui mod-tap
        assert_eq!(d(0x7804), "RGui\nA");
    }

    #[test]
    fn test_macros() {
        assert_eq!(d(0x7700), "M0");
        assert_eq!(d(0x771F), "M31");
        assert_eq!(d(0x5F12), "M0");
        assert_eq!(d(0x5F21), "M15");
    }

    #[test]
    fn test_mod_tap_windows() {
        assert_eq!(d(0x6104), "LCtrl\nA");
        assert_eq!(d(0x621E), "LSft\n!\n1");
        assert_eq!(d(0x6629), "LSA\nEsc");
        assert_eq!(d(0x7450), "RAlt\nLeft");
        assert_eq!(d(0x61FF), "LCtrl\n");
    }

    #[test]
    fn test_packed_mod_tap_priority() {
        // LCtrl|LShift: shift wins
        assert_eq!(d(0x2304), "LSft\nA");
        assert_eq!(d(0x2104), "LCtrl\nA");
        assert_eq!(d(0x3004), "RCtrl\nA");
        assert_eq!(d(0x2804), "LGui\nA");
        assert_eq!(d(0x2029), "Mod\nEsc");
    }

    #[test]
    fn test_layer_keys() {
        assert_eq!(d(0x5703), "TD(3)");
        assert_eq!(d(0x5241), "TG(1)");
        assert_eq!(d(0x5262), "TT(2)");
        assert_eq!(d(0x5283), "OSL(3)");
    }

    #[test]
    fn test_layer_tap_range() {
        let tables = DecoderTables::builtin();
        for code in 0x4000..=0x4FFFu16 {
            let label = decode(code, &tables);
            assert!(label.starts_with("LT("), "{:#06X} -> {}", code, label);
            assert!(label.contains(&((code >> 8) & 0xF).to_string()));
        }
        assert_eq!(d(0x412C), "LT(1)\nSpace");
        assert_eq!(d(0x421E), "LT(2)\n!1");
    }

    #[test]
    fn test_rgb_range() {
        assert_eq!(d(0x5D00), "RGB Toggle");
        assert_eq!(d(0x5D01), "RGB\nMode +");
        assert_eq!(d(0x5D13), "RGB M_T");
        assert_eq!(d(0x5D14), "RGB");
        assert_eq!(d(0x5D29), "RGB");
    }

    #[test]
    fn test_fixed_codes() {
        assert_eq!(d(0x5F10), "FN_MO13");
        assert_eq!(d(0x5F11), "FN_MO23");
        assert_eq!(d(0x5F80), "USER0");
        assert_eq!(d(0x5FBF), "USER63");
        assert_eq!(d(0x5C00), "Reset");
        assert_eq!(d(0x5501), "OSM");
    }

    #[test]
    fn test_hex_fallback() {
        assert_eq!(d(0x7E00), "0x7E00");
        assert_eq!(d(0x00FF), "0xFF");
        assert_eq!(d(0x5D2A), "0x5D2A");
        assert!(is_hex_label(&d(0xABCD)));
    }

    #[test]
    fn test_direct_table_wins_over_generic_ranges() {
        let custom = KeycodeTable::from_json_str(r#"{"23552": {"label": "QK_BOOT"}}"#).unwrap();
        let tables = DecoderTables::with_keycodes(KeycodeTable::builtin().merged(custom));
        assert_eq!(classify(0x5C00, &tables), Rule::Direct);
        assert_eq!(decode(0x5C00, &tables), "QK_BOOT");
    }

    #[test]
    fn test_mod_tap_not_masked_by_direct_entry() {
        let custom = KeycodeTable::from_json_str(r#"{"24836": {"label": "LCTL_T(A)"}}"#).unwrap();
        let tables = DecoderTables::with_keycodes(custom);
        assert_eq!(classify(0x6104, &tables), Rule::ModTap);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let tables = DecoderTables::builtin();
        for code in (0..=u16::MAX).step_by(97) {
            assert_eq!(decode(code, &tables), decode(code, &tables));
        }
    }

    #[test]
    fn test_precedence_ends_with_catch_all() {
        assert_eq!(PRECEDENCE.last(), Some(&Rule::Hex));
        let tables = DecoderTables::builtin();
        assert!((0..=u16::MAX).all(|c| Rule::Hex.matches(c, &tables)));
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code("0x6104"), Some(0x6104));
        assert_eq!(parse_code("4"), Some(4));
        assert_eq!(parse_code("0xZZ"), None);
        assert_eq!(parse_code("70000"), None);
    }
}
