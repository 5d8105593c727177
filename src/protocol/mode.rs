//! # Flight mode table
//!
//! ArduCopter custom-mode numbers and their display names. Unrecognized numbers render as
//! `UNKNOWN(n)` instead of failing, so a newer autopilot never breaks telemetry.

/// Known multirotor flight modes, keyed by `custom_mode`.
const MODES: &[(u32, &str)] = &[
    (0, "STABILIZE"),
    (1, "ACRO"),
    (2, "ALT_HOLD"),
    (3, "AUTO"),
    (4, "GUIDED"),
    (5, "LOITER"),
    (6, "RTL"),
    (7, "CIRCLE"),
    (9, "LAND"),
    (11, "DRIFT"),
    (13, "SPORT"),
    (14, "FLIP"),
    (15, "AUTOTUNE"),
    (16, "POSHOLD"),
    (17, "BRAKE"),
    (18, "THROW"),
    (19, "AVOID_ADSB"),
    (20, "GUIDED_NOGPS"),
    (21, "SMART_RTL"),
    (22, "FLOWHOLD"),
    (23, "FOLLOW"),
    (24, "ZIGZAG"),
    (25, "SYSTEMID"),
    (26, "AUTOROTATE"),
    (27, "AUTO_RTL"),
    (28, "TURTLE"),
];

/// Display name for a `custom_mode` value.
pub fn mode_name(custom_mode: u32) -> String {
    MODES
        .iter()
        .find(|(number, _)| *number == custom_mode)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("UNKNOWN({custom_mode})"))
}

/// `custom_mode` value for a display name, case-insensitive.
pub fn mode_number(name: &str) -> Option<u32> {
    MODES
        .iter()
        .find(|(_, known)| known.eq_ignore_ascii_case(name))
        .map(|(number, _)| *number)
}

#[cfg(test)]
mod test_mode {
    use super::*;

    #[test]
    fn known_modes_resolve_both_ways() {
        assert_eq!(mode_name(4), "GUIDED");
        assert_eq!(mode_number("GUIDED"), Some(4));
        assert_eq!(mode_number("guided"), Some(4));
        assert_eq!(mode_name(6), "RTL");
        assert_eq!(mode_number("RTL"), Some(6));
    }

    #[test]
    fn unknown_mode_renders_with_number() {
        assert_eq!(mode_name(99), "UNKNOWN(99)");
        assert_eq!(mode_number("WARP"), None);
    }

    #[test]
    fn table_is_consistent() {
        for (number, name) in MODES {
            assert_eq!(mode_number(name), Some(*number));
            assert_eq!(mode_name(*number), *name);
        }
    }
}
