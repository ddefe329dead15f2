//! Built-in label data
//!
//! Covers the QMK basic range (`0x0000..=0x00FF`) as Vial protocol v6
//! assigns it. Everything above that range is handled by the decoder's rules
//! or by an external keycode file.

/// Basic keycodes
pub const BASIC: &[(u16, &str)] = &[
    (0x0000, ""),
    (0x0001, "▽"),
    (0x0004, "A"),
    (0x0005, "B"),
    (0x0006, "C"),
    (0x0007, "D"),
    (0x0008, "E"),
    (0x0009, "F"),
    (0x000A, "G"),
    (0x000B, "H"),
    (0x000C, "I"),
    (0x000D, "J"),
    (0x000E, "K"),
    (0x000F, "L"),
    (0x0010, "M"),
    (0x0011, "N"),
    (0x0012, "O"),
    (0x0013, "P"),
    (0x0014, "Q"),
    (0x0015, "R"),
    (0x0016, "S"),
    (0x0017, "T"),
    (0x0018, "U"),
    (0x0019, "V"),
    (0x001A, "W"),
    (0x001B, "X"),
    (0x001C, "Y"),
    (0x001D, "Z"),
    (0x001E, "1"),
    (0x001F, "2"),
    (0x0020, "3"),
    (0x0021, "4"),
    (0x0022, "5"),
    (0x0023, "6"),
    (0x0024, "7"),
    (0x0025, "8"),
    (0x0026, "9"),
    (0x0027, "0"),
    (0x0028, "Enter"),
    (0x0029, "Esc"),
    (0x002A, "Bksp"),
    (0x002B, "Tab"),
    (0x002C, "Space"),
    (0x002D, "-"),
    (0x002E, "="),
    (0x002F, "["),
    (0x0030, "]"),
    (0x0031, "\\"),
    (0x0032, "ISO #"),
    (0x0033, ";"),
    (0x0034, "'"),
    (0x0035, "`"),
    (0x0036, ","),
    (0x0037, "."),
    (0x0038, "/"),
    (0x0039, "Caps\nLock"),
    (0x003A, "F1"),
    (0x003B, "F2"),
    (0x003C, "F3"),
    (0x003D, "F4"),
    (0x003E, "F5"),
    (0x003F, "F6"),
    (0x0040, "F7"),
    (0x0041, "F8"),
    (0x0042, "F9"),
    (0x0043, "F10"),
    (0x0044, "F11"),
    (0x0045, "F12"),
    (0x0046, "Print\nScreen"),
    (0x0047, "Scroll\nLock"),
    (0x0048, "Pause"),
    (0x0049, "Insert"),
    (0x004A, "Home"),
    (0x004B, "Page\nUp"),
    (0x004C, "Del"),
    (0x004D, "End"),
    (0x004E, "Page\nDown"),
    (0x004F, "Right"),
    (0x0050, "Left"),
    (0x0051, "Down"),
    (0x0052, "Up"),
    (0x0053, "Num\nLock"),
    (0x0054, "KP /"),
    (0x0055, "KP *"),
    (0x0056, "KP -"),
    (0x0057, "KP +"),
    (0x0058, "KP\nEnter"),
    (0x0059, "KP 1"),
    (0x005A, "KP 2"),
    (0x005B, "KP 3"),
    (0x005C, "KP 4"),
    (0x005D, "KP 5"),
    (0x005E, "KP 6"),
    (0x005F, "KP 7"),
    (0x0060, "KP 8"),
    (0x0061, "KP 9"),
    (0x0062, "KP 0"),
    (0x0063, "KP ."),
    (0x0064, "ISO \\"),
    (0x0065, "Menu"),
    (0x0066, "Power"),
    (0x0067, "KP ="),
    (0x0068, "F13"),
    (0x0069, "F14"),
    (0x006A, "F15"),
    (0x006B, "F16"),
    (0x006C, "F17"),
    (0x006D, "F18"),
    (0x006E, "F19"),
    (0x006F, "F20"),
    (0x0070, "F21"),
    (0x0071, "F22"),
    (0x0072, "F23"),
    (0x0073, "F24"),
    (0x0085, "KP ,"),
    (0x0087, "Ro"),
    (0x0088, "Kana"),
    (0x0089, "¥"),
    (0x008A, "Henkan"),
    (0x008B, "Muhenkan"),
    (0x0090, "Hangul"),
    (0x0091, "Hanja"),
    // System / consumer
    (0x00A5, "Sys\nPower"),
    (0x00A6, "Sys\nSleep"),
    (0x00A7, "Sys\nWake"),
    (0x00A8, "Mute"),
    (0x00A9, "Vol +"),
    (0x00AA, "Vol -"),
    (0x00AB, "Media\nNext"),
    (0x00AC, "Media\nPrev"),
    (0x00AD, "Media\nStop"),
    (0x00AE, "Media\nPlay"),
    (0x00AF, "Media\nSelect"),
    (0x00B0, "Eject"),
    (0x00B1, "Mail"),
    (0x00B2, "Calc"),
    (0x00B3, "My\nComp"),
    (0x00B4, "WWW\nSearch"),
    (0x00B5, "WWW\nHome"),
    (0x00B6, "WWW\nBack"),
    (0x00B7, "WWW\nFwd"),
    (0x00B8, "WWW\nStop"),
    (0x00B9, "WWW\nRefresh"),
    (0x00BA, "WWW\nFav"),
    (0x00BB, "Fast\nFwd"),
    (0x00BC, "Rewind"),
    (0x00BD, "Bright +"),
    (0x00BE, "Bright -"),
    // Mouse keys
    (0x00CD, "Mouse\nUp"),
    (0x00CE, "Mouse\nDown"),
    (0x00CF, "Mouse\nLeft"),
    (0x00D0, "Mouse\nRight"),
    (0x00D1, "Mouse\n1"),
    (0x00D2, "Mouse\n2"),
    (0x00D3, "Mouse\n3"),
    (0x00D4, "Mouse\n4"),
    (0x00D5, "Mouse\n5"),
    (0x00D6, "Mouse\n6"),
    (0x00D7, "Mouse\n7"),
    (0x00D8, "Mouse\n8"),
    (0x00D9, "Wheel\nUp"),
    (0x00DA, "Wheel\nDown"),
    (0x00DB, "Wheel\nLeft"),
    (0x00DC, "Wheel\nRight"),
    (0x00DD, "Accel\n0"),
    (0x00DE, "Accel\n1"),
    (0x00DF, "Accel\n2"),
    // Modifiers
    (0x00E0, "LCtrl"),
    (0x00E1, "LShift"),
    (0x00E2, "LAlt"),
    (0x00E3, "LGui"),
    (0x00E4, "RCtrl"),
    (0x00E5, "RShift"),
    (0x00E6, "RAlt"),
    (0x00E7, "RGui"),
];

/// Unshifted → shifted symbol pairs for stacked legends
pub const SHIFTED: &[(char, char)] = &[
    ('1', '!'),
    ('2', '@'),
    ('3', '#'),
    ('4', '$'),
    ('5', '%'),
    ('6', '^'),
    ('7', '&'),
    ('8', '*'),
    ('9', '('),
    ('0', ')'),
    ('-', '_'),
    ('=', '+'),
    ('[', '{'),
    (']', '}'),
    ('\\', '|'),
    (';', ':'),
    ('\'', '"'),
    (',', '<'),
    ('.', '>'),
    ('/', '?'),
    ('`', '~'),
];

/// Lighting codes whose firmware assignment differs from the generic range
pub const LIGHTING_OVERRIDES: &[(u16, &str)] = &[
    (0x7849, "RGB Toggle"),
    (0x7820, "RGB Toggle"),
    (0x7821, "RGB Mode +"),
    (0x784A, "RGB Mode +"),
    (0x7823, "Hue +"),
    (0x7824, "Hue -"),
    (0x7825, "Sat +"),
    (0x7826, "Sat -"),
    (0x7827, "Bright +"),
    (0x7828, "Bright -"),
    (0x782B, "Hue +"),
    (0x782C, "Hue -"),
    (0x782D, "Sat +"),
    (0x7802, "Sat -"),
    (0x7843, "Bright +"),
    (0x7844, "Bright -"),
];

/// Labels for `0x5D00..` in order
pub const RGB_LABELS: &[&str] = &[
    "RGB Toggle",
    "RGB\nMode +",
    "RGB\nMode -",
    "Hue +",
    "Hue -",
    "Sat +",
    "Sat -",
    "Bright +",
    "Bright -",
    "RGB Spi+",
    "RGB Spi-",
    "RGB M_P",
    "RGB M_B",
    "RGB M_R",
    "RGB M_SW",
    "RGB M_SN",
    "RGB M_K",
    "RGB M_X",
    "RGB M_G",
    "RGB M_T",
];
