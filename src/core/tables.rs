//! Fixed lookup tables for the default EBCDIC code table.

/// Hollerith word for every EBCDIC byte, indexed by the byte value.
///
/// Bit 11 is row 12, bit 10 is row 11, bit 9 is row 0 and bit 0 is row 9.
/// The table is a bijection between the 256 EBCDIC code points and 256
/// distinct hole patterns.
#[rustfmt::skip]
pub(crate) const EBCDIC_TO_HOLLERITH: [u16; 256] = [
    0xB03, 0x901, 0x881, 0x841, 0x821, 0x811, 0x809, 0x805,
    0x803, 0x903, 0x883, 0x843, 0x823, 0x813, 0x80B, 0x807,
    0xD03, 0x501, 0x481, 0x441, 0x421, 0x411, 0x409, 0x405,
    0x403, 0x503, 0x483, 0x443, 0x423, 0x413, 0x40B, 0x407,
    0x703, 0x301, 0x281, 0x241, 0x221, 0x211, 0x209, 0x205,
    0x203, 0x303, 0x283, 0x243, 0x223, 0x213, 0x20B, 0x207,
    0xF03, 0x101, 0x081, 0x041, 0x021, 0x011, 0x009, 0x005,
    0x003, 0x103, 0x083, 0x043, 0x023, 0x013, 0x00B, 0x007,
    0x000, 0xB01, 0xA81, 0xA41, 0xA21, 0xA11, 0xA09, 0xA05,
    0xA03, 0x902, 0x882, 0x842, 0x822, 0x812, 0x80A, 0x806,
    0x800, 0xD01, 0xC81, 0xC41, 0xC21, 0xC11, 0xC09, 0xC05,
    0xC03, 0x502, 0x482, 0x442, 0x422, 0x412, 0x40A, 0x406,
    0x400, 0x300, 0x681, 0x641, 0x621, 0x611, 0x609, 0x605,
    0x603, 0x302, 0xC00, 0x242, 0x222, 0x212, 0x20A, 0x206,
    0xE00, 0xF01, 0xE81, 0xE41, 0xE21, 0xE11, 0xE09, 0xE05,
    0xE03, 0x102, 0x082, 0x042, 0x022, 0x012, 0x00A, 0x006,
    0xB02, 0xB00, 0xA80, 0xA40, 0xA20, 0xA10, 0xA08, 0xA04,
    0xA02, 0xA01, 0xA82, 0xA42, 0xA22, 0xA12, 0xA0A, 0xA06,
    0xD02, 0xD00, 0xC80, 0xC40, 0xC20, 0xC10, 0xC08, 0xC04,
    0xC02, 0xC01, 0xC82, 0xC42, 0xC22, 0xC12, 0xC0A, 0xC06,
    0x702, 0x700, 0x680, 0x640, 0x620, 0x610, 0x608, 0x604,
    0x602, 0x601, 0x682, 0x642, 0x622, 0x612, 0x60A, 0x606,
    0xF02, 0xF00, 0xE80, 0xE40, 0xE20, 0xE10, 0xE08, 0xE04,
    0xE02, 0xE01, 0xE82, 0xE42, 0xE22, 0xE12, 0xE0A, 0xE06,
    0xA00, 0x900, 0x880, 0x840, 0x820, 0x810, 0x808, 0x804,
    0x802, 0x801, 0xA83, 0xA43, 0xA23, 0xA13, 0xA0B, 0xA07,
    0x600, 0x500, 0x480, 0x440, 0x420, 0x410, 0x408, 0x404,
    0x402, 0x401, 0xC83, 0xC43, 0xC23, 0xC13, 0xC0B, 0xC07,
    0x282, 0x701, 0x280, 0x240, 0x220, 0x210, 0x208, 0x204,
    0x202, 0x201, 0x683, 0x643, 0x623, 0x613, 0x60B, 0x607,
    0x200, 0x100, 0x080, 0x040, 0x020, 0x010, 0x008, 0x004,
    0x002, 0x001, 0xE83, 0xE43, 0xE23, 0xE13, 0xE0B, 0xE07,
];

/// Code page 037 (US/Canada EBCDIC) to Unicode.
#[rustfmt::skip]
pub(crate) const CP037_TO_UNICODE: [char; 256] = [
    '\u{00}', '\u{01}', '\u{02}', '\u{03}', '\u{9C}', '\u{09}', '\u{86}', '\u{7F}',
    '\u{97}', '\u{8D}', '\u{8E}', '\u{0B}', '\u{0C}', '\u{0D}', '\u{0E}', '\u{0F}',
    '\u{10}', '\u{11}', '\u{12}', '\u{13}', '\u{9D}', '\u{85}', '\u{08}', '\u{87}',
    '\u{18}', '\u{19}', '\u{92}', '\u{8F}', '\u{1C}', '\u{1D}', '\u{1E}', '\u{1F}',
    '\u{80}', '\u{81}', '\u{82}', '\u{83}', '\u{84}', '\u{0A}', '\u{17}', '\u{1B}',
    '\u{88}', '\u{89}', '\u{8A}', '\u{8B}', '\u{8C}', '\u{05}', '\u{06}', '\u{07}',
    '\u{90}', '\u{91}', '\u{16}', '\u{93}', '\u{94}', '\u{95}', '\u{96}', '\u{04}',
    '\u{98}', '\u{99}', '\u{9A}', '\u{9B}', '\u{14}', '\u{15}', '\u{9E}', '\u{1A}',
    '\u{20}', '\u{A0}', '\u{E2}', '\u{E4}', '\u{E0}', '\u{E1}', '\u{E3}', '\u{E5}',
    '\u{E7}', '\u{F1}', '\u{A2}', '\u{2E}', '\u{3C}', '\u{28}', '\u{2B}', '\u{7C}',
    '\u{26}', '\u{E9}', '\u{EA}', '\u{EB}', '\u{E8}', '\u{ED}', '\u{EE}', '\u{EF}',
    '\u{EC}', '\u{DF}', '\u{21}', '\u{24}', '\u{2A}', '\u{29}', '\u{3B}', '\u{AC}',
    '\u{2D}', '\u{2F}', '\u{C2}', '\u{C4}', '\u{C0}', '\u{C1}', '\u{C3}', '\u{C5}',
    '\u{C7}', '\u{D1}', '\u{A6}', '\u{2C}', '\u{25}', '\u{5F}', '\u{3E}', '\u{3F}',
    '\u{F8}', '\u{C9}', '\u{CA}', '\u{CB}', '\u{C8}', '\u{CD}', '\u{CE}', '\u{CF}',
    '\u{CC}', '\u{60}', '\u{3A}', '\u{23}', '\u{40}', '\u{27}', '\u{3D}', '\u{22}',
    '\u{D8}', '\u{61}', '\u{62}', '\u{63}', '\u{64}', '\u{65}', '\u{66}', '\u{67}',
    '\u{68}', '\u{69}', '\u{AB}', '\u{BB}', '\u{F0}', '\u{FD}', '\u{FE}', '\u{B1}',
    '\u{B0}', '\u{6A}', '\u{6B}', '\u{6C}', '\u{6D}', '\u{6E}', '\u{6F}', '\u{70}',
    '\u{71}', '\u{72}', '\u{AA}', '\u{BA}', '\u{E6}', '\u{B8}', '\u{C6}', '\u{A4}',
    '\u{B5}', '\u{7E}', '\u{73}', '\u{74}', '\u{75}', '\u{76}', '\u{77}', '\u{78}',
    '\u{79}', '\u{7A}', '\u{A1}', '\u{BF}', '\u{D0}', '\u{DD}', '\u{DE}', '\u{AE}',
    '\u{5E}', '\u{A3}', '\u{A5}', '\u{B7}', '\u{A9}', '\u{A7}', '\u{B6}', '\u{BC}',
    '\u{BD}', '\u{BE}', '\u{5B}', '\u{5D}', '\u{AF}', '\u{A8}', '\u{B4}', '\u{D7}',
    '\u{7B}', '\u{41}', '\u{42}', '\u{43}', '\u{44}', '\u{45}', '\u{46}', '\u{47}',
    '\u{48}', '\u{49}', '\u{AD}', '\u{F4}', '\u{F6}', '\u{F2}', '\u{F3}', '\u{F5}',
    '\u{7D}', '\u{4A}', '\u{4B}', '\u{4C}', '\u{4D}', '\u{4E}', '\u{4F}', '\u{50}',
    '\u{51}', '\u{52}', '\u{B9}', '\u{FB}', '\u{FC}', '\u{F9}', '\u{FA}', '\u{FF}',
    '\u{5C}', '\u{F7}', '\u{53}', '\u{54}', '\u{55}', '\u{56}', '\u{57}', '\u{58}',
    '\u{59}', '\u{5A}', '\u{B2}', '\u{D4}', '\u{D6}', '\u{D2}', '\u{D3}', '\u{D5}',
    '\u{30}', '\u{31}', '\u{32}', '\u{33}', '\u{34}', '\u{35}', '\u{36}', '\u{37}',
    '\u{38}', '\u{39}', '\u{B3}', '\u{DB}', '\u{DC}', '\u{D9}', '\u{DA}', '\u{9F}',
];
