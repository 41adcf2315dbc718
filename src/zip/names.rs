//! Entry name decoding and normalization.
//!
//! ZIP containers store names as raw bytes. Bit 11 of the general purpose
//! flags declares UTF-8; without it the bytes are in whatever OEM codepage
//! the archiver's platform used. Which codepage that was cannot be sensed
//! from the container, so the caller picks one up front as a [`NamePolicy`]
//! and every non-UTF-8 name in the run is decoded with it.
//!
//! Decoded names are normalized to forward-slash separators before any
//! comparison. A trailing `/` is the directory marker and is kept.

use crate::error::NameEncodingError;

/// How raw name bytes without the UTF-8 flag are decoded.
///
/// Selected once per verification run; entries that declare UTF-8 ignore
/// the policy entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePolicy {
    /// Treat legacy names as UTF-8 too (and fail on invalid sequences).
    Utf8,
    /// Decode legacy names with a single-byte OEM codepage table.
    LegacyCodepage(Codepage),
}

impl NamePolicy {
    /// Build a legacy-codepage policy, validating the id up front.
    ///
    /// # Errors
    ///
    /// `NameEncodingError::UnsupportedCodepage` if no table exists for `id`.
    pub fn legacy(id: u16) -> Result<Self, NameEncodingError> {
        Codepage::from_id(id).map(NamePolicy::LegacyCodepage)
    }
}

impl Default for NamePolicy {
    fn default() -> Self {
        NamePolicy::Utf8
    }
}

/// A supported single-byte OEM codepage.
///
/// The tables are total: every byte value maps to exactly one char, so
/// legacy decoding itself never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codepage {
    /// OEM United States, the historical default for non-UTF-8 ZIP names.
    Cp437,
    /// OEM Cyrillic.
    Cp866,
}

impl Codepage {
    pub fn from_id(id: u16) -> Result<Self, NameEncodingError> {
        match id {
            437 => Ok(Codepage::Cp437),
            866 => Ok(Codepage::Cp866),
            other => Err(NameEncodingError::UnsupportedCodepage(other)),
        }
    }

    pub fn id(&self) -> u16 {
        match self {
            Codepage::Cp437 => 437,
            Codepage::Cp866 => 866,
        }
    }

    /// Decode raw bytes with this codepage. ASCII maps to itself; the high
    /// half goes through the table.
    pub fn decode(&self, raw: &[u8]) -> String {
        let table = match self {
            Codepage::Cp437 => &CP437_HIGH,
            Codepage::Cp866 => &CP866_HIGH,
        };
        raw.iter()
            .map(|&b| {
                if b < 0x80 {
                    b as char
                } else {
                    table[(b - 0x80) as usize]
                }
            })
            .collect()
    }
}

/// Decode raw name bytes and normalize separators.
///
/// The entry's UTF-8 flag wins over the policy: a name the archiver marked
/// as UTF-8 is decoded as UTF-8 no matter what codepage was configured.
///
/// # Errors
///
/// `NameEncodingError::InvalidUtf8` when the UTF-8 path hits a malformed
/// sequence. The legacy path cannot fail.
pub fn normalize(
    raw: &[u8],
    utf8_flag: bool,
    policy: &NamePolicy,
) -> Result<String, NameEncodingError> {
    let decoded = if utf8_flag {
        decode_utf8(raw)?
    } else {
        match policy {
            NamePolicy::Utf8 => decode_utf8(raw)?,
            NamePolicy::LegacyCodepage(cp) => cp.decode(raw),
        }
    };
    // Some archivers on Windows store backslash separators; comparisons
    // use the canonical forward slash.
    Ok(decoded.replace('\\', "/"))
}

fn decode_utf8(raw: &[u8]) -> Result<String, NameEncodingError> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| NameEncodingError::InvalidUtf8 {
            raw: raw.iter().copied().take(32).collect(),
        })
}

/// CP437 high half (0x80..=0xFF).
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// CP866 high half (0x80..=0xFF).
const CP866_HIGH: [char; 128] = [
    'А', 'Б', 'В', 'Г', 'Д', 'Е', 'Ж', 'З', 'И', 'Й', 'К', 'Л', 'М', 'Н', 'О', 'П', //
    'Р', 'С', 'Т', 'У', 'Ф', 'Х', 'Ц', 'Ч', 'Ш', 'Щ', 'Ъ', 'Ы', 'Ь', 'Э', 'Ю', 'Я', //
    'а', 'б', 'в', 'г', 'д', 'е', 'ж', 'з', 'и', 'й', 'к', 'л', 'м', 'н', 'о', 'п', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'р', 'с', 'т', 'у', 'ф', 'х', 'ц', 'ч', 'ш', 'щ', 'ъ', 'ы', 'ь', 'э', 'ю', 'я', //
    'Ё', 'ё', 'Є', 'є', 'Ї', 'ї', 'Ў', 'ў', '°', '∙', '·', '√', '№', '¤', '■', '\u{a0}',
];
