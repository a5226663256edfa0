//! Style collaborator used by the legacy decoder

/// Answers the few style questions cell decoding depends on
pub trait StyleLookup {
    /// Whether the workbook defines an XF table.
    ///
    /// BIFF2 files without one carry formatting inline in each cell record.
    fn has_cell_xfs(&self) -> bool;

    /// Windows code page of the font used by XF `xf_id`, if the font
    /// declares a character set
    fn font_code_page(&self, xf_id: u32) -> Option<u16>;
}

/// Lookup for sources without style information
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStyles;

impl StyleLookup for NoStyles {
    fn has_cell_xfs(&self) -> bool {
        false
    }

    fn font_code_page(&self, _xf_id: u32) -> Option<u16> {
        None
    }
}

/// Map a FONT record character set to a Windows code page
pub fn charset_to_code_page(charset: u8) -> Option<u16> {
    match charset {
        0 => Some(1252),   // ANSI
        2 => None,         // symbol
        77 => Some(10000), // Mac Roman
        128 => Some(932),  // Shift-JIS
        129 => Some(949),  // Hangul
        130 => Some(1361), // Johab
        134 => Some(936),  // GB2312
        136 => Some(950),  // Big5
        161 => Some(1253), // Greek
        162 => Some(1254), // Turkish
        163 => Some(1258), // Vietnamese
        177 => Some(1255), // Hebrew
        178 => Some(1256), // Arabic
        186 => Some(1257), // Baltic
        204 => Some(1251), // Cyrillic
        222 => Some(874),  // Thai
        238 => Some(1250), // Eastern European
        255 => Some(850),  // OEM
        _ => None,
    }
}
