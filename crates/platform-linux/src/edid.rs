//! Minimal EDID 1.x base block decoder.
//!
//! Only the fields the display source needs are decoded: vendor id,
//! product code, monitor name, physical size, and the preferred timing.

/// Size of an EDID base block.
pub const EDID_BLOCK_LEN: usize = 128;

const HEADER: [u8; 8] = [0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];
const DESCRIPTOR_OFFSETS: [usize; 4] = [54, 72, 90, 108];
const DESCRIPTOR_LEN: usize = 18;
const TAG_MONITOR_NAME: u8 = 0xfc;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EdidError {
    #[error("EDID block too short: {0} bytes")]
    TooShort(usize),

    #[error("EDID header mismatch")]
    BadHeader,

    #[error("EDID checksum mismatch (sum {0:#04x})")]
    BadChecksum(u8),
}

/// Decoded subset of an EDID base block.
#[derive(Debug, Clone, PartialEq)]
pub struct EdidInfo {
    /// Three-letter PNP manufacturer id, e.g. `"DEL"`.
    pub manufacturer: String,
    pub product_code: u16,
    /// Monitor name descriptor, if present.
    pub name: Option<String>,
    pub width_mm: i32,
    pub height_mm: i32,
    /// Active size of the preferred timing.
    pub preferred_mode: Option<(i32, i32)>,
    /// Refresh rate of the preferred timing in Hz.
    pub refresh_rate: Option<f64>,
}

/// Decode the base block of `data`.
pub fn parse_edid(data: &[u8]) -> Result<EdidInfo, EdidError> {
    if data.len() < EDID_BLOCK_LEN {
        return Err(EdidError::TooShort(data.len()));
    }
    let block = &data[..EDID_BLOCK_LEN];
    if block[..8] != HEADER {
        return Err(EdidError::BadHeader);
    }
    let sum = block.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != 0 {
        return Err(EdidError::BadChecksum(sum));
    }

    let vendor = u16::from_be_bytes([block[8], block[9]]);
    let manufacturer: String = [10u16, 5, 0]
        .iter()
        .map(|shift| {
            let letter = ((vendor >> shift) & 0x1f) as u8;
            (b'A' + letter.saturating_sub(1)) as char
        })
        .collect();
    let product_code = u16::from_le_bytes([block[10], block[11]]);

    // Screen size in centimeters; overridden by the preferred timing below.
    let mut width_mm = block[21] as i32 * 10;
    let mut height_mm = block[22] as i32 * 10;
    let mut name = None;
    let mut preferred_mode = None;
    let mut refresh_rate = None;

    for offset in DESCRIPTOR_OFFSETS {
        let d = &block[offset..offset + DESCRIPTOR_LEN];
        let pixel_clock = u16::from_le_bytes([d[0], d[1]]) as u32;
        if pixel_clock != 0 {
            if preferred_mode.is_some() {
                continue;
            }
            let h_active = d[2] as i32 | ((d[4] as i32 & 0xf0) << 4);
            let h_blank = d[3] as i32 | ((d[4] as i32 & 0x0f) << 8);
            let v_active = d[5] as i32 | ((d[7] as i32 & 0xf0) << 4);
            let v_blank = d[6] as i32 | ((d[7] as i32 & 0x0f) << 8);
            let h_mm = d[12] as i32 | ((d[14] as i32 & 0xf0) << 4);
            let v_mm = d[13] as i32 | ((d[14] as i32 & 0x0f) << 8);

            preferred_mode = Some((h_active, v_active));
            let total = (h_active + h_blank) as f64 * (v_active + v_blank) as f64;
            if total > 0.0 {
                let hz = pixel_clock as f64 * 10_000.0 / total;
                refresh_rate = Some((hz * 100.0).round() / 100.0);
            }
            if h_mm > 0 && v_mm > 0 {
                width_mm = h_mm;
                height_mm = v_mm;
            }
        } else if d[3] == TAG_MONITOR_NAME {
            let text: String = d[5..]
                .iter()
                .take_while(|b| **b != 0x0a)
                .map(|b| *b as char)
                .collect();
            let text = text.trim();
            if !text.is_empty() {
                name = Some(text.to_string());
            }
        }
    }

    Ok(EdidInfo {
        manufacturer,
        product_code,
        name,
        width_mm,
        height_mm,
        preferred_mode,
        refresh_rate,
    })
}
