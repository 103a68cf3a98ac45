//! Minimal IPTC-IIM reader for JPEG and TIFF files.
//!
//! Extracts the Record 2 datasets the gallery uses:
//! - Keywords (2:25), repeatable, collected in file order
//! - DateCreated (2:55), `CCYYMMDD`
//! - City (2:90)
//! - Province/State (2:95)
//!
//! For JPEG: reads from the APP13 marker (Photoshop 8BIM resource 0x0404).
//! For TIFF: reads IFD tag 33723 (IPTC-NAA, raw IIM bytes), falling back to
//! tag 34377 (Photoshop image resources).

/// Raw IPTC values, trimmed but otherwise unprocessed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IptcData {
    pub keywords: Vec<String>,
    pub date_created: Option<String>,
    pub city: Option<String>,
    pub province_state: Option<String>,
}

impl IptcData {
    fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.date_created.is_none()
            && self.city.is_none()
            && self.province_state.is_none()
    }
}

const DATASET_KEYWORDS: u8 = 25;
const DATASET_DATE_CREATED: u8 = 55;
const DATASET_CITY: u8 = 90;
const DATASET_PROVINCE_STATE: u8 = 95;

/// Read IPTC from file bytes, dispatching on the lower-cased extension.
/// Formats without an IPTC container yield empty data.
pub fn read_iptc(extension: &str, bytes: &[u8]) -> IptcData {
    match extension {
        "jpg" | "jpeg" => read_iptc_from_jpeg(bytes),
        "tif" | "tiff" => read_iptc_from_tiff(bytes),
        _ => IptcData::default(),
    }
}

// ---------------------------------------------------------------------------
// IIM records
// ---------------------------------------------------------------------------

/// Parse raw IPTC-IIM bytes.
///
/// Each dataset is `0x1C, record, dataset, len_hi, len_lo, data...`.
fn parse_iptc_iim(data: &[u8]) -> IptcData {
    let mut result = IptcData::default();
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != 0x1C {
            pos += 1;
            continue;
        }

        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;

        if pos + length > data.len() {
            break;
        }

        if record == 2 {
            let value = String::from_utf8_lossy(&data[pos..pos + length])
                .trim()
                .to_string();

            if !value.is_empty() {
                match dataset {
                    DATASET_KEYWORDS => result.keywords.push(value),
                    DATASET_DATE_CREATED => result.date_created = Some(value),
                    DATASET_CITY => result.city = Some(value),
                    DATASET_PROVINCE_STATE => result.province_state = Some(value),
                    _ => {}
                }
            }
        }

        pos += length;
    }

    result
}

// ---------------------------------------------------------------------------
// JPEG
// ---------------------------------------------------------------------------

fn read_iptc_from_jpeg(data: &[u8]) -> IptcData {
    find_jpeg_app13_iptc(data)
        .map(parse_iptc_iim)
        .unwrap_or_default()
}

const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

/// Walk JPEG markers up to start-of-scan looking for an APP13 segment that
/// carries IPTC data.
fn find_jpeg_app13_iptc(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 0;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF || data[pos + 1] == 0x00 {
            pos += 1;
            continue;
        }

        let marker = data[pos + 1];
        // Fill byte before the real marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0xDA {
            break;
        }
        // Standalone markers carry no length field
        if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            pos += 2;
            continue;
        }
        let seg_end = (pos + 2 + seg_len).min(data.len());

        if marker == 0xED
            && let Some(iptc) = extract_iptc_from_8bim(&data[pos + 4..seg_end])
        {
            return Some(iptc);
        }
        pos += 2 + seg_len;
    }
    None
}

/// Find resource 0x0404 in a Photoshop 8BIM resource block.
///
/// Each resource is `"8BIM"`, a u16 id, a Pascal name padded to even length,
/// a u32 data length, then the data padded to even length.
fn extract_iptc_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;

        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        let pascal_len = data[pos] as usize;
        pos += 1 + pascal_len + ((1 + pascal_len) % 2);

        if pos + 4 > data.len() {
            break;
        }
        let res_len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;

        let end = pos.checked_add(res_len)?;
        if end > data.len() {
            break;
        }
        if resource_id == IPTC_RESOURCE_ID {
            return Some(&data[pos..end]);
        }
        pos = end + (res_len % 2);
    }

    None
}

// ---------------------------------------------------------------------------
// TIFF
// ---------------------------------------------------------------------------

const TAG_IPTC_NAA: u16 = 33723;
const TAG_PHOTOSHOP: u16 = 34377;
/// Upper bound on IFDs followed, so a looping chain can't hang the scan.
const MAX_IFDS: usize = 32;

struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl TiffReader<'_> {
    fn u16_at(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset + 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset + 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }
}

/// Byte size of one value of a TIFF field type.
fn type_size(typ: u16) -> usize {
    match typ {
        3 | 8 => 2,
        4 | 9 | 11 => 4,
        5 | 10 | 12 => 8,
        _ => 1,
    }
}

fn read_iptc_from_tiff(data: &[u8]) -> IptcData {
    let big_endian = match data.get(0..2) {
        Some(b"MM") => true,
        Some(b"II") => false,
        _ => return IptcData::default(),
    };
    let reader = TiffReader { data, big_endian };
    if reader.u16_at(2) != Some(42) {
        return IptcData::default();
    }

    let mut ifd_offset = reader.u32_at(4).unwrap_or(0) as usize;
    for _ in 0..MAX_IFDS {
        if ifd_offset == 0 {
            break;
        }
        let Some(entry_count) = reader.u16_at(ifd_offset) else {
            break;
        };
        let entries_start = ifd_offset + 2;

        for i in 0..entry_count as usize {
            let entry = entries_start + i * 12;
            let (Some(tag), Some(typ), Some(count), Some(value_offset)) = (
                reader.u16_at(entry),
                reader.u16_at(entry + 2),
                reader.u32_at(entry + 4),
                reader.u32_at(entry + 8),
            ) else {
                return IptcData::default();
            };
            if tag != TAG_IPTC_NAA && tag != TAG_PHOTOSHOP {
                continue;
            }

            let value_offset = value_offset as usize;
            let Some(bytes) = (count as usize)
                .checked_mul(type_size(typ))
                .and_then(|len| data.get(value_offset..value_offset.checked_add(len)?))
            else {
                continue;
            };

            let iim = if tag == TAG_IPTC_NAA {
                Some(bytes)
            } else {
                extract_iptc_from_8bim(bytes)
            };
            if let Some(iim) = iim {
                let result = parse_iptc_iim(iim);
                if !result.is_empty() {
                    return result;
                }
            }
        }

        ifd_offset = reader
            .u32_at(entries_start + entry_count as usize * 12)
            .unwrap_or(0) as usize;
    }

    IptcData::default()
}
