use serde::{Deserialize, Serialize};

pub const GSM7_SEGMENT_CHARS: usize = 160;
pub const UCS2_SEGMENT_CHARS: usize = 70;

/// Character set a composed message will be transmitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmsEncoding {
    Gsm7,
    Ucs2,
}

impl SmsEncoding {
    /// GSM-7 as long as every character fits in Latin-1, UCS-2 otherwise.
    pub fn classify(content: &str) -> Self {
        if content.chars().all(|c| (c as u32) <= 0xFF) {
            SmsEncoding::Gsm7
        } else {
            SmsEncoding::Ucs2
        }
    }

    pub fn segment_capacity(&self) -> usize {
        match self {
            SmsEncoding::Gsm7 => GSM7_SEGMENT_CHARS,
            SmsEncoding::Ucs2 => UCS2_SEGMENT_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEstimate {
    pub encoding: SmsEncoding,
    /// Length in UTF-16 code units.
    pub length: usize,
    pub capacity: usize,
    pub segments: usize,
}

/// An empty body still occupies one segment.
pub fn estimate_segments(content: &str) -> SegmentEstimate {
    let encoding = SmsEncoding::classify(content);
    let length = content.encode_utf16().count();
    let capacity = encoding.segment_capacity();
    let segments = length.div_ceil(capacity).max(1);
    SegmentEstimate {
        encoding,
        length,
        capacity,
        segments,
    }
}
