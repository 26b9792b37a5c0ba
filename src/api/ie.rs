//! Payload information element parsing
//!
//! Payload IEs arrive in data and async indications as a flat byte string.
//! Each element starts with a little-endian 16-bit header:
//!
//! | bits   | long form | short form |
//! |--------|-----------|------------|
//! | 15     | type = 1  | type = 0   |
//! | 11..14 | id        | id (8..14) |
//! | 0..10  | length    | length (0..7) |
//!
//! Parsed elements borrow their content from the input buffer.

use crate::mt::MacStatus;

/// Length of a payload IE header
pub const PAYLOAD_IE_HEADER_LEN: usize = 2;

/// Group id that terminates a payload IE list
pub const PAYLOAD_IE_GROUP_TERM: u8 = 0x0F;

const TYPE_LONG_BIT: u16 = 1 << 15;

/// One payload information element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadIe<'a> {
    /// Long header form
    pub type_long: bool,
    /// Element or sub-element id
    pub id: u8,
    /// Element content
    pub content: &'a [u8],
}

impl PayloadIe<'_> {
    /// Content length in bytes.
    #[must_use]
    pub const fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Unpack a header word into type, id and content length.
#[allow(clippy::cast_possible_truncation)]
const fn unpack_header(header: u16) -> (bool, u8, usize) {
    if header & TYPE_LONG_BIT != 0 {
        (true, ((header >> 11) & 0x0F) as u8, (header & 0x07FF) as usize)
    } else {
        (false, ((header >> 8) & 0x7F) as u8, (header & 0x00FF) as usize)
    }
}

fn parse(mut content: &[u8], group: bool) -> Result<Vec<PayloadIe<'_>>, MacStatus> {
    if content.is_empty() {
        return Err(MacStatus::NO_DATA);
    }

    let mut list = Vec::new();
    while !content.is_empty() {
        let Some((header, rest)) = content.split_first_chunk::<PAYLOAD_IE_HEADER_LEN>() else {
            return Err(MacStatus::NO_DATA);
        };
        let (type_long, id, len) = unpack_header(u16::from_le_bytes(*header));

        if group {
            if !type_long {
                return Err(MacStatus::UNSUPPORTED);
            }
            if id == PAYLOAD_IE_GROUP_TERM {
                break;
            }
        }

        if rest.len() < len {
            return Err(MacStatus::NO_DATA);
        }
        let (ie_content, rest) = rest.split_at(len);
        list.push(PayloadIe {
            type_long,
            id,
            content: ie_content,
        });
        content = rest;
    }
    Ok(list)
}

/// Parse a list of payload group IEs.
///
/// Every element must use the long header. Parsing stops at the
/// termination group. On failure no partial list is returned:
/// [`MacStatus::NO_DATA`] for an empty or truncated buffer,
/// [`MacStatus::UNSUPPORTED`] for a short header.
pub fn parse_payload_group_ies(payload: &[u8]) -> Result<Vec<PayloadIe<'_>>, MacStatus> {
    parse(payload, true)
}

/// Parse the sub-IEs inside a group IE's content.
///
/// Both header forms are accepted; parsing stops when the content is used up.
pub fn parse_payload_sub_ies(content: &[u8]) -> Result<Vec<PayloadIe<'_>>, MacStatus> {
    parse(content, false)
}

/// Release a parsed list.
///
/// Dropping the list has the same effect.
pub fn free_ie_list(list: Vec<PayloadIe<'_>>) {
    drop(list);
}
