//! OpenPGP packet header inspection.
//!
//! Walks the outer packets of a message, without decrypting anything, to
//! spot encryption containers the engine must not be trusted with.

use base64::Engine as _;
use tracing::trace;

const ARMOR_BEGIN: &str = "-----BEGIN PGP MESSAGE-----";
const ARMOR_END: &str = "-----END PGP MESSAGE-----";

const TAG_PKESK: u8 = 1;
const TAG_SKESK: u8 = 3;
const TAG_SED: u8 = 9;
const TAG_MARKER: u8 = 10;
const TAG_SEIPD: u8 = 18;
const TAG_AEAD: u8 = 20;

/// Outcome of inspecting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structure {
    /// Nothing unusual before the encrypted payload
    Standard,
    /// Non-standard AEAD container, with a description
    NonStandardAead(String),
}

/// Header of one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    tag: u8,
    /// Offset of the body within the message
    body: usize,
    /// Body length; `None` for partial or indeterminate lengths
    len: Option<usize>,
}

/// Inspect a binary or ASCII-armored message.
///
/// Returns `None` when the bytes do not parse as OpenPGP packets; the
/// engine then gets the final word.
pub fn inspect(message: &[u8]) -> Option<Structure> {
    let binary = dearmor(message)?;
    let data = binary.as_deref().unwrap_or(message);

    let mut offset = 0;
    while offset < data.len() {
        let header = parse_header(data, offset)?;
        let body = data.get(header.body..)?;
        trace!(tag = header.tag, len = ?header.len, "packet");

        match header.tag {
            TAG_PKESK | TAG_MARKER => {}
            TAG_SKESK => {
                if body.first() == Some(&5) {
                    return Some(Structure::NonStandardAead(
                        "version 5 symmetric-key session packet (LibrePGP AEAD)".to_string(),
                    ));
                }
            }
            TAG_AEAD => return Some(Structure::NonStandardAead(describe_aead(body))),
            TAG_SEIPD | TAG_SED => return Some(Structure::Standard),
            // compressed, literal, signed: not an encrypted message we care about
            _ => return Some(Structure::Standard),
        }

        offset = header.body.checked_add(header.len?)?;
    }

    Some(Structure::Standard)
}

/// Strip ASCII armor. `Some(None)` means the input was not armored.
fn dearmor(message: &[u8]) -> Option<Option<Vec<u8>>> {
    let text = match std::str::from_utf8(message) {
        Ok(text) if text.trim_start().starts_with(ARMOR_BEGIN) => text,
        _ => return Some(None),
    };

    let mut lines = text.lines().map(str::trim).skip_while(|l| *l != ARMOR_BEGIN);
    lines.next();
    // armor headers end at the first blank line
    let mut body = String::new();
    let mut in_headers = true;
    for line in lines {
        if line.starts_with(ARMOR_END) || line.starts_with('=') {
            break;
        }
        if in_headers {
            if line.is_empty() {
                in_headers = false;
            } else if !line.contains(": ") {
                in_headers = false;
                body.push_str(line);
            }
            continue;
        }
        body.push_str(line);
    }

    base64::engine::general_purpose::STANDARD
        .decode(body.as_bytes())
        .ok()
        .map(Some)
}

fn parse_header(data: &[u8], offset: usize) -> Option<Header> {
    let first = *data.get(offset)?;
    if first & 0x80 == 0 {
        return None;
    }

    if first & 0x40 != 0 {
        // new format
        let tag = first & 0x3f;
        let o1 = *data.get(offset + 1)? as usize;
        let (len, header_len) = match o1 {
            0..=191 => (Some(o1), 2),
            192..=223 => {
                let o2 = *data.get(offset + 2)? as usize;
                (Some(((o1 - 192) << 8) + o2 + 192), 3)
            }
            255 => {
                let bytes = data.get(offset + 2..offset + 6)?;
                let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                (Some(len as usize), 6)
            }
            // partial body length
            _ => (None, 2),
        };
        Some(Header {
            tag,
            body: offset + header_len,
            len,
        })
    } else {
        // old format
        let tag = (first >> 2) & 0x0f;
        let (len, header_len) = match first & 0x03 {
            0 => (Some(*data.get(offset + 1)? as usize), 2),
            1 => {
                let bytes = data.get(offset + 1..offset + 3)?;
                (Some(u16::from_be_bytes([bytes[0], bytes[1]]) as usize), 3)
            }
            2 => {
                let bytes = data.get(offset + 1..offset + 5)?;
                let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                (Some(len as usize), 5)
            }
            _ => (None, 1),
        };
        Some(Header {
            tag,
            body: offset + header_len,
            len,
        })
    }
}

fn describe_aead(body: &[u8]) -> String {
    let version = body.first().copied().unwrap_or(0);
    let cipher = body.get(1).copied().map(cipher_name).unwrap_or("unknown cipher");
    let mode = body.get(2).copied().map(aead_name).unwrap_or("unknown mode");
    format!(
        "AEAD encrypted data packet (version {}, {} with {})",
        version, mode, cipher
    )
}

fn aead_name(id: u8) -> &'static str {
    match id {
        1 => "EAX",
        2 => "OCB",
        3 => "GCM",
        _ => "unknown mode",
    }
}

fn cipher_name(id: u8) -> &'static str {
    match id {
        7 => "AES-128",
        8 => "AES-192",
        9 => "AES-256",
        10 => "Twofish",
        11 => "Camellia-128",
        12 => "Camellia-192",
        13 => "Camellia-256",
        _ => "unknown cipher",
    }
}
