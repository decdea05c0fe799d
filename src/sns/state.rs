// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registry account layouts.
//!
//! Every name-service account starts with a 96-byte header
//! (`parent || owner || class`) followed by the record payload. Record
//! accounts come in two generations: v1 stores the raw value null-padded,
//! v2 prefixes it with validation metadata.

use std::fmt;

use super::SnsError;
use crate::blockchain::{Pubkey, PUBKEY_BYTES};

/// Size of [`NameRecordHeader`] on chain.
pub const HEADER_LEN: usize = 3 * PUBKEY_BYTES;

/// Fixed prefix of every name-service account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRecordHeader {
    pub parent: Option<Pubkey>,
    pub owner: Pubkey,
    pub class: Option<Pubkey>,
}

impl NameRecordHeader {
    /// Parse the header from raw account data.
    ///
    /// An all-zero parent or class is reported as absent.
    pub fn unpack(data: &[u8]) -> Result<Self, SnsError> {
        if data.len() < HEADER_LEN {
            return Err(SnsError::InvalidData(format!(
                "account holds {} bytes, header needs {HEADER_LEN}",
                data.len()
            )));
        }
        let key = |i: usize| Pubkey::try_from_slice(&data[i * PUBKEY_BYTES..(i + 1) * PUBKEY_BYTES]);
        let non_zero = |key: Pubkey| (!key.is_zero()).then_some(key);

        Ok(Self {
            parent: non_zero(key(0)?),
            owner: key(1)?,
            class: non_zero(key(2)?),
        })
    }
}

/// Payload following the header.
pub fn payload(data: &[u8]) -> &[u8] {
    data.get(HEADER_LEN..).unwrap_or_default()
}

/// Record kinds a domain can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Record {
    Sol,
    Eth,
    Btc,
    Ltc,
    Doge,
    Bsc,
    Injective,
    Url,
    Ipfs,
    Arwv,
    Shdw,
    Email,
    Discord,
    Github,
    Reddit,
    Twitter,
    Telegram,
    Pic,
    Backpack,
}

impl Record {
    pub const ALL: [Record; 19] = [
        Record::Sol,
        Record::Eth,
        Record::Btc,
        Record::Ltc,
        Record::Doge,
        Record::Bsc,
        Record::Injective,
        Record::Url,
        Record::Ipfs,
        Record::Arwv,
        Record::Shdw,
        Record::Email,
        Record::Discord,
        Record::Github,
        Record::Reddit,
        Record::Twitter,
        Record::Telegram,
        Record::Pic,
        Record::Backpack,
    ];

    /// Label used in record names and by the lookup API.
    pub fn as_str(self) -> &'static str {
        match self {
            Record::Sol => "SOL",
            Record::Eth => "ETH",
            Record::Btc => "BTC",
            Record::Ltc => "LTC",
            Record::Doge => "DOGE",
            Record::Bsc => "BSC",
            Record::Injective => "INJ",
            Record::Url => "url",
            Record::Ipfs => "IPFS",
            Record::Arwv => "ARWV",
            Record::Shdw => "SHDW",
            Record::Email => "email",
            Record::Discord => "discord",
            Record::Github => "github",
            Record::Reddit => "reddit",
            Record::Twitter => "twitter",
            Record::Telegram => "telegram",
            Record::Pic => "pic",
            Record::Backpack => "backpack",
        }
    }

    /// Case-insensitive inverse of [`Record::as_str`].
    pub fn parse(label: &str) -> Option<Record> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(label))
    }

    /// Whether the record holds a wallet address.
    pub fn is_wallet(self) -> bool {
        matches!(
            self,
            Record::Sol
                | Record::Eth
                | Record::Btc
                | Record::Ltc
                | Record::Doge
                | Record::Bsc
                | Record::Injective
        )
    }

    fn is_evm(self) -> bool {
        matches!(self, Record::Eth | Record::Bsc)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const EVM_ADDRESS_LEN: usize = 20;

/// Decode the payload of a v1 record account.
///
/// Returns `None` for an empty (all-null) record.
pub fn decode_v1(record: Record, data: &[u8]) -> Result<Option<String>, SnsError> {
    let content = payload(data);
    if content.iter().all(|b| *b == 0) {
        return Ok(None);
    }

    let value = match record {
        Record::Sol => {
            let key = content
                .get(..PUBKEY_BYTES)
                .ok_or_else(|| SnsError::InvalidData("SOL record too short".to_string()))?;
            bs58::encode(key).into_string()
        }
        r if r.is_evm() => {
            let address = content
                .get(..EVM_ADDRESS_LEN)
                .ok_or_else(|| SnsError::InvalidData(format!("{r} record too short")))?;
            format!("0x{}", hex::encode(address))
        }
        _ => {
            let end = content.iter().position(|b| *b == 0).unwrap_or(content.len());
            utf8(record, &content[..end])?
        }
    };
    Ok(Some(value))
}

/// Validation scheme of a v2 record, which fixes the length of its id.
fn validation_len(tag: u16) -> Result<usize, SnsError> {
    match tag {
        0 => Ok(0),
        1 | 3 => Ok(PUBKEY_BYTES),
        2 => Ok(EVM_ADDRESS_LEN),
        other => Err(SnsError::InvalidData(format!("unknown validation {other}"))),
    }
}

/// Decode the payload of a v2 record account.
///
/// Layout after the header: `u16 staleness validation`, `u16 RoA
/// validation`, `u32 content length`, the two validation ids, the content.
pub fn decode_v2(record: Record, data: &[u8]) -> Result<Option<String>, SnsError> {
    let body = payload(data);
    let short = || SnsError::InvalidData(format!("{record} v2 record truncated"));

    let fixed = body.get(..8).ok_or_else(short)?;
    let staleness = validation_len(u16::from_le_bytes([fixed[0], fixed[1]]))?;
    let roa = validation_len(u16::from_le_bytes([fixed[2], fixed[3]]))?;
    let content_len = u32::from_le_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]) as usize;

    let start = 8 + staleness + roa;
    let content = body.get(start..start + content_len).ok_or_else(short)?;
    if content.is_empty() {
        return Ok(None);
    }

    let value = match record {
        Record::Sol if content.len() == PUBKEY_BYTES => bs58::encode(content).into_string(),
        r if r.is_evm() && content.len() == EVM_ADDRESS_LEN => {
            format!("0x{}", hex::encode(content))
        }
        Record::Sol => return Err(SnsError::InvalidData("SOL record is not a key".to_string())),
        r if r.is_evm() => {
            return Err(SnsError::InvalidData(format!("{r} record is not an address")))
        }
        _ => utf8(record, content)?,
    };
    Ok(Some(value))
}

fn utf8(record: Record, bytes: &[u8]) -> Result<String, SnsError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| SnsError::InvalidData(format!("{record} record is not UTF-8")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(owner: Pubkey, class: Pubkey) -> Vec<u8> {
        let mut data = vec![7u8; 32];
        data.extend_from_slice(owner.as_bytes());
        data.extend_from_slice(class.as_bytes());
        data
    }

    #[test]
    fn unpacks_header() {
        let owner = Pubkey::new_from_array([9; 32]);
        let data = header(owner, Pubkey::default());
        let parsed = NameRecordHeader::unpack(&data).unwrap();
        assert_eq!(parsed.owner, owner);
        assert_eq!(parsed.parent, Some(Pubkey::new_from_array([7; 32])));
        assert_eq!(parsed.class, None);
    }

    #[test]
    fn rejects_short_header() {
        assert!(matches!(
            NameRecordHeader::unpack(&[0u8; 95]),
            Err(SnsError::InvalidData(_))
        ));
    }

    #[test]
    fn record_labels_round_trip() {
        for record in Record::ALL {
            assert_eq!(Record::parse(record.as_str()), Some(record));
        }
        assert_eq!(Record::parse("sol"), Some(Record::Sol));
        assert_eq!(Record::parse("myspace"), None);
    }

    #[test]
    fn decodes_v1_text_and_keys() {
        let mut data = header(Pubkey::default(), Pubkey::default());
        data.extend_from_slice(b"https://example.com\0\0\0\0");
        assert_eq!(
            decode_v1(Record::Url, &data).unwrap().as_deref(),
            Some("https://example.com")
        );

        let wallet = Pubkey::new_from_array([5; 32]);
        let mut data = header(Pubkey::default(), Pubkey::default());
        data.extend_from_slice(wallet.as_bytes());
        data.extend_from_slice(&[1u8; 64]);
        assert_eq!(decode_v1(Record::Sol, &data).unwrap(), Some(wallet.to_string()));

        let mut data = header(Pubkey::default(), Pubkey::default());
        data.extend_from_slice(&[0xab; 20]);
        data.extend_from_slice(&[0u8; 12]);
        assert_eq!(
            decode_v1(Record::Eth, &data).unwrap(),
            Some(format!("0x{}", "ab".repeat(20)))
        );
    }

    #[test]
    fn empty_v1_record_is_absent() {
        let mut data = header(Pubkey::default(), Pubkey::default());
        data.extend_from_slice(&[0u8; 32]);
        assert_eq!(decode_v1(Record::Twitter, &data).unwrap(), None);
    }

    #[test]
    fn decodes_v2_with_validation_ids() {
        let wallet = Pubkey::new_from_array([3; 32]);
        let mut data = header(Pubkey::default(), Pubkey::default());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&32u32.to_le_bytes());
        data.extend_from_slice(&[0xee; 32]);
        data.extend_from_slice(&[0xdd; 20]);
        data.extend_from_slice(wallet.as_bytes());

        assert_eq!(decode_v2(Record::Sol, &data).unwrap(), Some(wallet.to_string()));
    }

    #[test]
    fn decodes_v2_text() {
        let mut data = header(Pubkey::default(), Pubkey::default());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&5u32.to_le_bytes());
        data.extend_from_slice(b"alice");
        assert_eq!(decode_v2(Record::Github, &data).unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn truncated_v2_record_is_invalid() {
        let mut data = header(Pubkey::default(), Pubkey::default());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&50u32.to_le_bytes());
        data.extend_from_slice(b"short");
        assert!(decode_v2(Record::Url, &data).is_err());
    }
}
