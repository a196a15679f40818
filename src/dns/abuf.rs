//! DNS answer buffer decoding.
//!
//! Atlas probes ship the raw DNS response ("abuf") as base64 encoded wire
//! format. This module turns it into the answer records the report needs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use trust_dns_resolver::proto::op::Message;
use trust_dns_resolver::proto::rr::RData;

/// One answer record from a DNS response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerRecord {
    /// Textual data items of the record.
    ///
    /// TXT records yield one item per character-string, every other
    /// record type yields its presentation form as a single item.
    pub data: Vec<String>,
}

/// Decoded answer buffer of a single sub-response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerBuffer {
    /// Buffer decoded; answer section in wire order.
    Parsed(Vec<AnswerRecord>),
    /// Buffer present but not valid base64 or not a DNS message.
    Malformed,
}

impl AnswerBuffer {
    /// Decode a base64 answer buffer.
    #[must_use]
    pub fn decode(abuf: &str) -> Self {
        let Ok(bytes) = STANDARD.decode(abuf.trim()) else {
            return Self::Malformed;
        };

        match Message::from_vec(&bytes) {
            Ok(message) => Self::Parsed(
                message
                    .answers()
                    .iter()
                    .map(|record| AnswerRecord {
                        data: record.data().map(rdata_items).unwrap_or_default(),
                    })
                    .collect(),
            ),
            Err(e) => {
                tracing::debug!("answer buffer is not a DNS message: {e}");
                Self::Malformed
            }
        }
    }

    /// Whether decoding failed.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed)
    }

    /// Answer records, empty when malformed.
    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        match self {
            Self::Parsed(answers) => answers,
            Self::Malformed => &[],
        }
    }
}

fn rdata_items(rdata: &RData) -> Vec<String> {
    match rdata {
        RData::TXT(txt) => txt
            .txt_data()
            .iter()
            .map(|item| String::from_utf8_lossy(item).into_owned())
            .collect(),
        RData::A(addr) => vec![addr.to_string()],
        RData::AAAA(addr) => vec![addr.to_string()],
        other => vec![other.to_string()],
    }
}
