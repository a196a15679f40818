//! Report column descriptors.

use crate::error::Error;
use crate::measurement::IpVersion;
use std::fmt;
use std::str::FromStr;

/// Minimum width of the response time columns.
const RESPONSE_TIME_WIDTH: usize = 13;

/// Columns the report can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnId {
    ProbeId,
    Asn,
    CountryCode,
    IpAddress,
    RtA,
    RtB,
    RtDiff,
    DnsResponse,
}

impl ColumnId {
    /// Default column order.
    #[must_use]
    pub fn defaults() -> &'static [Self] {
        &[
            Self::ProbeId,
            Self::Asn,
            Self::CountryCode,
            Self::IpAddress,
            Self::RtA,
            Self::RtB,
            Self::RtDiff,
            Self::DnsResponse,
        ]
    }

    /// Name used in settings and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ProbeId => "probe_id",
            Self::Asn => "asn",
            Self::CountryCode => "country_code",
            Self::IpAddress => "ip_address",
            Self::RtA => "rt_a",
            Self::RtB => "rt_b",
            Self::RtDiff => "rt_diff",
            Self::DnsResponse => "dns_response",
        }
    }
}

impl FromStr for ColumnId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "probe_id" => Ok(Self::ProbeId),
            "asn" => Ok(Self::Asn),
            "country_code" | "cc" => Ok(Self::CountryCode),
            "ip_address" => Ok(Self::IpAddress),
            "rt_a" => Ok(Self::RtA),
            "rt_b" => Ok(Self::RtB),
            "rt_diff" | "rt_delta" => Ok(Self::RtDiff),
            "dns_response" => Ok(Self::DnsResponse),
            _ => Err(Error::UnknownReportColumn(s.to_string())),
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One laid out report column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    pub header: String,
    pub width: usize,
}

impl Column {
    /// Lay out `id` given the response time labels and address family.
    #[must_use]
    pub fn new(id: ColumnId, labels: (&str, &str), ip_version: IpVersion) -> Self {
        let (header, width) = match id {
            ColumnId::ProbeId => ("Probe_ID".to_string(), 12),
            ColumnId::Asn => ("ASN".to_string(), 10),
            ColumnId::CountryCode => ("CC".to_string(), 2),
            ColumnId::IpAddress => ("IP_Address".to_string(), ip_version.address_width()),
            ColumnId::RtA => rt_header(labels.0),
            ColumnId::RtB => rt_header(labels.1),
            ColumnId::RtDiff => ("diff(ms)".to_string(), 8),
            ColumnId::DnsResponse => ("DNSsubstr[:B]".to_string(), 15),
        };
        Self { id, header, width }
    }
}

fn rt_header(label: &str) -> (String, usize) {
    let header = format!("{label}(ms)");
    let width = header.len().max(RESPONSE_TIME_WIDTH);
    (header, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for id in ColumnId::defaults() {
            assert_eq!(id.name().parse::<ColumnId>().unwrap(), *id);
            assert_eq!(id.to_string(), id.name());
        }
        assert_eq!("rt_delta".parse::<ColumnId>().unwrap(), ColumnId::RtDiff);
        assert_eq!(" ASN ".parse::<ColumnId>().unwrap(), ColumnId::Asn);
    }

    #[test]
    fn test_unknown_column() {
        let err = "latency".parse::<ColumnId>().unwrap_err();
        assert!(matches!(err, Error::UnknownReportColumn(ref name) if name == "latency"));
        assert_eq!(err.exit_code(), 15);
    }

    #[test]
    fn test_widths() {
        let labels = ("12016241", "2021-01-01_0000");
        let w = |id| Column::new(id, labels, IpVersion::V4).width;
        assert_eq!(w(ColumnId::ProbeId), 12);
        assert_eq!(w(ColumnId::Asn), 10);
        assert_eq!(w(ColumnId::CountryCode), 2);
        assert_eq!(w(ColumnId::IpAddress), 15);
        assert_eq!(w(ColumnId::RtA), 13);
        assert_eq!(w(ColumnId::RtB), "2021-01-01_0000(ms)".len());
        assert_eq!(w(ColumnId::RtDiff), 8);
        assert_eq!(w(ColumnId::DnsResponse), 15);
        assert_eq!(
            Column::new(ColumnId::IpAddress, labels, IpVersion::V6).width,
            39
        );
    }
}
