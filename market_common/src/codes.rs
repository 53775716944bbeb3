//! Instrument codes and the boards tracked by the dashboard.
use std::fmt;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Exchange-qualified instrument symbol (e.g. `C0.DCE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentCode(String);

impl InstrumentCode {
    /// Wrap a raw symbol, trimming surrounding whitespace.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// The symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait providing file parsing for instrument codes.
pub trait CodeParser {
    /// Parses codes from a buffered reader.
    ///
    /// Codes may be separated by commas, spaces, or new lines. Empty tokens
    /// are skipped.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<InstrumentCode>, FetchError>;
}

impl CodeParser for InstrumentCode {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<InstrumentCode>, FetchError> {
        let mut codes = Vec::new();
        for line_result in reader.lines() {
            let line = line_result.map_err(FetchError::Io)?;
            codes.extend(parse_list(&line));
        }
        Ok(codes)
    }
}

/// Split a code list on commas and whitespace, dropping empty tokens.
pub fn parse_list(raw: &str) -> Vec<InstrumentCode> {
    raw.split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(InstrumentCode::new)
        .collect()
}

/// Joined form used by vendor queries (`A,B,C`).
pub fn join(codes: &[InstrumentCode]) -> String {
    codes
        .iter()
        .map(InstrumentCode::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Commodity board tracked by the dashboard heatmap: the main continuous
/// contract of every listed commodity future.
pub const COMMODITY_BOARD: &str = "A0.DCE,AD0.SHF,AG0.SHF,AL0.SHF,AO0.SHF,AP0.CZC,AU0.SHF,B0.DCE,BB0.DCE,BCM.INE,BR0.SHF,BU0.SHF,BZ0.DCE,C0.DCE,CF0.CZC,CJ0.CZC,CS0.DCE,CU0.SHF,CY0.CZC,EB0.DCE,ECM.INE,EG0.DCE,FB0.DCE,FG0.CZC,FU0.SHF,HC0.SHF,I0.DCE,J0.DCE,JD0.DCE,JM0.DCE,JR0.CZC,L0.DCE,LCM.GFE,LF0.DCE,LG0.DCE,LH0.DCE,LR0.CZC,LUM.INE,M0.DCE,MA0.CZC,NI0.SHF,NRM.INE,OI0.CZC,OP0.SHF,P0.DCE,PB0.SHF,PDM.GFE,PF0.CZC,PG0.DCE,PK0.CZC,PL0.CZC,PM0.CZC,PP0.DCE,PPF0.DCE,PR0.CZC,PSM.GFE,PTM.GFE,PX0.CZC,RB0.SHF,RI0.CZC,RM0.CZC,RR0.DCE,RS0.CZC,RU0.SHF,SA0.CZC,SCM.INE,SF0.CZC,SH0.CZC,SIM.GFE,SM0.CZC,SN0.SHF,SP0.SHF,SR0.CZC,SS0.SHF,TA0.CZC,UR0.CZC,V0.DCE,VF0.DCE,WH0.CZC,WR0.SHF,Y0.DCE,ZC0.CZC,ZN0.SHF";

/// Index-future product roots on the financial exchange.
pub const INDEX_FUTURE_ROOTS: [&str; 4] = ["IH", "IF", "IC", "IM"];

/// Spot index code underlying each index-future root.
pub const SPOT_INDEX_ALIASES: [(&str, &str); 4] = [
    ("IH", "000016.SH"),
    ("IF", "000300.SH"),
    ("IC", "000905.SH"),
    ("IM", "000852.SH"),
];

/// Futures alias for a spot index code, if it is one of the tracked four.
pub fn spot_alias(code: &str) -> Option<&'static str> {
    SPOT_INDEX_ALIASES
        .iter()
        .find(|(_, spot)| *spot == code)
        .map(|(alias, _)| *alias)
}
