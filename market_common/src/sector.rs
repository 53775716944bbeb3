//! Product-prefix sector taxonomy and heatmap grouping.
//!
//! Instruments are bucketed by the bare product root of their code (the
//! segment before the exchange qualifier, digits stripped). The taxonomy is
//! static input data maintained alongside the dashboard; roots that match no
//! category land in the catch-all bucket.
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::record::QuoteRecord;

/// Taxonomy bucket for the commodity heatmap.
///
/// Display labels match the dashboard's category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Sector {
    /// Grains, oilseeds, softs and livestock.
    #[strum(to_string = "农产")]
    Agriculture,
    /// Gold, silver and the platinum group.
    #[strum(to_string = "贵金属")]
    PreciousMetals,
    /// Base metals.
    #[strum(to_string = "有色")]
    NonFerrous,
    /// Lithium, polysilicon and industrial silicon.
    #[strum(to_string = "新能源")]
    NewEnergy,
    /// Ferrous complex and building materials.
    #[strum(to_string = "黑色")]
    Ferrous,
    /// Energy and chemicals.
    #[strum(to_string = "能源化工")]
    EnergyChemicals,
    /// Container freight.
    #[strum(to_string = "航运")]
    Shipping,
    /// Equity index futures.
    #[strum(to_string = "股指")]
    EquityIndex,
    /// Government bond futures.
    #[strum(to_string = "国债")]
    GovBonds,
    /// Catch-all for unclassified roots.
    #[strum(to_string = "其他")]
    Other,
}

impl Sector {
    /// Product roots belonging to this sector.
    fn members(self) -> &'static [&'static str] {
        match self {
            Sector::Agriculture => &[
                "C", "CS", "WH", "PM", "RR", "RI", "JR", "LR", "A", "B", "M", "Y", "RM",
                "OI", "RS", "PK", "P", "SR", "CF", "CY", "AP", "CJ", "LH", "JD", "LG",
                "SP", "OP",
            ],
            Sector::PreciousMetals => &["AU", "AG", "PT", "PD"],
            Sector::NonFerrous => &["CU", "BC", "AL", "AO", "AD", "ZN", "PB", "NI", "SN"],
            Sector::NewEnergy => &["LC", "PS", "SI"],
            Sector::Ferrous => &[
                "I", "SF", "SM", "RB", "HC", "SS", "WR", "JM", "J", "ZC", "FG", "BB", "FB",
            ],
            Sector::EnergyChemicals => &[
                "SC", "FU", "LU", "PG", "BU", "TA", "EG", "PF", "PR", "PL", "PP", "L",
                "BZ", "PX", "EB", "RU", "BR", "NR", "SA", "SH", "V", "UR", "MA",
            ],
            Sector::Shipping => &["EC"],
            Sector::EquityIndex => &["IH", "IF", "IC", "IM", "MO"],
            Sector::GovBonds => &["TS", "TF", "T", "TL"],
            Sector::Other => &[],
        }
    }

    /// Classify an instrument code by its product root; the first matching
    /// category wins, no match lands in the catch-all.
    pub fn classify(code: &str) -> Sector {
        let root = product_prefix(code);
        Sector::iter()
            .find(|sector| sector.members().contains(&root.as_str()))
            .unwrap_or(Sector::Other)
    }
}

/// Bare product root of an exchange-qualified code.
///
/// Takes the segment before the first `.`, uppercases it, strips trailing
/// digits, then strips one trailing `M`/`F`/`X` continuous-contract marker,
/// but only while the remaining prefix is longer than 2 characters.
pub fn product_prefix(code: &str) -> String {
    let head = code.split('.').next().unwrap_or("").to_ascii_uppercase();
    let mut prefix = head.trim_end_matches(|ch: char| ch.is_ascii_digit()).to_string();
    if prefix.chars().count() > 2 && matches!(prefix.chars().last(), Some('M' | 'F' | 'X')) {
        prefix.pop();
    }
    prefix
}

/// Child entry of a sector bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorEntry {
    /// Display name, falling back to the instrument code.
    pub name: String,
    /// Traded amount (zero when unresolved).
    pub value: f64,
    /// Daily return percentage.
    pub ret: Option<f64>,
}

/// One taxonomy bucket of the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorBucket {
    /// Category display name.
    pub name: String,
    /// Entries in input-record order.
    pub children: Vec<SectorEntry>,
}

/// Sector-grouped heatmap document.
#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    /// Trading day the snapshot was taken for.
    pub trade_date: String,
    /// Sum of all entry amounts across buckets.
    pub total_amount: f64,
    /// Buckets in first-encounter order.
    pub data: Vec<SectorBucket>,
}

/// Group records into sector buckets in a single pass, in input order.
///
/// Buckets are created on first encounter; the grand total accumulates
/// alongside, so bucket sums always add up to `total_amount`.
pub fn build_heatmap(trade_date: &str, records: &[QuoteRecord]) -> Heatmap {
    let mut buckets: Vec<(Sector, SectorBucket)> = Vec::new();
    let mut total = 0.0;
    for record in records {
        let sector = Sector::classify(&record.code);
        let amount = record.amount.unwrap_or(0.0);
        total += amount;
        let entry = SectorEntry {
            name: record.name.clone().unwrap_or_else(|| record.code.clone()),
            value: amount,
            ret: record.return_pct,
        };
        match buckets.iter_mut().find(|(s, _)| *s == sector) {
            Some((_, bucket)) => bucket.children.push(entry),
            None => buckets.push((
                sector,
                SectorBucket {
                    name: sector.to_string(),
                    children: vec![entry],
                },
            )),
        }
    }
    Heatmap {
        trade_date: trade_date.to_string(),
        total_amount: total,
        data: buckets.into_iter().map(|(_, bucket)| bucket).collect(),
    }
}
