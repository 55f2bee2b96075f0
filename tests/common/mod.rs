#![allow(dead_code)]

use investor_rfm::data::loader::{prepare, read_csv};
use investor_rfm::{PipelineConfig, RecordSet};

/// Ten investors: three in EMEA, one of those in London, four in the USA.
pub const FIXTURE_CSV: &str = "\
Last Updated Date,Preferred Industry,HQ Global Region,HQ Country/Territory,HQ State/Province,Segment,Investors,Primary Investor Type,RFM Score,Last Investment Size
2023-01-10,\"AI, FinTech\",EMEA,UK,London,Champions,Northwind Capital,Venture Capital,555,12.5
2023-02-14,Retail,EMEA,UK,Manchester,Loyal,Harbor Angels,Angel Group,434,3.0
2023-03-03,Healthcare,EMEA,Germany,,Potential,Atlas Partners,Corporate,323,7.25
2023-03-20,FinTech,Americas,USA,California,Champions,Summit Ventures,Venture Capital,545,20.0
2023-04-01,AI,Americas,USA,New York,Loyal,Ember Fund,Venture Capital,425,5.5
2023-04-18,\"Energy, Media\",Americas,Canada,Ontario,At Risk,Crescent Group,Angel Group,211,1.0
2023-05-05,,Americas,USA,Texas,Potential,Pioneer Capital,Accelerator,312,
2023-06-12,Software,Asia,Singapore,,Loyal,Bluebird Labs,Venture Capital,444,9.0
2023-07-30,Consumer Products,Asia,India,Karnataka,At Risk,Lotus Seed,Angel Group,122,0.75
2023-08-15,\"AI, Software\",,USA,California,Champions,Orbit Partners,Corporate,553,15.0
";

pub fn fixture() -> RecordSet {
    let raw = read_csv(FIXTURE_CSV.as_bytes()).expect("fixture parses");
    prepare(raw, &PipelineConfig::default()).expect("fixture has the full schema")
}

/// Values of the `Investors` column, in row order.
pub fn names(set: &RecordSet) -> Vec<String> {
    set.column("Investors")
        .expect("Investors column")
        .map(|c| c.to_string())
        .collect()
}

/// Whether `sub` appears in `full` in the same relative order.
pub fn is_subsequence(sub: &[String], full: &[String]) -> bool {
    let mut it = full.iter();
    sub.iter().all(|s| it.any(|f| f == s))
}
