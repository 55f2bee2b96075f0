mod common;

use chrono::NaiveDate;

use common::{fixture, is_subsequence, names};
use investor_rfm::data::filter::{apply_base_filters, run_filters, DateRange, SelectionCase};
use investor_rfm::{CascadeMode, FilterSelection, PipelineConfig, TokenMatch};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn legacy() -> PipelineConfig {
    PipelineConfig {
        cascade: CascadeMode::Legacy,
        ..Default::default()
    }
}

fn select(regions: &[&str], countries: &[&str], states: &[&str]) -> FilterSelection {
    let own = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    FilterSelection {
        regions: own(regions),
        countries: own(countries),
        states: own(states),
        ..Default::default()
    }
}

#[test]
fn region_then_state_narrows_to_london() {
    let store = fixture();
    for cfg in [PipelineConfig::default(), legacy()] {
        let emea = run_filters(&store, &select(&["EMEA"], &[], &[]), &cfg).unwrap();
        assert_eq!(emea.case, SelectionCase::RegionOnly);
        assert_eq!(emea.filtered.len(), 3);

        let london = run_filters(&store, &select(&["EMEA"], &[], &["London"]), &cfg).unwrap();
        assert_eq!(london.case, SelectionCase::RegionState);
        assert_eq!(names(&london.filtered), vec!["Northwind Capital"]);
    }
}

struct CaseRow {
    regions: &'static [&'static str],
    countries: &'static [&'static str],
    states: &'static [&'static str],
    case: SelectionCase,
    corrected: &'static [&'static str],
    legacy: &'static [&'static str],
}

const EVERYONE: &[&str] = &[
    "Northwind Capital",
    "Harbor Angels",
    "Atlas Partners",
    "Summit Ventures",
    "Ember Fund",
    "Crescent Group",
    "Pioneer Capital",
    "Bluebird Labs",
    "Lotus Seed",
    "Orbit Partners",
];

const USA_INVESTORS: &[&str] = &["Summit Ventures", "Ember Fund", "Pioneer Capital", "Orbit Partners"];

#[test]
fn every_location_case_returns_the_expected_investors() {
    let table = [
        CaseRow {
            regions: &[],
            countries: &[],
            states: &[],
            case: SelectionCase::Unconstrained,
            corrected: EVERYONE,
            legacy: EVERYONE,
        },
        CaseRow {
            regions: &["Asia"],
            countries: &[],
            states: &[],
            case: SelectionCase::RegionOnly,
            corrected: &["Bluebird Labs", "Lotus Seed"],
            legacy: &["Bluebird Labs", "Lotus Seed"],
        },
        CaseRow {
            regions: &[],
            countries: &["USA"],
            states: &[],
            case: SelectionCase::CountryOnly,
            corrected: USA_INVESTORS,
            legacy: EVERYONE,
        },
        // No region chosen, so the null-region row still qualifies.
        CaseRow {
            regions: &[],
            countries: &[],
            states: &["California"],
            case: SelectionCase::StateOnly,
            corrected: &["Summit Ventures", "Orbit Partners"],
            legacy: &["Summit Ventures", "Orbit Partners"],
        },
        CaseRow {
            regions: &["Americas"],
            countries: &["USA"],
            states: &[],
            case: SelectionCase::RegionCountry,
            corrected: &["Summit Ventures", "Ember Fund", "Pioneer Capital"],
            legacy: &["Summit Ventures", "Ember Fund", "Pioneer Capital"],
        },
        CaseRow {
            regions: &["EMEA"],
            countries: &[],
            states: &["London"],
            case: SelectionCase::RegionState,
            corrected: &["Northwind Capital"],
            legacy: &["Northwind Capital"],
        },
        CaseRow {
            regions: &[],
            countries: &["USA"],
            states: &["California", "Texas"],
            case: SelectionCase::CountryState,
            corrected: &["Summit Ventures", "Pioneer Capital", "Orbit Partners"],
            legacy: &["Summit Ventures", "Pioneer Capital", "Orbit Partners"],
        },
        CaseRow {
            regions: &["Americas"],
            countries: &["USA", "Canada"],
            states: &["California", "Ontario"],
            case: SelectionCase::All,
            corrected: &["Summit Ventures", "Crescent Group"],
            legacy: &["Summit Ventures", "Crescent Group"],
        },
    ];

    let store = fixture();
    for row in &table {
        let sel = select(row.regions, row.countries, row.states);
        for (cfg, want) in [
            (PipelineConfig::default(), row.corrected),
            (legacy(), row.legacy),
        ] {
            let out = run_filters(&store, &sel, &cfg).unwrap();
            assert_eq!(out.case, row.case);
            assert_eq!(names(&out.filtered), want, "{:?} {:?}", row.case, cfg.cascade);
        }
    }
}

#[test]
fn country_alone_is_applied_in_corrected_mode() {
    let out = run_filters(&fixture(), &select(&[], &["USA"], &[]), &PipelineConfig::default())
        .unwrap();
    assert_eq!(out.case, SelectionCase::CountryOnly);
    assert_eq!(
        names(&out.filtered),
        vec!["Summit Ventures", "Ember Fund", "Pioneer Capital", "Orbit Partners"]
    );
}

#[test]
fn country_alone_falls_through_unfiltered_in_legacy_mode() {
    let store = fixture();
    let out = run_filters(&store, &select(&[], &["USA"], &[]), &legacy()).unwrap();
    assert_eq!(out.case, SelectionCase::CountryOnly);
    assert_eq!(out.filtered, store);
}

#[test]
fn empty_selection_returns_date_filtered_input_unchanged() {
    let store = fixture();
    let cfg = PipelineConfig::default();
    let sel = FilterSelection {
        start: Some(date(2023, 3, 1)),
        end: Some(date(2023, 6, 30)),
        ..Default::default()
    };
    let range = DateRange::resolve(&sel, store.date_bounds(&cfg.columns.date).unwrap());
    let base = apply_base_filters(&store, &sel, &range, &cfg).unwrap();

    for mode in [CascadeMode::Corrected, CascadeMode::Legacy] {
        let cfg = PipelineConfig {
            cascade: mode,
            ..Default::default()
        };
        let out = run_filters(&store, &sel, &cfg).unwrap();
        assert_eq!(out.case, SelectionCase::Unconstrained);
        assert_eq!(out.filtered, base);
        assert_eq!(out.filtered.len(), 6);
    }
}

#[test]
fn dataset_bounds_keep_every_row() {
    let store = fixture();
    let sel = FilterSelection {
        start: Some(date(2023, 1, 10)),
        end: Some(date(2023, 8, 15)),
        ..Default::default()
    };
    let out = run_filters(&store, &sel, &PipelineConfig::default()).unwrap();
    assert_eq!(out.filtered, store);

    let defaulted = run_filters(&store, &FilterSelection::default(), &PipelineConfig::default())
        .unwrap();
    assert_eq!(defaulted.range.start, Some(date(2023, 1, 10)));
    assert_eq!(defaulted.range.end, Some(date(2023, 8, 15)));
    assert_eq!(defaulted.filtered.len(), 10);
}

#[test]
fn filtering_never_grows_or_reorders() {
    let store = fixture();
    let all = names(&store);
    let regions: [&[&str]; 3] = [&[], &["EMEA"], &["Americas", "Asia"]];
    let countries: [&[&str]; 3] = [&[], &["USA"], &["UK", "India"]];
    let states: [&[&str]; 3] = [&[], &["California"], &["London", "Karnataka", "Texas"]];

    for mode in [CascadeMode::Corrected, CascadeMode::Legacy] {
        let cfg = PipelineConfig {
            cascade: mode,
            ..Default::default()
        };
        for r in regions {
            for c in countries {
                for s in states {
                    let out = run_filters(&store, &select(r, c, s), &cfg).unwrap();
                    let kept = names(&out.filtered);
                    assert!(kept.len() <= all.len());
                    assert!(is_subsequence(&kept, &all), "{mode:?} {r:?} {c:?} {s:?}");
                }
            }
        }
    }
}

#[test]
fn corrected_mode_intersects_every_selection() {
    let store = fixture();
    let cfg = PipelineConfig::default();
    let out = run_filters(&store, &select(&["Americas"], &["USA"], &["California", "Ontario"]), &cfg)
        .unwrap();
    assert_eq!(out.case, SelectionCase::All);
    assert_eq!(names(&out.filtered), vec!["Summit Ventures"]);

    let out = run_filters(&store, &select(&[], &["UK"], &["Manchester"]), &cfg).unwrap();
    assert_eq!(names(&out.filtered), vec!["Harbor Angels"]);
}

#[test]
fn null_region_rows_only_pass_unconstrained() {
    let store = fixture();
    let out = run_filters(&store, &select(&["Americas"], &[], &[]), &PipelineConfig::default())
        .unwrap();
    assert!(!names(&out.filtered).contains(&"Orbit Partners".to_string()));
}

#[test]
fn cascade_options_reflect_region_choice() {
    let out = run_filters(
        &fixture(),
        &select(&["Asia"], &[], &[]),
        &PipelineConfig::default(),
    )
    .unwrap();
    let countries: Vec<String> = out.options.countries.iter().map(|c| c.to_string()).collect();
    let states: Vec<String> = out.options.states.iter().map(|c| c.to_string()).collect();
    assert_eq!(countries, vec!["India", "Singapore"]);
    assert_eq!(states, vec!["Karnataka"]);
    // regions list ignores the region choice itself
    assert_eq!(out.options.regions.len(), 3);
}

#[test]
fn industry_match_modes_differ_on_partial_tokens() {
    let store = fixture();
    let sel = FilterSelection {
        industries: vec!["Tech".into()],
        ..Default::default()
    };
    let substring = PipelineConfig {
        token_match: TokenMatch::Substring,
        ..Default::default()
    };
    let over = run_filters(&store, &sel, &substring).unwrap();
    assert_eq!(
        names(&over.filtered),
        vec!["Northwind Capital", "Summit Ventures"]
    );

    let exact = run_filters(&store, &sel, &PipelineConfig::default()).unwrap();
    assert!(exact.filtered.is_empty());

    let sel = FilterSelection {
        industries: vec!["AI".into()],
        ..Default::default()
    };
    let ai = run_filters(&store, &sel, &PipelineConfig::default()).unwrap();
    assert_eq!(
        names(&ai.filtered),
        vec!["Northwind Capital", "Ember Fund", "Orbit Partners"]
    );
}

#[test]
fn missing_location_column_is_fatal() {
    let store = fixture().project(&[
        "Last Updated Date",
        "Preferred Industry",
        "HQ Global Region",
        "HQ Country/Territory",
    ]);
    let err = run_filters(&store, &FilterSelection::default(), &PipelineConfig::default())
        .unwrap_err();
    assert!(err.to_string().contains("HQ State/Province"));
}
