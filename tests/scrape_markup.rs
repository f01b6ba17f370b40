// tests/scrape_markup.rs
//
// Line-scan scraper against realistic and hand-built markup.

mod common;

use market_relay::quote::{Commodity, CommodityQuote};
use market_relay::scrape::{
    default_targets, scrape_lines, split_markup, CommodityTarget, LineScanScraper, QuoteScraper,
};

/// `<b>Gold</b>` on line 10, price cell on 14 with the value on 15, change on 18.
fn gold_scenario() -> Vec<String> {
    let mut lines: Vec<String> = (0..30).map(|i| format!("<div>filler {i}</div>")).collect();
    lines[10] = "<td><a href=\"/commodity/gold\"><b>Gold</b></a></td>".into();
    lines[14] = r#"<td class="datatable-item" id="p">"#.into();
    lines[15] = "   1985.30   ".into();
    lines[18] = r#"<td class="datatable-item" id="pch" data-value="-0.45">"#.into();
    lines
}

#[test]
fn gold_scenario_reads_price_and_change() {
    let owned = gold_scenario();
    let lines: Vec<&str> = owned.iter().map(String::as_str).collect();

    let report = scrape_lines(&lines, &[CommodityTarget::new("Gold", Commodity::Gold)]);
    assert_eq!(
        report.quotes,
        vec![CommodityQuote {
            name: Commodity::Gold,
            rate: 1985.30,
            change: -0.45,
        }]
    );
}

#[test]
fn fixture_page_yields_all_four_metals_in_order() {
    let html = common::fixture("commodities.html");
    let lines = split_markup(&html);
    assert!(lines.len() >= 100, "fixture must look like a real page");

    let report = LineScanScraper.scrape(&lines, &default_targets());
    assert!(report.misses.is_empty(), "misses: {:?}", report.misses);

    let got: Vec<(Commodity, f64, f64)> = report
        .quotes
        .iter()
        .map(|q| (q.name, q.rate, q.change))
        .collect();
    assert_eq!(
        got,
        vec![
            (Commodity::Gold, 2345.67, 0.45),
            (Commodity::Silver, 29.874, -0.70),
            (Commodity::Copper, 4.5315, 0.66),
            (Commodity::Aluminium, 2512.50, -0.47),
        ]
    );
}

#[test]
fn missing_label_gives_placeholder_without_affecting_others() {
    let html = common::fixture("commodities.html").replace("<b>Silver</b>", "<b>Platinum</b>");
    let lines = split_markup(&html);

    let report = scrape_lines(&lines, &default_targets());
    assert_eq!(report.quotes.len(), 4);
    assert_eq!(report.quotes[1], CommodityQuote::placeholder(Commodity::Silver));
    assert_eq!(report.misses.len(), 1);
    assert_eq!(report.misses[0].label, "Silver");

    assert_eq!(report.quotes[0].rate, 2345.67);
    assert_eq!(report.quotes[2].rate, 4.5315);
    assert_eq!(report.quotes[3].rate, 2512.50);
}

#[test]
fn output_follows_target_order_and_length() {
    let html = common::fixture("commodities.html");
    let lines = split_markup(&html);

    let targets = vec![
        CommodityTarget::new("Aluminum", Commodity::Aluminium),
        CommodityTarget::new("Gold", Commodity::Gold),
        CommodityTarget::new("Nickel", Commodity::Copper),
    ];
    let report = scrape_lines(&lines, &targets);
    let names: Vec<_> = report.quotes.iter().map(|q| q.name).collect();
    assert_eq!(
        names,
        vec![Commodity::Aluminium, Commodity::Gold, Commodity::Copper]
    );
    assert_eq!(report.quotes[2].rate, 0.0);
}

#[test]
fn empty_markup_gives_only_placeholders() {
    let report = scrape_lines(&[], &default_targets());
    assert_eq!(report.quotes.len(), 4);
    assert!(report.quotes.iter().all(|q| q.rate == 0.0 && q.change == 0.0));
    assert_eq!(report.misses.len(), 4);
}

#[test]
fn value_two_lines_after_price_cell_is_found_but_not_three() {
    let two = vec!["<b>Gold</b>", r#"<td id="p">"#, "<span>", "1900.5"];
    let report = scrape_lines(&two, &[CommodityTarget::new("Gold", Commodity::Gold)]);
    assert_eq!(report.quotes[0].rate, 1900.5);

    let three = vec!["<b>Gold</b>", r#"<td id="p">"#, "<span>", "<i>", "1900.5"];
    let report = scrape_lines(&three, &[CommodityTarget::new("Gold", Commodity::Gold)]);
    assert_eq!(report.quotes[0].rate, 0.0);
}
