//! End-to-end report building tests

use lra_config::{LedgerMatch, MalformedPolicy, ReportConfig};
use lra_core::{
    build_report, filter_ledger, CoreError, LedgerFilter, NormalBalance, ReportPeriod, ReportRequest, ResidualLabel,
    RowKind, SummaryLine,
};
use lra_parser::tables::{read_chart_csv, read_ledger_csv};
use lra_parser::{ChartRow, LedgerRow};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn chart() -> Vec<ChartRow> {
    vec![
        ChartRow::new("4", "Pendapatan", 1),
        ChartRow::new("4.1", "Pendapatan Asli", 2),
        ChartRow::new("4.1.1", "Pajak", 3),
        ChartRow::new("5", "Belanja", 1),
        ChartRow::new("5.1", "Belanja Pegawai", 2),
        ChartRow::new("5.1.1", "Gaji", 3),
    ]
}

fn posting(code: &str, debit: Decimal, credit: Decimal) -> LedgerRow {
    LedgerRow::new(code, debit, credit, "Jurnal Umum")
}

fn build(chart: &[ChartRow], ledger: &[LedgerRow]) -> lra_core::LraReport {
    build_report(chart, ledger, &ReportConfig::default(), &ReportRequest::default()).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let ledger = vec![posting("4.1.1", dec!(0), dec!(1000)), posting("5.1.1", dec!(600), dec!(0))];
    let report = build(&chart(), &ledger);

    for code in ["4.1.1", "4.1", "4"] {
        assert_eq!(report.row(code).unwrap().balance, dec!(1000), "revenue at {}", code);
    }
    for code in ["5.1.1", "5.1", "5"] {
        assert_eq!(report.row(code).unwrap().balance, dec!(600), "expenditure at {}", code);
    }

    let totals = report.totals;
    assert_eq!(totals.revenue, dec!(1000));
    assert_eq!(totals.expenditure, dec!(600));
    assert_eq!(totals.surplus_deficit, dec!(400));
    assert_eq!(totals.net_financing, dec!(0));
    assert_eq!(totals.residual, dec!(400));
    assert_eq!(totals.residual_label, ResidualLabel::Silpa);

    let residual = report.line(SummaryLine::Residual).unwrap();
    assert_eq!(residual.label, "SILPA");
    assert_eq!(residual.kind, RowKind::Summary);
    assert!(report.diagnostics.is_clean());
}

#[test]
fn test_idempotent() {
    let ledger = vec![
        posting("4.1.1", dec!(0), dec!(1000)),
        posting("5.1.1", dec!(600), dec!(0)),
        posting("9.9", dec!(1), dec!(0)),
        LedgerRow::new("5.1.1", "x", "", "Jurnal Umum"),
    ];
    let first = build(&chart(), &ledger);
    let second = build(&chart(), &ledger);
    assert_eq!(first, second);
}

#[test]
fn test_closing_entries_are_excluded() {
    let ledger = vec![
        posting("4.1.1", dec!(0), dec!(1000)),
        LedgerRow::new("4.1.1", dec!(1000), dec!(0), "Jurnal Penutup"),
    ];
    let report = build(&chart(), &ledger);
    assert_eq!(report.totals.revenue, dec!(1000));
    assert_eq!(report.diagnostics.closing_entries_excluded, 1);
}

#[test]
fn test_custom_closing_tag() {
    let config = ReportConfig {
        closing_entry_tag: "Closing".to_string(),
        ..ReportConfig::default()
    };
    let ledger = vec![
        posting("4.1.1", dec!(0), dec!(1000)),
        LedgerRow::new("4.1.1", dec!(1000), dec!(0), "Closing"),
    ];
    let report = build_report(&chart(), &ledger, &config, &ReportRequest::default()).unwrap();
    assert_eq!(report.totals.revenue, dec!(1000));
}

#[test]
fn test_unmatched_entry_counting() {
    let base = vec![posting("4.1.1", dec!(0), dec!(1000)), posting("5.1.1", dec!(600), dec!(0))];
    let mut with_unmatched = base.clone();
    with_unmatched.push(posting("9.1.1", dec!(500), dec!(0)));

    let before = build(&chart(), &base);
    let after = build(&chart(), &with_unmatched);

    assert_eq!(after.diagnostics.unmatched_entries, before.diagnostics.unmatched_entries + 1);
    assert_eq!(before.totals, after.totals);
    for (a, b) in before.rows.iter().zip(&after.rows) {
        assert_eq!(a.balance, b.balance);
    }
}

#[test]
fn test_residual_labels() {
    let mut chart = chart();
    chart.extend([
        ChartRow::new("6", "Pembiayaan", 1),
        ChartRow::new("6.1", "Penerimaan Pembiayaan", 2),
        ChartRow::new("6.1.1", "SiLPA Tahun Lalu", 3),
        ChartRow::new("6.2", "Pengeluaran Pembiayaan", 2),
        ChartRow::new("6.2.1", "Penyertaan Modal", 3),
    ]);

    // Surplus 100, net financing -40
    let ledger = vec![
        posting("4.1.1", dec!(0), dec!(100)),
        posting("6.2.1", dec!(40), dec!(0)),
    ];
    let report = build(&chart, &ledger);
    assert_eq!(report.totals.surplus_deficit, dec!(100));
    assert_eq!(report.totals.net_financing, dec!(-40));
    assert_eq!(report.totals.residual, dec!(60));
    assert_eq!(report.totals.residual_label, ResidualLabel::Silpa);

    let ledger = vec![posting("5.1.1", dec!(10), dec!(0))];
    let report = build(&chart, &ledger);
    assert_eq!(report.totals.residual, dec!(-10));
    assert_eq!(report.totals.residual_label, ResidualLabel::Sikpa);
    assert_eq!(report.line(SummaryLine::Residual).unwrap().label, "SIKPA");
}

#[test]
fn test_prefix_matching() {
    let config = ReportConfig {
        ledger_match: LedgerMatch::Prefix,
        ..ReportConfig::default()
    };
    let ledger = vec![
        posting("4.1.1.01.02.0003", dec!(0), dec!(700)),
        posting("4.1.1", dec!(0), dec!(300)),
        posting("4.1.10.01", dec!(0), dec!(5)),
    ];
    let report = build_report(&chart(), &ledger, &config, &ReportRequest::default()).unwrap();
    assert_eq!(report.row("4.1.1").unwrap().balance, dec!(1000));
    assert_eq!(report.diagnostics.unmatched_entries, 1);

    let exact = build(&chart(), &ledger);
    assert_eq!(exact.row("4.1.1").unwrap().balance, dec!(300));
    assert_eq!(exact.diagnostics.unmatched_entries, 2);
}

#[test]
fn test_malformed_branch_is_skipped_and_counted() {
    let mut chart = chart();
    chart.push(ChartRow::new("4.2.1", "Salah Level", 2));
    chart.push(ChartRow::new("4.2.1.1", "Anak", 3));
    let ledger = vec![posting("4.1.1", dec!(0), dec!(1000))];

    let report = build(&chart, &ledger);
    assert_eq!(report.diagnostics.malformed_accounts.len(), 2);
    assert_eq!(report.totals.revenue, dec!(1000));
    assert!(report.row("4.2.1").is_none());

    let config = ReportConfig {
        malformed_policy: MalformedPolicy::Abort,
        ..ReportConfig::default()
    };
    let err = build_report(&chart, &ledger, &config, &ReportRequest::default()).unwrap_err();
    assert!(matches!(err, CoreError::MalformedAccountCode { .. }));
}

#[test]
fn test_non_numeric_amounts_count_as_zero() {
    let ledger = vec![
        LedgerRow::new("4.1.1", "", "1000", "Jurnal Umum"),
        LedgerRow::new("4.1.1", "n/a", "abc", "Jurnal Umum"),
    ];
    let report = build(&chart(), &ledger);
    assert_eq!(report.totals.revenue, dec!(1000));
    assert_eq!(report.diagnostics.non_numeric_amounts, 2);
    assert_eq!(report.diagnostics.non_numeric_rows, 1);
}

#[test]
fn test_overflowing_amounts_are_an_error() {
    let big = "50000000000000000000000000000";
    let ledger = vec![
        LedgerRow::new("4.1.1", "0", big, "Jurnal Umum"),
        LedgerRow::new("4.1.1", "0", big, "Jurnal Umum"),
    ];
    let err = build_report(&chart(), &ledger, &ReportConfig::default(), &ReportRequest::default()).unwrap_err();
    assert!(matches!(err, CoreError::AmountOverflow { .. }));

    let filter = LedgerFilter::default();
    let err = filter_ledger(&chart(), &ledger, &filter).unwrap_err();
    assert!(matches!(err, CoreError::AmountOverflow { ref account } if account == "Saldo"));
}

#[test]
fn test_ledger_listing_matches_report_balance() {
    let ledger = vec![
        posting("5.1.1", dec!(600), dec!(0)).with_unit("Dinas A"),
        posting("5.1.1", dec!(0), dec!(50)).with_unit("Dinas A"),
        posting("5.1.1", dec!(200), dec!(0)).with_unit("Dinas B"),
        posting("4.1.1", dec!(0), dec!(1000)).with_unit("Dinas A"),
    ];
    let filter = LedgerFilter {
        level: Some(2),
        accounts: vec!["5.1".to_string()],
        units: vec!["Dinas A".to_string()],
        ..LedgerFilter::default()
    };
    let view = filter_ledger(&chart(), &ledger, &filter).unwrap();
    assert_eq!(view.total_count, 2);
    assert_eq!(view.balance.side, NormalBalance::Debit);

    let request = ReportRequest {
        period: ReportPeriod::All,
        units: vec!["Dinas A".to_string()],
    };
    let report = build_report(&chart(), &ledger, &ReportConfig::default(), &request).unwrap();
    assert_eq!(report.row("5.1").unwrap().balance, view.balance.debit);
}

#[test]
fn test_period_filter() {
    let date = |m| chrono::NaiveDate::from_ymd_opt(2024, m, 10).unwrap();
    let ledger = vec![
        posting("4.1.1", dec!(0), dec!(100)).with_date(date(1)),
        posting("4.1.1", dec!(0), dec!(200)).with_date(date(5)),
        posting("4.1.1", dec!(0), dec!(400)),
    ];
    let request = ReportRequest {
        period: ReportPeriod::Months { year: 2024, from: 1, to: 3 },
        units: Vec::new(),
    };
    let report = build_report(&chart(), &ledger, &ReportConfig::default(), &request).unwrap();
    assert_eq!(report.totals.revenue, dec!(100));
    assert_eq!(report.diagnostics.out_of_period_entries, 2);
    assert_eq!(report.period_description, "Januari - Maret 2024");
}

#[test]
fn test_report_from_csv_tables() {
    let chart_csv = "Kode Akun,Nama Akun,Level\n\
                     4,Pendapatan,1\n\
                     4.1,Pendapatan Asli,2\n\
                     4.1.1,Pajak,3\n\
                     5,Belanja,1\n\
                     5.1,Belanja Pegawai,2\n\
                     5.1.1,Gaji,3\n";
    let ledger_csv = "kd_lv_6,debet,kredit,jns_transaksi\n\
                      4.1.1 ,0,1000,Jurnal Umum\n\
                      5.1.1,600,,Jurnal Umum\n\
                      5.1.1,,600,Jurnal Penutup\n";
    let chart = read_chart_csv(chart_csv.as_bytes()).unwrap();
    let ledger = read_ledger_csv(ledger_csv.as_bytes()).unwrap();

    let report = build(&chart, &ledger);
    assert_eq!(report.totals.residual, dec!(400));
    assert_eq!(report.diagnostics.closing_entries_excluded, 1);
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000, 0u32..3).prop_map(|(n, scale)| Decimal::new(n, scale))
}

proptest! {
    #[test]
    fn prop_residual_is_surplus_plus_net_financing(
        revenue in arb_amount(),
        spending in arb_amount(),
    ) {
        let ledger = vec![posting("4.1.1", dec!(0), revenue), posting("5.1.1", spending, dec!(0))];
        let report = build(&chart(), &ledger);
        prop_assert_eq!(report.totals.surplus_deficit, revenue - spending);
        prop_assert_eq!(report.totals.residual, report.totals.surplus_deficit + report.totals.net_financing);
        let expected = if revenue >= spending { ResidualLabel::Silpa } else { ResidualLabel::Sikpa };
        prop_assert_eq!(report.totals.residual_label, expected);
    }

    #[test]
    fn prop_unmatched_rows_never_change_balances(
        amounts in prop::collection::vec(arb_amount(), 1..10),
    ) {
        let base = vec![posting("4.1.1", dec!(0), dec!(250))];
        let mut noisy = base.clone();
        for (i, amount) in amounts.iter().enumerate() {
            noisy.push(posting(&format!("7.{}", i + 1), *amount, dec!(0)));
        }
        let clean = build(&chart(), &base);
        let report = build(&chart(), &noisy);
        prop_assert_eq!(report.totals, clean.totals);
        prop_assert_eq!(report.diagnostics.unmatched_entries, amounts.len());
    }
}
