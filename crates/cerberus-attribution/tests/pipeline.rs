//! End-to-end runs of the merge pipeline over JSON batches.

use cerberus_attribution::{run_merge, AttributionError, BatchKind, MergeInput, RecordError};
use cerberus_core::AlertThresholds;
use rust_decimal::Decimal;
use serde_json::{json, Value};

fn scenario_ad() -> Value {
    json!({
        "campaign_id": "C1",
        "adset_id": "AS1",
        "ad_id": "A1",
        "spend": 45.67,
        "clicks": 234,
        "lead_conversions": 8,
        "total_conversions": 8
    })
}

fn scenario_lead(converted: bool) -> Value {
    json!({
        "utm_campaign_id": "C1",
        "utm_adset_id": "AS1",
        "utm_ad_id": "A1",
        "converted": converted
    })
}

fn run(input: &MergeInput) -> cerberus_attribution::MergeReport {
    run_merge(input, &AlertThresholds::default()).expect("batches are arrays")
}

#[test]
fn crm_leads_drive_recomputed_metrics() {
    let report = run(&MergeInput {
        meta: json!([scenario_ad()]),
        google: json!([]),
        leads: json!([scenario_lead(false), scenario_lead(true)]),
    });

    let row = &report.batch.rows[0];
    assert!(row.has_salesforce_data);
    assert_eq!(row.sf_lead_count, 2);
    assert_eq!(row.sf_converted_count, 1);
    assert_eq!(row.cost_per_lead, Decimal::new(2284, 2));
    assert_eq!(row.cost_per_conversion, Decimal::new(4567, 2));
    assert_eq!(row.click_to_conversion_rate, Decimal::new(85, 2));

    let value = serde_json::to_value(row).unwrap();
    assert_eq!(value["attribution_quality"], "ID_Matched");
}

#[test]
fn platform_counts_are_used_without_leads() {
    let report = run(&MergeInput {
        meta: json!([scenario_ad()]),
        google: json!([]),
        leads: json!([]),
    });

    let row = &report.batch.rows[0];
    assert!(!row.has_salesforce_data);
    assert_eq!(row.cost_per_lead, Decimal::new(571, 2));
    assert_eq!(row.sf_lead_count, 0);
    assert!(row.sf_first_lead_email.is_none());
}

#[test]
fn every_row_shares_the_union_schema() {
    let report = run(&MergeInput {
        meta: json!([
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A1", "spend": 10,
              "conversions_purchase": 2 },
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A2", "spend": 10 }
        ]),
        google: json!([
            { "campaign_id": 111, "adset_id": 222, "ad_id": 333, "spend": "4.20",
              "conversions": { "lead": 1.5 } }
        ]),
        leads: json!([]),
    });

    assert_eq!(report.batch.rows.len(), 3);
    let columns = &report.batch.columns;
    assert!(columns.contains(&"conversions_purchase".to_string()));
    assert!(columns.contains(&"conversions_lead".to_string()));

    for row in &report.batch.rows {
        let value = serde_json::to_value(row).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), columns.len());
        assert!(columns.iter().all(|c| object.contains_key(c)));
    }
    assert_eq!(
        report.batch.rows[1].conversion_columns["conversions_purchase"],
        Decimal::ZERO
    );
    assert_eq!(report.batch.rows[2].unified_id, "google_111_222_333");
    assert_eq!(report.schema_drift.len(), 2);
}

#[test]
fn output_has_one_row_per_valid_ad_in_order() {
    let report = run(&MergeInput {
        meta: json!([
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A3", "spend": 1 },
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A1", "spend": 1 }
        ]),
        google: json!([{ "campaign_id": "G", "adset_id": "GA", "ad_id": "A2", "spend": 1 }]),
        leads: json!([
            scenario_lead(true),
            scenario_lead(false),
            { "lead_id": "L3", "utm_campaign_id": "C1", "utm_adset_id": "AS1", "utm_ad_id": "" }
        ]),
    });

    let ids: Vec<&str> = report.batch.rows.iter().map(|r| r.ad_id.as_str()).collect();
    assert_eq!(ids, vec!["A3", "A1", "A2"]);
    assert_eq!(report.summary.matched_records, 1);
    assert_eq!(report.unattributed_leads, 1);
    assert_eq!(report.summary.records_by_platform["meta"], 2);
    assert_eq!(report.summary.records_by_platform["google"], 1);
}

#[test]
fn malformed_records_are_skipped_not_fatal() {
    let report = run(&MergeInput {
        meta: json!([
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A1" },
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A2", "spend": -5 },
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A3", "spend": 5 }
        ]),
        google: json!(["not an object"]),
        leads: json!([{ "lead_id": "L9", "converted": "yes" }]),
    });

    assert_eq!(report.batch.rows.len(), 1);
    assert_eq!(report.skipped.len(), 4);

    let first = &report.skipped[0];
    assert_eq!(first.batch, BatchKind::Meta);
    assert_eq!(first.index, 0);
    assert_eq!(
        first.error,
        RecordError::MissingField {
            field: "spend".to_string()
        }
    );
    assert!(matches!(
        report.skipped[1].error,
        RecordError::NegativeSpend { .. }
    ));
    assert_eq!(report.skipped[2].batch, BatchKind::Google);
    assert_eq!(report.skipped[3].batch, BatchKind::Leads);
}

#[test]
fn non_array_batch_fails_the_run() {
    let err = run_merge(
        &MergeInput {
            meta: json!([]),
            google: json!([]),
            leads: json!({ "records": [] }),
        },
        &AlertThresholds::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        AttributionError::NotASequence {
            batch: BatchKind::Leads,
            found: "object"
        }
    ));
}

#[test]
fn flags_reach_the_exported_rows() {
    let report = run(&MergeInput {
        meta: json!([
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "Z", "spend": 89.5,
              "clicks": 230, "ctr": 1.2 },
            { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "T", "spend": 60,
              "clicks": 200, "ctr": 1.0, "total_conversions": 8, "lead_conversions": 8 }
        ]),
        google: json!([]),
        leads: json!([]),
    });

    assert!(report.batch.rows[0].zero_performance_flag);
    assert!(!report.batch.rows[0].top_performer_flag);
    assert!(report.batch.rows[1].top_performer_flag);
    assert_eq!(report.summary.zero_performance_count, 1);
    assert_eq!(report.summary.top_performer_count, 1);
}

#[test]
fn out_of_range_values_never_abort_the_run() {
    let huge = "50000000000000000000000000000";
    let report = run_merge(
        &MergeInput {
            meta: json!([
                { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A0", "spend": 1,
                  "conversions": { "lead": huge, "purchase": huge } },
                { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A1", "spend": 10,
                  "clicks": 1, "lead_conversions": "1000000000000000000000000000" },
                { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A2", "spend": huge },
                { "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A3", "spend": huge }
            ]),
            google: json!([]),
            leads: json!([]),
        },
        &AlertThresholds::default(),
    )
    .expect("out-of-range values are handled per record");

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 0);
    assert!(matches!(
        report.skipped[0].error,
        RecordError::InvalidField { ref field, .. } if field == "conversions"
    ));

    let ids: Vec<&str> = report.batch.rows.iter().map(|r| r.ad_id.as_str()).collect();
    assert_eq!(ids, vec!["A1", "A2", "A3"]);
    assert_eq!(report.batch.rows[0].click_to_conversion_rate, Decimal::ZERO);
    assert_eq!(report.summary.total_spend, Decimal::MAX);
}
