#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Export integration tests.

mod common;

use chrono::NaiveDate;
use tokio_stream::StreamExt;

use clientela_kernel::export;
use clientela_kernel::models::CustomerDraft;
use clientela_kernel::query::QueryParams;
use clientela_kernel::store::MemoryCustomerStore;
use clientela_kernel::{AppError, RequestContext};

use common::{collect, customer, draft, ids, params, service, store_with_names};

async fn csv_text(svc: &clientela_kernel::CustomerService, params: &QueryParams) -> String {
    let mut lines = svc
        .export_csv(&RequestContext::new(), params)
        .await
        .unwrap();
    let mut out = String::new();
    while let Some(line) = lines.next().await {
        out.push_str(&line.unwrap());
    }
    out
}

#[tokio::test]
async fn default_export_is_id_descending_with_sixteen_columns() {
    let svc = service(store_with_names(&[(1, "Ana"), (2, "Bia"), (3, "Cid")]));

    let text = csv_text(&svc, &QueryParams::default()).await;
    let lines: Vec<&str> = text.split_terminator("\r\n").collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "id,name,phone,organization,contract,dispatch_count,last_dispatch,tax_id,\
         responsible_id,attendance_1,attendance_2,attendance_3,attendance_4,\
         final_status,email,contact_email"
    );
    for line in &lines {
        assert_eq!(line.split(',').count(), 16, "{line}");
    }

    let exported_ids: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(exported_ids, vec!["3", "2", "1"]);
}

#[tokio::test]
async fn export_applies_search_and_sort() {
    let svc = service(store_with_names(&[
        (1, "Ana"),
        (2, "Banana"),
        (3, "Carla"),
        (4, "Mariana"),
    ]));

    let rows = collect(
        svc.export(
            &RequestContext::new(),
            &params(Some("ana"), Some("name"), Some("asc"), Some("2"), Some("1")),
        )
        .await
        .unwrap(),
    )
    .await;

    // Paging parameters have no effect on export.
    assert_eq!(ids(&rows), vec![1, 2, 4]);
}

#[tokio::test]
async fn absent_values_and_dates_render_plainly() {
    let store = MemoryCustomerStore::with_customers([customer(
        10,
        CustomerDraft {
            organization: Some("Silva, Souza & Cia".to_string()),
            attendance_2: NaiveDate::from_ymd_opt(2025, 1, 9),
            final_status: Some("canceled".to_string()),
            contact_email: Some("ops@silva.com.br".to_string()),
            ..draft("Jo\u{e3}o \"Jota\"")
        },
    )]);
    let svc = service(std::sync::Arc::new(store));

    let text = csv_text(&svc, &QueryParams::default()).await;
    let row = text.split_terminator("\r\n").nth(1).unwrap();

    assert_eq!(
        row,
        "10,\"Jo\u{e3}o \"\"Jota\"\"\",11999990000,\"Silva, Souza & Cia\",CT-1,0,,,,,\
         2025-01-09,,,C,,ops@silva.com.br"
    );
}

#[tokio::test]
async fn export_to_writer_counts_records() {
    let svc = service(store_with_names(&[(1, "Ana"), (2, "Bia")]));
    let rows = svc
        .export(&RequestContext::new(), &QueryParams::default())
        .await
        .unwrap();

    let mut out = Vec::new();
    let written = export::write_csv(rows, &mut out).await.unwrap();

    assert_eq!(written, 2);
    assert!(String::from_utf8(out).unwrap().starts_with("id,name,"));
}

#[tokio::test]
async fn empty_result_still_has_header() {
    let svc = service(store_with_names(&[(1, "Ana")]));
    let text = csv_text(&svc, &params(Some("nobody"), None, None, None, None)).await;
    assert_eq!(text, export::header_line());
}

#[tokio::test]
async fn unreachable_store_fails_before_any_output() {
    let store = store_with_names(&[(1, "Ana")]);
    store.set_unavailable(true);
    let svc = service(store);

    let result = svc
        .export_csv(&RequestContext::new(), &QueryParams::default())
        .await;
    let Err(err) = result else {
        panic!("export should fail");
    };
    assert!(matches!(err, AppError::Database(_)));
    assert!(err.is_retryable());
}
