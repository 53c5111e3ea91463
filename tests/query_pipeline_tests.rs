//! List-pipeline integration tests over the real collections and their
//! `query_spec()` accessor tables, as the list endpoints run them.

use parfum::catalog::{self, ProductCatalog};
use parfum::orders::{self, NewOrder, OrderBook};
use parfum::query::{self, ListParams, QueryRequest};

fn seeded_catalog() -> ProductCatalog {
    let catalog = ProductCatalog::new();
    catalog.seed_demo();
    catalog
}

fn params(f: impl FnOnce(&mut ListParams)) -> ListParams {
    let mut p = ListParams::default();
    f(&mut p);
    p
}

#[test]
fn product_search_finds_chanel_case_insensitively() {
    let catalog = seeded_catalog();
    let req = QueryRequest::from_params(
        &params(|p| p.search = Some("chanel".into())),
        &["category", "status"],
        "createdAt",
    )
    .unwrap();
    let out = query::run(&catalog.snapshot(), &req, &catalog::query_spec());
    assert_eq!(out.total, 1);
    assert_eq!(out.data[0].id, "prod_123");
}

#[test]
fn product_category_filter_is_exact() {
    let catalog = seeded_catalog();
    let req = QueryRequest::from_params(
        &params(|p| p.category = Some("mens".into())),
        &["category", "status"],
        "createdAt",
    )
    .unwrap();
    let out = query::run(&catalog.snapshot(), &req, &catalog::query_spec());
    assert_eq!(out.data.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["prod_124"]);
}

#[test]
fn products_default_to_newest_first() {
    let catalog = seeded_catalog();
    let req =
        QueryRequest::from_params(&ListParams::default(), &["category", "status"], "createdAt")
            .unwrap();
    let out = query::run(&catalog.snapshot(), &req, &catalog::query_spec());
    assert_eq!(
        out.data.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["prod_125", "prod_124", "prod_123"]
    );
}

#[test]
fn concatenated_product_pages_reproduce_the_full_listing() {
    let catalog = seeded_catalog();
    for i in 0..7 {
        catalog
            .create(parfum::catalog::ProductDraft {
                name: Some(format!("Extra {i}")),
                price: Some(100_000 + i),
                ..Default::default()
            })
            .unwrap();
    }
    let snapshot = catalog.snapshot();
    let all = query::run(
        &snapshot,
        &QueryRequest::from_params(
            &params(|p| {
                p.sort_by = Some("price".into());
                p.limit = Some(snapshot.len().to_string());
            }),
            &["category", "status"],
            "createdAt",
        )
        .unwrap(),
        &catalog::query_spec(),
    );

    let mut collected = Vec::new();
    let mut page = 1;
    loop {
        let out = query::run(
            &snapshot,
            &QueryRequest::from_params(
                &params(|p| {
                    p.sort_by = Some("price".into());
                    p.page = Some(page.to_string());
                    p.limit = Some("4".into());
                }),
                &["category", "status"],
                "createdAt",
            )
            .unwrap(),
            &catalog::query_spec(),
        );
        collected.extend(out.data);
        if page >= out.total_pages {
            break;
        }
        page += 1;
    }
    assert_eq!(collected, all.data);
}

#[test]
fn orders_sort_by_total_descending() {
    let book = OrderBook::new();
    book.seed_demo();
    for total in [500_000, 4_000_000] {
        book.create(NewOrder {
            customer_info: Some(parfum::orders::CustomerInfo {
                first_name: "Mai".into(),
                last_name: "Le".into(),
                email: "mai@example.com".into(),
                phone: "0987".into(),
                address: "42 Rue de Test".into(),
            }),
            items: Some(vec![]),
            total: Some(total),
        })
        .unwrap();
    }
    let req = QueryRequest::from_params(
        &params(|p| {
            p.sort_by = Some("total".into());
            p.sort_order = Some("desc".into());
        }),
        &["status"],
        "createdAt",
    )
    .unwrap();
    let out = query::run(&book.snapshot(), &req, &orders::query_spec());
    assert_eq!(
        out.data.iter().map(|o| o.total).collect::<Vec<_>>(),
        vec![4_000_000, 3_000_000, 500_000]
    );
}

#[test]
fn order_search_matches_customer_name() {
    let book = OrderBook::new();
    book.seed_demo();
    let req = QueryRequest::from_params(
        &params(|p| p.search = Some("an nguyen".into())),
        &["status"],
        "createdAt",
    )
    .unwrap();
    let out = query::run(&book.snapshot(), &req, &orders::query_spec());
    assert_eq!(out.total, 1);
    assert_eq!(out.data[0].id, "ORD-1703123456789");
}
