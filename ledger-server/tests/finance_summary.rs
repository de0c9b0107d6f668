//! Financial aggregator scenarios over a seeded database

mod common;

use common::*;
use ledger_server::db::models::{OtherCost, SalaryPayment};
use ledger_server::db::repository::CostRepository;
use ledger_server::ledger::finance::{ChangeDirection, FinanceService, FinanceWindow};
use ledger_server::ledger::lifecycle::InvoiceItemInput;
use ledger_server::ledger::payments::RecordPaymentInput;
use ledger_server::{InvoiceService, PaymentAllocator};

fn hour() -> i64 {
    3600 * 1000
}

fn window_around_now() -> FinanceWindow {
    let now = shared::util::now_millis();
    FinanceWindow {
        start: now - hour(),
        end: now + hour(),
    }
}

fn outer_item(name: &str, quantity: i64, unit_price: f64, buying_price: f64) -> InvoiceItemInput {
    InvoiceItemInput {
        product: None,
        product_name: name.to_string(),
        barcode: None,
        wattage: None,
        size: None,
        color: None,
        quantity,
        unit_price,
        buying_price,
        selling_price: None,
        is_outer_product: true,
    }
}

#[tokio::test]
async fn summary_splits_regular_and_outer_streams() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = PaymentAllocator::new(db.clone());
    let supplier = seed_supplier(&db, "Sunlight Traders").await;
    let customer = seed_customer(&db, "Farid").await;

    // Purchase: total 100, advance 30 → expense 30, both dues at 70
    service
        .create(purchase_invoice(
            supplier.to_string(),
            30.0,
            vec![purchase_item("bulb", 10, 10.0, 15.0)],
        ))
        .await
        .unwrap();

    // Regular sale: total 100, advance 20, then 30 paid → income 50
    let sale = service
        .create(sales_invoice(
            Some(customer.to_string()),
            20.0,
            vec![sales_item("bulb", 10, 10.0, None)],
        ))
        .await
        .unwrap();
    allocator
        .record_payment(
            &sale.invoice.id.clone().unwrap().to_string(),
            RecordPaymentInput {
                amount: 30.0,
                payment_method: "cash".to_string(),
                payment_date: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    // Outer sale: advance 10 stays out of regular income; accrual goes
    // to the outer stream (100 income, 60 cost)
    service
        .create(sales_invoice(
            None,
            10.0,
            vec![outer_item("generator", 2, 50.0, 30.0)],
        ))
        .await
        .unwrap();

    // Expense feeds
    let costs = CostRepository::new(db.clone());
    let now = shared::util::now_millis();
    costs
        .create_cost(OtherCost {
            id: None,
            amount: 15.0,
            category: "rent".to_string(),
            cost_date: now,
            notes: None,
            created_at: now,
        })
        .await
        .unwrap();
    costs
        .create_salary(SalaryPayment {
            id: None,
            employee_name: "Ahmad".to_string(),
            amount: 25.0,
            payment_date: now,
            created_at: now,
        })
        .await
        .unwrap();

    let finance = FinanceService::new(db.clone());
    let summary = finance.summary(window_around_now(), None).await.unwrap();

    assert_eq!(summary.totals.income, 50.0);
    assert_eq!(summary.totals.expenses, 70.0); // 30 advance + 15 + 25
    assert_eq!(summary.totals.net_profit, -20.0);

    assert_eq!(summary.totals.outer_income, 100.0);
    assert_eq!(summary.totals.outer_expense, 60.0);
    assert_eq!(summary.totals.outer_profit, 40.0);
    assert_eq!(summary.totals.combined_net_profit, 20.0);

    // Sales remaining 50 + outer remaining 90
    assert_eq!(summary.outstanding_customer_credit, 140.0);
    // Invoice-level and product-level supplier ledgers, side by side
    assert_eq!(summary.supplier_invoice_due, 70.0);
    assert_eq!(summary.supplier_product_due, 70.0);
    assert_eq!(summary.supplier_credit_due, 140.0);

    // Previous window is empty
    assert_eq!(summary.change.income.percent, 100.0);
    assert_eq!(summary.change.income.direction, ChangeDirection::Increase);
    assert_eq!(summary.change.net_profit.percent, 100.0);
    assert_eq!(summary.change.net_profit.direction, ChangeDirection::Decrease);
}

#[tokio::test]
async fn summary_is_a_pure_function_of_the_rows() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let customer = seed_customer(&db, "Farid").await;

    service
        .create(sales_invoice(
            Some(customer.to_string()),
            12.34,
            vec![sales_item("bulb", 3, 9.99, None)],
        ))
        .await
        .unwrap();

    let finance = FinanceService::new(db.clone());
    let window = window_around_now();
    let first = finance.summary(window, None).await.unwrap();
    let second = finance.summary(window, None).await.unwrap();

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn shop_filter_excludes_other_shops() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());

    let mut shop_a = sales_invoice(None, 40.0, vec![sales_item("bulb", 2, 50.0, None)]);
    shop_a.shop_id = Some("shop-a".to_string());
    service.create(shop_a).await.unwrap();

    let mut shop_b = sales_invoice(None, 70.0, vec![sales_item("bulb", 1, 80.0, None)]);
    shop_b.shop_id = Some("shop-b".to_string());
    service.create(shop_b).await.unwrap();

    let finance = FinanceService::new(db.clone());
    let window = window_around_now();

    let filtered = finance
        .summary(window, Some("shop-a".to_string()))
        .await
        .unwrap();
    assert_eq!(filtered.totals.income, 40.0);
    assert_eq!(filtered.outstanding_customer_credit, 60.0);

    let unfiltered = finance.summary(window, None).await.unwrap();
    assert_eq!(unfiltered.totals.income, 110.0);
    assert_eq!(unfiltered.outstanding_customer_credit, 70.0);
}

#[tokio::test]
async fn advance_only_purchase_invoice_is_an_expense() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let supplier = seed_supplier(&db, "Sunlight Traders").await;

    // Fully advance-paid purchase: expense 50, nothing outstanding
    let outcome = service
        .create(purchase_invoice(
            supplier.to_string(),
            50.0,
            vec![purchase_item("bulb", 5, 10.0, 15.0)],
        ))
        .await
        .unwrap();
    assert_eq!(outcome.invoice.remaining_amount, 0.0);

    let finance = FinanceService::new(db.clone());
    let summary = finance.summary(window_around_now(), None).await.unwrap();

    assert_eq!(summary.totals.expenses, 50.0);
    assert_eq!(summary.supplier_invoice_due, 0.0);
    assert_eq!(summary.supplier_product_due, 0.0);
}
