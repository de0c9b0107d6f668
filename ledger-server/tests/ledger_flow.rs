//! End-to-end ledger scenarios against a real (throwaway) database:
//! invoice lifecycle, payment allocation, supplier FIFO settlement and
//! return reconciliation.

mod common;

use common::*;
use ledger_server::ledger::payments::RecordPaymentInput;
use ledger_server::ledger::returns::{ReturnItemInput, SubmitReturnInput};
use ledger_server::ledger::supplier_due::SupplierPaymentInput;
use ledger_server::utils::AppError;
use ledger_server::{InvoiceService, PaymentAllocator, ReturnProcessor, SupplierDueAllocator};
use ledger_server::db::repository::{ProductRepository, SupplierPaymentRepository};
use shared::types::{InvoiceStatus, ItemCondition, ReturnStatus};

fn cash(amount: f64) -> RecordPaymentInput {
    RecordPaymentInput {
        amount,
        payment_method: "cash".to_string(),
        payment_date: None,
        notes: None,
    }
}

#[tokio::test]
async fn invoice_with_advance_then_full_payment_reaches_paid() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = PaymentAllocator::new(db.clone());

    let outcome = service
        .create(sales_invoice(None, 20.0, vec![sales_item("bulb", 10, 10.0, None)]))
        .await
        .unwrap();
    assert_eq!(outcome.invoice.total_amount, 100.0);
    assert_eq!(outcome.invoice.remaining_amount, 80.0);
    assert_eq!(outcome.invoice.status, InvoiceStatus::PartiallyPaid);
    assert!(outcome.invoice.invoice_number.starts_with("INV"));

    let invoice_id = outcome.invoice.id.unwrap().to_string();
    let paid = allocator.record_payment(&invoice_id, cash(80.0)).await.unwrap();

    assert_eq!(paid.invoice.remaining_amount, 0.0);
    assert_eq!(paid.invoice.status, InvoiceStatus::Paid);
    assert_eq!(paid.payment.amount, 80.0);
}

#[tokio::test]
async fn partial_payment_leaves_partially_paid() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = PaymentAllocator::new(db.clone());

    let outcome = service
        .create(sales_invoice(None, 20.0, vec![sales_item("bulb", 10, 10.0, None)]))
        .await
        .unwrap();
    let invoice_id = outcome.invoice.id.unwrap().to_string();

    let paid = allocator.record_payment(&invoice_id, cash(30.0)).await.unwrap();
    assert_eq!(paid.invoice.remaining_amount, 50.0);
    assert_eq!(paid.invoice.status, InvoiceStatus::PartiallyPaid);
}

#[tokio::test]
async fn discount_reduces_the_total_before_settlement() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = PaymentAllocator::new(db.clone());

    // Lines worth 100, 15 off: settlement math only ever sees 85
    let mut input = sales_invoice(None, 0.0, vec![sales_item("bulb", 10, 10.0, None)]);
    input.discount_amount = 15.0;
    let outcome = service.create(input).await.unwrap();

    assert_eq!(outcome.invoice.total_amount, 85.0);
    assert_eq!(outcome.invoice.discount_amount, 15.0);
    assert_eq!(outcome.invoice.remaining_amount, 85.0);

    let invoice_id = outcome.invoice.id.unwrap().to_string();
    let err = allocator.record_payment(&invoice_id, cash(100.0)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let paid = allocator.record_payment(&invoice_id, cash(85.0)).await.unwrap();
    assert_eq!(paid.invoice.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn negative_discount_and_oversized_advance_are_rejected() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());

    let mut negative = sales_invoice(None, 0.0, vec![sales_item("bulb", 1, 50.0, None)]);
    negative.discount_amount = -5.0;
    assert!(matches!(
        service.create(negative).await.unwrap_err(),
        AppError::Validation(_)
    ));

    // Advance above the discounted total
    let mut oversized = sales_invoice(None, 60.0, vec![sales_item("bulb", 1, 50.0, None)]);
    oversized.discount_amount = 0.0;
    assert!(matches!(
        service.create(oversized).await.unwrap_err(),
        AppError::Validation(_)
    ));
}

#[tokio::test]
async fn payment_exceeding_balance_is_rejected() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = PaymentAllocator::new(db.clone());

    let outcome = service
        .create(sales_invoice(None, 0.0, vec![sales_item("bulb", 1, 50.0, None)]))
        .await
        .unwrap();
    let invoice_id = outcome.invoice.id.unwrap().to_string();

    let err = allocator.record_payment(&invoice_id, cash(60.0)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Nothing was written
    let detail = service
        .detail(&outcome.items[0].invoice)
        .await
        .unwrap();
    assert!(detail.payments.is_empty());
    assert_eq!(detail.invoice.remaining_amount, 50.0);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = PaymentAllocator::new(db.clone());

    let outcome = service
        .create(sales_invoice(None, 0.0, vec![sales_item("bulb", 1, 50.0, None)]))
        .await
        .unwrap();
    let invoice_id = outcome.invoice.id.unwrap().to_string();

    assert!(matches!(
        allocator.record_payment(&invoice_id, cash(0.0)).await.unwrap_err(),
        AppError::Validation(_)
    ));
    assert!(matches!(
        allocator.record_payment(&invoice_id, cash(-10.0)).await.unwrap_err(),
        AppError::Validation(_)
    ));
}

#[tokio::test]
async fn payment_against_missing_invoice_is_not_found() {
    let (_dir, db) = test_db().await;
    let allocator = PaymentAllocator::new(db.clone());

    let err = allocator
        .record_payment("invoice:doesnotexist", cash(10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn tampered_invoice_row_surfaces_inconsistent_state() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = PaymentAllocator::new(db.clone());

    let outcome = service
        .create(sales_invoice(None, 0.0, vec![sales_item("bulb", 1, 50.0, None)]))
        .await
        .unwrap();
    let invoice_id = outcome.invoice.id.clone().unwrap();

    // Corrupt the derived column behind the ledger's back
    db.query("UPDATE $id SET remaining_amount = 10")
        .bind(("id", invoice_id.clone()))
        .await
        .unwrap()
        .check()
        .unwrap();

    let err = allocator
        .record_payment(&invoice_id.to_string(), cash(5.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InconsistentState(_)));
}

#[tokio::test]
async fn purchase_invoice_seeds_product_dues_fifo() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let supplier = seed_supplier(&db, "Sunlight Traders").await;

    // Lines worth 100 and 50, advance 120: oldest cleared, second at 30
    let outcome = service
        .create(purchase_invoice(
            supplier.to_string(),
            120.0,
            vec![
                purchase_item("bulb 60W", 10, 10.0, 14.0),
                purchase_item("bulb 100W", 5, 10.0, 15.0),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(outcome.invoice.total_amount, 150.0);
    assert_eq!(outcome.invoice.remaining_amount, 30.0);
    assert_eq!(outcome.invoice.status, InvoiceStatus::PartiallyPaid);

    let products = ProductRepository::new(db.clone()).find_all().await.unwrap();
    let mut dues: Vec<(String, f64, f64)> = products
        .iter()
        .map(|p| (p.name.clone(), p.advance_payment, p.remaining_amount))
        .collect();
    dues.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        dues,
        vec![
            ("bulb 100W".to_string(), 20.0, 30.0),
            ("bulb 60W".to_string(), 100.0, 0.0),
        ]
    );
}

#[tokio::test]
async fn supplier_settlement_walks_oldest_first() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = SupplierDueAllocator::new(db.clone());
    let supplier = seed_supplier(&db, "Sunlight Traders").await;

    service
        .create(purchase_invoice(
            supplier.to_string(),
            0.0,
            vec![
                purchase_item("oldest", 1, 50.0, 60.0),
                purchase_item("middle", 1, 30.0, 40.0),
                purchase_item("newest", 1, 20.0, 30.0),
            ],
        ))
        .await
        .unwrap();

    // 70 = oldest cleared + 20 off the middle line, newest untouched
    let outcome = allocator
        .settle(
            &supplier.to_string(),
            SupplierPaymentInput {
                amount: 70.0,
                payment_method: "bank".to_string(),
                reference_number: Some("TX-1".to_string()),
                notes: None,
                payment_date: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.payment.amount, 70.0);
    assert_eq!(outcome.lines.len(), 2);
    assert_eq!(outcome.lines[0].applied, 50.0);
    assert_eq!(outcome.lines[0].remaining_after, 0.0);
    assert_eq!(outcome.lines[1].applied, 20.0);
    assert_eq!(outcome.lines[1].remaining_after, 10.0);

    let products = ProductRepository::new(db.clone()).find_all().await.unwrap();
    let by_name = |name: &str| {
        products
            .iter()
            .find(|p| p.name == name)
            .unwrap()
            .remaining_amount
    };
    assert_eq!(by_name("oldest"), 0.0);
    assert_eq!(by_name("middle"), 10.0);
    assert_eq!(by_name("newest"), 20.0);
}

#[tokio::test]
async fn supplier_settlement_exceeding_outstanding_writes_nothing() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = SupplierDueAllocator::new(db.clone());
    let supplier = seed_supplier(&db, "Sunlight Traders").await;

    service
        .create(purchase_invoice(
            supplier.to_string(),
            0.0,
            vec![purchase_item("only", 1, 50.0, 60.0)],
        ))
        .await
        .unwrap();

    let err = allocator
        .settle(
            &supplier.to_string(),
            SupplierPaymentInput {
                amount: 1000.0,
                payment_method: "bank".to_string(),
                reference_number: None,
                notes: None,
                payment_date: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Idempotent no-op: no payment row, due untouched
    let payments = SupplierPaymentRepository::new(db.clone())
        .list_by_supplier(&supplier)
        .await
        .unwrap();
    assert!(payments.is_empty());

    let products = ProductRepository::new(db.clone()).find_all().await.unwrap();
    assert_eq!(products[0].remaining_amount, 50.0);
}

#[tokio::test]
async fn return_records_full_refund_without_touching_the_ledger() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let processor = ReturnProcessor::new(db.clone());
    let customer = seed_customer(&db, "Farid").await;

    let outcome = service
        .create(sales_invoice(
            Some(customer.to_string()),
            0.0,
            vec![
                sales_item("item A", 2, 10.0, None),
                sales_item("item B", 1, 5.0, None),
            ],
        ))
        .await
        .unwrap();
    let invoice_id = outcome.invoice.id.clone().unwrap();

    let detail = processor
        .submit(SubmitReturnInput {
            invoice: invoice_id.to_string(),
            customer: None,
            items: vec![
                ReturnItemInput {
                    invoice_item: outcome.items[0].id.clone().unwrap().to_string(),
                    quantity: 2,
                    condition: ItemCondition::New,
                },
                ReturnItemInput {
                    invoice_item: outcome.items[1].id.clone().unwrap().to_string(),
                    quantity: 1,
                    condition: ItemCondition::Used,
                },
            ],
            return_reason: "damaged packaging".to_string(),
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(detail.product_return.total_amount, 25.0);
    assert_eq!(detail.product_return.refund_amount, 25.0);
    assert_eq!(detail.product_return.status, ReturnStatus::Pending);
    assert_eq!(detail.items.len(), 2);

    // The invoice is untouched until the return is applied
    let after = service.detail(&invoice_id).await.unwrap();
    assert_eq!(after.invoice.remaining_amount, 25.0);
    assert_eq!(after.invoice.status, InvoiceStatus::Unpaid);
}

#[tokio::test]
async fn return_rejects_overdrawn_quantities_and_empty_selections() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let processor = ReturnProcessor::new(db.clone());

    let outcome = service
        .create(sales_invoice(None, 0.0, vec![sales_item("item A", 2, 10.0, None)]))
        .await
        .unwrap();
    let invoice_id = outcome.invoice.id.unwrap().to_string();

    let err = processor
        .submit(SubmitReturnInput {
            invoice: invoice_id.clone(),
            customer: None,
            items: vec![ReturnItemInput {
                invoice_item: outcome.items[0].id.clone().unwrap().to_string(),
                quantity: 3,
                condition: ItemCondition::New,
            }],
            return_reason: "broken".to_string(),
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = processor
        .submit(SubmitReturnInput {
            invoice: invoice_id,
            customer: None,
            items: vec![],
            return_reason: "broken".to_string(),
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn applied_return_settles_the_invoice_and_restocks() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let allocator = PaymentAllocator::new(db.clone());
    let processor = ReturnProcessor::new(db.clone());
    let supplier = seed_supplier(&db, "Sunlight Traders").await;

    // Stock 10 units, sell 5 of them
    service
        .create(purchase_invoice(
            supplier.to_string(),
            100.0,
            vec![purchase_item("bulb", 10, 10.0, 20.0)],
        ))
        .await
        .unwrap();
    let products = ProductRepository::new(db.clone());
    let product_rid = products.find_all().await.unwrap()[0].id.clone().unwrap();
    let product_id = product_rid.to_string();

    let sale = service
        .create(sales_invoice(
            None,
            0.0,
            vec![sales_item("bulb", 5, 20.0, Some(product_id.clone()))],
        ))
        .await
        .unwrap();
    let invoice_id = sale.invoice.id.clone().unwrap();

    assert_eq!(products.find_by_id(&product_rid).await.unwrap().unwrap().quantity, 5);

    // Pay 40 of 100, then return 2 units (refund 40)
    allocator
        .record_payment(&invoice_id.to_string(), cash(40.0))
        .await
        .unwrap();
    let detail = processor
        .submit(SubmitReturnInput {
            invoice: invoice_id.to_string(),
            customer: None,
            items: vec![ReturnItemInput {
                invoice_item: sale.items[0].id.clone().unwrap().to_string(),
                quantity: 2,
                condition: ItemCondition::New,
            }],
            return_reason: "wrong wattage".to_string(),
            notes: None,
        })
        .await
        .unwrap();

    let return_id = detail.product_return.id.unwrap().to_string();
    let applied = processor.apply(&return_id).await.unwrap();

    // 100 total − 40 paid − 40 refunded = 20 remaining
    assert_eq!(applied.invoice.remaining_amount, 20.0);
    assert_eq!(applied.invoice.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(applied.product_return.status, ReturnStatus::Processed);
    assert!(applied.product_return.processed_at.is_some());

    // 2 units back in stock
    assert_eq!(products.find_by_id(&product_rid).await.unwrap().unwrap().quantity, 7);

    // A second apply must refuse
    let err = processor.apply(&return_id).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // Settling the rest keeps counting the refund as settled
    let paid = allocator
        .record_payment(&invoice_id.to_string(), cash(20.0))
        .await
        .unwrap();
    assert_eq!(paid.invoice.status, InvoiceStatus::Paid);
    assert_eq!(paid.invoice.remaining_amount, 0.0);
}

#[tokio::test]
async fn damaged_return_items_do_not_restock() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let processor = ReturnProcessor::new(db.clone());
    let supplier = seed_supplier(&db, "Sunlight Traders").await;

    service
        .create(purchase_invoice(
            supplier.to_string(),
            0.0,
            vec![purchase_item("bulb", 10, 10.0, 20.0)],
        ))
        .await
        .unwrap();
    let repo = ProductRepository::new(db.clone());
    let product_rid = repo.find_all().await.unwrap()[0].id.clone().unwrap();

    let sale = service
        .create(sales_invoice(
            None,
            0.0,
            vec![sales_item("bulb", 3, 20.0, Some(product_rid.to_string()))],
        ))
        .await
        .unwrap();

    let detail = processor
        .submit(SubmitReturnInput {
            invoice: sale.invoice.id.clone().unwrap().to_string(),
            customer: None,
            items: vec![ReturnItemInput {
                invoice_item: sale.items[0].id.clone().unwrap().to_string(),
                quantity: 2,
                condition: ItemCondition::Damaged,
            }],
            return_reason: "burnt out".to_string(),
            notes: None,
        })
        .await
        .unwrap();

    let applied = processor
        .apply(&detail.product_return.id.unwrap().to_string())
        .await
        .unwrap();
    assert!(applied.restocked.is_empty());

    let product = repo.find_by_id(&product_rid).await.unwrap().unwrap();
    assert_eq!(product.quantity, 7); // 10 − 3, nothing restocked
}

#[tokio::test]
async fn rejected_return_leaves_everything_alone() {
    let (_dir, db) = test_db().await;
    let service = InvoiceService::new(db.clone());
    let processor = ReturnProcessor::new(db.clone());

    let sale = service
        .create(sales_invoice(None, 0.0, vec![sales_item("bulb", 2, 10.0, None)]))
        .await
        .unwrap();
    let invoice_id = sale.invoice.id.clone().unwrap();

    let detail = processor
        .submit(SubmitReturnInput {
            invoice: invoice_id.to_string(),
            customer: None,
            items: vec![ReturnItemInput {
                invoice_item: sale.items[0].id.clone().unwrap().to_string(),
                quantity: 1,
                condition: ItemCondition::New,
            }],
            return_reason: "changed mind".to_string(),
            notes: None,
        })
        .await
        .unwrap();

    let return_id = detail.product_return.id.unwrap().to_string();
    let rejected = processor.reject(&return_id).await.unwrap();
    assert_eq!(rejected.status, ReturnStatus::Rejected);

    let after = service.detail(&invoice_id).await.unwrap();
    assert_eq!(after.invoice.remaining_amount, 20.0);
    assert_eq!(after.invoice.status, InvoiceStatus::Unpaid);

    // Rejected returns cannot be applied afterwards
    let err = processor.apply(&return_id).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
}
