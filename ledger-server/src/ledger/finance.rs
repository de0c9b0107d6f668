//! Financial Aggregation
//!
//! Pure read/reduce over the stored rows: nothing here writes back into
//! the ledger. [`summarize`] and [`percent_change`] are pure functions
//! of their inputs, so running the aggregator twice over an unchanged
//! dataset produces identical numbers.
//!
//! Income and expenses are cash-based (payments received/made in the
//! window plus advances of invoices created in the window). The outer
//! stream is accrual-based from the flagged invoice-item rows and is
//! kept fully separate; the two streams only meet in
//! `combined_net_profit`.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Invoice, InvoiceItem, OtherCost, Payment, SalaryPayment};
use crate::db::repository::{
    CostRepository, InvoiceItemRepository, InvoiceRepository, PaymentRepository, ProductRepository,
};
use crate::ledger::money::{sum_amounts, to_decimal, to_f64};
use crate::utils::AppResult;
use shared::types::InvoiceType;

// ============================================================================
// Pure reduction
// ============================================================================

/// Everything the reducer needs for one window, pre-fetched
#[derive(Debug, Default)]
pub struct FinanceInputs {
    /// Invoices created within the window (advance contributions)
    pub invoices_created: Vec<Invoice>,
    /// Payments dated within the window
    pub payments: Vec<Payment>,
    /// The invoices those payments belong to (shop-filtered)
    pub payment_invoices: Vec<Invoice>,
    /// Items of `invoices_created` ∪ `payment_invoices` (outer
    /// classification + outer accrual)
    pub items: Vec<InvoiceItem>,
    pub other_costs: Vec<OtherCost>,
    pub salary_payments: Vec<SalaryPayment>,
}

/// Reduced totals for one window
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StreamTotals {
    pub income: f64,
    pub expenses: f64,
    pub net_profit: f64,
    pub outer_income: f64,
    pub outer_expense: f64,
    pub outer_profit: f64,
    /// net_profit + outer_profit, merged at display time only
    pub combined_net_profit: f64,
}

/// Reduce one window's rows into totals
pub fn summarize(inputs: &FinanceInputs) -> StreamTotals {
    // An invoice belongs to the outer stream when any of its items is
    // outer-flagged; such invoices are excluded from the regular
    // cash-based streams entirely.
    let outer_invoices: HashSet<String> = inputs
        .items
        .iter()
        .filter(|item| item.is_outer_product)
        .map(|item| item.invoice.to_string())
        .collect();

    let created_by_id: HashMap<String, &Invoice> = inputs
        .invoices_created
        .iter()
        .filter_map(|inv| inv.id.as_ref().map(|id| (id.to_string(), inv)))
        .collect();
    let payment_invoice_by_id: HashMap<String, &Invoice> = inputs
        .payment_invoices
        .iter()
        .filter_map(|inv| inv.id.as_ref().map(|id| (id.to_string(), inv)))
        .collect();

    let mut income = Decimal::ZERO;
    let mut invoice_expenses = Decimal::ZERO;

    // Payments received/made within the window
    for payment in &inputs.payments {
        let invoice_key = payment.invoice.to_string();
        let Some(invoice) = payment_invoice_by_id.get(&invoice_key) else {
            // Filtered out (other shop)
            continue;
        };
        if outer_invoices.contains(&invoice_key) {
            continue;
        }
        match invoice.invoice_type {
            InvoiceType::Sales => income += to_decimal(payment.amount),
            InvoiceType::ProductAddition => invoice_expenses += to_decimal(payment.amount),
        }
    }

    // Advances of invoices created within the window act as payments
    for invoice in &inputs.invoices_created {
        let Some(id) = invoice.id.as_ref() else {
            continue;
        };
        if outer_invoices.contains(&id.to_string()) {
            continue;
        }
        match invoice.invoice_type {
            InvoiceType::Sales => income += to_decimal(invoice.advance_payment),
            InvoiceType::ProductAddition => {
                invoice_expenses += to_decimal(invoice.advance_payment)
            }
        }
    }

    // Outer stream: accrual from the flagged lines of invoices created
    // in the window
    let mut outer_income = Decimal::ZERO;
    let mut outer_expense = Decimal::ZERO;
    for item in &inputs.items {
        if !item.is_outer_product {
            continue;
        }
        let Some(invoice) = created_by_id.get(&item.invoice.to_string()) else {
            continue;
        };
        match invoice.invoice_type {
            InvoiceType::Sales => {
                outer_income += to_decimal(item.total_price);
                outer_expense +=
                    to_decimal(item.buying_price) * Decimal::from(item.quantity);
            }
            InvoiceType::ProductAddition => {
                outer_expense += to_decimal(item.total_price);
            }
        }
    }

    let costs = sum_amounts(inputs.other_costs.iter().map(|c| &c.amount));
    let salaries = sum_amounts(inputs.salary_payments.iter().map(|s| &s.amount));
    let expenses = costs + salaries + invoice_expenses;

    let net_profit = income - expenses;
    let outer_profit = outer_income - outer_expense;

    StreamTotals {
        income: to_f64(income),
        expenses: to_f64(expenses),
        net_profit: to_f64(net_profit),
        outer_income: to_f64(outer_income),
        outer_expense: to_f64(outer_expense),
        outer_profit: to_f64(outer_profit),
        combined_net_profit: to_f64(net_profit + outer_profit),
    }
}

// ============================================================================
// Period-over-period change
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Increase,
    Decrease,
    Flat,
}

/// Percentage change vs the previous window, always non-negative with
/// the sign carried by `direction`
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PeriodChange {
    pub percent: f64,
    pub direction: ChangeDirection,
}

/// `(current − previous) / |previous| × 100`, with the zero-previous
/// convention: any growth from zero reports 100%, any drop reports
/// 100%, zero-to-zero reports 0%.
pub fn percent_change(current: f64, previous: f64) -> PeriodChange {
    let current = to_decimal(current);
    let previous = to_decimal(previous);

    if previous == Decimal::ZERO {
        return if current > Decimal::ZERO {
            PeriodChange {
                percent: 100.0,
                direction: ChangeDirection::Increase,
            }
        } else if current < Decimal::ZERO {
            PeriodChange {
                percent: 100.0,
                direction: ChangeDirection::Decrease,
            }
        } else {
            PeriodChange {
                percent: 0.0,
                direction: ChangeDirection::Flat,
            }
        };
    }

    let ratio = (current - previous) / previous.abs() * Decimal::ONE_HUNDRED;
    let direction = if ratio > Decimal::ZERO {
        ChangeDirection::Increase
    } else if ratio < Decimal::ZERO {
        ChangeDirection::Decrease
    } else {
        ChangeDirection::Flat
    };

    PeriodChange {
        percent: to_f64(ratio.abs()),
        direction,
    }
}

// ============================================================================
// Customer balance
// ============================================================================

/// Derived balance over one customer's sales invoices
///
/// `balance = total_due − total_paid`; a negative balance is store
/// credit (the customer has settled more than was invoiced).
#[derive(Debug, Clone, Serialize)]
pub struct CustomerBalance {
    pub total_due: f64,
    pub total_paid: f64,
    pub balance: f64,
}

pub fn customer_balance(
    invoices: &[Invoice],
    payments_sum: f64,
    refunds_sum: f64,
) -> CustomerBalance {
    let total_due = sum_amounts(invoices.iter().map(|i| &i.total_amount));
    let advances = sum_amounts(invoices.iter().map(|i| &i.advance_payment));
    let total_paid = advances + to_decimal(payments_sum) + to_decimal(refunds_sum);

    CustomerBalance {
        total_due: to_f64(total_due),
        total_paid: to_f64(total_paid),
        balance: to_f64(total_due - total_paid),
    }
}

// ============================================================================
// Service (fetch + reduce)
// ============================================================================

/// Time window in Unix millis, `[start, end)`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FinanceWindow {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryChange {
    pub income: PeriodChange,
    pub expenses: PeriodChange,
    pub net_profit: PeriodChange,
}

#[derive(Debug, Serialize)]
pub struct FinanceSummary {
    pub window: FinanceWindow,
    pub totals: StreamTotals,
    /// Σ remaining over non-paid sales invoices
    pub outstanding_customer_credit: f64,
    /// Σ remaining over non-paid product-addition invoices
    pub supplier_invoice_due: f64,
    /// Σ product.remaining_amount — the second supplier ledger
    pub supplier_product_due: f64,
    /// Both supplier ledgers combined
    pub supplier_credit_due: f64,
    pub change: SummaryChange,
}

pub struct FinanceService {
    invoices: InvoiceRepository,
    items: InvoiceItemRepository,
    payments: PaymentRepository,
    products: ProductRepository,
    costs: CostRepository,
}

impl FinanceService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            invoices: InvoiceRepository::new(db.clone()),
            items: InvoiceItemRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            costs: CostRepository::new(db),
        }
    }

    /// Full summary for a window, with change vs the preceding window
    /// of equal length
    pub async fn summary(
        &self,
        window: FinanceWindow,
        shop_id: Option<String>,
    ) -> AppResult<FinanceSummary> {
        let totals = summarize(&self.collect(window, shop_id.clone()).await?);

        let span = window.end - window.start;
        let previous_window = FinanceWindow {
            start: window.start - span,
            end: window.start,
        };
        let previous = summarize(&self.collect(previous_window, shop_id.clone()).await?);

        let outstanding_customer_credit = to_f64(sum_amounts(
            self.invoices
                .list_unpaid(InvoiceType::Sales, shop_id.clone())
                .await?
                .iter()
                .map(|i| &i.remaining_amount),
        ));
        let supplier_invoice_due = to_f64(sum_amounts(
            self.invoices
                .list_unpaid(InvoiceType::ProductAddition, shop_id.clone())
                .await?
                .iter()
                .map(|i| &i.remaining_amount),
        ));
        let supplier_product_due = self.products.sum_outstanding_all(shop_id).await?;

        let change = SummaryChange {
            income: percent_change(totals.income, previous.income),
            expenses: percent_change(totals.expenses, previous.expenses),
            net_profit: percent_change(totals.net_profit, previous.net_profit),
        };

        Ok(FinanceSummary {
            window,
            totals,
            outstanding_customer_credit,
            supplier_invoice_due,
            supplier_product_due,
            supplier_credit_due: to_f64(
                to_decimal(supplier_invoice_due) + to_decimal(supplier_product_due),
            ),
            change,
        })
    }

    /// Fetch every row the reducer needs for one window
    ///
    /// Shop filtering happens on invoices; payments inherit it through
    /// their invoice. Costs and salaries carry no shop and only feed
    /// the unfiltered view.
    async fn collect(
        &self,
        window: FinanceWindow,
        shop_id: Option<String>,
    ) -> AppResult<FinanceInputs> {
        let invoices_created = self
            .invoices
            .list_created_between(window.start, window.end, shop_id.clone())
            .await?;
        let payments = self.payments.list_between(window.start, window.end).await?;

        let payment_invoice_ids: Vec<RecordId> = {
            let mut seen = HashSet::new();
            payments
                .iter()
                .map(|p| p.invoice.clone())
                .filter(|id| seen.insert(id.to_string()))
                .collect()
        };
        let mut payment_invoices = self.invoices.find_by_ids(payment_invoice_ids).await?;
        if let Some(shop) = &shop_id {
            payment_invoices.retain(|inv| inv.shop_id.as_deref() == Some(shop.as_str()));
        }

        let item_invoice_ids: Vec<RecordId> = {
            let mut seen = HashSet::new();
            invoices_created
                .iter()
                .chain(payment_invoices.iter())
                .filter_map(|inv| inv.id.clone())
                .filter(|id| seen.insert(id.to_string()))
                .collect()
        };
        let items = self.items.list_by_invoice_ids(item_invoice_ids).await?;

        let (other_costs, salary_payments) = if shop_id.is_none() {
            (
                self.costs.list_costs_between(window.start, window.end).await?,
                self.costs
                    .list_salaries_between(window.start, window.end)
                    .await?,
            )
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(FinanceInputs {
            invoices_created,
            payments,
            payment_invoices,
            items,
            other_costs,
            salary_payments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::InvoiceStatus;

    fn invoice(key: &str, invoice_type: InvoiceType, advance: f64) -> Invoice {
        Invoice {
            id: Some(RecordId::from_table_key("invoice", key)),
            invoice_number: format!("INV-{key}"),
            invoice_type,
            total_amount: 0.0,
            advance_payment: advance,
            discount_amount: 0.0,
            remaining_amount: 0.0,
            status: InvoiceStatus::Unpaid,
            customer: None,
            supplier: None,
            shop_id: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn payment(invoice_key: &str, amount: f64) -> Payment {
        Payment {
            id: None,
            invoice: RecordId::from_table_key("invoice", invoice_key),
            amount,
            payment_method: "cash".to_string(),
            payment_date: 0,
            notes: None,
            created_at: 0,
        }
    }

    fn item(invoice_key: &str, total: f64, buying: f64, qty: i64, outer: bool) -> InvoiceItem {
        InvoiceItem {
            id: None,
            invoice: RecordId::from_table_key("invoice", invoice_key),
            product: None,
            product_name: "bulb".to_string(),
            barcode: None,
            wattage: None,
            size: None,
            color: None,
            quantity: qty,
            unit_price: if qty > 0 { total / qty as f64 } else { 0.0 },
            total_price: total,
            buying_price: buying,
            is_outer_product: outer,
            created_at: 0,
        }
    }

    #[test]
    fn test_income_from_payments_and_advances() {
        let inputs = FinanceInputs {
            invoices_created: vec![invoice("a", InvoiceType::Sales, 20.0)],
            payments: vec![payment("a", 30.0), payment("b", 50.0)],
            payment_invoices: vec![
                invoice("a", InvoiceType::Sales, 20.0),
                invoice("b", InvoiceType::Sales, 0.0),
            ],
            ..Default::default()
        };
        let totals = summarize(&inputs);
        // 30 + 50 received + 20 advance
        assert_eq!(totals.income, 100.0);
        assert_eq!(totals.expenses, 0.0);
        assert_eq!(totals.net_profit, 100.0);
    }

    #[test]
    fn test_product_addition_payments_are_expenses() {
        let inputs = FinanceInputs {
            invoices_created: vec![invoice("p", InvoiceType::ProductAddition, 10.0)],
            payments: vec![payment("p", 40.0)],
            payment_invoices: vec![invoice("p", InvoiceType::ProductAddition, 10.0)],
            ..Default::default()
        };
        let totals = summarize(&inputs);
        assert_eq!(totals.income, 0.0);
        assert_eq!(totals.expenses, 50.0);
        assert_eq!(totals.net_profit, -50.0);
    }

    #[test]
    fn test_costs_and_salaries_feed_expenses() {
        let inputs = FinanceInputs {
            other_costs: vec![OtherCost {
                id: None,
                amount: 15.0,
                category: "rent".to_string(),
                cost_date: 0,
                notes: None,
                created_at: 0,
            }],
            salary_payments: vec![SalaryPayment {
                id: None,
                employee_name: "A".to_string(),
                amount: 25.0,
                payment_date: 0,
                created_at: 0,
            }],
            ..Default::default()
        };
        let totals = summarize(&inputs);
        assert_eq!(totals.expenses, 40.0);
        assert_eq!(totals.net_profit, -40.0);
    }

    #[test]
    fn test_outer_invoices_are_segregated() {
        // Outer invoice: advance and payments excluded from income,
        // accrual lands in the outer stream instead
        let inputs = FinanceInputs {
            invoices_created: vec![invoice("o", InvoiceType::Sales, 10.0)],
            payments: vec![payment("o", 90.0)],
            payment_invoices: vec![invoice("o", InvoiceType::Sales, 10.0)],
            items: vec![item("o", 100.0, 30.0, 2, true)],
            ..Default::default()
        };
        let totals = summarize(&inputs);
        assert_eq!(totals.income, 0.0);
        assert_eq!(totals.outer_income, 100.0);
        assert_eq!(totals.outer_expense, 60.0); // 30 × 2
        assert_eq!(totals.outer_profit, 40.0);
        assert_eq!(totals.combined_net_profit, 40.0);
    }

    #[test]
    fn test_regular_and_outer_streams_combine_at_the_end() {
        let inputs = FinanceInputs {
            invoices_created: vec![
                invoice("r", InvoiceType::Sales, 50.0),
                invoice("o", InvoiceType::Sales, 0.0),
            ],
            items: vec![
                item("r", 80.0, 0.0, 1, false),
                item("o", 40.0, 25.0, 1, true),
            ],
            ..Default::default()
        };
        let totals = summarize(&inputs);
        assert_eq!(totals.income, 50.0);
        assert_eq!(totals.outer_profit, 15.0);
        assert_eq!(totals.combined_net_profit, 65.0);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let inputs = FinanceInputs {
            invoices_created: vec![invoice("a", InvoiceType::Sales, 12.34)],
            payments: vec![payment("a", 55.55)],
            payment_invoices: vec![invoice("a", InvoiceType::Sales, 12.34)],
            ..Default::default()
        };
        assert_eq!(summarize(&inputs), summarize(&inputs));
    }

    #[test]
    fn test_percent_change_from_zero() {
        assert_eq!(
            percent_change(100.0, 0.0),
            PeriodChange {
                percent: 100.0,
                direction: ChangeDirection::Increase
            }
        );
        assert_eq!(
            percent_change(-20.0, 0.0),
            PeriodChange {
                percent: 100.0,
                direction: ChangeDirection::Decrease
            }
        );
        assert_eq!(
            percent_change(0.0, 0.0),
            PeriodChange {
                percent: 0.0,
                direction: ChangeDirection::Flat
            }
        );
    }

    #[test]
    fn test_percent_change_drop() {
        let change = percent_change(50.0, 100.0);
        assert_eq!(change.percent, 50.0);
        assert_eq!(change.direction, ChangeDirection::Decrease);
    }

    #[test]
    fn test_percent_change_negative_previous() {
        // Loss shrinking from -100 to -50 is a 50% improvement
        let change = percent_change(-50.0, -100.0);
        assert_eq!(change.percent, 50.0);
        assert_eq!(change.direction, ChangeDirection::Increase);
    }

    #[test]
    fn test_customer_balance_sign() {
        let invoices = vec![
            Invoice {
                total_amount: 100.0,
                ..invoice("a", InvoiceType::Sales, 20.0)
            },
            Invoice {
                total_amount: 50.0,
                ..invoice("b", InvoiceType::Sales, 0.0)
            },
        ];
        let balance = customer_balance(&invoices, 60.0, 0.0);
        assert_eq!(balance.total_due, 150.0);
        assert_eq!(balance.total_paid, 80.0);
        assert_eq!(balance.balance, 70.0);

        // Settling more than invoiced flips the balance negative: store credit
        let credit = customer_balance(&invoices, 140.0, 0.0);
        assert_eq!(credit.balance, -10.0);
    }
}
