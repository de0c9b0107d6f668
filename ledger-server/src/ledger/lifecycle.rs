//! Invoice Lifecycle
//!
//! [`derive_status`] is the single source of truth for an invoice's
//! derived columns: every caller that settles anything against an
//! invoice (advance at creation, payments, applied refunds) recomputes
//! `remaining_amount`/`status` through it and persists the pair.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Invoice, InvoiceItem, Payment, Product, ProductReturn};
use crate::db::repository::{
    InvoiceItemRepository, InvoiceRepository, PaymentRepository, ProductRepository,
    ProductReturnRepository, SystemStateRepository,
};
use crate::ledger::money::{MONEY_TOLERANCE, to_decimal, to_f64};
use crate::ledger::parse_optional_id;
use crate::ledger::supplier_due::fifo_allocate;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_non_negative_amount, validate_quantity,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::types::{InvoiceStatus, InvoiceType};

/// Derive `(remaining_amount, status)` from an invoice's totals
///
/// `settled_sum` is everything settled after creation: payment amounts
/// plus applied-return refunds. The advance acts as an implicit first
/// payment. Remaining is clamped at zero; anything within the money
/// tolerance of zero snaps to exactly zero so `paid` is reached on
/// cent-exact settlements.
pub fn derive_status(
    total_amount: f64,
    advance_payment: f64,
    settled_sum: f64,
) -> (f64, InvoiceStatus) {
    let total = to_decimal(total_amount);
    let settled = to_decimal(advance_payment) + to_decimal(settled_sum);

    let mut remaining = (total - settled).max(Decimal::ZERO);
    if remaining < MONEY_TOLERANCE {
        remaining = Decimal::ZERO;
    }

    let status = if remaining == Decimal::ZERO {
        InvoiceStatus::Paid
    } else if remaining < total {
        InvoiceStatus::PartiallyPaid
    } else {
        InvoiceStatus::Unpaid
    };

    (to_f64(remaining), status)
}

// ============================================================================
// Inputs / outputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceItemInput {
    /// Record id ("product:xyz") of an existing product; absent for
    /// outer-product lines and for product-addition lines (which create
    /// their product rows)
    pub product: Option<String>,
    pub product_name: String,
    pub barcode: Option<String>,
    pub wattage: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    /// Cost per unit; used for outer-product profit and for the product
    /// rows created by product-addition invoices
    #[serde(default)]
    pub buying_price: f64,
    /// Selling price for product rows created by product-addition
    /// invoices; defaults to `unit_price`
    pub selling_price: Option<f64>,
    #[serde(default)]
    pub is_outer_product: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceInput {
    pub invoice_type: InvoiceType,
    pub customer: Option<String>,
    pub supplier: Option<String>,
    pub shop_id: Option<String>,
    #[serde(default)]
    pub advance_payment: f64,
    #[serde(default)]
    pub discount_amount: f64,
    pub notes: Option<String>,
    pub items: Vec<InvoiceItemInput>,
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceOutcome {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    /// Product ids whose stock or due ledger this invoice touched
    pub touched_products: Vec<String>,
}

/// Invoice + everything hanging off it
#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<Payment>,
    pub returns: Vec<ProductReturn>,
}

// ============================================================================
// Service
// ============================================================================

pub struct InvoiceService {
    db: Surreal<Db>,
    invoices: InvoiceRepository,
    items: InvoiceItemRepository,
    payments: PaymentRepository,
    returns: ProductReturnRepository,
    products: ProductRepository,
    system_state: SystemStateRepository,
}

impl InvoiceService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            invoices: InvoiceRepository::new(db.clone()),
            items: InvoiceItemRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            returns: ProductReturnRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            system_state: SystemStateRepository::new(db.clone()),
            db,
        }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Create an invoice with its items
    ///
    /// Sales invoices decrement stock on linked products.
    /// Product-addition invoices create one product row per line and
    /// seed the product-side due ledger, applying the invoice advance
    /// across the new lines oldest-first.
    pub async fn create(&self, input: CreateInvoiceInput) -> AppResult<CreateInvoiceOutcome> {
        self.validate(&input)?;

        let customer = parse_optional_id(&input.customer, "customer")?;
        let supplier = parse_optional_id(&input.supplier, "supplier")?;
        if input.invoice_type == InvoiceType::ProductAddition && supplier.is_none() {
            return Err(AppError::validation(
                "A supplier is required for product-addition invoices",
            ));
        }

        // Gross total from the lines, discount off the top
        let gross: Decimal = input
            .items
            .iter()
            .map(|i| to_decimal(i.unit_price) * Decimal::from(i.quantity))
            .sum();
        let total = (gross - to_decimal(input.discount_amount)).max(Decimal::ZERO);
        let total_amount = to_f64(total);

        if to_decimal(input.advance_payment) > total + MONEY_TOLERANCE {
            return Err(AppError::validation(
                "Advance payment exceeds the invoice total",
            ));
        }

        let invoice_number = self.next_invoice_number().await?;
        let (remaining_amount, status) =
            derive_status(total_amount, input.advance_payment, 0.0);

        let now = shared::util::monotonic_millis();
        let invoice = self
            .invoices
            .create(Invoice {
                id: None,
                invoice_number,
                invoice_type: input.invoice_type,
                total_amount,
                advance_payment: input.advance_payment,
                discount_amount: input.discount_amount,
                remaining_amount,
                status,
                customer,
                supplier: supplier.clone(),
                shop_id: input.shop_id.clone(),
                notes: input.notes.clone(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        let invoice_id = invoice
            .id
            .clone()
            .ok_or_else(|| AppError::database("Created invoice has no id"))?;

        let mut items = Vec::with_capacity(input.items.len());
        let mut touched_products = Vec::new();

        // Advance seeding plan for product-addition lines (oldest-first,
        // same policy as supplier settlement). Outer lines create no
        // product row, so they carry no due.
        let line_dues: Vec<f64> = input
            .items
            .iter()
            .map(|i| {
                if i.is_outer_product {
                    0.0
                } else {
                    to_f64(to_decimal(i.unit_price) * Decimal::from(i.quantity))
                }
            })
            .collect();
        let advance_plan = if input.invoice_type == InvoiceType::ProductAddition {
            fifo_allocate(input.advance_payment, &line_dues)
        } else {
            vec![0.0; input.items.len()]
        };

        for (index, line) in input.items.iter().enumerate() {
            let mut product_link = parse_optional_id(&line.product, "product")?;

            if input.invoice_type == InvoiceType::ProductAddition && !line.is_outer_product {
                let applied = advance_plan[index];
                let line_total = line_dues[index];
                let product = self
                    .products
                    .create(Product {
                        id: None,
                        supplier: supplier.clone().expect("supplier checked above"),
                        shop_id: input.shop_id.clone(),
                        name: line.product_name.clone(),
                        barcode: line.barcode.clone(),
                        wattage: line.wattage.clone(),
                        size: line.size.clone(),
                        color: line.color.clone(),
                        buying_price: line.unit_price,
                        selling_price: line.selling_price.unwrap_or(line.unit_price),
                        quantity: line.quantity,
                        advance_payment: applied,
                        remaining_amount: to_f64(to_decimal(line_total) - to_decimal(applied)),
                        created_at: shared::util::monotonic_millis(),
                    })
                    .await?;
                if let Some(id) = &product.id {
                    touched_products.push(id.to_string());
                    product_link = Some(id.clone());
                }
            }

            let item = self
                .items
                .create(InvoiceItem {
                    id: None,
                    invoice: invoice_id.clone(),
                    product: product_link.clone(),
                    product_name: line.product_name.clone(),
                    barcode: line.barcode.clone(),
                    wattage: line.wattage.clone(),
                    size: line.size.clone(),
                    color: line.color.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    total_price: to_f64(
                        to_decimal(line.unit_price) * Decimal::from(line.quantity),
                    ),
                    buying_price: if input.invoice_type == InvoiceType::ProductAddition {
                        line.unit_price
                    } else {
                        line.buying_price
                    },
                    is_outer_product: line.is_outer_product,
                    created_at: shared::util::monotonic_millis(),
                })
                .await?;
            items.push(item);

            // Sales lines linked to a tracked product take stock
            if input.invoice_type == InvoiceType::Sales
                && let Some(product_id) = &product_link
            {
                self.products
                    .decrement_stock(product_id, line.quantity)
                    .await?;
                touched_products.push(product_id.to_string());
            }
        }

        tracing::info!(
            invoice = %invoice.invoice_number,
            invoice_type = %invoice.invoice_type,
            total = invoice.total_amount,
            advance = invoice.advance_payment,
            status = %invoice.status,
            "Invoice created"
        );

        Ok(CreateInvoiceOutcome {
            invoice,
            items,
            touched_products,
        })
    }

    /// Fetch an invoice with items, payments and returns
    pub async fn detail(&self, id: &RecordId) -> AppResult<InvoiceDetail> {
        let invoice = self
            .invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", id)))?;

        let items = self.items.list_by_invoice(id).await?;
        let payments = self.payments.list_by_invoice(id).await?;
        let returns = self.returns.list_by_invoice(id).await?;

        Ok(InvoiceDetail {
            invoice,
            items,
            payments,
            returns,
        })
    }

    async fn next_invoice_number(&self) -> AppResult<String> {
        let count = self.system_state.next_invoice_number().await?;
        let date_str = chrono::Utc::now().format("%Y%m%d").to_string();
        // Sequence starts at 10001 to keep a fixed width
        Ok(format!("INV{}{}", date_str, 10000 + count))
    }

    fn validate(&self, input: &CreateInvoiceInput) -> AppResult<()> {
        if input.items.is_empty() {
            return Err(AppError::validation("An invoice needs at least one item"));
        }
        validate_non_negative_amount(input.advance_payment, "advance_payment")?;
        validate_non_negative_amount(input.discount_amount, "discount_amount")?;
        validate_optional_text(&input.notes, "notes", MAX_NOTE_LEN)?;

        for line in &input.items {
            validate_required_text(&line.product_name, "product_name", MAX_NAME_LEN)?;
            validate_quantity(line.quantity, "quantity")?;
            validate_non_negative_amount(line.unit_price, "unit_price")?;
            validate_non_negative_amount(line.buying_price, "buying_price")?;
            if let Some(sp) = line.selling_price {
                validate_non_negative_amount(sp, "selling_price")?;
            }
        }
        Ok(())
    }
}
