//! Database Models
//!
//! Row shapes for the SurrealDB tables. Monetary fields are stored as
//! `f64` rounded to 2 decimal places; all timestamps are Unix millis.

pub mod cost;
pub mod invoice;
pub mod invoice_item;
pub mod party;
pub mod payment;
pub mod product;
pub mod product_return;
pub mod supplier_payment;
pub mod system_state;

pub use cost::{OtherCost, SalaryPayment};
pub use invoice::Invoice;
pub use invoice_item::InvoiceItem;
pub use party::{Customer, CustomerCreate, Supplier, SupplierCreate};
pub use payment::Payment;
pub use product::Product;
pub use product_return::{ProductReturn, ReturnItem};
pub use supplier_payment::SupplierPayment;
pub use system_state::SystemState;
