//! Repository layer for persisting domain models to SQLite
//!
//! One repository per table family: products, the append-only audit
//! ledger, and accounts.

pub mod account_repo;
pub mod audit_repo;
pub mod product_repo;

pub use account_repo::AccountRepo;
pub use audit_repo::AuditRepo;
pub use product_repo::ProductRepo;
