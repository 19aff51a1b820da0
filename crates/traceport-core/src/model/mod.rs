//! Domain models for the product passport platform

mod audit;
mod product;
mod profile;
mod telemetry;

pub use audit::{AuditRecord, EventType, LifecycleCategory};
pub use product::{
    Identification, MaintenanceItem, Product, ProductCategory, ProductLifecycle, RepairItem,
    UsageAttachment, UsageData,
};
pub use profile::{Account, RoleProfile};
pub use telemetry::{OperationalSnapshot, TelemetryValue};
