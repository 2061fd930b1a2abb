pub mod reconcile;

pub use reconcile::{
    reconcile, CheckKind, CheckOrigin, CheckOutcome, Mismatch, ReconciliationError,
    ReconciliationReport,
};
