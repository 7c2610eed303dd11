pub mod ledger;
pub mod maintenance;

pub use ledger::{BookingConfirmation, LedgerError, RetryPolicy, SeatLedger};
pub use maintenance::{MaintenanceAction, MaintenanceService};
