pub mod log;
pub mod seat;
pub mod user;

pub use log::{MaintenanceAudit, ReservationLog};
pub use seat::{Seat, SeatResponse, SeatRow, SeatStatus};
pub use user::{NewUser, User, UserRow, UserStatus};
