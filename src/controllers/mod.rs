pub mod bookings;
pub mod logs;
pub mod maintenance;
pub mod seats;
pub mod users;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(seats::routes())
        .merge(bookings::routes())
        .merge(users::routes())
        .merge(logs::routes())
        .merge(maintenance::routes())
}
