mod health;
mod records;
mod session;

pub use health::health_handler;
pub use records::{
    capabilities_handler, dashboard_handler, delete_record_handler, get_record_handler,
    list_records_handler, update_record_handler,
};
pub use session::logout_handler;
