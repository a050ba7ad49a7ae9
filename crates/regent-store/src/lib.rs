pub mod error;
pub mod inputs;
pub mod results;

pub use error::StoreError;
pub use inputs::{DailyInputBundle, InputStore, MONTHLY_DATA_FILE, MONTHLY_REFERENCE_DIR};
pub use results::ResultStore;
