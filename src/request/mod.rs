pub mod payload;
pub mod export;

pub use payload::{run_request, run_with_strategy, validate_request, AllocationRequest, AllocationResponse, Strategy};
pub use export::{export_allocation, export_allocation_to_csv, export_allocation_to_string};
