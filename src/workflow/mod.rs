//! Screen-level state machines built on the capture session and the
//! backend collaborator.

mod profile;
mod scan;

pub use profile::{
    ProfileWorkflow, IMAGE_UPLOAD_FAILED_MESSAGE, LOAD_FAILED_MESSAGE, SAVE_FAILED_MESSAGE,
};
pub use scan::{ScanScreen, ScanWorkflow, ANALYSIS_FAILED_MESSAGE, UPLOAD_FAILED_MESSAGE};
