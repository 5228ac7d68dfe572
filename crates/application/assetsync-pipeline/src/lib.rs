pub mod dispatch;

pub use dispatch::{map_job, DispatchReport, DispatchRequest, Dispatcher, PipelineError};
