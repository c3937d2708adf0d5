pub mod service;

pub use service::WorkflowAdapter;
