pub mod calendar_service;
pub mod cost_service;
pub mod dashboard_service;

pub use calendar_service::{CalendarService, RenewalEvent};
pub use cost_service::CostAggregator;
pub use dashboard_service::{DashboardService, DashboardStats};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Invalid(String),
}
