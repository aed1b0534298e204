pub mod app_services;
pub mod streaming_proxy_services;

pub use app_services::AppServices;
pub use streaming_proxy_services::DynStreamingProxyService;
