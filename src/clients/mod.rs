pub mod clock;
pub mod geocoding;
pub mod metrics;
pub mod rate_limiter;
pub mod retry;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use geocoding::Geocoder;
pub use metrics::MetricsClient;
pub use rate_limiter::RateLimiter;
pub use retry::RetryPolicy;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
