// proxy 模块 - 订阅抓取与转换

pub mod error_classifier;
pub mod subscription;
pub mod transformer;
pub mod upstream;

pub use subscription::SubscriptionService;
pub use transformer::{filter_outsea_proxies, transform, TransformOptions};
pub use upstream::UpstreamClient;
