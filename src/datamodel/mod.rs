pub mod app_info;
pub mod instance_identity;
pub mod metric_point;
pub mod rate;

pub use app_info::{AppInfo, AppInfoMap};
pub use instance_identity::InstanceIdentity;
pub use metric_point::{MetricPoint, to_plaintext};
pub use rate::Rate;
