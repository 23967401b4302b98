//! # Mobile Push
//!
//! Push notifications for mobile apps through Urban Airship and Parse.
//!
//! ## Features
//!
//! - **Urban Airship v3**: iOS, Android and Windows payloads from one draft
//! - **App groups**: send to every app of a group with a single call
//! - **Size checks**: payloads are checked against vendor limits before sending
//! - **Retry**: transient vendor failures restart the whole send once
//! - **Parse**: channel pushes through the Parse REST API
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mobile_push::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UrbanAirshipConfig::new(
//!         "default-app-group",
//!         AppGroups::new().with_group(
//!             "default-app-group",
//!             AppGroup::new().with_app("app-1", Credentials::new("key", "secret", "master")),
//!         ),
//!     );
//!
//!     let service = PushService::new(UrbanAirship::new(config)?);
//!
//!     let mut notification = service.notification()?;
//!     notification
//!         .set_message("Hello!")
//!         .set_channels(["news"])
//!         .set_android_delivery_priority_high();
//!     notification.set_ios_badge("+1")?;
//!
//!     service.send(&notification).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## From a configuration file
//!
//! ```rust,ignore
//! use mobile_push::{PushConfig, PushService};
//!
//! let service = PushService::from_config(PushConfig::from_file("push.toml")?)?;
//! ```

mod config;
mod error;
mod limits;
mod notification;
mod parse;
mod payload;
mod provider;
mod retry;
mod urban_airship;

pub use config::{
    AppGroup, AppGroups, Credentials, DEFAULT_APP_GROUP, ParseApplication, ParseConfig,
    PushConfig, UrbanAirshipConfig, Validate,
};
pub use error::{PushError, Result, SendFailure};
pub use limits::{
    ANDROID_PAYLOAD_LIMIT, IOS_PAYLOAD_LIMIT, SizeLimits, WNS_PAYLOAD_LIMIT, validate_before_push,
};
pub use notification::{
    AndroidStyle, AndroidStyleKind, AndroidVisibility, Extra, ExtraValue, IosBadge,
    MAX_MESSAGE_LENGTH, Notification, Platform, Priority, RESERVED_EXTRA_KEYS,
};
pub use parse::ParseProvider;
pub use payload::{
    AndroidPayload, Audience, AudienceSelector, IosPayload, PlatformPayloads, PushPayload,
    WnsBinding, WnsPayload, WnsToast,
};
pub use provider::{AppOutcome, AppResult, PushProvider, PushService};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use urban_airship::UrbanAirship;

/// Prelude for common imports.
///
/// ```
/// use mobile_push::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{
        AppGroup, AppGroups, Credentials, ParseApplication, ParseConfig, PushConfig,
        UrbanAirshipConfig,
    };
    pub use crate::error::{PushError, Result};
    pub use crate::notification::{
        AndroidStyle, AndroidVisibility, IosBadge, Notification, Platform, Priority,
    };
    pub use crate::parse::ParseProvider;
    pub use crate::provider::{AppOutcome, AppResult, PushProvider, PushService};
    pub use crate::retry::RetryPolicy;
    pub use crate::urban_airship::UrbanAirship;
}
