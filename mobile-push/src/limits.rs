//! Payload size ceilings.

use serde::Serialize;

use crate::{Notification, Platform, PushError, PushPayload, Result};

/// Maximum iOS payload size in bytes.
pub const IOS_PAYLOAD_LIMIT: usize = 2048;

/// Maximum Windows payload size in bytes.
pub const WNS_PAYLOAD_LIMIT: usize = 2048;

/// Maximum Android payload size in bytes.
pub const ANDROID_PAYLOAD_LIMIT: usize = 4096;

/// Per-platform byte ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    /// iOS ceiling.
    pub ios: usize,
    /// Windows ceiling.
    pub wns: usize,
    /// Android ceiling.
    pub android: usize,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            ios: IOS_PAYLOAD_LIMIT,
            wns: WNS_PAYLOAD_LIMIT,
            android: ANDROID_PAYLOAD_LIMIT,
        }
    }
}

impl SizeLimits {
    /// Ceiling for a platform.
    pub fn for_platform(&self, platform: Platform) -> usize {
        match platform {
            Platform::Ios => self.ios,
            Platform::Wns => self.wns,
            Platform::Android => self.android,
        }
    }
}

/// Compile `notification` and check it against `limits`.
///
/// A non-empty message is required. Platforms that are not targeted are not checked.
pub fn validate_before_push(
    notification: &Notification,
    limits: &SizeLimits,
) -> Result<PushPayload> {
    if notification.message().is_none_or(str::is_empty) {
        return Err(PushError::MissingArgument(
            "You have to set a message before sending push".to_string(),
        ));
    }

    let payload = PushPayload::compile(notification)?;

    check(Platform::Ios, payload.ios(), limits)?;
    check(Platform::Wns, payload.wns(), limits)?;
    check(Platform::Android, payload.android(), limits)?;

    Ok(payload)
}

fn check<T: Serialize>(platform: Platform, payload: Option<&T>, limits: &SizeLimits) -> Result<()> {
    let Some(payload) = payload else {
        return Ok(());
    };

    let size = serde_json::to_vec(payload)?.len();
    let limit = limits.for_platform(platform);
    if size > limit {
        return Err(PushError::PushSizeLimit {
            platform,
            size,
            limit,
        });
    }
    Ok(())
}
