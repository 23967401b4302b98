//! Urban Airship v3 push payload.
//!
//! Compilation is a pure function of the notification draft. The compiled
//! [`PushPayload`] is used both by the size check and as the literal request
//! body.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::{
    AndroidStyle, AndroidVisibility, Extra, ExtraValue, IosBadge, Notification, Platform,
    Priority, Result,
};

const WNS_TOAST_TEMPLATE: &str = "ToastText01";

/// Complete request body for `POST /api/push`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushPayload {
    /// Who receives the push.
    pub audience: Audience,
    /// Per-platform content. Omitted when no platform produced any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<PlatformPayloads>,
    /// Targeted platforms.
    pub device_types: Vec<Platform>,
}

impl PushPayload {
    /// Compile a notification draft.
    pub fn compile(notification: &Notification) -> Result<Self> {
        let platforms = PlatformPayloads {
            ios: IosPayload::compile(notification),
            android: AndroidPayload::compile(notification),
            wns: WnsPayload::compile(notification)?,
        };

        Ok(Self {
            audience: Audience::compile(notification),
            notification: (!platforms.is_empty()).then_some(platforms),
            device_types: notification.platforms().to_vec(),
        })
    }

    /// iOS sub-payload, if any.
    pub fn ios(&self) -> Option<&IosPayload> {
        self.notification.as_ref()?.ios.as_ref()
    }

    /// Android sub-payload, if any.
    pub fn android(&self) -> Option<&AndroidPayload> {
        self.notification.as_ref()?.android.as_ref()
    }

    /// Windows sub-payload, if any.
    pub fn wns(&self) -> Option<&WnsPayload> {
        self.notification.as_ref()?.wns.as_ref()
    }
}

/// Push audience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Broadcast to every device.
    All,
    /// Segmented push.
    Select(AudienceSelector),
}

impl Audience {
    fn compile(notification: &Notification) -> Self {
        let selector = AudienceSelector {
            tag: notification.channels().to_vec(),
            alias: notification.aliases().to_vec(),
            named_user: notification.named_users().to_vec(),
        };

        if selector.is_empty() {
            Self::All
        } else {
            Self::Select(selector)
        }
    }
}

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Select(selector) => selector.serialize(serializer),
        }
    }
}

/// Audience selectors; every non-empty list is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudienceSelector {
    /// Channels.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    /// Aliases.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,
    /// Named users.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub named_user: Vec<String>,
}

impl AudienceSelector {
    fn is_empty(&self) -> bool {
        self.tag.is_empty() && self.alias.is_empty() && self.named_user.is_empty()
    }
}

/// Per-platform content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformPayloads {
    /// iOS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios: Option<IosPayload>,
    /// Android.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidPayload>,
    /// Windows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wns: Option<WnsPayload>,
}

impl PlatformPayloads {
    fn is_empty(&self) -> bool {
        self.ios.is_none() && self.android.is_none() && self.wns.is_none()
    }
}

fn is_false(value: &bool) -> bool {
    !value
}

/// iOS content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IosPayload {
    /// Extra data.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Extra,
    /// Badge instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<IosBadge>,
    /// Sound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// Silent push flag.
    #[serde(rename = "content-available", skip_serializing_if = "is_false")]
    pub content_available: bool,
    /// Message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

impl IosPayload {
    fn compile(notification: &Notification) -> Option<Self> {
        if !notification.targets(Platform::Ios) {
            return None;
        }

        let mut ios = Self {
            extra: notification.extra().clone(),
            ..Self::default()
        };

        // A silent push must not carry a badge or sound
        if notification.is_ios_content_available() {
            ios.content_available = true;
        } else {
            ios.badge = notification.ios_badge().cloned();
            ios.sound = notification.sound().map(str::to_string);
            ios.alert = notification.message().map(str::to_string);
        }

        (ios != Self::default()).then_some(ios)
    }
}

/// Android content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidPayload {
    /// Message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    /// Extra data merged with Android data, plus the sound.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Extra,
    /// Only sent when not normal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_priority: Option<Priority>,
    /// Lock screen visibility.
    pub visibility: AndroidVisibility,
    /// Advanced style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<AndroidStyle>,
}

impl AndroidPayload {
    fn compile(notification: &Notification) -> Option<Self> {
        if !notification.targets(Platform::Android) {
            return None;
        }

        let mut extra = notification.extra().clone();
        extra.extend(
            notification
                .android_data()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        if let Some(sound) = notification.sound() {
            extra.insert("sound".to_string(), ExtraValue::from(sound));
        }

        let delivery_priority = match notification.android_delivery_priority() {
            Priority::Normal => None,
            high => Some(high),
        };

        Some(Self {
            alert: notification.message().map(str::to_string),
            extra,
            delivery_priority,
            visibility: notification.android_visibility(),
            style: notification.android_style().cloned(),
        })
    }
}

/// Windows content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WnsPayload {
    /// Toast notification.
    pub toast: WnsToast,
}

/// Windows toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WnsToast {
    /// Visual binding.
    pub binding: WnsBinding,
    /// JSON string handed to the app on launch.
    pub launch: String,
}

/// Windows toast binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WnsBinding {
    /// Toast template.
    pub template: String,
    /// Toast text.
    pub text: Option<String>,
}

impl WnsPayload {
    fn compile(notification: &Notification) -> Result<Option<Self>> {
        if !notification.targets(Platform::Wns) {
            return Ok(None);
        }

        let mut launch = notification.extra().clone();
        if let Some(message) = notification.message() {
            launch.insert("wns_alert".to_string(), ExtraValue::from(message));
        }
        if let Some(sound) = notification.sound() {
            launch.insert("sound".to_string(), ExtraValue::from(sound));
        }

        Ok(Some(Self {
            toast: WnsToast {
                binding: WnsBinding {
                    template: WNS_TOAST_TEMPLATE.to_string(),
                    text: notification.message().map(str::to_string),
                },
                launch: serde_json::to_string(&launch)?,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn notification() -> Notification {
        let mut n = Notification::new(["default"], "default").unwrap();
        n.remove_sound();
        n
    }

    fn request_data(n: &Notification) -> Value {
        let mut value = serde_json::to_value(PushPayload::compile(n).unwrap()).unwrap();
        if let Some(platforms) = value["notification"].as_object_mut() {
            platforms.remove("wns");
        }
        value
    }

    #[test]
    fn test_empty_notification() {
        let n = notification();
        assert_eq!(
            request_data(&n),
            json!({
                "audience": "all",
                "notification": {"android": {"visibility": 1}},
                "device_types": ["ios", "android", "wns"],
            })
        );
    }

    #[test]
    fn test_android_delivery_priority() {
        let mut n = notification();
        n.set_android_delivery_priority_high();
        assert_eq!(
            request_data(&n)["notification"]["android"],
            json!({"delivery_priority": "high", "visibility": 1})
        );

        n.set_android_delivery_priority_normal();
        assert_eq!(
            request_data(&n)["notification"]["android"],
            json!({"visibility": 1})
        );
    }

    #[test]
    fn test_android_style() {
        let mut n = notification();
        n.set_android_style(AndroidStyle::big_picture("test").title("test1").summary("test2"));
        assert_eq!(
            request_data(&n)["notification"]["android"],
            json!({
                "visibility": 1,
                "style": {
                    "type": "big_picture",
                    "big_picture": "test",
                    "title": "test1",
                    "summary": "test2",
                },
            })
        );
    }

    #[test]
    fn test_ios_badge() {
        let mut n = notification();
        n.set_ios_badge("+1").unwrap();
        assert_eq!(
            request_data(&n)["notification"],
            json!({"ios": {"badge": "+1"}, "android": {"visibility": 1}})
        );
    }

    #[test]
    fn test_extra() {
        let mut n = notification();
        n.set_extra([("id", "1"), ("kind", "news")]).unwrap();
        assert_eq!(
            request_data(&n)["notification"],
            json!({
                "ios": {"extra": {"id": "1", "kind": "news"}},
                "android": {"extra": {"id": "1", "kind": "news"}, "visibility": 1},
            })
        );
    }

    #[test]
    fn test_android_data_overrides_extra() {
        let mut n = notification();
        n.set_extra([("id", "1"), ("kind", "news")]).unwrap();
        n.set_android_data([("kind", "article"), ("body", "long")]).unwrap();

        let data = request_data(&n);
        assert_eq!(data["notification"]["ios"]["extra"], json!({"id": "1", "kind": "news"}));
        assert_eq!(
            data["notification"]["android"]["extra"],
            json!({"id": "1", "kind": "article", "body": "long"})
        );
    }

    #[test]
    fn test_sound() {
        let mut n = notification();
        n.set_sound("chime");
        assert_eq!(
            request_data(&n)["notification"],
            json!({
                "ios": {"sound": "chime"},
                "android": {"extra": {"sound": "chime"}, "visibility": 1},
            })
        );
    }

    #[test]
    fn test_content_available_suppresses_badge_and_sound() {
        let mut n = notification();
        n.set_ios_content_available(true)
            .set_sound("sound")
            .set_message("hidden");
        n.set_ios_badge("1").unwrap();

        assert_eq!(
            request_data(&n)["notification"],
            json!({
                "ios": {"content-available": true},
                "android": {"alert": "hidden", "extra": {"sound": "sound"}, "visibility": 1},
            })
        );
    }

    #[test]
    fn test_message() {
        let mut n = notification();
        n.set_message("hello");
        assert_eq!(
            request_data(&n)["notification"],
            json!({"ios": {"alert": "hello"}, "android": {"alert": "hello", "visibility": 1}})
        );
    }

    #[test]
    fn test_audience() {
        let mut n = notification();
        n.set_channel("news");
        assert_eq!(request_data(&n)["audience"], json!({"tag": ["news"]}));

        let mut n = notification();
        n.set_alias("user-1");
        assert_eq!(request_data(&n)["audience"], json!({"alias": ["user-1"]}));

        let mut n = notification();
        n.set_named_users(["a", "b"]);
        assert_eq!(request_data(&n)["audience"], json!({"named_user": ["a", "b"]}));

        let mut n = notification();
        n.set_channel("news").set_alias("user-1");
        assert_eq!(
            request_data(&n)["audience"],
            json!({"tag": ["news"], "alias": ["user-1"]})
        );
    }

    #[test]
    fn test_platform_selection() {
        let mut n = notification();
        n.set_message("hi").set_platforms([Platform::Ios]);

        let payload = PushPayload::compile(&n).unwrap();
        assert!(payload.ios().is_some());
        assert!(payload.android().is_none());
        assert!(payload.wns().is_none());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "audience": "all",
                "notification": {"ios": {"alert": "hi"}},
                "device_types": ["ios"],
            })
        );

        let mut n = notification();
        n.set_platforms([Platform::Ios]);
        let value = serde_json::to_value(PushPayload::compile(&n).unwrap()).unwrap();
        assert!(value.get("notification").is_none());
    }

    #[test]
    fn test_wns_toast() {
        let mut n = notification();
        n.set_message("hello").set_sound("ding");
        n.set_extra([("id", ExtraValue::from(7))]).unwrap();

        let payload = PushPayload::compile(&n).unwrap();
        let wns = payload.wns().unwrap();
        assert_eq!(wns.toast.binding.template, "ToastText01");
        assert_eq!(wns.toast.binding.text.as_deref(), Some("hello"));

        let launch: Value = serde_json::from_str(&wns.toast.launch).unwrap();
        assert_eq!(launch, json!({"id": 7, "wns_alert": "hello", "sound": "ding"}));
    }

    #[test]
    fn test_wns_without_message() {
        let n = notification();
        let value = serde_json::to_value(PushPayload::compile(&n).unwrap()).unwrap();
        assert_eq!(
            value["notification"]["wns"],
            json!({"toast": {"binding": {"template": "ToastText01", "text": null}, "launch": "{}"}})
        );
    }
}
