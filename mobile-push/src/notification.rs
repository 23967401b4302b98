//! Notification draft and its field types.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{PushError, Result};

/// Maximum message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 254;

/// Extra keys reserved by the vendor.
pub const RESERVED_EXTRA_KEYS: [&str; 3] = ["from", "collapse_key", "sound"];

/// Target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iOS device.
    Ios,
    /// Android device.
    Android,
    /// Windows (WNS) device.
    Wns,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 3] = [Platform::Ios, Platform::Android, Platform::Wns];

    /// Get the vendor name of the platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Wns => "wns",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Android delivery priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Normal priority.
    #[default]
    Normal,
    /// High priority (may wake device).
    High,
}

/// Android lock screen visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AndroidVisibility {
    /// Shown normally.
    #[default]
    Public,
    /// Shown as a redacted version.
    Private,
    /// Not shown on the lock screen.
    Secret,
}

impl AndroidVisibility {
    /// Numeric value understood by the vendor.
    pub fn value(&self) -> i8 {
        match self {
            Self::Public => 1,
            Self::Private => 0,
            Self::Secret => -1,
        }
    }
}

impl TryFrom<i64> for AndroidVisibility {
    type Error = PushError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::Public),
            0 => Ok(Self::Private),
            -1 => Ok(Self::Secret),
            _ => Err(PushError::InvalidArgument(
                "Android visibility settings can only be 1, 0 or -1".into(),
            )),
        }
    }
}

impl Serialize for AndroidVisibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

/// A scalar value allowed in extra data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// String.
    String(String),
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ExtraValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for ExtraValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for ExtraValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for ExtraValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl TryFrom<Value> for ExtraValue {
    type Error = PushError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::String(s) => Ok(Self::String(s)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    PushError::InvalidArgument(format!("Unsupported number [{}]", n))
                }),
            },
            Value::Null | Value::Array(_) | Value::Object(_) => Err(PushError::InvalidArgument(
                "Extra values must be scalar, got array/object/null".into(),
            )),
        }
    }
}

/// Extra data attached to a notification.
pub type Extra = BTreeMap<String, ExtraValue>;

fn check_extra_key(key: &str) -> Result<()> {
    if RESERVED_EXTRA_KEYS.contains(&key) {
        return Err(PushError::InvalidArgument(format!(
            "The used key [{}] in extra is reserved",
            key
        )));
    }
    Ok(())
}

fn collect_extra<I, K, V>(entries: I) -> Result<Extra>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ExtraValue>,
{
    let mut extra = Extra::new();
    for (key, value) in entries {
        let key = key.into();
        check_extra_key(&key)?;
        extra.insert(key, value.into());
    }
    Ok(extra)
}

fn collect_extra_json(entries: serde_json::Map<String, Value>) -> Result<Extra> {
    let mut extra = Extra::new();
    for (key, value) in entries {
        check_extra_key(&key)?;
        let value = ExtraValue::try_from(value).map_err(|_| {
            PushError::InvalidArgument(format!("Extra key [{}] was array/object/null", key))
        })?;
        extra.insert(key, value);
    }
    Ok(extra)
}

/// iOS badge instruction.
///
/// Parsed from `"auto"`, an unsigned integer string (`"3"`) or a signed one
/// for a relative change (`"+1"`, `"-2"`). Fractional strings such as `"1.5"`
/// are rejected rather than truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IosBadge {
    /// Set the badge to an absolute value.
    Value(u32),
    /// Change the badge by a signed delta, kept as the vendor string (`+1`, `-3`).
    Relative(String),
    /// Let the vendor track the badge.
    Auto,
}

impl FromStr for IosBadge {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "auto" {
            return Ok(Self::Auto);
        }

        let unsupported =
            || PushError::InvalidArgument(format!("The badge [{}] is not supported", s));

        let (signed, digits) = match s.strip_prefix(['+', '-']) {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unsupported());
        }

        if signed {
            Ok(Self::Relative(s.to_string()))
        } else {
            digits.parse().map(Self::Value).map_err(|_| unsupported())
        }
    }
}

impl TryFrom<&str> for IosBadge {
    type Error = PushError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<String> for IosBadge {
    type Error = PushError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<i64> for IosBadge {
    type Error = PushError;

    fn try_from(value: i64) -> Result<Self> {
        if value < 0 {
            return Err(PushError::InvalidArgument(
                "Badge was set to a negative integer, either set 0 or use a string like \"-5\""
                    .into(),
            ));
        }
        u32::try_from(value)
            .map(Self::Value)
            .map_err(|_| PushError::InvalidArgument(format!("Badge [{}] is too large", value)))
    }
}

impl TryFrom<i32> for IosBadge {
    type Error = PushError;

    fn try_from(value: i32) -> Result<Self> {
        Self::try_from(i64::from(value))
    }
}

impl TryFrom<u32> for IosBadge {
    type Error = PushError;

    fn try_from(value: u32) -> Result<Self> {
        Ok(Self::Value(value))
    }
}

impl Serialize for IosBadge {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Value(n) => serializer.serialize_u32(*n),
            Self::Relative(delta) => serializer.serialize_str(delta),
            Self::Auto => serializer.serialize_str("auto"),
        }
    }
}

/// Content of an Android style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AndroidStyleKind {
    /// Large image, by URL.
    BigPicture(String),
    /// Expanded text.
    BigText(String),
    /// List of lines.
    Inbox(Vec<String>),
}

impl AndroidStyleKind {
    /// Vendor `type` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigPicture(_) => "big_picture",
            Self::BigText(_) => "big_text",
            Self::Inbox(_) => "inbox",
        }
    }
}

/// Advanced Android notification style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidStyle {
    /// Style content.
    pub kind: AndroidStyleKind,
    /// Overrides the notification title.
    pub title: Option<String>,
    /// Overrides the notification summary.
    pub summary: Option<String>,
}

impl AndroidStyle {
    fn new(kind: AndroidStyleKind) -> Self {
        Self {
            kind,
            title: None,
            summary: None,
        }
    }

    /// Big picture style with an image URL.
    pub fn big_picture(url: impl Into<String>) -> Self {
        Self::new(AndroidStyleKind::BigPicture(url.into()))
    }

    /// Big text style.
    pub fn big_text(text: impl Into<String>) -> Self {
        Self::new(AndroidStyleKind::BigText(text.into()))
    }

    /// Inbox style with one entry per line.
    pub fn inbox<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(AndroidStyleKind::Inbox(
            lines.into_iter().map(Into::into).collect(),
        ))
    }

    /// Set the title override. Empty titles are ignored.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into()).filter(|t: &String| !t.is_empty());
        self
    }

    /// Set the summary override. Empty summaries are ignored.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// Build a style from untyped input.
    ///
    /// `big_picture` and `big_text` take a string value, `inbox` takes an
    /// array of strings.
    pub fn from_parts(
        style_type: &str,
        value: Value,
        title: Option<&str>,
        summary: Option<&str>,
    ) -> Result<Self> {
        let mut style = match (style_type, value) {
            ("big_picture", Value::String(url)) => Self::big_picture(url),
            ("big_text", Value::String(text)) => Self::big_text(text),
            ("big_picture" | "big_text", _) => {
                return Err(PushError::InvalidArgument(
                    "Big picture and big text value should be a string".into(),
                ));
            }
            ("inbox", Value::Array(lines)) => {
                let lines = lines
                    .into_iter()
                    .map(|line| match line {
                        Value::String(s) => Ok(s),
                        _ => Err(PushError::InvalidArgument(
                            "Inbox type value should be an array of strings".into(),
                        )),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Self::inbox(lines)
            }
            ("inbox", _) => {
                return Err(PushError::InvalidArgument(
                    "Inbox type value should be an array of strings".into(),
                ));
            }
            _ => {
                return Err(PushError::InvalidArgument(
                    "Android styles must be big_text, big_picture or inbox".into(),
                ));
            }
        };

        if let Some(title) = title {
            style = style.title(title);
        }
        if let Some(summary) = summary {
            style = style.summary(summary);
        }
        Ok(style)
    }
}

impl Serialize for AndroidStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind.as_str())?;
        match &self.kind {
            AndroidStyleKind::BigPicture(url) => map.serialize_entry("big_picture", url)?,
            AndroidStyleKind::BigText(text) => map.serialize_entry("big_text", text)?,
            AndroidStyleKind::Inbox(lines) => map.serialize_entry("lines", lines)?,
        }
        if let Some(title) = &self.title {
            map.serialize_entry("title", title)?;
        }
        if let Some(summary) = &self.summary {
            map.serialize_entry("summary", summary)?;
        }
        map.end()
    }
}

/// Draft of a single push notification.
///
/// Obtained from a provider with defaults applied, filled through setters
/// and handed back to the provider for sending. Fallible setters validate
/// their input and return `Result<&mut Self>`; the rest return `&mut Self`
/// so calls can be chained.
#[derive(Debug, Clone)]
pub struct Notification {
    app_groups: Arc<[String]>,
    app_group: String,
    platforms: Vec<Platform>,
    channels: Vec<String>,
    aliases: Vec<String>,
    named_users: Vec<String>,
    message: Option<String>,
    extra: Extra,
    android_data: Extra,
    ios_badge: Option<IosBadge>,
    sound: Option<String>,
    ios_content_available: bool,
    android_visibility: AndroidVisibility,
    android_style: Option<AndroidStyle>,
    android_delivery_priority: Priority,
}

impl Notification {
    /// Create a draft targeting `app_group`, one of `app_groups`.
    pub fn new<I, S>(app_groups: I, app_group: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let app_groups: Arc<[String]> = app_groups.into_iter().map(Into::into).collect();
        let mut notification = Self {
            app_groups,
            app_group: String::new(),
            platforms: Platform::ALL.to_vec(),
            channels: Vec::new(),
            aliases: Vec::new(),
            named_users: Vec::new(),
            message: None,
            extra: Extra::new(),
            android_data: Extra::new(),
            ios_badge: None,
            sound: Some("default".to_string()),
            ios_content_available: false,
            android_visibility: AndroidVisibility::Public,
            android_style: None,
            android_delivery_priority: Priority::Normal,
        };
        notification.set_app_group(app_group)?;
        Ok(notification)
    }

    /// Pick the app group to send to.
    pub fn set_app_group(&mut self, app_group: impl Into<String>) -> Result<&mut Self> {
        let app_group = app_group.into();
        if !self.app_groups.iter().any(|name| *name == app_group) {
            return Err(PushError::ApplicationNotFound(format!(
                "The app group [{}] was not found in list of app-groups",
                app_group
            )));
        }
        self.app_group = app_group;
        Ok(self)
    }

    /// Active app group.
    pub fn app_group(&self) -> &str {
        &self.app_group
    }

    /// Set the targeted platforms.
    pub fn set_platforms(&mut self, platforms: impl Into<Vec<Platform>>) -> &mut Self {
        self.platforms = platforms.into();
        self
    }

    /// Targeted platforms.
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Check if a platform is targeted.
    pub fn targets(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    /// Target a single channel (tag), replacing any previous channels.
    pub fn set_channel(&mut self, channel: impl Into<String>) -> &mut Self {
        self.channels = vec![channel.into()];
        self
    }

    /// Replace the targeted channels.
    pub fn set_channels<I, T>(&mut self, channels: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.channels = channels.into_iter().map(|c| c.to_string()).collect();
        self
    }

    /// Targeted channels.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Target a single alias, replacing any previous aliases.
    pub fn set_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.aliases = vec![alias.into()];
        self
    }

    /// Replace the targeted aliases. Aliases are typically user ids.
    pub fn set_aliases<I, T>(&mut self, aliases: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.aliases = aliases.into_iter().map(|a| a.to_string()).collect();
        self
    }

    /// Targeted aliases.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Target a single named user, replacing any previous named users.
    pub fn set_named_user(&mut self, named_user: impl Into<String>) -> &mut Self {
        self.named_users = vec![named_user.into()];
        self
    }

    /// Replace the targeted named users.
    pub fn set_named_users<I, T>(&mut self, named_users: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.named_users = named_users.into_iter().map(|u| u.to_string()).collect();
        self
    }

    /// Targeted named users.
    pub fn named_users(&self) -> &[String] {
        &self.named_users
    }

    /// Set the message shown to the user.
    ///
    /// Messages longer than [`MAX_MESSAGE_LENGTH`] characters are cut and
    /// end with `...`.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        let message = message.into();
        let message = if message.chars().count() > MAX_MESSAGE_LENGTH {
            let mut truncated: String = message.chars().take(MAX_MESSAGE_LENGTH - 3).collect();
            truncated.push_str("...");
            truncated
        } else {
            message
        };
        self.message = Some(message);
        self
    }

    /// Message, if set.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Replace the extra data sent to every platform.
    ///
    /// Keep this small: iOS payloads are limited to 2048 bytes. Use
    /// [`set_android_data`](Self::set_android_data) for Android-only data.
    pub fn set_extra<I, K, V>(&mut self, extra: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ExtraValue>,
    {
        self.extra = collect_extra(extra)?;
        Ok(self)
    }

    /// Replace the extra data from a JSON object. Nested values are rejected.
    pub fn set_extra_json(&mut self, extra: serde_json::Map<String, Value>) -> Result<&mut Self> {
        self.extra = collect_extra_json(extra)?;
        Ok(self)
    }

    /// Extra data.
    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    /// Replace the Android-only data. Keys override same-named extra keys.
    pub fn set_android_data<I, K, V>(&mut self, data: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ExtraValue>,
    {
        self.android_data = collect_extra(data)?;
        Ok(self)
    }

    /// Replace the Android-only data from a JSON object.
    pub fn set_android_data_json(
        &mut self,
        data: serde_json::Map<String, Value>,
    ) -> Result<&mut Self> {
        self.android_data = collect_extra_json(data)?;
        Ok(self)
    }

    /// Android-only data.
    pub fn android_data(&self) -> &Extra {
        &self.android_data
    }

    /// Set the iOS badge: a count, `"+n"`/`"-n"` for a relative change, or `"auto"`.
    pub fn set_ios_badge<B>(&mut self, badge: B) -> Result<&mut Self>
    where
        B: TryInto<IosBadge, Error = PushError>,
    {
        self.ios_badge = Some(badge.try_into()?);
        Ok(self)
    }

    /// iOS badge, if set.
    pub fn ios_badge(&self) -> Option<&IosBadge> {
        self.ios_badge.as_ref()
    }

    /// Set a custom sound. The sound must be bundled with the apps.
    pub fn set_sound(&mut self, sound: impl Into<String>) -> &mut Self {
        self.sound = Some(sound.into());
        self
    }

    /// Clear the sound.
    pub fn remove_sound(&mut self) -> &mut Self {
        self.sound = None;
        self
    }

    /// Sound, if any. Defaults to `"default"`.
    pub fn sound(&self) -> Option<&str> {
        self.sound.as_deref()
    }

    /// Send as an iOS silent push.
    pub fn set_ios_content_available(&mut self, content_available: bool) -> &mut Self {
        self.ios_content_available = content_available;
        self
    }

    /// Check if this is an iOS silent push.
    pub fn is_ios_content_available(&self) -> bool {
        self.ios_content_available
    }

    /// Set the Android lock screen visibility.
    pub fn set_android_visibility(&mut self, visibility: AndroidVisibility) -> &mut Self {
        self.android_visibility = visibility;
        self
    }

    /// Android lock screen visibility.
    pub fn android_visibility(&self) -> AndroidVisibility {
        self.android_visibility
    }

    /// Set an advanced Android style.
    pub fn set_android_style(&mut self, style: AndroidStyle) -> &mut Self {
        self.android_style = Some(style);
        self
    }

    /// Set an advanced Android style from untyped input.
    pub fn set_android_style_raw(
        &mut self,
        style_type: &str,
        value: Value,
        title: Option<&str>,
        summary: Option<&str>,
    ) -> Result<&mut Self> {
        self.android_style = Some(AndroidStyle::from_parts(style_type, value, title, summary)?);
        Ok(self)
    }

    /// Android style, if set.
    pub fn android_style(&self) -> Option<&AndroidStyle> {
        self.android_style.as_ref()
    }

    /// Deliver with high priority on Android.
    pub fn set_android_delivery_priority_high(&mut self) -> &mut Self {
        self.android_delivery_priority = Priority::High;
        self
    }

    /// Deliver with normal priority on Android.
    pub fn set_android_delivery_priority_normal(&mut self) -> &mut Self {
        self.android_delivery_priority = Priority::Normal;
        self
    }

    /// Android delivery priority.
    pub fn android_delivery_priority(&self) -> Priority {
        self.android_delivery_priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification() -> Notification {
        Notification::new(["default", "staging"], "default").unwrap()
    }

    #[test]
    fn test_defaults() {
        let n = notification();
        assert_eq!(n.app_group(), "default");
        assert_eq!(n.platforms(), &Platform::ALL);
        assert_eq!(n.sound(), Some("default"));
        assert_eq!(n.android_visibility(), AndroidVisibility::Public);
        assert_eq!(n.android_delivery_priority(), Priority::Normal);
        assert!(n.message().is_none());
        assert!(!n.is_ios_content_available());
    }

    #[test]
    fn test_unknown_app_group() {
        assert!(matches!(
            Notification::new(["default"], "missing"),
            Err(PushError::ApplicationNotFound(_))
        ));

        let mut n = notification();
        assert!(n.set_app_group("staging").is_ok());
        assert_eq!(n.app_group(), "staging");
        assert!(matches!(
            n.set_app_group("production"),
            Err(PushError::ApplicationNotFound(_))
        ));
        assert_eq!(n.app_group(), "staging");
    }

    #[test]
    fn test_message_truncation() {
        let mut n = notification();

        let exact = "a".repeat(MAX_MESSAGE_LENGTH);
        n.set_message(exact.clone());
        assert_eq!(n.message(), Some(exact.as_str()));

        let long = "b".repeat(300);
        n.set_message(long.clone());
        let expected = format!("{}...", &long[..251]);
        assert_eq!(n.message(), Some(expected.as_str()));
        assert_eq!(n.message().unwrap().chars().count(), MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn test_message_truncation_multibyte() {
        let mut n = notification();
        n.set_message("ø".repeat(255));
        let message = n.message().unwrap();
        assert_eq!(message.chars().count(), MAX_MESSAGE_LENGTH);
        assert!(message.ends_with("ø..."));
    }

    #[test]
    fn test_extra_round_trip() {
        let mut n = notification();
        n.set_extra([("id", ExtraValue::from(42)), ("type", ExtraValue::from("news"))])
            .unwrap();

        assert_eq!(n.extra().get("id"), Some(&ExtraValue::Integer(42)));
        assert_eq!(n.extra().get("type"), Some(&ExtraValue::from("news")));

        n.set_android_data([("big", "payload")]).unwrap();
        assert_eq!(n.android_data().len(), 1);
        assert_eq!(n.extra().len(), 2);
    }

    #[test]
    fn test_extra_reserved_keys() {
        let mut n = notification();
        for key in RESERVED_EXTRA_KEYS {
            assert!(matches!(
                n.set_extra([(key, "x")]),
                Err(PushError::InvalidArgument(_))
            ));
            assert!(matches!(
                n.set_android_data([(key, "x")]),
                Err(PushError::InvalidArgument(_))
            ));
        }
        assert!(n.extra().is_empty());
    }

    #[test]
    fn test_extra_json_rejects_nested() {
        let mut n = notification();

        let nested = json!({"ok": 1, "nested": {"a": 1}});
        let result = n.set_extra_json(nested.as_object().unwrap().clone());
        assert!(matches!(result, Err(PushError::InvalidArgument(_))));

        let array = json!({"list": [1, 2]});
        let result = n.set_android_data_json(array.as_object().unwrap().clone());
        assert!(matches!(result, Err(PushError::InvalidArgument(_))));

        let null = json!({"nothing": null});
        assert!(n.set_extra_json(null.as_object().unwrap().clone()).is_err());

        let scalars = json!({"s": "x", "i": 1, "f": 1.5, "b": true});
        n.set_extra_json(scalars.as_object().unwrap().clone()).unwrap();
        assert_eq!(n.extra().get("f"), Some(&ExtraValue::Float(1.5)));
        assert_eq!(n.extra().get("b"), Some(&ExtraValue::Bool(true)));
    }

    #[test]
    fn test_ios_badge_normalization() {
        let mut n = notification();

        n.set_ios_badge(5).unwrap();
        assert_eq!(n.ios_badge(), Some(&IosBadge::Value(5)));

        n.set_ios_badge("7").unwrap();
        assert_eq!(n.ios_badge(), Some(&IosBadge::Value(7)));

        n.set_ios_badge("+1").unwrap();
        assert_eq!(n.ios_badge(), Some(&IosBadge::Relative("+1".into())));

        n.set_ios_badge("-3").unwrap();
        assert_eq!(n.ios_badge(), Some(&IosBadge::Relative("-3".into())));

        n.set_ios_badge("auto").unwrap();
        assert_eq!(n.ios_badge(), Some(&IosBadge::Auto));

        n.set_ios_badge(0u32).unwrap();
        assert_eq!(n.ios_badge(), Some(&IosBadge::Value(0)));
    }

    #[test]
    fn test_ios_badge_rejections() {
        let mut n = notification();
        for bad in ["", "+", "abc", "1.5", "auto!", "--1"] {
            assert!(
                matches!(n.set_ios_badge(bad), Err(PushError::InvalidArgument(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(matches!(n.set_ios_badge(-1), Err(PushError::InvalidArgument(_))));
        assert!(matches!(
            n.set_ios_badge(-5i64),
            Err(PushError::InvalidArgument(_))
        ));
        assert!(n.ios_badge().is_none());
    }

    #[test]
    fn test_ios_badge_serialization() {
        assert_eq!(serde_json::to_value(IosBadge::Value(3)).unwrap(), json!(3));
        assert_eq!(
            serde_json::to_value(IosBadge::Relative("+2".into())).unwrap(),
            json!("+2")
        );
        assert_eq!(serde_json::to_value(IosBadge::Auto).unwrap(), json!("auto"));
    }

    #[test]
    fn test_android_visibility() {
        assert_eq!(AndroidVisibility::try_from(1).unwrap(), AndroidVisibility::Public);
        assert_eq!(AndroidVisibility::try_from(0).unwrap(), AndroidVisibility::Private);
        assert_eq!(AndroidVisibility::try_from(-1).unwrap(), AndroidVisibility::Secret);
        assert!(AndroidVisibility::try_from(2).is_err());
        assert_eq!(
            serde_json::to_value(AndroidVisibility::Secret).unwrap(),
            json!(-1)
        );
    }

    #[test]
    fn test_android_style_serialization() {
        let style = AndroidStyle::big_picture("https://example.com/a.png")
            .title("Title")
            .summary("");
        assert_eq!(
            serde_json::to_value(&style).unwrap(),
            json!({"type": "big_picture", "big_picture": "https://example.com/a.png", "title": "Title"})
        );

        let style = AndroidStyle::inbox(["one", "two"]).summary("2 new");
        assert_eq!(
            serde_json::to_value(&style).unwrap(),
            json!({"type": "inbox", "lines": ["one", "two"], "summary": "2 new"})
        );
    }

    #[test]
    fn test_android_style_raw() {
        let mut n = notification();

        n.set_android_style_raw("big_text", json!("long text"), Some("t"), Some("s"))
            .unwrap();
        let style = n.android_style().unwrap();
        assert_eq!(style.kind, AndroidStyleKind::BigText("long text".into()));
        assert_eq!(style.title.as_deref(), Some("t"));

        assert!(n
            .set_android_style_raw("big_picture", json!(["x"]), None, None)
            .is_err());
        assert!(n.set_android_style_raw("inbox", json!("x"), None, None).is_err());
        assert!(n
            .set_android_style_raw("inbox", json!(["a", 1]), None, None)
            .is_err());
        assert!(matches!(
            n.set_android_style_raw("carousel", json!("x"), None, None),
            Err(PushError::InvalidArgument(_))
        ));
        assert_eq!(
            n.android_style().map(|s| s.kind.as_str()),
            Some("big_text")
        );
    }

    #[test]
    fn test_targets_replace_wholesale() {
        let mut n = notification();

        n.set_channels([1, 2, 3]);
        assert_eq!(n.channels(), &["1", "2", "3"]);
        n.set_channel("news");
        assert_eq!(n.channels(), &["news"]);

        n.set_aliases(["a", "b"]);
        n.set_aliases(["c"]);
        assert_eq!(n.aliases(), &["c"]);

        n.set_named_users([100u64, 200]);
        assert_eq!(n.named_users(), &["100", "200"]);
    }

    #[test]
    fn test_chaining() {
        let mut n = notification();
        n.set_message("hi")
            .remove_sound()
            .set_android_delivery_priority_high()
            .set_platforms([Platform::Android]);
        n.set_extra([("k", "v")]).unwrap().set_alias("user-1");

        assert_eq!(n.message(), Some("hi"));
        assert!(n.sound().is_none());
        assert!(n.targets(Platform::Android));
        assert!(!n.targets(Platform::Ios));
        assert_eq!(n.aliases(), &["user-1"]);
    }
}
