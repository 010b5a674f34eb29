//! Wire payloads exchanged with the engine service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::report::BulkReport;

/// A lifecycle event pushed by the engine (container created, pod removed...).
///
/// The record is kept exactly as decoded; the accessors only read from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Map<String, Value>);

impl Event {
    /// Wraps an already-decoded JSON object.
    #[must_use]
    pub const fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// All fields of the record.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the event, yielding its fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Object kind the event is about (`container`, `pod`, `image`...).
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.str_field("Type")
    }

    /// What happened (`create`, `start`, `died`...).
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.str_field("Action").or_else(|| self.str_field("status"))
    }

    /// Identifier of the object the event is about.
    #[must_use]
    pub fn actor_id(&self) -> Option<&str> {
        self.0
            .get("Actor")
            .and_then(|actor| actor.get("ID"))
            .and_then(Value::as_str)
            .or_else(|| self.str_field("id"))
            .or_else(|| self.str_field("ID"))
    }

    /// One actor attribute, such as `name` or `image`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.0
            .get("Actor")
            .and_then(|actor| actor.get("Attributes"))
            .and_then(|attrs| attrs.get(name))
            .and_then(Value::as_str)
    }

    /// When the event happened, from `timeNano`, or `time` given either as
    /// unix seconds or as an RFC 3339 string.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        if let Some(nanos) = self.0.get("timeNano").and_then(Value::as_i64) {
            return Some(DateTime::from_timestamp_nanos(nanos));
        }
        match self.0.get("time")? {
            Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

/// Outcome for one item in list-shaped prune replies (pods, volumes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    /// Item identifier.
    #[serde(rename = "Id", alias = "ID")]
    pub id: String,
    /// Failure message; absent, `null` or empty on success.
    #[serde(rename = "Err", default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl ItemResult {
    fn outcome(&self) -> (String, std::result::Result<(), String>) {
        match self.err.as_deref() {
            Some(msg) if !msg.is_empty() => (self.id.clone(), Err(msg.to_string())),
            _ => (self.id.clone(), Ok(())),
        }
    }
}

/// Builds a bulk report from a list of per-item results.
///
/// A repeated id is resolved by [`BulkReport::reconcile`].
#[must_use]
pub fn report_from_items(items: &[ItemResult]) -> BulkReport {
    BulkReport::reconcile(items.iter().map(ItemResult::outcome))
}

/// Success list plus failure map, as used for containers and images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdErrorReport {
    /// Identifiers that were removed.
    #[serde(rename = "ID", alias = "Id", default, deserialize_with = "null_as_default")]
    pub ids: Vec<String>,
    /// Failure message per identifier, in the order the server wrote them.
    #[serde(rename = "Err", default, with = "ordered_pairs")]
    pub errors: Vec<(String, String)>,
}

impl IdErrorReport {
    /// Converts into the generic bulk report shape. An id that is both
    /// removed and failed counts as failed.
    #[must_use]
    pub fn to_report(&self) -> BulkReport {
        let ok = self.ids.iter().map(|id| (id.clone(), Ok::<(), String>(())));
        let failed = self
            .errors
            .iter()
            .map(|(id, msg)| (id.clone(), Err(msg.clone())));
        BulkReport::reconcile(ok.chain(failed))
    }
}

/// Image section of a system prune reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePruneReport {
    /// Removed and failed images.
    #[serde(rename = "Report", default)]
    pub report: IdErrorReport,
    /// Bytes reclaimed by removing images.
    #[serde(rename = "Size", default)]
    pub size: i64,
}

/// Reply of `POST /system/prune`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPruneReport {
    /// Pods removed or failed.
    #[serde(rename = "PodPruneReport", default, deserialize_with = "null_as_default")]
    pub pods: Vec<ItemResult>,
    /// Containers removed or failed.
    #[serde(rename = "ContainerPruneReport", default)]
    pub containers: Option<IdErrorReport>,
    /// Images removed or failed.
    #[serde(rename = "ImagePruneReport", default)]
    pub images: Option<ImagePruneReport>,
    /// Volumes removed or failed; only present when volumes were pruned.
    #[serde(rename = "VolumePruneReport", default, deserialize_with = "null_as_default")]
    pub volumes: Vec<ItemResult>,
}

impl SystemPruneReport {
    /// Pod outcomes.
    #[must_use]
    pub fn pod_report(&self) -> BulkReport {
        report_from_items(&self.pods)
    }

    /// Container outcomes.
    #[must_use]
    pub fn container_report(&self) -> BulkReport {
        self.containers
            .as_ref()
            .map_or_else(BulkReport::default, IdErrorReport::to_report)
    }

    /// Image outcomes.
    #[must_use]
    pub fn image_report(&self) -> BulkReport {
        self.images
            .as_ref()
            .map_or_else(BulkReport::default, |i| i.report.to_report())
    }

    /// Volume outcomes.
    #[must_use]
    pub fn volume_report(&self) -> BulkReport {
        report_from_items(&self.volumes)
    }

    /// Every item of every kind: pods, containers, images, then volumes.
    ///
    /// Identifiers are qualified by kind (`volume data`, `image sha256:...`)
    /// since the same string may name items of two different kinds.
    #[must_use]
    pub fn combined(&self) -> BulkReport {
        let sections = [
            ("pod", self.pod_report()),
            ("container", self.container_report()),
            ("image", self.image_report()),
            ("volume", self.volume_report()),
        ];
        BulkReport::reconcile(sections.into_iter().flat_map(|(kind, report)| {
            report
                .into_outcomes()
                .map(move |(id, outcome)| (format!("{kind} {id}"), outcome))
        }))
    }

    /// Bytes reclaimed, as reported for images.
    #[must_use]
    pub fn reclaimed_bytes(&self) -> u64 {
        self.images
            .as_ref()
            .map_or(0, |i| u64::try_from(i.size).unwrap_or(0))
    }

    /// Returns `true` if the prune touched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
            && self.volumes.is_empty()
            && self
                .containers
                .as_ref()
                .is_none_or(|c| c.ids.is_empty() && c.errors.is_empty())
            && self
                .images
                .as_ref()
                .is_none_or(|i| i.report.ids.is_empty() && i.report.errors.is_empty())
    }
}

/// Engine build information returned by `GET /version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Release version.
    #[serde(rename = "Version", default)]
    pub version: String,
    /// Remote API revision.
    #[serde(rename = "RemoteAPIVersion", default)]
    pub remote_api_version: i64,
    /// Toolchain the engine was built with.
    #[serde(rename = "GoVersion", default)]
    pub go_version: String,
    /// Source commit, empty when unknown.
    #[serde(rename = "GitCommit", default)]
    pub git_commit: String,
    /// Build time as unix seconds, zero when unknown.
    #[serde(rename = "Built", default)]
    pub built: i64,
    /// Operating system and architecture, e.g. `linux/amd64`.
    #[serde(rename = "OsArch", default)]
    pub os_arch: String,
}

impl Version {
    /// Build time, if the engine reported one.
    #[must_use]
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        if self.built == 0 {
            return None;
        }
        DateTime::from_timestamp(self.built, 0)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// JSON object <-> ordered `(key, value)` pairs, tolerating `null`.
mod ordered_pairs {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pairs: &[(String, String)], s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(pairs.len()))?;
        for (k, v) in pairs {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, String)>, D::Error> {
        d.deserialize_option(OptionalPairs)
    }

    struct OptionalPairs;

    impl<'de> Visitor<'de> for OptionalPairs {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object of strings or null")
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_map(self)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, String>()? {
                pairs.push(entry);
            }
            Ok(pairs)
        }
    }
}
