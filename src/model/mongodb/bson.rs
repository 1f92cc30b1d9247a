use std::fmt::{Display, Formatter};
use std::{ops::Deref, str::FromStr};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// A MongoDB document ID.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id(ObjectId);

impl Id {
    /// Generate a fresh ID.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// A filter document matching exactly this ID.
    pub fn as_doc(&self) -> Document {
        doc! { "_id": self.0 }
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Id {
    type Target = ObjectId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = mongodb::bson::oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<ObjectId>()?))
    }
}

impl From<ObjectId> for Id {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl From<Id> for Bson {
    fn from(id: Id) -> Self {
        Bson::ObjectId(id.0)
    }
}

impl<'a> FromParam<'a> for Id {
    type Error = mongodb::bson::oid::Error;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse::<Id>()
    }
}

/// Parse a datetime the way the dashboard submits them: either a full
/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date meaning midnight UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Serde helpers for an optional datetime field that older documents may
/// hold as a BSON datetime, a string, null, or garbage.
/// Anything that isn't a recognisable datetime reads back as `None`.
/// Values are always written as BSON datetimes.
pub mod lenient_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson::{Bson, DateTime as BsonDateTime};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::parse_datetime;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(datetime) => BsonDateTime::from_chrono(*datetime).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Bson::deserialize(deserializer)? {
            Bson::DateTime(datetime) => Some(datetime.to_chrono()),
            Bson::String(raw) => parse_datetime(&raw),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;
    use mongodb::bson::{from_document, to_document, DateTime as BsonDateTime};

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Dated {
        #[serde(default, with = "lenient_datetime")]
        when: Option<DateTime<Utc>>,
    }

    #[test]
    fn parse_full_and_bare_dates() {
        let full = parse_datetime("2024-03-01T09:30:00+01:00").unwrap();
        assert_eq!(full, Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap());

        let bare = parse_datetime("2024-03-01").unwrap();
        assert_eq!(bare, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("next tuesday"), None);
    }

    #[test]
    fn lenient_datetime_from_documents() {
        let now = Utc::now().with_nanosecond(0).unwrap();
        let stored: Dated = from_document(doc! { "when": BsonDateTime::from(now) }).unwrap();
        assert_eq!(stored.when, Some(now));

        let string: Dated = from_document(doc! { "when": "2024-03-01" }).unwrap();
        assert_eq!(
            string.when,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );

        let garbage: Dated = from_document(doc! { "when": "Invalid Date" }).unwrap();
        assert_eq!(garbage.when, None);

        let null: Dated = from_document(doc! { "when": Bson::Null }).unwrap();
        assert_eq!(null.when, None);

        let missing: Dated = from_document(doc! {}).unwrap();
        assert_eq!(missing.when, None);
    }

    #[test]
    fn lenient_datetime_writes_bson_datetimes() {
        let now = Utc::now().with_nanosecond(0).unwrap();
        let document = to_document(&Dated { when: Some(now) }).unwrap();
        assert_eq!(
            document.get("when"),
            Some(&Bson::DateTime(BsonDateTime::from(now)))
        );
    }

    #[test]
    fn id_filter_and_parse() {
        let id = Id::new();
        let parsed: Id = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.as_doc(), doc! { "_id": *id });
        assert!("xyz".parse::<Id>().is_err());
    }
}
