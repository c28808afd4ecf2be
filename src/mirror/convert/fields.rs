//! Purpose: Typed field access over one JSON object of a mirror response.
//! Exports: `Fields` (crate-internal).
//! Role: The single place that turns document shape mismatches into parse errors.
//! Invariants: Missing and null fields are "absent"; present-but-malformed fields are parse errors.
//! Invariants: Every parse error carries the offending document and the underlying cause.
use std::str::FromStr;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use time::OffsetDateTime;

use crate::core::document::{Document, truncate};
use crate::core::entity::parse_timestamp;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::key::{KeyAlgorithm, PublicKey};

#[derive(Clone, Copy)]
pub(crate) struct Fields<'a> {
    object: &'a Document,
    context: &'static str,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(object: &'a Document, context: &'static str) -> ApiResult<Self> {
        if object.as_object().is_none() {
            return Err(Error::new(ErrorKind::Parse)
                .with_message(format!(
                    "{context}: expected an object, found {}",
                    object.type_name()
                ))
                .with_document(truncate(&object.to_json_string())));
        }
        Ok(Self { object, context })
    }

    pub(crate) fn document(&self) -> &'a Document {
        self.object
    }

    pub(crate) fn error(&self, key: &str, message: impl AsRef<str>) -> Error {
        Error::new(ErrorKind::Parse)
            .with_message(format!("{}.{key}: {}", self.context, message.as_ref()))
            .with_document(truncate(&self.object.to_json_string()))
    }

    fn present(&self, key: &str) -> Option<&'a Document> {
        self.object.get(key).filter(|value| !value.is_null())
    }

    pub(crate) fn opt_str(&self, key: &str) -> ApiResult<Option<&'a str>> {
        match self.present(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.error(key, format!("expected string, found {}", value.type_name()))),
        }
    }

    pub(crate) fn str(&self, key: &str) -> ApiResult<&'a str> {
        self.opt_str(key)?
            .ok_or_else(|| self.error(key, "required field is missing"))
    }

    pub(crate) fn string_or_default(&self, key: &str) -> ApiResult<String> {
        Ok(self.opt_str(key)?.unwrap_or_default().to_string())
    }

    /// Accepts JSON numbers and decimal strings; the mirror node uses both for 64-bit amounts.
    pub(crate) fn opt_i64(&self, key: &str) -> ApiResult<Option<i64>> {
        match self.present(key) {
            None => Ok(None),
            Some(Document::String(text)) => text.trim().parse::<i64>().map(Some).map_err(|err| {
                self.error(key, format!("'{text}' is not an integer")).with_source(err)
            }),
            Some(value) => value
                .as_number()
                .and_then(|number| number.as_i64())
                .map(Some)
                .ok_or_else(|| self.error(key, format!("expected integer, found {value}"))),
        }
    }

    pub(crate) fn i64(&self, key: &str) -> ApiResult<i64> {
        self.opt_i64(key)?
            .ok_or_else(|| self.error(key, "required field is missing"))
    }

    pub(crate) fn i64_or(&self, key: &str, default: i64) -> ApiResult<i64> {
        Ok(self.opt_i64(key)?.unwrap_or(default))
    }

    pub(crate) fn opt_u64(&self, key: &str) -> ApiResult<Option<u64>> {
        match self.opt_i64(key)? {
            None => Ok(None),
            Some(value) => u64::try_from(value)
                .map(Some)
                .map_err(|err| self.error(key, format!("{value} must not be negative")).with_source(err)),
        }
    }

    pub(crate) fn u32(&self, key: &str) -> ApiResult<u32> {
        let value = self.i64(key)?;
        u32::try_from(value)
            .map_err(|err| self.error(key, format!("{value} is out of range")).with_source(err))
    }

    pub(crate) fn i32_or(&self, key: &str, default: i32) -> ApiResult<i32> {
        match self.opt_i64(key)? {
            None => Ok(default),
            Some(value) => i32::try_from(value)
                .map_err(|err| self.error(key, format!("{value} is out of range")).with_source(err)),
        }
    }

    pub(crate) fn f64_or(&self, key: &str, default: f64) -> ApiResult<f64> {
        match self.present(key) {
            None => Ok(default),
            Some(Document::String(text)) => text.trim().parse::<f64>().map_err(|err| {
                self.error(key, format!("'{text}' is not a number")).with_source(err)
            }),
            Some(value) => value
                .as_number()
                .map(|number| number.as_f64())
                .ok_or_else(|| self.error(key, format!("expected number, found {value}"))),
        }
    }

    pub(crate) fn opt_bool(&self, key: &str) -> ApiResult<Option<bool>> {
        match self.present(key) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.error(key, format!("expected bool, found {value}"))),
        }
    }

    pub(crate) fn bool_or(&self, key: &str, default: bool) -> ApiResult<bool> {
        Ok(self.opt_bool(key)?.unwrap_or(default))
    }

    pub(crate) fn opt_parse<T>(&self, key: &str) -> ApiResult<Option<T>>
    where
        T: FromStr<Err = Error>,
    {
        match self.opt_str(key)? {
            None => Ok(None),
            Some(text) => text
                .parse::<T>()
                .map(Some)
                .map_err(|err| self.error(key, format!("'{text}' is malformed")).with_source(err)),
        }
    }

    pub(crate) fn parse<T>(&self, key: &str) -> ApiResult<T>
    where
        T: FromStr<Err = Error>,
    {
        self.opt_parse(key)?
            .ok_or_else(|| self.error(key, "required field is missing"))
    }

    pub(crate) fn opt_timestamp(&self, key: &str) -> ApiResult<Option<OffsetDateTime>> {
        match self.opt_str(key)? {
            None => Ok(None),
            Some(text) => parse_timestamp(text).map(Some).map_err(|err| {
                self.error(key, format!("'{text}' is not a timestamp")).with_source(err)
            }),
        }
    }

    pub(crate) fn timestamp(&self, key: &str) -> ApiResult<OffsetDateTime> {
        self.opt_timestamp(key)?
            .ok_or_else(|| self.error(key, "required field is missing"))
    }

    /// Whole seconds since the epoch, sent as a JSON number.
    pub(crate) fn epoch_seconds(&self, key: &str) -> ApiResult<OffsetDateTime> {
        let seconds = self.i64(key)?;
        OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|err| self.error(key, format!("{seconds} is out of range")).with_source(err))
    }

    pub(crate) fn opt_duration_seconds(&self, key: &str) -> ApiResult<Option<Duration>> {
        Ok(self.opt_u64(key)?.map(Duration::from_secs))
    }

    pub(crate) fn base64_or_empty(&self, key: &str) -> ApiResult<Vec<u8>> {
        match self.opt_str(key)? {
            None => Ok(Vec::new()),
            Some(text) => STANDARD
                .decode(text)
                .map_err(|err| self.error(key, "value is not base64").with_source(err)),
        }
    }

    pub(crate) fn hex_or_empty(&self, key: &str) -> ApiResult<Vec<u8>> {
        match self.opt_str(key)? {
            None => Ok(Vec::new()),
            Some(text) => {
                let digits = text.strip_prefix("0x").unwrap_or(text);
                hex::decode(digits)
                    .map_err(|err| self.error(key, "value is not hex").with_source(err))
            }
        }
    }

    /// Reads `{"_type": "ED25519", "key": "<hex>"}`.
    ///
    /// Composite keys arrive as `ProtobufEncoded` and are kept as opaque key bytes.
    pub(crate) fn key(&self, key: &str) -> ApiResult<Option<PublicKey>> {
        let Some(nested) = self.object(key)? else {
            return Ok(None);
        };
        let key_type = nested.str("_type")?;
        let algorithm = key_type
            .parse::<KeyAlgorithm>()
            .map_err(|err| nested.error("_type", format!("'{key_type}' is unsupported")).with_source(err))?;
        let hex = nested.str("key")?;
        PublicKey::from_hex(algorithm, hex)
            .map(Some)
            .map_err(|err| nested.error("key", "malformed key material").with_source(err))
    }

    pub(crate) fn object(&self, key: &str) -> ApiResult<Option<Fields<'a>>> {
        match self.present(key) {
            None => Ok(None),
            Some(value) if value.as_object().is_some() => Ok(Some(Fields {
                object: value,
                context: self.context,
            })),
            Some(value) => Err(self.error(key, format!("expected object, found {}", value.type_name()))),
        }
    }

    /// Maps every element of an array field; a missing or null field is an empty list.
    pub(crate) fn list<T>(
        &self,
        key: &str,
        context: &'static str,
        mut map: impl FnMut(Fields<'a>) -> ApiResult<T>,
    ) -> ApiResult<Vec<T>> {
        let Some(value) = self.present(key) else {
            return Ok(Vec::new());
        };
        let Some(items) = value.as_array() else {
            return Err(self.error(key, format!("expected array, found {}", value.type_name())));
        };
        items
            .iter()
            .map(|item| Fields::of(item, context).and_then(&mut map))
            .collect()
    }
}
