use serde::{de::Error as _, Deserialize, Deserializer};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

/// Parses backend timestamps. Accepts RFC 3339 and the `datetime-local`
/// shapes (`YYYY-MM-DDTHH:MM[:SS]`) without an offset, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value.assume_utc());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }
    // Postgres text output, e.g. "2025-01-02 10:20:30"
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }

    None
}

pub fn format_rfc3339(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

/// Card-style rendering used by the class lists: `Thu, Jan 2, 2025, 10:20 AM`.
pub fn format_display(value: Option<OffsetDateTime>) -> String {
    let Some(value) = value else {
        return "Not scheduled".to_string();
    };

    value
        .format(format_description!(
            "[weekday repr:short], [month repr:short] [day padding:none], [year], [hour repr:12]:[minute] [period]"
        ))
        .unwrap_or_else(|_| "Invalid date".to_string())
}

pub(crate) fn deserialize_option_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_timestamp(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid datetime: {value}")))
            .map(Some),
        None => Ok(None),
    }
}
