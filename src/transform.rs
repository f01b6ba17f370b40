//! Pure reshaping of upstream JSON payloads.

use serde_json::{Map, Value};

use crate::error::RelayError;
use crate::quote::MetalQuote;

/// Symbols kept from the MCX commodity listing.
pub const INDIAN_METALS: [&str; 3] = ["GOLD", "SILVER", "COPPER"];

/// How many volume gainers the dashboard shows.
pub const VOLUME_GAINERS_LIMIT: usize = 5;

/// Read a number that may arrive as a JSON number or a numeric string.
fn loose_f64(v: Option<&Value>) -> Option<f64> {
    let x = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    x.filter(|x| x.is_finite())
}

/// Filter the MCX listing (`data.list`) down to gold/silver/copper contracts.
/// A payload without a list yields an empty result.
pub fn indian_metals(payload: &Value) -> Vec<MetalQuote> {
    let Some(list) = payload.pointer("/data/list").and_then(Value::as_array) else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|item| {
            let symbol = item.get("symbol")?.as_str()?.to_uppercase();
            if !INDIAN_METALS.iter().any(|m| symbol.contains(m)) {
                return None;
            }
            Some(MetalQuote {
                rate: loose_f64(item.get("lastPrice")).unwrap_or(0.0),
                change: loose_f64(item.get("priceChangePercentage")).unwrap_or(0.0),
                name: symbol,
            })
        })
        .collect()
}

/// Pick the top volume spurts among advancing stocks.
///
/// Keeps rows with `pChange > 0`, adds `volumeDiff` (volume over the two-week
/// average) and `percentageIncrease`, sorts by the latter descending and keeps
/// the first [`VOLUME_GAINERS_LIMIT`]. Rows missing any volume figure, or
/// without a positive average volume, are dropped since the percentage is
/// undefined for them.
pub fn volume_gainers(payload: &Value) -> Result<Vec<Value>, RelayError> {
    let rows = match payload.get("data") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            return Err(RelayError::Transform(format!(
                "volume gainers `data` is not an array: {}",
                type_name(other)
            )))
        }
    };

    let mut scored: Vec<(f64, Map<String, Value>)> = rows
        .iter()
        .filter_map(|row| {
            let obj = row.as_object()?;
            let p_change = loose_f64(obj.get("pChange"))?;
            if p_change <= 0.0 {
                return None;
            }
            let week1 = loose_f64(obj.get("week1AvgVolume"))?;
            let week2 = loose_f64(obj.get("week2AvgVolume"))?;
            let volume = loose_f64(obj.get("volume"))?;

            let avg_volume = (week1 + week2) / 2.0;
            if avg_volume <= 0.0 {
                return None;
            }
            let volume_diff = volume - avg_volume;
            let pct = volume_diff / avg_volume * 100.0;

            let mut out = obj.clone();
            out.insert("volumeDiff".into(), json_f64(volume_diff));
            out.insert("percentageIncrease".into(), json_f64(pct));
            Some((pct, out))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    Ok(scored
        .into_iter()
        .take(VOLUME_GAINERS_LIMIT)
        .map(|(_, row)| Value::Object(row))
        .collect())
}

fn json_f64(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
