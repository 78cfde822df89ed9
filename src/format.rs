use crate::action::ResultRow;
use crate::backend::RawResultSet;
use serde_json::Value;

/// Shape a raw backend result set into protocol result rows.
///
/// The engine prepends a header row, so row 0 is skipped. Column labels
/// are zipped positionally with cell values; the zip truncates at the
/// shorter side, matching how the engine reports ragged rows.
pub fn result_rows(raw: &RawResultSet) -> Vec<ResultRow> {
    raw.rows
        .iter()
        .skip(1)
        .map(|row| {
            raw.columns
                .iter()
                .zip(row.iter())
                .map(|(column, cell)| (column.clone(), coerce_cell(column, cell.as_deref())))
                .collect()
        })
        .collect()
}

/// Convert one cell to its typed JSON value.
///
/// All values stay strings except the two known numeric columns: `age`
/// parses to an integer and `billing_amount` to a float. A cell that fails
/// to parse keeps its verbatim string; an absent cell is null.
pub fn coerce_cell(column: &str, value: Option<&str>) -> Value {
    let Some(text) = value else {
        return Value::Null;
    };

    match column {
        "age" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "billing_amount" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        _ => Value::String(text.to_string()),
    }
}
