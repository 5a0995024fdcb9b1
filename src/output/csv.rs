// Per-group CSV rendering

use crate::core::assembler::DecodedGroup;
use std::borrow::Cow;
use std::fmt::Write;

/// `sample_index,time_seconds,<labels...>` followed by one row per sample.
pub fn render_group_csv(group: &DecodedGroup) -> String {
    let mut out = String::from("sample_index,time_seconds");
    for label in &group.channel_labels {
        out.push(',');
        out.push_str(&escape_field(label));
    }
    out.push('\n');

    for i in 0..group.number_of_samples {
        // Writing into a String cannot fail
        let _ = write!(out, "{},{}", i, format_value(group.time_at(i)));
        for channel in &group.samples {
            out.push(',');
            if let Some(value) = channel.get(i) {
                out.push_str(&format_value(*value));
            }
        }
        out.push('\n');
    }
    out
}

/// Shortest round-trip form, always with a decimal point ("0.0", "-10.0").
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
