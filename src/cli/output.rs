//! Output formatting for `--once` dumps.
//!
//! Supports human-readable, JSON, and raw output formats.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::cli::hints;
use crate::{Oid, Snapshot, Value, VarBind};

/// A dumped snapshot, ready for output.
#[derive(Debug, Serialize)]
pub struct DumpResult {
    pub built_at: DateTime<Utc>,
    pub results: Vec<VarBindResult>,
}

/// A single varbind result.
#[derive(Debug, Serialize)]
pub struct VarBindResult {
    pub oid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

/// Output context for formatting.
pub struct OutputContext {
    pub format: OutputFormat,
    pub show_hints: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_hints: true,
        }
    }

    /// Write every binding of `snapshot` to stdout, in OID order.
    pub fn write_snapshot(&self, snapshot: &Snapshot) -> io::Result<()> {
        let result = self.build_result(snapshot);
        let mut stdout = io::stdout().lock();
        self.write_result(&mut stdout, &result)
    }

    fn write_result<W: Write>(&self, w: &mut W, result: &DumpResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => self.write_human(w, result),
            OutputFormat::Json => self.write_json(w, result),
            OutputFormat::Raw => self.write_raw(w, result),
        }
    }

    fn build_result(&self, snapshot: &Snapshot) -> DumpResult {
        let results = snapshot
            .store
            .iter()
            .map(|(oid, value)| self.format_varbind(&VarBind::new(oid.clone(), value.clone())))
            .collect();

        DumpResult {
            built_at: snapshot.built_at,
            results,
        }
    }

    fn format_varbind(&self, vb: &VarBind) -> VarBindResult {
        let hint = if self.show_hints {
            hints::lookup(&vb.oid)
        } else {
            None
        };
        let (value_type, value, formatted) = format_value(&vb.value);

        VarBindResult {
            oid: format_oid(&vb.oid),
            hint,
            value_type,
            value,
            formatted,
        }
    }

    fn write_human<W: Write>(&self, w: &mut W, result: &DumpResult) -> io::Result<()> {
        for vb in &result.results {
            match &vb.hint {
                Some(hint) => write!(w, "{} ({})", vb.oid, hint)?,
                None => write!(w, "{}", vb.oid)?,
            }
            write!(w, " = {}: ", vb.value_type)?;

            if let Some(formatted) = &vb.formatted {
                writeln!(w, "{}", formatted)?;
            } else {
                match &vb.value {
                    serde_json::Value::String(s) => writeln!(w, "\"{}\"", s)?,
                    serde_json::Value::Null => writeln!(w)?,
                    other => writeln!(w, "{}", other)?,
                }
            }
        }
        Ok(())
    }

    fn write_json<W: Write>(&self, w: &mut W, result: &DumpResult) -> io::Result<()> {
        let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
        writeln!(w, "{}", json)
    }

    fn write_raw<W: Write>(&self, w: &mut W, result: &DumpResult) -> io::Result<()> {
        for vb in &result.results {
            let value_str = match &vb.value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            writeln!(w, "{}\t{}", vb.oid, value_str)?;
        }
        Ok(())
    }
}

fn format_oid(oid: &Oid) -> String {
    oid.to_string()
}

/// Format a value, returning (type_name, json_value, formatted_string).
fn format_value(value: &Value) -> (String, serde_json::Value, Option<String>) {
    let type_name = value.type_name().to_owned();
    match value {
        Value::Integer(v) => (type_name, (*v).into(), None),

        Value::OctetString(bytes) => {
            if is_printable(bytes) {
                let s = String::from_utf8_lossy(bytes);
                (type_name, serde_json::Value::String(s.into_owned()), None)
            } else {
                (
                    "Hex-STRING".into(),
                    serde_json::Value::String(hex_string(bytes)),
                    Some(format_hex_string(bytes)),
                )
            }
        }

        Value::Null => (type_name, serde_json::Value::Null, None),

        Value::ObjectIdentifier(oid) => (type_name, serde_json::Value::String(format_oid(oid)), None),

        Value::IpAddress(bytes) => {
            let s = format!("{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3]);
            (type_name, serde_json::Value::String(s), None)
        }

        Value::Counter32(v) | Value::Gauge32(v) => (type_name, (*v).into(), None),

        Value::TimeTicks(v) => (
            type_name,
            (*v).into(),
            Some(format!("({}) {}", v, format_timeticks(*v))),
        ),

        Value::Opaque(bytes) => (
            type_name,
            serde_json::Value::String(hex_string(bytes)),
            Some(format_hex_string(bytes)),
        ),

        Value::Counter64(v) => (type_name, (*v).into(), None),

        Value::NoSuchObject => (
            type_name,
            serde_json::Value::Null,
            Some("No Such Object available".into()),
        ),

        Value::NoSuchInstance => (
            type_name,
            serde_json::Value::Null,
            Some("No Such Instance currently exists".into()),
        ),

        Value::EndOfMibView => (
            type_name,
            serde_json::Value::Null,
            Some("No more variables left in this MIB View".into()),
        ),
    }
}

/// Check if bytes are printable ASCII/UTF-8.
fn is_printable(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(s) => s
            .chars()
            .all(|c| c.is_ascii_graphic() || c.is_ascii_whitespace()),
        Err(_) => false,
    }
}

/// Format bytes as hex string (lowercase, no separator).
fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Format bytes as spaced hex for display.
fn format_hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format TimeTicks as human-readable duration.
fn format_timeticks(centiseconds: u32) -> String {
    let total_seconds = centiseconds / 100;
    let cs = centiseconds % 100;

    let days = total_seconds / 86400;
    let hours = (total_seconds % 86400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}.{:02}", days, hours, minutes, seconds, cs)
    } else {
        format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, cs)
    }
}

/// Write an error message to stderr.
pub fn write_error(err: &crate::Error) {
    eprintln!("Error: {}", err);
}
