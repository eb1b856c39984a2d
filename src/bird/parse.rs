//! Parsers for `show status` and `show protocols all` output.
//!
//! The protocol listing is a sequence of records. Each record starts with a
//! non-indented summary line (`name proto table state since info`) followed
//! by indented detail lines:
//!
//! ```text
//! ber1_gw1   BGP        ---        up     2024-10-12 20:41:14  Established
//!   BGP state:          Established
//!     Neighbor address: 192.168.32.1
//!     Neighbor AS:      64846
//!     Local AS:         64846
//!   Channel ipv4
//!     Routes:         21 imported, 0 exported, 21 preferred
//! ```
//!
//! Only BGP records are collected. Anything the parser does not recognize is
//! skipped; a field that fails to parse keeps its zero value.

use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{Error, ParseErrorKind, Result};

use super::model::{BgpSession, ChannelStats, RouterStatus};

const ROUTER_ID_PREFIX: &str = "Router ID is ";
const HOSTNAME_PREFIX: &str = "Hostname is ";

/// Parse `show status` output.
///
/// Never fails: missing or unparsable lines leave the field at its zero value.
pub fn parse_status(text: &str) -> RouterStatus {
    let mut status = RouterStatus::default();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(ROUTER_ID_PREFIX) {
            status.router_id = rest.trim().parse::<Ipv4Addr>().ok();
        } else if let Some(rest) = line.strip_prefix(HOSTNAME_PREFIX) {
            status.hostname = rest.trim().to_owned();
        }
    }
    status
}

/// Parse `show protocols all` output, reading timestamps as local time.
///
/// See [`parse_protocols_in`].
pub fn parse_protocols(text: &str) -> Result<Vec<BgpSession>> {
    parse_protocols_in(text, &Local)
}

/// Parse `show protocols all` output, reading timestamps in `tz`.
///
/// Returns the BGP sessions sorted by neighbor address (see
/// [`BgpSession::address_key`]); sessions with equal keys keep their input
/// order.
///
/// # Errors
///
/// A BGP summary line without its state and since columns can only come from
/// truncated output, so it fails the whole pass with [`Error::Parse`]. A
/// line that has them but no Info column is a disabled protocol and is
/// skipped.
pub fn parse_protocols_in<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<Vec<BgpSession>> {
    let mut parser = ProtocolsParser::new(tz);
    for line in text.lines() {
        parser.feed(line)?;
    }
    Ok(parser.finish())
}

/// Where the parser is within the record stream.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineState {
    /// Waiting for a summary line.
    ScanningNewRecord,
    /// Inside the body of a non-BGP protocol.
    SkippingRecord,
    /// Inside the BGP detail lines before any channel.
    InBgpHeader,
    /// Inside the named channel block of a BGP record.
    InChannelBlock(String),
}

struct ProtocolsParser<'a, Tz: TimeZone> {
    state: LineState,
    current: Option<BgpSession>,
    sessions: Vec<BgpSession>,
    tz: &'a Tz,
    today: NaiveDate,
}

impl<'a, Tz: TimeZone> ProtocolsParser<'a, Tz> {
    fn new(tz: &'a Tz) -> Self {
        Self {
            state: LineState::ScanningNewRecord,
            current: None,
            sessions: Vec::new(),
            tz,
            today: Utc::now().with_timezone(tz).date_naive(),
        }
    }

    fn feed(&mut self, line: &str) -> Result<()> {
        if line.is_empty() {
            return Ok(());
        }
        if !line.starts_with([' ', '\t']) {
            self.state = LineState::ScanningNewRecord;
        }

        let state = std::mem::replace(&mut self.state, LineState::ScanningNewRecord);
        self.state = match state {
            LineState::ScanningNewRecord => self.scan_new_record(line)?,
            LineState::SkippingRecord => LineState::SkippingRecord,
            LineState::InBgpHeader => self.in_bgp_header(line),
            LineState::InChannelBlock(name) => self.in_channel_block(name, line),
        };
        Ok(())
    }

    fn scan_new_record(&mut self, line: &str) -> Result<LineState> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.get(1) != Some(&"BGP") {
            return Ok(LineState::SkippingRecord);
        }
        if fields.len() < 5 {
            return Err(Error::parse(
                ParseErrorKind::MalformedHeader {
                    fields: fields.len(),
                },
                line,
            ));
        }
        if fields.len() < 6 {
            // disabled protocols print no Info column
            tracing::trace!(bird.protocol = fields[0], "skipping BGP record without info column");
            return Ok(LineState::SkippingRecord);
        }

        if let Some(done) = self.current.take() {
            self.sessions.push(done);
        }

        self.current = Some(BgpSession {
            name: fields[0].to_owned(),
            table: (fields[2] != "---").then(|| fields[2].to_owned()),
            up: fields[3] == "up",
            since: self.parse_since(fields[4], fields[5]),
            ..Default::default()
        });
        Ok(LineState::InBgpHeader)
    }

    fn in_bgp_header(&mut self, line: &str) -> LineState {
        let trimmed = line.trim();
        if let Some(name) = channel_name(trimmed) {
            return LineState::InChannelBlock(name);
        }

        let Some(session) = self.current.as_mut() else {
            return LineState::InBgpHeader;
        };
        let Some((key, value)) = trimmed.split_once(':') else {
            return LineState::InBgpHeader;
        };
        let value = value.trim();
        match key {
            "BGP state" => session.state = value.to_owned(),
            "Neighbor address" => session.neighbor_address = value.parse::<IpAddr>().ok(),
            "Neighbor AS" => session.neighbor_as = value.parse().unwrap_or(0),
            "Local AS" => session.local_as = value.parse().unwrap_or(0),
            _ => {}
        }
        LineState::InBgpHeader
    }

    fn in_channel_block(&mut self, name: String, line: &str) -> LineState {
        let trimmed = line.trim();
        if let Some(next) = channel_name(trimmed) {
            return LineState::InChannelBlock(next);
        }

        if let (Some(routes), Some(session)) =
            (trimmed.strip_prefix("Routes:"), self.current.as_mut())
        {
            let stats = session.channels.entry(name.clone()).or_default();
            apply_route_counts(stats, routes);
        }
        LineState::InChannelBlock(name)
    }

    /// `date time` first, then `time` alone as a time of day today, then
    /// `date` alone as midnight.
    fn parse_since(&self, first: &str, second: &str) -> Option<DateTime<Utc>> {
        let joined = format!("{} {}", first, second);
        let naive = NaiveDateTime::parse_from_str(&joined, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveTime::parse_from_str(first, "%H:%M:%S%.f")
                    .ok()
                    .map(|time| self.today.and_time(time))
            })
            .or_else(|| {
                NaiveDate::parse_from_str(first, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;

        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn finish(mut self) -> Vec<BgpSession> {
        if let Some(done) = self.current.take() {
            self.sessions.push(done);
        }
        self.sessions.sort_by_key(BgpSession::address_key);
        tracing::trace!(bird.sessions = self.sessions.len(), "parsed protocol listing");
        self.sessions
    }
}

fn channel_name(trimmed: &str) -> Option<String> {
    let rest = trimmed.strip_prefix("Channel ")?.trim();
    (!rest.is_empty()).then(|| rest.to_owned())
}

/// Apply `21 imported, 0 exported, 21 preferred` to `stats`.
fn apply_route_counts(stats: &mut ChannelStats, counts: &str) {
    for phrase in counts.split(',') {
        let Some((number, label)) = phrase.trim().split_once(' ') else {
            continue;
        };
        let Ok(number) = number.parse::<u32>() else {
            continue;
        };
        match label.trim() {
            "imported" => stats.imported = number,
            "exported" => stats.exported = number,
            "preferred" => stats.preferred = number,
            _ => {}
        }
    }
}
