//! Item values submitted by pollers
//!
//! An [`ItemValue`] is one pending raw measurement on its way to the
//! preprocessing manager. Either the measurement succeeded and carries an
//! [`AgentResult`], or the item is not supported and carries an error
//! message, never both. The [`Outcome`] enum makes the contradictory
//! combinations unrepresentable; [`ItemValue::from_parts`] is the fallible
//! entry point for callers holding the loose fields.
//!
//! # Wire Format
//!
//! ```text
//! itemid(u64) · value_type(u8) · flags(u8) · state(u8) · error(str)
//! ts_marker(u8) · [sec(i32) · ns(i32)]
//! result_marker(u8) · [lastlogsize(u64) · ui64(u64) · dbl(f64)
//!                      · str · text · msg · type(i32) · mtime(i32)
//!                      · log_marker(u8) · [value · source · timestamp(i32)
//!                                          · severity(i32) · logeventid(i32)]]
//! ```

use bytes::{Bytes, BytesMut};

use crate::Result;
use crate::codec::{
    WireFormat, get_f64, get_i32, get_marker, get_str, get_u8, get_u64, put_f64, put_i32,
    put_marker, put_str, put_u8, put_u64,
};
use crate::error::ProtocolError;
use crate::schema::{ItemFlags, ItemState, Timespec, ValueType};

/// Result type flags of the packed agent result
pub mod result_flags {
    pub const UINT64: i32 = 0x01;
    pub const DOUBLE: i32 = 0x02;
    pub const STRING: i32 = 0x04;
    pub const TEXT: i32 = 0x08;
    pub const LOG: i32 = 0x10;
    pub const MESSAGE: i32 = 0x20;
    pub const META: i32 = 0x40;

    /// Flags that select the value itself
    pub const VALUE_MASK: i32 = UINT64 | DOUBLE | STRING | TEXT | LOG;
}

/// One log line with its origin
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogRecord {
    pub value: String,
    pub source: Option<String>,
    pub timestamp: i32,
    pub severity: i32,
    pub logeventid: i32,
}

impl LogRecord {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }
}

/// Log file position reached by the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogMeta {
    pub lastlogsize: u64,
    pub mtime: i32,
}

/// Measured value as returned by a data source
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    Uint64(u64),
    Double(f64),
    Str(String),
    Text(String),
    Log(LogRecord),
}

impl ResultValue {
    const fn flag(&self) -> i32 {
        match self {
            Self::Uint64(_) => result_flags::UINT64,
            Self::Double(_) => result_flags::DOUBLE,
            Self::Str(_) => result_flags::STRING,
            Self::Text(_) => result_flags::TEXT,
            Self::Log(_) => result_flags::LOG,
        }
    }
}

/// Successful measurement
///
/// `value` may be absent when only the log position moved (no new lines).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentResult {
    pub value: Option<ResultValue>,
    pub meta: Option<LogMeta>,
}

impl AgentResult {
    pub fn uint64(v: u64) -> Self {
        Self::from(ResultValue::Uint64(v))
    }

    pub fn double(v: f64) -> Self {
        Self::from(ResultValue::Double(v))
    }

    pub fn str(v: impl Into<String>) -> Self {
        Self::from(ResultValue::Str(v.into()))
    }

    pub fn text(v: impl Into<String>) -> Self {
        Self::from(ResultValue::Text(v.into()))
    }

    pub fn log(record: LogRecord) -> Self {
        Self::from(ResultValue::Log(record))
    }

    /// Result carrying only a log file position
    pub fn meta_only(meta: LogMeta) -> Self {
        Self {
            value: None,
            meta: Some(meta),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, lastlogsize: u64, mtime: i32) -> Self {
        self.meta = Some(LogMeta { lastlogsize, mtime });
        self
    }

    /// The textual value, if this result holds a string or text
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            Some(ResultValue::Str(s) | ResultValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn is_log(&self) -> bool {
        matches!(self.value, Some(ResultValue::Log(_)))
    }

    fn type_flags(&self) -> i32 {
        let mut flags = self.value.as_ref().map_or(0, ResultValue::flag);
        if self.meta.is_some() {
            flags |= result_flags::META;
        }
        flags
    }

    fn encode(&self, buf: &mut BytesMut) {
        let meta = self.meta.unwrap_or_default();

        put_u64(buf, meta.lastlogsize);
        match &self.value {
            Some(ResultValue::Uint64(v)) => put_u64(buf, *v),
            _ => put_u64(buf, 0),
        }
        match &self.value {
            Some(ResultValue::Double(v)) => put_f64(buf, *v),
            _ => put_f64(buf, 0.0),
        }
        match &self.value {
            Some(ResultValue::Str(s)) => put_str(buf, Some(s)),
            _ => put_str(buf, None),
        }
        match &self.value {
            Some(ResultValue::Text(s)) => put_str(buf, Some(s)),
            _ => put_str(buf, None),
        }
        // msg: errors travel in the item value, not in the result
        put_str(buf, None);
        put_i32(buf, self.type_flags());
        put_i32(buf, meta.mtime);

        match &self.value {
            Some(ResultValue::Log(log)) => {
                put_marker(buf, true);
                put_str(buf, Some(&log.value));
                put_str(buf, log.source.as_deref());
                put_i32(buf, log.timestamp);
                put_i32(buf, log.severity);
                put_i32(buf, log.logeventid);
            }
            _ => put_marker(buf, false),
        }
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let lastlogsize = get_u64(buf, "result.lastlogsize")?;
        let ui64 = get_u64(buf, "result.ui64")?;
        let dbl = get_f64(buf, "result.dbl")?;
        let str_value = get_str(buf, "result.str")?;
        let text_value = get_str(buf, "result.text")?;
        let _msg = get_str(buf, "result.msg")?;
        let flags = get_i32(buf, "result.type")?;
        let mtime = get_i32(buf, "result.mtime")?;

        let log = if get_marker(buf, "result.log")? {
            Some(LogRecord {
                value: get_str(buf, "log.value")?.unwrap_or_default(),
                source: get_str(buf, "log.source")?,
                timestamp: get_i32(buf, "log.timestamp")?,
                severity: get_i32(buf, "log.severity")?,
                logeventid: get_i32(buf, "log.logeventid")?,
            })
        } else {
            None
        };

        let value_flags = flags & result_flags::VALUE_MASK;
        if value_flags.count_ones() > 1 {
            return Err(ProtocolError::AmbiguousResult(flags));
        }

        let value = match (value_flags, log) {
            (0, None) => None,
            (result_flags::UINT64, None) => Some(ResultValue::Uint64(ui64)),
            (result_flags::DOUBLE, None) => Some(ResultValue::Double(dbl)),
            (result_flags::STRING, None) => Some(ResultValue::Str(str_value.unwrap_or_default())),
            (result_flags::TEXT, None) => Some(ResultValue::Text(text_value.unwrap_or_default())),
            (result_flags::LOG, Some(log)) => Some(ResultValue::Log(log)),
            (result_flags::LOG, None) => {
                return Err(ProtocolError::InvalidMarker {
                    field: "result.log",
                    value: 0,
                });
            }
            (_, Some(_)) => {
                return Err(ProtocolError::InvalidMarker {
                    field: "result.log",
                    value: 1,
                });
            }
            _ => return Err(ProtocolError::AmbiguousResult(flags)),
        };

        let meta = (flags & result_flags::META != 0).then_some(LogMeta { lastlogsize, mtime });

        Ok(Self { value, meta })
    }
}

impl From<ResultValue> for AgentResult {
    fn from(value: ResultValue) -> Self {
        Self {
            value: Some(value),
            meta: None,
        }
    }
}

/// What happened to the measurement
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Measured successfully
    Normal(AgentResult),
    /// Could not be measured; the message explains why
    NotSupported(String),
}

/// One pending raw measurement
#[derive(Debug, Clone, PartialEq)]
pub struct ItemValue {
    itemid: u64,
    value_type: ValueType,
    flags: ItemFlags,
    ts: Option<Timespec>,
    outcome: Outcome,
}

impl ItemValue {
    /// Successful measurement
    ///
    /// # Errors
    ///
    /// Returns `InvalidItemValue` if the result is a log record but the
    /// item is not a log item.
    pub fn normal(
        itemid: u64,
        value_type: ValueType,
        result: AgentResult,
        ts: Option<Timespec>,
    ) -> Result<Self> {
        if result.is_log() && value_type != ValueType::Log {
            return Err(ProtocolError::invalid_item_value(
                itemid,
                "log record on a non-log item",
            ));
        }
        Ok(Self {
            itemid,
            value_type,
            flags: ItemFlags::NORMAL,
            ts,
            outcome: Outcome::Normal(result),
        })
    }

    /// Measurement that failed with `error`
    pub fn not_supported(
        itemid: u64,
        value_type: ValueType,
        error: impl Into<String>,
        ts: Option<Timespec>,
    ) -> Self {
        Self {
            itemid,
            value_type,
            flags: ItemFlags::NORMAL,
            ts,
            outcome: Outcome::NotSupported(error.into()),
        }
    }

    /// Build from the loose fields a poller holds
    ///
    /// # Errors
    ///
    /// Returns `InvalidItemValue` unless exactly one of `result` (for
    /// `Normal`) or `error` (for `NotSupported`) is present.
    pub fn from_parts(
        itemid: u64,
        value_type: ValueType,
        flags: ItemFlags,
        state: ItemState,
        ts: Option<Timespec>,
        result: Option<AgentResult>,
        error: Option<String>,
    ) -> Result<Self> {
        let value = match (state, result, error) {
            (ItemState::Normal, Some(result), None) => {
                Self::normal(itemid, value_type, result, ts)?
            }
            (ItemState::NotSupported, None, Some(error)) => {
                Self::not_supported(itemid, value_type, error, ts)
            }
            (ItemState::Normal, _, Some(_)) => {
                return Err(ProtocolError::invalid_item_value(
                    itemid,
                    "normal value carries an error",
                ));
            }
            (ItemState::Normal, None, None) => {
                return Err(ProtocolError::invalid_item_value(
                    itemid,
                    "normal value without a result",
                ));
            }
            (ItemState::NotSupported, Some(_), _) => {
                return Err(ProtocolError::invalid_item_value(
                    itemid,
                    "not supported value carries a result",
                ));
            }
            (ItemState::NotSupported, None, None) => {
                return Err(ProtocolError::invalid_item_value(
                    itemid,
                    "not supported value without an error",
                ));
            }
        };
        Ok(value.with_flags(flags))
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn itemid(&self) -> u64 {
        self.itemid
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[inline]
    pub fn flags(&self) -> ItemFlags {
        self.flags
    }

    #[inline]
    pub fn ts(&self) -> Option<Timespec> {
        self.ts
    }

    #[inline]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn state(&self) -> ItemState {
        match self.outcome {
            Outcome::Normal(_) => ItemState::Normal,
            Outcome::NotSupported(_) => ItemState::NotSupported,
        }
    }

    pub fn result(&self) -> Option<&AgentResult> {
        match &self.outcome {
            Outcome::Normal(result) => Some(result),
            Outcome::NotSupported(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Normal(_) => None,
            Outcome::NotSupported(error) => Some(error),
        }
    }
}

impl WireFormat for ItemValue {
    fn encode(&self, buf: &mut BytesMut) {
        put_u64(buf, self.itemid);
        put_u8(buf, self.value_type.as_u8());
        put_u8(buf, self.flags.bits());
        put_u8(buf, self.state().as_u8());
        put_str(buf, self.error());

        match self.ts {
            Some(ts) => {
                put_marker(buf, true);
                put_i32(buf, ts.sec);
                put_i32(buf, ts.ns);
            }
            None => put_marker(buf, false),
        }

        match self.result() {
            Some(result) => {
                put_marker(buf, true);
                result.encode(buf);
            }
            None => put_marker(buf, false),
        }
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let itemid = get_u64(buf, "itemid")?;
        let value_type = ValueType::from_u8(get_u8(buf, "value_type")?)?;
        let flags = ItemFlags::from_bits(get_u8(buf, "flags")?);
        let state = ItemState::from_u8(get_u8(buf, "state")?)?;
        let error = get_str(buf, "error")?;

        let ts = if get_marker(buf, "ts")? {
            Some(Timespec::new(get_i32(buf, "ts.sec")?, get_i32(buf, "ts.ns")?))
        } else {
            None
        };

        let result = if get_marker(buf, "result")? {
            Some(AgentResult::decode(buf)?)
        } else {
            None
        };

        Self::from_parts(itemid, value_type, flags, state, ts, result, error)
    }
}

/// Loose description of a measurement as handed over by a poller
///
/// Fields mirror what pollers collect; nothing ties `state` to
/// `result`/`error` here. Converting into an [`ItemValue`] validates them.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub itemid: u64,
    pub value_type: ValueType,
    pub flags: ItemFlags,
    pub state: ItemState,
    pub ts: Option<Timespec>,
    pub result: Option<AgentResult>,
    pub error: Option<String>,
}

impl Measurement {
    /// Successful measurement of a plain item
    pub fn value(
        itemid: u64,
        value_type: ValueType,
        result: AgentResult,
        ts: Option<Timespec>,
    ) -> Self {
        Self {
            itemid,
            value_type,
            flags: ItemFlags::NORMAL,
            state: ItemState::Normal,
            ts,
            result: Some(result),
            error: None,
        }
    }

    /// Failed measurement of a plain item
    pub fn not_supported(
        itemid: u64,
        value_type: ValueType,
        error: impl Into<String>,
        ts: Option<Timespec>,
    ) -> Self {
        Self {
            itemid,
            value_type,
            flags: ItemFlags::NORMAL,
            state: ItemState::NotSupported,
            ts,
            result: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Text handed to low-level discovery, if this measurement is a
    /// successful discovery-rule result with a textual value
    pub fn discovery_text(&self) -> Option<&str> {
        if self.state == ItemState::NotSupported || !self.flags.is_discovery_rule() {
            return None;
        }
        self.result.as_ref().and_then(AgentResult::as_text)
    }
}

impl TryFrom<Measurement> for ItemValue {
    type Error = ProtocolError;

    fn try_from(m: Measurement) -> Result<Self> {
        Self::from_parts(m.itemid, m.value_type, m.flags, m.state, m.ts, m.result, m.error)
    }
}
