//! Preprocessing tasks and their results
//!
//! The manager sends a [`TaskMessage`] to a worker for every value that has
//! a preprocessing chain, and the worker answers with a [`ResultMessage`].
//! Both use the same scalar conventions as item values.
//!
//! # Wire Format
//!
//! ```text
//! Task:   itemid(u64) · value_type(u8) · ts_marker · [sec · ns]
//!         · value(variant) · history_marker · [value_type(u8) · value(variant)
//!         · sec · ns] · steps_num(i32) · steps_num × {type(u8) · params(str)}
//!
//! Result: value(variant) · history_marker · [value(variant) · sec · ns]
//!         · error(str)
//! ```

use bytes::{Buf, Bytes, BytesMut};

use crate::Result;
use crate::codec::{
    WireFormat, get_i32, get_marker, get_str, get_u8, get_u64, put_i32, put_marker, put_str,
    put_u8, put_u64,
};
use crate::error::ProtocolError;
use crate::schema::{StepType, Timespec, ValueType};
use crate::variant::{NumericValue, Variant};

/// Smallest packed step: type byte plus an absent params string
const MIN_STEP_SIZE: usize = 1 + 4;

/// One transformation in a preprocessing chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessingStep {
    pub step_type: StepType,
    pub params: String,
}

impl PreprocessingStep {
    pub fn new(step_type: StepType, params: impl Into<String>) -> Self {
        Self {
            step_type,
            params: params.into(),
        }
    }
}

/// Previous numeric value of an item and when it was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryValue {
    pub value: NumericValue,
    pub ts: Timespec,
}

impl HistoryValue {
    pub fn new(value: NumericValue, ts: Timespec) -> Self {
        Self { value, ts }
    }

    fn encode(&self, buf: &mut BytesMut) {
        self.value.encode(buf);
        put_i32(buf, self.ts.sec);
        put_i32(buf, self.ts.ns);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let value = NumericValue::decode(buf, "history.value")?;
        let ts = Timespec::new(get_i32(buf, "history.sec")?, get_i32(buf, "history.ns")?);
        Ok(Self { value, ts })
    }

    fn encode_opt(history: Option<&Self>, buf: &mut BytesMut) {
        match history {
            Some(history) => {
                put_marker(buf, true);
                history.encode(buf);
            }
            None => put_marker(buf, false),
        }
    }

    fn decode_opt(buf: &mut Bytes) -> Result<Option<Self>> {
        if get_marker(buf, "history")? {
            Ok(Some(Self::decode(buf)?))
        } else {
            Ok(None)
        }
    }
}

/// Baseline sent along with a task, tagged with the value type it was
/// stored under
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskHistory {
    pub value_type: ValueType,
    pub baseline: HistoryValue,
}

/// One unit of preprocessing work
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMessage {
    pub itemid: u64,
    pub value_type: ValueType,
    pub ts: Option<Timespec>,
    pub value: Variant,
    pub history: Option<TaskHistory>,
    pub steps: Vec<PreprocessingStep>,
}

impl TaskMessage {
    /// Task with no timestamp, no baseline and an empty chain
    pub fn new(itemid: u64, value_type: ValueType, value: impl Into<Variant>) -> Self {
        Self {
            itemid,
            value_type,
            ts: None,
            value: value.into(),
            history: None,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_ts(mut self, ts: Timespec) -> Self {
        self.ts = Some(ts);
        self
    }

    #[must_use]
    pub fn with_history(mut self, value_type: ValueType, baseline: HistoryValue) -> Self {
        self.history = Some(TaskHistory {
            value_type,
            baseline,
        });
        self
    }

    #[must_use]
    pub fn with_step(mut self, step_type: StepType, params: impl Into<String>) -> Self {
        self.steps.push(PreprocessingStep::new(step_type, params));
        self
    }

    /// True when some step needs the previous value as a baseline
    pub fn is_stateful(&self) -> bool {
        self.steps.iter().any(|step| step.step_type.is_stateful())
    }
}

impl WireFormat for TaskMessage {
    fn encode(&self, buf: &mut BytesMut) {
        put_u64(buf, self.itemid);
        put_u8(buf, self.value_type.as_u8());

        match self.ts {
            Some(ts) => {
                put_marker(buf, true);
                put_i32(buf, ts.sec);
                put_i32(buf, ts.ns);
            }
            None => put_marker(buf, false),
        }

        self.value.encode(buf);

        match &self.history {
            Some(history) => {
                put_marker(buf, true);
                put_u8(buf, history.value_type.as_u8());
                history.baseline.encode(buf);
            }
            None => put_marker(buf, false),
        }

        put_i32(buf, self.steps.len() as i32);
        for step in &self.steps {
            put_u8(buf, step.step_type.as_u8());
            put_str(buf, Some(&step.params));
        }
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let itemid = get_u64(buf, "itemid")?;
        let value_type = ValueType::from_u8(get_u8(buf, "value_type")?)?;

        let ts = if get_marker(buf, "ts")? {
            Some(Timespec::new(get_i32(buf, "ts.sec")?, get_i32(buf, "ts.ns")?))
        } else {
            None
        };

        let value = Variant::decode(buf, "value")?;

        let history = if get_marker(buf, "history")? {
            Some(TaskHistory {
                value_type: ValueType::from_u8(get_u8(buf, "history.value_type")?)?,
                baseline: HistoryValue::decode(buf)?,
            })
        } else {
            None
        };

        let steps_num = get_i32(buf, "steps_num")?;
        if steps_num < 0 {
            return Err(ProtocolError::InvalidStepCount(steps_num));
        }
        let steps_num = steps_num as usize;
        if buf.remaining() < steps_num * MIN_STEP_SIZE {
            return Err(ProtocolError::truncated(
                "steps",
                steps_num * MIN_STEP_SIZE,
                buf.remaining(),
            ));
        }

        let mut steps = Vec::with_capacity(steps_num);
        for _ in 0..steps_num {
            let step_type = StepType::from_u8(get_u8(buf, "step.type")?)?;
            let params = get_str(buf, "step.params")?.unwrap_or_default();
            steps.push(PreprocessingStep { step_type, params });
        }

        Ok(Self {
            itemid,
            value_type,
            ts,
            value,
            history,
            steps,
        })
    }
}

/// Outcome of a preprocessing task
///
/// When `error` is set the value is meaningless and is usually absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMessage {
    pub value: Option<Variant>,
    pub history: Option<HistoryValue>,
    pub error: Option<String>,
}

impl ResultMessage {
    /// Chain completed with `value`
    pub fn success(value: impl Into<Variant>, history: Option<HistoryValue>) -> Self {
        Self {
            value: Some(value.into()),
            history,
            error: None,
        }
    }

    /// A step failed; the baseline may still need updating
    pub fn failure(error: impl Into<String>, history: Option<HistoryValue>) -> Self {
        Self {
            value: None,
            history,
            error: Some(error.into()),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl WireFormat for ResultMessage {
    fn encode(&self, buf: &mut BytesMut) {
        Variant::encode_opt(self.value.as_ref(), buf);
        HistoryValue::encode_opt(self.history.as_ref(), buf);
        put_str(buf, self.error.as_deref());
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let value = Variant::decode_opt(buf, "value")?;
        let history = HistoryValue::decode_opt(buf)?;
        let error = get_str(buf, "error")?;
        Ok(Self {
            value,
            history,
            error,
        })
    }
}
