//! Structured events emitted while building dictionaries and scanning
//! segments.
//!
//! Every record goes to the `cubescan` target as
//! `event=<name> <component kv> <fields>`. The level is fixed per event so
//! call sites cannot drift apart on how loud the same thing is.

use log::Level;

/// Single logging target for the crate.
pub(crate) const LOG_TARGET: &str = "cubescan";

/// Events the crate reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LogEvent {
    DictionaryBuilt,
    RangeUnsatisfiable,
    SegmentOpened,
    SegmentClosed,
    PartialResultReturned,
    ScanThresholdExceeded,
    ScanFailed,
}

impl LogEvent {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            LogEvent::DictionaryBuilt => "dictionary_built",
            LogEvent::RangeUnsatisfiable => "range_unsatisfiable",
            LogEvent::SegmentOpened => "segment_opened",
            LogEvent::SegmentClosed => "segment_closed",
            LogEvent::PartialResultReturned => "partial_result_returned",
            LogEvent::ScanThresholdExceeded => "scan_threshold_exceeded",
            LogEvent::ScanFailed => "scan_failed",
        }
    }

    pub(crate) const fn level(self) -> Level {
        match self {
            LogEvent::DictionaryBuilt
            | LogEvent::RangeUnsatisfiable
            | LogEvent::SegmentOpened
            | LogEvent::SegmentClosed => Level::Debug,
            LogEvent::PartialResultReturned => Level::Info,
            LogEvent::ScanThresholdExceeded | LogEvent::ScanFailed => Level::Warn,
        }
    }
}

/// Component of the crate a record comes from.
#[derive(Clone, Copy, Debug)]
pub(crate) enum LogContext {
    Dictionary,
    Range,
    Scan,
}

impl LogContext {
    pub(crate) const fn component(self) -> &'static str {
        match self {
            LogContext::Dictionary => "component=dict",
            LogContext::Range => "component=range",
            LogContext::Scan => "component=scan",
        }
    }
}

macro_rules! cubescan_log {
    ($ctx:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        let event: crate::logging::LogEvent = $event;
        if log::log_enabled!(target: crate::logging::LOG_TARGET, event.level()) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                event.level(),
                "event={} {} {}",
                event.name(),
                $ctx.component(),
                format_args!($fmt $(, $args)*)
            );
        }
    }};
}

pub(crate) use cubescan_log;
