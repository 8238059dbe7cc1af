//! Conversion of one raw cell reading into a [`SignalSample`].

use crate::core::report::{ConnectionStatus, SignalSample, Technology};
use crate::platform::types::{
    PlatformTier, RawCellReading, RawCellSignal, CONNECTION_NONE, CONNECTION_PRIMARY_SERVING,
    CONNECTION_SECONDARY_SERVING,
};

/// dBm reported when a reading could not be loaded.
pub const SENTINEL_DBM: i32 = -1;
/// Level reported when a reading could not be loaded.
pub const SENTINEL_LEVEL: i32 = 0;

/// Decode a raw connection-status code.
pub fn decode_connection_status(code: i32) -> ConnectionStatus {
    match code {
        CONNECTION_NONE => ConnectionStatus::None,
        CONNECTION_PRIMARY_SERVING => ConnectionStatus::PrimaryServing,
        CONNECTION_SECONDARY_SERVING => ConnectionStatus::SecondaryServing,
        _ => ConnectionStatus::Unknown,
    }
}

/// Normalize a single reading. Never fails; unknown or missing readings come
/// back as `Technology::Unknown` with sentinel values.
///
/// On tiers without a connection-status field any status code carried by the
/// reading is ignored and registration decides serving.
pub fn normalize(reading: Option<&RawCellReading>, tier: PlatformTier) -> SignalSample {
    let Some(reading) = reading else {
        return SignalSample {
            technology: Technology::Unknown,
            dbm: SENTINEL_DBM,
            level: SENTINEL_LEVEL,
            connection_status: ConnectionStatus::Unknown,
            data_loaded: false,
            registered: false,
            primary: false,
        };
    };

    let (technology, strength) = match reading.signal {
        RawCellSignal::Gsm(s) => (Technology::Gsm, Some(s)),
        RawCellSignal::Cdma(s) => (Technology::Cdma, Some(s)),
        RawCellSignal::Lte(s) => (Technology::Lte, Some(s)),
        RawCellSignal::Wcdma(s) => (Technology::Wcdma, Some(s)),
        RawCellSignal::Nr(s) => (Technology::Nr, Some(s)),
        RawCellSignal::Tdscdma(s) => (Technology::Tdscdma, Some(s)),
        RawCellSignal::Unrecognized => (Technology::Unknown, None),
    };

    let registered = reading.registered;
    let status_code = reading
        .connection_status
        .filter(|_| tier.has_connection_status());
    let (connection_status, primary) = match status_code {
        Some(code) => {
            let status = decode_connection_status(code);
            (status, registered && status.is_serving())
        }
        // No status available: registration stands in for serving.
        None if registered => (ConnectionStatus::PrimaryServing, true),
        None => (ConnectionStatus::None, false),
    };

    let sample = SignalSample {
        technology,
        dbm: strength.map_or(SENTINEL_DBM, |s| s.dbm),
        level: strength.map_or(SENTINEL_LEVEL, |s| s.level),
        connection_status,
        data_loaded: strength.is_some(),
        registered,
        primary,
    };

    tracing::trace!(
        technology = ?sample.technology,
        dbm = sample.dbm,
        level = sample.level,
        primary = sample.primary,
        "normalized cell reading"
    );

    sample
}
