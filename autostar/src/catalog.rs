//! Lookup of operation descriptors by name, plus the standard LX200/Autostar command set.

use core::time::Duration;
use lazy_static::lazy_static;
use std::{collections::HashMap, sync::Arc};

use crate::{
    descriptor::{
        FormatPattern, Limit, OperationDescriptor, ParamEncoding, ParamSlot, Range, ResponseKind,
        StatusTable, ValueKind, Wire, ACK,
    },
    error::{Error, Result},
    response::{FindQuality, Status},
};

/// Read-only set of operations a session can dispatch
#[derive(Debug, Clone)]
pub struct Catalog {
    ops: Vec<OperationDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl Catalog {
    /// Builds a catalog, refusing descriptors the framer or decoder could not honour
    pub fn new(descriptors: impl IntoIterator<Item = OperationDescriptor>) -> Result<Self> {
        let mut catalog = Catalog {
            ops: Vec::new(),
            index: HashMap::new(),
        };
        for desc in descriptors {
            validate(&desc)?;
            if catalog.index.insert(desc.name, catalog.ops.len()).is_some() {
                return Err(invalid(&desc, "duplicate name"));
            }
            catalog.ops.push(desc);
        }
        Ok(catalog)
    }

    /// Shared instance of the standard command set
    pub fn standard() -> Arc<Catalog> {
        lazy_static! {
            static ref STANDARD: Arc<Catalog> = Arc::new(
                Catalog::new(OPERATIONS.iter().copied())
                    .expect("Standard catalog is inconsistent")
            );
        }
        STANDARD.clone()
    }

    pub fn get(&self, name: &str) -> Option<&OperationDescriptor> {
        self.index.get(name).map(|&i| &self.ops[i])
    }

    /// Descriptors in the order they were registered
    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

fn validate(desc: &OperationDescriptor) -> Result<()> {
    match desc.wire {
        Wire::Command("") => return Err(invalid(desc, "empty mnemonic")),
        Wire::Control(_) if !desc.params.is_empty() => {
            return Err(invalid(desc, "control bytes take no arguments"))
        }
        Wire::Command(_) if desc.response == ResponseKind::SingleByte => {
            return Err(invalid(desc, "single byte replies only follow control bytes"))
        }
        _ => {}
    }
    match (desc.response, desc.value) {
        (ResponseKind::None, ValueKind::None) => Ok(()),
        (ResponseKind::None, _) => Err(invalid(desc, "value needs a reply to decode")),
        (_, ValueKind::None) => Err(invalid(desc, "reply is never interpreted")),
        (ResponseKind::SingleByte | ResponseKind::SingleDigit, ValueKind::Status(_)) => Ok(()),
        (ResponseKind::SingleByte | ResponseKind::SingleDigit, _) => {
            Err(invalid(desc, "single character replies carry a status"))
        }
        (ResponseKind::DigitOrMessage { frames: 0, .. }, _) => {
            Err(invalid(desc, "message spans no frame"))
        }
        (ResponseKind::DigitOrMessage { .. }, ValueKind::StatusWithMessage(_)) => Ok(()),
        (ResponseKind::DigitOrMessage { .. }, _) => {
            Err(invalid(desc, "status digit replies carry a status and message"))
        }
        (ResponseKind::FixedFormat(FormatPattern(&[])), _) => {
            Err(invalid(desc, "fixed format without templates"))
        }
        _ => Ok(()),
    }
}

fn invalid(desc: &OperationDescriptor, reason: &'static str) -> Error {
    Error::InvalidCatalog {
        operation: desc.name,
        reason,
    }
}

const ACCEPT: StatusTable = &[("1", Status::Accepted), ("0", Status::Rejected)];
/// `:Sa` and `:Sb` answer the other way around
const INVERTED: StatusTable = &[("0", Status::Accepted), ("1", Status::Rejected)];
const ALIGNMENT: StatusTable = &[
    ("A", Status::AltAzMode),
    ("L", Status::LandMode),
    ("P", Status::PolarMode),
];
const FAULT: StatusTable = &[("0", Status::NoFault), ("1", Status::Fault)];
const HOME: StatusTable = &[
    ("0", Status::HomeSearchFailed),
    ("1", Status::HomeFound),
    ("2", Status::HomeSearchInProgress),
];
const SLEW: StatusTable = &[
    ("0", Status::SlewPossible),
    ("1", Status::BelowHorizon),
    ("2", Status::AboveHigherLimit),
];
const CALENDAR: StatusTable = &[("12", Status::TwelveHour), ("24", Status::TwentyFourHour)];
const PRECISION: StatusTable = &[
    ("HIGH PRECISION", Status::HighPrecision),
    ("LOW PRECISION", Status::LowPrecision),
];
const QUALITY: StatusTable = &[
    ("SU", Status::Quality(FindQuality::Super)),
    ("EX", Status::Quality(FindQuality::Excellent)),
    ("VG", Status::Quality(FindQuality::VeryGood)),
    ("GD", Status::Quality(FindQuality::Good)),
    ("FR", Status::Quality(FindQuality::Fair)),
    ("PR", Status::Quality(FindQuality::Poor)),
    ("VP", Status::Quality(FindQuality::VeryPoor)),
];

const STEPS: &[ParamSlot] = &[ParamSlot::new("steps", ParamEncoding::unsigned(2, 99))];
const FLASH_RATE: &[ParamSlot] = &[ParamSlot::new("rate", ParamEncoding::digit(0, 9))];
const DUTY_CYCLE: &[ParamSlot] = &[ParamSlot::new(
    "duty",
    ParamEncoding::Integer {
        width: None,
        signed: false,
        range: Range::inclusive(0.0, 15.0),
        unit: None,
    },
)];
const FOCUS_SPEED: &[ParamSlot] = &[ParamSlot::new("speed", ParamEncoding::digit(1, 4))];
const OBJECT_NUMBER: &[ParamSlot] = &[ParamSlot::new("number", ParamEncoding::unsigned(4, 9999))];
const LIBRARY: &[ParamSlot] = &[ParamSlot::new("library", ParamEncoding::digit(0, 5))];
const SLEW_RATE: &[ParamSlot] = &[ParamSlot::new(
    "rate",
    ParamEncoding::decimal(4, 1, Range::positive(99.9)),
)];
const GUIDE_RATE: &[ParamSlot] = &[ParamSlot::new(
    "rate",
    ParamEncoding::decimal(
        4,
        1,
        Range {
            min: Limit::Inclusive(0.0),
            max: Limit::Exclusive(15.0),
        },
    ),
)];
const ALTITUDE: &[ParamSlot] = &[ParamSlot::new(
    "altitude",
    ParamEncoding::Angle {
        degree_digits: 2,
        signed: true,
        allow_seconds: true,
        max_degrees: 90,
    },
)];
const MAGNITUDE: &[ParamSlot] = &[ParamSlot::new(
    "magnitude",
    ParamEncoding::signed_decimal(4, 1, Range::inclusive(-99.9, 99.9)),
)];
const BAUD_CODE: &[ParamSlot] = &[ParamSlot::new("baud", ParamEncoding::digit(1, 9))];
const DATE: &[ParamSlot] = &[ParamSlot::new("date", ParamEncoding::Date)];
const DECLINATION: &[ParamSlot] = &[ParamSlot::new(
    "declination",
    ParamEncoding::Angle {
        degree_digits: 2,
        signed: true,
        allow_seconds: true,
        max_degrees: 90,
    },
)];
const LATITUDE: &[ParamSlot] = &[ParamSlot::new(
    "latitude",
    ParamEncoding::Angle {
        degree_digits: 2,
        signed: true,
        allow_seconds: false,
        max_degrees: 90,
    },
)];
const SELENOGRAPHIC_LONGITUDE: &[ParamSlot] = &[ParamSlot::new(
    "longitude",
    ParamEncoding::Angle {
        degree_digits: 3,
        signed: true,
        allow_seconds: false,
        max_degrees: 180,
    },
)];
const LONGITUDE: &[ParamSlot] = &[ParamSlot::new(
    "longitude",
    ParamEncoding::Angle {
        degree_digits: 3,
        signed: false,
        allow_seconds: false,
        max_degrees: 360,
    },
)];
const AZIMUTH: &[ParamSlot] = &[ParamSlot::new(
    "azimuth",
    ParamEncoding::Angle {
        degree_digits: 3,
        signed: false,
        allow_seconds: false,
        max_degrees: 360,
    },
)];
const ARC_MINUTES: &[ParamSlot] = &[ParamSlot::new("arcminutes", ParamEncoding::unsigned(3, 999))];
const UTC_OFFSET: &[ParamSlot] = &[ParamSlot::new(
    "hours",
    ParamEncoding::signed_decimal(4, 1, Range::inclusive(-24.0, 24.0)),
)];
const MIN_ELEVATION: &[ParamSlot] = &[ParamSlot::new("degrees", ParamEncoding::unsigned(2, 90))];
const MAX_ELEVATION: &[ParamSlot] = &[ParamSlot::new(
    "degrees",
    ParamEncoding::Integer {
        width: Some(2),
        signed: false,
        range: Range::inclusive(0.0, 90.0),
        unit: Some('*'),
    },
)];
const TIME_OF_DAY: &[ParamSlot] = &[ParamSlot::new(
    "time",
    ParamEncoding::Time {
        allow_tenths: false,
    },
)];
const RIGHT_ASCENSION: &[ParamSlot] = &[ParamSlot::new(
    "ra",
    ParamEncoding::Time { allow_tenths: true },
)];
const SITE_NAME: &[ParamSlot] = &[ParamSlot::new(
    "name",
    ParamEncoding::Text {
        max_len: 15,
        padded: false,
    },
)];
const TRACKING_RATE: &[ParamSlot] = &[ParamSlot::new(
    "hertz",
    ParamEncoding::decimal(5, 1, Range::positive(999.9)),
)];
const MANUAL_RATE: &[ParamSlot] = &[ParamSlot::new(
    "hertz",
    ParamEncoding::decimal(7, 3, Range::positive(999.999)),
)];
const MAX_SLEW_RATE: &[ParamSlot] = &[ParamSlot::new("degrees", ParamEncoding::digit(2, 8))];
const OBJECT_CLASSES: &[ParamSlot] = &[ParamSlot::new("classes", ParamEncoding::ObjectClasses)];
const SITE: &[ParamSlot] = &[ParamSlot::new("site", ParamEncoding::digit(0, 3))];

const DEC: &[&str] = &["sDD*MM", "sDD*MM'SS"];
const RA: &[&str] = &["HH:MM.T", "HH:MM:SS"];
const CLOCK: &[&str] = &["HH:MM:SS"];

/// GPS time updates and automatic alignment run for minutes before answering
const LONG_PROCEDURE: Duration = Duration::from_secs(600);

const fn op(name: &'static str, mnemonic: &'static str) -> OperationDescriptor {
    OperationDescriptor::command(name, mnemonic)
}

const fn text(name: &'static str, mnemonic: &'static str) -> OperationDescriptor {
    op(name, mnemonic).replies(ResponseKind::Delimited, ValueKind::Text)
}

const fn fixed(
    name: &'static str,
    mnemonic: &'static str,
    templates: &'static [&'static str],
    value: ValueKind,
) -> OperationDescriptor {
    op(name, mnemonic).replies(ResponseKind::FixedFormat(FormatPattern(templates)), value)
}

const fn status(
    name: &'static str,
    mnemonic: &'static str,
    table: StatusTable,
) -> OperationDescriptor {
    op(name, mnemonic).replies(ResponseKind::SingleDigit, ValueKind::Status(table))
}

/// `S` family setter answering `1` when valid and `0` otherwise
const fn set(
    name: &'static str,
    mnemonic: &'static str,
    params: &'static [ParamSlot],
) -> OperationDescriptor {
    status(name, mnemonic, ACCEPT).params(params)
}

static OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::control("alignment_query", ACK)
        .replies(ResponseKind::SingleByte, ValueKind::Status(ALIGNMENT)),
    // A
    status("align_auto", "Aa", FAULT)
        .patient(LONG_PROCEDURE)
        .no_retry(),
    op("align_land", "AL"),
    op("align_polar", "AP"),
    op("align_altaz", "AA"),
    // $B
    op("set_antibacklash_alt", "$BA").params(STEPS),
    op("set_antibacklash_az", "$BZ").params(STEPS),
    // B
    op("reticule_brighter", "B+"),
    op("reticule_dimmer", "B-"),
    op("set_reticule_flash_rate", "B").params(FLASH_RATE),
    op("set_reticule_duty_cycle", "BD").params(DUTY_CYCLE),
    // C
    op("sync_selenographic", "CL"),
    text("sync_object", "CM"),
    // D
    text("get_distance_bars", "D"),
    // f
    op("fan_on", "f+"),
    op("fan_off", "f-"),
    fixed("get_tube_temperature", "fT", &["sdd.ddd"], ValueKind::Decimal),
    // F
    op("focus_in", "F+"),
    op("focus_out", "F-"),
    op("focus_stop", "FQ"),
    op("focus_fast", "FF"),
    op("focus_slow", "FS"),
    op("set_focus_speed", "F").params(FOCUS_SPEED),
    // g
    op("gps_on", "g+"),
    op("gps_off", "g-"),
    text("gps_stream", "gps"),
    status("gps_update_time", "gT", ACCEPT)
        .patient(LONG_PROCEDURE)
        .no_retry(),
    // G
    text("get_alignment_menu_0", "G0"),
    text("get_alignment_menu_1", "G1"),
    text("get_alignment_menu_2", "G2"),
    fixed("get_altitude", "GA", DEC, ValueKind::Angle),
    fixed("get_local_time_12", "Ga", CLOCK, ValueKind::Time),
    fixed("get_brighter_limit", "Gb", &["sMM.M"], ValueKind::Decimal),
    fixed("get_date", "GC", &["MM/DD/YY"], ValueKind::Date),
    op("get_calendar_format", "Gc").replies(ResponseKind::Delimited, ValueKind::Status(CALENDAR)),
    fixed("get_declination", "GD", DEC, ValueKind::Angle),
    fixed("get_target_declination", "Gd", DEC, ValueKind::Angle),
    fixed("get_find_field_diameter", "GF", &["NNN"], ValueKind::Integer),
    fixed("get_faint_limit", "Gf", &["sMM.M"], ValueKind::Decimal),
    fixed("get_utc_offset", "GG", &["sHH", "sHH.H"], ValueKind::Decimal),
    fixed("get_site_longitude", "Gg", &["sDDD*MM", "DDD*MM"], ValueKind::Angle),
    fixed("get_high_limit", "Gh", &["sDD*"], ValueKind::Integer),
    fixed("get_local_time", "GL", CLOCK, ValueKind::Time),
    fixed("get_larger_size_limit", "Gl", &["NNN'"], ValueKind::Integer),
    text("get_site_name_1", "GM"),
    text("get_site_name_2", "GN"),
    text("get_site_name_3", "GO"),
    text("get_site_name_4", "GP"),
    fixed("get_lower_limit", "Go", &["DD*"], ValueKind::Integer),
    op("get_find_quality", "Gq").replies(ResponseKind::Delimited, ValueKind::Status(QUALITY)),
    fixed("get_ra", "GR", RA, ValueKind::Time),
    fixed("get_target_ra", "Gr", RA, ValueKind::Time),
    fixed("get_sidereal_time", "GS", CLOCK, ValueKind::Time),
    fixed("get_smaller_size_limit", "Gs", &["NNN'"], ValueKind::Integer),
    fixed("get_tracking_rate", "GT", &["TT.T", "TTT.T"], ValueKind::Decimal),
    fixed("get_site_latitude", "Gt", &["sDD*MM"], ValueKind::Angle),
    fixed("get_firmware_date", "GVD", &["mmm dd yyyy"], ValueKind::Text),
    text("get_firmware_number", "GVN"),
    text("get_product_name", "GVP"),
    fixed("get_firmware_time", "GVT", CLOCK, ValueKind::Time),
    fixed("get_object_classes", "Gy", &["mmmmm"], ValueKind::Text),
    fixed("get_azimuth", "GZ", &["DDD*MM", "DDD*MM'SS"], ValueKind::Angle),
    // h
    op("home_seek_store", "hS"),
    op("home_seek_align", "hF"),
    op("sleep", "hN"),
    op("park", "hP"),
    op("wake", "hW"),
    status("home_status", "h?", HOME),
    // H, I
    op("toggle_time_format", "H"),
    op("reinitialize", "I"),
    // L
    op("library_previous", "LB"),
    op("select_deep_sky_object", "LC").params(OBJECT_NUMBER),
    op("library_find", "LF"),
    text("identify_field", "Lf"),
    text("get_object_info", "LI"),
    op("select_messier_object", "LM").params(OBJECT_NUMBER),
    op("library_next", "LN"),
    status("select_deep_sky_library", "Lo", ACCEPT).params(LIBRARY),
    status("select_star_catalog", "Ls", ACCEPT).params(LIBRARY),
    // M
    status("slew_to_target_altaz", "MA", FAULT),
    op("move_east", "Me"),
    op("move_north", "Mn"),
    op("move_south", "Ms"),
    op("move_west", "Mw"),
    op("slew_to_target", "MS")
        .replies(
            ResponseKind::DigitOrMessage {
                bare: b'0',
                frames: 1,
            },
            ValueKind::StatusWithMessage(SLEW),
        )
        .no_retry(),
    // P
    op("toggle_high_precision", "P").replies(ResponseKind::Delimited, ValueKind::Status(PRECISION)),
    // $Q
    op("toggle_pec", "$Q"),
    op("enable_pec_alt", "$QA+"),
    op("disable_pec_alt", "$QA-"),
    op("enable_pec_az", "$QZ+"),
    op("disable_pec_az", "$QZ-"),
    // Q
    op("halt", "Q"),
    op("halt_east", "Qe"),
    op("halt_north", "Qn"),
    op("halt_south", "Qs"),
    op("halt_west", "Qw"),
    // r
    op("derotator_on", "r+"),
    op("derotator_off", "r-"),
    // R
    op("slew_rate_centering", "RC"),
    op("slew_rate_guiding", "RG"),
    op("slew_rate_find", "RM"),
    op("slew_rate_max", "RS"),
    op("set_slew_rate_ra", "RA").params(SLEW_RATE),
    op("set_slew_rate_dec", "RE").params(SLEW_RATE),
    op("set_guide_rate", "Rg").params(GUIDE_RATE),
    // S
    status("set_target_altitude", "Sa", INVERTED).params(ALTITUDE),
    status("set_brighter_limit", "Sb", INVERTED).params(MAGNITUDE),
    set("set_baud_rate", "SB", BAUD_CODE),
    op("set_date", "SC").params(DATE).replies(
        ResponseKind::DigitOrMessage {
            bare: b'0',
            frames: 2,
        },
        ValueKind::StatusWithMessage(ACCEPT),
    ),
    set("set_target_declination", "Sd", DECLINATION),
    set("set_selenographic_latitude", "SE", LATITUDE),
    set("set_selenographic_longitude", "Se", SELENOGRAPHIC_LONGITUDE),
    set("set_faint_limit", "Sf", MAGNITUDE),
    set("set_field_diameter", "SF", ARC_MINUTES),
    set("set_site_longitude", "Sg", LONGITUDE),
    set("set_utc_offset", "SG", UTC_OFFSET),
    set("set_min_elevation", "Sh", MIN_ELEVATION),
    set("set_smaller_size_limit", "Sl", ARC_MINUTES),
    set("set_local_time", "SL", TIME_OF_DAY),
    set("set_site_name_1", "SM", SITE_NAME),
    set("set_site_name_2", "SN", SITE_NAME),
    set("set_site_name_3", "SO", SITE_NAME),
    set("set_site_name_4", "SP", SITE_NAME),
    set("set_max_elevation", "So", MAX_ELEVATION),
    op("step_find_quality", "Sq"),
    set("set_target_ra", "Sr", RIGHT_ASCENSION),
    set("set_larger_size_limit", "Ss", ARC_MINUTES),
    set("set_sidereal_time", "SS", TIME_OF_DAY),
    set("set_site_latitude", "St", LATITUDE),
    set("set_tracking_rate", "ST", TRACKING_RATE),
    set("set_max_slew_rate", "Sw", MAX_SLEW_RATE),
    set("set_object_classes", "Sy", OBJECT_CLASSES),
    set("set_target_azimuth", "Sz", AZIMUTH),
    // T
    op("tracking_rate_increment", "T+"),
    op("tracking_rate_decrement", "T-"),
    op("tracking_lunar", "TL"),
    op("tracking_custom", "TM"),
    op("tracking_default", "TQ"),
    set("set_manual_tracking_rate", "T", MANUAL_RATE),
    // U, W
    op("toggle_precision", "U"),
    op("select_site", "W").params(SITE),
    // ?
    text("help_first", "??"),
    text("help_next", "?+"),
    text("help_previous", "?-"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;

    #[test]
    fn standard_catalog_is_consistent() {
        let catalog = assert_ok!(Catalog::new(OPERATIONS.iter().copied()));
        assert_eq!(catalog.len(), OPERATIONS.len());
        assert!(catalog.get("get_ra").is_some());
        assert!(catalog.get("warp_drive").is_none());
    }

    #[test]
    fn mnemonics_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for desc in Catalog::standard().iter() {
            assert!(seen.insert(desc.wire), "{:?} appears twice", desc.wire);
        }
    }

    #[test]
    fn only_the_legacy_query_is_a_control_byte() {
        let control: Vec<_> = Catalog::standard()
            .iter()
            .filter(|d| matches!(d.wire, Wire::Control(_)))
            .map(|d| d.name)
            .collect();
        assert_eq!(control, ["alignment_query"]);
    }

    #[test]
    fn duplicates_are_rejected() {
        let halt = op("halt", "Q");
        assert_matches!(
            Catalog::new([halt, halt]),
            Err(Error::InvalidCatalog {
                operation: "halt",
                reason: "duplicate name"
            })
        );
    }

    #[test]
    fn inconsistent_descriptors_are_rejected() {
        assert_err!(Catalog::new([
            op("get_ra", "GR").replies(ResponseKind::SingleByte, ValueKind::Status(ALIGNMENT))
        ]));
        assert_err!(Catalog::new([op("get_ra", "GR").replies(ResponseKind::None, ValueKind::Time)]));
        assert_err!(Catalog::new([op("get_ra", "GR").replies(
            ResponseKind::FixedFormat(FormatPattern(&[])),
            ValueKind::Time
        )]));
        assert_err!(Catalog::new([
            op("get_ra", "GR").replies(ResponseKind::SingleDigit, ValueKind::Time)
        ]));
        assert_err!(Catalog::new([
            op("slew", "MS").replies(
                ResponseKind::DigitOrMessage {
                    bare: b'0',
                    frames: 1
                },
                ValueKind::Text
            )
        ]));
        assert_err!(Catalog::new([op("slew", "MS").replies(
            ResponseKind::DigitOrMessage {
                bare: b'0',
                frames: 0
            },
            ValueKind::StatusWithMessage(SLEW)
        )]));
        assert_err!(Catalog::new([OperationDescriptor::control("ack", ACK).params(SITE)]));
        assert_err!(Catalog::new([op("nothing", "")]));
    }
}
