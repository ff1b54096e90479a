pub mod decoder;
pub mod framer;
pub mod parser;

use core::{fmt, fmt::Display};

pub use framer::RawResponse;

/// Typed result of one operation
#[derive(PartialEq, Debug, Clone)]
pub enum Response {
    /// Operation succeeded and the mount sent nothing back
    Done,
    Status(Status),
    StatusMessage(Status, String),
    Integer(i32),
    Decimal(f64),
    Angle(Sexagesimal),
    Time(Sexagesimal),
    Date(CalendarDate),
    Text(String),
}

impl Response {
    pub fn status(&self) -> Option<Status> {
        match self {
            Response::Status(s) | Response::StatusMessage(s, _) => Some(*s),
            _ => None,
        }
    }

    pub fn sexagesimal(&self) -> Option<Sexagesimal> {
        match self {
            Response::Angle(s) | Response::Time(s) => Some(*s),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Response::Text(t) | Response::StatusMessage(_, t) => Some(t),
            _ => None,
        }
    }
}

/// Meaning of a status character, as assigned by the operation's status table
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Status {
    Accepted,
    Rejected,
    NoFault,
    Fault,
    SlewPossible,
    BelowHorizon,
    AboveHigherLimit,
    AltAzMode,
    LandMode,
    PolarMode,
    HomeSearchFailed,
    HomeFound,
    HomeSearchInProgress,
    TwelveHour,
    TwentyFourHour,
    HighPrecision,
    LowPrecision,
    Quality(FindQuality),
}

impl Status {
    pub fn is_success(self) -> bool {
        use Status::*;
        !matches!(
            self,
            Rejected | Fault | BelowHorizon | AboveHigherLimit | HomeSearchFailed
        )
    }
}

/// Minimum object quality used by FIND/BROWSE
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum FindQuality {
    Super,
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

/// Part of a sexagesimal value below the minute
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SubMinute {
    None,
    /// Low precision time, `HH:MM.T`
    Tenths(u8),
    Seconds(u8),
}

/// Degrees or hours, minutes and an optional seconds/tenths part.
///
/// Which sub-minute field is present depends on the mount's precision setting at the time
/// the value was produced.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Sexagesimal {
    pub negative: bool,
    pub whole: u16,
    pub minutes: u8,
    pub fraction: SubMinute,
}

impl Sexagesimal {
    pub fn new(negative: bool, whole: u16, minutes: u8, fraction: SubMinute) -> Self {
        Sexagesimal {
            negative,
            whole,
            minutes,
            fraction,
        }
    }

    pub fn hms(hours: u16, minutes: u8, seconds: u8) -> Self {
        Self::new(false, hours, minutes, SubMinute::Seconds(seconds))
    }

    pub fn dms(negative: bool, degrees: u16, minutes: u8, seconds: u8) -> Self {
        Self::new(negative, degrees, minutes, SubMinute::Seconds(seconds))
    }

    pub fn seconds(&self) -> Option<u8> {
        match self.fraction {
            SubMinute::Seconds(s) => Some(s),
            _ => None,
        }
    }

    /// Value as a decimal number of degrees or hours
    pub fn to_decimal(&self) -> f64 {
        let minutes = self.minutes as f64
            + match self.fraction {
                SubMinute::None => 0.0,
                SubMinute::Tenths(t) => t as f64 / 10.0,
                SubMinute::Seconds(s) => s as f64 / 60.0,
            };
        let v = self.whole as f64 + minutes / 60.0;
        if self.negative {
            -v
        } else {
            v
        }
    }
}

impl Display for Sexagesimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_fmt(format_args!("{:02}:{:02}", self.whole, self.minutes))?;
        match self.fraction {
            SubMinute::None => Ok(()),
            SubMinute::Tenths(t) => f.write_fmt(format_args!(".{}", t)),
            SubMinute::Seconds(s) => f.write_fmt(format_args!(":{:02}", s)),
        }
    }
}

/// Handbox calendar date, the year is sent as two digits
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct CalendarDate {
    pub month: u8,
    pub day: u8,
    pub year: u8,
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{:02}/{:02}/{:02}",
            self.month, self.day, self.year
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sexagesimal_to_decimal() {
        assert_eq!(Sexagesimal::hms(6, 30, 0).to_decimal(), 6.5);
        let low_precision = Sexagesimal::new(false, 12, 15, SubMinute::Tenths(6));
        assert!((low_precision.to_decimal() - 12.26).abs() < 1e-9);
        assert_eq!(Sexagesimal::dms(true, 10, 30, 0).to_decimal(), -10.5);
    }

    #[test]
    fn sexagesimal_display() {
        assert_eq!(Sexagesimal::hms(5, 7, 9).to_string(), "05:07:09");
        assert_eq!(
            Sexagesimal::new(true, 45, 3, SubMinute::None).to_string(),
            "-45:03"
        );
        assert_eq!(
            Sexagesimal::new(false, 12, 15, SubMinute::Tenths(6)).to_string(),
            "12:15.6"
        );
    }

    #[test]
    fn status_success() {
        assert!(Status::Accepted.is_success());
        assert!(Status::AltAzMode.is_success());
        assert!(!Status::BelowHorizon.is_success());
        assert!(!Status::Rejected.is_success());
    }
}
