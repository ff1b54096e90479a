use crate::{
    command::Arg,
    error::{Error, Result},
    flags::BaudRate,
    io_adapter::Transport,
    response::{CalendarDate, Response, Sexagesimal, Status},
    session::Session,
};

/// Firmware identification reported by `:GV*#`
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FirmwareInfo {
    pub product: String,
    pub number: String,
    pub date: String,
    pub time: Sexagesimal,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SlewRate {
    Guiding,
    Centering,
    Find,
    Max,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TrackingRate {
    Default,
    Lunar,
    Custom,
}

/// Typed access to the common operations of a mount
pub struct Telescope<IO: Transport> {
    session: Session<IO>,
}

impl<IO: Transport> Telescope<IO> {
    pub fn new(io: IO) -> Self {
        Self::from_session(Session::new(io))
    }

    pub fn from_session(session: Session<IO>) -> Self {
        Telescope { session }
    }

    pub fn session(&self) -> &Session<IO> {
        &self.session
    }

    pub fn close(self) -> IO {
        self.session.close()
    }

    fn run(&self, name: &'static str, args: &[Arg]) -> Result<Response> {
        self.session.invoke(name, args)
    }

    /// Runs a setter and turns a rejection status into an error
    fn set(&self, name: &'static str, arg: Arg) -> Result<()> {
        match self.run(name, &[arg])? {
            Response::Status(s) if s.is_success() => Ok(()),
            Response::Status(_) => Err(Error::Rejected(name)),
            Response::Done => Ok(()),
            _ => Err(Error::UnexpectedResponse(name)),
        }
    }

    fn sexagesimal(&self, name: &'static str) -> Result<Sexagesimal> {
        self.run(name, &[])?
            .sexagesimal()
            .ok_or(Error::UnexpectedResponse(name))
    }

    fn text(&self, name: &'static str) -> Result<String> {
        match self.run(name, &[])? {
            Response::Text(t) => Ok(t),
            _ => Err(Error::UnexpectedResponse(name)),
        }
    }

    fn done(&self, name: &'static str) -> Result<()> {
        self.run(name, &[]).map(|_| ())
    }

    pub fn alignment_mode(&self) -> Result<Status> {
        self.run("alignment_query", &[])?
            .status()
            .ok_or(Error::UnexpectedResponse("alignment_query"))
    }

    pub fn ra(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_ra")
    }

    pub fn declination(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_declination")
    }

    pub fn altitude(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_altitude")
    }

    pub fn azimuth(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_azimuth")
    }

    pub fn target_ra(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_target_ra")
    }

    pub fn target_declination(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_target_declination")
    }

    pub fn set_target_ra(&self, ra: Sexagesimal) -> Result<()> {
        self.set("set_target_ra", ra.into())
    }

    pub fn set_target_declination(&self, dec: Sexagesimal) -> Result<()> {
        self.set("set_target_declination", dec.into())
    }

    pub fn site_latitude(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_site_latitude")
    }

    pub fn site_longitude(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_site_longitude")
    }

    pub fn set_site_latitude(&self, latitude: Sexagesimal) -> Result<()> {
        self.set("set_site_latitude", latitude.into())
    }

    pub fn set_site_longitude(&self, longitude: Sexagesimal) -> Result<()> {
        self.set("set_site_longitude", longitude.into())
    }

    pub fn local_time(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_local_time")
    }

    pub fn sidereal_time(&self) -> Result<Sexagesimal> {
        self.sexagesimal("get_sidereal_time")
    }

    pub fn set_local_time(&self, time: Sexagesimal) -> Result<()> {
        self.set("set_local_time", time.into())
    }

    pub fn date(&self) -> Result<CalendarDate> {
        match self.run("get_date", &[])? {
            Response::Date(d) => Ok(d),
            _ => Err(Error::UnexpectedResponse("get_date")),
        }
    }

    /// Changes the handbox date, the mount then recomputes planetary data
    pub fn set_date(&self, date: CalendarDate) -> Result<()> {
        match self.run("set_date", &[date.into()])? {
            Response::StatusMessage(s, _) if s.is_success() => Ok(()),
            Response::StatusMessage(..) => Err(Error::Rejected("set_date")),
            _ => Err(Error::UnexpectedResponse("set_date")),
        }
    }

    pub fn firmware(&self) -> Result<FirmwareInfo> {
        Ok(FirmwareInfo {
            product: self.text("get_product_name")?,
            number: self.text("get_firmware_number")?,
            date: self.text("get_firmware_date")?,
            time: self.sexagesimal("get_firmware_time")?,
        })
    }

    /// Slews to the current target, the mount's message is returned when it refuses
    pub fn slew_to_target(&self) -> Result<()> {
        match self.run("slew_to_target", &[])? {
            Response::StatusMessage(s, _) if s.is_success() => Ok(()),
            Response::StatusMessage(_, msg) => Err(Error::SlewRefused(msg)),
            _ => Err(Error::UnexpectedResponse("slew_to_target")),
        }
    }

    /// Sets the target then slews to it
    pub fn goto(&self, ra: Sexagesimal, dec: Sexagesimal) -> Result<()> {
        self.set_target_ra(ra)?;
        self.set_target_declination(dec)?;
        self.slew_to_target()
    }

    pub fn halt(&self) -> Result<()> {
        self.done("halt")
    }

    /// Moves at the current slew rate until halted
    pub fn move_towards(&self, direction: Direction) -> Result<()> {
        self.done(match direction {
            Direction::North => "move_north",
            Direction::South => "move_south",
            Direction::East => "move_east",
            Direction::West => "move_west",
        })
    }

    pub fn halt_towards(&self, direction: Direction) -> Result<()> {
        self.done(match direction {
            Direction::North => "halt_north",
            Direction::South => "halt_south",
            Direction::East => "halt_east",
            Direction::West => "halt_west",
        })
    }

    pub fn set_slew_rate(&self, rate: SlewRate) -> Result<()> {
        self.done(match rate {
            SlewRate::Guiding => "slew_rate_guiding",
            SlewRate::Centering => "slew_rate_centering",
            SlewRate::Find => "slew_rate_find",
            SlewRate::Max => "slew_rate_max",
        })
    }

    pub fn set_tracking_rate(&self, rate: TrackingRate) -> Result<()> {
        self.done(match rate {
            TrackingRate::Default => "tracking_default",
            TrackingRate::Lunar => "tracking_lunar",
            TrackingRate::Custom => "tracking_custom",
        })
    }

    pub fn tracking_rate(&self) -> Result<f64> {
        match self.run("get_tracking_rate", &[])? {
            Response::Decimal(hz) => Ok(hz),
            _ => Err(Error::UnexpectedResponse("get_tracking_rate")),
        }
    }

    pub fn focus_in(&self) -> Result<()> {
        self.done("focus_in")
    }

    pub fn focus_out(&self) -> Result<()> {
        self.done("focus_out")
    }

    pub fn focus_stop(&self) -> Result<()> {
        self.done("focus_stop")
    }

    /// Focuser speed, 1 (slowest) to 4
    pub fn set_focus_speed(&self, speed: u8) -> Result<()> {
        self.set("set_focus_speed", speed.into())
    }

    pub fn set_reticule_flash_rate(&self, rate: u8) -> Result<()> {
        self.set("set_reticule_flash_rate", rate.into())
    }

    pub fn select_site(&self, site: u8) -> Result<()> {
        self.set("select_site", site.into())
    }

    /// Switches the mount to another speed. The reply still arrives at the current speed,
    /// the transport has to be reopened afterwards.
    pub fn set_baud_rate(&self, baud: BaudRate) -> Result<()> {
        self.set("set_baud_rate", baud.to_code().into())
    }
}
