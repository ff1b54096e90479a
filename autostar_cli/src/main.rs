mod cli;
mod output;
mod serial;

use clap::Parser;
use simple_eyre::{eyre::eyre, Result};
use std::io::Write;
use termcolor::{Color, ColorSpec, WriteColor};

use autostar::{
    descriptor::{ParamEncoding, ParamSlot},
    Arg, CalendarDate, Catalog, Sexagesimal,
};
use cli::*;
use output::*;
use serial::SerialArgs;

fn main() -> Result<()> {
    simple_eyre::install()?;
    let cli = Cli::parse();
    env_logger::init();

    match &cli.command {
        Commands::List => list_serial(),
        Commands::Operations => list_operations(),
        Commands::Invoke(conf) => invoke(conf),
        Commands::Position(conf) => position(conf),
        Commands::Info(conf) => info(conf),
        Commands::Goto(conf) => goto(conf),
        Commands::Halt(conf) => halt(conf),
        Commands::Site(conf) => select_site(conf),
    }
}

fn list_serial() -> Result<()> {
    let mut stdout = get_stdout();
    let paths = serialport::available_ports()?;
    if paths.is_empty() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(&mut stdout, "No connected serial ports found.")?;
    } else {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(&mut stdout, "Connected serial ports:")?;
    }
    stdout.reset()?;
    paths.iter().for_each(|p| println!("{}", p.port_name));

    Ok(())
}

fn list_operations() -> Result<()> {
    let catalog = Catalog::standard();
    for desc in catalog.iter() {
        println!("{}", format_operation(desc));
    }
    Ok(())
}

fn parse_arg(slot: &ParamSlot, s: &str) -> Result<Arg> {
    let bad = |e: &dyn std::fmt::Display| {
        eyre!(
            "Argument {} expects {}: {}",
            slot.name,
            param_hint(&slot.encoding),
            e
        )
    };
    let arg = match slot.encoding {
        ParamEncoding::Digit { .. } | ParamEncoding::Integer { .. } => {
            Arg::Int(s.parse::<i64>().map_err(|e| bad(&e))?)
        }
        ParamEncoding::Decimal { .. } => Arg::Float(s.parse::<f64>().map_err(|e| bad(&e))?),
        ParamEncoding::Angle { .. } | ParamEncoding::Time { .. } => {
            Arg::Sexagesimal(s.parse::<Sexagesimal>().map_err(|e| bad(&e))?)
        }
        ParamEncoding::Date => Arg::Date(s.parse::<CalendarDate>().map_err(|e| bad(&e))?),
        ParamEncoding::Text { .. } | ParamEncoding::ObjectClasses => Arg::Text(s.to_string()),
    };
    Ok(arg)
}

fn invoke(conf: &InvokeConf) -> Result<()> {
    let catalog = Catalog::standard();
    let desc = catalog
        .get(&conf.operation)
        .ok_or_else(|| eyre!("Unknown operation {:?}, see `operations`", conf.operation))?;
    if conf.args.len() != desc.params.len() {
        return Err(eyre!(
            "{} takes {} argument(s), got {}",
            desc.name,
            desc.params.len(),
            conf.args.len()
        ));
    }
    let args = desc
        .params
        .iter()
        .zip(&conf.args)
        .map(|(slot, s)| parse_arg(slot, s))
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Invoking {} with {:?}", desc.name, args);
    let session = conf.serial.open_session()?;
    let response = session.invoke_descriptor(desc, &args)?;
    print_response(&mut get_stdout(), &response)
}

fn position(conf: &SerialArgs) -> Result<()> {
    let scope = conf.open_telescope()?;
    println!("RA:  {}", scope.ra()?);
    println!("Dec: {}", scope.declination()?);
    println!("Alt: {}", scope.altitude()?);
    println!("Az:  {}", scope.azimuth()?);
    Ok(())
}

fn info(conf: &SerialArgs) -> Result<()> {
    let scope = conf.open_telescope()?;
    let firmware = scope.firmware()?;
    println!("{} {}", firmware.product, firmware.number);
    println!("Built {} {}", firmware.date, firmware.time);
    Ok(())
}

fn goto(conf: &GotoConf) -> Result<()> {
    let scope = conf.serial.open_telescope()?;
    scope.goto(conf.ra, conf.dec)?;
    let mut stdout = get_stdout();
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(&mut stdout, "Slewing to {} {}", conf.ra, conf.dec)?;
    stdout.reset()?;
    Ok(())
}

fn halt(conf: &SerialArgs) -> Result<()> {
    conf.open_telescope()?.halt()?;
    Ok(())
}

fn select_site(conf: &SiteConf) -> Result<()> {
    conf.serial.open_telescope()?.select_site(conf.site)?;
    Ok(())
}
