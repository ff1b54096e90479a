use autostar::{
    descriptor::{ParamEncoding, ResponseKind, Wire},
    OperationDescriptor, Response,
};
use simple_eyre::Result;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Returns std::io::Write stream with coloring enabled if program is run interactively
pub fn get_stdout() -> StandardStream {
    StandardStream::stdout(if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    })
}

pub fn print_response(out: &mut StandardStream, response: &Response) -> Result<()> {
    let color = match response.status() {
        Some(s) if s.is_success() => Some(Color::Green),
        Some(_) => Some(Color::Red),
        None => None,
    };
    out.set_color(ColorSpec::new().set_fg(color))?;
    writeln!(out, "{}", format_response(response))?;
    out.reset()?;
    Ok(())
}

pub fn format_response(response: &Response) -> String {
    match response {
        Response::Done => "OK".to_string(),
        Response::Status(s) => format!("{:?}", s),
        Response::StatusMessage(s, msg) if msg.is_empty() => format!("{:?}", s),
        Response::StatusMessage(s, msg) => format!("{:?}: {}", s, msg),
        Response::Integer(n) => n.to_string(),
        Response::Decimal(v) => v.to_string(),
        Response::Angle(a) | Response::Time(a) => a.to_string(),
        Response::Date(d) => d.to_string(),
        Response::Text(t) => t.clone(),
    }
}

/// One line per operation: name, wire form and what comes back
pub fn format_operation(desc: &OperationDescriptor) -> String {
    let wire = match desc.wire {
        Wire::Command(mnemonic) => {
            let params: String = desc
                .params
                .iter()
                .map(|p| format!("<{}>", p.name))
                .collect();
            format!(":{}{}#", mnemonic, params)
        }
        Wire::Control(byte) => format!("0x{:02X}", byte),
    };
    let reply = match desc.response {
        ResponseKind::None => "nothing".to_string(),
        ResponseKind::SingleByte => "one byte".to_string(),
        ResponseKind::SingleDigit => "digit#".to_string(),
        ResponseKind::Delimited => "string#".to_string(),
        ResponseKind::DigitOrMessage { bare, frames } => {
            format!("{} or digit string{}", bare as char, "#".repeat(frames as usize))
        }
        ResponseKind::FixedFormat(pattern) => pattern
            .0
            .iter()
            .map(|t| format!("{}#", t))
            .collect::<Vec<_>>()
            .join(" or "),
    };
    format!("{:<30} {:<20} {}", desc.name, wire, reply)
}

/// How the value of a parameter is written on the command line
pub fn param_hint(encoding: &ParamEncoding) -> &'static str {
    match encoding {
        ParamEncoding::Digit { .. } | ParamEncoding::Integer { .. } => "integer",
        ParamEncoding::Decimal { .. } => "decimal",
        ParamEncoding::Angle { .. } => "sDD*MM[:SS]",
        ParamEncoding::Time { .. } => "HH:MM:SS",
        ParamEncoding::Date => "MM/DD/YY",
        ParamEncoding::Text { .. } => "text",
        ParamEncoding::ObjectClasses => "GPDCO",
    }
}
