//! Programmer registration and session setup
//!
//! A programmer string names the adapter and its options:
//! `name` or `name:key1=value1,key2=value2`. This module turns it, together
//! with the NAND profile, into an open [`NandFlash`] session.

use nandbang_core::nand::{BusyWait, NandFlash};
use nandbang_core::port::{BitbangPort, ProgrammerInfo};
use nandbang_core::profile::NandProfile;

use crate::cli::SessionArgs;

/// Session over whichever adapter was selected
pub type Session = NandFlash<Box<dyn BitbangPort>, Box<dyn BitbangPort>>;

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "ftdi")]
    programmers.push(ProgrammerInfo {
        name: "ftdi",
        aliases: &["ft2232h"],
        description: "FT2232H async bitbang (vid=,pid=,data=<A|B>,control=<A|B>,latency=<ms>)",
    });

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &["sim"],
        description: "Simulated NAND device (busy=<polls>,stuck=1,fail=1,id=<hex10>,fill=pattern)",
    });

    programmers
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Parsed programmer parameters
#[derive(Debug, PartialEq, Eq)]
pub struct ProgrammerParams {
    /// Programmer name as given
    pub name: String,
    /// Key-value parameters, in the order given
    pub params: Vec<(String, String)>,
}

impl ProgrammerParams {
    /// Parameters as borrowed pairs, the form backend `parse_options` take
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a programmer string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
pub fn parse_programmer_params(s: &str) -> Result<ProgrammerParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.push((key.to_string(), value.to_string()));
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(ProgrammerParams {
        name: name.to_string(),
        params,
    })
}

/// Load the NAND profile named on the command line, or the built-in one
pub fn load_profile(args: &SessionArgs) -> Result<NandProfile, Box<dyn std::error::Error>> {
    match &args.profile {
        Some(path) => {
            let profile = NandProfile::from_toml_file(path)
                .map_err(|e| format!("{}: {}", path.display(), e))?;
            log::info!("Loaded profile {} from {}", profile.name, path.display());
            Ok(profile)
        }
        None => Ok(NandProfile::default()),
    }
}

/// Open the programmer and bring the NAND session up
pub fn open_session(args: &SessionArgs) -> Result<Session, Box<dyn std::error::Error>> {
    let params = parse_programmer_params(&args.programmer)?;
    let profile = load_profile(args)?;

    let busy_wait = match args.busy_timeout {
        Some(max_polls) => BusyWait::Bounded { max_polls },
        None => BusyWait::Unbounded,
    };
    let config = profile.config(busy_wait, args.reset);

    let (data, control) = open_ports(&params, &profile)?;
    let flash = NandFlash::open(data, control, config)?;
    Ok(flash)
}

type Ports = (Box<dyn BitbangPort>, Box<dyn BitbangPort>);

#[allow(unused_variables)]
fn open_ports(
    params: &ProgrammerParams,
    profile: &NandProfile,
) -> Result<Ports, Box<dyn std::error::Error>> {
    match params.name.as_str() {
        #[cfg(feature = "ftdi")]
        "ftdi" | "ft2232h" => open_ftdi(params),

        #[cfg(feature = "dummy")]
        "dummy" | "sim" => open_dummy(params, profile),

        _ => Err(format!(
            "Unknown programmer: {} [available: {}]",
            params.name,
            programmer_names_short()
        )
        .into()),
    }
}

#[cfg(feature = "ftdi")]
fn open_ftdi(params: &ProgrammerParams) -> Result<Ports, Box<dyn std::error::Error>> {
    use nandbang_ftdi::{open_pair, parse_options};

    let config = parse_options(&params.options())
        .map_err(|e| format!("Invalid FTDI parameters: {}", e))?;

    log::info!(
        "Opening FT2232H {:04X}:{:04X} (data on {}, control on {})",
        config.vendor_id,
        config.product_id,
        config.data,
        config.control
    );

    let (data, control) = open_pair(&config).map_err(|e| {
        format!(
            "Failed to open FT2232H: {}\nMake sure the device is connected and you have permissions.",
            e
        )
    })?;
    Ok((Box::new(data), Box::new(control)))
}

#[cfg(feature = "dummy")]
fn open_dummy(
    params: &ProgrammerParams,
    profile: &NandProfile,
) -> Result<Ports, Box<dyn std::error::Error>> {
    use nandbang_dummy::{parse_options, SimNand};

    let mut config = parse_options(&params.options())
        .map_err(|e| format!("Invalid dummy parameters: {}", e))?;
    config.geometry = profile.geometry;

    log::info!("Opening simulated NAND (ID {})", config.id);
    let sim = SimNand::new(config);
    Ok((Box::new(sim.data_port()), Box::new(sim.control_port())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_programmer_params() {
        let params = parse_programmer_params("ftdi:data=B,control=A").unwrap();
        assert_eq!(params.name, "ftdi");
        assert_eq!(params.options(), [("data", "B"), ("control", "A")]);

        let params = parse_programmer_params("dummy").unwrap();
        assert_eq!(params.name, "dummy");
        assert!(params.params.is_empty());

        assert!(parse_programmer_params("ftdi:data").is_err());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_session() {
        let args = SessionArgs {
            programmer: "dummy:busy=1".to_string(),
            profile: None,
            busy_timeout: Some(10),
            reset: true,
        };
        let mut flash = open_session(&args).unwrap();
        assert!(flash.read_id().unwrap().is_match());
        flash.close().unwrap();
    }

    #[test]
    fn test_unknown_programmer() {
        let args = SessionArgs {
            programmer: "ch341a".to_string(),
            profile: None,
            busy_timeout: None,
            reset: false,
        };
        assert!(open_session(&args).is_err());
    }
}
