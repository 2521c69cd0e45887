use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::entities::Tariff;
use crate::error::{invalid_input_error, Error};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub addr: SocketAddr,
    /// JSON tariff to load at startup; the standard tariff is used otherwise.
    pub tariff_path: Option<PathBuf>,
}

impl Settings {
    /// Reads `FARES_ADDR` and `FARES_TARIFF`, after any `.env` file.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let addr = match env::var("FARES_ADDR") {
            Ok(value) => value,
            Err(env::VarError::NotPresent) => DEFAULT_ADDR.to_string(),
            Err(err) => return Err(err.into()),
        };

        let tariff_path = match env::var("FARES_TARIFF") {
            Ok(value) if !value.trim().is_empty() => Some(PathBuf::from(value)),
            Ok(_) | Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            addr: parse_addr(&addr)?,
            tariff_path,
        })
    }

    pub fn tariff(&self) -> Result<Tariff, Error> {
        match &self.tariff_path {
            Some(path) => load_tariff(path),
            None => Ok(Tariff::standard()),
        }
    }
}

fn parse_addr(value: &str) -> Result<SocketAddr, Error> {
    value.trim().parse().map_err(|_| invalid_input_error())
}

pub fn parse_tariff(json: &str) -> Result<Tariff, Error> {
    let tariff: Tariff = serde_json::from_str(json)?;
    tariff.validate()?;

    Ok(tariff)
}

#[tracing::instrument]
pub fn load_tariff(path: &Path) -> Result<Tariff, Error> {
    let json = fs::read_to_string(path)?;

    parse_tariff(&json)
}

#[test]
fn shipped_tariff_matches_standard() {
    let tariff = parse_tariff(include_str!("../config/tariff.json")).unwrap();

    assert_eq!(tariff, Tariff::standard());
}

#[test]
fn invalid_tariff_file_is_rejected() {
    // escalade's second tier priced above its first
    let json = include_str!("../config/tariff.json")
        .replace("\"rate_per_mile\": 395", "\"rate_per_mile\": 500");

    assert_eq!(parse_tariff(&json).unwrap_err().code, 104);
    assert_eq!(parse_tariff("{ \"vehicles\": 3 }").unwrap_err().code, 104);
}

#[test]
fn missing_tariff_file_is_an_io_error() {
    let err = load_tariff(Path::new("no/such/tariff.json")).unwrap_err();

    assert_eq!(err.code, 2);
}

#[test]
fn addr_must_be_host_and_port() {
    assert_eq!(
        parse_addr(DEFAULT_ADDR).unwrap(),
        SocketAddr::from(([127, 0, 0, 1], 3000))
    );
    assert!(parse_addr("localhost").is_err());
}
