use std::env;
use std::path::Path;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};

use natal_core::{compute_natal_chart, ephemeris, BirthInput, Config, EphemerisSource, Planet};

const CONFIG_FILE: &str = "natal.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <YYYY-MM-DD> <HH:MM> <birth place...>", args[0]);
        eprintln!("Example: {} 1990-03-21 14:30 Lisbon, Portugal", args[0]);
        return Ok(());
    }

    let date: NaiveDate = args[1].parse()?;
    let time = parse_time(&args[2])?;
    let place = args[3..].join(" ");

    let config = if Path::new(CONFIG_FILE).exists() {
        Config::load(CONFIG_FILE)?
    } else {
        Config::default()
    };

    if config.ephemeris.source == EphemerisSource::Swiss {
        ephemeris::ensure_ephe_files(&config.ephemeris)?;
    }

    let input = BirthInput { date, time, place };
    let chart = compute_natal_chart(&input, &config)?;

    let sun = chart
        .positions
        .iter()
        .find(|p| p.planet == Planet::Sun)
        .map(|p| p.sign);
    println!("Natal chart for {} {} in {}", date, time, input.place);
    if let Some(sign) = sun {
        println!("Sun sign: {} {}", sign.symbol(), sign);
    }
    println!();
    print!("{}", chart.summary());
    println!();
    println!("House cusps (Placidus):");
    for (i, cusp) in chart.houses.cusps.iter().enumerate() {
        println!("  {:>2}  {:>8.3}°", i + 1, cusp);
    }

    Ok(())
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(Into::into)
}
