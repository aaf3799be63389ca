use super::*;
use std::path::Path;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_folder_with_default_type() {
    let cli = parse(&["pemsdl", "/data/pems"]);
    assert_eq!(cli.data_folder, Path::new("/data/pems"));
    assert_eq!(cli.data_type, "station_5min");
}

#[test]
fn cli_parse_type_flag() {
    let cli = parse(&["pemsdl", "--type", "station_hour", "out"]);
    assert_eq!(cli.data_type, "station_hour");
    assert_eq!(cli.data_folder, Path::new("out"));

    let cli = parse(&["pemsdl", "out", "--type=station_day"]);
    assert_eq!(cli.data_type, "station_day");
}

#[test]
fn cli_requires_folder() {
    assert!(Cli::try_parse_from(["pemsdl"]).is_err());
    assert!(Cli::try_parse_from(["pemsdl", "--type", "station_hour"]).is_err());
}

#[test]
fn cli_rejects_other_flags_and_extra_args() {
    assert!(Cli::try_parse_from(["pemsdl", "--jobs", "4", "out"]).is_err());
    assert!(Cli::try_parse_from(["pemsdl", "out", "more"]).is_err());
}
