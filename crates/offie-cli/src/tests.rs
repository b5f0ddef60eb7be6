use super::*;

#[test]
fn parses_address_command_with_spaces() {
    let cli = Cli::try_parse_from(["offie", "address", "10", "Downing", "St"])
        .expect("expected valid cli args");

    match cli.command {
        Commands::Address { text } => assert_eq!(text.join(" "), "10 Downing St"),
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(cli.sort.is_none());
    assert!(cli.units.is_none());
}

#[test]
fn address_requires_text() {
    assert!(Cli::try_parse_from(["offie", "address"]).is_err());
}

#[test]
fn parses_here_with_negative_coordinates() {
    let cli = Cli::try_parse_from(["offie", "here", "--lat", "51.5", "--lng", "-0.12"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Here {
            lat: Some(lat),
            lng: Some(lng),
        } if (lat - 51.5).abs() < f64::EPSILON && (lng + 0.12).abs() < f64::EPSILON
    ));
}

#[test]
fn here_requires_both_coordinates() {
    assert!(Cli::try_parse_from(["offie", "here", "--lat", "51.5"]).is_err());
}

#[test]
fn global_flags_parse_after_subcommand() {
    let cli = Cli::try_parse_from(["offie", "here", "--sort", "rating", "--units", "km"])
        .expect("expected valid cli args");

    assert_eq!(cli.sort, Some(SortKey::Rating));
    assert_eq!(cli.units, Some(DistanceUnit::Kilometres));
}

#[test]
fn rejects_unknown_sort_key() {
    assert!(Cli::try_parse_from(["offie", "--sort", "popularity", "here"]).is_err());
}
