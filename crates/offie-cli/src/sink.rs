//! Terminal rendering of ranked shops and search failures.

use std::io::Write;
use std::sync::Mutex;

use offie_core::{DistanceUnit, SearchError, Shop};
use offie_places::maps_url;
use offie_search::{CategoryFailure, PresentationSink};

/// Writes results to one stream and failures to stderr.
pub(crate) struct TerminalSink<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalSink<std::io::Stdout> {
    pub(crate) fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_lines(&self, lines: &[String]) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for line in lines {
            if let Err(e) = writeln!(out, "{line}") {
                tracing::warn!(error = %e, "failed to write results");
                return;
            }
        }
    }
}

/// Headline for one shop, e.g. `Spar : 4.2 ★ : 0.35 miles away`.
pub(crate) fn format_shop(shop: &Shop, unit: DistanceUnit) -> String {
    let distance = format!("{:.2} {} away", shop.distance_from_user, unit.label());
    match shop.rating {
        Some(rating) => format!("{} : {rating:.1} \u{2605} : {distance}", shop.name),
        None => format!("{} (no rating) : {distance}", shop.name),
    }
}

impl<W: Write + Send> PresentationSink for TerminalSink<W> {
    fn render(&self, ranked: &[Shop], unit: DistanceUnit) {
        if ranked.is_empty() {
            self.write_lines(&["No open shops found nearby.".to_string()]);
            return;
        }

        let mut lines = Vec::with_capacity(ranked.len() * 3);
        for shop in ranked {
            lines.push(format_shop(shop, unit));
            if !shop.address.is_empty() {
                lines.push(format!("    {}", shop.address));
            }
            lines.push(format!("    {}", maps_url(shop)));
        }
        self.write_lines(&lines);
    }

    fn report_error(&self, error: &SearchError) {
        eprintln!("{error}");
    }

    fn report_failure(&self, failure: &CategoryFailure) {
        eprintln!(
            "warning: {} search failed ({}); results may be incomplete",
            failure.category, failure.error.code
        );
    }
}

#[cfg(test)]
mod tests {
    use offie_core::Coordinate;

    use super::*;

    fn shop(name: &str, rating: Option<f64>, distance: f64) -> Shop {
        Shop {
            place_id: format!("id-{name}"),
            name: name.to_string(),
            address: "1 Market Sq".to_string(),
            location: Some(Coordinate::new(51.75, -1.25)),
            rating,
            distance_from_user: distance,
        }
    }

    #[test]
    fn formats_rated_shop() {
        assert_eq!(
            format_shop(&shop("Spar", Some(4.0), 0.3456), DistanceUnit::Miles),
            "Spar : 4.0 \u{2605} : 0.35 miles away"
        );
    }

    #[test]
    fn formats_unrated_shop_in_km() {
        assert_eq!(
            format_shop(&shop("Co-op", None, 1.2), DistanceUnit::Kilometres),
            "Co-op (no rating) : 1.20 km away"
        );
    }

    #[test]
    fn render_writes_headline_address_and_link() {
        let sink = TerminalSink::new(Vec::new());
        sink.render(&[shop("Spar", Some(4.2), 0.5)], DistanceUnit::Miles);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Spar : 4.2 \u{2605} : 0.50 miles away");
        assert_eq!(lines[1], "    1 Market Sq");
        assert!(lines[2].contains("query_place_id=id-Spar"));
    }

    #[test]
    fn render_empty_result_says_so() {
        let sink = TerminalSink::new(Vec::new());
        sink.render(&[], DistanceUnit::Miles);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "No open shops found nearby.\n");
    }
}
