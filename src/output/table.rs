//! Console table formatter.
//!
//! ```text
//! ----------------------------------------------------------------------------
//! #   Movie                                             Rate   Votes   Cinemas
//! ----------------------------------------------------------------------------
//! 1   Oppenheimer ..................................    8.123  5000    12
//! ----------------------------------------------------------------------------
//! ```

use std::io::{self, Write};

use yansi::Paint;

use crate::rank::RankedListing;

/// Width of the separator lines.
const RULE_WIDTH: usize = 76;

/// Width the movie name is padded to with dots.
const NAME_WIDTH: usize = 48;

/// Fixed-width table of ranked movies.
#[derive(Debug)]
pub struct TableOutput<'a> {
    ranked: &'a [RankedListing],
    color: bool,
}

impl<'a> TableOutput<'a> {
    /// Table over `ranked`; `color` enables a bold header.
    #[must_use]
    pub fn new(ranked: &'a [RankedListing], color: bool) -> Self {
        Self { ranked, color }
    }

    /// Write the table.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let rule = "-".repeat(RULE_WIDTH);
        let header = row("#", "Movie", "Rate", "Votes", "Cinemas");

        writeln!(writer, "{rule}")?;
        if self.color {
            writeln!(writer, "{}", header.bold())?;
        } else {
            writeln!(writer, "{header}")?;
        }
        writeln!(writer, "{rule}")?;

        for (i, ranked) in self.ranked.iter().enumerate() {
            let listing = &ranked.listing;
            writeln!(
                writer,
                "{}",
                row(
                    &(i + 1).to_string(),
                    &dotted(&listing.name),
                    &format_rate(listing.rate),
                    &listing.votes.to_string(),
                    &listing.venue_count.to_string(),
                )
            )?;
        }

        writeln!(writer, "{rule}")?;
        writer.flush()
    }

    /// Render the table to a string.
    #[must_use]
    pub fn to_string_plain(&self) -> String {
        let mut buf = Vec::new();
        // writing to a Vec cannot fail
        let _ = Self::new(self.ranked, false).write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn row(num: &str, name: &str, rate: &str, votes: &str, cinemas: &str) -> String {
    format!("{num:<4}{name:<50}{rate:<7}{votes:<8}{cinemas}")
}

/// `"Dune"` becomes `"Dune ..."` filled with dots to [`NAME_WIDTH`].
fn dotted(name: &str) -> String {
    let with_space = format!("{name} ");
    let len = with_space.chars().count();
    if len >= NAME_WIDTH {
        with_space
    } else {
        format!("{with_space}{}", ".".repeat(NAME_WIDTH - len))
    }
}

/// Rating rounded to three decimals, always with a fractional part.
fn format_rate(rate: f64) -> String {
    let rounded = (rate * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}
