use crate::render::{input_fields_table, inputs_table, output_metrics_table, results_table};
use analytics::ForecastState;
use configuration::DisplaySettings;
use core_types::{CampaignInputs, CoreError, InputField};
use std::io::{BufRead, Write};

const HELP: &str = "\
Commands:
  set <input> <value>     type a value (taken as-is, even out of range)
  slide <input> <value>   move the slider (clamped and snapped to its step)
  reset                   return to the starting inputs
  show                    print inputs and results again
  json                    print the current report as JSON
  fields                  list inputs and outputs
  help                    this text
  quit                    leave the session
Inputs accept camelCase, snake_case or kebab-case names, e.g. adCtr or ad-ctr.";

/// One parsed line of session input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Set(InputField, f64),
    Slide(InputField, f64),
    Reset,
    Show,
    Json,
    Fields,
    Help,
    Quit,
}

/// Parses a typed number, tolerating `$`, `%` and `,` decorations.
pub fn parse_value(field: InputField, raw: &str) -> Result<f64, CoreError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',' | '_'))
        .collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| CoreError::InvalidValue(field.key().to_string(), format!("'{raw}' is not a number")))?;
    if !value.is_finite() {
        return Err(CoreError::InvalidValue(
            field.key().to_string(),
            format!("'{raw}' is not a finite number"),
        ));
    }
    Ok(value)
}

impl std::str::FromStr for Command {
    type Err = CoreError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let invalid = |reason: &str| CoreError::InvalidValue("command".to_string(), reason.to_string());

        match words.as_slice() {
            [verb, name, value] if verb.eq_ignore_ascii_case("set") => {
                let field: InputField = name.parse()?;
                Ok(Command::Set(field, parse_value(field, value)?))
            }
            [verb, name, value] if verb.eq_ignore_ascii_case("slide") => {
                let field: InputField = name.parse()?;
                Ok(Command::Slide(field, parse_value(field, value)?))
            }
            [verb, ..] if verb.eq_ignore_ascii_case("set") || verb.eq_ignore_ascii_case("slide") => {
                Err(invalid("expected '<set|slide> <input> <value>'"))
            }
            [verb] => match verb.to_ascii_lowercase().as_str() {
                "reset" => Ok(Command::Reset),
                "show" => Ok(Command::Show),
                "json" => Ok(Command::Json),
                "fields" => Ok(Command::Fields),
                "help" | "?" => Ok(Command::Help),
                "quit" | "exit" | "q" => Ok(Command::Quit),
                other => Err(invalid(&format!("unknown command '{other}', try 'help'"))),
            },
            [] => Err(invalid("empty line")),
            _ => Err(invalid("too many words, try 'help'")),
        }
    }
}

/// An interactive forecasting session.
///
/// Owns the only live `ForecastState`; every mutating command replaces it
/// with the next state before the next line is read.
pub struct Session {
    state: ForecastState,
    defaults: CampaignInputs,
    display: DisplaySettings,
}

impl Session {
    pub fn new(defaults: CampaignInputs, display: DisplaySettings) -> Self {
        Self {
            state: ForecastState::new(defaults),
            defaults,
            display,
        }
    }

    pub fn state(&self) -> &ForecastState {
        &self.state
    }

    /// Applies one command. Returns `false` when the session should end.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> anyhow::Result<bool> {
        match command {
            Command::Set(field, value) => {
                let value = if self.display.clamp_text_entry {
                    field.range().clamp(value)
                } else {
                    value
                };
                self.state = self.state.set(field, value);
                self.print_results(out)?;
            }
            Command::Slide(field, value) => {
                self.state = self.state.slide(field, value);
                self.print_results(out)?;
            }
            Command::Reset => {
                self.state = self.state.reset(self.defaults);
                self.print_results(out)?;
            }
            Command::Show => {
                writeln!(out, "{}", inputs_table(self.state.inputs()))?;
                self.print_results(out)?;
            }
            Command::Json => {
                writeln!(out, "{}", serde_json::to_string_pretty(&self.state.report())?)?;
            }
            Command::Fields => {
                writeln!(out, "{}", input_fields_table())?;
                writeln!(out, "{}", output_metrics_table())?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn print_results<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let report = self.state.report();
        writeln!(out, "{}", results_table(&report, self.display.delta_threshold_pct))?;

        let out_of_range = self.state.inputs().out_of_range();
        if !out_of_range.is_empty() {
            let names: Vec<&str> = out_of_range.iter().map(|f| f.key()).collect();
            writeln!(out, "Outside slider range: {}", names.join(", "))?;
        }
        if !report.non_finite.is_empty() {
            let names: Vec<&str> = report.non_finite.iter().map(|m| m.key()).collect();
            writeln!(out, "Undefined (division by zero): {}", names.join(", "))?;
        }
        Ok(())
    }

    /// Reads commands line by line until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "Media forecast session. Type 'help' for commands.")?;
        writeln!(out, "{}", inputs_table(self.state.inputs()))?;
        self.print_results(out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next() else { break };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => {
                    tracing::debug!(?command, "Session command.");
                    if !self.execute(command, out)? {
                        break;
                    }
                }
                Err(e) => writeln!(out, "error: {e}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::OutputMetric;

    fn session() -> Session {
        Session::new(CampaignInputs::default(), DisplaySettings::default())
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            "set ad-ctr 3".parse::<Command>(),
            Ok(Command::Set(InputField::AdCtr, 3.0))
        );
        assert_eq!(
            "SLIDE totalAdSpend $150,500".parse::<Command>(),
            Ok(Command::Slide(InputField::TotalAdSpend, 150_500.0))
        );
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
        assert!(matches!(
            "set ad-ctr".parse::<Command>(),
            Err(CoreError::InvalidValue(..))
        ));
        assert!(matches!(
            "set clicks 3".parse::<Command>(),
            Err(CoreError::UnknownField(_))
        ));
        assert!(matches!(
            "set aov inf".parse::<Command>(),
            Err(CoreError::InvalidValue(..))
        ));
    }

    #[test]
    fn run_applies_each_line_in_order() {
        let mut session = session();
        let script = "set aov 100\nbogus\nslide ad-ctr 25\nquit\nset aov 1\n";
        let mut out = Vec::new();
        session.run(script.as_bytes(), &mut out).unwrap();

        let inputs = session.state().inputs();
        assert_eq!(inputs.aov, 100.0);
        assert_eq!(inputs.ad_ctr, 10.0);

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("error: Invalid value for command: unknown command 'bogus'"));
    }

    #[test]
    fn typed_values_pass_through_unless_clamping_is_configured() {
        let mut out = Vec::new();

        let mut session = session();
        session.execute(Command::Set(InputField::Cpm, 250.0), &mut out).unwrap();
        assert_eq!(session.state().inputs().cpm, 250.0);

        let mut clamped = Session::new(
            CampaignInputs::default(),
            DisplaySettings {
                clamp_text_entry: true,
                ..Default::default()
            },
        );
        clamped.execute(Command::Set(InputField::Cpm, 250.0), &mut out).unwrap();
        assert_eq!(clamped.state().inputs().cpm, 100.0);
    }

    #[test]
    fn each_command_keeps_exactly_one_step_back() {
        let mut session = session();
        let mut out = Vec::new();

        let first = *session.state().current();
        session.execute(Command::Set(InputField::Aov, 100.0), &mut out).unwrap();
        assert_eq!(session.state().previous(), Some(&first));

        let second = *session.state().current();
        session.execute(Command::Slide(InputField::Cpm, 52.3), &mut out).unwrap();
        assert_eq!(session.state().previous(), Some(&second));
        assert_eq!(session.state().inputs().cpm, 52.5);
        assert_eq!(session.state().inputs().aov, 100.0);

        session.execute(Command::Show, &mut out).unwrap();
        assert_eq!(session.state().previous(), Some(&second));
    }

    #[test]
    fn reset_returns_to_session_defaults() {
        let defaults = CampaignInputs::default().with(InputField::Aov, 50.0);
        let mut session = Session::new(defaults, DisplaySettings::default());
        let mut out = Vec::new();

        session.execute(Command::Set(InputField::Aov, 75.0), &mut out).unwrap();
        session.execute(Command::Reset, &mut out).unwrap();
        assert_eq!(session.state().inputs().aov, 50.0);
        assert!(session.state().delta(OutputMetric::GrossRevenue).unwrap() < 0.0);
    }

    #[test]
    fn degenerate_input_is_reported() {
        let mut session = session();
        let mut out = Vec::new();
        session.execute(Command::Set(InputField::AdCtr, 0.0), &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Outside slider range: adCtr"));
        assert!(printed.contains("Undefined (division by zero): costPerClick, cpa, promoConversionRate"));
    }
}
