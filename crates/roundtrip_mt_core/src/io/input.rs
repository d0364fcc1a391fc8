use std::{fmt, fs, io::Read};

use crate::{Error, Result, options::SolverOptions, waypoint::Waypoint};

const HEADER_FIRST_FIELD: &str = "Nummer";
const RECORD_FIELDS: usize = 8;

/// One skipped input line and why it was skipped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordDiagnostic {
    /// 1-based line number in the input.
    pub line: usize,
    pub message: String,
}

/// Materialized input for the solver: the ordered waypoint list, the base
/// waypoint index and any lines the reader had to skip.
#[derive(Clone, Debug)]
pub struct SolverInput {
    pub waypoints: Vec<Waypoint>,
    pub base_index: usize,
    pub diagnostics: Vec<RecordDiagnostic>,
}

impl SolverInput {
    pub fn new(waypoints: Vec<Waypoint>, base_index: usize) -> Self {
        Self {
            waypoints,
            base_index,
            diagnostics: Vec::new(),
        }
    }

    /// Reads waypoints from the configured input file, or stdin when none
    /// is set.
    pub fn load(options: &SolverOptions) -> Result<Self> {
        let raw = match options.input_path() {
            Some(path) => fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        let (waypoints, diagnostics) = parse_waypoints(&raw)?;
        Ok(Self {
            waypoints,
            base_index: options.base_index,
            diagnostics,
        })
    }
}

impl fmt::Display for SolverInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "waypoints={} base_index={} skipped_lines={}",
            self.waypoints.len(),
            self.base_index,
            self.diagnostics.len()
        )
    }
}

/// Parses the delimited waypoint list. Malformed lines become diagnostics
/// instead of aborting the read; the header line (first field `Nummer`) and
/// blank lines are skipped silently.
pub fn parse_waypoints(raw: &str) -> Result<(Vec<Waypoint>, Vec<RecordDiagnostic>)> {
    let mut waypoints = Vec::new();
    let mut diagnostics = Vec::new();

    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || is_header(line) {
            continue;
        }
        match parse_record(line) {
            Ok(waypoint) => waypoints.push(waypoint),
            Err(message) => diagnostics.push(RecordDiagnostic {
                line: idx + 1,
                message,
            }),
        }
    }

    if waypoints.is_empty() {
        return Err(Error::invalid_input("No waypoints in input."));
    }
    Ok((waypoints, diagnostics))
}

fn is_header(line: &str) -> bool {
    line.split(',')
        .next()
        .is_some_and(|field| field.trim().eq_ignore_ascii_case(HEADER_FIRST_FIELD))
}

fn parse_record(line: &str) -> std::result::Result<Waypoint, String> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != RECORD_FIELDS {
        return Err(format!(
            "expected {RECORD_FIELDS} comma-separated fields, got {}",
            fields.len()
        ));
    }

    let number = fields[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid waypoint number: {}", fields[0]))?;
    let lat = fields[6]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid latitude: {}", fields[6]))?;
    let lng = fields[7]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid longitude: {}", fields[7]))?;

    Ok(Waypoint {
        number,
        name: fields[1].trim().to_owned(),
        street: fields[2].trim().to_owned(),
        house_number: fields[3].trim().to_owned(),
        postal_code: fields[4].trim().to_owned(),
        city: fields[5].trim().to_owned(),
        lat,
        lng,
    })
}

#[cfg(test)]
mod tests {
    use super::{SolverInput, parse_waypoints};
    use crate::waypoint::Waypoint;

    const SAMPLE: &str = "\
Nummer,msg Standort,Straße,Hausnummer,PLZ,Ort,Breitengrad,Längengrad
1,Ismaning,Robert-Bürkle-Straße,1,85737,Ismaning,48.229035,11.686153
2,Berlin,Wittestraße,30,13509,Berlin,52.580911,13.293884
";

    #[test]
    fn parses_records_and_skips_the_header() {
        let (waypoints, diagnostics) = parse_waypoints(SAMPLE).expect("parse");
        assert_eq!(waypoints.len(), 2);
        assert!(diagnostics.is_empty());

        let first = &waypoints[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.name, "Ismaning");
        assert_eq!(first.street, "Robert-Bürkle-Straße");
        assert_eq!(first.house_number, "1");
        assert_eq!(first.postal_code, "85737");
        assert_eq!(first.city, "Ismaning");
        assert!((first.lat - 48.229035).abs() < 1e-12);
        assert!((first.lng - 11.686153).abs() < 1e-12);
    }

    #[test]
    fn header_detection_is_case_insensitive() {
        let raw = "NUMMER,a,b,c,d,e,f,g\n3,X,S,1,2,C,1.0,2.0\n";
        let (waypoints, diagnostics) = parse_waypoints(raw).expect("parse");
        assert_eq!(waypoints.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn malformed_lines_become_diagnostics_with_line_numbers() {
        let raw = format!("{SAMPLE}3,broken\n4,Frankfurt,Mergenthalerallee,73,65760,Eschborn,50.136479,8.570963\n");
        let (waypoints, diagnostics) = parse_waypoints(&raw).expect("parse");

        assert_eq!(waypoints.len(), 3);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 4);
        assert!(diagnostics[0].message.contains("expected 8"));
    }

    #[test]
    fn unparseable_coordinates_are_diagnosed_not_fatal() {
        let raw = "1,A,S,1,2,C,not-a-lat,2.0\n2,B,S,1,2,C,1.0,2.0\n";
        let (waypoints, diagnostics) = parse_waypoints(raw).expect("parse");
        assert_eq!(waypoints.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("invalid latitude"));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let raw = "\n1,A,S,1,2,C,1.0,2.0\n\n\n2,B,S,1,2,C,2.0,3.0\n";
        let (waypoints, diagnostics) = parse_waypoints(raw).expect("parse");
        assert_eq!(waypoints.len(), 2);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn input_without_any_valid_record_is_rejected() {
        assert!(parse_waypoints("").is_err());
        assert!(parse_waypoints("Nummer,a,b,c,d,e,f,g\n").is_err());
        assert!(parse_waypoints("garbage\n").is_err());
    }

    #[test]
    fn display_reports_counts() {
        let input = SolverInput::new(vec![Waypoint::new(1, "a", 0.0, 0.0)], 0);
        assert_eq!(input.to_string(), "waypoints=1 base_index=0 skipped_lines=0");
    }
}
