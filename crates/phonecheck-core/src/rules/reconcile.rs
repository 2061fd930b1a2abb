use crate::domain::{ExpectedPhones, NormalizedPhone};
use crate::extract::PageCapture;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// An extracted number must equal an expected one.
    Forward,
    /// An expected number must be a substring of some extracted one.
    Backward,
}

/// Where the checked number came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "side", rename_all = "snake_case")]
pub enum CheckOrigin {
    Page { name: String },
    Expected { row: usize, country: Option<String> },
}

impl fmt::Display for CheckOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { name } => write!(f, "{name}"),
            Self::Expected { row, country } => match country {
                Some(country) => write!(f, "expected list row {row} ({country})"),
                None => write!(f, "expected list row {row}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub kind: CheckKind,
    pub phone: NormalizedPhone,
    pub raw: String,
    pub origin: CheckOrigin,
    /// The number on the other side that satisfied the check.
    pub matched: Option<NormalizedPhone>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.matched.is_some()
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("phone number \"{phone}\" (raw {raw:?}) from {origin} is not in the expected list")]
    Unexpected {
        phone: NormalizedPhone,
        raw: String,
        origin: String,
    },
    #[error(
        "expected phone number \"{phone}\" (raw {raw:?}, {origin}) was not found on any visited page ({visited})"
    )]
    Missing {
        phone: NormalizedPhone,
        raw: String,
        origin: CheckOrigin,
        visited: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} phone number mismatch(es)", .mismatches.len())]
pub struct ReconciliationError {
    pub mismatches: Vec<Mismatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub visited: Vec<String>,
    pub outcomes: Vec<CheckOutcome>,
}

impl ReconciliationReport {
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> + '_ {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn count(&self, kind: CheckKind, passed: bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.kind == kind && outcome.passed() == passed)
            .count()
    }

    pub fn mismatches(&self) -> Vec<Mismatch> {
        let visited = self.visited.join(", ");
        self.failures()
            .map(|outcome| match outcome.kind {
                CheckKind::Forward => Mismatch::Unexpected {
                    phone: outcome.phone.clone(),
                    raw: outcome.raw.clone(),
                    origin: outcome.origin.to_string(),
                },
                CheckKind::Backward => Mismatch::Missing {
                    phone: outcome.phone.clone(),
                    raw: outcome.raw.clone(),
                    origin: outcome.origin.clone(),
                    visited: visited.clone(),
                },
            })
            .collect()
    }

    pub fn into_result(self) -> Result<Self, ReconciliationError> {
        let mismatches = self.mismatches();
        if mismatches.is_empty() {
            return Ok(self);
        }
        Err(ReconciliationError { mismatches })
    }
}

/// Runs both containment checks.
///
/// Forward checks every number of every capture for exact membership in
/// `expected`, in capture order. Backward checks every expected record, in
/// file order, for substring containment in the union of all captures.
pub fn reconcile(expected: &ExpectedPhones, captures: &[PageCapture]) -> ReconciliationReport {
    let mut outcomes = Vec::new();

    for capture in captures {
        for sighting in capture.phones.sightings() {
            let matched = expected
                .phones()
                .find(|candidate| **candidate == sighting.phone)
                .cloned();
            outcomes.push(CheckOutcome {
                kind: CheckKind::Forward,
                phone: sighting.phone,
                raw: sighting.raw,
                origin: CheckOrigin::Page {
                    name: capture.origin.clone(),
                },
                matched,
            });
        }
    }

    for record in expected.records() {
        let matched = captures
            .iter()
            .flat_map(|capture| capture.phones.phones())
            .find(|extracted| extracted.contains(&record.phone))
            .cloned();
        outcomes.push(CheckOutcome {
            kind: CheckKind::Backward,
            phone: record.phone.clone(),
            raw: record.raw.clone(),
            origin: CheckOrigin::Expected {
                row: record.row,
                country: record.country.clone(),
            },
            matched,
        });
    }

    ReconciliationReport {
        visited: captures.iter().map(|capture| capture.origin.clone()).collect(),
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile, CheckKind, Mismatch};
    use crate::domain::{ExpectedPhoneRecord, ExpectedPhones, NormalizedPhone};
    use crate::extract::PageCapture;

    fn expected(rows: &[(&str, &str)]) -> ExpectedPhones {
        let records = rows
            .iter()
            .enumerate()
            .map(|(idx, (country, raw))| ExpectedPhoneRecord {
                row: idx + 1,
                country: Some(country.to_string()),
                raw: raw.to_string(),
                phone: NormalizedPhone::parse(raw).unwrap(),
            })
            .collect();
        ExpectedPhones::new(records).unwrap()
    }

    fn capture(origin: &str, raws: &[&str]) -> PageCapture {
        let mut capture = PageCapture::new(origin);
        for raw in raws {
            capture
                .phones
                .insert(NormalizedPhone::parse(raw).unwrap(), raw);
        }
        capture
    }

    #[test]
    fn reconcile_clean_when_both_sides_agree() {
        let expected = expected(&[("US", "+1 555 000 1111"), ("UK", "+44 20 7946 0958")]);
        let captures = [
            capture("homepage", &["+1 (555) 000-1111"]),
            capture("contact page", &["UK +44 20 7946 0958", "+1 555 000 1111"]),
        ];
        let report = reconcile(&expected, &captures);
        assert!(report.is_clean());
        assert_eq!(report.count(CheckKind::Forward, true), 3);
        assert_eq!(report.count(CheckKind::Backward, true), 2);
        assert_eq!(report.visited, ["homepage", "contact page"]);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn reconcile_checks_are_independent() {
        let expected = expected(&[("US", "+15550001111")]);
        let captures = [capture("homepage", &["+15550001111234"])];
        let report = reconcile(&expected, &captures);

        assert_eq!(report.count(CheckKind::Backward, true), 1);
        assert_eq!(report.count(CheckKind::Forward, false), 1);

        let mismatches = report.mismatches();
        assert_eq!(mismatches.len(), 1);
        match &mismatches[0] {
            Mismatch::Unexpected { phone, origin, .. } => {
                assert_eq!(phone.as_str(), "+15550001111234");
                assert_eq!(origin, "homepage");
            }
            other => panic!("unexpected mismatch: {other:?}"),
        }
    }

    #[test]
    fn reconcile_reports_each_offender() {
        let expected = expected(&[
            ("US", "+1 555 000 1111"),
            ("UK", "+44 20 7946 0958"),
            ("IN", "+91-22-1234-5678"),
        ]);
        let captures = [
            capture("homepage", &["+1 555 000 1111", "+33 1 00 00 00 00"]),
            capture("contact page", &["+49 30 000000"]),
        ];
        let err = reconcile(&expected, &captures).into_result().unwrap_err();
        assert_eq!(err.mismatches.len(), 4);

        let messages: Vec<String> = err.mismatches.iter().map(ToString::to_string).collect();
        assert!(messages[0].contains("+33100000000") && messages[0].contains("homepage"));
        assert!(messages.iter().any(|m| m.contains("+4930000000") && m.contains("contact page")));
        assert!(messages
            .iter()
            .any(|m| m.contains("+442079460958") && m.contains("row 2 (UK)")));
        assert!(messages
            .iter()
            .any(|m| m.contains("+912212345678") && m.contains("homepage, contact page")));
    }

    #[test]
    fn reconcile_without_captures_fails_every_expected() {
        let expected = expected(&[("US", "+15550001111"), ("US", "+15550001111")]);
        let report = reconcile(&expected, &[]);
        assert_eq!(report.count(CheckKind::Backward, false), 2);
        assert_eq!(report.mismatches().len(), 2);
    }
}
