use crate::domain::NormalizedPhone;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A rendered page that can be queried by selector.
pub trait PageSource {
    type Element;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Label used in reports, e.g. "homepage".
    fn origin(&self) -> &str;

    /// Waits up to `timeout` for at least one element matching `selector` to
    /// be attached. Visibility is not required. `Ok(false)` means the wait ran
    /// out.
    fn wait_for_attached(&self, selector: &str, timeout: Duration) -> Result<bool, Self::Error>;

    fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, Self::Error>;

    fn inner_text(&self, element: &Self::Element) -> Result<String, Self::Error>;
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page {origin}: selector {selector:?}: {source}")]
    Source {
        origin: String,
        selector: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A selector group that never attached within its wait budget.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SelectorTimeout {
    pub selector: String,
    #[serde(rename = "waited_ms", serialize_with = "serialize_millis")]
    pub waited: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PhoneSighting {
    pub phone: NormalizedPhone,
    /// First element text the number was read from.
    pub raw: String,
}

/// Phone numbers seen on one page, duplicates collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPhoneSet(BTreeMap<NormalizedPhone, String>);

impl ExtractedPhoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the number was already present; the first raw text
    /// is kept.
    pub fn insert(&mut self, phone: NormalizedPhone, raw: &str) -> bool {
        if self.0.contains_key(&phone) {
            return false;
        }
        self.0.insert(phone, raw.to_string());
        true
    }

    pub fn contains(&self, phone: &NormalizedPhone) -> bool {
        self.0.contains_key(phone)
    }

    pub fn phones(&self) -> impl Iterator<Item = &NormalizedPhone> + '_ {
        self.0.keys()
    }

    pub fn sightings(&self) -> impl Iterator<Item = PhoneSighting> + '_ {
        self.0.iter().map(|(phone, raw)| PhoneSighting {
            phone: phone.clone(),
            raw: raw.clone(),
        })
    }

    pub fn raw_for(&self, phone: &NormalizedPhone) -> Option<&str> {
        self.0.get(phone).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ExtractedPhoneSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for sighting in self.sightings() {
            seq.serialize_element(&sighting)?;
        }
        seq.end()
    }
}

/// Result of one page visit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PageCapture {
    pub origin: String,
    pub phones: ExtractedPhoneSet,
    pub unmatched: Vec<SelectorTimeout>,
}

impl PageCapture {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            phones: ExtractedPhoneSet::new(),
            unmatched: Vec::new(),
        }
    }
}

/// Collects normalized phone numbers from every selector group in order.
///
/// A group that does not attach within `timeout` is recorded in
/// [`PageCapture::unmatched`] and skipped. Errors raised by the page itself
/// are returned.
pub fn extract_phone_numbers<P, S>(
    page: &P,
    selectors: &[S],
    timeout: Duration,
) -> Result<PageCapture, ExtractError>
where
    P: PageSource,
    S: AsRef<str>,
{
    let mut capture = PageCapture::new(page.origin());

    for selector in selectors {
        let selector = selector.as_ref();
        let source_err = |source: P::Error| ExtractError::Source {
            origin: page.origin().to_string(),
            selector: selector.to_string(),
            source: Box::new(source),
        };

        if !page.wait_for_attached(selector, timeout).map_err(source_err)? {
            warn!(
                page = page.origin(),
                selector,
                timeout_ms = timeout.as_millis() as u64,
                "selector not found on the page, skipping"
            );
            capture.unmatched.push(SelectorTimeout {
                selector: selector.to_string(),
                waited: timeout,
            });
            continue;
        }

        let elements = page.query_all(selector).map_err(source_err)?;
        debug!(page = page.origin(), selector, count = elements.len(), "selector matched");
        for element in &elements {
            let text = page.inner_text(element).map_err(source_err)?;
            if !text.contains('+') {
                continue;
            }
            if let Some(phone) = NormalizedPhone::parse(&text) {
                capture.phones.insert(phone, text.trim());
            }
        }
    }

    info!(
        page = capture.origin.as_str(),
        count = capture.phones.len(),
        "found phone numbers"
    );
    Ok(capture)
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::{extract_phone_numbers, PageSource, DEFAULT_WAIT_TIMEOUT};
    use crate::domain::NormalizedPhone;
    use std::cell::RefCell;
    use std::fmt;
    use std::time::Duration;

    #[derive(Debug)]
    struct FakeError(String);

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl std::error::Error for FakeError {}

    struct FakePage {
        elements: Vec<(&'static str, &'static str)>,
        waits: RefCell<Vec<(String, Duration)>>,
    }

    impl FakePage {
        fn new(elements: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                elements,
                waits: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for FakePage {
        type Element = &'static str;
        type Error = FakeError;

        fn origin(&self) -> &str {
            "homepage"
        }

        fn wait_for_attached(&self, selector: &str, timeout: Duration) -> Result<bool, FakeError> {
            if selector.is_empty() {
                return Err(FakeError("empty selector".to_string()));
            }
            self.waits.borrow_mut().push((selector.to_string(), timeout));
            Ok(self.elements.iter().any(|(sel, _)| *sel == selector))
        }

        fn query_all(&self, selector: &str) -> Result<Vec<&'static str>, FakeError> {
            Ok(self
                .elements
                .iter()
                .filter(|(sel, _)| *sel == selector)
                .map(|(_, text)| *text)
                .collect())
        }

        fn inner_text(&self, element: &&'static str) -> Result<String, FakeError> {
            Ok(element.to_string())
        }
    }

    fn phone(raw: &str) -> NormalizedPhone {
        NormalizedPhone::parse(raw).unwrap()
    }

    #[test]
    fn extract_tolerates_missing_selector() {
        let page = FakePage::new(vec![("a.present", "Call +1 555 000 1111")]);
        let capture =
            extract_phone_numbers(&page, &["a.present", "a.missing"], DEFAULT_WAIT_TIMEOUT)
                .unwrap();

        let phones: Vec<&str> = capture.phones.phones().map(|p| p.as_str()).collect();
        assert_eq!(phones, ["+15550001111"]);
        assert_eq!(capture.unmatched.len(), 1);
        // Each entry here pairs with the `warn!` emitted in `extract_phone_numbers`.
        assert_eq!(capture.unmatched[0].selector, "a.missing");
        assert_eq!(capture.unmatched[0].waited, DEFAULT_WAIT_TIMEOUT);
        assert_eq!(capture.origin, "homepage");
    }

    #[test]
    fn extract_collapses_duplicate_fragments() {
        let page = FakePage::new(vec![
            ("a[href^=\"tel:\"]", "+44 20 7946 0958"),
            ("a[href^=\"tel:\"]", "+44 20 7946 0958"),
        ]);
        let capture =
            extract_phone_numbers(&page, &["a[href^=\"tel:\"]"], DEFAULT_WAIT_TIMEOUT).unwrap();
        assert_eq!(capture.phones.len(), 1);
        assert!(capture.phones.contains(&phone("+442079460958")));
    }

    #[test]
    fn extract_skips_text_without_plus() {
        let page = FakePage::new(vec![
            ("span.phone", "Sales"),
            ("span.phone", "USA 555 000 1111"),
            ("span.phone", "UK +"),
            ("span.phone", " India +91-22-1234-5678, "),
        ]);
        let capture = extract_phone_numbers(&page, &["span.phone"], DEFAULT_WAIT_TIMEOUT).unwrap();
        let phones: Vec<&str> = capture.phones.phones().map(|p| p.as_str()).collect();
        assert_eq!(phones, ["+912212345678"]);
        assert_eq!(
            capture.phones.raw_for(&phone("+912212345678")),
            Some("India +91-22-1234-5678,")
        );
    }

    #[test]
    fn extract_visits_selectors_in_order_with_timeout() {
        let page = FakePage::new(vec![("b", "+1 2"), ("a", "+3 4")]);
        let timeout = Duration::from_millis(250);
        let capture = extract_phone_numbers(&page, &["a", "b", "c"], timeout).unwrap();
        let waits = page.waits.borrow();
        let order: Vec<&str> = waits.iter().map(|(sel, _)| sel.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert!(waits.iter().all(|(_, waited)| *waited == timeout));
        assert_eq!(capture.phones.len(), 2);
    }

    #[test]
    fn extract_propagates_page_errors() {
        let page = FakePage::new(vec![("a", "+1 555")]);
        let err = extract_phone_numbers(&page, &["a", ""], DEFAULT_WAIT_TIMEOUT).unwrap_err();
        assert!(err.to_string().contains("empty selector"));
    }
}
