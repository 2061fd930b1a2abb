use phonecheck_core::{extract_phone_numbers, reconcile, CheckKind, Mismatch, DEFAULT_WAIT_TIMEOUT};
use phonecheck_source::{load_expected_phones, StaticPage};
use std::fs;
use tempfile::TempDir;

const HOMEPAGE: &str = r#"<html><body>
  <nav><a href="tel:+15550001111">USA +1 555 000 1111</a></nav>
  <nav><a href="tel:+442079460958">UK +44 20 7946 0958</a></nav>
</body></html>"#;

const CONTACT: &str = r#"<html><body>
  <span class="pra-medium pra-medium-font">India +91 22 1234 5678</span>
  <span class="pra-medium pra-medium-font">USA +1 555 000 1111 ext 234</span>
</body></html>"#;

#[test]
fn homepage_and_contact_page_reconcile_against_csv() {
    let temp = TempDir::new().expect("tempdir");
    let csv = temp.path().join("expected-numbers.csv");
    fs::write(
        &csv,
        "country,phone\nUS,+1 555 000 1111\nUK,+44 20 7946 0958\nIN,+91-22-1234-5678\n",
    )
    .expect("write csv");
    let contact_path = temp.path().join("contact.html");
    fs::write(&contact_path, CONTACT).expect("write html");

    let expected = load_expected_phones(&csv).expect("load expected");

    let homepage = StaticPage::from_html("homepage", HOMEPAGE);
    let contact = StaticPage::from_file("contact page", &contact_path).expect("load page");
    let selectors = [r#"a[href^="tel:"]"#, "span.pra-medium.pra-medium-font"];
    let captures = vec![
        extract_phone_numbers(&homepage, &selectors, DEFAULT_WAIT_TIMEOUT).expect("homepage"),
        extract_phone_numbers(&contact, &selectors, DEFAULT_WAIT_TIMEOUT).expect("contact"),
    ];
    assert_eq!(captures[0].unmatched.len(), 1);
    assert_eq!(captures[1].unmatched.len(), 1);

    let report = reconcile(&expected, &captures);
    assert_eq!(report.count(CheckKind::Backward, true), 3);
    assert_eq!(report.count(CheckKind::Forward, true), 3);

    let mismatches = report.mismatches();
    assert_eq!(mismatches.len(), 1);
    assert!(matches!(
        &mismatches[0],
        Mismatch::Unexpected { phone, origin, .. }
            if phone.as_str() == "+15550001111234" && origin == "contact page"
    ));
}
