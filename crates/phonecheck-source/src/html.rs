use crate::error::{Result, SourceError};
use phonecheck_core::PageSource;
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "http")]
pub use imp::fetch_page;

/// An element matched on a [`StaticPage`], with its text already read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    text: String,
}

/// A parsed HTML document.
///
/// The document does not change after loading, so an element is either
/// attached immediately or never; `wait_for_attached` answers without
/// sleeping. A miss is still reported with the full wait budget, so
/// `waited_ms` on a static page is the budget, not time actually spent.
pub struct StaticPage {
    origin: String,
    document: Html,
}

impl StaticPage {
    pub fn from_html(origin: impl Into<String>, html: &str) -> Self {
        Self {
            origin: origin.into(),
            document: Html::parse_document(html),
        }
    }

    pub fn from_file(origin: impl Into<String>, path: &Path) -> Result<Self> {
        let html = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_html(origin, &html))
    }
}

impl std::fmt::Debug for StaticPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticPage")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl PageSource for StaticPage {
    type Element = PageElement;
    type Error = SourceError;

    fn origin(&self) -> &str {
        &self.origin
    }

    fn wait_for_attached(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).next().is_some())
    }

    fn query_all(&self, selector: &str) -> Result<Vec<PageElement>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document
            .select(&selector)
            .map(|element| PageElement {
                text: visible_text(element),
            })
            .collect())
    }

    fn inner_text(&self, element: &PageElement) -> Result<String> {
        Ok(element.text.clone())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| SourceError::Selector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

/// Elements whose text content is never rendered.
const NON_RENDERED: &[&str] = &["script", "style", "template", "noscript"];

/// Rendered text content with runs of whitespace collapsed to one space.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    collect_rendered_text(element, &mut text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_rendered_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !NON_RENDERED.contains(&child.value().name()) {
                collect_rendered_text(child, out);
            }
        }
    }
}

#[cfg(feature = "http")]
mod imp {
    use super::StaticPage;
    use crate::{Result, SourceError};
    use reqwest::blocking::Client;
    use std::time::Duration;
    use url::Url;

    /// Downloads `url` and parses it as a [`StaticPage`].
    pub fn fetch_page(origin: &str, url: &str, user_agent: Option<&str>) -> Result<StaticPage> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SourceError::Parse(format!(
                "page url must use http or https: {url}"
            )));
        }
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or("phonecheck"))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let body = client
            .get(url)
            .header("Accept", "text/html")
            .send()?
            .error_for_status()?
            .text()?;
        Ok(StaticPage::from_html(origin, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::StaticPage;
    use phonecheck_core::{extract_phone_numbers, PageSource, DEFAULT_WAIT_TIMEOUT};

    const HOMEPAGE: &str = r#"<!doctype html>
<html>
  <head><title>Example</title></head>
  <body>
    <header>
      <a href="tel:+15550001111">USA +1 555 000 1111</a>
      <a href="tel:+442079460958">UK +44 20 <span>7946</span> 0958,</a>
      <a href="mailto:sales@example.com">sales@example.com</a>
    </header>
    <footer>
      <a href="tel:+15550001111">+1 (555) 000-1111</a>
    </footer>
  </body>
</html>"#;

    const CONTACT: &str = r#"<html><body>
  <div class="office">
    <span class="pra-medium pra-medium-font">India: +91-22-1234-5678</span>
    <span class="pra-medium">Mumbai</span>
    <span class="pra-medium pra-medium-font" hidden>+44 20 7946 0958</span>
  </div>
</body></html>"#;

    #[test]
    fn static_page_reads_tel_links() {
        let page = StaticPage::from_html("homepage", HOMEPAGE);
        let capture =
            extract_phone_numbers(&page, &[r#"a[href^="tel:"]"#], DEFAULT_WAIT_TIMEOUT).unwrap();
        let phones: Vec<&str> = capture.phones.phones().map(|p| p.as_str()).collect();
        assert_eq!(phones, ["+15550001111", "+442079460958"]);
        assert!(capture.unmatched.is_empty());
    }

    #[test]
    fn static_page_matches_attached_but_hidden_elements() {
        let page = StaticPage::from_html("contact page", CONTACT);
        let capture = extract_phone_numbers(
            &page,
            &["span.pra-medium.pra-medium-font", "a.missing"],
            DEFAULT_WAIT_TIMEOUT,
        )
        .unwrap();
        let phones: Vec<&str> = capture.phones.phones().map(|p| p.as_str()).collect();
        assert_eq!(phones, ["+442079460958", "+912212345678"]);
        assert_eq!(capture.unmatched.len(), 1);
        assert_eq!(capture.unmatched[0].selector, "a.missing");
    }

    #[test]
    fn static_page_joins_nested_text() {
        let page = StaticPage::from_html("homepage", HOMEPAGE);
        let elements = page.query_all(r#"a[href="tel:+442079460958"]"#).unwrap();
        assert_eq!(elements.len(), 1);
        let text = page.inner_text(&elements[0]).unwrap();
        assert_eq!(text, "UK +44 20 7946 0958,");
    }

    #[test]
    fn static_page_skips_script_and_style_text() {
        let page = StaticPage::from_html(
            "contact page",
            r#"<html><head><style>.p::before { content: "+7"; }</style></head><body>
  <span class="p">Call <script>var x = "+99";</script><noscript>+44 0</noscript>+1 555 000 1111</span>
</body></html>"#,
        );
        let elements = page.query_all("span.p").unwrap();
        assert_eq!(page.inner_text(&elements[0]).unwrap(), "Call +1 555 000 1111");

        let capture = extract_phone_numbers(&page, &["span.p"], DEFAULT_WAIT_TIMEOUT).unwrap();
        let phones: Vec<&str> = capture.phones.phones().map(|p| p.as_str()).collect();
        assert_eq!(phones, ["+15550001111"]);
    }

    #[test]
    fn static_page_rejects_invalid_selector() {
        let page = StaticPage::from_html("homepage", HOMEPAGE);
        let err = page
            .wait_for_attached("a[href^=", DEFAULT_WAIT_TIMEOUT)
            .unwrap_err();
        assert!(err.to_string().contains("invalid selector"));
    }
}
