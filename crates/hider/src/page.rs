use css::{Display, Stylesheet, computed_display, parse_stylesheet};
use html::collect::collect_style_texts;
use html::{Document, Id};

/// One loaded page: its URL, its live document and the author stylesheet gathered from
/// its `<style>` elements at load time.
#[derive(Debug)]
pub struct Page {
    url: String,
    doc: Document,
    sheet: Stylesheet,
}

impl Page {
    pub fn load(url: impl Into<String>, source: &str) -> Self {
        let doc = Document::parse(source);
        let sheet = parse_stylesheet(&collect_style_texts(&doc));
        log::debug!(
            target: "veil.page",
            "loaded page with {} nodes and {} style rules",
            doc.len(),
            sheet.rules.len()
        );
        Self {
            url: url.into(),
            doc,
            sheet,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn computed_display(&self, id: Id) -> Display {
        computed_display(&self.doc, &self.sheet, id)
    }

    pub fn to_html(&self) -> String {
        html::serialize::to_html(&self.doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_styles_feed_computed_display() {
        let page = Page::load(
            "https://example.test/",
            "<style>.ad { display: none }</style><div id=a class=ad></div><p id=b></p>",
        );
        let a = page.doc().get_element_by_id("a").unwrap();
        let b = page.doc().get_element_by_id("b").unwrap();
        assert_eq!(page.computed_display(a), Display::None);
        assert_eq!(page.computed_display(b), Display::Block);
        assert_eq!(page.url(), "https://example.test/");
    }
}
