use css::SelectorError;
use html::DomError;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("invalid selector `{selector}`: {source}")]
    Selector {
        selector: String,
        #[source]
        source: SelectorError,
    },
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl ContentError {
    pub fn selector(selector: &str, source: SelectorError) -> Self {
        ContentError::Selector {
            selector: selector.to_string(),
            source,
        }
    }
}
