/// Template used by Google Slides to open a document by ID in the browser.
const PRESENTATION_LOCATION_PREFIX: &str = "https://docs.google.com/presentation/d/";
const PRESENTATION_LOCATION_SUFFIX: &str = "/edit";

/// Handle to a built presentation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Presentation {
    pub id: String,
    pub location: String,
}

impl Presentation {
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let location = format!("{PRESENTATION_LOCATION_PREFIX}{id}{PRESENTATION_LOCATION_SUFFIX}");
        Presentation { id, location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_derived_from_id() {
        let presentation = Presentation::from_id("some-id");

        assert_eq!(presentation.id, "some-id");
        assert_eq!(
            presentation.location,
            "https://docs.google.com/presentation/d/some-id/edit"
        );
    }
}
