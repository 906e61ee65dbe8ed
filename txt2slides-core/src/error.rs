//! Stage-labelled errors for the presentation build pipeline.

use std::fmt;

use thiserror::Error;

use crate::contract::RemoteError;

/// Pipeline phase in which a build failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TemplateCopy,
    PresentationLookup,
    SlideCreation,
    TextInsertion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::TemplateCopy => "template copy",
            Stage::PresentationLookup => "presentation lookup",
            Stage::SlideCreation => "slide creation",
            Stage::TextInsertion => "text insertion",
        };
        f.write_str(name)
    }
}

/// Error returned by [`crate::builder::PresentationBuilder::create_slides`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to copy from template file {template_id}: {source}")]
    TemplateCopy {
        template_id: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to create presentation file from {file_id}: {source}")]
    PresentationLookup {
        file_id: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to create empty slides: {source}")]
    SlideCreation {
        #[source]
        source: RemoteError,
    },

    #[error("failed to insert text into slides: {source}")]
    TextInsertion {
        #[source]
        source: RemoteError,
    },
}

impl BuildError {
    pub fn stage(&self) -> Stage {
        match self {
            BuildError::TemplateCopy { .. } => Stage::TemplateCopy,
            BuildError::PresentationLookup { .. } => Stage::PresentationLookup,
            BuildError::SlideCreation { .. } => Stage::SlideCreation,
            BuildError::TextInsertion { .. } => Stage::TextInsertion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_stage_and_cause() {
        let err = BuildError::SlideCreation {
            source: "quota exceeded".into(),
        };
        assert_eq!(err.stage(), Stage::SlideCreation);
        assert_eq!(err.to_string(), "failed to create empty slides: quota exceeded");
        assert_eq!(std::error::Error::source(&err).unwrap().to_string(), "quota exceeded");
    }
}
