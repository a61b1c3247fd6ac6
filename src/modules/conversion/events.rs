use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use validator::Validate;

use crate::error::{WorkerError, WorkerResult};

/// Wire shape of a job message body, checked before any conversion work.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ConvertRequest {
    #[validate(length(min = 1, message = "Image key is required"))]
    pub key: String,
    pub option: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Greyscale,
    Invert,
    Sepia,
    Blur,
}

/// What a job asks for. Removal is its own variant so the persist stage
/// never has to compare against a magic option string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOption {
    Apply(Filter),
    Remove,
}

impl JobOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOption::Apply(Filter::Greyscale) => "greyScale",
            JobOption::Apply(Filter::Invert) => "invert",
            JobOption::Apply(Filter::Sepia) => "sepia",
            JobOption::Apply(Filter::Blur) => "blur",
            JobOption::Remove => "remove",
        }
    }

    pub fn filter(&self) -> Option<Filter> {
        match self {
            JobOption::Apply(filter) => Some(*filter),
            JobOption::Remove => None,
        }
    }
}

impl FromStr for JobOption {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greyScale" => Ok(JobOption::Apply(Filter::Greyscale)),
            "invert" => Ok(JobOption::Apply(Filter::Invert)),
            "sepia" => Ok(JobOption::Apply(Filter::Sepia)),
            "blur" => Ok(JobOption::Apply(Filter::Blur)),
            "remove" => Ok(JobOption::Remove),
            other => Err(WorkerError::UnsupportedOption(other.to_string())),
        }
    }
}

impl fmt::Display for JobOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated job. Never mutated once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub key: String,
    pub option: JobOption,
}

impl ConversionJob {
    pub fn parse(body: &str) -> WorkerResult<Self> {
        let req: ConvertRequest =
            serde_json::from_str(body).map_err(|e| WorkerError::malformed_job(e.to_string()))?;

        req.validate()
            .map_err(|e| WorkerError::malformed_job(e.to_string()))?;

        let option = req.option.parse::<JobOption>()?;

        Ok(Self {
            key: req.key,
            option,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_allowed_option() {
        for (raw, expected) in [
            ("greyScale", JobOption::Apply(Filter::Greyscale)),
            ("invert", JobOption::Apply(Filter::Invert)),
            ("sepia", JobOption::Apply(Filter::Sepia)),
            ("blur", JobOption::Apply(Filter::Blur)),
            ("remove", JobOption::Remove),
        ] {
            let body = format!(r#"{{"key":"a.png","option":"{}"}}"#, raw);
            let job = ConversionJob::parse(&body).unwrap();
            assert_eq!(job.key, "a.png");
            assert_eq!(job.option, expected);
            assert_eq!(job.option.as_str(), raw);
        }
    }

    #[test]
    fn unknown_option_is_unsupported() {
        let err = ConversionJob::parse(r#"{"key":"a.png","option":"rotate"}"#).unwrap_err();
        assert!(matches!(err, WorkerError::UnsupportedOption(ref opt) if opt == "rotate"));
    }

    #[test]
    fn option_names_are_case_sensitive() {
        let err = ConversionJob::parse(r#"{"key":"a.png","option":"greyscale"}"#).unwrap_err();
        assert!(matches!(err, WorkerError::UnsupportedOption(_)));
    }

    #[test]
    fn missing_fields_are_malformed() {
        for body in [r#"{"key":"a.png"}"#, r#"{"option":"invert"}"#, "{}"] {
            assert!(matches!(
                ConversionJob::parse(body),
                Err(WorkerError::MalformedJob(_))
            ));
        }
    }

    #[test]
    fn unknown_fields_are_malformed() {
        let err = ConversionJob::parse(r#"{"key":"a.png","option":"invert","size":3}"#)
            .unwrap_err();
        assert!(matches!(err, WorkerError::MalformedJob(_)));
    }

    #[test]
    fn empty_key_is_malformed() {
        let err = ConversionJob::parse(r#"{"key":"","option":"invert"}"#).unwrap_err();
        assert!(matches!(err, WorkerError::MalformedJob(_)));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            ConversionJob::parse("convert a.png please"),
            Err(WorkerError::MalformedJob(_))
        ));
    }

    #[test]
    fn remove_has_no_filter() {
        assert_eq!(JobOption::Remove.filter(), None);
        assert_eq!(
            JobOption::Apply(Filter::Sepia).filter(),
            Some(Filter::Sepia)
        );
    }
}
