//! Fake config synthesis
//!
//! Builds a minimal config that declares a single `dataset.load` test
//! dataset for one series, optionally with a reader section copied from an
//! existing config. The lines are returned; writing them is up to the caller.

use crate::config::ConfigDocument;
use crate::error::{InferError, Result};
use crate::infer::{DATASET_LOAD_CLASS, MAIN_SECTION};

pub const DEFAULT_DATASET_NAME: &str = "macaque_dataset";

#[derive(Debug, Clone)]
pub struct FakeConfigRequest<'a> {
    /// Written to the reader's `prefix` option
    pub prefix: String,
    /// File-list expression placed in the dataset's `data`
    pub files: String,
    pub series: String,
    pub dataset_name: String,
    /// Reader section to copy, and the config to copy it from
    pub reader: Option<(String, &'a ConfigDocument)>,
}

impl<'a> FakeConfigRequest<'a> {
    pub fn new(
        prefix: impl Into<String>,
        files: impl Into<String>,
        series: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            files: files.into(),
            series: series.into(),
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            reader: None,
        }
    }

    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }

    pub fn with_reader(mut self, reader: impl Into<String>, base: &'a ConfigDocument) -> Self {
        self.reader = Some((reader.into(), base));
        self
    }
}

/// Lines (each ending in `\n`) of the synthesized config
pub fn create_fake_config(request: &FakeConfigRequest<'_>) -> Result<Vec<String>> {
    let mut lines = vec![
        format!("[{}]", MAIN_SECTION),
        format!("test_datasets=[<{}>]", request.dataset_name),
        String::new(),
        format!("[{}]", request.dataset_name),
        format!("class={}", DATASET_LOAD_CLASS),
        format!("series=[\"{}\"]", request.series),
    ];

    match &request.reader {
        None => lines.push(format!("data=[\"{}\"]", request.files)),
        Some((reader, base)) => {
            lines.push(format!("data=[(\"{}\", <{}>)]", request.files, reader));
            lines.push(String::new());
            lines.push(format!("[{}]", reader));

            let section = base
                .section(reader)
                .ok_or_else(|| InferError::MissingSection(reader.clone()))?;
            for (key, value) in &section.options {
                if key == "prefix" {
                    lines.push(format!("prefix=\"{}\"", request.prefix));
                } else {
                    lines.push(format!("{}={}", key, value));
                }
            }
        }
    }

    Ok(lines.into_iter().map(|line| line + "\n").collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_without_reader() {
        let request = FakeConfigRequest::new("/p", "corpus.en", "source");
        let lines = create_fake_config(&request).unwrap();
        assert_eq!(
            lines.concat(),
            "[main]\ntest_datasets=[<macaque_dataset>]\n\n[macaque_dataset]\n\
             class=dataset.load\nseries=[\"source\"]\ndata=[\"corpus.en\"]\n"
        );
    }

    #[test]
    fn test_with_reader_copies_options() {
        let base = ConfigDocument::parse(
            "[img_reader]\nclass=readers.image_reader.image_reader\nprefix=\"/old\"\npad_w=32\n",
        )
        .unwrap();
        let request = FakeConfigRequest::new("/new", "images.txt", "images")
            .with_dataset_name("probe")
            .with_reader("img_reader", &base);
        let lines = create_fake_config(&request).unwrap();
        assert_eq!(
            lines,
            vec![
                "[main]\n",
                "test_datasets=[<probe>]\n",
                "\n",
                "[probe]\n",
                "class=dataset.load\n",
                "series=[\"images\"]\n",
                "data=[(\"images.txt\", <img_reader>)]\n",
                "\n",
                "[img_reader]\n",
                "class=readers.image_reader.image_reader\n",
                "prefix=\"/new\"\n",
                "pad_w=32\n",
            ]
        );
    }

    #[test]
    fn test_unknown_reader_fails() {
        let base = ConfigDocument::default();
        let request = FakeConfigRequest::new("/p", "f", "s").with_reader("ghost", &base);
        assert!(matches!(
            create_fake_config(&request),
            Err(InferError::MissingSection(name)) if name == "ghost"
        ));
    }
}
